use crate::upload::types::FileKey;
use log::{debug, warn};
use std::collections::BTreeMap;
use std::path::Path;

pub const THUMBNAIL_SIZE: u32 = 48;

const PLACEHOLDER_FILL: [u8; 4] = [96, 96, 104, 255];
const PLACEHOLDER_EDGE: [u8; 4] = [150, 150, 160, 255];

/// Owning collection of preview handles, keyed by file identity.
///
/// Handles are released by dropping them, so every exit path (replacement,
/// reset, teardown of the owner) frees them exactly once.
#[derive(Debug)]
pub struct PreviewStore<H> {
    handles: BTreeMap<FileKey, H>,
}

impl<H> Default for PreviewStore<H> {
    fn default() -> Self {
        Self {
            handles: BTreeMap::new(),
        }
    }
}

impl<H> PreviewStore<H> {
    pub fn get(&self, key: &FileKey) -> Option<&H> {
        self.handles.get(key)
    }

    pub fn contains(&self, key: &FileKey) -> bool {
        self.handles.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &FileKey> {
        self.handles.keys()
    }

    /// Releases the current handles, then installs `handles`.
    pub fn replace(&mut self, handles: BTreeMap<FileKey, H>) {
        self.release_all();
        self.handles = handles;
    }

    pub fn release_all(&mut self) {
        if !self.handles.is_empty() {
            debug!("Releasing {} preview(s)", self.handles.len());
        }
        self.handles.clear();
    }
}

/// Decoded thumbnail pixels, ready to be uploaded as a texture.
#[derive(Debug, Clone)]
pub struct Thumbnail {
    pub size: [usize; 2],
    pub rgba: Vec<u8>,
}

impl Thumbnail {
    /// Generic picture tile for images the decoder does not understand (SVG, HEIC, ...).
    pub fn placeholder() -> Self {
        let side = THUMBNAIL_SIZE as usize;
        let mut rgba = Vec::with_capacity(side * side * 4);
        for y in 0..side {
            for x in 0..side {
                let edge = x < 2 || y < 2 || x >= side - 2 || y >= side - 2;
                // a "mountain" wedge in the lower half
                let wedge = y > side / 2 && x.abs_diff(side / 2) < y - side / 2;
                let pixel = if edge || wedge {
                    PLACEHOLDER_EDGE
                } else {
                    PLACEHOLDER_FILL
                };
                rgba.extend_from_slice(&pixel);
            }
        }
        Self {
            size: [side, side],
            rgba,
        }
    }

    pub fn to_color_image(&self) -> egui::ColorImage {
        egui::ColorImage::from_rgba_unmultiplied(self.size, &self.rgba)
    }
}

pub fn decode_thumbnail(path: &Path) -> Result<Thumbnail, image::ImageError> {
    let img = image::open(path)?.thumbnail(THUMBNAIL_SIZE, THUMBNAIL_SIZE);
    let rgba = img.to_rgba8();
    Ok(Thumbnail {
        size: [rgba.width() as usize, rgba.height() as usize],
        rgba: rgba.into_raw(),
    })
}

/// Decodes a thumbnail for `path`, falling back to the placeholder tile.
///
/// Never fails: every accepted image gets something to show.
pub fn load_thumbnail(path: &Path) -> Thumbnail {
    decode_thumbnail(path).unwrap_or_else(|e| {
        warn!("No preview for {}: {}", path.display(), e);
        Thumbnail::placeholder()
    })
}
