use crate::upload::intake::{FileIntake, IntakeOutcome};
use crate::upload::preview::{load_thumbnail, PreviewStore, Thumbnail};
use crate::upload::types::{FileKey, RejectedFile, SelectedFile};
use log::{debug, info};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// The current set of selected files and their previews, kept in 1:1 correspondence.
#[derive(Debug)]
pub struct Selection<H> {
    files: Vec<SelectedFile>,
    previews: PreviewStore<H>,
}

impl<H> Default for Selection<H> {
    fn default() -> Self {
        Self {
            files: Vec::new(),
            previews: PreviewStore::default(),
        }
    }
}

impl<H> Selection<H> {
    pub fn files(&self) -> &[SelectedFile] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn preview(&self, key: &FileKey) -> Option<&H> {
        self.previews.get(key)
    }

    pub fn preview_count(&self) -> usize {
        self.previews.len()
    }

    /// Swaps in the accepted files of `outcome`, building a preview for each one.
    ///
    /// Nothing is installed until every preview has been built. Returns the
    /// files that were turned away, including repeats of an already accepted key.
    pub fn replace<F>(&mut self, outcome: IntakeOutcome, mut make_preview: F) -> Vec<RejectedFile>
    where
        F: FnMut(&SelectedFile) -> H,
    {
        let IntakeOutcome {
            accepted,
            mut rejected,
        } = outcome;

        let mut files = Vec::with_capacity(accepted.len());
        let mut handles = BTreeMap::new();
        for file in accepted {
            let key = file.key();
            if handles.contains_key(&key) {
                rejected.push(RejectedFile::duplicate(&file.name));
                continue;
            }
            handles.insert(key, make_preview(&file));
            files.push(file);
        }

        info!("Selected {} image(s), rejected {}", files.len(), rejected.len());
        self.previews.replace(handles);
        self.files = files;
        rejected
    }

    pub fn clear(&mut self) {
        self.previews.release_all();
        self.files.clear();
    }
}

/// A selection worked out off the UI thread: intake result plus decoded thumbnails.
///
/// `generation` ties it to the request that produced it so a slow batch that
/// was overtaken by a newer selection can be told apart and dropped.
#[derive(Debug)]
pub struct PreparedSelection {
    pub generation: u64,
    pub outcome: IntakeOutcome,
    pub thumbnails: BTreeMap<FileKey, Thumbnail>,
}

impl PreparedSelection {
    /// Expands folders, partitions by type and decodes every thumbnail. Blocking.
    pub fn prepare(generation: u64, paths: &[PathBuf]) -> Self {
        let outcome = FileIntake::process(&FileIntake::expand(paths));
        let thumbnails: BTreeMap<_, _> = outcome
            .accepted
            .iter()
            .map(|file| (file.key(), load_thumbnail(&file.path)))
            .collect();
        debug!(
            "Prepared selection #{}: {} thumbnail(s)",
            generation,
            thumbnails.len()
        );
        Self {
            generation,
            outcome,
            thumbnails,
        }
    }

    /// Installs the batch into `selection`, turning each thumbnail into a handle.
    pub fn install<H, F>(self, selection: &mut Selection<H>, mut make_handle: F) -> Vec<RejectedFile>
    where
        F: FnMut(&SelectedFile, Thumbnail) -> H,
    {
        let Self {
            outcome,
            mut thumbnails,
            ..
        } = self;
        selection.replace(outcome, |file| {
            let thumbnail = thumbnails
                .remove(&file.key())
                .unwrap_or_else(Thumbnail::placeholder);
            make_handle(file, thumbnail)
        })
    }
}

/// Stand-in for the page's file input element: remembers the last chosen value.
#[derive(Debug, Default, Clone)]
pub struct FileInput {
    value: Vec<PathBuf>,
}

impl FileInput {
    /// Returns the paths when they differ from the current value, like an input's change event.
    pub fn offer(&mut self, paths: Vec<PathBuf>) -> Option<Vec<PathBuf>> {
        if paths.is_empty() || paths == self.value {
            return None;
        }
        self.value = paths.clone();
        Some(paths)
    }

    pub fn value(&self) -> &[PathBuf] {
        &self.value
    }

    pub fn clear(&mut self) {
        self.value.clear();
    }
}
