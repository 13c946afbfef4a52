use crate::upload::types::{RejectedFile, SelectedFile};
use ignore::Walk;
use log::{debug, warn};
use std::fs;
use std::path::{Path, PathBuf};

/// Result of filtering a raw selection. Every offered path ends up in exactly one list.
#[derive(Debug, Default, Clone)]
pub struct IntakeOutcome {
    pub accepted: Vec<SelectedFile>,
    pub rejected: Vec<RejectedFile>,
}

impl IntakeOutcome {
    pub fn total(&self) -> usize {
        self.accepted.len() + self.rejected.len()
    }
}

pub struct FileIntake;

impl FileIntake {
    /// Replaces directories with the files beneath them (respecting `.gitignore`).
    pub fn expand(paths: &[PathBuf]) -> Vec<PathBuf> {
        let mut files = Vec::new();
        for path in paths {
            if path.is_dir() {
                debug!("Expanding folder {}", path.display());
                let mut found: Vec<PathBuf> = Walk::new(path)
                    .filter_map(|entry| entry.ok())
                    .map(|entry| entry.into_path())
                    .filter(|p| p.is_file())
                    .collect();
                found.sort();
                files.extend(found);
            } else {
                files.push(path.clone());
            }
        }
        files
    }

    pub fn process(paths: &[PathBuf]) -> IntakeOutcome {
        let mut outcome = IntakeOutcome::default();

        for path in paths {
            let name = display_name(path);

            let mime = match image_mime(path) {
                Some(mime) => mime,
                None => {
                    warn!("Rejected {}: not an image", name);
                    outcome.rejected.push(RejectedFile::not_an_image(&name));
                    continue;
                }
            };

            match fs::metadata(path) {
                Ok(meta) if meta.is_file() => outcome.accepted.push(SelectedFile {
                    path: path.clone(),
                    name,
                    size: meta.len(),
                    mime,
                }),
                Ok(_) => outcome.rejected.push(RejectedFile::not_an_image(&name)),
                Err(e) => {
                    warn!("Rejected {}: {}", name, e);
                    outcome.rejected.push(RejectedFile::unreadable(&name, e));
                }
            }
        }

        outcome
    }
}

/// The `image/*` MIME type guessed for `path`, if any.
pub fn image_mime(path: &Path) -> Option<String> {
    mime_guess::from_path(path)
        .iter()
        .find(|mime| mime.type_() == mime_guess::mime::IMAGE)
        .map(|mime| mime.essence_str().to_string())
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}
