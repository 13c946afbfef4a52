use std::fmt;
use std::path::PathBuf;

/// Identity of a selected file: display name plus byte size.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileKey(String);

impl FileKey {
    pub fn new(name: &str, size: u64) -> Self {
        Self(format!("{}-{}", name, size))
    }
}

impl fmt::Display for FileKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub path: PathBuf,
    pub name: String,
    pub size: u64,
    pub mime: String,
}

impl SelectedFile {
    pub fn key(&self) -> FileKey {
        FileKey::new(&self.name, self.size)
    }
}

/// A file the intake refused, with the warning shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedFile {
    pub name: String,
    pub reason: String,
}

impl RejectedFile {
    pub fn not_an_image(name: &str) -> Self {
        Self {
            name: name.to_string(),
            reason: format!("{} is not an image file", name),
        }
    }

    pub fn unreadable(name: &str, err: impl fmt::Display) -> Self {
        Self {
            name: name.to_string(),
            reason: format!("{} could not be read: {}", name, err),
        }
    }

    pub fn duplicate(name: &str) -> Self {
        Self {
            name: name.to_string(),
            reason: format!("{} is already selected", name),
        }
    }
}
