use crate::error::UploadError;
use crate::notify::Notifier;
use log::{info, warn};
use serde_json::Value;

pub const UPLOAD_FAILED_FALLBACK: &str = "Failed to upload files. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UploadPhase {
    #[default]
    Idle,
    Uploading {
        file_count: usize,
    },
}

/// Messages sent from the background upload task to the UI thread.
#[derive(Debug)]
pub enum UploadEvent {
    Progress(u8),
    Finished(Result<Value, UploadError>),
}

/// What the owner of the selection has to do once an upload settles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    /// Clear the selection, its previews and the file input.
    ResetSelection { uploaded: usize },
    /// Keep the selection so the user can retry.
    KeepSelection,
}

#[derive(Debug, Default)]
pub struct UploadOrchestrator {
    phase: UploadPhase,
    progress: u8,
}

impl UploadOrchestrator {
    pub fn phase(&self) -> UploadPhase {
        self.phase
    }

    pub fn is_uploading(&self) -> bool {
        matches!(self.phase, UploadPhase::Uploading { .. })
    }

    pub fn progress(&self) -> u8 {
        self.progress
    }

    /// Starts an attempt. Returns false, changing nothing, when there is nothing to
    /// send or an upload is already in flight.
    pub fn begin(&mut self, selected_count: usize) -> bool {
        if selected_count == 0 || self.is_uploading() {
            return false;
        }
        info!("Starting upload of {} file(s)", selected_count);
        self.phase = UploadPhase::Uploading {
            file_count: selected_count,
        };
        self.progress = 0;
        true
    }

    pub fn on_progress(&mut self, percent: u8) {
        if self.is_uploading() {
            self.progress = self.progress.max(percent.min(100));
        }
    }

    /// Settles the current attempt, publishes the outcome and always returns to idle.
    pub fn finish(&mut self, result: Result<Value, UploadError>, notifier: &Notifier) -> Completion {
        let file_count = match self.phase {
            UploadPhase::Uploading { file_count } => file_count,
            UploadPhase::Idle => 0,
        };
        self.phase = UploadPhase::Idle;

        match result {
            Ok(_) => {
                info!("Uploaded {} file(s)", file_count);
                notifier.success(format!("Successfully uploaded {} file(s)", file_count));
                self.progress = 0;
                Completion::ResetSelection {
                    uploaded: file_count,
                }
            }
            Err(e) => {
                warn!("Upload failed: {}", e);
                notifier.error(e.user_message(UPLOAD_FAILED_FALLBACK));
                Completion::KeepSelection
            }
        }
    }

    pub fn handle(&mut self, event: UploadEvent, notifier: &Notifier) -> Option<Completion> {
        match event {
            UploadEvent::Progress(percent) => {
                self.on_progress(percent);
                None
            }
            UploadEvent::Finished(result) => Some(self.finish(result, notifier)),
        }
    }
}
