use crate::api::{BoundingBox, DetectionResponse, UploadSummary};
use crate::error::UploadError;
use crate::notify::Notifier;
use crate::upload::{FileKey, Selection, UploadOrchestrator};
use crate::utils::format_file_size;
use eframe::egui::TextureId;
use log::{info, warn};

pub const DETECTION_FAILED_FALLBACK: &str = "Failed to fetch detections.";
const MAX_RECENT_UPLOADS: usize = 20;

/// Everything the page can ask for. Produced by rendering, applied by the app.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiAction {
    PickFiles,
    PickFolder,
    Upload,
    ClearSelection,
    Detect(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum DetectionStatus {
    NotRequested,
    Loading,
    Loaded(Vec<BoundingBox>),
    Failed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecentUpload {
    pub image_id: String,
    pub size: u64,
    pub detections: DetectionStatus,
}

pub struct DetectionEvent {
    pub image_id: String,
    pub result: Result<DetectionResponse, UploadError>,
}

/// Files returned by successful uploads and the detection results fetched for them.
#[derive(Debug, Default)]
pub struct DetectionState {
    recent: Vec<RecentUpload>,
}

impl DetectionState {
    pub fn recent(&self) -> &[RecentUpload] {
        &self.recent
    }

    pub fn record(&mut self, summary: &UploadSummary) {
        for file in summary.files.iter().rev() {
            self.recent.retain(|entry| entry.image_id != file.filename);
            self.recent.insert(
                0,
                RecentUpload {
                    image_id: file.filename.clone(),
                    size: file.size,
                    detections: DetectionStatus::NotRequested,
                },
            );
        }
        self.recent.truncate(MAX_RECENT_UPLOADS);
    }

    /// Marks `image_id` as loading. False when it is unknown or already loading.
    pub fn begin(&mut self, image_id: &str) -> bool {
        match self.recent.iter_mut().find(|entry| entry.image_id == image_id) {
            Some(entry) if entry.detections != DetectionStatus::Loading => {
                entry.detections = DetectionStatus::Loading;
                true
            }
            _ => false,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.recent
            .iter()
            .any(|entry| entry.detections == DetectionStatus::Loading)
    }

    pub fn finish(&mut self, event: DetectionEvent, notifier: &Notifier) {
        let status = match event.result {
            Ok(response) => {
                info!("{} object(s) detected in {}", response.boxes.len(), event.image_id);
                DetectionStatus::Loaded(response.boxes)
            }
            Err(e) => {
                warn!("Detection for {} failed: {}", event.image_id, e);
                notifier.error(e.user_message(DETECTION_FAILED_FALLBACK));
                DetectionStatus::Failed
            }
        };
        if let Some(entry) = self
            .recent
            .iter_mut()
            .find(|entry| entry.image_id == event.image_id)
        {
            entry.detections = status;
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FileRow {
    pub key: FileKey,
    pub name: String,
    pub size_label: String,
    pub preview: Option<TextureId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecentRow {
    pub image_id: String,
    pub size_label: String,
    pub detections: DetectionStatus,
}

/// Immutable snapshot of everything the page shows for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewModel {
    pub files: Vec<FileRow>,
    pub is_uploading: bool,
    pub is_preparing: bool,
    pub progress: u8,
    pub drag_over: bool,
    pub recent: Vec<RecentRow>,
    pub endpoint: String,
}

impl ViewModel {
    pub fn build<H>(
        selection: &Selection<H>,
        preview_id: impl Fn(&H) -> TextureId,
        orchestrator: &UploadOrchestrator,
        detections: &DetectionState,
        is_preparing: bool,
        drag_over: bool,
        endpoint: String,
    ) -> Self {
        let files = selection
            .files()
            .iter()
            .map(|file| {
                let key = file.key();
                FileRow {
                    preview: selection.preview(&key).map(&preview_id),
                    key,
                    name: file.name.clone(),
                    size_label: format_file_size(file.size),
                }
            })
            .collect();

        let recent = detections
            .recent()
            .iter()
            .map(|entry| RecentRow {
                image_id: entry.image_id.clone(),
                size_label: format_file_size(entry.size),
                detections: entry.detections.clone(),
            })
            .collect();

        Self {
            files,
            is_uploading: orchestrator.is_uploading(),
            is_preparing,
            progress: orchestrator.progress(),
            drag_over,
            recent,
            endpoint,
        }
    }

    pub fn can_upload(&self) -> bool {
        !self.files.is_empty() && !self.is_uploading && !self.is_preparing
    }
}
