mod client;
pub mod progress;
mod types;

pub use client::{ApiClient, UPLOAD_FIELD};
pub use progress::{percent, ProgressCallback, ProgressTracker};
pub use types::{BoundingBox, DetectionResponse, UploadSummary, UploadedFile};
