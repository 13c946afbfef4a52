use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One entry of the upload response's `files` array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadedFile {
    pub filename: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub content_type: Option<String>,
}

/// Typed view over the upload response, when the body has the usual shape.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct UploadSummary {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub files_count: Option<usize>,
    #[serde(default)]
    pub files: Vec<UploadedFile>,
}

impl UploadSummary {
    /// Lenient: a body that does not match yields an empty summary.
    pub fn from_response(body: &Value) -> Self {
        serde_json::from_value(body.clone()).unwrap_or_default()
    }
}

/// Normalized bounding box, coordinates in image pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub label: String,
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
    pub score: f32,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DetectionResponse {
    #[serde(default)]
    pub boxes: Vec<BoundingBox>,
}

/// FastAPI style error body. Non-string details (validation lists) are ignored.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    detail: Option<Value>,
}

impl ErrorBody {
    pub(crate) fn parse_detail(body: &str) -> Option<String> {
        let parsed: ErrorBody = serde_json::from_str(body).ok()?;
        match parsed.detail? {
            Value::String(text) => Some(text),
            _ => None,
        }
    }
}
