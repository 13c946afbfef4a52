use crate::api::progress::{counting_stream, ProgressCallback, ProgressTracker, CHUNK_SIZE};
use crate::api::types::{DetectionResponse, ErrorBody};
use crate::config::Config;
use crate::error::{Result, UploadError};
use crate::upload::SelectedFile;
use log::{debug, info, warn};
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Response, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use tokio::io::AsyncReadExt;
use tokio_util::io::ReaderStream;

/// Multipart field every file is attached under.
pub const UPLOAD_FIELD: &str = "files[]";

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
}

impl ApiClient {
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.base_url.clone(),
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn upload_url(&self) -> Result<Url> {
        self.endpoint(&["api", "upload"])
    }

    pub fn detections_url(&self, image_id: &str) -> Result<Url> {
        self.endpoint(&["api", "detections", image_id])
    }

    pub async fn upload_image(
        &self,
        file: &SelectedFile,
        on_progress: Option<ProgressCallback>,
    ) -> Result<Value> {
        self.upload_images(std::slice::from_ref(file), on_progress)
            .await
    }

    /// Sends every file in one multipart POST and returns the response body as-is.
    ///
    /// Files are opened up front, so a missing file fails before anything is
    /// sent, then streamed from disk as the transport pulls the body.
    pub async fn upload_images(
        &self,
        files: &[SelectedFile],
        on_progress: Option<ProgressCallback>,
    ) -> Result<Value> {
        if files.is_empty() {
            return Err(UploadError::NoFiles);
        }
        let url = self.upload_url()?;

        let mut opened = Vec::with_capacity(files.len());
        for file in files {
            let handle = tokio::fs::File::open(&file.path).await?;
            let len = handle.metadata().await?.len();
            if len != file.size {
                debug!("{} changed size since selection: {} -> {}", file.name, file.size, len);
            }
            opened.push((file, handle, len));
        }
        let total: u64 = opened.iter().map(|(_, _, len)| len).sum();
        let tracker = Arc::new(ProgressTracker::new(total, on_progress));

        let mut form = Form::new();
        for (file, handle, len) in opened {
            // never send more than the declared part length
            let reader = ReaderStream::with_capacity(handle.take(len), CHUNK_SIZE);
            let body = Body::wrap_stream(counting_stream(reader, tracker.clone()));
            let part = Part::stream_with_length(body, len)
                .file_name(file.name.clone())
                .mime_str(&file.mime)?;
            form = form.part(UPLOAD_FIELD, part);
        }

        info!("Uploading {} file(s), {} bytes, to {}", files.len(), total, url);
        let response = self.http.post(url).multipart(form).send().await?;
        let body: Value = Self::parse(response).await?;
        debug!("Upload response: {}", body);
        Ok(body)
    }

    pub async fn get_detections(&self, image_id: &str) -> Result<DetectionResponse> {
        let image_id = image_id.trim();
        if image_id.is_empty() {
            return Err(UploadError::EmptyImageId);
        }
        let url = self.detections_url(image_id)?;

        info!("Fetching detections for {}", image_id);
        let response = self.http.get(url).send().await?;
        let detections: DetectionResponse = Self::parse(response).await?;
        debug!("{} box(es) for {}", detections.boxes.len(), image_id);
        Ok(detections)
    }

    async fn parse<T: DeserializeOwned>(response: Response) -> Result<T> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json::<T>().await?);
        }

        let body = response.text().await.unwrap_or_default();
        let detail = ErrorBody::parse_detail(&body);
        warn!("Request failed with {}: {}", status, detail.as_deref().unwrap_or(&body));
        Err(UploadError::Server { status, detail })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| UploadError::InvalidBaseUrl {
                    url: self.base_url.to_string(),
                    reason: "URL cannot be used as a base".to_string(),
                })?;
            path.pop_if_empty().extend(segments);
        }
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> ApiClient {
        ApiClient::new(&Config::with_base_url(base).unwrap())
    }

    #[test]
    fn endpoints_hang_off_the_base_path() {
        let api = client("http://localhost:8000");
        assert_eq!(api.upload_url().unwrap().as_str(), "http://localhost:8000/api/upload");

        let prefixed = client("https://example.com/backend/");
        assert_eq!(
            prefixed.upload_url().unwrap().as_str(),
            "https://example.com/backend/api/upload"
        );
    }

    #[test]
    fn image_id_is_one_encoded_segment() {
        let api = client("http://localhost:8000");
        assert_eq!(
            api.detections_url("cat photo/1.jpg").unwrap().as_str(),
            "http://localhost:8000/api/detections/cat%20photo%2F1.jpg"
        );
    }

    #[tokio::test]
    async fn empty_inputs_fail_before_any_request() {
        // nothing listens on port 9; these must not reach the network
        let api = client("http://127.0.0.1:9");
        assert!(matches!(
            api.upload_images(&[], None).await,
            Err(UploadError::NoFiles)
        ));
        assert!(matches!(
            api.get_detections("   ").await,
            Err(UploadError::EmptyImageId)
        ));
    }
}
