use crate::error::{Result, UploadError};
use reqwest::Url;

pub const BASE_URL_ENV: &str = "IMAGE_UPLOADER_API_BASE_URL";
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";

/// Value captured when the binary was compiled, if the variable was set then.
const BUILD_TIME_BASE_URL: Option<&str> = option_env!("IMAGE_UPLOADER_API_BASE_URL");

#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: Url,
}

impl Config {
    /// Runtime environment wins over the build-time value; both fall back to the local backend.
    pub fn from_env() -> Result<Self> {
        let runtime = std::env::var(BASE_URL_ENV).ok();
        Self::resolve(runtime.as_deref(), BUILD_TIME_BASE_URL)
    }

    pub fn with_base_url(base_url: &str) -> Result<Self> {
        Ok(Self {
            base_url: parse_base_url(base_url)?,
        })
    }

    fn resolve(runtime: Option<&str>, build_time: Option<&str>) -> Result<Self> {
        let raw = [runtime, build_time]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|value| !value.is_empty())
            .unwrap_or(DEFAULT_BASE_URL);
        Self::with_base_url(raw)
    }
}

fn parse_base_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw).map_err(|e| UploadError::InvalidBaseUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;
    if url.cannot_be_a_base() {
        return Err(UploadError::InvalidBaseUrl {
            url: raw.to_string(),
            reason: "URL cannot be used as a base".to_string(),
        });
    }
    Ok(url)
}
