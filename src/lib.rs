pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod notify;
pub mod upload;
pub mod utils;

pub use api::ApiClient;
pub use config::Config;
pub use error::{Result, UploadError};
