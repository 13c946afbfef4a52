use eframe::CreationContext;
use image_uploader::app::ImageUploader;
use image_uploader::notify::{self, ToastOptions};
use image_uploader::{ApiClient, Config};
use log::{error, info};
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env()?;
    info!("Using API base URL {}", config.base_url);

    let runtime = tokio::runtime::Runtime::new()?;
    let client = ApiClient::new(&config);
    let handle = runtime.handle().clone();

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_inner_size([600.0, 700.0])
            .with_min_inner_size([420.0, 500.0]),
        ..Default::default()
    };

    let result = eframe::run_native(
        "Image Upload",
        options,
        Box::new(move |_cc: &CreationContext| {
            let (notifier, toaster) = notify::channel(ToastOptions::default());
            Box::new(ImageUploader::new(client, handle, notifier, toaster))
        }),
    );

    if let Err(e) = &result {
        error!("Window closed with error: {}", e);
    }
    runtime.shutdown_background();
    result.map_err(|e| e.to_string().into())
}
