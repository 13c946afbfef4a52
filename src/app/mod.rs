mod state;
mod ui;

use crate::api::{ApiClient, ProgressCallback, UploadSummary};
use crate::error::UploadError;
use crate::notify::{Notifier, Toaster};
use crate::upload::{
    Completion, FileInput, PreparedSelection, Selection, UploadEvent, UploadOrchestrator,
};
use eframe::{egui, App};
use log::{debug, info, warn};
use rfd::FileDialog;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::Arc;
use tokio::runtime::Handle;

pub use state::{
    DetectionEvent, DetectionState, DetectionStatus, FileRow, RecentRow, RecentUpload, UiAction,
    ViewModel,
};

const IMAGE_EXTENSIONS: [&str; 9] = [
    "png", "jpg", "jpeg", "gif", "webp", "bmp", "tif", "tiff", "svg",
];

pub struct ImageUploader {
    client: ApiClient,
    runtime: Handle,
    notifier: Notifier,
    toaster: Toaster,
    selection: Selection<egui::TextureHandle>,
    selection_generation: u64,
    preparing: bool,
    preview_sender: Sender<PreparedSelection>,
    preview_receiver: Receiver<PreparedSelection>,
    file_input: FileInput,
    orchestrator: UploadOrchestrator,
    upload_receiver: Option<Receiver<UploadEvent>>,
    detections: DetectionState,
    detection_sender: Sender<DetectionEvent>,
    detection_receiver: Receiver<DetectionEvent>,
}

impl ImageUploader {
    pub fn new(client: ApiClient, runtime: Handle, notifier: Notifier, toaster: Toaster) -> Self {
        info!("Initializing image uploader against {}", client.base_url());
        let (detection_sender, detection_receiver) = mpsc::channel();
        let (preview_sender, preview_receiver) = mpsc::channel();
        Self {
            client,
            runtime,
            notifier,
            toaster,
            selection: Selection::default(),
            selection_generation: 0,
            preparing: false,
            preview_sender,
            preview_receiver,
            file_input: FileInput::default(),
            orchestrator: UploadOrchestrator::default(),
            upload_receiver: None,
            detections: DetectionState::default(),
            detection_sender,
            detection_receiver,
        }
    }

    /// Decodes the new selection on the blocking pool; `update_state` installs it.
    fn select_paths(&mut self, ctx: &egui::Context, paths: Vec<PathBuf>) {
        if self.orchestrator.is_uploading() {
            debug!("Ignoring selection while an upload is in flight");
            return;
        }

        self.selection_generation += 1;
        self.preparing = true;
        let generation = self.selection_generation;
        let sender = self.preview_sender.clone();
        let repaint = ctx.clone();
        self.runtime.spawn_blocking(move || {
            let prepared = PreparedSelection::prepare(generation, &paths);
            let _ = sender.send(prepared);
            repaint.request_repaint();
        });
    }

    fn install_selection(&mut self, ctx: &egui::Context, prepared: PreparedSelection) {
        if prepared.generation != self.selection_generation || self.orchestrator.is_uploading() {
            debug!(
                "Dropping selection #{}, current is #{}",
                prepared.generation, self.selection_generation
            );
            return;
        }

        self.preparing = false;
        let rejected = prepared.install(&mut self.selection, |file, thumbnail| {
            ctx.load_texture(
                file.key().to_string(),
                thumbnail.to_color_image(),
                egui::TextureOptions::LINEAR,
            )
        });
        for file in rejected {
            self.notifier.warning(file.reason);
        }
    }

    fn clear_selection(&mut self) {
        if self.orchestrator.is_uploading() {
            return;
        }
        // invalidates any batch still being decoded
        self.selection_generation += 1;
        self.preparing = false;
        self.selection.clear();
        self.file_input.clear();
    }

    fn pick_files(&mut self, ctx: &egui::Context) {
        let picked = FileDialog::new()
            .add_filter("Images", &IMAGE_EXTENSIONS[..])
            .add_filter("All files", &["*"][..])
            .pick_files();
        if let Some(paths) = picked.and_then(|paths| self.file_input.offer(paths)) {
            self.select_paths(ctx, paths);
        }
    }

    fn pick_folder(&mut self, ctx: &egui::Context) {
        if let Some(folder) = FileDialog::new().pick_folder() {
            self.select_paths(ctx, vec![folder]);
        }
    }

    fn collect_dropped(&mut self, ctx: &egui::Context) -> bool {
        let (dropped, hovering) = ctx.input(|i| {
            let dropped: Vec<PathBuf> = i
                .raw
                .dropped_files
                .iter()
                .filter_map(|file| file.path.clone())
                .collect();
            (dropped, !i.raw.hovered_files.is_empty())
        });
        if !dropped.is_empty() {
            debug!("{} item(s) dropped", dropped.len());
            self.select_paths(ctx, dropped);
        }
        hovering
    }

    pub fn start_upload(&mut self, ctx: &egui::Context) {
        if self.preparing || !self.orchestrator.begin(self.selection.len()) {
            return;
        }

        let (sender, receiver) = mpsc::channel();
        self.upload_receiver = Some(receiver);

        let files = self.selection.files().to_vec();
        let client = self.client.clone();

        let progress_sender = sender.clone();
        let progress_ctx = ctx.clone();
        let on_progress: ProgressCallback = Arc::new(move |percent| {
            let _ = progress_sender.send(UploadEvent::Progress(percent));
            progress_ctx.request_repaint();
        });

        let done_ctx = ctx.clone();
        self.runtime.spawn(async move {
            let result = client.upload_images(&files, Some(on_progress)).await;
            let _ = sender.send(UploadEvent::Finished(result));
            done_ctx.request_repaint();
        });
    }

    fn detect(&mut self, ctx: &egui::Context, image_id: String) {
        if !self.detections.begin(&image_id) {
            return;
        }

        let client = self.client.clone();
        let sender = self.detection_sender.clone();
        let repaint = ctx.clone();
        self.runtime.spawn(async move {
            let result = client.get_detections(&image_id).await;
            let _ = sender.send(DetectionEvent { image_id, result });
            repaint.request_repaint();
        });
    }

    pub fn update_state(&mut self, ctx: &egui::Context) {
        while let Ok(prepared) = self.preview_receiver.try_recv() {
            self.install_selection(ctx, prepared);
        }

        let mut events = Vec::new();
        let mut disconnected = false;
        if let Some(receiver) = &self.upload_receiver {
            loop {
                match receiver.try_recv() {
                    Ok(event) => events.push(event),
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => {
                        disconnected = true;
                        break;
                    }
                }
            }
        }

        for event in events {
            let summary = match &event {
                UploadEvent::Finished(Ok(body)) => Some(UploadSummary::from_response(body)),
                _ => None,
            };
            if let Some(completion) = self.orchestrator.handle(event, &self.notifier) {
                self.complete(completion, summary);
            }
        }

        if disconnected && self.orchestrator.is_uploading() {
            warn!("Upload task ended without reporting a result");
            let completion = self
                .orchestrator
                .finish(Err(UploadError::Runtime), &self.notifier);
            self.complete(completion, None);
        }

        while let Ok(event) = self.detection_receiver.try_recv() {
            self.detections.finish(event, &self.notifier);
        }
    }

    fn complete(&mut self, completion: Completion, summary: Option<UploadSummary>) {
        self.upload_receiver = None;
        if let Completion::ResetSelection { uploaded } = completion {
            debug!("Resetting selection after uploading {} file(s)", uploaded);
            self.selection.clear();
            self.file_input.clear();
            if let Some(summary) = summary {
                self.detections.record(&summary);
            }
        }
    }

    fn apply(&mut self, ctx: &egui::Context, action: UiAction) {
        match action {
            UiAction::PickFiles => self.pick_files(ctx),
            UiAction::PickFolder => self.pick_folder(ctx),
            UiAction::Upload => self.start_upload(ctx),
            UiAction::ClearSelection => self.clear_selection(),
            UiAction::Detect(image_id) => self.detect(ctx, image_id),
        }
    }
}

impl App for ImageUploader {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.update_state(ctx);
        let drag_over = self.collect_dropped(ctx);

        let endpoint = self
            .client
            .upload_url()
            .map(|url| url.to_string())
            .unwrap_or_else(|_| self.client.base_url().to_string());
        let view = ViewModel::build(
            &self.selection,
            |texture| texture.id(),
            &self.orchestrator,
            &self.detections,
            self.preparing,
            drag_over,
            endpoint,
        );

        for action in ui::render(ctx, &view) {
            self.apply(ctx, action);
        }

        self.toaster.show(ctx);
    }
}

impl Drop for ImageUploader {
    fn drop(&mut self) {
        debug!("Releasing {} preview(s) on shutdown", self.selection.preview_count());
        self.selection.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::notify::{self, Severity, ToastOptions};
    use crate::upload::orchestrator::UPLOAD_FAILED_FALLBACK;
    use serde_json::json;
    use std::path::Path;
    use std::thread;
    use std::time::{Duration, Instant};
    use tokio::runtime::Runtime;

    fn uploader(runtime: &Runtime) -> ImageUploader {
        let config = Config::with_base_url("http://127.0.0.1:9").unwrap();
        let (notifier, toaster) = notify::channel(ToastOptions::default());
        ImageUploader::new(
            ApiClient::new(&config),
            runtime.handle().clone(),
            notifier,
            toaster,
        )
    }

    fn png(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        image::RgbaImage::from_pixel(64, 64, image::Rgba([0, 128, 0, 255]))
            .save(&path)
            .unwrap();
        path
    }

    /// Pumps the app until the pending selection has been installed.
    fn settle(app: &mut ImageUploader, ctx: &egui::Context) {
        for _ in 0..500 {
            app.update_state(ctx);
            if !app.preparing {
                return;
            }
            thread::sleep(Duration::from_millis(10));
        }
        panic!("selection was never installed");
    }

    fn toasts(app: &mut ImageUploader) -> Vec<(Severity, String)> {
        app.toaster.pump(Instant::now());
        app.toaster
            .toasts()
            .iter()
            .map(|t| (t.notification.severity, t.notification.text.clone()))
            .collect()
    }

    #[test]
    fn success_clears_selection_previews_and_input() {
        let runtime = Runtime::new().unwrap();
        let ctx = egui::Context::default();
        let dir = tempfile::tempdir().unwrap();
        let paths = vec![png(dir.path(), "a.png"), png(dir.path(), "b.png")];

        let mut app = uploader(&runtime);
        let offered = app.file_input.offer(paths).unwrap();
        app.select_paths(&ctx, offered);
        settle(&mut app, &ctx);
        assert_eq!(app.selection.len(), 2);
        assert_eq!(app.selection.preview_count(), 2);

        assert!(app.orchestrator.begin(app.selection.len()));
        let (sender, receiver) = mpsc::channel();
        app.upload_receiver = Some(receiver);
        sender.send(UploadEvent::Progress(50)).unwrap();
        sender
            .send(UploadEvent::Finished(Ok(json!({
                "message": "Files uploaded successfully",
                "files_count": 2,
                "files": [
                    {"filename": "a.png", "size": 120, "content_type": "image/png"},
                    {"filename": "b.png", "size": 120, "content_type": "image/png"}
                ]
            }))))
            .unwrap();
        app.update_state(&ctx);

        assert!(!app.orchestrator.is_uploading());
        assert_eq!(app.orchestrator.progress(), 0);
        assert!(app.upload_receiver.is_none());
        assert!(app.selection.is_empty());
        assert_eq!(app.selection.preview_count(), 0);
        assert!(app.file_input.value().is_empty());
        assert_eq!(app.detections.recent().len(), 2);
        assert_eq!(
            toasts(&mut app),
            vec![(Severity::Success, "Successfully uploaded 2 file(s)".to_string())]
        );
    }

    #[test]
    fn lost_upload_task_settles_to_idle_with_fallback() {
        let runtime = Runtime::new().unwrap();
        let ctx = egui::Context::default();
        let dir = tempfile::tempdir().unwrap();

        let mut app = uploader(&runtime);
        app.select_paths(&ctx, vec![png(dir.path(), "a.png")]);
        settle(&mut app, &ctx);

        assert!(app.orchestrator.begin(app.selection.len()));
        let (sender, receiver) = mpsc::channel::<UploadEvent>();
        app.upload_receiver = Some(receiver);
        sender.send(UploadEvent::Progress(30)).unwrap();
        drop(sender);
        app.update_state(&ctx);

        assert!(!app.orchestrator.is_uploading());
        assert!(app.upload_receiver.is_none());
        assert_eq!(app.selection.len(), 1);
        assert_eq!(app.selection.preview_count(), 1);
        assert_eq!(
            toasts(&mut app),
            vec![(Severity::Error, UPLOAD_FAILED_FALLBACK.to_string())]
        );
    }

    #[test]
    fn overtaken_selection_is_dropped() {
        let runtime = Runtime::new().unwrap();
        let ctx = egui::Context::default();
        let dir = tempfile::tempdir().unwrap();
        let first = png(dir.path(), "first.png");
        let second = png(dir.path(), "second.png");

        let mut app = uploader(&runtime);
        app.select_paths(&ctx, vec![first]);
        app.select_paths(&ctx, vec![second]);
        settle(&mut app, &ctx);
        // the first batch may land after the second one
        thread::sleep(Duration::from_millis(100));
        app.update_state(&ctx);

        let names: Vec<_> = app.selection.files().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["second.png"]);
        assert_eq!(app.selection.preview_count(), 1);
    }

    #[test]
    fn clearing_discards_a_pending_selection() {
        let runtime = Runtime::new().unwrap();
        let ctx = egui::Context::default();
        let dir = tempfile::tempdir().unwrap();

        let mut app = uploader(&runtime);
        app.select_paths(&ctx, vec![png(dir.path(), "a.png")]);
        app.apply(&ctx, UiAction::ClearSelection);
        assert!(!app.preparing);

        thread::sleep(Duration::from_millis(200));
        app.update_state(&ctx);
        assert!(app.selection.is_empty());
    }

    #[test]
    fn svg_gets_a_placeholder_texture() {
        let runtime = Runtime::new().unwrap();
        let ctx = egui::Context::default();
        let dir = tempfile::tempdir().unwrap();
        let logo = dir.path().join("logo.svg");
        std::fs::write(&logo, r#"<svg xmlns="http://www.w3.org/2000/svg"/>"#).unwrap();

        let mut app = uploader(&runtime);
        app.select_paths(&ctx, vec![logo]);
        settle(&mut app, &ctx);

        assert_eq!(app.selection.len(), 1);
        let key = app.selection.files()[0].key();
        assert_eq!(app.selection.preview(&key).map(|t| t.size()), Some([48, 48]));
        assert!(toasts(&mut app).is_empty());
    }
}
