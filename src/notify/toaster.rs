use super::{Notification, Severity, ToastOptions};
use crate::utils::color::Palette;
use eframe::egui::{self, Align2, Color32, RichText};
use std::sync::mpsc::Receiver;
use std::time::{Duration, Instant};

const TOAST_WIDTH: f32 = 320.0;

#[derive(Debug, Clone)]
pub struct Toast {
    pub id: u64,
    pub notification: Notification,
    pub created_at: Instant,
    pub duration: Duration,
}

impl Toast {
    pub fn expires_at(&self) -> Instant {
        self.created_at + self.duration
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at()
    }
}

/// Sole subscriber of the notification channel.
pub struct Toaster {
    receiver: Receiver<Notification>,
    options: ToastOptions,
    toasts: Vec<Toast>,
    next_id: u64,
}

impl Toaster {
    pub(super) fn new(receiver: Receiver<Notification>, options: ToastOptions) -> Self {
        Self {
            receiver,
            options,
            toasts: Vec::new(),
            next_id: 0,
        }
    }

    /// Accepts everything published since the last call and drops expired toasts.
    pub fn pump(&mut self, now: Instant) {
        while let Ok(notification) = self.receiver.try_recv() {
            let duration = self.options.duration_for(notification.severity);
            self.toasts.push(Toast {
                id: self.next_id,
                notification,
                created_at: now,
                duration,
            });
            self.next_id += 1;
        }
        self.toasts.retain(|toast| !toast.is_expired(now));
    }

    pub fn toasts(&self) -> &[Toast] {
        &self.toasts
    }

    pub fn dismiss(&mut self, id: u64) {
        self.toasts.retain(|toast| toast.id != id);
    }

    /// Time until the next toast expires, used to schedule a repaint.
    pub fn next_expiry(&self, now: Instant) -> Option<Duration> {
        self.toasts
            .iter()
            .map(|toast| toast.expires_at().saturating_duration_since(now))
            .min()
    }

    pub fn show(&mut self, ctx: &egui::Context) {
        let now = Instant::now();
        self.pump(now);
        if let Some(wait) = self.next_expiry(now) {
            ctx.request_repaint_after(wait);
        }

        let mut dismissed = None;
        egui::Area::new(egui::Id::new("toaster"))
            .anchor(Align2::CENTER_TOP, egui::vec2(0.0, 16.0))
            .order(egui::Order::Foreground)
            .interactable(true)
            .show(ctx, |ui| {
                ui.set_width(TOAST_WIDTH);
                for toast in &self.toasts {
                    if render_toast(ui, toast) {
                        dismissed = Some(toast.id);
                    }
                    ui.add_space(self.options.gutter);
                }
            });

        if let Some(id) = dismissed {
            self.dismiss(id);
        }
    }
}

/// Returns true when the toast was clicked away.
fn render_toast(ui: &mut egui::Ui, toast: &Toast) -> bool {
    let (icon, icon_color) = match toast.notification.severity {
        Severity::Success => ("✔", Palette::success()),
        Severity::Warning => ("⚠", Palette::warning()),
        Severity::Error => ("✖", Palette::error()),
    };

    let response = egui::Frame::none()
        .fill(Palette::toast_background())
        .rounding(8.0)
        .inner_margin(egui::Margin::symmetric(12.0, 8.0))
        .show(ui, |ui| {
            ui.horizontal(|ui| {
                ui.label(RichText::new(icon).color(icon_color).strong());
                ui.label(RichText::new(&toast.notification.text).color(Color32::WHITE));
            });
        })
        .response;

    response.interact(egui::Sense::click()).clicked()
}

#[cfg(test)]
mod tests {
    use super::super::{channel, ToastOptions};
    use super::*;

    #[test]
    fn toasts_stack_and_expire_independently() {
        let (notifier, mut toaster) = channel(ToastOptions::default());
        let start = Instant::now();

        notifier.success("uploaded");
        notifier.error("failed");
        toaster.pump(start);
        assert_eq!(toaster.toasts().len(), 2);
        assert_ne!(toaster.toasts()[0].id, toaster.toasts()[1].id);

        toaster.pump(start + Duration::from_millis(3500));
        assert_eq!(toaster.toasts().len(), 1);
        assert_eq!(toaster.toasts()[0].notification.text, "failed");

        toaster.pump(start + Duration::from_millis(4000));
        assert!(toaster.toasts().is_empty());
    }

    #[test]
    fn same_text_does_not_overwrite() {
        let (notifier, mut toaster) = channel(ToastOptions::default());
        notifier.warning("a.txt is not an image file");
        notifier.warning("a.txt is not an image file");
        toaster.pump(Instant::now());
        assert_eq!(toaster.toasts().len(), 2);
    }

    #[test]
    fn next_expiry_tracks_the_soonest_toast() {
        let (notifier, mut toaster) = channel(ToastOptions::default());
        let start = Instant::now();
        assert_eq!(toaster.next_expiry(start), None);

        notifier.error("slow");
        notifier.success("fast");
        toaster.pump(start);
        assert_eq!(toaster.next_expiry(start), Some(Duration::from_secs(3)));

        let fast = toaster.toasts()[1].id;
        toaster.dismiss(fast);
        assert_eq!(toaster.next_expiry(start), Some(Duration::from_secs(4)));
    }
}
