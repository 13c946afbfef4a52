use super::state::{DetectionStatus, RecentRow, UiAction, ViewModel};
use crate::utils::color::Palette;
use eframe::egui::{self, Align, Color32, RichText};

const THUMBNAIL_EDGE: f32 = 48.0;

/// Draws the upload page for `view` and returns what the user asked for this frame.
pub fn render(ctx: &egui::Context, view: &ViewModel) -> Vec<UiAction> {
    let mut actions = Vec::new();

    egui::CentralPanel::default().show(ctx, |ui| {
        let footer_height = 40.0;
        let content_height = ui.available_height() - footer_height;

        egui::ScrollArea::vertical()
            .max_height(content_height)
            .show(ui, |ui| {
                ui.add_space(20.0);
                ui.vertical_centered(|ui| {
                    ui.heading("Image Upload");
                    ui.add_space(5.0);
                    ui.label(
                        RichText::new("Select one or more images to upload")
                            .color(ui.visuals().text_color().gamma_multiply(0.7)),
                    );
                });
                ui.add_space(20.0);

                ui.group(|ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_enabled_ui(!view.is_uploading, |ui| {
                            ui.horizontal(|ui| {
                                if ui.button("🖼 Select Images").clicked() {
                                    actions.push(UiAction::PickFiles);
                                }
                                if ui.button("📁 Select Folder").clicked() {
                                    actions.push(UiAction::PickFolder);
                                }
                            });
                        });
                        ui.label(
                            RichText::new("Choose one or more image files (JPG, PNG, GIF, etc.)")
                                .small()
                                .color(Palette::muted()),
                        );
                    });
                });

                ui.add_space(12.0);

                if view.is_preparing {
                    ui.horizontal(|ui| {
                        ui.spinner();
                        ui.label(RichText::new("Loading previews...").color(Palette::muted()));
                    });
                    ui.add_space(8.0);
                }

                if view.files.is_empty() {
                    render_drop_zone(ui, view.drag_over);
                } else {
                    render_selected(ui, view, &mut actions);
                }

                if !view.recent.is_empty() {
                    ui.add_space(16.0);
                    render_recent(ui, &view.recent, &mut actions);
                }

                ui.add_space(20.0);
            });

        ui.with_layout(egui::Layout::bottom_up(Align::Center), |ui| {
            ui.add_space(8.0);
            ui.label(
                RichText::new(format!("Uploading to {}", view.endpoint))
                    .small()
                    .color(Palette::muted()),
            );
        });
    });

    actions
}

fn render_drop_zone(ui: &mut egui::Ui, drag_over: bool) {
    let stroke = if drag_over {
        egui::Stroke::new(2.0, Palette::accent())
    } else {
        egui::Stroke::new(1.0, Palette::muted())
    };

    egui::Frame::none()
        .stroke(stroke)
        .rounding(8.0)
        .inner_margin(egui::Margin::same(24.0))
        .show(ui, |ui| {
            ui.vertical_centered(|ui| {
                ui.label(if drag_over {
                    "Drop images here"
                } else {
                    "No images selected"
                });
                ui.label(
                    RichText::new("Click \"Select Images\" or drag and drop files here")
                        .small()
                        .color(Palette::muted()),
                );
            });
        });
}

fn render_selected(ui: &mut egui::Ui, view: &ViewModel, actions: &mut Vec<UiAction>) {
    ui.label(
        RichText::new(format!("Selected Files ({})", view.files.len())).color(Palette::muted()),
    );

    egui::ScrollArea::vertical()
        .id_source("selected_files")
        .max_height(240.0)
        .show(ui, |ui| {
            for row in &view.files {
                ui.horizontal(|ui| {
                    match row.preview {
                        Some(texture) => {
                            ui.image((texture, egui::vec2(THUMBNAIL_EDGE, THUMBNAIL_EDGE)));
                        }
                        None => {
                            ui.add_space(THUMBNAIL_EDGE);
                        }
                    }
                    ui.vertical(|ui| {
                        ui.label(RichText::new(&row.name).strong());
                        ui.label(RichText::new(&row.size_label).small().color(Palette::muted()));
                    });
                });
                ui.add_space(4.0);
            }
        });

    ui.add_space(10.0);
    ui.vertical_centered(|ui| {
        ui.add_enabled_ui(view.can_upload(), |ui| {
            let label = if view.is_uploading {
                "Uploading..."
            } else {
                "📤 Upload"
            };
            let button = egui::Button::new(label).min_size(egui::vec2(200.0, 40.0));
            if ui.add(button).clicked() {
                actions.push(UiAction::Upload);
            }
        });
        ui.add_enabled_ui(!view.is_uploading, |ui| {
            if ui.button("🗑 Clear").clicked() {
                actions.push(UiAction::ClearSelection);
            }
        });
    });

    if view.is_uploading {
        ui.add_space(10.0);
        ui.horizontal(|ui| {
            ui.label("Progress");
            ui.with_layout(egui::Layout::right_to_left(Align::Center), |ui| {
                ui.label(format!("{}%", view.progress));
            });
        });
        let bar = egui::ProgressBar::new(f32::from(view.progress) / 100.0)
            .animate(false)
            .fill(Palette::accent());
        ui.add(bar);
    }
}

fn render_recent(ui: &mut egui::Ui, recent: &[RecentRow], actions: &mut Vec<UiAction>) {
    ui.group(|ui| {
        ui.label(RichText::new("Recent uploads").strong());
        ui.add_space(6.0);

        for row in recent {
            ui.horizontal(|ui| {
                ui.label(&row.image_id);
                ui.label(RichText::new(&row.size_label).small().color(Palette::muted()));
                ui.with_layout(egui::Layout::right_to_left(Align::Center), |ui| {
                    let loading = row.detections == DetectionStatus::Loading;
                    ui.add_enabled_ui(!loading, |ui| {
                        let label = if loading { "Detecting..." } else { "🔍 Detect objects" };
                        if ui.button(label).clicked() {
                            actions.push(UiAction::Detect(row.image_id.clone()));
                        }
                    });
                });
            });

            match &row.detections {
                DetectionStatus::Loaded(boxes) if boxes.is_empty() => {
                    ui.label(RichText::new("No objects found").color(Palette::muted()));
                }
                DetectionStatus::Loaded(boxes) => {
                    for b in boxes {
                        ui.label(format!(
                            "• {} {:.0}% at ({:.0}, {:.0}) {:.0}×{:.0}",
                            b.label,
                            b.score * 100.0,
                            b.x,
                            b.y,
                            b.w,
                            b.h
                        ));
                    }
                }
                DetectionStatus::Failed => {
                    ui.colored_label(Color32::from_rgb(220, 50, 50), "Detection failed");
                }
                DetectionStatus::NotRequested | DetectionStatus::Loading => {}
            }
            ui.add_space(4.0);
        }
    });
}
