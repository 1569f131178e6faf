use crate::session::{LoadingState, ViewerSession};
use crate::settings::UiSettings;

/// What the user asked for this frame.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct UiResponse {
    /// Label of the clicked action button, verbatim.
    pub action: Option<String>,
    pub reset_camera: bool,
}

pub struct Ui {
    model_name: String,
}

impl Ui {
    pub fn new(model_name: impl Into<String>) -> Self {
        Self {
            model_name: model_name.into(),
        }
    }

    pub fn show(&mut self, ctx: &egui::Context, session: &ViewerSession, settings: &mut UiSettings) -> UiResponse {
        let mut response = UiResponse::default();

        egui::TopBottomPanel::bottom("actions").show(ctx, |ui| {
            ui.horizontal(|ui| {
                let ready = session.is_running();
                let current = session.current_action();
                for label in session.buttons() {
                    let selected = current == Some(label.as_str());
                    let button = egui::Button::new(label.as_str()).selected(selected);
                    if ui.add_enabled(ready, button).clicked() {
                        response.action = Some(label.clone());
                    }
                }

                ui.separator();
                if ui.button("⟲ Reset Camera").clicked() {
                    response.reset_camera = true;
                }
                if ui
                    .button(if settings.show_stats { "✅ Stats" } else { "⬜ Stats" })
                    .clicked()
                {
                    settings.show_stats = !settings.show_stats;
                    settings.save();
                }
            });
        });

        match session.loading() {
            LoadingState::Pending { fraction } => {
                egui::Area::new(egui::Id::new("loading"))
                    .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
                    .show(ctx, |ui| {
                        ui.set_width(320.0);
                        ui.label(format!("Loading {}…", self.model_name));
                        let bar = match fraction {
                            Some(f) => egui::ProgressBar::new(*f).show_percentage(),
                            None => egui::ProgressBar::new(0.0).animate(true),
                        };
                        ui.add(bar);
                    });
            }
            LoadingState::Failed(reason) => {
                egui::Area::new(egui::Id::new("load-failed"))
                    .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
                    .show(ctx, |ui| {
                        ui.colored_label(egui::Color32::LIGHT_RED, format!("❌ {}", reason));
                    });
            }
            LoadingState::Ready => {}
        }

        if settings.show_stats && session.is_running() {
            let stats = session.stats();
            egui::Area::new(egui::Id::new("stats"))
                .anchor(egui::Align2::LEFT_TOP, [8.0, 8.0])
                .show(ctx, |ui| {
                    egui::Frame::popup(ui.style()).show(ui, |ui| {
                        ui.monospace(format!("{:5.1} FPS", stats.fps()));
                        ui.monospace(format!("{:5.2} ms", stats.frame_ms()));
                        ui.monospace(format!("frame {}", stats.frames()));
                        for (name, weight) in session.blend() {
                            ui.monospace(format!("{} {:3.0}%", name, weight * 100.0));
                        }
                    });
                });
        }

        response
    }
}
