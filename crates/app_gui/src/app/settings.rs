//! Settings panel rendering for the prediction endpoint and version info.

use super::{Panel, UiApp};
use classifier_core::config::{CONFIG_FILE, ENV_API_BASE};
use eframe::egui;

impl UiApp {
    /// Renders the settings screen: endpoint override and versions.
    pub(super) fn render_settings_panel(&mut self, ui: &mut egui::Ui) {
        ui.heading("Settings");
        ui.add_space(8.0);
        ui.horizontal(|ui| {
            ui.label("Prediction service");
            let response = ui.add(
                egui::TextEdit::singleline(&mut self.api_base_input)
                    .hint_text("http://localhost:5000")
                    .desired_width(320.0),
            );
            let submitted =
                response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
            if ui.button("Apply").clicked() || submitted {
                let base = self.api_base_input.trim().to_string();
                if base.is_empty() {
                    self.status = "The service address cannot be empty.".to_string();
                } else {
                    self.set_api_base(base);
                    self.status =
                        format!("Prediction endpoint set to {}", self.settings.predict_url());
                    self.panel = Panel::Classify;
                }
            }
            if ui
                .add_enabled(self.api_base_override.is_some(), egui::Button::new("Reset"))
                .clicked()
            {
                self.reset_api_base();
                self.status = format!(
                    "Prediction endpoint reset to {}",
                    self.settings.predict_url()
                );
            }
        });
        ui.add_space(4.0);
        ui.label(
            egui::RichText::new(format!(
                "Requests go to {}. Without an override the address comes from {ENV_API_BASE} or {CONFIG_FILE}.",
                self.settings.predict_url()
            ))
            .small()
            .weak(),
        );
        ui.add_space(4.0);
        let timeout = match self.settings.timeout() {
            Some(timeout) => format!("{} s", timeout.as_secs()),
            None => "none".to_string(),
        };
        ui.label(format!("Request timeout: {timeout}"));

        ui.add_space(16.0);
        ui.separator();
        ui.add_space(6.0);
        ui.heading("Versions");
        ui.label(format!("App version: {}", self.app_version));
    }
}
