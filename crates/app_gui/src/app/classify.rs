//! Main panel: drop zone, preview, outcome cards and the supported classes grid.

use super::{ACCENT, DANGER, UiApp};
use classifier_core::{Category, Outcome, Phase, Prediction};
use eframe::egui;

const PREVIEW_MAX: f32 = 320.0;
const GRID_COLUMNS: usize = 5;

fn card(fill: egui::Color32, stroke: egui::Color32) -> egui::Frame {
    egui::Frame::new()
        .fill(fill)
        .stroke(egui::Stroke::new(1.0, stroke))
        .corner_radius(egui::CornerRadius::same(12))
        .inner_margin(egui::Margin::same(20))
}

fn capitalize(label: &str) -> String {
    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

impl UiApp {
    pub(super) fn render_classify_panel(&mut self, ui: &mut egui::Ui) {
        ui.add_space(16.0);
        ui.vertical_centered(|ui| {
            ui.heading(egui::RichText::new("Image Classification with CNN").size(28.0).strong());
            ui.add_space(4.0);
            ui.label(
                egui::RichText::new(
                    "Upload an image to predict its class among the 10 CIFAR-10 categories \
                     using our convolutional neural network model.",
                )
                .weak(),
            );
        });
        ui.add_space(16.0);

        self.render_upload_card(ui);
        ui.add_space(12.0);

        match self.controller.outcome().clone() {
            Outcome::Failed(message) => {
                render_error_card(ui, &message);
                ui.add_space(12.0);
            }
            Outcome::Succeeded(prediction) => {
                render_result_card(ui, &prediction);
                ui.add_space(12.0);
            }
            Outcome::Idle | Outcome::Predicting => {}
        }

        render_classes_grid(ui);
        ui.add_space(12.0);
        render_about_card(ui);
        ui.add_space(16.0);
    }

    fn render_upload_card(&mut self, ui: &mut egui::Ui) {
        let ctx = ui.ctx().clone();
        let dragging = self.controller.is_dragging();
        let stroke = if dragging {
            ACCENT
        } else {
            ui.visuals().widgets.noninteractive.bg_stroke.color
        };
        let fill = if dragging {
            ACCENT.gamma_multiply(0.08)
        } else {
            ui.visuals().faint_bg_color
        };

        let has_selection = self.controller.phase() != Phase::Empty;
        let response = card(fill, stroke)
            .show(ui, |ui| {
                ui.set_width(ui.available_width());
                ui.vertical_centered(|ui| {
                    if has_selection {
                        self.render_selection(ui, &ctx);
                    } else {
                        render_drop_hint(ui);
                    }
                });
            })
            .response;

        if !has_selection && response.interact(egui::Sense::click()).clicked() {
            self.pick_file(&ctx);
        }
    }

    fn render_selection(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        match self.preview_texture(ctx) {
            Some(texture) => {
                ui.add(
                    egui::Image::from_texture(&texture)
                        .max_size(egui::vec2(PREVIEW_MAX, PREVIEW_MAX)),
                );
            }
            None if self.controller.preview().is_some() => {
                ui.label(egui::RichText::new("🖼").size(64.0).weak());
                ui.label(egui::RichText::new("Preview not available").weak());
            }
            None => {
                ui.add_space(48.0);
                ui.spinner();
                ui.add_space(48.0);
            }
        }
        if let Some(file) = self.controller.selected() {
            ui.label(egui::RichText::new(file.name()).small().weak());
        }

        ui.add_space(12.0);
        ui.horizontal(|ui| {
            let buttons_width = 280.0;
            ui.add_space(((ui.available_width() - buttons_width) / 2.0).max(0.0));
            if ui.button("Change image").clicked() {
                self.pick_file(ctx);
            }
            let predicting = self.controller.is_in_flight();
            let label = if predicting {
                "Predicting..."
            } else {
                "✨ Predict class"
            };
            let clicked = ui
                .add_enabled(self.controller.can_predict(), egui::Button::new(label))
                .clicked();
            if predicting {
                ui.spinner();
            }
            if clicked {
                self.start_predict(ctx);
            }
        });
    }
}

fn render_drop_hint(ui: &mut egui::Ui) {
    ui.add_space(32.0);
    ui.label(egui::RichText::new("⬆").size(40.0).color(ACCENT));
    ui.add_space(8.0);
    ui.label(egui::RichText::new("Drag and drop your image here").size(18.0).strong());
    ui.label(egui::RichText::new("or click to browse your files").weak());
    ui.add_space(8.0);
    ui.label(egui::RichText::new("🖼 PNG, JPG, JPEG").small());
    ui.add_space(32.0);
}

fn render_error_card(ui: &mut egui::Ui, message: &str) {
    card(DANGER.gamma_multiply(0.1), DANGER.gamma_multiply(0.5)).show(ui, |ui| {
        ui.set_width(ui.available_width());
        ui.horizontal(|ui| {
            ui.label(egui::RichText::new("⚠").size(36.0).color(DANGER));
            ui.add_space(12.0);
            ui.vertical(|ui| {
                ui.label(egui::RichText::new("❌ Error").small().color(DANGER));
                ui.label(egui::RichText::new("Prediction failed").size(18.0).strong());
                ui.label(egui::RichText::new(message).weak());
            });
        });
    });
}

fn render_result_card(ui: &mut egui::Ui, prediction: &Prediction) {
    card(ACCENT.gamma_multiply(0.1), ACCENT.gamma_multiply(0.5)).show(ui, |ui| {
        ui.set_width(ui.available_width());
        ui.horizontal(|ui| {
            ui.label(egui::RichText::new("✔").size(36.0).color(ACCENT));
            ui.add_space(12.0);
            ui.vertical(|ui| {
                ui.label(egui::RichText::new("📈 Result").small().color(ACCENT));
                ui.horizontal(|ui| {
                    ui.label(egui::RichText::new("Predicted class:").size(22.0).strong());
                    let mut text = capitalize(&prediction.label);
                    if let Some(category) = prediction.category {
                        text = format!("{text} {}", category.glyph());
                    }
                    ui.label(egui::RichText::new(text).size(22.0).strong().color(ACCENT));
                });
                ui.label(
                    egui::RichText::new("The CNN model has successfully analyzed your image")
                        .weak(),
                );
            });
        });
    });
}

fn render_classes_grid(ui: &mut egui::Ui) {
    ui.label(egui::RichText::new("🧠 Supported classes").size(18.0).strong());
    ui.add_space(6.0);
    let spacing = ui.spacing().item_spacing.x;
    let cell_width =
        ((ui.available_width() - spacing * (GRID_COLUMNS as f32 - 1.0)) / GRID_COLUMNS as f32)
            .max(80.0);
    egui::Grid::new("supported-classes")
        .num_columns(GRID_COLUMNS)
        .spacing([spacing, spacing])
        .show(ui, |ui| {
            for (i, category) in Category::ALL.iter().enumerate() {
                let visuals = ui.visuals();
                let (fill, stroke) = (
                    visuals.faint_bg_color,
                    visuals.widgets.noninteractive.bg_stroke.color,
                );
                card(fill, stroke)
                    .inner_margin(egui::Margin::same(12))
                    .show(ui, |ui| {
                        ui.set_width(cell_width - 24.0);
                        ui.vertical_centered(|ui| {
                            ui.label(egui::RichText::new(category.glyph()).size(28.0));
                            ui.label(capitalize(category.name()));
                        });
                    });
                if (i + 1) % GRID_COLUMNS == 0 {
                    ui.end_row();
                }
            }
        });
}

fn render_about_card(ui: &mut egui::Ui) {
    let visuals = ui.visuals().clone();
    card(visuals.faint_bg_color, visuals.widgets.noninteractive.bg_stroke.color).show(ui, |ui| {
        ui.set_width(ui.available_width());
        ui.horizontal(|ui| {
            ui.label(egui::RichText::new("✨").size(24.0).color(ACCENT));
            ui.vertical(|ui| {
                ui.label(egui::RichText::new("About the model").strong());
                ui.label(
                    egui::RichText::new(
                        "This classifier uses a convolutional neural network (CNN) trained on the \
                         CIFAR-10 dataset and can recognize 10 object categories with high accuracy.",
                    )
                    .weak(),
                );
            });
        });
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("cat", "Cat")]
    #[case("automobile", "Automobile")]
    #[case("", "")]
    #[case("élan", "Élan")]
    fn capitalize_uppercases_first_letter(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(capitalize(input), expected);
    }
}
