//! Application shell: state, worker event intake, file acquisition and layout.

mod classify;
mod settings;

use crate::worker::{self, WorkerEvent};
use anyhow::{Result, anyhow};
use classifier_core::{
    HttpPredictor, ImageFile, PredictError, Predictor, PreviewJob, Settings, UploadController,
    media_type_for,
};
use crossbeam_channel::{Receiver, Sender, unbounded};
use eframe::{App, Frame, egui};
use rfd::FileDialog;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

const SETTINGS_STORAGE_KEY: &str = "classifier-settings";
/// Extensions offered by the file picker.
const PICKER_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp", "webp"];

pub(crate) const ACCENT: egui::Color32 = egui::Color32::from_rgb(99, 102, 241);
pub(crate) const DANGER: egui::Color32 = egui::Color32::from_rgb(239, 68, 68);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Panel {
    Classify,
    Settings,
}

/// What survives a restart: only a user-chosen endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
struct PersistedSettings {
    api_base: Option<String>,
}

pub struct UiApp {
    controller: UploadController,
    /// Settings as loaded from file/env, before any runtime override.
    loaded_settings: Settings,
    settings: Settings,
    api_base_override: Option<String>,
    api_base_input: String,
    predictor: Option<Arc<dyn Predictor>>,
    events_tx: Sender<WorkerEvent>,
    events_rx: Receiver<WorkerEvent>,
    /// Texture for the preview of the given selection.
    preview_texture: Option<(u64, egui::TextureHandle)>,
    panel: Panel,
    status: String,
    app_version: &'static str,
}

impl UiApp {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        settings: Settings,
        startup_warning: Option<String>,
    ) -> Self {
        let persisted = cc
            .storage
            .and_then(|storage| storage.get_string(SETTINGS_STORAGE_KEY))
            .and_then(|text| serde_json::from_str::<PersistedSettings>(&text).ok())
            .unwrap_or_default();

        let (events_tx, events_rx) = unbounded();
        let mut app = Self {
            controller: UploadController::new(),
            api_base_input: settings.api_base.clone(),
            loaded_settings: settings.clone(),
            settings,
            api_base_override: None,
            predictor: None,
            events_tx,
            events_rx,
            preview_texture: None,
            panel: Panel::Classify,
            status: startup_warning.unwrap_or_default(),
            app_version: env!("CLASSIFIER_VERSION"),
        };
        match persisted.api_base {
            Some(base) => app.set_api_base(base),
            None => app.rebuild_predictor(),
        }
        app
    }

    fn rebuild_predictor(&mut self) {
        match HttpPredictor::new(&self.settings) {
            Ok(predictor) => {
                tracing::info!("Using prediction endpoint {}", predictor.url());
                self.predictor = Some(Arc::new(predictor));
            }
            Err(e) => {
                tracing::error!("Cannot build HTTP client: {e}");
                self.predictor = None;
                self.status = format!("Cannot build HTTP client: {e}");
            }
        }
    }

    /// Overrides the endpoint base for this and later sessions.
    pub(crate) fn set_api_base(&mut self, base: String) {
        self.settings.api_base = base.clone();
        self.api_base_input = base.clone();
        self.api_base_override = Some(base);
        self.rebuild_predictor();
    }

    pub(crate) fn reset_api_base(&mut self) {
        self.settings = self.loaded_settings.clone();
        self.api_base_input = self.settings.api_base.clone();
        self.api_base_override = None;
        self.rebuild_predictor();
    }

    fn poll_worker_events(&mut self) {
        while let Ok(event) = self.events_rx.try_recv() {
            match event {
                WorkerEvent::PreviewReady { selection, preview } => {
                    self.controller.apply_preview(selection, preview);
                }
                WorkerEvent::PredictFinished { ticket, result } => {
                    self.controller.finish_predict(ticket, result);
                }
            }
        }
    }

    /// Mirrors OS drag hover into the controller and takes the first dropped file.
    fn handle_file_drag(&mut self, ctx: &egui::Context) {
        let (hovering, dropped) = ctx.input(|i| {
            (
                !i.raw.hovered_files.is_empty(),
                i.raw.dropped_files.first().cloned(),
            )
        });
        if hovering != self.controller.is_dragging() {
            self.controller.set_dragging(hovering);
        }
        let Some(dropped) = dropped else {
            return;
        };
        match image_from_dropped(&dropped) {
            Ok(file) => {
                let job = self.controller.drop_files(file);
                self.start_preview(ctx, job);
            }
            Err(e) => {
                tracing::warn!("Cannot read dropped file {}: {e:#}", dropped.name);
                self.controller.set_dragging(false);
            }
        }
    }

    pub(crate) fn pick_file(&mut self, ctx: &egui::Context) {
        let Some(path) = FileDialog::new()
            .add_filter("Images", PICKER_EXTENSIONS)
            .pick_file()
        else {
            return;
        };
        match ImageFile::open_image(&path) {
            Ok(Some(file)) => {
                let job = self.controller.select_file(file);
                self.start_preview(ctx, job);
            }
            Ok(None) => {
                self.status = format!("{} is not an image.", path.display());
            }
            Err(e) => {
                tracing::warn!("{e:#}");
                self.status = format!("Cannot open {}: {e}", path.display());
            }
        }
    }

    fn start_preview(&mut self, ctx: &egui::Context, job: Option<PreviewJob>) {
        let Some(job) = job else {
            return;
        };
        self.status.clear();
        self.preview_texture = None;
        if let Err(e) = worker::spawn_preview(job, self.events_tx.clone(), ctx.clone()) {
            tracing::error!("Failed to start preview worker: {e}");
        }
    }

    pub(crate) fn start_predict(&mut self, ctx: &egui::Context) {
        let Some(predictor) = self.predictor.clone() else {
            self.status = "No prediction client available; check the settings.".to_string();
            return;
        };
        let Some(job) = self.controller.begin_predict() else {
            return;
        };
        let ticket = job.ticket;
        if let Err(e) = worker::spawn_predict(job, predictor, self.events_tx.clone(), ctx.clone()) {
            tracing::error!("Failed to start predict worker: {e}");
            self.controller.finish_predict(
                ticket,
                Err(PredictError::Transport(format!("cannot start request: {e}"))),
            );
        }
    }

    /// Texture for the current preview, uploaded on first use.
    pub(crate) fn preview_texture(&mut self, ctx: &egui::Context) -> Option<egui::TextureHandle> {
        let selection = self.controller.selection();
        if let Some((id, tex)) = &self.preview_texture {
            if *id == selection {
                return Some(tex.clone());
            }
        }
        let image = self.controller.preview()?.image.as_ref()?;
        let size = [image.width, image.height];
        let color = egui::ColorImage::from_rgba_unmultiplied(size, &image.rgba);
        let tex = ctx.load_texture(
            format!("preview:{selection}"),
            color,
            egui::TextureOptions::LINEAR,
        );
        self.preview_texture = Some((selection, tex.clone()));
        Some(tex)
    }

    fn render_header(&mut self, ui: &mut egui::Ui) {
        ui.add_space(6.0);
        ui.horizontal(|ui| {
            ui.label(egui::RichText::new("🧠").size(24.0).color(ACCENT));
            ui.vertical(|ui| {
                ui.label(egui::RichText::new("CIFAR-10 Classifier").strong().size(16.0));
                ui.label(egui::RichText::new("Powered by CNN").small().weak());
            });
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.label(egui::RichText::new("✨ AI Model").small().color(ACCENT));
                ui.separator();
                ui.selectable_value(&mut self.panel, Panel::Settings, "Settings");
                ui.selectable_value(&mut self.panel, Panel::Classify, "Classify");
            });
        });
        ui.add_space(6.0);
    }
}

impl App for UiApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut Frame) {
        self.poll_worker_events();
        self.handle_file_drag(ctx);

        egui::TopBottomPanel::top("header").show(ctx, |ui| self.render_header(ui));

        if !self.status.is_empty() {
            egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
                ui.label(&self.status);
            });
        }

        let panel = self.panel;
        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical()
                .auto_shrink([false; 2])
                .show(ui, |ui| match panel {
                    Panel::Classify => self.render_classify_panel(ui),
                    Panel::Settings => self.render_settings_panel(ui),
                });
        });
    }

    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        let persisted = PersistedSettings {
            api_base: self.api_base_override.clone(),
        };
        match serde_json::to_string(&persisted) {
            Ok(text) => storage.set_string(SETTINGS_STORAGE_KEY, text),
            Err(e) => tracing::warn!("Failed to persist settings: {e}"),
        }
    }
}

/// Builds an [`ImageFile`] from a drop payload.
///
/// Uses in-memory bytes when the platform provides them, otherwise reads the
/// path. An empty declared media type is guessed from the file name. A path
/// whose extension is not an image yields `Ok(None)` and is never read.
fn image_from_dropped(dropped: &egui::DroppedFile) -> Result<Option<ImageFile>> {
    if let Some(bytes) = &dropped.bytes {
        let media_type = if dropped.mime.is_empty() {
            media_type_for(Path::new(&dropped.name))
        } else {
            dropped.mime.clone()
        };
        return Ok(Some(ImageFile::new(
            dropped.name.clone(),
            media_type,
            bytes.clone(),
        )));
    }
    match &dropped.path {
        Some(path) => ImageFile::open_image(path),
        None => Err(anyhow!("drop payload has neither bytes nor a path")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::fs;
    use tempfile::tempdir;

    fn dropped(name: &str, mime: &str, bytes: Option<&[u8]>) -> egui::DroppedFile {
        egui::DroppedFile {
            name: name.to_string(),
            mime: mime.to_string(),
            bytes: bytes.map(Arc::from),
            ..Default::default()
        }
    }

    #[rstest]
    #[case("cat.png", "image/png", "image/png")]
    #[case("cat.jpg", "", "image/jpeg")]
    #[case("readme.txt", "", "text/plain")]
    #[case("weird.bin", "image/webp", "image/webp")]
    fn dropped_bytes_keep_or_guess_media_type(
        #[case] name: &str,
        #[case] mime: &str,
        #[case] expected: &str,
    ) -> Result<()> {
        let file = image_from_dropped(&dropped(name, mime, Some(b"abc")))?.expect("bytes kept");
        assert_eq!(file.name(), name);
        assert_eq!(file.media_type(), expected);
        assert_eq!(file.bytes(), b"abc");
        Ok(())
    }

    #[test]
    fn dropped_path_is_read_from_disk() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("ship.jpeg");
        fs::write(&path, [1u8, 2, 3])?;
        let payload = egui::DroppedFile {
            path: Some(path),
            name: "ship.jpeg".into(),
            ..Default::default()
        };
        let file = image_from_dropped(&payload)?.expect("image read");
        assert_eq!(file.media_type(), "image/jpeg");
        assert_eq!(file.bytes(), &[1u8, 2, 3]);
        Ok(())
    }

    #[test]
    fn dropped_non_image_path_is_not_read() -> Result<()> {
        let dir = tempdir()?;
        // Does not exist, so reading it would be an error.
        let payload = egui::DroppedFile {
            path: Some(dir.path().join("movie.mp4")),
            name: "movie.mp4".into(),
            ..Default::default()
        };
        assert!(image_from_dropped(&payload)?.is_none());

        let mut controller = UploadController::new();
        controller.set_dragging(true);
        assert!(controller.drop_files(image_from_dropped(&payload)?).is_none());
        assert!(!controller.is_dragging());
        assert!(controller.selected().is_none());
        Ok(())
    }

    #[test]
    fn empty_drop_payload_is_an_error() {
        assert!(image_from_dropped(&dropped("nothing", "", None)).is_err());
    }

    #[test]
    fn persisted_settings_round_trip_through_json() {
        let text = serde_json::to_string(&PersistedSettings {
            api_base: Some("http://gpu-box:5000".into()),
        })
        .unwrap();
        let back: PersistedSettings = serde_json::from_str(&text).unwrap();
        assert_eq!(back.api_base.as_deref(), Some("http://gpu-box:5000"));

        let empty: PersistedSettings = serde_json::from_str("{}").unwrap();
        assert_eq!(empty, PersistedSettings::default());
    }
}
