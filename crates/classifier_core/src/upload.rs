//! Upload controller: file selection, preview bookkeeping and the predict lifecycle.
//!
//! The controller never does I/O itself. Selecting a file hands back a
//! [`PreviewJob`] and starting a prediction hands back a [`PredictJob`]; the
//! caller runs them wherever it likes and feeds the results back through
//! [`UploadController::apply_preview`] and [`UploadController::finish_predict`].

use crate::client::{Prediction, Predictor};
use crate::error::PredictError;
use crate::image_file::{ImageFile, Preview};

/// Result/error slot. Only one of the two can be set at a time.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Outcome {
    #[default]
    Idle,
    Predicting,
    Succeeded(Prediction),
    Failed(String),
}

/// Coarse view of where the upload cycle stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Empty,
    FileSelected,
    Predicting,
    Succeeded,
    Failed,
}

/// Identifies one predict request and the selection it was made for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PredictTicket {
    request: u64,
    selection: u64,
}

/// Preview work for the selection numbered `selection`.
#[derive(Debug, Clone)]
pub struct PreviewJob {
    pub selection: u64,
    pub image: ImageFile,
}

impl PreviewJob {
    pub fn run(&self) -> Preview {
        Preview::generate(&self.image)
    }
}

/// A dispatched prediction request.
#[derive(Debug, Clone)]
pub struct PredictJob {
    pub ticket: PredictTicket,
    pub image: ImageFile,
}

impl PredictJob {
    pub fn run(&self, predictor: &dyn Predictor) -> Result<Prediction, PredictError> {
        predictor.predict(&self.image)
    }
}

#[derive(Debug, Default)]
pub struct UploadController {
    selected: Option<ImageFile>,
    /// Bumped on every accepted selection.
    selection: u64,
    preview: Option<Preview>,
    dragging: bool,
    outcome: Outcome,
    in_flight: Option<PredictTicket>,
    next_request: u64,
}

impl UploadController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self) -> Option<&ImageFile> {
        self.selected.as_ref()
    }

    pub fn preview(&self) -> Option<&Preview> {
        self.preview.as_ref()
    }

    /// Current selection number; changes whenever a new image is accepted.
    pub fn selection(&self) -> u64 {
        self.selection
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn outcome(&self) -> &Outcome {
        &self.outcome
    }

    pub fn prediction(&self) -> Option<&Prediction> {
        match &self.outcome {
            Outcome::Succeeded(p) => Some(p),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.outcome {
            Outcome::Failed(msg) => Some(msg),
            _ => None,
        }
    }

    /// True while a request is out, even if the selection changed since.
    pub fn is_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn can_predict(&self) -> bool {
        self.selected.is_some() && self.in_flight.is_none()
    }

    pub fn phase(&self) -> Phase {
        match (&self.selected, &self.outcome) {
            (None, _) => Phase::Empty,
            (Some(_), Outcome::Idle) => Phase::FileSelected,
            (Some(_), Outcome::Predicting) => Phase::Predicting,
            (Some(_), Outcome::Succeeded(_)) => Phase::Succeeded,
            (Some(_), Outcome::Failed(_)) => Phase::Failed,
        }
    }

    /// Accepts `file` if it declares an image media type.
    ///
    /// Non-images leave every piece of state untouched and return `None`.
    pub fn select_file(&mut self, file: ImageFile) -> Option<PreviewJob> {
        if !file.is_image() {
            tracing::debug!(
                "Ignoring {} with media type {:?}",
                file.name(),
                file.media_type()
            );
            return None;
        }
        self.selection += 1;
        self.outcome = Outcome::Idle;
        self.preview = None;
        self.selected = Some(file.clone());
        tracing::info!("Selected {} ({})", file.name(), file.media_type());
        Some(PreviewJob {
            selection: self.selection,
            image: file,
        })
    }

    pub fn set_dragging(&mut self, dragging: bool) {
        self.dragging = dragging;
    }

    /// Handles a drop payload: only the first file is considered.
    pub fn drop_files(&mut self, files: impl IntoIterator<Item = ImageFile>) -> Option<PreviewJob> {
        self.dragging = false;
        let first = files.into_iter().next()?;
        self.select_file(first)
    }

    /// Stores a finished preview unless a newer file has been selected since.
    pub fn apply_preview(&mut self, selection: u64, preview: Preview) -> bool {
        if selection != self.selection {
            tracing::debug!(
                "Discarding preview for selection {selection}, current is {}",
                self.selection
            );
            return false;
        }
        self.preview = Some(preview);
        true
    }

    /// Starts a prediction for the selected image.
    ///
    /// Returns `None` when nothing is selected or a request is already out.
    pub fn begin_predict(&mut self) -> Option<PredictJob> {
        if self.in_flight.is_some() {
            return None;
        }
        let image = self.selected.clone()?;
        self.next_request += 1;
        let ticket = PredictTicket {
            request: self.next_request,
            selection: self.selection,
        };
        self.in_flight = Some(ticket);
        self.outcome = Outcome::Predicting;
        tracing::info!("Predict request {} for {}", ticket.request, image.name());
        Some(PredictJob { ticket, image })
    }

    /// Records the result of the request identified by `ticket`.
    ///
    /// The in-flight flag is always released for the matching request. The
    /// outcome is only updated if the selection is still the one the request
    /// was made for. Returns whether the outcome changed.
    pub fn finish_predict(
        &mut self,
        ticket: PredictTicket,
        result: Result<Prediction, PredictError>,
    ) -> bool {
        if self.in_flight != Some(ticket) {
            tracing::warn!("Ignoring result for unknown request {}", ticket.request);
            return false;
        }
        self.in_flight = None;

        if ticket.selection != self.selection {
            tracing::debug!(
                "Discarding stale result for request {} (selection changed)",
                ticket.request
            );
            return false;
        }
        self.outcome = match result {
            Ok(prediction) => {
                tracing::info!("Predicted class: {}", prediction.label);
                Outcome::Succeeded(prediction)
            }
            Err(err) => {
                tracing::warn!("Prediction failed: {err}");
                Outcome::Failed(err.to_string())
            }
        };
        true
    }
}
