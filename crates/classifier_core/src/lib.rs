//! Core of the CIFAR-10 classifier client: upload state, endpoint client and settings.

pub mod category;
pub mod client;
pub mod config;
pub mod error;
pub mod image_file;
pub mod upload;

pub use category::Category;
pub use client::{FILE_FIELD, HttpPredictor, Prediction, Predictor, interpret_response};
pub use config::{Settings, load_settings};
pub use error::{PredictError, UNEXPECTED_RESPONSE};
pub use image_file::{ImageFile, Preview, PreviewImage, media_type_for};
pub use upload::{Outcome, Phase, PredictJob, PredictTicket, PreviewJob, UploadController};
