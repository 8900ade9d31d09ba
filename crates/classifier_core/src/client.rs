//! HTTP client for the remote prediction endpoint.

use crate::category::Category;
use crate::config::Settings;
use crate::error::PredictError;
use crate::image_file::ImageFile;
use reqwest::blocking::{Client, multipart};
use serde_json::Value;

/// Multipart field carrying the image bytes.
pub const FILE_FIELD: &str = "file";

/// Label returned by the endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prediction {
    pub label: String,
    /// Set when the label is one of the ten known categories.
    pub category: Option<Category>,
}

impl Prediction {
    pub fn new(label: impl Into<String>) -> Self {
        let label = label.into();
        let category = Category::from_label(&label);
        Self { label, category }
    }
}

/// Something that turns an image into a label.
pub trait Predictor: Send + Sync {
    fn predict(&self, image: &ImageFile) -> Result<Prediction, PredictError>;
}

/// Blocking multipart client for `POST {base}/predict`.
pub struct HttpPredictor {
    client: Client,
    url: String,
}

impl HttpPredictor {
    pub fn new(settings: &Settings) -> Result<Self, PredictError> {
        // The blocking builder applies 30 s unless told otherwise; `None` disables it.
        let client = Client::builder().timeout(settings.timeout()).build()?;
        Ok(Self {
            client,
            url: settings.predict_url(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Predictor for HttpPredictor {
    fn predict(&self, image: &ImageFile) -> Result<Prediction, PredictError> {
        let part = multipart::Part::bytes(image.bytes().to_vec())
            .file_name(image.name().to_string())
            .mime_str(image.media_type())?;
        let form = multipart::Form::new().part(FILE_FIELD, part);

        tracing::info!(
            "Uploading {} ({} bytes) to {}",
            image.name(),
            image.bytes().len(),
            self.url
        );
        let response = self.client.post(&self.url).multipart(form).send()?;
        let status = response.status();
        let body = response.text()?;
        tracing::debug!("Prediction response {status}: {body}");
        interpret_response(status.is_success(), &body)
    }
}

/// Maps a response body to a prediction or the error to show.
///
/// A truthy `error` wins over `prediction`; a `prediction` only counts on a
/// success status.
pub fn interpret_response(success: bool, body: &str) -> Result<Prediction, PredictError> {
    let data: Value = serde_json::from_str(body)?;

    if let Some(err) = data.get("error").filter(|v| is_truthy(v)) {
        return Err(PredictError::Server(value_text(err)));
    }
    match data.get("prediction").filter(|v| is_truthy(v)) {
        Some(label) if success => Ok(Prediction::new(value_text(label))),
        _ => Err(PredictError::UnexpectedResponse),
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::UNEXPECTED_RESPONSE;
    use crate::image_file::tests::png_bytes;
    use axum::extract::Multipart;
    use axum::http::StatusCode;
    use axum::routing::post;
    use axum::{Json, Router};
    use rstest::rstest;
    use serde_json::json;
    use std::net::TcpListener as StdListener;
    use std::sync::mpsc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn prediction_body_yields_label() {
        let p = interpret_response(true, r#"{"prediction": "cat"}"#).unwrap();
        assert_eq!(p.label, "cat");
        assert_eq!(p.category, Some(Category::Cat));
    }

    #[test]
    fn error_body_yields_server_error() {
        let err = interpret_response(false, r#"{"error": "bad image"}"#).unwrap_err();
        assert_eq!(err, PredictError::Server("bad image".into()));
        assert_eq!(err.to_string(), "bad image");
    }

    #[test]
    fn error_field_wins_over_prediction() {
        let err =
            interpret_response(true, r#"{"prediction": "cat", "error": "model busy"}"#).unwrap_err();
        assert_eq!(err.to_string(), "model busy");
    }

    #[rstest]
    #[case(r#"{}"#)]
    #[case(r#"{"prediction": ""}"#)]
    #[case(r#"{"prediction": null, "error": false}"#)]
    #[case(r#"{"error": 0}"#)]
    #[case(r#"[1, 2]"#)]
    #[case(r#""cat""#)]
    fn shapeless_bodies_yield_generic_error(#[case] body: &str) {
        let err = interpret_response(true, body).unwrap_err();
        assert_eq!(err, PredictError::UnexpectedResponse);
        assert_eq!(err.to_string(), UNEXPECTED_RESPONSE);
    }

    #[test]
    fn prediction_on_failure_status_is_unexpected() {
        let err = interpret_response(false, r#"{"prediction": "dog"}"#).unwrap_err();
        assert_eq!(err, PredictError::UnexpectedResponse);
    }

    #[test]
    fn non_string_error_is_rendered_as_json() {
        let err = interpret_response(true, r#"{"error": {"code": 413}}"#).unwrap_err();
        assert_eq!(err.to_string(), r#"{"code":413}"#);
    }

    #[test]
    fn unknown_label_is_kept_without_category() {
        let p = interpret_response(true, r#"{"prediction": "unicorn"}"#).unwrap();
        assert_eq!(p.label, "unicorn");
        assert_eq!(p.category, None);
    }

    #[test]
    fn html_body_is_invalid_json() {
        let err = interpret_response(false, "<html>502 Bad Gateway</html>").unwrap_err();
        assert!(matches!(err, PredictError::InvalidJson(ref m) if !m.is_empty()));
    }

    /// Serves `router` on an ephemeral port from a background runtime.
    fn spawn_server(router: Router) -> String {
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .expect("runtime");
            runtime.block_on(async move {
                let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
                    .await
                    .expect("bind");
                tx.send(listener.local_addr().expect("addr")).expect("send addr");
                axum::serve(listener, router).await.expect("serve");
            });
        });
        format!("http://{}", rx.recv().expect("server address"))
    }

    fn settings_for(base: String) -> Settings {
        Settings {
            api_base: base,
            ..Settings::default()
        }
    }

    /// Echoes what it received so the test can check the multipart layout.
    async fn echo_upload(mut multipart: Multipart) -> (StatusCode, Json<Value>) {
        while let Ok(Some(field)) = multipart.next_field().await {
            if field.name() == Some(FILE_FIELD) {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let content_type = field.content_type().unwrap_or_default().to_string();
                let bytes = field.bytes().await.unwrap_or_default();
                if bytes.is_empty() {
                    break;
                }
                let label = format!("{file_name}|{content_type}|{}", bytes.len());
                return (StatusCode::OK, Json(json!({ "prediction": label })));
            }
        }
        (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "No file uploaded" })),
        )
    }

    #[test]
    fn uploads_image_under_file_field() {
        let base = spawn_server(Router::new().route("/predict", post(echo_upload)));
        let predictor = HttpPredictor::new(&settings_for(base)).unwrap();
        let bytes = png_bytes(4, 4);
        let image = ImageFile::new("kitten.png", "image/png", bytes.clone());

        let p = predictor.predict(&image).unwrap();
        assert_eq!(p.label, format!("kitten.png|image/png|{}", bytes.len()));
    }

    #[test]
    fn server_error_is_reported_verbatim() {
        let router = Router::new().route(
            "/predict",
            post(|| async {
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    Json(json!({ "error": "bad image" })),
                )
            }),
        );
        let predictor = HttpPredictor::new(&settings_for(spawn_server(router))).unwrap();
        let image = ImageFile::new("x.png", "image/png", png_bytes(1, 1));
        let err = predictor.predict(&image).unwrap_err();
        assert_eq!(err, PredictError::Server("bad image".into()));
    }

    #[test]
    fn respects_trailing_slash_in_base() {
        let router = Router::new().route(
            "/predict",
            post(|| async { Json(json!({ "prediction": "ship" })) }),
        );
        let base = format!("{}/", spawn_server(router));
        let predictor = HttpPredictor::new(&settings_for(base)).unwrap();
        let image = ImageFile::new("boat.jpg", "image/jpeg", vec![1, 2, 3]);
        let p = predictor.predict(&image).unwrap();
        assert_eq!(p.category, Some(Category::Ship));
    }

    fn slow_router(delay: Duration) -> Router {
        Router::new().route(
            "/predict",
            post(move || async move {
                tokio::time::sleep(delay).await;
                Json(json!({ "prediction": "deer" }))
            }),
        )
    }

    #[test]
    fn explicit_timeout_cuts_off_slow_service() {
        let base = spawn_server(slow_router(Duration::from_secs(3)));
        let settings = Settings {
            timeout_secs: Some(1),
            ..settings_for(base)
        };
        let predictor = HttpPredictor::new(&settings).unwrap();
        let image = ImageFile::new("x.png", "image/png", png_bytes(1, 1));
        let err = predictor.predict(&image).unwrap_err();
        assert!(matches!(err, PredictError::Transport(_)));
    }

    #[test]
    fn default_settings_wait_past_transport_default_timeout() {
        let base = spawn_server(slow_router(Duration::from_secs(32)));
        let predictor = HttpPredictor::new(&settings_for(base)).unwrap();
        let image = ImageFile::new("x.png", "image/png", png_bytes(1, 1));
        let p = predictor.predict(&image).unwrap();
        assert_eq!(p.category, Some(Category::Deer));
    }

    #[test]
    fn connection_refused_is_a_transport_error() {
        let port = {
            let listener = StdListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let predictor =
            HttpPredictor::new(&settings_for(format!("http://127.0.0.1:{port}"))).unwrap();
        let image = ImageFile::new("x.png", "image/png", png_bytes(1, 1));
        let err = predictor.predict(&image).unwrap_err();
        assert!(matches!(err, PredictError::Transport(_)));
        assert!(!err.to_string().is_empty());
    }
}
