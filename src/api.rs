//! HTTP surface for the message service.
//!
//! - `GET /` – Raw JSON of the latest posted message.
//! - `POST /post` – Record an assistant message with an optional image URL.
//! - `POST /text` – Record a user message.
//! - `GET /logs` – Every message log line, parsed into records.
//! - `GET /metrics` – Message counters since startup.
//!
//! Error bodies are the fixed strings existing clients already expect.

use crate::metrics::MetricsSnapshot;
use crate::records::{PlainMessage, PostedMessage, Record, RecordApi, RecordError};
use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Serialize, de::DeserializeOwned};
use std::sync::Arc;

/// Build the HTTP router exposing the message API surface.
pub fn create_router<S>(service: Arc<S>) -> Router
where
    S: RecordApi + 'static,
{
    Router::new()
        .route("/", get(get_latest::<S>))
        .route("/post", post(post_message::<S>))
        .route("/text", post(post_text::<S>))
        .route("/logs", get(get_logs::<S>))
        .route("/metrics", get(get_metrics::<S>))
        .with_state(service)
}

/// Response body for `POST /post`.
#[derive(Serialize)]
struct PostResponse {
    message: String,
    #[serde(rename = "imageURL")]
    image_url: String,
}

/// Response body for `POST /text`.
#[derive(Serialize)]
struct TextResponse {
    message: String,
}

/// Serve the latest-message slot verbatim.
async fn get_latest<S>(State(service): State<Arc<S>>) -> Result<Response, AppError>
where
    S: RecordApi,
{
    let body = service.load_latest().await?;
    Ok(([(header::CONTENT_TYPE, "application/json")], body).into_response())
}

/// Record an assistant message and echo it back.
async fn post_message<S>(
    State(service): State<Arc<S>>,
    body: Bytes,
) -> Result<Json<PostResponse>, AppError>
where
    S: RecordApi,
{
    let message: PostedMessage = decode_payload(&body)?;
    let response = PostResponse {
        message: format!("Mensagem recebida: {}", message.message),
        image_url: message.image_url.clone(),
    };
    service.record_assistant_message(message).await?;
    Ok(Json(response))
}

/// Record a user message and answer with the templated acknowledgement.
async fn post_text<S>(
    State(service): State<Arc<S>>,
    body: Bytes,
) -> Result<Json<TextResponse>, AppError>
where
    S: RecordApi,
{
    let message: PlainMessage = decode_payload(&body)?;
    let response = TextResponse {
        message: format!(
            "Ele me respondeu com a frase {} , estou satisfeita com a interacao! ",
            message.message
        ),
    };
    service.record_user_message(message).await?;
    Ok(Json(response))
}

/// Decode a JSON body regardless of the request's `content-type`.
fn decode_payload<T: DeserializeOwned>(body: &Bytes) -> Result<T, AppError> {
    serde_json::from_slice(body).map_err(AppError::BadPayload)
}

async fn get_logs<S>(State(service): State<Arc<S>>) -> Result<Json<Vec<Record>>, AppError>
where
    S: RecordApi,
{
    Ok(Json(service.list_entries().await?))
}

async fn get_metrics<S>(State(service): State<Arc<S>>) -> Json<MetricsSnapshot>
where
    S: RecordApi,
{
    Json(service.metrics_snapshot())
}

enum AppError {
    BadPayload(serde_json::Error),
    Record(RecordError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            Self::BadPayload(err) => {
                tracing::debug!(error = %err, "Rejected request payload");
                (StatusCode::BAD_REQUEST, "Erro ao processar JSON").into_response()
            }
            Self::Record(err) => {
                tracing::error!(error = %err, "Record operation failed");
                let body = match err {
                    RecordError::SaveLatest(_) => "Erro ao salvar dados",
                    RecordError::AppendLog(_) => "Erro ao salvar no log",
                    RecordError::LoadLatest(_) => "Erro ao carregar dados",
                    RecordError::ReadLog(_) => "Erro ao carregar logs",
                };
                (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
            }
        }
    }
}

impl From<RecordError> for AppError {
    fn from(inner: RecordError) -> Self {
        Self::Record(inner)
    }
}

#[cfg(test)]
mod tests {
    use super::create_router;
    use crate::metrics::{MetricsSnapshot, RecordMetrics};
    use crate::records::{
        PlainMessage, PostedMessage, Record, RecordApi, RecordError, StoreError,
    };
    use async_trait::async_trait;
    use axum::{
        body::{Body, to_bytes},
        http::{Method, Request, Response, StatusCode},
    };
    use serde_json::json;
    use std::sync::Arc;
    use tokio::sync::Mutex;
    use tower::ServiceExt;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Assistant(PostedMessage),
        User(PlainMessage),
    }

    #[derive(Default)]
    struct StubRecordService {
        calls: Mutex<Vec<Call>>,
        entries: Vec<Record>,
        latest: Option<Vec<u8>>,
        fail_append: bool,
        fail_save: bool,
        metrics: RecordMetrics,
    }

    impl StubRecordService {
        async fn recorded_calls(&self) -> Vec<Call> {
            self.calls.lock().await.clone()
        }
    }

    fn store_failure() -> StoreError {
        StoreError::Io {
            path: "stub".into(),
            source: std::io::Error::other("stub failure"),
        }
    }

    #[async_trait]
    impl RecordApi for StubRecordService {
        async fn record_assistant_message(
            &self,
            message: PostedMessage,
        ) -> Result<(), RecordError> {
            if self.fail_save {
                return Err(RecordError::SaveLatest(store_failure()));
            }
            if self.fail_append {
                return Err(RecordError::AppendLog(store_failure()));
            }
            self.calls.lock().await.push(Call::Assistant(message));
            Ok(())
        }

        async fn record_user_message(&self, message: PlainMessage) -> Result<(), RecordError> {
            if self.fail_append {
                return Err(RecordError::AppendLog(store_failure()));
            }
            self.calls.lock().await.push(Call::User(message));
            Ok(())
        }

        async fn list_entries(&self) -> Result<Vec<Record>, RecordError> {
            Ok(self.entries.clone())
        }

        async fn load_latest(&self) -> Result<Vec<u8>, RecordError> {
            self.latest
                .clone()
                .ok_or_else(|| RecordError::LoadLatest(store_failure()))
        }

        fn metrics_snapshot(&self) -> MetricsSnapshot {
            self.metrics.snapshot()
        }
    }

    async fn send(
        service: Arc<StubRecordService>,
        method: Method,
        uri: &str,
        body: Option<&str>,
    ) -> Response<Body> {
        let content_type = body.map(|_| "application/json");
        send_with_content_type(service, method, uri, body, content_type).await
    }

    async fn send_with_content_type(
        service: Arc<StubRecordService>,
        method: Method,
        uri: &str,
        body: Option<&str>,
        content_type: Option<&str>,
    ) -> Response<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(content_type) = content_type {
            builder = builder.header("content-type", content_type);
        }
        let request = builder
            .body(body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty))
            .expect("request");
        create_router(service)
            .oneshot(request)
            .await
            .expect("router response")
    }

    async fn body_text(response: Response<Body>) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        String::from_utf8(bytes.to_vec()).expect("utf8 body")
    }

    #[tokio::test]
    async fn post_route_records_assistant_message() {
        let service = Arc::new(StubRecordService::default());
        let payload = json!({"image_url": "http://x/y.png", "message": "hi"}).to_string();

        let response = send(service.clone(), Method::POST, "/post", Some(&payload)).await;

        assert_eq!(response.status(), StatusCode::OK);
        let json: serde_json::Value =
            serde_json::from_str(&body_text(response).await).expect("json body");
        assert_eq!(
            json,
            json!({"message": "Mensagem recebida: hi", "imageURL": "http://x/y.png"})
        );
        assert_eq!(
            service.recorded_calls().await,
            vec![Call::Assistant(PostedMessage {
                image_url: "http://x/y.png".into(),
                message: "hi".into(),
            })]
        );
    }

    #[tokio::test]
    async fn text_route_returns_acknowledgement() {
        let service = Arc::new(StubRecordService::default());
        let payload = json!({"message": "ok"}).to_string();

        let response = send(service.clone(), Method::POST, "/text", Some(&payload)).await;

        assert_eq!(response.status(), StatusCode::OK);
        let json: serde_json::Value =
            serde_json::from_str(&body_text(response).await).expect("json body");
        assert_eq!(
            json["message"],
            "Ele me respondeu com a frase ok , estou satisfeita com a interacao! "
        );
        assert_eq!(
            service.recorded_calls().await,
            vec![Call::User(PlainMessage {
                message: "ok".into()
            })]
        );
    }

    #[tokio::test]
    async fn malformed_payload_is_rejected_before_the_service() {
        let service = Arc::new(StubRecordService::default());

        let response = send(service.clone(), Method::POST, "/text", Some("{not json")).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_text(response).await, "Erro ao processar JSON");
        assert!(service.recorded_calls().await.is_empty());
    }

    #[tokio::test]
    async fn json_body_is_accepted_whatever_the_content_type() {
        let service = Arc::new(StubRecordService::default());
        let payload = json!({"message": "ok"}).to_string();

        let form = send_with_content_type(
            service.clone(),
            Method::POST,
            "/text",
            Some(&payload),
            Some("application/x-www-form-urlencoded"),
        )
        .await;
        assert_eq!(form.status(), StatusCode::OK);

        let bare =
            send_with_content_type(service.clone(), Method::POST, "/post", Some(&payload), None)
                .await;
        assert_eq!(bare.status(), StatusCode::OK);

        assert_eq!(
            service.recorded_calls().await,
            vec![
                Call::User(PlainMessage {
                    message: "ok".into()
                }),
                Call::Assistant(PostedMessage {
                    image_url: String::new(),
                    message: "ok".into(),
                }),
            ]
        );
    }

    #[tokio::test]
    async fn null_fields_are_read_as_empty_strings() {
        let service = Arc::new(StubRecordService::default());
        let payload = json!({"image_url": null, "message": null}).to_string();

        let response = send(service.clone(), Method::POST, "/post", Some(&payload)).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            service.recorded_calls().await,
            vec![Call::Assistant(PostedMessage::default())]
        );
    }

    #[tokio::test]
    async fn slot_save_failure_maps_to_server_error() {
        let service = Arc::new(StubRecordService {
            fail_save: true,
            ..Default::default()
        });
        let payload = json!({"image_url": "http://x/y.png", "message": "hi"}).to_string();

        let response = send(service.clone(), Method::POST, "/post", Some(&payload)).await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_text(response).await, "Erro ao salvar dados");
        assert!(service.recorded_calls().await.is_empty());
    }

    #[tokio::test]
    async fn get_on_post_route_is_not_allowed() {
        let service = Arc::new(StubRecordService::default());

        let response = send(service, Method::GET, "/post", None).await;

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn append_failure_maps_to_server_error() {
        let service = Arc::new(StubRecordService {
            fail_append: true,
            ..Default::default()
        });
        let payload = json!({"message": "ok"}).to_string();

        let response = send(service, Method::POST, "/text", Some(&payload)).await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_text(response).await, "Erro ao salvar no log");
    }

    #[tokio::test]
    async fn root_passes_latest_message_through() {
        let raw = br#"{"image_url":"","message":"hi"}"#.to_vec();
        let service = Arc::new(StubRecordService {
            latest: Some(raw.clone()),
            ..Default::default()
        });

        let response = send(service, Method::GET, "/", None).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()["content-type"],
            "application/json"
        );
        assert_eq!(body_text(response).await.as_bytes(), raw.as_slice());
    }

    #[tokio::test]
    async fn root_without_latest_message_fails() {
        let service = Arc::new(StubRecordService::default());

        let response = send(service, Method::GET, "/", None).await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_text(response).await, "Erro ao carregar dados");
    }

    #[tokio::test]
    async fn logs_route_serializes_records() {
        let service = Arc::new(StubRecordService {
            entries: vec![
                Record::new("2024-05-01 14:03:22", "Usuário", "ok", None),
                Record::new(
                    "2024-05-01 14:03:23",
                    "Assistente",
                    "hi",
                    Some("http://x/y.png".into()),
                ),
            ],
            ..Default::default()
        });

        let response = send(service, Method::GET, "/logs", None).await;

        assert_eq!(response.status(), StatusCode::OK);
        let json: serde_json::Value =
            serde_json::from_str(&body_text(response).await).expect("json body");
        assert_eq!(
            json,
            json!([
                {"timestamp": "2024-05-01 14:03:22", "source": "Usuário", "message": "ok"},
                {
                    "timestamp": "2024-05-01 14:03:23",
                    "source": "Assistente",
                    "message": "hi",
                    "image_url": "http://x/y.png"
                }
            ])
        );
    }

    #[tokio::test]
    async fn metrics_route_reports_counters() {
        let service = Arc::new(StubRecordService::default());
        service.metrics.record_user_message();

        let response = send(service, Method::GET, "/metrics", None).await;

        let json: serde_json::Value =
            serde_json::from_str(&body_text(response).await).expect("json body");
        assert_eq!(json["user_messages"], 1);
        assert_eq!(json["assistant_messages"], 0);
    }
}
