//! HTTP implementation of the backend contract
//!
//! Uses the hyper-util pooled client. Every exchange (send plus body read) is bounded by
//! the configured timeout; an expired timeout counts as a transport failure.

use std::time::{Duration, Instant};

use http_body_util::{BodyExt, Full};
use hyper::body::Bytes;
use hyper::{Method, Request, StatusCode};
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::models::{ErrorBody, GenerateRequest};
use super::{ClientError, Quiz, QuizBackend, QuizResult, QuizSubmission};
use crate::logger;

/// Backend client speaking plain HTTP/1.1 to `base_url`
pub struct HttpBackend {
    client: Client<HttpConnector, Full<Bytes>>,
    base_url: String,
    timeout: Duration,
}

impl HttpBackend {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        let client = Client::builder(TokioExecutor::new()).build_http();
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        }
    }

    /// Perform one exchange and return the status with the full body
    async fn call(
        &self,
        method: Method,
        path: &str,
        body: Option<Vec<u8>>,
    ) -> Result<(StatusCode, Bytes), ClientError> {
        let uri = format!("{}{path}", self.base_url);
        let started = Instant::now();

        let mut builder = Request::builder()
            .method(method.clone())
            .uri(&uri)
            .header("Accept", "application/json");
        let body = match body {
            Some(json) => {
                builder = builder.header("Content-Type", "application/json");
                Full::new(Bytes::from(json))
            }
            None => Full::new(Bytes::new()),
        };
        let request = builder
            .body(body)
            .map_err(|e| ClientError::Transport(format!("invalid backend request {uri}: {e}")))?;

        let exchange = async {
            let response = self
                .client
                .request(request)
                .await
                .map_err(|e| ClientError::Transport(describe(&e)))?;
            let status = response.status();
            let bytes = response
                .into_body()
                .collect()
                .await
                .map_err(|e| {
                    ClientError::Transport(format!("failed to read backend response: {e}"))
                })?
                .to_bytes();
            Ok((status, bytes))
        };

        let result = tokio::time::timeout(self.timeout, exchange)
            .await
            .unwrap_or_else(|_| {
                Err(ClientError::Transport(format!(
                    "backend did not answer within {} seconds",
                    self.timeout.as_secs()
                )))
            });

        match &result {
            Ok((status, _)) => {
                logger::log_backend_call(method.as_str(), path, &status.to_string(), started);
            }
            Err(e) => logger::log_backend_call(method.as_str(), path, &e.to_string(), started),
        }
        result
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let (status, body) = self.call(Method::GET, path, None).await?;
        decode_ok(status, &body)
    }

    async fn post_json<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        path: &str,
        payload: &B,
    ) -> Result<T, ClientError> {
        let json = serde_json::to_vec(payload)
            .map_err(|e| ClientError::Transport(format!("failed to encode request: {e}")))?;
        let (status, body) = self.call(Method::POST, path, Some(json)).await?;
        decode_ok(status, &body)
    }
}

impl QuizBackend for HttpBackend {
    async fn generate(&self, topic: &str, number_of_questions: u32) -> Result<Quiz, ClientError> {
        let request = GenerateRequest {
            topic,
            number_of_questions,
        };
        self.post_json("/api/quiz/generate", &request).await
    }

    async fn list(&self) -> Result<Vec<Quiz>, ClientError> {
        self.get_json("/api/quiz/list").await
    }

    async fn quiz(&self, id: i64) -> Result<Quiz, ClientError> {
        self.get_json(&format!("/api/quiz/{id}")).await
    }

    async fn results(&self, id: i64) -> Result<Vec<QuizResult>, ClientError> {
        self.get_json(&format!("/api/quiz/results/{id}")).await
    }

    async fn submit(&self, submission: &QuizSubmission) -> Result<QuizResult, ClientError> {
        self.post_json("/api/quiz/submit", submission).await
    }

    async fn delete(&self, id: i64) -> Result<(), ClientError> {
        let (status, body) = self
            .call(Method::DELETE, &format!("/api/quiz/{id}"), None)
            .await?;
        if status == StatusCode::OK {
            Ok(())
        } else {
            Err(backend_error(status, &body))
        }
    }
}

/// Decode a 200 body, anything else becomes a backend error
fn decode_ok<T: DeserializeOwned>(status: StatusCode, body: &[u8]) -> Result<T, ClientError> {
    if status != StatusCode::OK {
        return Err(backend_error(status, body));
    }
    serde_json::from_slice(body).map_err(|e| ClientError::Backend {
        status: StatusCode::BAD_GATEWAY.as_u16(),
        error: Some("Malformed backend response".to_string()),
        details: Some(e.to_string()),
    })
}

/// Pull `error`/`details` out of a failure body.
///
/// Accepts `{error, details}` objects, ASP.NET problem details (`title`), bare JSON
/// strings and plain text.
fn backend_error(status: StatusCode, body: &[u8]) -> ClientError {
    let (error, details) = match serde_json::from_slice::<serde_json::Value>(body) {
        Ok(serde_json::Value::String(text)) => (non_empty(&text), None),
        Ok(value @ serde_json::Value::Object(_)) => {
            let title = value
                .get("title")
                .and_then(serde_json::Value::as_str)
                .map(ToString::to_string);
            let parsed: ErrorBody = serde_json::from_value(value).unwrap_or_default();
            (parsed.error.or(title), parsed.details)
        }
        Ok(_) | Err(_) => (non_empty(&String::from_utf8_lossy(body)), None),
    };

    ClientError::Backend {
        status: status.as_u16(),
        error,
        details,
    }
}

fn non_empty(text: &str) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Flatten an error and its sources into one line
fn describe(err: &dyn std::error::Error) -> String {
    let mut text = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        text.push_str(": ");
        text.push_str(&cause.to_string());
        source = cause.source();
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::test_support::{spawn_backend, spawn_silent_backend};
    use tokio::net::TcpListener;

    #[test]
    fn test_backend_error_object() {
        let err = backend_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            br#"{"error":"boom","details":"stack"}"#,
        );
        assert_eq!(
            err,
            ClientError::Backend {
                status: 500,
                error: Some("boom".to_string()),
                details: Some("stack".to_string()),
            }
        );
    }

    #[test]
    fn test_backend_error_json_string() {
        let err = backend_error(StatusCode::BAD_REQUEST, br#""Topic is required""#);
        assert_eq!(err.preview().as_deref(), Some("Topic is required"));
    }

    #[test]
    fn test_backend_error_problem_details() {
        let err = backend_error(
            StatusCode::NOT_FOUND,
            br#"{"type":"https://tools.ietf.org/html/rfc9110","title":"Not Found","status":404}"#,
        );
        assert_eq!(err.preview().as_deref(), Some("Not Found"));
    }

    #[test]
    fn test_backend_error_empty_body() {
        let err = backend_error(StatusCode::NOT_FOUND, b"");
        assert_eq!(err.preview(), None);
    }

    #[test]
    fn test_decode_ok_rejects_malformed_body() {
        let result: Result<Quiz, ClientError> = decode_ok(StatusCode::OK, b"<html>");
        match result {
            Err(ClientError::Backend { status, .. }) => assert_eq!(status, 502),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_fetch_quiz_over_http() {
        let base = spawn_backend(200, r#"{"id":5,"topic":"Rust","questions":[]}"#).await;
        let backend = HttpBackend::new(&base, Duration::from_secs(5));
        let quiz = backend.quiz(5).await.unwrap();
        assert_eq!(quiz.id, 5);
        assert_eq!(quiz.topic, "Rust");
    }

    #[tokio::test]
    async fn test_delete_not_found_is_backend_error() {
        let base = spawn_backend(404, "").await;
        let backend = HttpBackend::new(&base, Duration::from_secs(5));
        let err = backend.delete(3).await.unwrap_err();
        assert!(!err.is_transport());
        assert!(matches!(err, ClientError::Backend { status: 404, .. }));
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport_error() {
        // Bind then drop to get a port with nothing listening
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let backend = HttpBackend::new(&format!("http://{addr}"), Duration::from_secs(5));
        let err = backend.list().await.unwrap_err();
        assert!(err.is_transport());
    }

    #[tokio::test]
    async fn test_silent_backend_times_out_as_transport_error() {
        let base = spawn_silent_backend().await;
        let backend = HttpBackend::new(&base, Duration::from_secs(1));

        let started = Instant::now();
        let err = backend.quiz(1).await.unwrap_err();
        assert!(err.is_transport());
        assert!(err.to_string().contains("within 1 seconds"));
        assert!(started.elapsed() < Duration::from_secs(5));
    }
}
