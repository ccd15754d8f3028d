// HTTP client for an Ollama-compatible generate endpoint

use async_trait::async_trait;
use reqwest::{Client, Url};
use std::time::Duration;

use super::types::{GenerateRequest, GenerateResponse};
use super::{Answer, InferenceBackend, InferenceError};
use crate::config::ModelConfig;

const GENERATE_PATH: &str = "api/generate";

pub struct OllamaClient {
    client: Client,
    endpoint: Url,
    model: String,
    timeout: Duration,
}

impl OllamaClient {
    /// Resolve the backend address and build the HTTP client.
    ///
    /// Fails if the address is not a valid URL, the model name is blank,
    /// or the client cannot be built. Nothing is sent over the network here.
    pub fn new(config: &ModelConfig) -> Result<Self, InferenceError> {
        let model = config.name.trim();
        if model.is_empty() {
            return Err(InferenceError::Startup("model name is empty".to_string()));
        }

        let base_url = config.base_url();
        let endpoint = Url::parse(&base_url)
            .and_then(|base| base.join(GENERATE_PATH))
            .map_err(|e| {
                InferenceError::Startup(format!("invalid backend address {base_url:?}: {e}"))
            })?;

        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(InferenceError::Startup(format!(
                "unsupported backend scheme {:?}",
                endpoint.scheme()
            )));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| {
                InferenceError::Startup(format!("failed to create HTTP client: {e}"))
            })?;

        tracing::info!(endpoint = %endpoint, model, "Inference client ready");

        Ok(Self {
            client,
            endpoint,
            model: model.to_string(),
            timeout: config.timeout,
        })
    }

    /// Full URL of the generate endpoint
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn request_error(&self, err: reqwest::Error) -> InferenceError {
        if err.is_timeout() {
            InferenceError::Unavailable(format!(
                "request timed out after {}s",
                self.timeout.as_secs_f32()
            ))
        } else if err.is_decode() {
            InferenceError::Unavailable(format!(
                "malformed backend response: {}",
                error_chain(&err)
            ))
        } else {
            InferenceError::Unavailable(error_chain(&err))
        }
    }
}

#[async_trait]
impl InferenceBackend for OllamaClient {
    async fn answer(&self, query: &str) -> Result<Answer, InferenceError> {
        let request = GenerateRequest::new(&self.model, query);
        tracing::debug!(model = %self.model, chars = query.len(), "Sending generate request");

        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&request)
            .send()
            .await
            .map_err(|e| self.request_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_else(|e| {
                tracing::debug!(error = %e, "Failed to read error body from backend");
                String::from("<unreadable body>")
            });
            return Err(InferenceError::Unavailable(format!(
                "backend returned {status}: {}",
                body.trim()
            )));
        }

        let body: GenerateResponse = response.json().await.map_err(|e| self.request_error(e))?;
        let answer = body.into_answer()?;

        if answer == Answer::Empty {
            tracing::debug!(model = %self.model, "Backend returned no candidate answer");
        }

        Ok(answer)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// Render an error with every `source()` below it, e.g.
/// "error sending request: connection refused".
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    fn config_for(server: &mockito::ServerGuard) -> ModelConfig {
        let host_with_port = server.host_with_port();
        let (host, port) = host_with_port.rsplit_once(':').unwrap();
        ModelConfig {
            host: host.to_string(),
            port: port.parse().unwrap(),
            name: "llama3.2".to_string(),
            timeout: Duration::from_secs(5),
        }
    }

    #[test]
    fn test_client_creation() {
        let client = OllamaClient::new(&ModelConfig::default()).unwrap();
        assert_eq!(client.endpoint().as_str(), "http://ollama:11434/api/generate");
        assert_eq!(client.model_name(), "llama3.2");
    }

    #[test]
    fn test_blank_model_name_fails_at_startup() {
        let config = ModelConfig {
            name: "  ".to_string(),
            ..Default::default()
        };
        let err = OllamaClient::new(&config).err().unwrap();
        assert!(matches!(err, InferenceError::Startup(_)));
    }

    #[test]
    fn test_invalid_host_fails_at_startup() {
        let config = ModelConfig {
            host: "not a host".to_string(),
            ..Default::default()
        };
        let err = OllamaClient::new(&config).err().unwrap();
        assert!(matches!(err, InferenceError::Startup(_)), "got: {err}");
    }

    #[tokio::test]
    async fn test_answer_returns_backend_text() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/generate")
            .match_body(Matcher::Json(json!({
                "model": "llama3.2",
                "prompt": "hello",
                "stream": false
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"model":"llama3.2","response":"hi there","done":true}"#)
            .create_async()
            .await;

        let client = OllamaClient::new(&config_for(&server)).unwrap();
        let answer = client.answer("hello").await.unwrap();

        assert_eq!(answer, Answer::Text("hi there".to_string()));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_blank_response_is_empty_result() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/generate")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"model":"llama3.2","response":"","done":true}"#)
            .create_async()
            .await;

        let client = OllamaClient::new(&config_for(&server)).unwrap();
        assert_eq!(client.answer("hello").await.unwrap(), Answer::Empty);
    }

    #[tokio::test]
    async fn test_error_status_is_unavailable() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/generate")
            .with_status(500)
            .with_body("model runner crashed")
            .create_async()
            .await;

        let client = OllamaClient::new(&config_for(&server)).unwrap();
        let err = client.answer("hello").await.unwrap_err();

        assert!(matches!(err, InferenceError::Unavailable(_)));
        let message = err.to_string();
        assert!(message.contains("500"), "got: {message}");
        assert!(message.contains("model runner crashed"), "got: {message}");
    }

    #[tokio::test]
    async fn test_error_status_with_truncated_body_keeps_status() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        // Promises 100 bytes of error body, sends 7, then hangs up.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let backend = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 4096];
            let _ = socket.read(&mut buf).await;
            let _ = socket
                .write_all(
                    b"HTTP/1.1 500 Internal Server Error\r\nContent-Length: 100\r\n\r\npartial",
                )
                .await;
        });

        let config = ModelConfig {
            host: "127.0.0.1".to_string(),
            port,
            ..Default::default()
        };
        let client = OllamaClient::new(&config).unwrap();

        let err = client.answer("hello").await.unwrap_err();
        let message = err.to_string();
        assert!(matches!(err, InferenceError::Unavailable(_)));
        assert!(message.contains("500"), "got: {message}");
        assert!(message.contains("<unreadable body>"), "got: {message}");

        backend.abort();
    }

    #[tokio::test]
    async fn test_malformed_body_is_unavailable() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/generate")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body("<html>not json</html>")
            .create_async()
            .await;

        let client = OllamaClient::new(&config_for(&server)).unwrap();
        let err = client.answer("hello").await.unwrap_err();

        assert!(matches!(err, InferenceError::Unavailable(_)));
        assert!(err.to_string().contains("malformed"), "got: {err}");
    }

    #[tokio::test]
    async fn test_connection_refused_is_unavailable() {
        // Grab a free port, then close it so nothing is listening.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let config = ModelConfig {
            host: "127.0.0.1".to_string(),
            port,
            ..Default::default()
        };
        let client = OllamaClient::new(&config).unwrap();

        let err = client.answer("hello").await.unwrap_err();
        assert!(matches!(err, InferenceError::Unavailable(_)));
    }

    #[tokio::test]
    async fn test_silent_backend_times_out() {
        // Accepts connections but never writes a response.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let holder = tokio::spawn(async move {
            let mut open = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                open.push(socket);
            }
        });

        let config = ModelConfig {
            host: "127.0.0.1".to_string(),
            port,
            timeout: Duration::from_millis(200),
            ..Default::default()
        };
        let client = OllamaClient::new(&config).unwrap();

        let err = client.answer("hello").await.unwrap_err();
        assert!(err.to_string().contains("timed out"), "got: {err}");

        holder.abort();
    }
}
