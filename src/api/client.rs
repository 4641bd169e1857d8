use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use tracing::debug;

use super::types::{ChatRequest, ChatResponse, ModelInfo};
use super::AnalysisApi;
use crate::error::ApiError;

/// HTTP client for the analysis API
#[derive(Debug, Clone)]
pub struct HttpAnalysisApi {
    client: Client,
    base_url: String,
}

impl HttpAnalysisApi {
    /// `base_url` is the API root, e.g. `http://localhost:5050/api`.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, ApiError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self::with_client(builder.build()?, base_url))
    }

    /// Wraps an already configured reqwest client.
    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_model(&self) -> Result<Response, ApiError> {
        let url = self.url("/model");
        debug!(%url, "GET");

        let response = self
            .client
            .get(&url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ApiError::status(response.status()));
        }

        Ok(response)
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let body = response.bytes().await?;
    serde_json::from_slice(&body).map_err(|e| ApiError::Decode(e.to_string()))
}

#[async_trait]
impl AnalysisApi for HttpAnalysisApi {
    async fn probe(&self) -> Result<(), ApiError> {
        self.get_model().await.map(|_| ())
    }

    async fn model_info(&self) -> Result<ModelInfo, ApiError> {
        let response = self.get_model().await?;
        decode(response).await
    }

    async fn chat(&self, ask: &str) -> Result<ChatResponse, ApiError> {
        let url = self.url("/chat");
        debug!(%url, chars = ask.chars().count(), "POST");

        let request = ChatRequest {
            ask: ask.to_string(),
        };

        let response = self.client.post(&url).json(&request).send().await?;

        if !response.status().is_success() {
            return Err(ApiError::status(response.status()));
        }

        decode(response).await
    }
}

#[cfg(test)]
mod tests {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    use super::*;

    /// A one-shot HTTP peer: answers the first request with `response` and
    /// hands back the raw request it read.
    async fn serve_once(response: String) -> (HttpAnalysisApi, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let request = read_request(&mut socket).await;
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
            request
        });

        (local_api(&format!("http://{addr}/api")), server)
    }

    fn local_api(base_url: &str) -> HttpAnalysisApi {
        let client = Client::builder().no_proxy().build().unwrap();
        HttpAnalysisApi::with_client(client, base_url)
    }

    async fn read_request(socket: &mut tokio::net::TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);

            let text = String::from_utf8_lossy(&buf);
            if let Some(end) = text.find("\r\n\r\n") {
                let length = text[..end]
                    .lines()
                    .find_map(|line| {
                        let (name, value) = line.split_once(':')?;
                        name.eq_ignore_ascii_case("content-length")
                            .then(|| value.trim().parse::<usize>().ok())
                            .flatten()
                    })
                    .unwrap_or(0);
                if buf.len() >= end + 4 + length {
                    break;
                }
            }
        }
        String::from_utf8(buf).unwrap()
    }

    fn reply(status_line: &str, body: &str) -> String {
        format!(
            "HTTP/1.1 {status_line}\r\n\
             Content-Type: application/json\r\n\
             Content-Length: {}\r\n\
             Connection: close\r\n\r\n{body}",
            body.len()
        )
    }

    fn request_body(request: &str) -> &str {
        request.split_once("\r\n\r\n").map(|(_, body)| body).unwrap_or("")
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let api = HttpAnalysisApi::new("http://localhost:5050/api/", None).unwrap();
        assert_eq!(api.base_url(), "http://localhost:5050/api");
        assert_eq!(api.url("/chat"), "http://localhost:5050/api/chat");
    }

    #[tokio::test]
    async fn test_chat_posts_ask_and_reads_analysis() {
        let (api, server) = serve_once(reply("200 OK", r#"{"analysis":"disk is full"}"#)).await;

        let response = api.chat("why is node-3 down?").await.unwrap();
        assert_eq!(response.analysis.as_deref(), Some("disk is full"));

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /api/chat HTTP/1.1\r\n"));
        let body: serde_json::Value = serde_json::from_str(request_body(&request)).unwrap();
        assert_eq!(body, serde_json::json!({ "ask": "why is node-3 down?" }));
    }

    #[tokio::test]
    async fn test_chat_server_error_maps_to_status() {
        let (api, server) = serve_once(reply("500 Internal Server Error", "{}")).await;

        let err = api.chat("hello").await.unwrap_err();
        assert!(matches!(err, ApiError::Status { status: 500, .. }));
        assert_eq!(err.to_string(), "HTTP 500: Internal Server Error");
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_status_reason_is_canonical() {
        let (api, server) = serve_once(reply("500 Model Overloaded", "{}")).await;

        let err = api.chat("hello").await.unwrap_err();
        assert_eq!(err.to_string(), "HTTP 500: Internal Server Error");
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_chat_malformed_body_is_decode_error() {
        let (api, server) = serve_once(reply("200 OK", "<html>oops</html>")).await;

        let err = api.chat("hello").await.unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_model_info_reads_first_model() {
        let body = r#"{"model_name":"[\"m1\", \"m2\"]"}"#;
        let (api, server) = serve_once(reply("200 OK", body)).await;

        let info = api.model_info().await.unwrap();
        assert_eq!(info.display_name().as_deref(), Some("m1"));

        let request = server.await.unwrap();
        assert!(request.starts_with("GET /api/model HTTP/1.1\r\n"));
    }

    #[tokio::test]
    async fn test_connectivity_check_fails_on_not_found() {
        let (api, server) = serve_once(reply("404 Not Found", "")).await;

        let err = api.probe().await.unwrap_err();
        assert!(matches!(err, ApiError::Status { status: 404, .. }));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_closed_port_is_network_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let api = local_api(&format!("http://{addr}/api"));
        let err = api.probe().await.unwrap_err();
        assert!(matches!(err, ApiError::Network(_)));
    }

    #[tokio::test]
    async fn test_client_shows_real_send_failure() {
        use std::sync::Arc;

        use crate::chat::ChatClient;

        let (api, server) = serve_once(reply("503 Service Unavailable", "")).await;
        let mut client = ChatClient::new(Arc::new(api));
        client.finish_probe(Ok(()));

        assert!(client.send_message("status?").await);
        server.await.unwrap();

        let last = client.thread().messages().last().unwrap();
        assert!(last.is_error);
        assert_eq!(
            last.text,
            "Sorry, I encountered an error: HTTP 503: Service Unavailable. \
             Please make sure the analysis API is running and accessible."
        );
        assert!(!client.state().is_loading());
    }
}
