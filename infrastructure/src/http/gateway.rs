//! MedBot gateway implementation over reqwest.
//!
//! Streamed endpoints are requested with `Accept: text/event-stream` and
//! handed back as a raw byte stream; the SSE framing is the application
//! layer's job. Every other call is JSON (or multipart) with a request
//! timeout.

use crate::config::FileServerConfig;
use async_trait::async_trait;
use futures::StreamExt;
use medbot_application::{
    ByteStream, Endpoint, EndpointPaths, GatewayError, MedbotGateway, MultipartUpload,
};
use reqwest::header::{ACCEPT, HeaderValue};
use reqwest::{Client, RequestBuilder, Response, Url, multipart};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const EVENT_STREAM: &str = "text/event-stream";

/// [`MedbotGateway`] backed by a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestMedbotGateway {
    client: Client,
    base_url: Url,
    endpoints: EndpointPaths,
    timeout: Duration,
}

impl ReqwestMedbotGateway {
    pub fn new(
        base_url: Url,
        endpoints: EndpointPaths,
        timeout: Duration,
    ) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .user_agent(concat!("medbot/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| GatewayError::Other(e.to_string()))?;

        Ok(Self {
            client,
            base_url,
            endpoints,
            timeout,
        })
    }

    /// Build a gateway from the `[server]` config section.
    pub fn from_config(config: &FileServerConfig) -> Result<Self, GatewayError> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| GatewayError::Other(format!("invalid base_url: {e}")))?;
        Self::new(base_url, config.endpoints.clone(), config.timeout())
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Absolute URL for an endpoint. The path is appended to the base URL,
    /// so a base with a path prefix (`https://host/api`) keeps it.
    fn url(&self, endpoint: Endpoint) -> Result<Url, GatewayError> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let path = self.endpoints.path(endpoint);
        let joined = if path.starts_with('/') {
            format!("{base}{path}")
        } else {
            format!("{base}/{path}")
        };
        Url::parse(&joined).map_err(|e| GatewayError::Other(format!("{joined}: {e}")))
    }

    async fn send(
        &self,
        endpoint: Endpoint,
        request: RequestBuilder,
    ) -> Result<Response, GatewayError> {
        debug!(endpoint = endpoint.as_str(), "Sending request");
        let response = request.send().await.map_err(map_reqwest_error)?;
        ensure_success(endpoint, response).await
    }

    async fn json_body(response: Response) -> Result<Value, GatewayError> {
        response.json::<Value>().await.map_err(map_reqwest_error)
    }
}

#[async_trait]
impl MedbotGateway for ReqwestMedbotGateway {
    async fn open_stream(
        &self,
        endpoint: Endpoint,
        body: Value,
    ) -> Result<ByteStream, GatewayError> {
        let request = self
            .client
            .post(self.url(endpoint)?)
            .header(ACCEPT, HeaderValue::from_static(EVENT_STREAM))
            .json(&body);
        let response = self.send(endpoint, request).await?;

        let stream = response
            .bytes_stream()
            .map(|chunk| chunk.map(|bytes| bytes.to_vec()).map_err(map_reqwest_error));
        Ok(Box::pin(stream))
    }

    async fn post_json(&self, endpoint: Endpoint, body: Value) -> Result<Value, GatewayError> {
        let request = self
            .client
            .post(self.url(endpoint)?)
            .timeout(self.timeout)
            .json(&body);
        let response = self.send(endpoint, request).await?;
        Self::json_body(response).await
    }

    async fn get_json(&self, endpoint: Endpoint) -> Result<Value, GatewayError> {
        let request = self.client.get(self.url(endpoint)?).timeout(self.timeout);
        let response = self.send(endpoint, request).await?;
        Self::json_body(response).await
    }

    async fn post_multipart(
        &self,
        endpoint: Endpoint,
        upload: MultipartUpload,
    ) -> Result<Value, GatewayError> {
        let part = multipart::Part::bytes(upload.bytes)
            .file_name(upload.file_name)
            .mime_str(&upload.mime_type)
            .map_err(|e| GatewayError::Other(e.to_string()))?;

        let mut form = multipart::Form::new().part(upload.file_field, part);
        for (name, value) in upload.fields {
            form = form.text(name, value);
        }

        let request = self
            .client
            .post(self.url(endpoint)?)
            .timeout(self.timeout)
            .multipart(form);
        let response = self.send(endpoint, request).await?;
        Self::json_body(response).await
    }

    async fn post_for_bytes(
        &self,
        endpoint: Endpoint,
        body: Value,
    ) -> Result<Vec<u8>, GatewayError> {
        let request = self
            .client
            .post(self.url(endpoint)?)
            .timeout(self.timeout)
            .json(&body);
        let response = self.send(endpoint, request).await?;
        let bytes = response.bytes().await.map_err(map_reqwest_error)?;
        Ok(bytes.to_vec())
    }

    fn resolve_url(&self, url: &str) -> String {
        if Url::parse(url).is_ok() {
            return url.to_string();
        }
        match self.base_url.join(url) {
            Ok(resolved) => resolved.to_string(),
            Err(e) => {
                warn!(url, error = %e, "Could not resolve server URL");
                url.to_string()
            }
        }
    }
}

/// Turn a non-2xx response into [`GatewayError::Status`], preferring the
/// server's JSON `error` field as the message.
async fn ensure_success(endpoint: Endpoint, response: Response) -> Result<Response, GatewayError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = error_message(&body)
        .or_else(|| status.canonical_reason().map(str::to_string))
        .unwrap_or_else(|| "Unknown".to_string());

    warn!(
        endpoint = endpoint.as_str(),
        status = status.as_u16(),
        %message,
        "Server returned an error"
    );
    Err(GatewayError::Status {
        status: status.as_u16(),
        message,
    })
}

fn error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    match value.get("error")? {
        Value::String(s) => Some(s.clone()),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

fn map_reqwest_error(e: reqwest::Error) -> GatewayError {
    if e.is_timeout() {
        GatewayError::Timeout
    } else if e.is_connect() {
        GatewayError::ConnectionError(e.to_string())
    } else if e.is_decode() {
        GatewayError::InvalidResponse(e.to_string())
    } else if e.is_body() {
        GatewayError::TransportClosed
    } else {
        GatewayError::Other(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Serve a single HTTP request, replying with `head` followed by each
    /// body chunk written separately. Returns the base URL and a handle
    /// yielding the raw request text.
    async fn serve_once(head: &'static str, chunks: Vec<&'static str>) -> (Url, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let request = read_request(&mut socket).await;

            socket.write_all(head.as_bytes()).await.unwrap();
            for chunk in chunks {
                socket.write_all(chunk.as_bytes()).await.unwrap();
                socket.flush().await.unwrap();
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
            socket.shutdown().await.unwrap();
            request
        });

        (Url::parse(&format!("http://{addr}")).unwrap(), handle)
    }

    async fn read_request(socket: &mut tokio::net::TcpStream) -> String {
        let mut data = Vec::new();
        let mut buf = [0u8; 4096];
        loop {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            data.extend_from_slice(&buf[..n]);

            let text = String::from_utf8_lossy(&data);
            if let Some(header_end) = text.find("\r\n\r\n") {
                let content_length = text[..header_end]
                    .lines()
                    .find_map(|line| {
                        let (name, value) = line.split_once(':')?;
                        name.eq_ignore_ascii_case("content-length")
                            .then(|| value.trim().parse::<usize>().ok())
                            .flatten()
                    })
                    .unwrap_or(0);
                if data.len() >= header_end + 4 + content_length {
                    break;
                }
            }
        }
        String::from_utf8_lossy(&data).into_owned()
    }

    fn gateway(base_url: Url) -> ReqwestMedbotGateway {
        ReqwestMedbotGateway::new(base_url, EndpointPaths::default(), Duration::from_secs(5))
            .unwrap()
    }

    #[tokio::test]
    async fn open_stream_yields_body_chunks() {
        let (url, server) = serve_once(
            "HTTP/1.1 200 OK\r\nContent-Type: text/event-stream\r\nConnection: close\r\n\r\n",
            vec!["data: {\"content\":\"Hel\"}\n", "data: {\"content\":\"lo\"}\ndata: [DONE]\n"],
        )
        .await;

        let stream = gateway(url)
            .open_stream(Endpoint::Chat, json!({"message": "hi", "history": []}))
            .await
            .unwrap();
        let chunks: Vec<_> = stream.collect().await;
        let body: Vec<u8> = chunks.into_iter().flat_map(|c| c.unwrap()).collect();
        assert_eq!(
            String::from_utf8(body).unwrap(),
            "data: {\"content\":\"Hel\"}\ndata: {\"content\":\"lo\"}\ndata: [DONE]\n"
        );

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /chat/chat HTTP/1.1"));
        assert!(request.to_lowercase().contains("accept: text/event-stream"));
        assert!(request.contains("\"message\":\"hi\""));
    }

    #[tokio::test]
    async fn error_status_uses_server_message() {
        let (url, _server) = serve_once(
            "HTTP/1.1 500 Internal Server Error\r\nContent-Type: application/json\r\nContent-Length: 22\r\nConnection: close\r\n\r\n",
            vec!["{\"error\":\"model down\"}"],
        )
        .await;

        let err = gateway(url)
            .post_json(Endpoint::ExamGrade, json!({}))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            GatewayError::Status {
                status: 500,
                message: "model down".to_string()
            }
        );
    }

    #[tokio::test]
    async fn error_status_without_json_uses_reason() {
        let (url, _server) = serve_once(
            "HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
            vec![],
        )
        .await;

        let result = gateway(url)
            .open_stream(Endpoint::ExamGenerate, json!({"course": "anatomy"}))
            .await;
        assert!(matches!(
            result,
            Err(GatewayError::Status { status: 404, ref message }) if message == "Not Found"
        ));
    }

    #[tokio::test]
    async fn get_json_decodes_body() {
        let (url, server) = serve_once(
            "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: 24\r\nConnection: close\r\n\r\n",
            vec!["{\"authenticated\":false}\n"],
        )
        .await;

        let value = gateway(url).get_json(Endpoint::CheckAuth).await.unwrap();
        assert_eq!(value["authenticated"], json!(false));
        let request = server.await.unwrap();
        assert!(request.starts_with("GET /calendar/check-auth"));
    }

    #[tokio::test]
    async fn multipart_upload_sends_file_and_fields() {
        let (url, server) = serve_once(
            "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: 2\r\nConnection: close\r\n\r\n",
            vec!["{}"],
        )
        .await;

        let upload = MultipartUpload {
            file_field: "syllabus".to_string(),
            file_name: "course.pdf".to_string(),
            mime_type: "application/pdf".to_string(),
            bytes: b"%PDF-1.4 test".to_vec(),
            fields: vec![("studyHours".to_string(), "10".to_string())],
        };
        gateway(url)
            .post_multipart(Endpoint::ProcessSyllabus, upload)
            .await
            .unwrap();

        let request = server.await.unwrap();
        assert!(request.contains("multipart/form-data"));
        assert!(request.contains("name=\"syllabus\"; filename=\"course.pdf\""));
        assert!(request.contains("name=\"studyHours\""));
        assert!(request.contains("%PDF-1.4 test"));
    }

    #[tokio::test]
    async fn connection_refused_is_a_connection_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let url = Url::parse(&format!("http://{addr}")).unwrap();
        let err = gateway(url)
            .post_json(Endpoint::Speak, json!({"text": "hi"}))
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::ConnectionError(_)));
    }

    #[test]
    fn endpoint_urls_keep_base_path() {
        let gw = gateway(Url::parse("https://medbot.example.org/api/").unwrap());
        assert_eq!(
            gw.url(Endpoint::Chat).unwrap().as_str(),
            "https://medbot.example.org/api/chat/chat"
        );
    }

    #[test]
    fn resolve_url_handles_relative_and_absolute() {
        let gw = gateway(Url::parse("http://localhost:8080").unwrap());
        assert_eq!(
            gw.resolve_url("/static/audio/reply.mp3"),
            "http://localhost:8080/static/audio/reply.mp3"
        );
        assert_eq!(
            gw.resolve_url("https://cdn.example.org/a.mp3"),
            "https://cdn.example.org/a.mp3"
        );
    }

    #[test]
    fn error_message_extraction() {
        assert_eq!(error_message(r#"{"error":"bad"}"#).as_deref(), Some("bad"));
        assert_eq!(error_message(r#"{"error":null}"#), None);
        assert_eq!(error_message("<html>"), None);
    }
}
