//! Client for a hosted object-detection endpoint.
//!
//! The service takes the image as a base64 string in a form-encoded POST body, authenticated
//! with an `api_key` query parameter, and answers with a JSON document holding a `predictions`
//! array. The call is blocking and is made exactly once per upload; retry policy belongs to
//! whoever drives the client.

use crate::annotations::detection::Detection;
use crate::inference::detection_service::{DetectionService, InferenceError};
use crate::inference::prediction::parse_predictions;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use log::debug;
use std::fmt;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "https://serverless.roboflow.com";
pub const DEFAULT_MODEL_ID: &str = "cavity-73rfa/3";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone)]
pub struct HostedModelClient {
    api_url: String,
    model_id: String,
    api_key: String,
    agent: ureq::Agent,
}

impl fmt::Debug for HostedModelClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostedModelClient")
            .field("api_url", &self.api_url)
            .field("model_id", &self.model_id)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl HostedModelClient {
    pub fn new(api_url: &str, model_id: &str, api_key: &str, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        HostedModelClient {
            api_url: api_url.to_string(),
            model_id: model_id.to_string(),
            api_key: api_key.to_string(),
            agent,
        }
    }

    /// `{api_url}/{model_id}`, without the key.
    pub fn endpoint(&self) -> String {
        format!(
            "{}/{}",
            self.api_url.trim_end_matches('/'),
            self.model_id.trim_matches('/')
        )
    }

    pub fn model_id(&self) -> &str {
        &self.model_id
    }
}

impl DetectionService for HostedModelClient {
    fn name(&self) -> &str {
        &self.model_id
    }

    fn detect(&self, image_bytes: &[u8]) -> Result<Vec<Detection>, InferenceError> {
        let endpoint = self.endpoint();
        debug!("POST {} ({} bytes)", endpoint, image_bytes.len());
        let body = STANDARD.encode(image_bytes);
        let response = self
            .agent
            .post(&endpoint)
            .query("api_key", &self.api_key)
            .set("Content-Type", "application/x-www-form-urlencoded")
            .send_string(&body);
        let response = match response {
            Ok(response) => response,
            Err(ureq::Error::Status(code, response)) => {
                let body = response.into_string().unwrap_or_default();
                return Err(InferenceError::Status { code, body });
            }
            Err(ureq::Error::Transport(transport)) => {
                return Err(InferenceError::Transport(transport.to_string()));
            }
        };
        let text = response.into_string()?;
        let detections = parse_predictions(&text)?;
        debug!("{} returned {} predictions", endpoint, detections.len());
        Ok(detections)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufRead, BufReader, Read, Write};
    use std::net::TcpListener;
    use std::thread;

    /// Serves one canned HTTP response and hands back the request line and body it received.
    fn serve_once(status: &'static str, body: &'static str) -> (String, thread::JoinHandle<(String, String)>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = format!("http://{}", listener.local_addr().unwrap());
        let handle = thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());
            let mut request_line = String::new();
            reader.read_line(&mut request_line).unwrap();
            let mut content_length = 0;
            loop {
                let mut line = String::new();
                reader.read_line(&mut line).unwrap();
                if line == "\r\n" || line.is_empty() {
                    break;
                }
                if let Some((name, value)) = line.split_once(':') {
                    if name.eq_ignore_ascii_case("content-length") {
                        content_length = value.trim().parse().unwrap();
                    }
                }
            }
            let mut request_body = vec![0; content_length];
            reader.read_exact(&mut request_body).unwrap();
            let mut stream = stream;
            write!(
                stream,
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            )
            .unwrap();
            stream.flush().unwrap();
            (request_line, String::from_utf8(request_body).unwrap())
        });
        (addr, handle)
    }

    #[test]
    fn endpoint_joins_url_and_model() {
        let client = HostedModelClient::new("https://example.test/", "/cavity/3", "k", DEFAULT_TIMEOUT);
        assert_eq!(client.endpoint(), "https://example.test/cavity/3");
        assert!(!format!("{client:?}").contains("\"k\""));
    }

    #[test]
    fn posts_base64_image_and_parses_predictions() {
        let (addr, server) = serve_once(
            "200 OK",
            r#"{"predictions": [{"x": 50, "y": 50, "width": 10, "height": 10, "class": "Cavity", "confidence": 0.92}]}"#,
        );
        let client = HostedModelClient::new(&addr, "cavity-73rfa/3", "secret", Duration::from_secs(5));
        let dets = client.detect(b"jpeg bytes").unwrap();
        let (request_line, body) = server.join().unwrap();

        assert_eq!(dets.len(), 1);
        assert!(dets[0].is_cavity());
        assert!(request_line.starts_with("POST /cavity-73rfa/3?api_key=secret "));
        assert_eq!(body, STANDARD.encode(b"jpeg bytes"));
    }

    #[test]
    fn http_errors_carry_status_and_body() {
        let (addr, server) = serve_once("403 Forbidden", r#"{"message": "bad key"}"#);
        let client = HostedModelClient::new(&addr, "m/1", "wrong", Duration::from_secs(5));
        let err = client.detect(b"img").unwrap_err();
        server.join().unwrap();
        match err {
            InferenceError::Status { code, body } => {
                assert_eq!(code, 403);
                assert!(body.contains("bad key"));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }
}
