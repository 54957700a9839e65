//! Request construction and execution.
//!
//! Every API call is described by a `RequestSpec` and executed through a
//! `Transport`. The `Requester` wraps a transport and turns every failure into
//! a logged skip: a single bad call never aborts a run.

use std::time::Duration;

use reqwest::blocking::Client;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::error::AppError;

/// Longest response-body excerpt kept in a status error.
const BODY_EXCERPT_CHARS: usize = 300;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// One fully described API call.
#[derive(Debug, Clone)]
pub struct RequestSpec {
    /// Human-readable call identity for logs, e.g. "state 06 year 2021".
    pub label: String,
    pub method: Method,
    pub url: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl RequestSpec {
    pub fn get(label: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            method: Method::Get,
            url: url.into(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn post_json(label: impl Into<String>, url: impl Into<String>, body: Value) -> Self {
        Self {
            label: label.into(),
            method: Method::Post,
            url: url.into(),
            query: Vec::new(),
            body: Some(body),
        }
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Transport(String),

    #[error("HTTP {status}: {excerpt}")]
    Status { status: u16, excerpt: String },

    #[error("response was not valid JSON: {0}")]
    Decode(String),
}

/// Something that can execute a `RequestSpec` and return the JSON body.
pub trait Transport {
    fn execute(&self, spec: &RequestSpec) -> Result<Value, FetchError>;
}

/// Blocking `reqwest` transport with a per-call timeout.
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("statpull/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AppError::config(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    fn execute(&self, spec: &RequestSpec) -> Result<Value, FetchError> {
        let mut req = match spec.method {
            Method::Get => self.client.get(&spec.url),
            Method::Post => self.client.post(&spec.url),
        };

        if !spec.query.is_empty() {
            req = req.query(&spec.query);
        }
        if let Some(body) = &spec.body {
            req = req.json(body);
        }

        // Strip URLs from errors: census keys travel in the query string.
        let resp = req
            .send()
            .map_err(|e| FetchError::Transport(e.without_url().to_string()))?;
        let status = resp.status();
        let text = resp
            .text()
            .map_err(|e| FetchError::Transport(e.without_url().to_string()))?;

        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                excerpt: excerpt(&text),
            });
        }
        // Census answers "no rows" with 204 and an empty body.
        if text.trim().is_empty() {
            return Ok(Value::Array(Vec::new()));
        }

        serde_json::from_str(&text).map_err(|e| FetchError::Decode(e.to_string()))
    }
}

fn excerpt(text: &str) -> String {
    text.trim().chars().take(BODY_EXCERPT_CHARS).collect()
}

/// Result of one call from the pipeline's point of view.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    Payload(Value),
    /// The call failed; the failure has already been logged.
    Skipped,
}

pub struct Requester<'a> {
    transport: &'a dyn Transport,
}

impl<'a> Requester<'a> {
    pub fn new(transport: &'a dyn Transport) -> Self {
        Self { transport }
    }

    pub fn fetch(&self, spec: &RequestSpec) -> FetchOutcome {
        debug!(call = %spec.label, url = %spec.url, method = ?spec.method, "sending request");
        match self.transport.execute(spec) {
            Ok(payload) => FetchOutcome::Payload(payload),
            Err(FetchError::Status { status, excerpt }) => {
                warn!(call = %spec.label, status, body = %excerpt, "request returned non-success status; skipping");
                FetchOutcome::Skipped
            }
            Err(err) => {
                warn!(call = %spec.label, error = %err, "request failed; skipping");
                FetchOutcome::Skipped
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::sync::mpsc::{self, Receiver};
    use std::thread;

    use serde_json::json;

    use super::*;
    use crate::data::testing::CannedTransport;

    /// Answer one connection on a local port with `status` and `body`, after
    /// `delay`. The raw request text comes back on the receiver.
    fn serve_once(status: &str, body: &str, delay: Duration) -> (String, Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/data", listener.local_addr().unwrap());
        let response = format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let Ok((mut stream, _)) = listener.accept() else {
                return;
            };
            let request = read_request(&mut stream);
            let _ = tx.send(request);
            thread::sleep(delay);
            let _ = stream.write_all(response.as_bytes());
        });
        (url, rx)
    }

    fn read_request(stream: &mut impl Read) -> String {
        let mut raw = Vec::new();
        let mut buf = [0u8; 1024];
        loop {
            let n = stream.read(&mut buf).unwrap_or(0);
            if n == 0 {
                break;
            }
            raw.extend_from_slice(&buf[..n]);
            let text = String::from_utf8_lossy(&raw);
            if let Some(end) = text.find("\r\n\r\n") {
                let length = text[..end]
                    .lines()
                    .find_map(|l| l.to_ascii_lowercase().strip_prefix("content-length:").map(|v| v.trim().to_string()))
                    .and_then(|v| v.parse::<usize>().ok())
                    .unwrap_or(0);
                if raw.len() >= end + 4 + length {
                    break;
                }
            }
        }
        String::from_utf8_lossy(&raw).into_owned()
    }

    fn transport() -> HttpTransport {
        HttpTransport::new(Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn http_success_decodes_json_and_sends_query() {
        let (url, rx) = serve_once("200 OK", r#"[["NAME"],["Ohio"]]"#, Duration::ZERO);
        let spec = RequestSpec::get("t", url).with_query("get", "NAME").with_query("key", "abc");

        assert_eq!(transport().execute(&spec), Ok(json!([["NAME"], ["Ohio"]])));
        let request = rx.recv().unwrap();
        assert!(request.starts_with("GET /data?get=NAME&key=abc "), "{request}");
    }

    #[test]
    fn http_post_sends_json_body() {
        let (url, rx) = serve_once("200 OK", r#"{"status":"REQUEST_SUCCEEDED"}"#, Duration::ZERO);
        let spec = RequestSpec::post_json("t", url, json!({"seriesid": ["X"], "registrationkey": "k"}));

        assert!(transport().execute(&spec).is_ok());
        let request = rx.recv().unwrap();
        assert!(request.starts_with("POST /data "));
        assert!(request.ends_with(r#"{"seriesid":["X"],"registrationkey":"k"}"#), "{request}");
    }

    #[test]
    fn http_404_is_a_status_error_with_excerpt() {
        let (url, _rx) = serve_once("404 Not Found", "error: unknown variable", Duration::ZERO);
        assert_eq!(
            transport().execute(&RequestSpec::get("t", url)),
            Err(FetchError::Status {
                status: 404,
                excerpt: "error: unknown variable".into()
            })
        );
    }

    #[test]
    fn http_non_json_body_is_a_decode_error() {
        let (url, _rx) = serve_once("200 OK", "<html>maintenance</html>", Duration::ZERO);
        let err = transport().execute(&RequestSpec::get("t", url)).unwrap_err();
        assert!(matches!(err, FetchError::Decode(_)), "{err:?}");
    }

    #[test]
    fn http_no_content_is_an_empty_payload() {
        let (url, _rx) = serve_once("204 No Content", "", Duration::ZERO);
        assert_eq!(transport().execute(&RequestSpec::get("t", url)), Ok(json!([])));
    }

    #[test]
    fn http_slow_response_times_out() {
        let (url, _rx) = serve_once("200 OK", "[]", Duration::from_secs(3));
        let transport = HttpTransport::new(Duration::from_millis(200)).unwrap();
        let err = transport.execute(&RequestSpec::get("t", url)).unwrap_err();
        assert!(matches!(err, FetchError::Transport(_)), "{err:?}");
    }

    #[test]
    fn excerpt_is_bounded() {
        let long = "x".repeat(1000);
        assert_eq!(excerpt(&long).len(), BODY_EXCERPT_CHARS);
        assert_eq!(excerpt("  short \n"), "short");
    }

    #[test]
    fn failures_become_skips() {
        let transport = CannedTransport::new()
            .respond("ok", Ok(json!([1])))
            .respond("missing", Err(FetchError::Status { status: 404, excerpt: "not found".into() }))
            .respond("down", Err(FetchError::Transport("timed out".into())));
        let requester = Requester::new(&transport);

        assert_eq!(
            requester.fetch(&RequestSpec::get("ok", "u")),
            FetchOutcome::Payload(json!([1]))
        );
        assert_eq!(requester.fetch(&RequestSpec::get("missing", "u")), FetchOutcome::Skipped);
        assert_eq!(requester.fetch(&RequestSpec::get("down", "u")), FetchOutcome::Skipped);
        assert_eq!(transport.calls(), vec!["ok", "missing", "down"]);
    }
}
