/// HTTP client for the dtf backend.
///
/// Controllers never talk to the network directly; they build an
/// [`ApiRequest`] and hand it to a [`Backend`]. [`HttpBackend`] is the real
/// implementation, using the synchronous `ureq` client with a per-request
/// timeout and the configured CSRF token on every request.
use std::fmt;
use std::time::Duration;

use serde_json::Value;

use crate::config::schema::ServerConfig;
use crate::error::{ClientError, Result};

/// Header carrying the CSRF token.
pub const CSRF_HEADER: &str = "X-CSRFToken";

const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request body.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Empty,
    /// `application/x-www-form-urlencoded` pairs, in order.
    Form(Vec<(String, String)>),
    Json(Value),
}

/// A request against the backend. `path` is either absolute (`http://...`)
/// or relative to the backend's base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub body: Body,
}

impl ApiRequest {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            path: path.into(),
            body: Body::Empty,
        }
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self {
            method: Method::Delete,
            path: path.into(),
            body: Body::Empty,
        }
    }

    pub fn post_form(path: impl Into<String>, fields: Vec<(String, String)>) -> Self {
        Self {
            method: Method::Post,
            path: path.into(),
            body: Body::Form(fields),
        }
    }

    pub fn json(method: Method, path: impl Into<String>, body: Value) -> Self {
        Self {
            method,
            path: path.into(),
            body: Body::Json(body),
        }
    }
}

/// Something that can execute backend requests.
///
/// Returns the decoded JSON body; an empty body decodes to `Value::Null`.
pub trait Backend {
    fn send(&self, request: &ApiRequest) -> Result<Value>;
}

impl<B: Backend + ?Sized> Backend for &B {
    fn send(&self, request: &ApiRequest) -> Result<Value> {
        (**self).send(request)
    }
}

/// Blocking HTTP implementation of [`Backend`].
#[derive(Debug, Clone)]
pub struct HttpBackend {
    base_url: String,
    csrf_token: Option<String>,
    timeout: Duration,
}

impl HttpBackend {
    pub fn new(base_url: &str, csrf_token: Option<String>, timeout: Duration) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            csrf_token: csrf_token.filter(|t| !t.is_empty()),
            timeout,
        }
    }

    /// Build a client from the resolved `[server]` config.
    pub fn from_config(config: &ServerConfig) -> Self {
        Self::new(
            &config.base_url,
            Some(config.csrf_token.clone()),
            Duration::from_millis(config.timeout_ms),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Resolve a request path against the base URL.
    pub fn url_for(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else if path.starts_with('/') {
            format!("{}{path}", self.base_url)
        } else {
            format!("{}/{path}", self.base_url)
        }
    }
}

impl Backend for HttpBackend {
    fn send(&self, request: &ApiRequest) -> Result<Value> {
        let url = self.url_for(&request.path);

        let mut req = ureq::request(request.method.as_str(), &url).timeout(self.timeout);
        if let Some(token) = &self.csrf_token {
            req = req.set(CSRF_HEADER, token);
        }

        let outcome = match &request.body {
            Body::Empty => req.call(),
            Body::Form(fields) => {
                let pairs: Vec<(&str, &str)> = fields
                    .iter()
                    .map(|(k, v)| (k.as_str(), v.as_str()))
                    .collect();
                req.send_form(&pairs)
            }
            Body::Json(body) => req
                .set("Content-Type", JSON_CONTENT_TYPE)
                .send_string(&body.to_string()),
        };

        let response = match outcome {
            Ok(resp) => resp,
            Err(ureq::Error::Status(code, resp)) => {
                let body = resp.into_string().unwrap_or_default();
                return Err(ClientError::Status { url, code, body });
            }
            Err(ureq::Error::Transport(t)) => {
                return Err(ClientError::Transport {
                    url,
                    message: t.to_string(),
                });
            }
        };

        let text = response.into_string().map_err(|e| ClientError::Decode {
            url: url.clone(),
            message: e.to_string(),
        })?;

        decode_body(&url, &text)
    }
}

/// Decode a response body; empty bodies are `Null`.
fn decode_body(url: &str, text: &str) -> Result<Value> {
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(text).map_err(|e| ClientError::Decode {
        url: url.to_string(),
        message: e.to_string(),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
