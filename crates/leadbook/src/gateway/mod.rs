//! The only way requests reach the backend.
//!
//! [`Gateway::call`] attaches the bearer token of the current session,
//! picks the body encoding and turns failures into [`GatewayError`]. A
//! response carrying the message `Not authorized` tears the session down:
//! every registered [`SessionObserver`] is told once, then the call fails
//! with [`GatewayError::Unauthorized`]. Nothing is retried.

use std::{sync::Arc, time::Duration};

use api_types::MessageResponse;
use reqwest::{Method, StatusCode, Url, multipart::Form};
use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;

use crate::session::{SessionObserver, SessionStore};

/// Message the backend sends when the token is missing, expired or revoked.
pub const NOT_AUTHORIZED: &str = "Not authorized";

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("session expired, sign in again")]
    Unauthorized,
    /// Body of the 429 response, unchanged.
    #[error("{0}")]
    RateLimited(String),
    #[error("{status}: {message}")]
    Server { status: StatusCode, message: String },
    #[error("request timed out")]
    Timeout,
    #[error("network error: {0}")]
    Network(reqwest::Error),
    #[error("invalid response body: {0}")]
    Decode(serde_json::Error),
    #[error("invalid request body: {0}")]
    Encode(serde_json::Error),
    #[error("invalid url {url:?}: {message}")]
    InvalidUrl { url: String, message: String },
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Network(err)
        }
    }
}

#[derive(Debug, Default)]
pub enum Body {
    #[default]
    None,
    Json(serde_json::Value),
    /// Sent without an explicit content type; the boundary is chosen by
    /// the HTTP stack.
    Multipart(Form),
}

#[derive(Debug)]
pub struct Request {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    body: Body,
}

impl Request {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: Body::None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self, GatewayError> {
        let value = serde_json::to_value(body).map_err(GatewayError::Encode)?;
        self.body = Body::Json(value);
        Ok(self)
    }

    pub fn multipart(mut self, form: Form) -> Self {
        self.body = Body::Multipart(form);
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

/// A successful response, body already read.
#[derive(Debug)]
pub struct Response {
    status: StatusCode,
    body: String,
}

impl Response {
    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn text(&self) -> &str {
        &self.body
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, GatewayError> {
        serde_json::from_str(&self.body).map_err(GatewayError::Decode)
    }

    /// `message` of a `{message}` body, or the raw text.
    pub fn message(&self) -> String {
        message_of(&self.body).unwrap_or_default()
    }
}

#[derive(Clone)]
pub struct Gateway {
    http: reqwest::Client,
    base_url: String,
    session: Arc<SessionStore>,
    observers: Vec<Arc<dyn SessionObserver>>,
}

impl Gateway {
    /// Build a gateway reading its token from `session`.
    ///
    /// The session store is registered as the first observer of the
    /// session-invalidated event.
    pub fn new(
        base_url: &str,
        timeout: Duration,
        session: Arc<SessionStore>,
    ) -> Result<Self, GatewayError> {
        Url::parse(base_url).map_err(|err| GatewayError::InvalidUrl {
            url: base_url.to_string(),
            message: err.to_string(),
        })?;
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        let observers: Vec<Arc<dyn SessionObserver>> = vec![session.clone()];
        Ok(Self {
            http,
            base_url: base_url.to_string(),
            session,
            observers,
        })
    }

    /// Register another listener for the session-invalidated event.
    pub fn subscribe(&mut self, observer: Arc<dyn SessionObserver>) {
        self.observers.push(observer);
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    fn url(&self, path: &str) -> Result<Url, GatewayError> {
        let raw = format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        Url::parse(&raw).map_err(|err| GatewayError::InvalidUrl {
            url: raw.clone(),
            message: err.to_string(),
        })
    }

    pub async fn call(&self, request: Request) -> Result<Response, GatewayError> {
        let Request {
            method,
            path,
            query,
            body,
        } = request;

        let mut builder = self.http.request(method.clone(), self.url(&path)?);
        if !query.is_empty() {
            builder = builder.query(&query);
        }
        if let Some(token) = self.session.token() {
            builder = builder.bearer_auth(token);
        }
        builder = match body {
            Body::None => builder,
            _ if method == Method::DELETE => {
                tracing::debug!(%path, "dropping body of DELETE request");
                builder
            }
            Body::Json(value) => builder.json(&value),
            Body::Multipart(form) => builder.multipart(form),
        };

        tracing::debug!(%method, %path, "sending request");
        let resp = builder.send().await?;
        let status = resp.status();
        let text = resp.text().await?;

        if message_of(&text).as_deref() == Some(NOT_AUTHORIZED) {
            tracing::warn!(%method, %path, "backend rejected the token, clearing session");
            self.publish_invalidated();
            return Err(GatewayError::Unauthorized);
        }
        if status == StatusCode::TOO_MANY_REQUESTS {
            tracing::warn!(%method, %path, "rate limited");
            return Err(GatewayError::RateLimited(text));
        }
        if !status.is_success() {
            let message = message_of(&text).unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_string()
            });
            return Err(GatewayError::Server { status, message });
        }

        Ok(Response { status, body: text })
    }

    fn publish_invalidated(&self) {
        for observer in &self.observers {
            observer.on_session_invalidated();
        }
    }
}

/// The human readable message of a backend body: `{message}`, a bare JSON
/// string, or the trimmed text itself.
fn message_of(body: &str) -> Option<String> {
    if let Ok(parsed) = serde_json::from_str::<MessageResponse>(body)
        && !parsed.message.is_empty()
    {
        return Some(parsed.message);
    }
    if let Ok(text) = serde_json::from_str::<String>(body) {
        return Some(text);
    }
    let text = body.trim();
    (!text.is_empty()).then(|| text.to_string())
}
