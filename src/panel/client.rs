//! Client side of the REST API.
//!
//! [`StringsApi`] is the seam between the panel and the server;
//! [`HttpApi`] implements it with the synchronous `ureq` client.

use std::time::Duration;

use thiserror::Error;

use crate::config::schema::ClientConfig;
use crate::protocol::StringsResponse;

/// Why an API call failed.
#[derive(Error, Debug)]
pub enum ApiError {
    /// The server answered with a non-success status.
    #[error("server returned {status}: {message}")]
    Rejected { status: u16, message: String },

    /// The server could not be reached.
    #[error("request failed: {0}")]
    Transport(String),

    /// The response body was not what the API promises.
    #[error("invalid response: {0}")]
    Decode(String),
}

impl ApiError {
    /// Server-provided error text, if the server answered.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Rejected { message, .. } => Some(message),
            _ => None,
        }
    }
}

/// The five endpoints the panel mirrors.
pub trait StringsApi: Send + Sync {
    /// `GET /api/strings?query=Q`
    fn fetch(&self, query: &str) -> Result<StringsResponse, ApiError>;
    /// `PUT /api/showTranslations?show=B`
    fn set_show_translations(&self, show: bool) -> Result<(), ApiError>;
    /// `POST /api/add`
    fn add(&self, key: &str, value: &str) -> Result<(), ApiError>;
    /// `POST /api/edit`
    fn edit(&self, key: &str, lang: &str, value: &str) -> Result<(), ApiError>;
    /// `POST /api/remove`
    fn remove(&self, key: &str) -> Result<(), ApiError>;
}

/// Synchronous HTTP implementation of [`StringsApi`].
#[derive(Debug, Clone)]
pub struct HttpApi {
    base_url: String,
    timeout: Duration,
}

impl HttpApi {
    /// Build a client from the resolved config.
    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(&config.base_url, Duration::from_millis(config.timeout_ms))
    }

    pub fn new(base_url: &str, timeout: Duration) -> Self {
        // "localhost" may resolve to ::1 first while the server binds IPv4 only.
        let base_url = base_url
            .trim_end_matches('/')
            .replace("://localhost", "://127.0.0.1");
        Self { base_url, timeout }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Whether the server answers at all.
    pub fn is_reachable(&self) -> bool {
        ureq::get(&self.url("/"))
            .timeout(Duration::from_secs(2))
            .call()
            .is_ok()
    }

    fn post_form(&self, path: &str, fields: &[(&str, &str)]) -> Result<(), ApiError> {
        ureq::post(&self.url(path))
            .timeout(self.timeout)
            .send_form(fields)
            .map(|_| ())
            .map_err(into_api_error)
    }
}

impl StringsApi for HttpApi {
    fn fetch(&self, query: &str) -> Result<StringsResponse, ApiError> {
        let resp = ureq::get(&self.url("/api/strings"))
            .timeout(self.timeout)
            .query("query", query)
            .call()
            .map_err(into_api_error)?;

        resp.into_json::<StringsResponse>()
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    fn set_show_translations(&self, show: bool) -> Result<(), ApiError> {
        ureq::put(&self.url("/api/showTranslations"))
            .timeout(self.timeout)
            .query("show", if show { "true" } else { "false" })
            .call()
            .map(|_| ())
            .map_err(into_api_error)
    }

    fn add(&self, key: &str, value: &str) -> Result<(), ApiError> {
        self.post_form("/api/add", &[("key", key), ("value", value)])
    }

    fn edit(&self, key: &str, lang: &str, value: &str) -> Result<(), ApiError> {
        self.post_form("/api/edit", &[("key", key), ("lang", lang), ("value", value)])
    }

    fn remove(&self, key: &str) -> Result<(), ApiError> {
        self.post_form("/api/remove", &[("key", key)])
    }
}

fn into_api_error(err: ureq::Error) -> ApiError {
    match err {
        ureq::Error::Status(status, resp) => {
            let message = resp.into_string().unwrap_or_default();
            ApiError::Rejected {
                status,
                message: message.trim_end().to_string(),
            }
        }
        ureq::Error::Transport(transport) => ApiError::Transport(transport.to_string()),
    }
}
