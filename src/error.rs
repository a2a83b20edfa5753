use std::path::PathBuf;

use serde::Deserialize;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: String, reason: String },
    #[error("YouTube {endpoint} failed (HTTP {status}{}): {message}", reason_suffix(.reason))]
    Remote {
        endpoint: &'static str,
        status: u16,
        message: String,
        reason: Option<String>,
    },
    #[error("unable to send http request: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),
    #[error("unexpected response shape: {0}")]
    Mapping(String),
    #[error("response cache i/o failed for {}", .path.display())]
    Cache {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("configuration error: {0}")]
    Config(String),
}

fn reason_suffix(reason: &Option<String>) -> String {
    match reason {
        Some(reason) => format!(", reason={reason}"),
        None => String::new(),
    }
}

impl Error {
    pub(crate) fn invalid(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// HTTP status of a [`Error::Remote`] failure.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Remote { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True for the 403 reasons YouTube uses once the daily quota is spent.
    pub fn is_quota_exceeded(&self) -> bool {
        match self {
            Error::Remote {
                status: 403,
                reason: Some(reason),
                ..
            } => {
                reason.contains("quota")
                    || reason.contains("dailyLimitExceeded")
                    || reason.contains("rateLimitExceeded")
            }
            _ => false,
        }
    }

    /// True when the key itself was rejected rather than the request.
    pub fn is_key_rejected(&self) -> bool {
        match self {
            Error::Remote {
                reason: Some(reason),
                ..
            } => {
                reason.contains("keyInvalid")
                    || reason.contains("ipRefererBlocked")
                    || reason.contains("accessNotConfigured")
                    || reason.contains("forbidden")
            }
            _ => false,
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Transport(Box::new(err))
    }
}

#[derive(Deserialize, Debug)]
pub(crate) struct GoogleApiErrorResponse {
    pub error: GoogleApiError,
}

#[derive(Deserialize, Debug)]
pub(crate) struct GoogleApiError {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub errors: Vec<GoogleApiErrorDetail>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Deserialize, Debug)]
pub(crate) struct GoogleApiErrorDetail {
    pub reason: Option<String>,
}

impl GoogleApiError {
    pub fn reason(&self) -> Option<String> {
        self.errors
            .iter()
            .find_map(|e| e.reason.clone())
            .filter(|r| !r.is_empty())
            .or_else(|| self.status.clone().filter(|s| !s.is_empty()))
    }
}

/// Builds a [`Error::Remote`] from a failed response body, preferring the
/// Google error envelope and falling back to the raw text.
pub(crate) fn remote_error(endpoint: &'static str, status: u16, body: &str) -> Error {
    match serde_json::from_str::<GoogleApiErrorResponse>(body) {
        Ok(parsed) => Error::Remote {
            endpoint,
            status,
            reason: parsed.error.reason(),
            message: parsed.error.message,
        },
        Err(_) => Error::Remote {
            endpoint,
            status,
            message: body.trim().to_owned(),
            reason: None,
        },
    }
}
