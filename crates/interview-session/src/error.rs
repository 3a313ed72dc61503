use std::path::PathBuf;

use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Failure of an interview state round trip.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The server refused the submitted answers (400 or 422).
    #[error("server rejected the submitted answers ({status})")]
    Rejected { status: u16, body: String },
    /// The server no longer accepts the state token (409).
    #[error("interview state has expired")]
    Expired,
    #[error("protocol violation: {0}")]
    Protocol(String),
    #[error("server returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("request failed: {message}")]
    Transport {
        message: String,
        #[source]
        source: Option<BoxError>,
    },
    #[error("invalid interview state response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("invalid update url `{url}`: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

impl SessionError {
    /// Whether the caller should keep the current step and let the user retry.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, SessionError::Rejected { .. })
    }

    pub fn transport(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        SessionError::Transport {
            message: message.into(),
            source: Some(source.into()),
        }
    }
}

/// Failure of the storage slot. The store logs these and carries on.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to replace {path}: {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("no storage directory could be determined")]
    NoDirectory,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_rejections_are_recoverable() {
        let rejected = SessionError::Rejected {
            status: 422,
            body: String::new(),
        };
        assert!(rejected.is_recoverable());
        assert!(!SessionError::Expired.is_recoverable());
        assert!(!SessionError::Protocol("missing update_url".into()).is_recoverable());
        assert!(
            !SessionError::Status {
                status: 500,
                body: String::new()
            }
            .is_recoverable()
        );
    }
}
