use thiserror::Error;

use crate::transport::TransportError;

/// Coarse classification of a session failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The server could not be reached, or kept failing after retries.
    Transport,
    /// The credential is no longer accepted. Retrying cannot succeed.
    AuthExpired,
    /// The server understood the call and refused it.
    BusinessRejected,
    /// The server answered with something that is not a valid envelope.
    Malformed,
}

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Transport error on {endpoint}: {source}")]
    Transport {
        endpoint: &'static str,
        #[source]
        source: TransportError,
    },

    #[error("Authentication expired (code {code}): {message}")]
    AuthExpired { code: i64, message: String },

    #[error("{endpoint} rejected (code {code:?}): {message}")]
    BusinessRejected {
        endpoint: &'static str,
        code: Option<i64>,
        message: String,
    },

    #[error("Malformed response from {endpoint}: {detail}")]
    Malformed {
        endpoint: &'static str,
        detail: String,
    },
}

impl SessionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SessionError::Transport { .. } => ErrorKind::Transport,
            SessionError::AuthExpired { .. } => ErrorKind::AuthExpired,
            SessionError::BusinessRejected { .. } => ErrorKind::BusinessRejected,
            SessionError::Malformed { .. } => ErrorKind::Malformed,
        }
    }

    /// Business code carried by the failure, if any.
    pub fn code(&self) -> Option<i64> {
        match self {
            SessionError::AuthExpired { code, .. } => Some(*code),
            SessionError::BusinessRejected { code, .. } => *code,
            _ => None,
        }
    }

    /// Human-readable explanation. For rejections this is the server's own text.
    pub fn message(&self) -> String {
        match self {
            SessionError::AuthExpired { message, .. }
            | SessionError::BusinessRejected { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }

    pub(crate) fn malformed(endpoint: &'static str, detail: impl Into<String>) -> Self {
        SessionError::Malformed {
            endpoint,
            detail: detail.into(),
        }
    }

    pub(crate) fn rejected(
        endpoint: &'static str,
        code: Option<i64>,
        message: impl Into<String>,
    ) -> Self {
        SessionError::BusinessRejected {
            endpoint,
            code,
            message: message.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum SignError {
    #[error("Signing secret must be 16 ASCII characters, got {0}")]
    SecretLength(usize),

    #[error("Signing IV must be 16 ASCII characters, got {0}")]
    IvLength(usize),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid signing material: {0}")]
    Signing(#[from] SignError),

    #[error("Missing required setting: {0}")]
    Missing(&'static str),

    #[error("Cannot build HTTP client: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid setting {field}: {reason}")]
    Invalid {
        field: &'static str,
        reason: String,
    },
}

/// Problems with the per-run parameters handed over by the orchestrator.
#[derive(Error, Debug)]
pub enum ParamsError {
    #[error("Invalid run parameters: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid trajectory: {0}")]
    Trajectory(#[from] motion::sources::RecordedError),

    #[error("Invalid trajectory file: {0}")]
    Gpx(#[from] motion::sources::GpxError),

    #[error("Invalid parameter {field}: {reason}")]
    Invalid {
        field: &'static str,
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_and_code() {
        let auth = SessionError::AuthExpired {
            code: 1503,
            message: "token expired".into(),
        };
        assert_eq!(auth.kind(), ErrorKind::AuthExpired);
        assert_eq!(auth.code(), Some(1503));

        let rejected = SessionError::rejected("finish", Some(0), "路线未完成");
        assert_eq!(rejected.kind(), ErrorKind::BusinessRejected);
        assert_eq!(rejected.message(), "路线未完成");

        let malformed = SessionError::malformed("start", "missing data");
        assert_eq!(malformed.kind(), ErrorKind::Malformed);
        assert_eq!(malformed.code(), None);
    }
}
