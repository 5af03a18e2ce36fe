//! Error types shared by the pipeline and the memory store.

use std::fmt;

/// Closed set of failure kinds a caller can branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    ProviderTimeout,
    ProviderError,
    MalformedResponse,
    FetchFailure,
    StorageFailure,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::ProviderTimeout => "provider timeout",
            ErrorKind::ProviderError => "provider error",
            ErrorKind::MalformedResponse => "malformed response",
            ErrorKind::FetchFailure => "fetch failure",
            ErrorKind::StorageFailure => "storage failure",
        };
        f.write_str(name)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ScoutError {
    #[error("model {model} did not answer within {seconds}s")]
    ProviderTimeout { model: String, seconds: u64 },
    #[error("inference provider error: {0}")]
    Provider(String),
    #[error("malformed response: {0}")]
    MalformedResponse(String),
    #[error("failed to fetch {url}: {reason}")]
    FetchFailure { url: String, reason: String },
    #[error("storage error during {operation}: {detail}")]
    Storage {
        operation: &'static str,
        detail: String,
    },
    #[error("memory {id} was only partially deleted (catalog: {}, snapshot: {})",
        .catalog.as_deref().unwrap_or("ok"),
        .snapshot.as_deref().unwrap_or("ok"))]
    PartialDelete {
        id: String,
        catalog: Option<String>,
        snapshot: Option<String>,
    },
}

impl ScoutError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ScoutError::ProviderTimeout { .. } => ErrorKind::ProviderTimeout,
            ScoutError::Provider(_) => ErrorKind::ProviderError,
            ScoutError::MalformedResponse(_) => ErrorKind::MalformedResponse,
            ScoutError::FetchFailure { .. } => ErrorKind::FetchFailure,
            ScoutError::Storage { .. } | ScoutError::PartialDelete { .. } => {
                ErrorKind::StorageFailure
            }
        }
    }

    pub(crate) fn storage(operation: &'static str, err: impl fmt::Display) -> Self {
        ScoutError::Storage {
            operation,
            detail: err.to_string(),
        }
    }

    pub(crate) fn fetch(url: &str, err: impl fmt::Display) -> Self {
        ScoutError::FetchFailure {
            url: url.to_string(),
            reason: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ScoutError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_mapping() {
        let err = ScoutError::ProviderTimeout {
            model: "qwen".to_string(),
            seconds: 60,
        };
        assert_eq!(err.kind(), ErrorKind::ProviderTimeout);
        assert_eq!(err.to_string(), "model qwen did not answer within 60s");

        assert_eq!(
            ScoutError::Provider("503".into()).kind(),
            ErrorKind::ProviderError
        );
        assert_eq!(
            ScoutError::fetch("https://a.example", "status 404").kind(),
            ErrorKind::FetchFailure
        );
        assert_eq!(
            ScoutError::storage("persist", "disk full").kind(),
            ErrorKind::StorageFailure
        );
    }

    #[test]
    fn test_partial_delete_names_the_failed_half() {
        let err = ScoutError::PartialDelete {
            id: "abc".to_string(),
            catalog: None,
            snapshot: Some("No such file or directory".to_string()),
        };
        assert_eq!(err.kind(), ErrorKind::StorageFailure);
        let msg = err.to_string();
        assert!(msg.contains("catalog: ok"));
        assert!(msg.contains("snapshot: No such file or directory"));
    }
}
