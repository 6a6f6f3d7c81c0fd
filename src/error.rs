//! Error types for the sync client and the local store.
//!
//! Authorization failures are classified at the transport layer:
//! - soft: the caller holds a cache fallback and handles the failure locally
//! - hard: the session is unusable for that operation; the session guard
//!   turns it into a recovery-route decision

use thiserror::Error;

/// Errors from the remote sync client.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx status outside the 401/404 cases handled below.
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// HTTP 401. `soft` is true when the request carried a token and the
    /// path is on the hydration allowlist.
    #[error("Unauthorized: {path}")]
    Unauthorized { path: String, soft: bool },

    /// HTTP 404.
    #[error("Not found: {0}")]
    NotFound(String),

    /// 2xx response whose envelope reported `success: false`.
    #[error("Request rejected: {0}")]
    Rejected(String),

    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

impl ApiError {
    /// True for authorization failures the caller may absorb locally
    /// (a cache fallback exists for the endpoint).
    pub fn is_soft_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized { soft: true, .. })
    }

    /// True for authorization failures that invalidate the page's session.
    pub fn is_hard_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized { soft: false, .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound(_))
    }
}

/// Errors from the local cache store and session persistence.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A write was attempted with no tenant scope activated.
    #[error("No active cache scope")]
    NoScope,
}

/// Errors while resolving or persisting engine configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Could not determine home directory")]
    NoHomeDir,

    #[error("Invalid API origin: {0}")]
    InvalidApiUrl(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unauthorized_classification() {
        let soft = ApiError::Unauthorized {
            path: "/api/contacts".to_string(),
            soft: true,
        };
        assert!(soft.is_soft_unauthorized());
        assert!(!soft.is_hard_unauthorized());

        let hard = ApiError::Unauthorized {
            path: "/api/companyhq/create".to_string(),
            soft: false,
        };
        assert!(hard.is_hard_unauthorized());
        assert!(!hard.is_soft_unauthorized());
    }

    #[test]
    fn test_not_found_predicate() {
        let err = ApiError::NotFound("/api/contacts/c-1".to_string());
        assert!(err.is_not_found());
        assert!(!err.is_hard_unauthorized());
    }

    #[test]
    fn test_error_messages() {
        let err = ApiError::Api {
            status: 500,
            message: "internal".to_string(),
        };
        assert_eq!(err.to_string(), "API error 500: internal");

        let err = ApiError::Rejected("owner hydrate failed".to_string());
        assert_eq!(err.to_string(), "Request rejected: owner hydrate failed");
    }
}
