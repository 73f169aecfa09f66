//! Error types for SentiGuard

/// Result type alias using SentiGuard's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for SentiGuard operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Child has no external account id or access token
    #[error("missing external account id or access token")]
    MissingCredentials,

    /// Handle is not in the pre-authorized monitoring pool
    #[error("handle '{0}' is not configured for monitoring")]
    NotConfigured(String),

    /// Non-2xx or otherwise failed response from the social graph API
    #[error("upstream error (status {status}): {message}")]
    Upstream { status: u16, message: String },

    /// Upstream request exceeded the request timeout bound
    #[error("upstream request timed out")]
    Timeout,

    /// Response body did not match the expected schema
    #[error("malformed upstream response: {0}")]
    Malformed(String),

    /// Classifier construction or execution errors
    #[error("classifier error: {0}")]
    Classifier(String),

    /// Persistence errors
    #[error("store error: {0}")]
    Store(String),

    /// Alert delivery errors
    #[error("notification error: {0}")]
    Notification(String),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// Authentication/authorization failures
    #[error("auth error: {0}")]
    Auth(String),

    /// Requested entity does not exist or is not owned by the caller
    #[error("not found: {0}")]
    NotFound(String),

    /// IO errors
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic internal errors
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a new upstream error
    pub fn upstream(status: u16, message: impl Into<String>) -> Self {
        Self::Upstream {
            status,
            message: message.into(),
        }
    }

    /// Create a new malformed-response error
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::Malformed(msg.into())
    }

    /// Create a new classifier error
    pub fn classifier(msg: impl Into<String>) -> Self {
        Self::Classifier(msg.into())
    }

    /// Create a new store error
    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }

    /// Create a new notification error
    pub fn notification(msg: impl Into<String>) -> Self {
        Self::Notification(msg.into())
    }

    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new auth error
    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Auth(msg.into())
    }

    /// Create a new not-found error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a new internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Stable machine-readable code for API responses and ingest reports
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingCredentials => "missing_credentials",
            Self::NotConfigured(_) => "not_configured",
            Self::Upstream { .. } => "upstream_error",
            Self::Timeout => "timeout",
            Self::Malformed(_) => "malformed_response",
            Self::Classifier(_) => "classifier_error",
            Self::Store(_) => "store_error",
            Self::Notification(_) => "notification_error",
            Self::Config(_) => "config_error",
            Self::Auth(_) => "unauthorized",
            Self::NotFound(_) => "not_found",
            Self::Io(_) => "io_error",
            Self::Serialization(_) => "serialization_error",
            Self::Internal(_) => "internal_error",
        }
    }
}
