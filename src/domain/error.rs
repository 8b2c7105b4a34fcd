use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("Malformed upstream data: {0}")]
    MalformedUpstreamData(String),

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Store write failed: {0}")]
    StoreWriteFailed(String),

    /// The store refused a write because the identifier is already taken.
    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("Canceled: {0}")]
    Canceled(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn invalid_identifier(msg: impl Into<String>) -> Self {
        Self::InvalidIdentifier(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn upstream(msg: impl Into<String>) -> Self {
        Self::UpstreamUnavailable(msg.into())
    }

    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedUpstreamData(msg.into())
    }

    pub fn store_unavailable(msg: impl Into<String>) -> Self {
        Self::StoreUnavailable(msg.into())
    }

    pub fn store_write(msg: impl Into<String>) -> Self {
        Self::StoreWriteFailed(msg.into())
    }

    pub fn already_exists(msg: impl Into<String>) -> Self {
        Self::AlreadyExists(msg.into())
    }

    pub fn canceled(msg: impl Into<String>) -> Self {
        Self::Canceled(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    pub fn is_already_exists(&self) -> bool {
        matches!(self, Self::AlreadyExists(_))
    }

    pub fn is_canceled(&self) -> bool {
        matches!(self, Self::Canceled(_))
    }

    pub fn is_store_error(&self) -> bool {
        matches!(self, Self::StoreUnavailable(_) | Self::StoreWriteFailed(_))
    }
}
