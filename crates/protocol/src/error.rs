use thiserror::Error;

/// Identifiers handed to `start` were unusable. Recorded, never thrown.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PreconditionError {
    #[error("Task ID is missing or empty")]
    EmptyTaskId,

    #[error("Principal ID is missing or empty")]
    EmptyPrincipalId,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Decode error: {0}")]
    Decode(String),
}

impl TransportError {
    #[must_use]
    pub const fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Network(_) | Self::Decode(_) => None,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CollectError {
    #[error("page {page} failed after {attempts} attempts: {source}")]
    Transport {
        page: u32,
        attempts: u32,
        #[source]
        source: TransportError,
    },

    #[error("page limit of {0} reached before the last page")]
    PageLimit(u32),
}

impl CollectError {
    #[must_use]
    pub const fn transport(&self) -> Option<&TransportError> {
        match self {
            Self::Transport { source, .. } => Some(source),
            Self::PageLimit(_) => None,
        }
    }
}
