use thiserror::Error;

/// Failure raised by any backend-facing operation.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Non-2xx response from the platform, carrying its error envelope.
    #[error("{message}")]
    Backend {
        status: u16,
        /// Platform error type, e.g. `user_invalid_credentials`.
        kind: String,
        message: String,
    },

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Rejected client-side before any network call.
    #[error("{0}")]
    Invalid(String),

    #[error("unexpected backend payload: {0}")]
    InvalidResponse(String),
}

impl ApiError {
    pub(crate) fn backend(status: u16, kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Backend {
            status,
            kind: kind.into(),
            message: message.into(),
        }
    }

    /// Error the in-memory backend raises when switched offline.
    pub(crate) fn unavailable() -> Self {
        Self::backend(503, "general_service_unavailable", "service is unavailable")
    }

    /// HTTP status of the backend response, when there was one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Backend { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Outcome of a soft-fail read.
///
/// List/get calls for content entities never raise: a backend failure
/// degrades to the empty default so a public page still renders. The
/// cause is kept alongside the fallback so callers that do care (admin
/// screens, tests) can tell "no data" from "backend down".
#[derive(Debug)]
pub enum Fetched<T> {
    /// The backend answered.
    Fresh(T),
    /// The backend failed; the payload is the empty default.
    Degraded(T, ApiError),
}

impl<T> Fetched<T> {
    /// The data either way, discarding the degradation marker.
    pub fn into_data(self) -> T {
        match self {
            Self::Fresh(data) | Self::Degraded(data, _) => data,
        }
    }

    pub fn data(&self) -> &T {
        match self {
            Self::Fresh(data) | Self::Degraded(data, _) => data,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded(..))
    }

    /// The error behind a degraded read, if any.
    pub fn error(&self) -> Option<&ApiError> {
        match self {
            Self::Fresh(_) => None,
            Self::Degraded(_, err) => Some(err),
        }
    }
}
