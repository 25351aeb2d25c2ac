//! Centralized error types for StudyHub.
//!
//! Uses `thiserror` for ergonomic error definitions. Store-level failures and
//! application-level failures are kept separate so the store layer stays free
//! of domain vocabulary.

/// Failures surfaced by the document-store layer.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("document {collection}/{id} not found")]
    NotFound { collection: String, id: String },

    /// Backend call failure: network, permission, or an injected fault in
    /// tests. Never retried automatically; the caller decides what to do.
    #[error("store unavailable: {message}")]
    Unavailable { message: String },

    #[error("failed to decode document: {0}")]
    Deserialize(#[from] serde_json::Error),
}

/// Core application error type used across all StudyHub crates.
#[derive(Debug, thiserror::Error)]
pub enum StudyhubError {
    // === Validation errors (caught before any store call) ===
    #[error("Validation failed: {message}")]
    Validation { message: String },

    // === Resource errors ===
    #[error("{resource} not found")]
    NotFound { resource: String },

    // === Join-request workflow ===
    #[error("Already a member of this course")]
    AlreadyMember,

    #[error("A join request for this course is already pending")]
    RequestPending,

    /// Membership was granted but the request could not be marked approved.
    /// The two writes are sequential and non-atomic; this variant carries the
    /// request that still needs its status finalized.
    #[error("Membership granted but request {request_id} is still pending")]
    ApprovalIncomplete { request_id: String },

    // === Authorization (client-side enforcement only) ===
    #[error("Forbidden")]
    Forbidden,

    // === Infrastructure errors ===
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl StudyhubError {
    /// Error code string for programmatic handling by screens.
    pub fn error_code(&self) -> &str {
        match self {
            Self::Validation { .. } => "VALIDATION_ERROR",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::AlreadyMember => "ALREADY_MEMBER",
            Self::RequestPending => "REQUEST_PENDING",
            Self::ApprovalIncomplete { .. } => "APPROVAL_INCOMPLETE",
            Self::Forbidden => "FORBIDDEN",
            Self::Store(_) => "STORE_ERROR",
            Self::Io(_) => "IO_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Generic message suitable for a user-facing alert. Screens show this
    /// verbatim; internal details stay in the logs.
    pub fn user_message(&self) -> String {
        match self {
            Self::Store(e) => {
                tracing::error!("Store error: {e}");
                "Something went wrong, please try again".to_string()
            }
            Self::Internal(e) => {
                tracing::error!("Internal error: {e}");
                "Something went wrong, please try again".to_string()
            }
            other => other.to_string(),
        }
    }
}

/// Convenience type alias for Results using StudyhubError.
pub type StudyhubResult<T> = Result<T, StudyhubError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn workflow_errors_show_their_own_message() {
        let err = StudyhubError::AlreadyMember;
        assert_eq!(err.error_code(), "ALREADY_MEMBER");
        assert_eq!(err.user_message(), "Already a member of this course");
    }

    #[test]
    fn infrastructure_errors_show_a_generic_message() {
        let err = StudyhubError::Store(StoreError::Unavailable {
            message: "connection reset".into(),
        });
        assert_eq!(err.error_code(), "STORE_ERROR");
        assert_eq!(err.user_message(), "Something went wrong, please try again");
    }
}
