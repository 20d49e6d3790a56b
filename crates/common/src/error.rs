use thiserror::Error;

/// Common error types used across the application.
#[derive(Debug, Error)]
pub enum AppError {
    /// Slack answered but reported `ok: false`.
    #[error("Slack API error in {method}: {detail}")]
    Slack { method: &'static str, detail: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The response body was not the JSON shape we expected.
    #[error("Decode error: {0}")]
    Decode(String),
}

impl AppError {
    pub fn slack(method: &'static str, detail: impl Into<String>) -> Self {
        AppError::Slack {
            method,
            detail: detail.into(),
        }
    }

    /// Whether the failure came from the messaging platform (API or transport)
    /// rather than from our own code.
    pub fn is_platform_fault(&self) -> bool {
        matches!(self, AppError::Slack { .. } | AppError::Http(_))
    }
}
