//! Error types for oj-scrape.
//!
//! Every failure the core can surface is a variant of [`Error`], so a driving
//! process can serialize outcomes uniformly through [`ErrorEnvelope`].
//! Image embedding failures have no variant: they degrade to unembedded
//! images. Poll exhaustion returns the last observed status.

use serde::Serialize;

/// Error type for scraping and submission operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The judge answered with a login redirect or an embedded login form.
    #[error("authentication required")]
    AuthRequired,

    /// An expected structural element (form, status table, status record) is missing.
    #[error("unexpected page structure: {0}")]
    MalformedUpstream(String),

    /// The submission was sent but no new status row appeared.
    #[error(
        "submission may have been accepted but no new status row appeared after {attempts} attempts"
    )]
    ReconciliationTimeout {
        /// Number of re-fetch attempts made after the submission.
        attempts: u32,
    },

    /// A collaborator (session, fetcher, backend) failed to deliver a response.
    #[error("transport failed: {0}")]
    Transport(String),

    /// A URL could not be parsed or joined against the site base.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

impl Error {
    /// Stable snake_case tag used in serialized envelopes.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::AuthRequired => "auth_required",
            Self::MalformedUpstream(_) => "malformed_upstream",
            Self::ReconciliationTimeout { .. } => "reconciliation_timeout",
            Self::Transport(_) => "transport",
            Self::InvalidUrl(_) => "invalid_url",
        }
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Self::InvalidUrl(err.to_string())
    }
}

/// Serializable form of an [`Error`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorEnvelope {
    /// Value of [`Error::kind`].
    pub kind: &'static str,
    /// Human-readable message.
    pub message: String,
}

impl From<&Error> for ErrorEnvelope {
    fn from(err: &Error) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

/// Result type alias for oj-scrape operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_carries_kind_and_message() {
        let err = Error::ReconciliationTimeout { attempts: 20 };
        let envelope = ErrorEnvelope::from(&err);
        assert_eq!(envelope.kind, "reconciliation_timeout");
        assert!(envelope.message.contains("20 attempts"));
        assert!(envelope.message.contains("may have been accepted"));
    }

    #[test]
    fn test_url_parse_error_converts() {
        let err: Error = url::Url::parse("not a url").unwrap_err().into();
        assert_eq!(err.kind(), "invalid_url");
    }
}
