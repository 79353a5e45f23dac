use crate::core::currency::Pair;
use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Failures surfaced by the quote service.
#[derive(Debug, Error)]
pub enum QuoteError {
    #[error("{0}")]
    Validation(String),

    #[error("failed to fetch rate for {pair}: {source}")]
    UpstreamFetch {
        pair: Pair,
        #[source]
        source: BoxError,
    },

    #[error("failed to {operation}: {source}")]
    Persistence {
        operation: String,
        #[source]
        source: BoxError,
    },

    #[error("{0}")]
    NotFound(String),
}

impl QuoteError {
    pub fn upstream(pair: &Pair, source: impl Into<BoxError>) -> Self {
        QuoteError::UpstreamFetch {
            pair: pair.clone(),
            source: source.into(),
        }
    }

    pub fn persistence(operation: impl Into<String>, source: impl Into<BoxError>) -> Self {
        QuoteError::Persistence {
            operation: operation.into(),
            source: source.into(),
        }
    }

    /// Validation and not-found failures are the caller's fault; everything
    /// else is ours.
    pub fn is_client_error(&self) -> bool {
        matches!(self, QuoteError::Validation(_) | QuoteError::NotFound(_))
    }
}
