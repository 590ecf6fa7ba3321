//! Error taxonomy for backend fetches.
//!
//! Four buckets, handled differently by the front ends:
//! configuration errors are fatal to the affected component, not-found is an
//! expected user-facing outcome and never logged as an error, transport and
//! server errors are shown generically and logged with context. Nothing is
//! retried automatically.

use thiserror::Error;

/// Failure of one backend operation.
///
/// Cloneable so completed-fetch messages can carry it through the UI event
/// channel.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The record does not exist for this selection. Expected, recoverable.
    #[error("registro não encontrado")]
    NotFound,

    /// The server answered with a non-success status.
    #[error("HTTP {status}: {detail}")]
    Http { status: u16, detail: String },

    /// The request never completed: DNS, connect, or timeout failure.
    #[error("falha de rede: {0}")]
    Transport(String),

    /// The body was not the expected JSON shape.
    #[error("resposta inválida: {0}")]
    Decode(String),

    /// The operation could not be attempted due to bad configuration.
    #[error("configuração inválida: {0}")]
    Config(String),
}

impl FetchError {
    /// Whether this outcome is an expected miss rather than a fault.
    pub fn is_not_found(&self) -> bool {
        matches!(self, FetchError::NotFound)
    }

    pub fn transport(err: reqwest::Error) -> Self {
        FetchError::Transport(err.to_string())
    }

    pub fn decode(err: impl std::fmt::Display) -> Self {
        FetchError::Decode(err.to_string())
    }
}
