use thiserror::Error;

/// Failure taxonomy shared by every retrieval mode.
///
/// Recoverable conditions (a failed query rewrite, a failed per-item
/// embedding inside a batch) are handled where they occur and never become
/// an `Error`. What reaches the caller is either an operational setup
/// problem (`BackendUnavailable`, `InvalidConfig`) or a transient fault
/// from a collaborator.
#[derive(Debug, Error)]
pub enum Error {
    /// The backend required by the requested mode is not initialized or
    /// not reachable. Hybrid mode downgrades instead of returning this.
    #[error("backend unavailable: {0}")]
    BackendUnavailable(String),

    /// A single-query embedding failed. There is no fallback vector for a
    /// query, so vector-only search surfaces this.
    #[error("embedding failed: {0}")]
    Embedding(String),

    /// The language-model collaborator failed or returned something that
    /// does not parse. Callers that can fall back (query rewriting) do so
    /// before this escapes.
    #[error("language model call failed: {0}")]
    LanguageModel(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Opaque fault inside a backend implementation.
    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
