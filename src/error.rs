use thiserror::Error;

/// Errors raised while evaluating a challenge rule against the press counters.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RuleError {
    #[error("press counters overflowed while evaluating rule (red={red}, blue={blue})")]
    Overflow { red: u32, blue: u32 },
}

/// Failures of the key-value persistence collaborator.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Error)]
pub enum GameError {
    /// The catalog has no challenges, so no round can ever start.
    #[error("challenge catalog is empty")]
    EmptyCatalog,

    #[error("invalid challenge catalog: {0}")]
    InvalidCatalog(String),

    /// A rule failed to evaluate; the round was resolved as a failure.
    #[error("rule for challenge '{challenge}' failed: {source}")]
    Rule {
        challenge: String,
        #[source]
        source: RuleError,
    },

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}
