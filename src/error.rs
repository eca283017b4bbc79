#[derive(thiserror::Error, Debug)]
pub enum PronounceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid phonetic dictionary: {0}")]
    Dictionary(String),
    #[error("History store unavailable: {0}")]
    HistoryUnavailable(String),
    #[error("No listening session is active. Call start() first.")]
    SessionNotActive,
}
