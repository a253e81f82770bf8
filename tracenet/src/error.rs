//! Error type for the fallible edges of the crate (snapshot decoding and I/O).
//! Store and reconciliation operations are total and never return it.

#[derive(Debug, thiserror::Error)]
pub enum TraceNetError {
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid snapshot: {0}")]
    InvalidSnapshot(String),
}
