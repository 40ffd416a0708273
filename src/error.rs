use thiserror::Error;

/// Failure taxonomy for one scheduled load step. Every kind is fatal for the
/// step that raised it; retries are the caller's business and rely on the
/// drop-and-rebuild / replace semantics of the operations themselves.
#[derive(Debug, Error)]
pub enum EtlError {
    #[error("schema error: {0}")]
    Schema(String),
    #[error("extraction error: {0}")]
    Extraction(String),
    #[error("transform error: {0}")]
    Transform(String),
    #[error("merge integrity error: {message} (conflicting keys: {keys:?})")]
    MergeIntegrity { keys: Vec<String>, message: String },
    #[error("merge error: {0}")]
    Merge(String),
    #[error("query failed: {0}")]
    Query(String),
    #[error("connection error: {0}")]
    Connection(String),
}

impl EtlError {
    /// Key values carried by a merge integrity failure, empty for every
    /// other kind.
    pub fn conflicting_keys(&self) -> &[String] {
        match self {
            EtlError::MergeIntegrity { keys, .. } => keys,
            _ => &[],
        }
    }
}
