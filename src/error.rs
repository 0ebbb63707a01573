use thiserror::Error;

/// Failures while decoding or encoding JSON. Lookups never fail; an absent
/// key or a mismatched type is reported as None by the map itself.
#[derive(Debug, Error)]
pub enum Error {
    #[error("expected '{{' at the start of a JSON object, found {found}")]
    ExpectedObject { found: String },

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
