use crate::catalog::ItemId;

/// Distinct, non-retriable failure conditions surfaced to the caller. The two
/// "no results" outcomes (a filter that matches nothing, a chosen item with no
/// genre-mates) are normal returns, not variants here.
#[derive(thiserror::Error, Debug)]
pub enum EngineError {
    #[error("catalog is empty; nothing to fit")]
    EmptyCatalog,

    #[error("unknown item id {0}")]
    UnknownItem(ItemId),

    #[error("artifacts were built from a different catalog snapshot (expected {expected}, found {found})")]
    StaleArtifacts { expected: String, found: String },

    #[error("invalid filter range: {0}")]
    InvalidFilterRange(String),

    #[error("filtered set is empty; nothing to recommend from")]
    EmptyFilteredSet,

    #[error("artifact io: {0}")]
    Io(#[from] std::io::Error),

    #[error("artifact encoding: {0}")]
    Codec(#[from] bincode::Error),

    #[error("artifact metadata: {0}")]
    Meta(#[from] serde_json::Error),
}
