pub type Result<T> = std::result::Result<T, GraphError>;

#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("Invalid entities: all entities must exist in the graph (missing: {})", .0.join(", "))]
    InvalidEntities(Vec<String>),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Embedder has not been fitted")]
    NotFitted,

    #[error("Entity has no embedding: {0}")]
    EntityNotEmbedded(String),

    #[error("Failed to load transformer: {0}")]
    Load(String),

    #[error("Thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Encoding error: {0}")]
    Encoding(#[from] bincode::Error),
}

impl GraphError {
    pub fn invalid_parameter<S: Into<String>>(msg: S) -> Self {
        GraphError::InvalidParameter(msg.into())
    }

    pub fn load<S: Into<String>>(msg: S) -> Self {
        GraphError::Load(msg.into())
    }

    pub fn entity_not_embedded<S: Into<String>>(entity: S) -> Self {
        GraphError::EntityNotEmbedded(entity.into())
    }
}
