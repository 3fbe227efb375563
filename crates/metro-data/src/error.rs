use metro_graph::GraphError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DataError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("unknown facility kind {0:?}")]
    UnknownKind(String),

    #[error("unknown role {0:?}: expected \"worker\", \"student\", or \"resident\"")]
    UnknownRole(String),

    #[error("dataset row references sector {0:?}, which is not in the city layout")]
    UnknownSector(String),

    #[error(transparent)]
    Graph(#[from] GraphError),
}

pub type DataResult<T> = Result<T, DataError>;
