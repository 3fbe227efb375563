use metro_core::{NodeId, SectorId};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum GraphError {
    #[error("node {0} does not exist")]
    UnknownNode(NodeId),

    #[error("self-loop rejected at node {0}")]
    SelfLoop(NodeId),

    #[error("no road between {a} and {b}")]
    NoSuchRoad { a: NodeId, b: NodeId },

    #[error("point ({lat}, {lon}) is outside every sector of the city layout")]
    OutsideCity { lat: f32, lon: f32 },

    #[error("sector {0} has no remaining cell capacity")]
    SectorFull(SectorId),

    #[error("sector {0} is not part of the city layout")]
    UnknownSector(SectorId),

    #[error("corner nodes are generated with their sector and cannot be placed")]
    CornerNotPlaceable,
}

pub type GraphResult<T> = Result<T, GraphError>;
