use metro_core::{CitizenId, MetroError, NodeId};
use metro_fleet::FleetError;
use metro_graph::GraphError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error(transparent)]
    Config(#[from] MetroError),

    #[error("citizen {citizen} references node {node}, which does not exist")]
    UnknownCitizenNode { citizen: CitizenId, node: NodeId },

    #[error(transparent)]
    Fleet(#[from] FleetError),

    #[error(transparent)]
    Graph(#[from] GraphError),
}

pub type SimResult<T> = Result<T, SimError>;
