use metro_core::{NodeId, VehicleId};
use metro_graph::GraphError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FleetError {
    #[error("vehicle {0} is not registered")]
    UnknownVehicle(VehicleId),

    #[error("no route between stops {from} and {to}")]
    UnroutableLeg { from: NodeId, to: NodeId },

    #[error("a route needs at least two stops, got {0}")]
    RouteTooShort(usize),

    #[error("vehicle {0} is not in a state that allows this operation")]
    InvalidState(VehicleId),

    #[error(transparent)]
    Graph(#[from] GraphError),
}

pub type FleetResult<T> = Result<T, FleetError>;
