//! `metro-fleet` — vehicle state machines and fleet dispatch.
//!
//! # Crate layout
//!
//! | Module         | Contents                                                |
//! |----------------|---------------------------------------------------------|
//! | [`vehicle`]    | `VehicleCore`, `RouteNode`, hop/occupancy mechanics     |
//! | [`bus`]        | `Bus`, `Passenger`, per-stop queues, fares              |
//! | [`school_bus`] | `SchoolBus`, `Student`, pickup-sweep state machine      |
//! | [`ambulance`]  | `Ambulance`, transfer lifecycle state machine           |
//! | [`transfer`]   | `PatientTransfer`, `TransferPriority`, triage queue     |
//! | [`manager`]    | `FleetManager`: registries, dispatch, per-tick driver   |
//!
//! All vehicles are owned by the [`FleetManager`] for their lifetime and are
//! driven cooperatively: one [`FleetManager::tick`] advances every vehicle
//! by at most one action (service a stop, move one hop, or take a state
//! transition), then drains the patient-transfer queue against the
//! available ambulances.

pub mod ambulance;
pub mod bus;
pub mod error;
pub mod manager;
pub mod school_bus;
pub mod transfer;
pub mod vehicle;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use ambulance::{Ambulance, AmbulanceStatus};
pub use bus::{Bus, Passenger, STOP_QUEUE_CAP};
pub use error::{FleetError, FleetResult};
pub use manager::{FleetManager, FleetStats, TransferRequest, VehicleKind};
pub use school_bus::{SchoolBus, SchoolBusStatus, Student};
pub use transfer::{PatientTransfer, TransferPriority, TransferQueue};
pub use vehicle::{HopOutcome, RouteNode, VehicleCore};
