//! Fluent builder for constructing a [`CitySim`].

use metro_agent::Citizen;
use metro_core::{NodeId, SimConfig};
use metro_fleet::FleetManager;
use metro_graph::CityGraph;

use crate::{CitySim, SimError, SimResult};

/// Fluent builder for [`CitySim`].
///
/// # Required inputs
///
/// - [`SimConfig`] — total ticks, seed, tick duration, …
/// - [`CityGraph`] — the road graph, already populated with facilities
///
/// # Optional inputs (have defaults)
///
/// | Method          | Default               |
/// |-----------------|-----------------------|
/// | `.fleet(m)`     | Empty `FleetManager`  |
/// | `.citizens(v)`  | No citizens           |
///
/// # Example
///
/// ```rust,ignore
/// let mut sim = SimBuilder::new(config, graph)
///     .fleet(fleet)
///     .citizens(citizens)
///     .build()?;
/// sim.run(&mut NoopObserver);
/// ```
pub struct SimBuilder {
    config: SimConfig,
    graph: CityGraph,
    fleet: Option<FleetManager>,
    citizens: Option<Vec<Citizen>>,
}

impl SimBuilder {
    pub fn new(config: SimConfig, graph: CityGraph) -> Self {
        Self {
            config,
            graph,
            fleet: None,
            citizens: None,
        }
    }

    /// Supply the fleet manager with its registered vehicles.
    pub fn fleet(mut self, fleet: FleetManager) -> Self {
        self.fleet = Some(fleet);
        self
    }

    /// Supply the population.
    pub fn citizens(mut self, citizens: Vec<Citizen>) -> Self {
        self.citizens = Some(citizens);
        self
    }

    /// Validate the inputs and produce a ready-to-run [`CitySim`].
    ///
    /// Every node a citizen references (home, work, school, current) must
    /// exist in the graph; a dangling reference is a configuration error,
    /// not a runtime surprise.
    pub fn build(self) -> SimResult<CitySim> {
        self.config.validate()?;

        let citizens = self.citizens.unwrap_or_default();
        for citizen in &citizens {
            let mut check = |node: NodeId| -> SimResult<()> {
                if self.graph.node(node).is_none() {
                    return Err(SimError::UnknownCitizenNode {
                        citizen: citizen.id,
                        node,
                    });
                }
                Ok(())
            };
            check(citizen.home)?;
            check(citizen.at)?;
            if let Some(work) = citizen.work {
                check(work)?;
            }
            if let Some(school) = citizen.school {
                check(school)?;
            }
        }

        Ok(CitySim {
            clock: self.config.make_clock(),
            config: self.config,
            graph: self.graph,
            fleet: self.fleet.unwrap_or_default(),
            citizens,
        })
    }
}
