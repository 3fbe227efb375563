//! Per-tick simulation statistics for observers and UI layers.

use metro_agent::{Activity, Citizen};
use metro_fleet::FleetStats;

/// A point-in-time snapshot across the graph, fleets, and population.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TickStats {
    pub fleet: FleetStats,

    pub citizens: usize,
    pub citizens_walking: usize,
    pub citizens_sleeping: usize,
    pub citizens_working: usize,
    pub citizens_in_school: usize,

    /// Population mean health, 0–100.
    pub mean_health: f32,
    /// Population mean hunger, 0–100.
    pub mean_hunger: f32,
}

impl TickStats {
    pub(crate) fn collect(fleet: FleetStats, citizens: &[Citizen]) -> Self {
        let n = citizens.len();
        let count = |a: Activity| citizens.iter().filter(|c| c.activity == a).count();
        let mean = |f: fn(&Citizen) -> f32| {
            if n == 0 {
                0.0
            } else {
                citizens.iter().map(f).sum::<f32>() / n as f32
            }
        };
        Self {
            fleet,
            citizens: n,
            citizens_walking: count(Activity::Walking),
            citizens_sleeping: count(Activity::Sleeping),
            citizens_working: count(Activity::Working),
            citizens_in_school: count(Activity::InSchool),
            mean_health: mean(|c| c.needs.health),
            mean_hunger: mean(|c| c.needs.hunger),
        }
    }
}
