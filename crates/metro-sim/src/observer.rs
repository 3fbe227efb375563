//! Simulation observer trait for progress reporting and data collection.

use metro_core::Tick;

use crate::stats::TickStats;

/// Callbacks invoked by [`CitySim::run`][crate::CitySim::run] at key points
/// in the tick loop.
///
/// All methods have default no-op implementations so implementors only need
/// to override what they care about.
///
/// # Example — progress printer
///
/// ```rust,ignore
/// struct ProgressPrinter;
///
/// impl SimObserver for ProgressPrinter {
///     fn on_stats(&mut self, tick: Tick, stats: &TickStats) {
///         println!("{tick}: {} walking, {} on roads",
///                  stats.citizens_walking, stats.fleet.vehicles_on_roads);
///     }
/// }
/// ```
pub trait SimObserver {
    /// Called at the very start of each tick, before any processing.
    fn on_tick_start(&mut self, _tick: Tick) {}

    /// Called at the end of each tick.
    fn on_tick_end(&mut self, _tick: Tick) {}

    /// Called every `config.stats_interval_ticks` ticks with a fresh
    /// statistics snapshot.
    fn on_stats(&mut self, _tick: Tick, _stats: &TickStats) {}

    /// Called once after the final tick completes.
    fn on_sim_end(&mut self, _final_tick: Tick) {}
}

/// A [`SimObserver`] that does nothing.  Use when you need to call `run` but
/// don't want progress callbacks.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}
