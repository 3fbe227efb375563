//! The per-tick citizen state machine: need decay, walking progression, and
//! the fixed-priority decision table.
//!
//! # Rule order is the contract
//!
//! The rules below are evaluated top to bottom and the first one that fires
//! wins the tick — earlier rules deliberately mask later ones, and a citizen
//! issues **at most one path request per tick**:
//!
//! 1. health critical → nearest hospital
//! 2. starving and can afford a meal → nearest restaurant
//! 3. exhausted → go home and sleep
//! 4. night → sleep (walking home first if needed)
//! 5. morning, rested → wake
//! 6. school/work departure and return, by hour of day
//! 7. moderately hungry and can afford a meal → nearest restaurant
//! 8. lonely → nearest park
//!
//! # Walking vs. transit
//!
//! A path request whose direct road distance is within [`WALK_THRESHOLD_M`]
//! walks the route; anything farther walks to the nearest transit stop
//! instead (riding itself is handled by the fleet layer, not here).

use log::trace;
use metro_core::{FacilityKind, NodeId, NodeKind, SimClock};
use metro_graph::{CityGraph, PathOutcome};

use crate::citizen::{Activity, Citizen};
use crate::path::{CitizenPath, TripPurpose};

// ── Tuning constants ──────────────────────────────────────────────────────────

pub const WALK_SPEED_MPS: f32 = 1.4;
pub const WALK_THRESHOLD_M: f32 = 2_000.0;

pub const HEALTH_CRITICAL: f32 = 25.0;
pub const STARVING: f32 = 15.0;
pub const HUNGRY: f32 = 40.0;
pub const EXHAUSTED: f32 = 15.0;
pub const LONELY: f32 = 25.0;

pub const MEAL_COST: f32 = 12.0;
pub const WAGE_PER_TICK: f32 = 0.35;

/// Sleepers wake once it is day and energy has recovered past this level.
pub const WAKE_ENERGY: f32 = 60.0;

pub const SCHOOL_HOUR: u32 = 8;
pub const SCHOOL_RETURN_HOUR: u32 = 15;
pub const WORK_HOUR: u32 = 9;
pub const WORK_RETURN_HOUR: u32 = 17;

// ── Per-tick driver ───────────────────────────────────────────────────────────

/// Advance one citizen by one tick.
pub fn step(citizen: &mut Citizen, graph: &CityGraph, clock: &SimClock) {
    // Need decay always runs; sleep trades decay for energy recovery.
    match citizen.activity {
        Activity::Sleeping => citizen.needs.sleep_tick(),
        Activity::Working => {
            citizen.needs.decay();
            citizen.needs.wallet += WAGE_PER_TICK;
        }
        _ => citizen.needs.decay(),
    }

    if citizen.is_walking() {
        walk_tick(citizen, graph, clock);
        return;
    }

    decide(citizen, graph, clock);
}

// ── Walking ───────────────────────────────────────────────────────────────────

fn walk_tick(citizen: &mut Citizen, graph: &CityGraph, clock: &SimClock) {
    let Some(path) = citizen.path.as_mut() else { return };

    if !path.finished() {
        let here = path.current();
        let next = path.next().expect("unfinished path has a next node");
        let leg_m = match (graph.position(here), graph.position(next)) {
            (Some(a), Some(b)) => a.distance_m(b),
            _ => 0.0,
        };
        let step_m = WALK_SPEED_MPS * clock.tick_duration_secs as f32;
        let fraction = if leg_m <= f32::EPSILON { 1.0 } else { step_m / leg_m };
        path.advance(fraction);
        citizen.at = path.current();
    }

    if citizen.path.as_ref().is_some_and(|p| p.finished()) {
        let path = citizen.path.take().expect("checked above");
        citizen.at = path.destination;
        apply_arrival(citizen, path.purpose);
    }
}

/// Arrival side effects, keyed by why the trip was taken.
fn apply_arrival(citizen: &mut Citizen, purpose: TripPurpose) {
    match purpose {
        TripPurpose::Eat => {
            if citizen.needs.wallet >= MEAL_COST {
                citizen.needs.eat(MEAL_COST);
            }
            citizen.activity = Activity::Idle;
        }
        TripPurpose::Heal => {
            citizen.needs.health = 100.0;
            citizen.activity = Activity::Idle;
        }
        TripPurpose::Socialize => {
            citizen.needs.social = 100.0;
            citizen.activity = Activity::Idle;
        }
        TripPurpose::GoHome => citizen.activity = Activity::Idle,
        TripPurpose::GoHomeToSleep => citizen.activity = Activity::Sleeping,
        TripPurpose::GoToWork => citizen.activity = Activity::Working,
        TripPurpose::GoToSchool => citizen.activity = Activity::InSchool,
        // Riding is out of scope for the walking layer: the citizen waits
        // at the stop as Idle and the fleet layer takes over.
        TripPurpose::CatchTransit => citizen.activity = Activity::Idle,
    }
    trace!("{}: arrived at {} ({:?})", citizen.name, citizen.at, citizen.activity);
}

// ── Decision table ────────────────────────────────────────────────────────────

fn decide(citizen: &mut Citizen, graph: &CityGraph, clock: &SimClock) {
    let hour = clock.hour_of_day();

    // 1. Health emergency.
    if citizen.needs.health < HEALTH_CRITICAL {
        go_to_nearest(citizen, graph, FacilityKind::Hospital, TripPurpose::Heal);
        return;
    }

    // 2. Starvation (if affordable; a broke citizen keeps deteriorating
    //    until the health rule takes over).
    if citizen.needs.hunger < STARVING && citizen.needs.wallet >= MEAL_COST {
        go_to_nearest(citizen, graph, FacilityKind::Restaurant, TripPurpose::Eat);
        return;
    }

    // 3. Exhaustion: head home and sleep.
    let home = citizen.home;
    if citizen.needs.energy < EXHAUSTED {
        go(citizen, graph, home, TripPurpose::GoHomeToSleep);
        return;
    }

    // 4. Night: sleep (walking home first if out).
    if clock.is_night() && citizen.activity != Activity::Sleeping {
        go(citizen, graph, home, TripPurpose::GoHomeToSleep);
        return;
    }

    // 5. Morning wake, once rested.
    if !clock.is_night()
        && citizen.activity == Activity::Sleeping
        && citizen.needs.energy >= WAKE_ENERGY
    {
        citizen.activity = Activity::Idle;
        return;
    }
    if citizen.activity == Activity::Sleeping {
        return; // still asleep; later rules don't apply
    }

    // 6. Scheduled school / work, with the matching afternoon return.
    if let Some(school) = citizen.school {
        if (SCHOOL_HOUR..SCHOOL_RETURN_HOUR).contains(&hour)
            && citizen.activity != Activity::InSchool
        {
            go(citizen, graph, school, TripPurpose::GoToSchool);
            return;
        }
        if hour >= SCHOOL_RETURN_HOUR && citizen.activity == Activity::InSchool {
            go(citizen, graph, home, TripPurpose::GoHome);
            return;
        }
    }
    if let Some(work) = citizen.work {
        if (WORK_HOUR..WORK_RETURN_HOUR).contains(&hour) && citizen.activity != Activity::Working
        {
            go(citizen, graph, work, TripPurpose::GoToWork);
            return;
        }
        if hour >= WORK_RETURN_HOUR && citizen.activity == Activity::Working {
            go(citizen, graph, home, TripPurpose::GoHome);
            return;
        }
    }

    // 7. Moderate hunger.
    if citizen.needs.hunger < HUNGRY && citizen.needs.wallet >= MEAL_COST {
        go_to_nearest(citizen, graph, FacilityKind::Restaurant, TripPurpose::Eat);
        return;
    }

    // 8. Loneliness.
    if citizen.needs.social < LONELY {
        go_to_nearest(citizen, graph, FacilityKind::Park, TripPurpose::Socialize);
    }
}

// ── Path requests ─────────────────────────────────────────────────────────────

/// Issue the tick's single path request towards `dest`.  Destinations within
/// walking range are walked directly; farther ones walk to the nearest
/// transit stop instead.  Already being there applies the arrival effect
/// immediately.
fn go(citizen: &mut Citizen, graph: &CityGraph, dest: NodeId, purpose: TripPurpose) {
    if citizen.at == dest {
        apply_arrival(citizen, purpose);
        return;
    }
    let Ok(PathOutcome::Found(route)) = graph.shortest_path(citizen.at, dest) else {
        trace!("{}: no route to {dest}", citizen.name);
        return;
    };

    if route.total_m <= WALK_THRESHOLD_M {
        citizen.path = Some(CitizenPath::from_route(route, purpose));
        citizen.activity = Activity::Walking;
        return;
    }

    // Already waiting at a stop: stay put for the fleet layer.
    if graph
        .node(citizen.at)
        .is_some_and(|n| n.kind == NodeKind::TransitStop)
    {
        return;
    }

    // Too far on foot: head for the nearest transit stop instead.
    match graph.nearest_facility(citizen.at, NodeKind::TransitStop) {
        Ok(Some((stop, _))) => {
            if let Ok(PathOutcome::Found(leg)) = graph.shortest_path(citizen.at, stop) {
                citizen.path = Some(CitizenPath::from_route(leg, TripPurpose::CatchTransit));
                citizen.activity = Activity::Walking;
            }
        }
        _ => {
            // No transit anywhere: walk it anyway rather than stand forever.
            citizen.path = Some(CitizenPath::from_route(route, purpose));
            citizen.activity = Activity::Walking;
        }
    }
}

/// Like [`go`], but towards the nearest facility of `kind`.
fn go_to_nearest(citizen: &mut Citizen, graph: &CityGraph, kind: FacilityKind, purpose: TripPurpose) {
    if graph
        .node(citizen.at)
        .is_some_and(|n| n.kind == NodeKind::Facility(kind))
    {
        apply_arrival(citizen, purpose);
        return;
    }
    match graph.nearest_facility(citizen.at, NodeKind::Facility(kind)) {
        Ok(Some((dest, _))) => go(citizen, graph, dest, purpose),
        _ => trace!("{}: no reachable {kind}", citizen.name),
    }
}
