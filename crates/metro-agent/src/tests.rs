//! Unit tests for metro-agent.

#[cfg(test)]
mod helpers {
    use metro_core::{CitizenId, FacilityKind, GeoPoint, NodeId, SimClock};
    use metro_graph::{CityGraph, SectorLayout};

    use crate::Citizen;

    /// One-sector city with a home, restaurant, hospital, and park.
    pub struct TestCity {
        pub graph: CityGraph,
        pub home: NodeId,
        pub restaurant: NodeId,
        pub hospital: NodeId,
        pub park: NodeId,
    }

    pub fn city() -> TestCity {
        let layout = SectorLayout::grid(GeoPoint::new(0.0, 0.0), 1, 1, 0.04);
        let mut graph = CityGraph::new(layout, 21);
        graph.init_all_sectors().unwrap();
        let home = graph
            .add_facility("12 Elm St", FacilityKind::Residence, GeoPoint::new(0.005, 0.005), None)
            .unwrap();
        let restaurant = graph
            .add_facility("Corner Diner", FacilityKind::Restaurant, GeoPoint::new(0.005, 0.015), None)
            .unwrap();
        let hospital = graph
            .add_facility("Mercy Hospital", FacilityKind::Hospital, GeoPoint::new(0.015, 0.005), None)
            .unwrap();
        let park = graph
            .add_facility("Greenfield Park", FacilityKind::Park, GeoPoint::new(0.015, 0.015), None)
            .unwrap();
        TestCity { graph, home, restaurant, hospital, park }
    }

    pub fn citizen(home: NodeId) -> Citizen {
        Citizen::new(CitizenId(0), "Alex Reyes", home, 100.0)
    }

    /// A daytime clock (10:00, 1-minute ticks).
    pub fn day_clock() -> SimClock {
        SimClock::new(10 * 3600, 60)
    }

    /// A night clock (23:00).
    pub fn night_clock() -> SimClock {
        SimClock::new(23 * 3600, 60)
    }

    /// Step `state` until `done` returns true, at most `max` times.
    ///
    /// `state` is threaded through the closures so `step` (mutable) and `done`
    /// (shared) never hold overlapping borrows of the same local.
    pub fn run_until<S>(
        max: usize,
        state: &mut S,
        mut step: impl FnMut(&mut S),
        mut done: impl FnMut(&S) -> bool,
    ) {
        for _ in 0..max {
            if done(state) {
                return;
            }
            step(state);
        }
        assert!(done(state), "condition not reached within {max} ticks");
    }
}

// ── Needs ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod needs {
    use crate::needs::{CitizenNeeds, HUNGER_DECAY, STARVATION_HEALTH_DECAY};

    #[test]
    fn decay_is_linear_and_clamped() {
        let mut n = CitizenNeeds::rested(50.0);
        n.decay();
        assert!((n.hunger - (100.0 - HUNGER_DECAY)).abs() < 1e-5);
        for _ in 0..100_000 {
            n.decay();
        }
        assert_eq!(n.hunger, 0.0);
        assert_eq!(n.energy, 0.0);
        assert!(n.health < 100.0, "starvation erodes health");
    }

    #[test]
    fn health_holds_while_fed() {
        let mut n = CitizenNeeds::rested(50.0);
        for _ in 0..100 {
            n.decay();
        }
        assert_eq!(n.health, 100.0);
    }

    #[test]
    fn starvation_erodes_health() {
        let mut n = CitizenNeeds::rested(50.0);
        n.hunger = 0.0;
        n.decay();
        assert!((n.health - (100.0 - STARVATION_HEALTH_DECAY)).abs() < 1e-5);
    }

    #[test]
    fn sleep_recovers_energy() {
        let mut n = CitizenNeeds::rested(50.0);
        n.energy = 10.0;
        for _ in 0..100 {
            n.sleep_tick();
        }
        assert!(n.energy > 30.0);
    }

    #[test]
    fn eating_spends_money() {
        let mut n = CitizenNeeds::rested(20.0);
        n.hunger = 5.0;
        n.eat(12.0);
        assert_eq!(n.hunger, 100.0);
        assert_eq!(n.wallet, 8.0);
    }
}

// ── Path progression ──────────────────────────────────────────────────────────

#[cfg(test)]
mod path {
    use metro_core::NodeId;
    use metro_graph::Route;

    use crate::path::{CitizenPath, TripPurpose};

    fn three_node_path() -> CitizenPath {
        let route = Route {
            nodes: vec![NodeId(0), NodeId(1), NodeId(2)],
            total_m: 200.0,
        };
        CitizenPath::from_route(route, TripPurpose::Eat)
    }

    #[test]
    fn snaps_on_crossing_one() {
        let mut p = three_node_path();
        assert_eq!(p.current(), NodeId(0));
        assert!(!p.advance(0.6));
        assert!((p.progress - 0.6).abs() < 1e-6);
        assert!(p.advance(0.6)); // crosses 1.0
        assert_eq!(p.current(), NodeId(1));
        assert_eq!(p.progress, 0.0);
        assert!(!p.finished());
    }

    #[test]
    fn finishes_at_destination() {
        let mut p = three_node_path();
        p.advance(1.0);
        p.advance(1.0);
        assert!(p.finished());
        assert_eq!(p.current(), NodeId(2));
        assert_eq!(p.destination, NodeId(2));
        // Advancing past the end is a no-op.
        assert!(!p.advance(1.0));
    }
}

// ── Decision rules ────────────────────────────────────────────────────────────

#[cfg(test)]
mod rules {
    use super::helpers::{citizen, city, day_clock, night_clock, run_until};
    use crate::decide::{EXHAUSTED, HEALTH_CRITICAL, MEAL_COST, STARVING};
    use crate::{step, Activity, TripPurpose};

    #[test]
    fn walks_to_restaurant_when_starving_and_eats() {
        let c = city();
        let clock = day_clock();
        let mut alex = citizen(c.home);
        alex.needs.hunger = STARVING - 1.0;
        let wallet_before = alex.needs.wallet;

        step(&mut alex, &c.graph, &clock);
        assert_eq!(alex.activity, Activity::Walking);
        assert_eq!(alex.path.as_ref().unwrap().destination, c.restaurant);

        run_until(
            2000,
            &mut alex,
            |alex| step(alex, &c.graph, &clock),
            |alex| !alex.is_walking(),
        );
        assert_eq!(alex.at, c.restaurant);
        assert_eq!(alex.needs.hunger, 100.0);
        assert!((alex.needs.wallet - (wallet_before - MEAL_COST)).abs() < 0.01);
    }

    #[test]
    fn health_crisis_masks_hunger() {
        let c = city();
        let clock = day_clock();
        let mut alex = citizen(c.home);
        alex.needs.hunger = STARVING - 1.0;
        alex.needs.health = HEALTH_CRITICAL - 1.0;

        step(&mut alex, &c.graph, &clock);
        // Hospital wins over restaurant: rule 1 masks rule 2.
        assert_eq!(alex.path.as_ref().unwrap().destination, c.hospital);
        assert_eq!(alex.path.as_ref().unwrap().purpose, TripPurpose::Heal);

        run_until(
            2000,
            &mut alex,
            |alex| step(alex, &c.graph, &clock),
            |alex| !alex.is_walking(),
        );
        assert_eq!(alex.needs.health, 100.0);
    }

    #[test]
    fn broke_citizen_cannot_buy_a_meal() {
        let c = city();
        let clock = day_clock();
        let mut alex = citizen(c.home);
        alex.needs.hunger = STARVING - 1.0;
        alex.needs.wallet = MEAL_COST - 1.0;

        step(&mut alex, &c.graph, &clock);
        // The hunger rules don't fire without money; no restaurant trip.
        assert!(alex.path.is_none() || alex.path.as_ref().unwrap().destination != c.restaurant);
    }

    #[test]
    fn exhaustion_sends_citizen_home_to_sleep() {
        let c = city();
        let clock = day_clock();
        let mut alex = citizen(c.home);
        alex.at = c.park; // out and about
        alex.needs.energy = EXHAUSTED - 1.0;

        step(&mut alex, &c.graph, &clock);
        assert_eq!(alex.path.as_ref().unwrap().destination, c.home);

        run_until(
            2000,
            &mut alex,
            |alex| step(alex, &c.graph, &clock),
            |alex| alex.activity == Activity::Sleeping,
        );
        assert_eq!(alex.at, c.home);
    }

    #[test]
    fn night_triggers_sleep_at_home() {
        let c = city();
        let clock = night_clock();
        let mut alex = citizen(c.home);
        step(&mut alex, &c.graph, &clock);
        assert_eq!(alex.activity, Activity::Sleeping);
    }

    #[test]
    fn morning_wakes_rested_sleeper() {
        let c = city();
        let mut alex = citizen(c.home);
        alex.activity = Activity::Sleeping;
        alex.needs.energy = 95.0;
        let clock = day_clock();
        step(&mut alex, &c.graph, &clock);
        assert_eq!(alex.activity, Activity::Idle);
    }

    #[test]
    fn commuter_goes_to_work_and_returns() {
        let c = city();
        let mut alex = citizen(c.home).with_work(c.park); // park node doubles as office here
        let mut clock = super::helpers::day_clock(); // 10:00, inside work hours

        run_until(
            2000,
            &mut alex,
            |alex| step(alex, &c.graph, &clock),
            |alex| alex.activity == Activity::Working,
        );
        assert_eq!(alex.at, c.park);

        // Jump the clock to 18:00 by advancing 8 simulated hours.
        for _ in 0..(8 * 60) {
            clock.advance();
        }
        assert_eq!(clock.hour_of_day(), 18);

        run_until(
            2000,
            &mut alex,
            |alex| step(alex, &c.graph, &clock),
            |alex| !alex.is_walking() && alex.at == alex.home,
        );
        assert_ne!(alex.activity, Activity::Working);
    }

    #[test]
    fn lonely_citizen_visits_park() {
        let c = city();
        let clock = day_clock();
        let mut alex = citizen(c.home);
        alex.needs.social = 5.0;

        step(&mut alex, &c.graph, &clock);
        assert_eq!(alex.path.as_ref().unwrap().destination, c.park);

        run_until(
            2000,
            &mut alex,
            |alex| step(alex, &c.graph, &clock),
            |alex| !alex.is_walking(),
        );
        assert_eq!(alex.needs.social, 100.0);
    }

    #[test]
    fn one_path_request_per_tick() {
        let c = city();
        let clock = day_clock();
        let mut alex = citizen(c.home);
        // Multiple needs critical at once; only one trip starts.
        alex.needs.hunger = 1.0;
        alex.needs.social = 1.0;
        step(&mut alex, &c.graph, &clock);
        assert!(alex.is_walking());
        // Destination matches the highest-priority firing rule (hunger).
        assert_eq!(alex.path.as_ref().unwrap().destination, c.restaurant);
    }
}

// ── Transit threshold ─────────────────────────────────────────────────────────

#[cfg(test)]
mod transit {
    use metro_core::{FacilityKind, GeoPoint};
    use metro_graph::{CityGraph, SectorLayout};

    use super::helpers::{citizen, day_clock};
    use crate::decide::WALK_THRESHOLD_M;
    use crate::{step, TripPurpose};

    #[test]
    fn long_trips_head_for_a_transit_stop() {
        // Wide city: home in A1, office far east in A3 (well beyond walking).
        let layout = SectorLayout::grid(GeoPoint::new(0.0, 0.0), 1, 3, 0.04);
        let mut graph = CityGraph::new(layout, 33);
        graph.init_all_sectors().unwrap();
        let home = graph
            .add_facility("Home", FacilityKind::Residence, GeoPoint::new(0.005, 0.005), None)
            .unwrap();
        let stop = graph
            .add_transit_stop("Stop A1", GeoPoint::new(0.015, 0.005))
            .unwrap();
        let office = graph
            .add_facility("HQ", FacilityKind::Office, GeoPoint::new(0.005, 0.115), None)
            .unwrap();

        // Sanity: the direct route really is beyond walking range.
        let direct = graph.shortest_path(home, office).unwrap();
        assert!(direct.route().unwrap().total_m > WALK_THRESHOLD_M);

        let clock = day_clock();
        let mut alex = citizen(home).with_work(office);
        step(&mut alex, &graph, &clock);

        let path = alex.path.as_ref().expect("walking somewhere");
        assert_eq!(path.purpose, TripPurpose::CatchTransit);
        assert_eq!(path.destination, stop);
    }
}
