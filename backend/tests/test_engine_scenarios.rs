//! End-to-end engine scenarios: arrivals, ticks, releases and index upkeep

use emergency_dispatch_core_rs::dispatch::config::{NeighborhoodConfig, UnitConfig};
use emergency_dispatch_core_rs::dispatch::validate_snapshot;
use emergency_dispatch_core_rs::models::event::Event;
use emergency_dispatch_core_rs::{
    DispatchConfig, DispatchEngine, DispatchError, Incident, IncidentId, IndexSizes,
    ServiceCategory, Severity, SystemSnapshot, TraversalOrder,
};
use proptest::prelude::*;
use std::collections::BTreeMap;

fn single_medical_unit_city() -> DispatchConfig {
    DispatchConfig {
        neighborhoods: vec![NeighborhoodConfig {
            id: 1,
            name: "Centro".to_string(),
            services: Vec::new(),
        }],
        units: vec![UnitConfig {
            id: 101,
            category: ServiceCategory::Medical,
            label: "AMB-01".to_string(),
        }],
        ..DispatchConfig::default()
    }
}

fn city() -> DispatchEngine {
    DispatchEngine::new(DispatchConfig::city_default()).unwrap()
}

fn priority_ids(engine: &DispatchEngine) -> Vec<IncidentId> {
    engine.priority_order().map(Incident::id).collect()
}

// ============================================================================
// Arrival and first dispatch
// ============================================================================

#[test]
fn test_medical_dispatch_on_first_tick() {
    let mut engine = DispatchEngine::new(single_medical_unit_city()).unwrap();

    let medical = engine
        .receive_incident(1, ServiceCategory::Medical, Severity::High)
        .unwrap();
    let fire = engine
        .receive_incident(1, ServiceCategory::Fire, Severity::Medium)
        .unwrap();
    assert_eq!((medical, fire), (1, 2));
    assert_eq!(priority_ids(&engine), vec![1, 2]);

    let results = engine.advance_time(1);
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].tick, 1);

    let dispatched: Vec<IncidentId> = results[0].dispatched.iter().map(|d| d.incident_id).collect();
    assert_eq!(dispatched, vec![1]);
    assert!(engine.queue(ServiceCategory::Medical).is_empty());
    assert!(!engine.units().get(101).unwrap().is_available());

    // no fire unit exists, so the fire incident waits
    assert_eq!(engine.queue_len(ServiceCategory::Fire), 1);
}

#[test]
fn test_ids_are_sequential_from_one() {
    let mut engine = city();
    let ids: Vec<IncidentId> = (0..4)
        .map(|_| {
            engine
                .receive_incident(3, ServiceCategory::Police, Severity::Low)
                .unwrap()
        })
        .collect();

    assert_eq!(ids, vec![1, 2, 3, 4]);
}

#[test]
fn test_unknown_neighborhood_is_reported() {
    let mut engine = city();

    assert_eq!(
        engine.receive_incident(6, ServiceCategory::Medical, Severity::High),
        Err(DispatchError::UnknownNeighborhood(6))
    );
    assert_eq!(engine.index_sizes(), IndexSizes { identifier: 0, priority: 0 });
}

// ============================================================================
// Matching rules
// ============================================================================

#[test]
fn test_queue_head_wins_over_higher_severity() {
    let mut engine = DispatchEngine::new(single_medical_unit_city()).unwrap();
    engine
        .receive_incident(1, ServiceCategory::Medical, Severity::Low)
        .unwrap();
    engine
        .receive_incident(1, ServiceCategory::Medical, Severity::High)
        .unwrap();

    let dispatched = engine.process_dispatches();
    assert_eq!(dispatched.len(), 1);
    assert_eq!(dispatched[0].incident_id, 1);

    // priority order is unaffected by dispatch
    assert_eq!(priority_ids(&engine), vec![2, 1]);
}

#[test]
fn test_at_most_one_dispatch_per_category_per_tick() {
    let mut engine = city();
    for _ in 0..3 {
        engine
            .receive_incident(2, ServiceCategory::Fire, Severity::High)
            .unwrap();
    }

    let results = engine.advance_time(2);
    assert_eq!(results[0].dispatched.len(), 1);
    assert_eq!(results[0].dispatched[0].unit_label, "BOMB-01");
    assert_eq!(results[1].dispatched.len(), 1);
    assert_eq!(results[1].dispatched[0].unit_label, "BOMB-02");

    // both fire units busy until the tick 3 sweep
    assert_eq!(engine.queue_len(ServiceCategory::Fire), 1);
}

#[test]
fn test_release_sweep_runs_before_dispatch() {
    let mut engine = city();
    for _ in 0..3 {
        engine
            .receive_incident(1, ServiceCategory::Medical, Severity::Medium)
            .unwrap();
    }

    let results = engine.advance_time(3);

    assert!(results[0].released.is_empty());
    assert!(results[1].released.is_empty());
    assert_eq!(results[2].tick, 3);
    assert_eq!(results[2].released, vec![101, 102]);
    assert_eq!(results[2].dispatched.len(), 1);
    assert_eq!(results[2].dispatched[0].incident_id, 3);
    assert_eq!(results[2].dispatched[0].unit_id, 101);
}

#[test]
fn test_history_records_service_windows() {
    let mut engine = city();
    engine
        .receive_incident(4, ServiceCategory::Fire, Severity::High)
        .unwrap();
    engine.advance_time(1);

    let records: Vec<_> = engine.history().peek_all(ServiceCategory::Fire).collect();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].incident_id, 1);
    assert_eq!(records[0].start_tick, 1);
    assert_eq!(records[0].end_tick, 4);
    assert_eq!(records[0].notes, "Fire suppression");
    assert_eq!(engine.history().total(), 1);
}

// ============================================================================
// Indices and removal
// ============================================================================

#[test]
fn test_dispatch_keeps_incidents_indexed() {
    let mut engine = city();
    engine
        .receive_incident(1, ServiceCategory::Police, Severity::Low)
        .unwrap();
    engine.advance_time(1);

    assert!(engine.queue(ServiceCategory::Police).is_empty());
    assert_eq!(engine.index_sizes(), IndexSizes { identifier: 1, priority: 1 });
    assert!(engine.find_by_id(1).is_ok());
}

#[test]
fn test_remove_by_id_updates_both_indices() {
    let mut engine = city();
    for severity in [Severity::Low, Severity::High, Severity::Medium, Severity::High] {
        engine
            .receive_incident(5, ServiceCategory::Police, severity)
            .unwrap();
    }

    let removed = engine.remove_by_id(2).unwrap();
    assert_eq!(removed.severity(), Severity::High);
    assert_eq!(engine.find_by_id(2), Err(DispatchError::NotFound(2)));
    assert_eq!(engine.index_sizes(), IndexSizes { identifier: 3, priority: 3 });
    assert_eq!(priority_ids(&engine), vec![4, 3, 1]);

    for id in [1, 3, 4] {
        assert_eq!(engine.find_by_id(id).map(|i| i.id()), Ok(id));
    }
    assert_eq!(engine.remove_by_id(2), Err(DispatchError::NotFound(2)));
}

#[test]
fn test_removed_incident_is_still_dispatched() {
    let mut engine = city();
    engine
        .receive_incident(1, ServiceCategory::Medical, Severity::High)
        .unwrap();
    engine.remove_by_id(1).unwrap();

    assert_eq!(engine.queue_len(ServiceCategory::Medical), 1);
    let results = engine.advance_time(1);
    assert_eq!(results[0].dispatched[0].incident_id, 1);
}

#[test]
fn test_identifier_traversal_follows_arrival_chain() {
    let mut engine = city();
    for _ in 0..5 {
        engine
            .receive_incident(2, ServiceCategory::Fire, Severity::Low)
            .unwrap();
    }

    let pre: Vec<IncidentId> = engine
        .identifier_traversal(TraversalOrder::PreOrder)
        .map(Incident::id)
        .collect();
    let post: Vec<IncidentId> = engine
        .identifier_traversal(TraversalOrder::PostOrder)
        .map(Incident::id)
        .collect();

    assert_eq!(pre, vec![1, 2, 3, 4, 5]);
    assert_eq!(post, vec![5, 4, 3, 2, 1]);
    assert_eq!(engine.identifier_index().height(), 5);
    assert!(engine.priority_index().height() <= 3);
}

#[test]
fn test_find_by_severity_through_engine() {
    let mut engine = city();
    engine
        .receive_incident(1, ServiceCategory::Fire, Severity::Low)
        .unwrap();
    engine
        .receive_incident(1, ServiceCategory::Fire, Severity::High)
        .unwrap();

    assert_eq!(engine.find_by_severity(Severity::High).map(Incident::id), Some(2));
    assert!(engine.find_by_severity(Severity::Medium).is_none());
}

// ============================================================================
// Events and snapshots
// ============================================================================

#[test]
fn test_event_log_tracks_incident_lifecycle() {
    let mut engine = city();
    engine
        .receive_incident(3, ServiceCategory::Police, Severity::Medium)
        .unwrap();
    engine.advance_time(3);
    engine.remove_by_id(1).unwrap();

    let lifecycle: Vec<&str> = engine
        .event_log()
        .events_for_incident(1)
        .into_iter()
        .map(Event::event_type)
        .collect();
    assert_eq!(lifecycle, vec!["IncidentReceived", "IncidentDispatched", "IncidentRemoved"]);

    let releases = engine.event_log().events_of_type("UnitReleased");
    assert_eq!(releases.len(), 1);
    assert_eq!(releases[0].tick(), 3);
}

#[test]
fn test_snapshot_is_consistent_and_serializable() {
    let mut engine = city();
    engine
        .receive_incident(1, ServiceCategory::Medical, Severity::High)
        .unwrap();
    engine
        .receive_incident(2, ServiceCategory::Medical, Severity::Low)
        .unwrap();
    engine
        .receive_incident(3, ServiceCategory::Medical, Severity::Medium)
        .unwrap();
    engine.advance_time(1);

    let snapshot = engine.snapshot();
    assert!(validate_snapshot(&snapshot).is_ok());
    assert_eq!(snapshot.current_tick, 1);
    assert_eq!(snapshot.next_incident_id, 4);
    assert_eq!(snapshot.queued(), 2);
    assert_eq!(snapshot.busy_units(), vec![101]);
    assert_eq!(snapshot.priority_index.in_order, vec![1, 3, 2]);

    let json = serde_json::to_string(&snapshot).unwrap();
    let parsed: SystemSnapshot = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, snapshot);
}

#[test]
fn test_config_hash_identifies_setup() {
    let a = city().snapshot().config_hash;
    let b = city().snapshot().config_hash;
    let c = DispatchEngine::new(single_medical_unit_city())
        .unwrap()
        .snapshot()
        .config_hash;

    assert_eq!(a, b);
    assert_ne!(a, c);
}

#[test]
fn test_duplicate_unit_in_config_is_rejected() {
    let mut config = single_medical_unit_city();
    config.units.push(config.units[0].clone());

    assert!(matches!(
        DispatchEngine::new(config),
        Err(DispatchError::InvalidConfig(_))
    ));
}

// ============================================================================
// Per-category FIFO under interleaved arrivals
// ============================================================================

#[derive(Debug, Clone)]
enum Step {
    Arrive(ServiceCategory, Severity),
    Tick,
}

fn step_strategy() -> impl Strategy<Value = Step> {
    let category = prop_oneof![
        Just(ServiceCategory::Medical),
        Just(ServiceCategory::Fire),
        Just(ServiceCategory::Police),
    ];
    let severity = prop_oneof![Just(Severity::Low), Just(Severity::Medium), Just(Severity::High)];
    prop_oneof![
        3 => (category, severity).prop_map(|(c, s)| Step::Arrive(c, s)),
        1 => Just(Step::Tick),
    ]
}

proptest! {
    #[test]
    fn prop_each_category_serves_its_own_arrivals_in_order(
        steps in proptest::collection::vec(step_strategy(), 0..150),
    ) {
        let mut engine = city();
        let mut arrivals: BTreeMap<ServiceCategory, Vec<IncidentId>> = BTreeMap::new();
        let mut dispatched: BTreeMap<ServiceCategory, Vec<IncidentId>> = BTreeMap::new();

        for step in steps {
            match step {
                Step::Arrive(category, severity) => {
                    let id = engine.receive_incident(1, category, severity).unwrap();
                    arrivals.entry(category).or_default().push(id);
                }
                Step::Tick => {
                    let result = engine.tick();
                    let mut seen = Vec::new();
                    for dispatch in result.dispatched {
                        prop_assert!(!seen.contains(&dispatch.category));
                        seen.push(dispatch.category);
                        dispatched.entry(dispatch.category).or_default().push(dispatch.incident_id);
                    }
                }
            }
        }

        for category in ServiceCategory::ALL {
            let mut served = dispatched.remove(&category).unwrap_or_default();
            served.extend(engine.queue(category).peek_all().map(Incident::id));
            prop_assert_eq!(served, arrivals.remove(&category).unwrap_or_default());
        }
    }
}
