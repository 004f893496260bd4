//! Integration tests for weave-telemetry.

use std::thread;

use weave_telemetry::{EventBus, EventKind, EventSink, SimulationEvent, TracingSink, VecSink};

fn begin(step: u32) -> SimulationEvent {
    SimulationEvent::new(
        step,
        EventKind::TimestepBegin {
            sim_time: step as f64 * 0.01,
            dt: 0.01,
        },
    )
}

#[test]
fn flush_delivers_in_order() {
    let mut bus = EventBus::new();
    let sink = VecSink::new();
    bus.add_sink(Box::new(sink.clone()));

    bus.emit(begin(0));
    bus.emit(SimulationEvent::new(0, EventKind::TimestepEnd { wall_time: 0.001 }));
    bus.emit(begin(1));
    assert!(sink.is_empty());

    assert_eq!(bus.flush(), 3);
    let events = sink.events();
    assert_eq!(events.len(), 3);
    assert_eq!(events[0], begin(0));
    assert_eq!(events[1].label(), "timestep_end");
    assert_eq!(events[2].timestep, 1);

    // Nothing left to deliver.
    assert_eq!(bus.flush(), 0);
}

#[test]
fn disabled_bus_drops_events() {
    let mut bus = EventBus::new();
    let sink = VecSink::new();
    bus.add_sink(Box::new(sink.clone()));
    bus.set_enabled(false);
    assert!(!bus.is_enabled());

    bus.emit(begin(0));
    assert_eq!(bus.flush(), 0);
    assert!(sink.is_empty());
}

#[test]
fn every_sink_sees_every_event() {
    let mut bus = EventBus::new();
    let a = VecSink::new();
    let b = VecSink::new();
    bus.add_sink(Box::new(a.clone()));
    bus.add_sink(Box::new(b.clone()));
    bus.add_sink(Box::new(TracingSink::new(false)));
    assert_eq!(bus.sink_count(), 3);

    bus.emit(begin(0));
    bus.emit(SimulationEvent::new(
        0,
        EventKind::Convergence {
            integration: "cg".into(),
            iterations: 40,
            final_residual: 1e-3,
            converged: false,
        },
    ));
    bus.finish();
    assert_eq!(a.len(), 2);
    assert_eq!(b.events(), a.events());
}

#[test]
fn sender_reports_from_another_thread() {
    let mut bus = EventBus::new();
    let sink = VecSink::new();
    bus.add_sink(Box::new(sink.clone()));

    let sender = bus.sender();
    let worker = thread::spawn(move || {
        for step in 0..4 {
            sender.send(begin(step)).unwrap();
        }
    });
    worker.join().unwrap();

    assert_eq!(bus.flush(), 4);
    let steps: Vec<u32> = sink.events().iter().map(|e| e.timestep).collect();
    assert_eq!(steps, vec![0, 1, 2, 3]);
}

#[test]
fn labels_name_the_payload() {
    let custom = SimulationEvent::new(
        2,
        EventKind::Custom {
            label: "pull".into(),
            payload: "{\"force\":0.5}".into(),
        },
    );
    assert_eq!(custom.label(), "pull");
    let strain = SimulationEvent::new(2, EventKind::Strain { max: 0.01 });
    assert_eq!(strain.label(), "strain");
    let iteration = SimulationEvent::new(
        2,
        EventKind::SolverIteration {
            iteration: 3,
            residual: 0.5,
        },
    );
    assert_eq!(iteration.label(), "solver_iteration");
}

#[test]
fn events_serialize_to_json() {
    let event = SimulationEvent::new(
        5,
        EventKind::Energy {
            kinetic: 1.0,
            potential: 2.0,
            elastic: 0.5,
        },
    );
    let json = serde_json::to_string(&event).unwrap();
    assert!(json.contains("Energy"));
    let recovered: SimulationEvent = serde_json::from_str(&json).unwrap();
    assert_eq!(recovered, event);
}

#[test]
fn vec_sink_name() {
    let sink = VecSink::new();
    assert_eq!(sink.name(), "vec_sink");
    assert_eq!(TracingSink::new(true).name(), "tracing_sink");
}
