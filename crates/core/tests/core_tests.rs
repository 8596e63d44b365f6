//! Integration tests for the core crate.

use std::collections::HashSet;

use monitor_core::policy::{decide, Verdict};
use monitor_core::progress::{evaluate, ArtifactProbe};
use monitor_core::registry::{ArtifactLocator, ArtifactRegistry};
use monitor_core::snapshot::Phase;

struct SetProbe(HashSet<&'static str>);

impl ArtifactProbe for SetProbe {
    fn exists(&self, locator: &ArtifactLocator) -> anyhow::Result<bool> {
        Ok(self.0.contains(locator.as_str()))
    }
}

#[test]
fn partial_producer_reports_half_progress() {
    // registry = {X: [a, b]}, only a present.
    let mut reg = ArtifactRegistry::new();
    reg.register("X", vec!["a".into(), "b".into()]).unwrap();
    let probe = SetProbe(HashSet::from(["a"]));

    let snap = evaluate(&reg, &probe, 0, 1);
    assert_eq!(snap.per_producer.len(), 1);
    let p = &snap.per_producer[0];
    assert_eq!(p.producer, "X");
    assert_eq!((p.completed, p.total, p.percentage), (1, 2, 50));
    assert_eq!(snap.overall_percentage, 50);
    assert_eq!(decide(&snap, 10), Verdict::Continue);
}

#[test]
fn all_present_completes() {
    // registry = {X: [a], Y: [b, c]}, everything present.
    let mut reg = ArtifactRegistry::new();
    reg.register("X", vec!["a".into()]).unwrap();
    reg.register("Y", vec!["b".into(), "c".into()]).unwrap();
    let probe = SetProbe(HashSet::from(["a", "b", "c"]));

    let snap = evaluate(&reg, &probe, 0, 1);
    assert_eq!(snap.overall_percentage, 100);
    let verdict = decide(&snap, 10);
    assert_eq!(verdict, Verdict::Complete);
    assert_eq!(verdict.phase(), Phase::Completed);
}

#[test]
fn overall_independent_of_registration_order() {
    let probe = SetProbe(HashSet::from(["a", "b"]));

    let mut forward = ArtifactRegistry::new();
    forward.register("X", vec!["a".into(), "z".into()]).unwrap();
    forward.register("Y", vec!["b".into()]).unwrap();

    let mut reversed = ArtifactRegistry::new();
    reversed.register("Y", vec!["b".into()]).unwrap();
    reversed.register("X", vec!["a".into(), "z".into()]).unwrap();

    let a = evaluate(&forward, &probe, 0, 1);
    let b = evaluate(&reversed, &probe, 0, 1);
    assert_eq!(a.overall_percentage, b.overall_percentage);
}

#[test]
fn snapshots_differ_only_in_timestamp_and_cycles_when_probe_unchanged() {
    let mut reg = ArtifactRegistry::new();
    reg.register("X", vec!["a".into(), "b".into(), "c".into()]).unwrap();
    let probe = SetProbe(HashSet::from(["a", "c"]));

    let mut first = evaluate(&reg, &probe, 100, 1);
    let second = evaluate(&reg, &probe, 200, 2);

    first.timestamp_ms = second.timestamp_ms;
    first.cycles_elapsed = second.cycles_elapsed;
    assert_eq!(first, second);
}

#[test]
fn snapshot_json_field_names_are_stable() {
    let mut reg = ArtifactRegistry::new();
    reg.register("X", vec!["a".into()]).unwrap();
    let probe = SetProbe(HashSet::from(["a"]));

    let snap = evaluate(&reg, &probe, 42, 7);
    let v: serde_json::Value = serde_json::to_value(&snap).unwrap();
    assert_eq!(v["timestamp_ms"], 42);
    assert_eq!(v["cycles_elapsed"], 7);
    assert_eq!(v["overall_percentage"], 100);
    assert_eq!(v["phase"], "running");
    assert_eq!(v["per_producer"][0]["producer"], "X");
    assert_eq!(v["per_producer"][0]["completed"], 1);
    assert_eq!(v["per_producer"][0]["total"], 1);
}
