//! Progress evaluation: registry + presence checks -> snapshot.

use crate::registry::{ArtifactLocator, ArtifactRegistry};
use crate::snapshot::{overall_percentage, Phase, ProducerProgress, Snapshot};

/// Presence-check capability supplied by the host environment (typically a
/// filesystem existence check). The evaluator performs no I/O of its own.
pub trait ArtifactProbe: Send + Sync {
    /// Returns whether the artifact behind `locator` currently exists.
    fn exists(&self, locator: &ArtifactLocator) -> anyhow::Result<bool>;
}

impl<F> ArtifactProbe for F
where
    F: Fn(&ArtifactLocator) -> anyhow::Result<bool> + Send + Sync,
{
    fn exists(&self, locator: &ArtifactLocator) -> anyhow::Result<bool> {
        self(locator)
    }
}

/// Evaluates every registered producer against `probe` and assembles a
/// snapshot in [`Phase::Running`]; the escalation policy decides the final
/// phase.
///
/// A failing probe counts the artifact as missing for this cycle only: the
/// failure is logged and the artifact is re-checked on the next cycle, so
/// a transient permission error never crashes the evaluator.
pub fn evaluate(
    registry: &ArtifactRegistry,
    probe: &dyn ArtifactProbe,
    timestamp_ms: i64,
    cycles_elapsed: u32,
) -> Snapshot {
    let per_producer: Vec<ProducerProgress> = registry
        .list()
        .iter()
        .map(|task| {
            let completed = task
                .artifacts
                .iter()
                .filter(|loc| match probe.exists(loc) {
                    Ok(present) => present,
                    Err(e) => {
                        tracing::warn!(
                            producer = %task.name,
                            artifact = %loc.as_str(),
                            error = %e,
                            "presence check failed; treating artifact as missing"
                        );
                        false
                    }
                })
                .count() as u32;
            ProducerProgress::new(&task.name, completed, task.artifacts.len() as u32)
        })
        .collect();

    let overall = overall_percentage(&per_producer);

    Snapshot {
        timestamp_ms,
        per_producer,
        overall_percentage: overall,
        cycles_elapsed,
        phase: Phase::Running,
    }
}
