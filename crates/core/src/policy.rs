//! Escalation policy: pure decision over a snapshot.

use crate::snapshot::{Phase, Snapshot};

/// Outcome of inspecting one snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// Keep polling.
    Continue,
    /// Every producer delivered everything; stop with success.
    Complete,
    /// Cycle budget exhausted; stop and escalate with the names of
    /// producers that are still incomplete.
    Escalate {
        /// Producers with at least one missing artifact.
        incomplete: Vec<String>,
    },
}

impl Verdict {
    /// The lifecycle phase this verdict assigns to the snapshot.
    pub fn phase(&self) -> Phase {
        match self {
            Verdict::Continue => Phase::Running,
            Verdict::Complete => Phase::Completed,
            Verdict::Escalate { .. } => Phase::TimedOut,
        }
    }

    /// True for [`Verdict::Complete`] and [`Verdict::Escalate`].
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Verdict::Continue)
    }
}

/// Decides whether the run continues, completed, or timed out.
///
/// Completion is checked before timeout, so reaching 100% on the final
/// allowed cycle is reported as completed rather than timed out.
pub fn decide(snapshot: &Snapshot, max_cycles: u32) -> Verdict {
    if snapshot.per_producer.iter().all(|p| p.is_complete()) {
        return Verdict::Complete;
    }
    if snapshot.cycles_elapsed >= max_cycles {
        let incomplete = snapshot
            .per_producer
            .iter()
            .filter(|p| !p.is_complete())
            .map(|p| p.producer.clone())
            .collect();
        return Verdict::Escalate { incomplete };
    }
    Verdict::Continue
}

/// Alerting collaborator notified exactly once per run, on the transition
/// into [`Phase::TimedOut`].
pub trait EscalationSink: Send + Sync {
    /// Reports the producers that remained incomplete.
    fn escalate(&self, incomplete: &[String]);
}
