use std::sync::Arc;
use std::time::Duration;

use monitor_core::now_ms;
use monitor_core::policy::{decide, EscalationSink, Verdict};
use monitor_core::progress::{evaluate, ArtifactProbe};
use monitor_core::registry::ArtifactRegistry;
use monitor_core::snapshot::Phase;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::store::StatusStore;

pub struct SchedulerConfig {
    pub interval: Duration,
    pub max_cycles: u32,
}

/// Handle to the single polling timeline.
///
/// The timeline is one spawned task: evaluate immediately, then once per
/// interval until a terminal phase or `stop`. Cycles are serialized; a
/// slow evaluation delays the next tick rather than overlapping it.
pub struct Scheduler {
    shutdown: watch::Sender<bool>,
    task: Mutex<Option<JoinHandle<()>>>,
}

/// Starts polling. The first evaluation runs immediately.
pub fn start(
    registry: Arc<ArtifactRegistry>,
    probe: Arc<dyn ArtifactProbe>,
    store: StatusStore,
    sink: Arc<dyn EscalationSink>,
    cfg: SchedulerConfig,
) -> Scheduler {
    let (shutdown, mut stopped) = watch::channel(false);
    let task = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(cfg.interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        let mut cycles: u32 = 0;
        loop {
            tokio::select! {
                biased;
                _ = stopped.changed() => {
                    info!(cycles, "monitor stopped before reaching a terminal phase");
                    break;
                }
                _ = ticker.tick() => {}
            }
            cycles += 1;

            // Probe and store do blocking fs work; keep it off the
            // runtime thread.
            let registry = Arc::clone(&registry);
            let probe = Arc::clone(&probe);
            let store = store.clone();
            let sink = Arc::clone(&sink);
            let max_cycles = cfg.max_cycles;
            let cycle = tokio::task::spawn_blocking(move || {
                run_cycle(&registry, probe.as_ref(), &store, sink.as_ref(), cycles, max_cycles)
            })
            .await;

            match cycle {
                Ok(Phase::Running) => {}
                Ok(Phase::Completed) => {
                    info!(cycles, "all producers complete");
                    break;
                }
                Ok(Phase::TimedOut) => break,
                Err(e) => warn!(error = %e, cycle = cycles, "evaluation task failed"),
            }
        }
    });
    Scheduler {
        shutdown,
        task: Mutex::new(Some(task)),
    }
}

impl Scheduler {
    /// Stops polling and waits for the timeline to wind down. Idempotent,
    /// and safe to call from a shutdown handler: once it returns, no
    /// further evaluation fires. An in-flight cycle is allowed to finish
    /// and its snapshot is still persisted.
    pub async fn stop(&self) {
        let _ = self.shutdown.send(true);
        self.join().await;
    }

    /// Waits for the timeline to end (terminal phase or `stop`).
    pub async fn join(&self) {
        if let Some(task) = self.task.lock().await.take() {
            if let Err(e) = task.await {
                warn!(error = %e, "scheduler task join failed");
            }
        }
    }
}

/// One evaluate-persist-decide cycle. Runtime errors are contained here:
/// a failed save is logged and retried on the next natural cycle.
fn run_cycle(
    registry: &ArtifactRegistry,
    probe: &dyn ArtifactProbe,
    store: &StatusStore,
    sink: &dyn EscalationSink,
    cycles_elapsed: u32,
    max_cycles: u32,
) -> Phase {
    let mut snapshot = evaluate(registry, probe, now_ms(), cycles_elapsed);
    let verdict = decide(&snapshot, max_cycles);
    snapshot.phase = verdict.phase();

    if let Err(e) = store.save(&snapshot) {
        warn!(error = %e, cycle = cycles_elapsed, "status save failed; retrying next cycle");
    }
    info!(
        cycle = cycles_elapsed,
        overall = snapshot.overall_percentage,
        phase = ?snapshot.phase,
        "progress evaluated"
    );

    if let Verdict::Escalate { incomplete } = &verdict {
        sink.escalate(incomplete);
    }
    snapshot.phase
}

/// Default escalation sink: a structured error log entry.
pub struct LogEscalation;

impl EscalationSink for LogEscalation {
    fn escalate(&self, incomplete: &[String]) {
        error!(
            producers = ?incomplete,
            "cycle budget exhausted with incomplete producers; manual intervention required"
        );
    }
}
