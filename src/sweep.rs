//! Timeout-governed incremental parameter sweep.
//!
//! Invokes the solver once per candidate value, starting at 1 and
//! incrementing by 1, until the first satisfiable value or until the shared
//! wall-clock budget expires. Satisfiability is assumed monotonic in the
//! parameter; the first satisfiable value is treated as the answer.

use crate::model::{AttemptOutcome, SearchAttempt, SearchEvent, SearchResult, SweepConfig};
use crate::solver::{SolverInvoker, SolverOutcome};
use anyhow::Result;
use std::process::Stdio;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tokio::time::Instant;

/// Best-effort, name-matched termination of leftover solver processes.
///
/// Not scoped to processes spawned by this run; a blunt safety valve against
/// runaway orphans after the budget expires.
async fn nuke(process: &str, event_tx: &UnboundedSender<SearchEvent>) {
    let _ = tokio::process::Command::new("killall")
        .arg("-9")
        .arg(process)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await;
    let _ = event_tx.send(SearchEvent::Nuked {
        process: process.to_string(),
    });
}

/// Handle budget expiry: optional nuke, then report a normal termination.
async fn expire(cfg: &SweepConfig, event_tx: &UnboundedSender<SearchEvent>) {
    if let Some(process) = cfg.nuke_process.as_deref() {
        nuke(process, event_tx).await;
    }
    let _ = event_tx.send(SearchEvent::TimedOut);
}

/// Run the sweep to completion.
///
/// Returns `Ok(None)` when the budget expires (no best-so-far result; the
/// in-flight attempt's outcome is unknown at interruption) or when an
/// invocation fails. Attempts are strictly sequential; exactly one solver
/// subprocess runs at a time.
pub async fn run_sweep<S: SolverInvoker>(
    invoker: &S,
    cfg: &SweepConfig,
    event_tx: &UnboundedSender<SearchEvent>,
) -> Result<Option<SearchResult>> {
    let start = Instant::now();
    let deadline = cfg.budget.map(|d| start + d);
    let mut attempts: Vec<SearchAttempt> = Vec::new();
    let mut value: u32 = 1;

    loop {
        let _ = event_tx.send(SearchEvent::AttemptStarted {
            parameter: cfg.parameter.clone(),
            value,
        });

        let invocation = invoker.invoke(value);
        let outcome = match deadline {
            Some(deadline) => {
                let remaining = deadline.saturating_duration_since(Instant::now());
                if remaining == Duration::ZERO {
                    expire(cfg, event_tx).await;
                    return Ok(None);
                }
                match tokio::time::timeout_at(deadline, invocation).await {
                    Ok(outcome) => outcome,
                    // Budget expired mid-attempt; its outcome is unknown.
                    Err(_) => {
                        expire(cfg, event_tx).await;
                        return Ok(None);
                    }
                }
            }
            None => invocation.await,
        };

        let elapsed = start.elapsed();
        match outcome {
            Ok(SolverOutcome::Satisfiable { answer, stats: _ }) => {
                let attempt = SearchAttempt {
                    value,
                    elapsed_secs: elapsed.as_secs_f64(),
                    outcome: AttemptOutcome::Satisfiable {
                        solution: answer.clone(),
                    },
                };
                let _ = event_tx.send(SearchEvent::AttemptFinished {
                    attempt: attempt.clone(),
                });
                attempts.push(attempt);
                return Ok(Some(SearchResult {
                    timestamp_utc: time::OffsetDateTime::now_utc()
                        .format(&time::format_description::well_known::Rfc3339)
                        .unwrap_or_else(|_| "now".into()),
                    parameter: cfg.parameter.clone(),
                    value,
                    solution: answer,
                    total_elapsed: elapsed,
                    attempt_secs: attempts.iter().map(|a| a.elapsed_secs).collect(),
                }));
            }
            Ok(SolverOutcome::Unsatisfiable { stats }) => {
                let attempt = SearchAttempt {
                    value,
                    elapsed_secs: elapsed.as_secs_f64(),
                    outcome: AttemptOutcome::Unsatisfiable { stats },
                };
                let _ = event_tx.send(SearchEvent::AttemptFinished {
                    attempt: attempt.clone(),
                });
                attempts.push(attempt);
                value += 1;
            }
            Err(e) => {
                let attempt = SearchAttempt {
                    value,
                    elapsed_secs: elapsed.as_secs_f64(),
                    outcome: AttemptOutcome::Error {
                        message: e.to_string(),
                    },
                };
                let _ = event_tx.send(SearchEvent::AttemptFinished { attempt });
                let _ = event_tx.send(SearchEvent::Aborted {
                    error: e.to_string(),
                });
                return Ok(None);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::InvokeError;
    use tokio::sync::mpsc;

    fn config(budget: Option<Duration>) -> SweepConfig {
        SweepConfig {
            command: "clingo plan.lp".into(),
            budget,
            nuke_process: None,
            parameter: "t".into(),
        }
    }

    /// Unsatisfiable below `sat_at`, satisfiable from it on.
    struct MonotonicStub {
        sat_at: u32,
    }

    impl SolverInvoker for MonotonicStub {
        async fn invoke(&self, value: u32) -> Result<SolverOutcome, InvokeError> {
            if value >= self.sat_at {
                Ok(SolverOutcome::Satisfiable {
                    answer: format!("boardX({value}) boardY({value})"),
                    stats: "Models : 1".into(),
                })
            } else {
                Ok(SolverOutcome::Unsatisfiable {
                    stats: "Models : 0".into(),
                })
            }
        }
    }

    /// Always unsatisfiable, each attempt taking a fixed (virtual) time.
    struct SlowUnsatStub {
        per_attempt: Duration,
    }

    impl SolverInvoker for SlowUnsatStub {
        async fn invoke(&self, _value: u32) -> Result<SolverOutcome, InvokeError> {
            tokio::time::sleep(self.per_attempt).await;
            Ok(SolverOutcome::Unsatisfiable {
                stats: "Models : 0".into(),
            })
        }
    }

    struct FailingStub;

    impl SolverInvoker for FailingStub {
        async fn invoke(&self, _value: u32) -> Result<SolverOutcome, InvokeError> {
            Err(InvokeError::MalformedTranscript { lines: 0 })
        }
    }

    fn drain(rx: &mut mpsc::UnboundedReceiver<SearchEvent>) -> Vec<SearchEvent> {
        let mut events = Vec::new();
        while let Ok(ev) = rx.try_recv() {
            events.push(ev);
        }
        events
    }

    fn finished_count(events: &[SearchEvent]) -> usize {
        events
            .iter()
            .filter(|e| matches!(e, SearchEvent::AttemptFinished { .. }))
            .count()
    }

    #[tokio::test]
    async fn finds_first_satisfiable_value_with_unlimited_budget() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let stub = MonotonicStub { sat_at: 4 };
        let result = run_sweep(&stub, &config(None), &tx).await.unwrap().unwrap();
        assert_eq!(result.value, 4);
        assert_eq!(result.solution, "boardX(4) boardY(4)");
        assert_eq!(result.attempt_secs.len(), 4);
        let events = drain(&mut rx);
        assert_eq!(finished_count(&events), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn budget_expiry_returns_none_with_attempt_telemetry() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let stub = SlowUnsatStub {
            per_attempt: Duration::from_secs(1),
        };
        // Budget admits three full attempts; the fourth is interrupted.
        let result = run_sweep(&stub, &config(Some(Duration::from_millis(3500))), &tx)
            .await
            .unwrap();
        assert!(result.is_none());
        let events = drain(&mut rx);
        assert_eq!(finished_count(&events), 3);
        assert!(events.iter().any(|e| matches!(e, SearchEvent::TimedOut)));
    }

    #[tokio::test(start_paused = true)]
    async fn nuke_event_fires_on_expiry() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let stub = SlowUnsatStub {
            per_attempt: Duration::from_secs(10),
        };
        let mut cfg = config(Some(Duration::from_secs(1)));
        // A name that matches nothing; killall fails and is ignored.
        cfg.nuke_process = Some("clingo-sweep-test-orphan".into());
        let result = run_sweep(&stub, &cfg, &tx).await.unwrap();
        assert!(result.is_none());
        let events = drain(&mut rx);
        assert!(events.iter().any(
            |e| matches!(e, SearchEvent::Nuked { process } if process == "clingo-sweep-test-orphan")
        ));
        assert!(events.iter().any(|e| matches!(e, SearchEvent::TimedOut)));
    }

    #[tokio::test]
    async fn invocation_error_aborts_without_retry() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let result = run_sweep(&FailingStub, &config(None), &tx).await.unwrap();
        assert!(result.is_none());
        let events = drain(&mut rx);
        assert_eq!(finished_count(&events), 1);
        assert!(events.iter().any(|e| matches!(e, SearchEvent::Aborted { .. })));
    }

    #[tokio::test]
    async fn attempt_times_are_cumulative_and_ordered() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let stub = MonotonicStub { sat_at: 3 };
        let result = run_sweep(&stub, &config(None), &tx).await.unwrap().unwrap();
        assert!(result
            .attempt_secs
            .windows(2)
            .all(|w| w[0] <= w[1]));
    }
}
