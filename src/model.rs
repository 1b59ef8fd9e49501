use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for one parameter sweep.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepConfig {
    /// Base solver command, run through the shell. The bound parameter is
    /// appended as `-c <parameter>=<value>` on every attempt.
    pub command: String,
    /// Overall wall-clock budget shared across all attempts. `None` = unlimited.
    #[serde(with = "humantime_serde")]
    pub budget: Option<Duration>,
    /// Process name to `killall -9` after the budget expires.
    #[serde(default)]
    pub nuke_process: Option<String>,
    /// Name of the bound parameter injected into the solver command.
    pub parameter: String,
}

/// Outcome of a single solver invocation, as classified by the controller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AttemptOutcome {
    Satisfiable { solution: String },
    Unsatisfiable { stats: String },
    Error { message: String },
}

/// One recorded attempt of the sweep. Immutable once appended to the history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchAttempt {
    /// Parameter value tried.
    pub value: u32,
    /// Cumulative seconds since the sweep started, measured when the attempt
    /// finished.
    pub elapsed_secs: f64,
    pub outcome: AttemptOutcome,
}

/// Final result of a successful sweep. Absent entirely when the budget
/// expires or the solver errors out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    #[serde(default)]
    pub timestamp_utc: String,
    /// Name of the swept parameter.
    pub parameter: String,
    /// First satisfiable parameter value.
    pub value: u32,
    /// Raw answer-set line reported by the solver.
    pub solution: String,
    #[serde(with = "humantime_serde")]
    pub total_elapsed: Duration,
    /// Cumulative elapsed seconds at the end of each attempt, in order,
    /// including the winning one. Kept for diagnostics/plotting.
    pub attempt_secs: Vec<f64>,
}

/// Progress events emitted by the sweep controller and consumed by the CLI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SearchEvent {
    AttemptStarted { parameter: String, value: u32 },
    AttemptFinished { attempt: SearchAttempt },
    /// Best-effort cleanup of orphaned solver processes was performed.
    Nuked { process: String },
    TimedOut,
    /// The sweep aborted on an invocation failure; not retried.
    Aborted { error: String },
}

/// One symbolic move fact from an answer set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Move {
    pub box_id: u32,
    pub direction: String,
    pub time: u32,
}

/// Final position of one square piece, with 1-based board coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    pub box_id: u32,
    pub side_len: u32,
    pub x: u32,
    pub y: u32,
}
