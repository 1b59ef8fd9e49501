//! Solver invocation interface.
//!
//! The sweep controller only sees the [`SolverInvoker`] trait, so it can be
//! exercised against stub solvers in tests. The production implementation
//! lives in [`clingo`].

pub mod clingo;

use std::fmt;
use std::future::Future;
use std::process::ExitStatus;
use std::time::Duration;

/// Classified result of one bounded solver run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolverOutcome {
    /// The solver found a model; `answer` is the raw answer-set line and
    /// `stats` the diagnostic/statistics line from the transcript.
    Satisfiable { answer: String, stats: String },
    /// The solver completed its search without finding a model.
    Unsatisfiable { stats: String },
}

/// A solver invocation failed abnormally. Fatal to the current sweep.
#[derive(Debug)]
pub enum InvokeError {
    Spawn(std::io::Error),
    /// The process exited with neither of the two solver-defined codes.
    Solver { status: ExitStatus, stderr: String },
    /// The invoker's own per-run limit elapsed and the process was killed.
    Timeout { limit: Duration },
    /// Exit code claimed satisfiability but the transcript lacks the
    /// fixed-position answer line.
    MalformedTranscript { lines: usize },
}

impl fmt::Display for InvokeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvokeError::Spawn(e) => write!(f, "failed to spawn solver: {e}"),
            InvokeError::Solver { status, stderr } => {
                write!(f, "solver exited abnormally ({status}): {}", stderr.trim_end())
            }
            InvokeError::Timeout { limit } => {
                write!(
                    f,
                    "solver run exceeded its {} limit and was killed",
                    humantime::format_duration(*limit)
                )
            }
            InvokeError::MalformedTranscript { lines } => {
                write!(f, "satisfiable transcript too short: {lines} lines")
            }
        }
    }
}

impl std::error::Error for InvokeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            InvokeError::Spawn(e) => Some(e),
            _ => None,
        }
    }
}

/// One bounded run of the external solver at a given parameter value.
///
/// Implementations must bound their own execution independently of the
/// sweep's shared deadline (process-level kill).
pub trait SolverInvoker {
    fn invoke(
        &self,
        value: u32,
    ) -> impl Future<Output = Result<SolverOutcome, InvokeError>> + Send;
}
