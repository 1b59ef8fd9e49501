//! Production invoker for clingo-style ASP solvers.

use super::{InvokeError, SolverInvoker, SolverOutcome};
use crate::decode::{ANSWER_LINE, STATS_LINE};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// Exit code clingo uses for "satisfiable".
const EXIT_SATISFIABLE: i32 = 10;
/// Exit code clingo uses for "search completed, unsatisfiable".
const EXIT_UNSATISFIABLE: i32 = 20;

/// Runs a clingo base command through the shell with the bound parameter
/// injected as a `-c <name>=<value>` constant.
#[derive(Debug, Clone)]
pub struct ClingoSolver {
    base_command: String,
    parameter: String,
    /// Per-run kill limit; independent of the sweep's shared deadline.
    /// `None` = unbounded.
    run_limit: Option<Duration>,
}

impl ClingoSolver {
    pub fn new(base_command: String, parameter: String, run_limit: Option<Duration>) -> Self {
        Self {
            base_command,
            parameter,
            run_limit,
        }
    }
}

impl SolverInvoker for ClingoSolver {
    async fn invoke(&self, value: u32) -> Result<SolverOutcome, InvokeError> {
        let shell_command = format!("{} -c {}={}", self.base_command, self.parameter, value);
        let child = Command::new("sh")
            .arg("-c")
            .arg(&shell_command)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(InvokeError::Spawn)?;

        let wait = child.wait_with_output();
        let output = match self.run_limit {
            // Dropping the wait future on timeout kills the child via
            // kill_on_drop.
            Some(limit) => tokio::time::timeout(limit, wait)
                .await
                .map_err(|_| InvokeError::Timeout { limit })?,
            None => wait.await,
        }
        .map_err(InvokeError::Spawn)?;

        let transcript = String::from_utf8_lossy(&output.stdout);
        let lines: Vec<&str> = transcript.lines().collect();
        let stats = lines.get(STATS_LINE).unwrap_or(&"").to_string();

        match output.status.code() {
            Some(EXIT_SATISFIABLE) => {
                let answer = lines
                    .get(ANSWER_LINE)
                    .ok_or(InvokeError::MalformedTranscript { lines: lines.len() })?
                    .to_string();
                Ok(SolverOutcome::Satisfiable { answer, stats })
            }
            Some(EXIT_UNSATISFIABLE) => Ok(SolverOutcome::Unsatisfiable { stats }),
            _ => Err(InvokeError::Solver {
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            }),
        }
    }
}
