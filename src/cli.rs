use crate::board::Board;
use crate::decode::{self, TranscriptError};
use crate::model::{AttemptOutcome, SearchEvent, SweepConfig};
use crate::solver::clingo::ClingoSolver;
use crate::sweep;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::Read;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::mpsc;

#[derive(Debug, Parser)]
#[command(
    name = "clingo-sweep",
    version,
    about = "Drive a clingo parameter sweep and render the resulting board"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Sweep an integer parameter upward until the solver reports
    /// satisfiability or the time budget expires
    Search {
        /// Clingo base command; `-c <parameter>=<n>` is appended per attempt
        #[arg(long)]
        command: String,

        /// Overall wall-clock budget shared by all attempts (0s = unlimited)
        #[arg(long, default_value = "0s")]
        timeout: humantime::Duration,

        /// Kill all processes with this name after the timeout, use wisely
        #[arg(long)]
        nuke: Option<String>,

        /// Name of the bound parameter injected into the solver command
        #[arg(long, default_value = "t")]
        parameter: String,

        /// Print the result as JSON instead of the rendered board
        #[arg(long)]
        json: bool,
    },
    /// Decode a saved solver transcript and render its board
    Render {
        /// Input transcript file (defaults to stdin)
        #[arg(long)]
        input: Option<PathBuf>,

        /// Output file (defaults to stdout)
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

pub async fn run(args: Cli) -> Result<()> {
    match args.command {
        Commands::Search {
            command,
            timeout,
            nuke,
            parameter,
            json,
        } => {
            let timeout = Duration::from(timeout);
            let budget = if timeout.is_zero() { None } else { Some(timeout) };
            let cfg = SweepConfig {
                command,
                budget,
                nuke_process: nuke,
                parameter,
            };
            run_search(cfg, json).await
        }
        Commands::Render { input, output } => run_render(input.as_deref(), output.as_deref()),
    }
}

/// Render a duration at millisecond precision for human output.
fn fmt_elapsed(d: Duration) -> String {
    humantime::format_duration(Duration::from_millis(d.as_millis() as u64)).to_string()
}

/// Print one progress event to stderr.
fn report_event(ev: &SearchEvent) {
    match ev {
        SearchEvent::AttemptStarted { parameter, value } => {
            eprintln!("Trying {parameter} = {value}");
        }
        SearchEvent::AttemptFinished { attempt } => match &attempt.outcome {
            AttemptOutcome::Unsatisfiable { stats } => {
                eprintln!("Unsatisfiable\n{stats}\n");
                eprintln!(
                    "Elapsed time {}",
                    fmt_elapsed(Duration::from_secs_f64(attempt.elapsed_secs))
                );
            }
            AttemptOutcome::Satisfiable { .. } | AttemptOutcome::Error { .. } => {}
        },
        SearchEvent::Nuked { process } => eprintln!("Nuked all processes named {process}"),
        SearchEvent::TimedOut => eprintln!("Timeout exceeded!"),
        SearchEvent::Aborted { error } => eprintln!("Aborting due to error: {error}"),
    }
}

async fn run_search(cfg: SweepConfig, json: bool) -> Result<()> {
    // Each attempt gets the full budget as its own process-level kill limit;
    // the sweep's shared deadline fires first and this backstops it.
    let solver = ClingoSolver::new(cfg.command.clone(), cfg.parameter.clone(), cfg.budget);
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<SearchEvent>();

    let sweep_cfg = cfg.clone();
    let handle =
        tokio::spawn(async move { sweep::run_sweep(&solver, &sweep_cfg, &event_tx).await });

    while let Some(ev) = event_rx.recv().await {
        report_event(&ev);
    }

    let result = handle.await.context("sweep task failed")??;
    let Some(result) = result else {
        // Events already reported why; exit with a failure status.
        std::process::exit(1);
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    println!("{}", result.solution);
    println!(
        "\nSolution found with parameter {} = {}",
        result.parameter, result.value
    );
    println!("{}", fmt_elapsed(result.total_elapsed));

    // A satisfiable answer must be well-formed; decode failures propagate.
    let answer = decode::parse_answer(&result.solution)
        .context("satisfiable answer failed to decode")?;
    for token in &answer.warnings {
        eprintln!("Warning: unknown symbol: {token}");
    }
    let board = Board::from_placements(&answer.placements, answer.width, answer.height);
    println!("{}", board.render());
    Ok(())
}

fn run_render(input: Option<&std::path::Path>, output: Option<&std::path::Path>) -> Result<()> {
    let transcript = match input {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read stdin")?;
            buf
        }
    };

    let line = match decode::extract_answer_line(&transcript) {
        Ok(line) => line,
        // Single literal fallback rather than a stack trace.
        Err(TranscriptError::Unsatisfiable { .. } | TranscriptError::Truncated { .. }) => {
            println!("UNSATISFIABLE");
            return Ok(());
        }
    };

    let answer = decode::parse_answer(line).context("answer line failed to decode")?;
    for token in &answer.warnings {
        eprintln!("Warning: unknown symbol: {token}");
    }
    let board = Board::from_placements(&answer.placements, answer.width, answer.height);
    let rendered = board.render();

    match output {
        Some(path) => std::fs::write(path, format!("{rendered}\n"))
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => println!("{rendered}"),
    }
    Ok(())
}
