//! Answer-set decoding.
//!
//! Turns one solver answer line (space-separated symbolic facts) into typed
//! moves, placements, and board dimensions, and validates full solver
//! transcripts before any decoding happens.

use crate::model::{Move, Placement};
use std::fmt;

/// 0-based line positions within a solver transcript.
pub(crate) const ANSWER_LINE: usize = 4;
pub(crate) const VERDICT_LINE: usize = 5;
pub(crate) const STATS_LINE: usize = 7;

const SATISFIABLE: &str = "SATISFIABLE";

/// A transcript failed validation before decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranscriptError {
    /// The verdict line did not read `SATISFIABLE`.
    Unsatisfiable { verdict: String },
    /// The transcript has fewer lines than the fixed layout requires.
    Truncated { lines: usize },
}

impl fmt::Display for TranscriptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TranscriptError::Unsatisfiable { verdict } => {
                write!(f, "solver reported no solution (verdict line: {verdict:?})")
            }
            TranscriptError::Truncated { lines } => {
                write!(f, "transcript too short: {lines} lines")
            }
        }
    }
}

impl std::error::Error for TranscriptError {}

/// A token in the answer line did not match its expected shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    Arity {
        token: String,
        expected: usize,
        found: usize,
    },
    Number {
        token: String,
        field: String,
    },
    DuplicateDimension {
        axis: char,
    },
    MissingDimension {
        axis: char,
    },
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::Arity {
                token,
                expected,
                found,
            } => write!(f, "token {token:?}: expected {expected} arguments, found {found}"),
            DecodeError::Number { token, field } => {
                write!(f, "token {token:?}: field {field:?} is not an integer")
            }
            DecodeError::DuplicateDimension { axis } => {
                write!(f, "board{} given more than once", axis.to_ascii_uppercase())
            }
            DecodeError::MissingDimension { axis } => {
                write!(f, "board{} missing from answer", axis.to_ascii_uppercase())
            }
        }
    }
}

impl std::error::Error for DecodeError {}

/// Fully decoded answer set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answer {
    pub moves: Vec<Move>,
    pub placements: Vec<Placement>,
    pub width: u32,
    pub height: u32,
    /// Unrecognized tokens that were skipped, for diagnostic display.
    pub warnings: Vec<String>,
}

/// Validate a raw multi-line solver transcript and return its answer line.
///
/// The verdict must read `SATISFIABLE` at its fixed position; otherwise no
/// decoding is attempted.
pub fn extract_answer_line(transcript: &str) -> Result<&str, TranscriptError> {
    let lines: Vec<&str> = transcript.lines().collect();
    if lines.len() <= VERDICT_LINE {
        return Err(TranscriptError::Truncated { lines: lines.len() });
    }
    if lines[VERDICT_LINE] != SATISFIABLE {
        return Err(TranscriptError::Unsatisfiable {
            verdict: lines[VERDICT_LINE].to_string(),
        });
    }
    Ok(lines[ANSWER_LINE])
}

/// Split a fact token into its comma-separated arguments, checking arity.
fn args<'a>(token: &'a str, body: &'a str, expected: usize) -> Result<Vec<&'a str>, DecodeError> {
    let parts: Vec<&str> = body.split(',').collect();
    if parts.len() != expected {
        return Err(DecodeError::Arity {
            token: token.to_string(),
            expected,
            found: parts.len(),
        });
    }
    Ok(parts)
}

fn num(token: &str, field: &str, raw: &str) -> Result<u32, DecodeError> {
    raw.parse().map_err(|_| DecodeError::Number {
        token: token.to_string(),
        field: field.to_string(),
    })
}

/// Decode one answer line into moves, placements, and board dimensions.
///
/// Tokens are split on single spaces and classified by their prefix before
/// the opening parenthesis. Argument order is fixed and positional.
/// Unrecognized prefixes are skipped and reported in `Answer::warnings`.
pub fn parse_answer(line: &str) -> Result<Answer, DecodeError> {
    let mut moves = Vec::new();
    let mut placements = Vec::new();
    let mut width: Option<u32> = None;
    let mut height: Option<u32> = None;
    let mut warnings = Vec::new();

    for token in line.split(' ') {
        if token.is_empty() {
            continue;
        }
        let body = token
            .split_once('(')
            .and_then(|(_, rest)| rest.strip_suffix(')'));
        match (token.split_once('(').map(|(p, _)| p), body) {
            (Some("move"), Some(body)) => {
                let a = args(token, body, 3)?;
                moves.push(Move {
                    box_id: num(token, "box", a[0])?,
                    direction: a[1].to_string(),
                    time: num(token, "time", a[2])?,
                });
            }
            (Some("finalPos"), Some(body)) => {
                let a = args(token, body, 4)?;
                placements.push(Placement {
                    box_id: num(token, "box", a[0])?,
                    side_len: num(token, "sideLen", a[1])?,
                    x: num(token, "x", a[2])?,
                    y: num(token, "y", a[3])?,
                });
            }
            (Some("boardX"), Some(body)) => {
                let a = args(token, body, 1)?;
                if width.replace(num(token, "n", a[0])?).is_some() {
                    return Err(DecodeError::DuplicateDimension { axis: 'x' });
                }
            }
            (Some("boardY"), Some(body)) => {
                let a = args(token, body, 1)?;
                if height.replace(num(token, "n", a[0])?).is_some() {
                    return Err(DecodeError::DuplicateDimension { axis: 'y' });
                }
            }
            _ => warnings.push(token.to_string()),
        }
    }

    let width = width.ok_or(DecodeError::MissingDimension { axis: 'x' })?;
    let height = height.ok_or(DecodeError::MissingDimension { axis: 'y' })?;

    Ok(Answer {
        moves,
        placements,
        width,
        height,
        warnings,
    })
}
