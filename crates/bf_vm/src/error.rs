//! Fault taxonomy shared by loading and execution.

use crate::config::ConfigError;
use serde::{Deserialize, Serialize};
use std::io;

/// Tape edge a cursor move ran into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Edge {
    Left,
    Right,
}

impl std::fmt::Display for Edge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Edge::Left => f.write_str("left"),
            Edge::Right => f.write_str("right"),
        }
    }
}

/// Reason a run stopped. Every fault is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Fault {
    #[error("cursor moved past the {0} edge of the tape")]
    OutOfBounds(Edge),
    #[error("unmatched bracket at {0}")]
    UnmatchedBracket(usize),
    #[error("loop stack overflow (max depth {0})")]
    LoopStackOverflow(usize),
    #[error("loop stack underflow")]
    LoopStackUnderflow,
    #[error("input exhausted")]
    InputExhausted,
    #[error("fuel exhausted (limit {0})")]
    FuelExhausted(u64),
    #[error("i/o: {0}")]
    Io(io::ErrorKind),
}

impl Fault {
    /// Stable, machine-readable reason code.
    pub fn code(&self) -> &'static str {
        match self {
            Fault::OutOfBounds(_) => "out_of_bounds",
            Fault::UnmatchedBracket(_) => "unmatched_bracket",
            Fault::LoopStackOverflow(_) => "loop_stack_overflow",
            Fault::LoopStackUnderflow => "loop_stack_underflow",
            Fault::InputExhausted => "input_exhausted",
            Fault::FuelExhausted(_) => "fuel_exhausted",
            Fault::Io(_) => "io",
        }
    }
}

impl From<io::Error> for Fault {
    fn from(e: io::Error) -> Self {
        Fault::Io(e.kind())
    }
}

/// Load-time bracket validation failure, positioned at the offending bracket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("unmatched bracket at {0}")]
pub struct UnmatchedBracket(pub usize);

impl From<UnmatchedBracket> for Fault {
    fn from(e: UnmatchedBracket) -> Self {
        Fault::UnmatchedBracket(e.0)
    }
}

impl From<UnmatchedBracket> for ExecError {
    fn from(e: UnmatchedBracket) -> Self {
        ExecError::new(e.0, e.into())
    }
}

/// A fault together with the program position where it was raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("{fault} at pc {pc}")]
pub struct ExecError {
    pub pc: usize,
    pub fault: Fault,
}

impl ExecError {
    pub fn new(pc: usize, fault: Fault) -> Self {
        Self { pc, fault }
    }

    pub fn code(&self) -> &'static str {
        self.fault.code()
    }
}

/// Failure of a whole load-configure-run cycle.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RunError {
    #[error("config: {0}")]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Exec(#[from] ExecError),
}

impl RunError {
    /// The run fault, `None` when the configuration was rejected.
    pub fn exec(&self) -> Option<&ExecError> {
        match self {
            RunError::Exec(e) => Some(e),
            RunError::Config(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable() {
        assert_eq!(Fault::OutOfBounds(Edge::Left).code(), "out_of_bounds");
        assert_eq!(Fault::UnmatchedBracket(3).code(), "unmatched_bracket");
        assert_eq!(Fault::LoopStackOverflow(100).code(), "loop_stack_overflow");
        assert_eq!(Fault::LoopStackUnderflow.code(), "loop_stack_underflow");
        assert_eq!(Fault::InputExhausted.code(), "input_exhausted");
        assert_eq!(Fault::FuelExhausted(10).code(), "fuel_exhausted");
        assert_eq!(Fault::Io(io::ErrorKind::BrokenPipe).code(), "io");
    }

    #[test]
    fn exec_error_names_position() {
        let e = ExecError::new(7, Fault::OutOfBounds(Edge::Left));
        assert_eq!(e.to_string(), "cursor moved past the left edge of the tape at pc 7");
        assert_eq!(e.code(), "out_of_bounds");
    }

    #[test]
    fn unmatched_bracket_positions_exec_error() {
        let e = ExecError::from(UnmatchedBracket(4));
        assert_eq!(e, ExecError::new(4, Fault::UnmatchedBracket(4)));
    }
}
