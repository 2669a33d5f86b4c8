//! Run configuration: tape size, loop depth, end-of-input policy, fuel, trace.

use crate::loop_stack::DEFAULT_MAX_DEPTH;
use crate::tape::DEFAULT_TAPE_LEN;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_TRACE_CAP: usize = 10_000;

/// What `,` does once the input source is exhausted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EofPolicy {
    /// Stop the run with `InputExhausted`.
    #[default]
    Fault,
    /// Store this byte in the current cell.
    Byte(u8),
    /// Leave the current cell as it is.
    Unchanged,
}

impl FromStr for EofPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fault" | "error" => Ok(EofPolicy::Fault),
            "keep" | "unchanged" => Ok(EofPolicy::Unchanged),
            other => other
                .parse::<u8>()
                .map(EofPolicy::Byte)
                .map_err(|_| ConfigError::EofPolicy(s.to_string())),
        }
    }
}

impl fmt::Display for EofPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EofPolicy::Fault => f.write_str("fault"),
            EofPolicy::Byte(b) => write!(f, "{b}"),
            EofPolicy::Unchanged => f.write_str("keep"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("tape length must be at least 1")]
    ZeroTape,
    #[error("loop depth must be at least 1")]
    ZeroDepth,
    #[error("trace capacity must be at least 1 when tracing")]
    ZeroTraceCap,
    #[error("invalid eof policy {0:?} (expected fault, keep, or a byte 0-255)")]
    EofPolicy(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VmConfig {
    pub tape_len: usize,
    pub max_depth: usize,
    pub eof: EofPolicy,
    /// One unit per executed instruction; `None` is unmetered.
    pub fuel_limit: Option<u64>,
    pub trace: bool,
    /// Most recent trace steps kept in memory; older ones are dropped.
    pub trace_cap: usize,
}

impl Default for VmConfig {
    fn default() -> Self {
        Self {
            tape_len: DEFAULT_TAPE_LEN,
            max_depth: DEFAULT_MAX_DEPTH,
            eof: EofPolicy::Fault,
            fuel_limit: None,
            trace: false,
            trace_cap: DEFAULT_TRACE_CAP,
        }
    }
}

impl VmConfig {
    pub fn check(&self) -> Result<(), ConfigError> {
        if self.tape_len == 0 {
            return Err(ConfigError::ZeroTape);
        }
        if self.max_depth == 0 {
            return Err(ConfigError::ZeroDepth);
        }
        if self.trace && self.trace_cap == 0 {
            return Err(ConfigError::ZeroTraceCap);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_classic_machine() {
        let cfg = VmConfig::default();
        assert_eq!(cfg.tape_len, 30_000);
        assert_eq!(cfg.max_depth, 100);
        assert_eq!(cfg.eof, EofPolicy::Fault);
        assert_eq!(cfg.fuel_limit, None);
        assert!(cfg.check().is_ok());
    }

    #[test]
    fn rejects_zero_sizes() {
        let cfg = VmConfig { tape_len: 0, ..Default::default() };
        assert_eq!(cfg.check(), Err(ConfigError::ZeroTape));
        let cfg = VmConfig { max_depth: 0, ..Default::default() };
        assert_eq!(cfg.check(), Err(ConfigError::ZeroDepth));
        let cfg = VmConfig { trace: true, trace_cap: 0, ..Default::default() };
        assert_eq!(cfg.check(), Err(ConfigError::ZeroTraceCap));
    }

    #[test]
    fn eof_policy_parses() {
        assert_eq!("fault".parse(), Ok(EofPolicy::Fault));
        assert_eq!("KEEP".parse(), Ok(EofPolicy::Unchanged));
        assert_eq!("0".parse(), Ok(EofPolicy::Byte(0)));
        assert_eq!("255".parse(), Ok(EofPolicy::Byte(255)));
        assert!("256".parse::<EofPolicy>().is_err());
        assert!("eof".parse::<EofPolicy>().is_err());
    }

    #[test]
    fn eof_policy_display_round_trips() {
        for p in [EofPolicy::Fault, EofPolicy::Unchanged, EofPolicy::Byte(42)] {
            assert_eq!(p.to_string().parse(), Ok(p));
        }
    }

    #[test]
    fn partial_json_fills_defaults() {
        let cfg: VmConfig = serde_json::from_str(r#"{"tape_len": 8, "eof": {"byte": 0}}"#).unwrap();
        assert_eq!(cfg.tape_len, 8);
        assert_eq!(cfg.max_depth, 100);
        assert_eq!(cfg.eof, EofPolicy::Byte(0));
    }
}
