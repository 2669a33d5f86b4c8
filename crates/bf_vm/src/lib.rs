//! BF-VM - bounded tape machine for the eight-instruction byte language
//!
//! Goals:
//! - Fixed tape and loop depth, chosen at construction
//! - Brackets validated once at load time; O(1) jumps at run time
//! - Every contract violation surfaces as a typed fault with its position
//! - I/O only through the `ByteSource` / `ByteSink` seams

pub mod config;
pub mod disasm;
pub mod error;
pub mod exec;
pub mod io;
pub mod loop_stack;
pub mod program;
pub mod samples;
pub mod tape;

pub use config::{ConfigError, EofPolicy, VmConfig};
pub use disasm::disassemble;
pub use error::{Edge, ExecError, Fault, RunError, UnmatchedBracket};
pub use exec::{run_bytes, State, TraceStep, Vm, VmOutcome};
pub use io::{ByteSink, ByteSource, Empty, ReadSource, SliceSource, WriteSink};
pub use loop_stack::LoopStack;
pub use program::{validate, BracketMap, Op, Program};
pub use tape::Tape;
