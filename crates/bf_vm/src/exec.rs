//! Execution engine: fetch, dispatch and execute over a validated program.

use crate::config::{ConfigError, EofPolicy, VmConfig};
use crate::error::{ExecError, Fault, RunError};
use crate::io::{ByteSink, ByteSource, SliceSource};
use crate::loop_stack::LoopStack;
use crate::program::{Op, Program};
use crate::tape::Tape;
use serde::Serialize;
use std::collections::VecDeque;
use tracing::{debug, trace, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum State {
    Running,
    Halted,
    Faulted(ExecError),
}

impl State {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, State::Running)
    }
}

/// Machine state right after one instruction executed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TraceStep {
    pub step: u64,
    pub pc: usize,
    pub op: char,
    pub cursor: usize,
    pub cell: u8,
    pub depth: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct VmOutcome {
    pub steps: u64,
    pub output_len: u64,
    pub cursor: usize,
    pub trace: Vec<TraceStep>,
    /// Trace steps evicted once the buffer reached `trace_cap`.
    pub trace_dropped: u64,
}

/// Execution engine. Owns its tape and loop stack for the length of one run.
pub struct Vm<'p, I: ByteSource, O: ByteSink> {
    cfg: VmConfig,
    program: &'p Program,
    tape: Tape,
    loops: LoopStack,
    pc: usize,
    state: State,
    steps: u64,
    output_len: u64,
    input: I,
    output: O,
    trace: VecDeque<TraceStep>,
    trace_dropped: u64,
}

impl<'p, I: ByteSource, O: ByteSink> Vm<'p, I, O> {
    /// Fresh machine for `program`. Rejects configs that fail `VmConfig::check`.
    pub fn new(cfg: VmConfig, program: &'p Program, input: I, output: O) -> Result<Self, ConfigError> {
        cfg.check()?;
        Ok(Self {
            tape: Tape::new(cfg.tape_len)?,
            loops: LoopStack::with_capacity(cfg.max_depth),
            cfg,
            program,
            pc: 0,
            state: State::Running,
            steps: 0,
            output_len: 0,
            input,
            output,
            trace: VecDeque::new(),
            trace_dropped: 0,
        })
    }

    /// Execute one instruction. No-op once the machine is halted or faulted.
    pub fn step(&mut self) -> &State {
        if self.state.is_terminal() {
            return &self.state;
        }
        let pc = self.pc;
        let Some(op) = self.program.op_at(pc) else {
            self.state = State::Halted;
            return &self.state;
        };
        match self.exec(pc, op) {
            Ok(next) => {
                self.pc = next;
                if op != Op::Nop {
                    self.record(pc, op);
                }
                if next >= self.program.len() {
                    self.state = State::Halted;
                }
            }
            Err(fault) => {
                let err = ExecError::new(pc, fault);
                warn!(code = fault.code(), pc, steps = self.steps, "run faulted: {err}");
                self.state = State::Faulted(err);
            }
        }
        &self.state
    }

    /// Step until halted or faulted, then flush the output sink.
    pub fn run(&mut self) -> Result<VmOutcome, ExecError> {
        debug!(
            len = self.program.len(),
            tape_len = self.tape.len(),
            max_depth = self.loops.capacity(),
            "run start"
        );
        while !self.step().is_terminal() {}
        let flushed = self.output.flush();
        if let State::Faulted(err) = &self.state {
            return Err(*err);
        }
        if let Err(e) = flushed {
            let err = ExecError::new(self.pc, e.into());
            self.state = State::Faulted(err);
            return Err(err);
        }
        debug!(steps = self.steps, output_len = self.output_len, "run halted");
        Ok(VmOutcome {
            steps: self.steps,
            output_len: self.output_len,
            cursor: self.tape.cursor(),
            trace: std::mem::take(&mut self.trace).into(),
            trace_dropped: self.trace_dropped,
        })
    }

    fn charge(&mut self) -> Result<(), Fault> {
        if let Some(limit) = self.cfg.fuel_limit {
            if self.steps >= limit {
                return Err(Fault::FuelExhausted(limit));
            }
        }
        self.steps += 1;
        Ok(())
    }

    /// Runs `op` at `pc` and returns the next program counter.
    fn exec(&mut self, pc: usize, op: Op) -> Result<usize, Fault> {
        if op == Op::Nop {
            return Ok(pc + 1);
        }
        self.charge()?;
        match op {
            Op::Right => self.tape.move_right()?,
            Op::Left => self.tape.move_left()?,
            Op::Inc => self.tape.increment(),
            Op::Dec => self.tape.decrement(),
            Op::Out => {
                self.output.put(self.tape.read())?;
                self.output_len += 1;
            }
            Op::In => {
                // pending output (a prompt) must be visible before blocking on input
                self.output.flush()?;
                self.read_input()?;
            }
            Op::Open => {
                if self.tape.read() == 0 {
                    let end = self
                        .program
                        .match_of(pc)
                        .ok_or(Fault::UnmatchedBracket(pc))?;
                    return Ok(end + 1);
                }
                self.loops.push(pc)?;
            }
            Op::Close => {
                if self.tape.read() != 0 {
                    return Ok(self.loops.top()? + 1);
                }
                self.loops.pop()?;
            }
            Op::Nop => {}
        }
        Ok(pc + 1)
    }

    fn read_input(&mut self) -> Result<(), Fault> {
        match self.input.next_byte()? {
            Some(b) => self.tape.write(b),
            None => match self.cfg.eof {
                EofPolicy::Fault => return Err(Fault::InputExhausted),
                EofPolicy::Byte(b) => self.tape.write(b),
                EofPolicy::Unchanged => {}
            },
        }
        Ok(())
    }

    fn record(&mut self, pc: usize, op: Op) {
        if !self.cfg.trace {
            return;
        }
        let step = TraceStep {
            step: self.steps,
            pc,
            op: op.symbol().unwrap_or(' '),
            cursor: self.tape.cursor(),
            cell: self.tape.read(),
            depth: self.loops.depth(),
        };
        trace!(
            step = step.step,
            pc,
            op = %step.op,
            cursor = step.cursor,
            cell = step.cell,
            depth = step.depth
        );
        if self.trace.len() == self.cfg.trace_cap {
            self.trace.pop_front();
            self.trace_dropped += 1;
        }
        self.trace.push_back(step);
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn pc(&self) -> usize {
        self.pc
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn tape(&self) -> &Tape {
        &self.tape
    }

    /// Most recent steps, at most `trace_cap`; drained into `VmOutcome` on a clean halt.
    pub fn trace(&self) -> &VecDeque<TraceStep> {
        &self.trace
    }

    pub fn last_step(&self) -> Option<&TraceStep> {
        self.trace.back()
    }

    pub fn loop_depth(&self) -> usize {
        self.loops.depth()
    }

    pub fn program(&self) -> &'p Program {
        self.program
    }

    pub fn output(&self) -> &O {
        &self.output
    }

    pub fn into_parts(self) -> (Tape, I, O) {
        (self.tape, self.input, self.output)
    }
}

/// Load, validate, and run `source` against an in-memory input, collecting output.
pub fn run_bytes(source: &str, input: &[u8], cfg: &VmConfig) -> Result<Vec<u8>, RunError> {
    let program = Program::load(source)?;
    let mut vm = Vm::new(cfg.clone(), &program, SliceSource::new(input), Vec::new())?;
    vm.run()?;
    let (_, _, out) = vm.into_parts();
    Ok(out)
}
