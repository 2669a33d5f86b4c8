use anyhow::{Context, Result};
use bf_vm::{
    disassemble, samples as bundled, ByteSource, Empty, ExecError, Program, ReadSource,
    SliceSource, State, TraceStep, Vm, VmConfig, WriteSink,
};
use colored::Colorize;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{self, BufReader, Read};
use tracing::info;

#[derive(Debug, thiserror::Error)]
pub enum UsageError {
    #[error("unknown sample {0:?} (try `bfx samples`)")]
    UnknownSample(String),
    #[error("program and input cannot both come from stdin")]
    StdinTwice,
}

/// JSON run report for `--json`.
#[derive(Debug, Serialize)]
struct Report {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pc: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    steps: u64,
    output: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    trace: Vec<TraceStep>,
}

fn read_program(file: &str) -> Result<String> {
    if file == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("read program from stdin")?;
        Ok(buf)
    } else {
        fs::read_to_string(file).with_context(|| format!("read program {file}"))
    }
}

fn load(file: &str) -> Result<Program> {
    let source = read_program(file)?;
    Ok(Program::load(source)?)
}

// ── run ─────────────────────────────────────────────────────────

pub fn run(
    cfg: &VmConfig,
    file: Option<&str>,
    code: Option<&str>,
    input: Option<&str>,
    json: bool,
) -> Result<()> {
    let program_on_stdin = code.is_none() && file == Some("-");
    let program = match (code, file) {
        (Some(code), _) => Program::load(code)?,
        (None, Some(file)) => load(file)?,
        (None, None) => Program::load("")?,
    };

    let mut source: Box<dyn ByteSource> = match input {
        Some("-") if program_on_stdin => return Err(UsageError::StdinTwice.into()),
        Some("-") => Box::new(ReadSource::new(io::stdin().lock())),
        Some(path) => {
            let f = File::open(path).with_context(|| format!("read input {path}"))?;
            Box::new(ReadSource::new(BufReader::new(f)))
        }
        None if program_on_stdin => Box::new(Empty),
        None => Box::new(ReadSource::new(io::stdin().lock())),
    };

    execute(cfg, &program, &mut *source, json)
}

// ── sample / samples ────────────────────────────────────────────

pub fn sample(cfg: &VmConfig, name: &str, json: bool) -> Result<()> {
    let s = bundled::find(name).ok_or_else(|| UsageError::UnknownSample(name.to_string()))?;
    info!(sample = s.name, "running bundled sample");
    let program = Program::load(s.source)?;
    let mut source = SliceSource::new(s.input);
    execute(cfg, &program, &mut source, json)
}

pub fn samples() -> Result<()> {
    println!("{} {} programs\n", "Samples:".bold(), bundled::all().len());
    for s in bundled::all() {
        println!("  {:<10} {}", s.name.cyan(), s.description.dimmed());
        if !s.input.is_empty() {
            println!("  {:<10} {} {:?}", "", "input:".dimmed(), String::from_utf8_lossy(s.input));
        }
    }
    Ok(())
}

// ── check ───────────────────────────────────────────────────────

pub fn check(cfg: &VmConfig, file: &str) -> Result<()> {
    let program = load(file)?;
    let nesting = program.max_nesting();

    println!("{} {}", "Brackets:    ".dimmed(), "balanced".green().bold());
    println!("{} {}", "Instructions:".dimmed(), program.instruction_count());
    println!("{} {}", "Length:      ".dimmed(), program.len());
    if nesting > cfg.max_depth {
        println!(
            "{} {} {}",
            "Max nesting: ".dimmed(),
            nesting.to_string().yellow().bold(),
            format!("(exceeds loop depth {})", cfg.max_depth).yellow()
        );
    } else {
        println!("{} {}", "Max nesting: ".dimmed(), nesting);
    }
    Ok(())
}

// ── disasm ──────────────────────────────────────────────────────

pub fn disasm(file: &str) -> Result<()> {
    let program = load(file)?;
    print!("{}", disassemble(&program));
    Ok(())
}

// ── shared ──────────────────────────────────────────────────────

fn execute(cfg: &VmConfig, program: &Program, source: &mut dyn ByteSource, json: bool) -> Result<()> {
    if json {
        let mut out = Vec::new();
        let mut vm = Vm::new(cfg.clone(), program, source, &mut out)?;
        let result = vm.run();
        let steps = vm.steps();
        let trace = match &result {
            Ok(outcome) => outcome.trace.clone(),
            Err(_) => vm.trace().iter().cloned().collect(),
        };
        drop(vm);
        let report = report(steps, &out, &result, trace);
        println!("{}", serde_json::to_string_pretty(&report)?);
        return result.map(|_| ()).map_err(Into::into);
    }

    let stdout = io::stdout();
    let mut vm = Vm::new(cfg.clone(), program, source, WriteSink::new(stdout.lock()))?;
    if cfg.trace {
        // print each step as it happens; the in-memory buffer only keeps the tail
        let mut printed = 0;
        while !vm.step().is_terminal() {
            if let Some(t) = vm.last_step().filter(|t| t.step > printed) {
                print_step(t);
                printed = t.step;
            }
        }
        if let Some(t) = vm.last_step().filter(|t| t.step > printed) {
            print_step(t);
        }
    }
    let result = vm.run();
    if let State::Faulted(err) = vm.state() {
        info!(steps = vm.steps(), "stopped at pc {}", err.pc);
    }
    let outcome = result?;
    info!(steps = outcome.steps, output_len = outcome.output_len, "halted");
    Ok(())
}

fn report(
    steps: u64,
    out: &[u8],
    result: &Result<bf_vm::VmOutcome, ExecError>,
    trace: Vec<TraceStep>,
) -> Report {
    let output = String::from_utf8_lossy(out).into_owned();
    match result {
        Ok(_) => Report {
            status: "halted",
            code: None,
            pc: None,
            message: None,
            steps,
            output,
            trace,
        },
        Err(err) => Report {
            status: "faulted",
            code: Some(err.code()),
            pc: Some(err.pc),
            message: Some(err.fault.to_string()),
            steps,
            output,
            trace,
        },
    }
}

fn print_step(t: &TraceStep) {
    eprintln!(
        "{} {} {} {} {}",
        format!("{:>6}", t.step).dimmed(),
        format!("pc={:04}", t.pc).blue(),
        t.op.to_string().bold(),
        format!("mp={} *mp={}", t.cursor, t.cell).dimmed(),
        format!("depth={}", t.depth).dimmed(),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_for_halted_run() {
        let p = Program::load("+++.").unwrap();
        let mut out = Vec::new();
        let mut vm = Vm::new(VmConfig::default(), &p, Empty, &mut out).unwrap();
        let result = vm.run();
        let steps = vm.steps();
        drop(vm);
        let r = report(steps, &out, &result, Vec::new());
        assert_eq!(r.status, "halted");
        assert_eq!(r.steps, 4);
        assert_eq!(r.output, "\u{3}");
        assert!(r.code.is_none());
    }

    #[test]
    fn report_for_fault_names_code_and_pc() {
        let p = Program::load("+<").unwrap();
        let mut out = Vec::new();
        let mut vm = Vm::new(VmConfig::default(), &p, Empty, &mut out).unwrap();
        let result = vm.run();
        let steps = vm.steps();
        drop(vm);
        let r = report(steps, &out, &result, Vec::new());
        assert_eq!(r.status, "faulted");
        assert_eq!(r.code, Some("out_of_bounds"));
        assert_eq!(r.pc, Some(1));
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["code"], "out_of_bounds");
        assert!(json.get("trace").is_none());
    }

    #[test]
    fn unknown_sample_is_a_usage_error() {
        let err = sample(&VmConfig::default(), "nope", false).unwrap_err();
        assert!(err.downcast_ref::<UsageError>().is_some());
    }
}
