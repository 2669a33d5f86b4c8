use bf_vm::{EofPolicy, ExecError, Fault, VmConfig};
use clap::{ArgAction, Parser, Subcommand};
use colored::Colorize;
use std::process;
use tracing::Level;

mod commands;

/// Standardized exit codes for CLI.
/// 0 = halted, 2 = input error, 3 = unmatched bracket, 4 = out of bounds,
/// 5 = loop stack, 6 = input exhausted, 7 = fuel exhausted, 1 = other.
const EXIT_OTHER: i32 = 1;
const EXIT_INPUT: i32 = 2;
const EXIT_BRACKET: i32 = 3;
const EXIT_BOUNDS: i32 = 4;
const EXIT_LOOP: i32 = 5;
const EXIT_EOF: i32 = 6;
const EXIT_FUEL: i32 = 7;

#[derive(Parser)]
#[command(name = "bfx", version, about = "BF-VM command line — run, check, disassemble")]
struct Cli {
    /// Number of tape cells
    #[arg(long, env = "BF_TAPE_LEN", default_value_t = 30_000, global = true)]
    tape_len: usize,

    /// Maximum loop nesting depth
    #[arg(long, env = "BF_LOOP_DEPTH", default_value_t = 100, global = true)]
    max_depth: usize,

    /// End-of-input policy: fault, keep, or a byte value (0-255)
    #[arg(long, env = "BF_EOF", default_value = "fault", global = true)]
    eof: EofPolicy,

    /// Instruction budget; unlimited when unset
    #[arg(long, env = "BF_FUEL", global = true)]
    fuel: Option<u64>,

    /// Print every executed instruction to stderr as it runs
    #[arg(long, global = true)]
    trace: bool,

    /// Trace steps kept in memory for the JSON report (oldest dropped first)
    #[arg(long, env = "BF_TRACE_CAP", default_value_t = bf_vm::config::DEFAULT_TRACE_CAP, global = true)]
    trace_cap: usize,

    /// Log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a program from a file (or - for stdin)
    Run {
        /// Path to program file
        #[arg(required_unless_present = "code")]
        file: Option<String>,
        /// Program text given inline instead of a file
        #[arg(long, short = 'e', conflicts_with = "file")]
        code: Option<String>,
        /// Input file for `,` (or - for stdin); defaults to stdin
        #[arg(long, short)]
        input: Option<String>,
        /// Print a JSON run report instead of raw output
        #[arg(long)]
        json: bool,
    },
    /// Run one of the bundled sample programs
    Sample {
        /// Sample name (see `bfx samples`)
        name: String,
        #[arg(long)]
        json: bool,
    },
    /// List the bundled sample programs
    Samples,
    /// Validate brackets and report program statistics
    Check {
        /// Path to program file
        file: String,
    },
    /// Print a disassembly listing
    Disasm {
        /// Path to program file
        file: String,
    },
}

fn exit_code_for_fault(fault: &Fault) -> i32 {
    match fault {
        Fault::UnmatchedBracket(_) => EXIT_BRACKET,
        Fault::OutOfBounds(_) => EXIT_BOUNDS,
        Fault::LoopStackOverflow(_) | Fault::LoopStackUnderflow => EXIT_LOOP,
        Fault::InputExhausted => EXIT_EOF,
        Fault::FuelExhausted(_) => EXIT_FUEL,
        Fault::Io(_) => EXIT_OTHER,
    }
}

/// Map an error chain to an exit code: faults by category, bad input as 2.
fn exit_code_for(err: &anyhow::Error) -> i32 {
    if let Some(e) = err.downcast_ref::<ExecError>() {
        exit_code_for_fault(&e.fault)
    } else if err.downcast_ref::<commands::UsageError>().is_some()
        || err.downcast_ref::<bf_vm::ConfigError>().is_some()
        || err.downcast_ref::<std::io::Error>().is_some()
    {
        EXIT_INPUT
    } else {
        EXIT_OTHER
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let cfg = VmConfig {
        tape_len: cli.tape_len,
        max_depth: cli.max_depth,
        eof: cli.eof,
        fuel_limit: cli.fuel,
        trace: cli.trace,
        trace_cap: cli.trace_cap,
    };

    let result = cfg.check().map_err(anyhow::Error::from).and_then(|()| match cli.command {
        Commands::Run { file, code, input, json } => {
            commands::run(&cfg, file.as_deref(), code.as_deref(), input.as_deref(), json)
        }
        Commands::Sample { name, json } => commands::sample(&cfg, &name, json),
        Commands::Samples => commands::samples(),
        Commands::Check { file } => commands::check(&cfg, &file),
        Commands::Disasm { file } => commands::disasm(&file),
    });

    if let Err(e) = result {
        eprintln!("{} {:#}", "error:".red().bold(), e);
        process::exit(exit_code_for(&e));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bf_vm::Edge;

    #[test]
    fn faults_map_to_distinct_codes() {
        let codes = [
            exit_code_for_fault(&Fault::UnmatchedBracket(0)),
            exit_code_for_fault(&Fault::OutOfBounds(Edge::Right)),
            exit_code_for_fault(&Fault::LoopStackOverflow(100)),
            exit_code_for_fault(&Fault::InputExhausted),
            exit_code_for_fault(&Fault::FuelExhausted(1)),
        ];
        assert_eq!(codes, [3, 4, 5, 6, 7]);
        assert_eq!(exit_code_for_fault(&Fault::LoopStackUnderflow), EXIT_LOOP);
    }

    #[test]
    fn error_chain_is_classified() {
        let fault = anyhow::Error::from(ExecError::new(0, Fault::OutOfBounds(Edge::Left)));
        assert_eq!(exit_code_for(&fault), EXIT_BOUNDS);

        let io = anyhow::Error::from(std::io::Error::from(std::io::ErrorKind::NotFound))
            .context("read program");
        assert_eq!(exit_code_for(&io), EXIT_INPUT);

        let other = anyhow::anyhow!("something else");
        assert_eq!(exit_code_for(&other), EXIT_OTHER);
    }

    #[test]
    fn cli_parses_globals_after_subcommand() {
        let cli = Cli::try_parse_from(["bfx", "run", "-e", "+.", "--eof", "0", "--tape-len", "8"]).unwrap();
        assert_eq!(cli.eof, EofPolicy::Byte(0));
        assert_eq!(cli.tape_len, 8);
        assert_eq!(cli.trace_cap, 10_000);
        assert!(matches!(cli.command, Commands::Run { code: Some(_), file: None, .. }));
    }

    #[test]
    fn zero_trace_cap_with_trace_is_an_input_error() {
        let cfg = VmConfig { trace: true, trace_cap: 0, ..Default::default() };
        let err = anyhow::Error::from(cfg.check().unwrap_err());
        assert_eq!(exit_code_for(&err), EXIT_INPUT);
    }

    #[test]
    fn run_needs_a_program() {
        assert!(Cli::try_parse_from(["bfx", "run"]).is_err());
    }
}
