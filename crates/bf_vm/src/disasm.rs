//! BF-VM disassembler: human-readable instruction listing.

use crate::program::{Op, Program};

/// One line per instruction; no-op bytes are skipped. Loop bodies are
/// indented and brackets show the position of their partner.
pub fn disassemble(program: &Program) -> String {
    let mut out = String::new();
    let mut depth = 0usize;

    for (pc, &op) in program.ops().iter().enumerate() {
        if op == Op::Nop {
            continue;
        }
        if op == Op::Close {
            depth = depth.saturating_sub(1);
        }
        out.push_str(&format_instr(pc, op, depth, program.match_of(pc)));
        out.push('\n');
        if op == Op::Open {
            depth += 1;
        }
    }

    if out.is_empty() {
        out.push_str("(empty program)\n");
    }
    out
}

fn format_instr(pc: usize, op: Op, depth: usize, partner: Option<usize>) -> String {
    let sym = op.symbol().unwrap_or(' ');
    let indent = "  ".repeat(depth);
    match partner {
        Some(target) => format!("{:04}  {}  {}{} -> {:04}", pc, sym, indent, op.mnemonic(), target),
        None => format!("{:04}  {}  {}{}", pc, sym, indent, op.mnemonic()),
    }
}
