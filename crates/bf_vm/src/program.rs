//! Program loading: instruction decoding and the bracket map.

use crate::error::{ExecError, UnmatchedBracket};

/// The eight instructions, plus `Nop` for every other byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Op {
    Right = b'>',
    Left = b'<',
    Inc = b'+',
    Dec = b'-',
    Out = b'.',
    In = b',',
    Open = b'[',
    Close = b']',
    Nop = 0,
}

impl Op {
    pub fn decode(byte: u8) -> Op {
        Op::try_from(byte).unwrap_or(Op::Nop)
    }

    /// Source symbol, `None` for `Nop`.
    pub fn symbol(self) -> Option<char> {
        match self {
            Op::Nop => None,
            op => Some(op as u8 as char),
        }
    }

    pub fn mnemonic(self) -> &'static str {
        match self {
            Op::Right => "RIGHT",
            Op::Left => "LEFT",
            Op::Inc => "INC",
            Op::Dec => "DEC",
            Op::Out => "OUT",
            Op::In => "IN",
            Op::Open => "LOOP",
            Op::Close => "END",
            Op::Nop => "NOP",
        }
    }
}

impl TryFrom<u8> for Op {
    type Error = ();
    fn try_from(v: u8) -> Result<Self, Self::Error> {
        use Op::*;
        Ok(match v {
            b'>' => Right,
            b'<' => Left,
            b'+' => Inc,
            b'-' => Dec,
            b'.' => Out,
            b',' => In,
            b'[' => Open,
            b']' => Close,
            _ => return Err(()),
        })
    }
}

/// Pairing between each `[` and its `]`, indexed by program position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BracketMap {
    pairs: Vec<Option<usize>>,
    max_depth: usize,
}

impl BracketMap {
    /// Position of the bracket paired with the one at `pos`.
    pub fn match_of(&self, pos: usize) -> Option<usize> {
        self.pairs.get(pos).copied().flatten()
    }

    /// Deepest bracket nesting seen in the program.
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }
}

/// Single left-to-right scan over `code`, pairing brackets.
///
/// Fails with [`UnmatchedBracket`] at the first `]` that closes nothing, or at
/// the innermost `[` still open when the scan ends.
pub fn validate(code: &[u8]) -> Result<BracketMap, UnmatchedBracket> {
    let mut pairs = vec![None; code.len()];
    let mut open: Vec<usize> = Vec::new();
    let mut max_depth = 0;
    for (pos, &byte) in code.iter().enumerate() {
        match byte {
            b'[' => {
                open.push(pos);
                max_depth = max_depth.max(open.len());
            }
            b']' => {
                let start = open.pop().ok_or(UnmatchedBracket(pos))?;
                pairs[start] = Some(pos);
                pairs[pos] = Some(start);
            }
            _ => {}
        }
    }
    if let Some(&start) = open.last() {
        return Err(UnmatchedBracket(start));
    }
    Ok(BracketMap { pairs, max_depth })
}

/// A validated, immutable program. Cheap to share across runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    source: String,
    ops: Vec<Op>,
    brackets: BracketMap,
}

impl Program {
    pub fn parse(source: impl Into<String>) -> Result<Self, UnmatchedBracket> {
        let source = source.into();
        let brackets = validate(source.as_bytes())?;
        let ops = source.bytes().map(Op::decode).collect();
        Ok(Self {
            source,
            ops,
            brackets,
        })
    }

    /// `parse`, with a validation failure reported at the offending bracket.
    pub fn load(source: impl Into<String>) -> Result<Self, ExecError> {
        Self::parse(source).map_err(ExecError::from)
    }

    pub fn op_at(&self, pc: usize) -> Option<Op> {
        self.ops.get(pc).copied()
    }

    pub fn match_of(&self, pos: usize) -> Option<usize> {
        self.brackets.match_of(pos)
    }

    pub fn brackets(&self) -> &BracketMap {
        &self.brackets
    }

    pub fn max_nesting(&self) -> usize {
        self.brackets.max_depth()
    }

    /// Number of positions, no-ops included; `pc == len()` means halted.
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn instruction_count(&self) -> usize {
        self.ops.iter().filter(|op| **op != Op::Nop).count()
    }

    pub fn ops(&self) -> &[Op] {
        &self.ops
    }

    pub fn source(&self) -> &str {
        &self.source
    }
}

impl std::str::FromStr for Program {
    type Err = UnmatchedBracket;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Program::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Fault;

    #[test]
    fn decodes_every_symbol() {
        for (b, op) in [
            (b'>', Op::Right),
            (b'<', Op::Left),
            (b'+', Op::Inc),
            (b'-', Op::Dec),
            (b'.', Op::Out),
            (b',', Op::In),
            (b'[', Op::Open),
            (b']', Op::Close),
        ] {
            assert_eq!(Op::decode(b), op);
            assert_eq!(op.symbol(), Some(b as char));
        }
        assert_eq!(Op::decode(b'a'), Op::Nop);
        assert_eq!(Op::decode(0), Op::Nop);
        assert_eq!(Op::Nop.symbol(), None);
    }

    #[test]
    fn nested_pairs_both_directions() {
        let map = validate(b"[[]]").unwrap();
        assert_eq!(map.match_of(0), Some(3));
        assert_eq!(map.match_of(3), Some(0));
        assert_eq!(map.match_of(1), Some(2));
        assert_eq!(map.match_of(2), Some(1));
        assert_eq!(map.max_depth(), 2);
    }

    #[test]
    fn non_brackets_have_no_match() {
        let map = validate(b"+[-]x").unwrap();
        assert_eq!(map.match_of(0), None);
        assert_eq!(map.match_of(2), None);
        assert_eq!(map.match_of(4), None);
        assert_eq!(map.match_of(99), None);
    }

    #[test]
    fn unclosed_open_reports_innermost() {
        assert_eq!(validate(b"[[]"), Err(UnmatchedBracket(0)));
        assert_eq!(validate(b"[+[-"), Err(UnmatchedBracket(2)));
    }

    #[test]
    fn stray_close_reports_itself() {
        assert_eq!(validate(b"+]["), Err(UnmatchedBracket(1)));
        assert_eq!(validate(b"[]]"), Err(UnmatchedBracket(2)));
    }

    #[test]
    fn parse_keeps_comments_as_nops() {
        let p: Program = "a+ b-\n".parse().unwrap();
        assert_eq!(p.len(), 6);
        assert_eq!(p.instruction_count(), 2);
        assert_eq!(p.op_at(1), Some(Op::Inc));
        assert_eq!(p.op_at(0), Some(Op::Nop));
        assert_eq!(p.op_at(6), None);
        assert_eq!(p.source(), "a+ b-\n");
    }

    #[test]
    fn load_positions_the_error() {
        let err = Program::load("++]").unwrap_err();
        assert_eq!(err, ExecError::new(2, Fault::UnmatchedBracket(2)));
    }

    #[test]
    fn empty_program_is_valid() {
        let p = Program::parse("").unwrap();
        assert!(p.is_empty());
        assert_eq!(p.max_nesting(), 0);
    }
}
