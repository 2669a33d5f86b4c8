//! Programs bundled with the VM, each with a known input and output.

#[derive(Debug, Clone, Copy)]
pub struct Sample {
    pub name: &'static str,
    pub description: &'static str,
    pub source: &'static str,
    pub input: &'static [u8],
    pub expected: &'static [u8],
}

pub const HELLO: Sample = Sample {
    name: "hello",
    description: "prints \"Hello World!\\n\" with nested loops",
    source: concat!(
        "++++++++[>++++[>++>+++>+++>+<<<<-]>+>+>->>+[<]<-]>>.>---.+++++++..+++.",
        ">>.<-.<.+++.------.--------.>>+.>++."
    ),
    input: b"",
    expected: b"Hello World!\n",
};

pub const COUNTDOWN: Sample = Sample {
    name: "countdown",
    description: "prints the digits 9 down to 0, space separated",
    source: concat!(
        "++++++++++++++++++++++++++++++++[>+>+<<-]>>+++++++++++++++++++++++++<<",
        "++++++++++[>>.-<.<-]++++++++++."
    ),
    input: b"",
    expected: b"9 8 7 6 5 4 3 2 1 0 \n",
};

pub const ECHO: Sample = Sample {
    name: "echo",
    description: "reads three bytes and echoes shifted copies of them",
    source: ",+.>,-.>,++.<<.>.>.>+++[.-]>++++++++++.",
    input: b"abc",
    expected: b"baebae\x03\x02\x01\n",
};

pub const ALL: &[Sample] = &[HELLO, COUNTDOWN, ECHO];

pub fn all() -> &'static [Sample] {
    ALL
}

pub fn find(name: &str) -> Option<&'static Sample> {
    all().iter().find(|s| s.name.eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{run_bytes, VmConfig};

    #[test]
    fn every_sample_produces_its_expected_output() {
        for s in all() {
            let out = run_bytes(s.source, s.input, &VmConfig::default())
                .unwrap_or_else(|e| panic!("{}: {e}", s.name));
            assert_eq!(out, s.expected, "sample {}", s.name);
        }
    }

    #[test]
    fn find_by_name() {
        assert_eq!(find("hello").map(|s| s.name), Some("hello"));
        assert_eq!(find("ECHO").map(|s| s.name), Some("echo"));
        assert!(find("missing").is_none());
    }
}
