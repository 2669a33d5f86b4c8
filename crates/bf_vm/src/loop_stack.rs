use crate::error::Fault;

pub const DEFAULT_MAX_DEPTH: usize = 100;

/// Bounded stack of `[` positions for the loops currently open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoopStack {
    slots: Vec<usize>,
    capacity: usize,
}

impl LoopStack {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, pc: usize) -> Result<(), Fault> {
        if self.slots.len() == self.capacity {
            return Err(Fault::LoopStackOverflow(self.capacity));
        }
        self.slots.push(pc);
        Ok(())
    }

    pub fn pop(&mut self) -> Result<usize, Fault> {
        self.slots.pop().ok_or(Fault::LoopStackUnderflow)
    }

    pub fn top(&self) -> Result<usize, Fault> {
        self.slots.last().copied().ok_or(Fault::LoopStackUnderflow)
    }

    pub fn depth(&self) -> usize {
        self.slots.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl Default for LoopStack {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_MAX_DEPTH)
    }
}
