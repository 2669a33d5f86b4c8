//! Fixed-length byte tape with a bounds-checked cursor.

use crate::config::ConfigError;
use crate::error::{Edge, Fault};

pub const DEFAULT_TAPE_LEN: usize = 30_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tape {
    cells: Vec<u8>,
    cursor: usize,
}

impl Tape {
    /// Zeroed tape of `len` cells, cursor at 0.
    pub fn new(len: usize) -> Result<Self, ConfigError> {
        if len == 0 {
            return Err(ConfigError::ZeroTape);
        }
        Ok(Self {
            cells: vec![0; len],
            cursor: 0,
        })
    }

    pub fn move_right(&mut self) -> Result<(), Fault> {
        if self.cursor + 1 >= self.cells.len() {
            return Err(Fault::OutOfBounds(Edge::Right));
        }
        self.cursor += 1;
        Ok(())
    }

    pub fn move_left(&mut self) -> Result<(), Fault> {
        if self.cursor == 0 {
            return Err(Fault::OutOfBounds(Edge::Left));
        }
        self.cursor -= 1;
        Ok(())
    }

    pub fn increment(&mut self) {
        let cell = &mut self.cells[self.cursor];
        *cell = cell.wrapping_add(1);
    }

    pub fn decrement(&mut self) {
        let cell = &mut self.cells[self.cursor];
        *cell = cell.wrapping_sub(1);
    }

    pub fn read(&self) -> u8 {
        self.cells[self.cursor]
    }

    pub fn write(&mut self, byte: u8) {
        self.cells[self.cursor] = byte;
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cells(&self) -> &[u8] {
        &self.cells
    }
}

impl Default for Tape {
    fn default() -> Self {
        Self {
            cells: vec![0; DEFAULT_TAPE_LEN],
            cursor: 0,
        }
    }
}
