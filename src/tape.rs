//! The memory tape: a row of bounded-width cells and a single data pointer.
//!
//! Two policies decide what happens at the edges:
//! - `wrapping`: arithmetic past `0` or `max_value` wraps to the opposite bound,
//!   otherwise it saturates.
//! - `dynamic_memory`: moving right past the last cell appends a zero cell,
//!   otherwise the pointer stays on the last cell.
//!
//! No tape operation fails. Moving left from cell 0 is a no-op.

use crate::config::VmConfig;

/// Storage type for a single cell.
pub type Cell = u32;

/// Widest cell the tape supports.
pub const MAX_BITS: u32 = Cell::BITS;

#[derive(Debug, Clone)]
pub struct Tape {
    cells: Vec<Cell>,
    pointer: usize,
    max_value: Cell,
    wrapping: bool,
    dynamic_memory: bool,
}

impl Tape {
    /// Build a zeroed tape. `config` is expected to be validated; a zero length
    /// is bumped to a single cell so the pointer always has a cell under it.
    pub fn new(config: &VmConfig) -> Self {
        Self {
            cells: vec![0; config.memory.max(1)],
            pointer: 0,
            max_value: config.max_value(),
            wrapping: config.wrapping,
            dynamic_memory: config.dynamic_memory,
        }
    }

    pub fn move_right(&mut self) {
        if self.pointer + 1 < self.cells.len() {
            self.pointer += 1;
        } else if self.dynamic_memory {
            self.cells.push(0);
            self.pointer += 1;
        }
    }

    pub fn move_left(&mut self) {
        self.pointer = self.pointer.saturating_sub(1);
    }

    pub fn increment(&mut self) {
        let cell = &mut self.cells[self.pointer];
        *cell = if *cell < self.max_value {
            *cell + 1
        } else if self.wrapping {
            0
        } else {
            self.max_value
        };
    }

    pub fn decrement(&mut self) {
        let cell = &mut self.cells[self.pointer];
        *cell = if *cell > 0 {
            *cell - 1
        } else if self.wrapping {
            self.max_value
        } else {
            0
        };
    }

    pub fn read(&self) -> Cell {
        self.cells[self.pointer]
    }

    /// Store `value` in the current cell. Callers map out-of-range values first
    /// (see [`Tape::fit`]).
    pub fn write(&mut self, value: Cell) {
        debug_assert!(value <= self.max_value, "cell value {value} exceeds {}", self.max_value);
        self.cells[self.pointer] = value.min(self.max_value);
    }

    /// Bring an arbitrary value into cell range using the tape's overflow policy:
    /// masked to the cell width when wrapping, clamped to `max_value` otherwise.
    pub fn fit(&self, raw: u64) -> Cell {
        let max = u64::from(self.max_value);
        let fitted = if raw <= max {
            raw
        } else if self.wrapping {
            raw & max
        } else {
            max
        };
        fitted as Cell
    }

    pub fn pointer(&self) -> usize {
        self.pointer
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn max_value(&self) -> Cell {
        self.max_value
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }
}
