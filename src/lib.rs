//! A configurable Brainfuck tape machine.
//!
//! Programs run on a tape of integer cells with a single data pointer. The tape is
//! parameterized by [`VmConfig`]:
//! - `memory`: initial number of cells (default 30,000).
//! - `bits`: cell width, so cells hold `0..=2^bits - 1` (default 8).
//! - `wrapping`: wrap around on overflow/underflow, or saturate (default wrap).
//! - `dynamic_memory`: grow the tape when the pointer runs off its end, or keep the
//!   pointer on the last cell (default grow).
//!
//! Behaviors:
//! - Moving left of cell 0 is a no-op.
//! - Characters outside `><+-.,[]` are ignored.
//! - `.` of value 10 emits a newline, of value 127 retracts the last character.
//! - `,` reads one byte from the input collaborator; at end of input the cell is set to 0.
//! - An unmatched `[` stops the run with [`RunError::UnmatchedOpen`]; an unmatched `]`
//!   is ignored.
//!
//! Quick start:
//!
//! ```no_run
//! use bf_tape::Interpreter;
//!
//! let code = "++++++++[>++++[>++>+++>+++>+<<<<-]>+>+>->>+[<]<-]>>.>---.+++++++..+++.>>.<-.<.+++.------.--------.>>+.>++.";
//! let mut bf = Interpreter::new(code);
//! let report = bf.run().expect("program should run");
//! assert_eq!(report.output, "Hello World!\n");
//! ```

pub mod cli_util;
pub mod commands;
pub mod config;
pub mod interpreter;
pub mod io;
pub mod tape;

pub use config::{ConfigError, VmConfig};
pub use interpreter::{Fault, Interpreter, RunError, RunReport, StepControl};
pub use io::{InputSource, OutputEvent, OutputSink};
pub use tape::{Cell, Tape};
