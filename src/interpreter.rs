//! The instruction dispatcher and loop control.
//!
//! Execution walks an instruction cursor over the program text:
//! - `><+-` act on the [`Tape`], `.` and `,` go through the I/O collaborators.
//! - `[` skips to its partner `]` when the current cell is zero, `]` jumps back
//!   into the body while the cell is nonzero.
//! - Every other character is ignored, which is how comments are written.
//!
//! A fault inside a single instruction (an unprintable cell value, a failed read or
//! write) is logged and counted, and the cursor moves on. The only condition that
//! stops a run early is an unmatched `[`; step limits and cancellation are opt-in.

use std::fmt::Write as _;
use std::io;
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use crate::config::{ConfigError, VmConfig};
use crate::io::{FnInput, FnOutput, InputSource, OutputEvent, OutputSink, StdinInput, StdoutSink};
use crate::tape::{Cell, Tape};

/// Cell value that retracts the last emitted character instead of printing.
const RETRACT: Cell = 127;
const NEWLINE: Cell = 10;

/// Conditions that end a run before the cursor passes the end of the program.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    /// A `[` has no partner. `position` is the bracket, `scanned_to` is where the
    /// search for its `]` ran off the program.
    #[error("Syntax error: unmatched '[' at position {position} (scan reached end of program at {scanned_to})")]
    UnmatchedOpen { position: usize, scanned_to: usize },

    /// Execution aborted due to step limit.
    #[error("Execution aborted: step limit exceeded ({limit})")]
    StepLimitExceeded { limit: usize },

    /// Execution aborted due to cooperative cancellation (e.g., timeout)
    #[error("Execution aborted: cancelled")]
    Canceled,
}

impl RunError {
    /// Program position the error refers to, if any.
    pub fn position(&self) -> Option<usize> {
        match self {
            RunError::UnmatchedOpen { position, .. } => Some(*position),
            _ => None,
        }
    }
}

/// A recoverable failure of a single instruction.
#[derive(Debug, thiserror::Error)]
pub enum Fault {
    #[error("cell value {value} has no character representation")]
    Unrepresentable { value: Cell },

    #[error("input failed: {0}")]
    Input(#[source] io::Error),

    #[error("output failed: {0}")]
    Output(#[source] io::Error),
}

/// Summary of a completed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub output: String,
    pub steps: usize,
    pub faults: usize,
}

/// Controls for cooperative cancellation and step limiting.
#[derive(Clone)]
pub struct StepControl {
    pub max_steps: Option<usize>,
    pub cancel_flag: Arc<AtomicBool>,
}

impl StepControl {
    pub fn new(max_steps: Option<usize>, cancel_flag: Arc<AtomicBool>) -> Self {
        Self { max_steps, cancel_flag }
    }

    fn check(&self, step: usize) -> Result<(), RunError> {
        if self.cancel_flag.load(Ordering::Relaxed) {
            return Err(RunError::Canceled);
        }
        match self.max_steps {
            Some(limit) if step >= limit => Err(RunError::StepLimitExceeded { limit }),
            _ => Ok(()),
        }
    }
}

/// Pair every bracket with its partner. Unmatched brackets map to `None`.
pub fn match_brackets(program: &[char]) -> Vec<Option<usize>> {
    let mut jumps = vec![None; program.len()];
    let mut open: Vec<usize> = Vec::new();
    for (i, &c) in program.iter().enumerate() {
        match c {
            '[' => open.push(i),
            ']' => {
                if let Some(start) = open.pop() {
                    jumps[start] = Some(i);
                    jumps[i] = Some(start);
                }
            }
            _ => {}
        }
    }
    jumps
}

/// A Brainfuck tape machine.
///
/// The interpreter owns:
/// - the program text, read-only for the whole run,
/// - a [`Tape`] configured by [`VmConfig`],
/// - the output accumulator built by `.`,
/// - the input and output collaborators (stdin and stdout unless replaced).
pub struct Interpreter {
    program: Vec<char>,
    tape: Tape,
    output: String,
    input: Box<dyn InputSource + Send>,
    sink: Box<dyn OutputSink + Send>,
    faults: usize,
}

impl Interpreter {
    /// Create an interpreter for `code` with the built-in defaults
    /// (30,000 wrapping 8-bit cells on a growable tape).
    pub fn new(code: impl Into<String>) -> Self {
        let config = VmConfig::default();
        Self::build(code.into(), &config)
    }

    /// Create an interpreter with a custom tape configuration.
    pub fn with_config(code: impl Into<String>, config: VmConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(code.into(), &config))
    }

    fn build(code: String, config: &VmConfig) -> Self {
        Self {
            program: code.chars().collect(),
            tape: Tape::new(config),
            output: String::new(),
            input: Box::new(StdinInput),
            sink: Box::new(StdoutSink::detect()),
            faults: 0,
        }
    }

    /// Replace the input collaborator used by `,`.
    pub fn set_input(&mut self, input: impl InputSource + Send + 'static) {
        self.input = Box::new(input);
    }

    /// Replace the output collaborator used by `.`.
    pub fn set_output(&mut self, sink: impl OutputSink + Send + 'static) {
        self.sink = Box::new(sink);
    }

    /// Provide an input provider. Returning None indicates end of input (cell is set to 0).
    pub fn set_input_provider<F>(&mut self, provider: F)
    where
        F: FnMut() -> Option<u8> + Send + 'static,
    {
        self.set_input(FnInput(provider));
    }

    /// Provide an output sink closure, called with each output event and the
    /// accumulator after it.
    pub fn set_output_sink<F>(&mut self, sink: F)
    where
        F: FnMut(OutputEvent, &str) + Send + 'static,
    {
        self.set_output(FnOutput(sink));
    }

    pub fn tape(&self) -> &Tape {
        &self.tape
    }

    /// Everything emitted so far, including by a run that halted.
    pub fn output(&self) -> &str {
        &self.output
    }

    /// Execute the program until the cursor passes its end.
    pub fn run(&mut self) -> Result<RunReport, RunError> {
        self.execute(false, None)
    }

    /// Debug-run the program, printing a step-by-step table of operations
    /// instead of producing I/O side effects. Tape state advances exactly as
    /// it would during a real run, but:
    /// - '.' updates the accumulator without reaching the output sink
    /// - ',' does not read input; it simulates end of input and sets the cell to 0
    pub fn run_debug(&mut self) -> Result<RunReport, RunError> {
        self.execute(true, None)
    }

    /// Execute with cooperative cancellation and optional step limit.
    pub fn run_with_control(&mut self, step_control: StepControl) -> Result<RunReport, RunError> {
        self.execute(false, Some(&step_control))
    }

    /// Debug-run with cooperative cancellation and optional step limit.
    pub fn run_debug_with_control(&mut self, step_control: StepControl) -> Result<RunReport, RunError> {
        self.execute(true, Some(&step_control))
    }

    fn execute(&mut self, debug: bool, step_control: Option<&StepControl>) -> Result<RunReport, RunError> {
        let result = self.walk(debug, step_control);
        if !debug {
            if let Err(e) = self.sink.finish(&self.output) {
                tracing::warn!(error = %e, "failed to flush program output");
            }
        }
        result
    }

    fn walk(&mut self, debug: bool, step_control: Option<&StepControl>) -> Result<RunReport, RunError> {
        let code_len = self.program.len();
        let jumps = match_brackets(&self.program);
        // First unmatched '[' entered with a nonzero cell. Its body runs to the end
        // of the program, where the run fails.
        let mut open_without_close: Option<usize> = None;
        let mut code_ptr = 0;
        let mut step: usize = 0;

        if debug {
            println!("STEP | IP  | PTR | CELL | INSTR | ACTION");
            println!("-----+-----+-----+------+-------+------------------------------------------------");
        }

        while code_ptr < code_len {
            if let Some(ctrl) = step_control {
                ctrl.check(step)?;
            }

            let instr = self.program[code_ptr];
            let (ptr_before, cell_before) = (self.tape.pointer(), self.tape.read());
            let mut action: Option<String> = if debug { Some(String::new()) } else { None };

            let next = match instr {
                '[' | ']' => {
                    self.loop_control(code_ptr, instr, &jumps, &mut open_without_close, action.as_mut())?
                }
                _ => {
                    if let Err(fault) = self.dispatch(instr, debug, action.as_mut()) {
                        self.faults += 1;
                        tracing::warn!(ip = code_ptr, op = %instr, %fault, "instruction fault; skipping");
                        if let Some(a) = action.as_mut() { *a = format!("Fault: {fault}"); }
                    }
                    code_ptr + 1
                }
            };

            if let Some(action) = action {
                println!(
                    "{:<4} | {:<3} | {:<3} | {:<4} |  {}    | {}",
                    step,
                    code_ptr,
                    ptr_before,
                    cell_before,
                    printable(instr),
                    action
                );
            }

            step += 1;
            code_ptr = next;
        }

        if let Some(position) = open_without_close {
            return Err(RunError::UnmatchedOpen { position, scanned_to: code_len });
        }

        Ok(RunReport {
            output: self.output.clone(),
            steps: step,
            faults: self.faults,
        })
    }

    /// Apply one non-bracket instruction.
    fn dispatch(&mut self, instr: char, debug: bool, action: Option<&mut String>) -> Result<(), Fault> {
        match instr {
            '>' => {
                self.tape.move_right();
                if let Some(a) = action { *a = format!("Moved pointer head to index {}", self.tape.pointer()); }
            }
            '<' => {
                self.tape.move_left();
                if let Some(a) = action { *a = format!("Moved pointer head to index {}", self.tape.pointer()); }
            }
            '+' => {
                let before = self.tape.read();
                self.tape.increment();
                if let Some(a) = action { *a = format!("Increment cell[{}] from {} to {}", self.tape.pointer(), before, self.tape.read()); }
            }
            '-' => {
                let before = self.tape.read();
                self.tape.decrement();
                if let Some(a) = action { *a = format!("Decrement cell[{}] from {} to {}", self.tape.pointer(), before, self.tape.read()); }
            }
            '.' => {
                let event = self.render(self.tape.read())?;
                if let Some(a) = action {
                    *a = match event {
                        OutputEvent::Append(ch) => format!("Output {:?} (suppressed in debug)", ch),
                        OutputEvent::Newline => "Output newline (suppressed in debug)".to_string(),
                        OutputEvent::Retract(_) => "Retract last output character (suppressed in debug)".to_string(),
                    };
                }
                if !debug {
                    self.sink.emit(event, &self.output).map_err(Fault::Output)?;
                }
            }
            ',' => {
                if debug {
                    self.tape.write(0); // simulate end of input
                    if let Some(a) = action { *a = "Read byte -> simulated end of input (set cell to 0)".to_string(); }
                } else {
                    let value = match self.input.read_byte().map_err(Fault::Input)? {
                        Some(b) => self.tape.fit(u64::from(b)),
                        None => 0,
                    };
                    self.tape.write(value);
                    if let Some(a) = action { *a = format!("Read byte -> {value}"); }
                }
            }
            _ => {
                if let Some(a) = action { *a = "Ignored".to_string(); }
            }
        }
        Ok(())
    }

    /// Update the accumulator for a `.` of `value`.
    fn render(&mut self, value: Cell) -> Result<OutputEvent, Fault> {
        let event = match value {
            RETRACT => OutputEvent::Retract(self.output.pop()),
            NEWLINE => {
                self.output.push('\n');
                OutputEvent::Newline
            }
            _ => {
                let ch = char::from_u32(value).ok_or(Fault::Unrepresentable { value })?;
                self.output.push(ch);
                OutputEvent::Append(ch)
            }
        };
        Ok(event)
    }

    /// Decide where the cursor goes after a bracket at `code_ptr`.
    fn loop_control(
        &self,
        code_ptr: usize,
        instr: char,
        jumps: &[Option<usize>],
        open_without_close: &mut Option<usize>,
        action: Option<&mut String>,
    ) -> Result<usize, RunError> {
        let cell = self.tape.read();
        let mut note = String::new();

        let next = match (instr, jumps[code_ptr]) {
            ('[', Some(close)) if cell == 0 => {
                let _ = write!(note, "Cell is 0; jump forward past matching ']' at IP {close}");
                close + 1
            }
            ('[', Some(_)) => {
                note.push_str("Enter loop (cell != 0)");
                code_ptr + 1
            }
            ('[', None) if cell == 0 => {
                return Err(RunError::UnmatchedOpen {
                    position: code_ptr,
                    scanned_to: self.program.len(),
                });
            }
            ('[', None) => {
                open_without_close.get_or_insert(code_ptr);
                note.push_str("Enter loop with no matching ']' (cell != 0)");
                code_ptr + 1
            }
            (_, Some(open)) if cell != 0 => {
                let _ = write!(note, "Cell != 0; jump back into loop opened at IP {open}");
                open + 1
            }
            (_, Some(_)) => {
                note.push_str("Exit loop (cell is 0)");
                code_ptr + 1
            }
            (_, None) => {
                tracing::debug!(ip = code_ptr, "ignoring unmatched ']'");
                note.push_str("Unmatched ']' ignored");
                code_ptr + 1
            }
        };

        if let Some(a) = action { *a = note; }
        Ok(next)
    }
}

fn printable(instr: char) -> char {
    if instr.is_control() { ' ' } else { instr }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    const HELLO_WORLD: &str = "++++++++[>++++[>++>+++>+++>+<<<<-]>+>+>->>+[<]<-]>>.>---.+++++++..+++.>>.<-.<.+++.------.--------.>>+.>++.";

    /// Interpreter with no stdin/stdout attached: input is `input`, output events
    /// are collected into the returned log.
    fn harness(code: &str, config: VmConfig, input: &[u8]) -> (Interpreter, Arc<Mutex<Vec<OutputEvent>>>) {
        let mut bf = Interpreter::with_config(code, config).unwrap();
        let mut pending: VecDeque<u8> = input.iter().copied().collect();
        bf.set_input_provider(move || pending.pop_front());
        let events = Arc::new(Mutex::new(Vec::new()));
        let log = events.clone();
        bf.set_output_sink(move |event, _| log.lock().unwrap().push(event));
        (bf, events)
    }

    fn run(code: &str) -> Result<RunReport, RunError> {
        harness(code, VmConfig::default(), &[]).0.run()
    }

    #[test]
    fn hello_world() {
        let report = run(HELLO_WORLD).unwrap();
        assert_eq!(report.output, "Hello World!\n");
        assert_eq!(report.faults, 0);
    }

    #[test]
    fn output_is_a_character_not_a_number() {
        assert_eq!(run("++.").unwrap().output, "\u{2}");
    }

    #[test]
    fn non_instruction_characters_are_comments() {
        let report = run("add two: + + \n then print it. %print(1)% ").unwrap();
        assert_eq!(report.output, "\u{2}");
    }

    #[test]
    fn value_ten_appends_newline() {
        let (mut bf, events) = harness("++++++++++.", VmConfig::default(), &[]);
        assert_eq!(bf.run().unwrap().output, "\n");
        assert_eq!(*events.lock().unwrap(), vec![OutputEvent::Newline]);
    }

    #[test]
    fn value_127_retracts_last_character() {
        // 'A' then 'B', then 127 removes the 'B'
        let code = format!("{}.+.>{}.", "+".repeat(65), "+".repeat(127));
        let (mut bf, events) = harness(&code, VmConfig::default(), &[]);
        assert_eq!(bf.run().unwrap().output, "A");
        assert_eq!(
            *events.lock().unwrap(),
            vec![OutputEvent::Append('A'), OutputEvent::Append('B'), OutputEvent::Retract(Some('B'))]
        );
    }

    #[test]
    fn retract_on_empty_output_is_harmless() {
        let report = run(&format!("{}.", "-".repeat(129))).unwrap();
        assert_eq!(report.output, "");
        assert_eq!(report.faults, 0);
    }

    #[test]
    fn sink_sees_full_rendering_after_each_event() {
        let mut bf = Interpreter::new(format!("{}.+.", "+".repeat(49)));
        bf.set_input_provider(|| None);
        let renders = Arc::new(Mutex::new(Vec::new()));
        let log = renders.clone();
        bf.set_output_sink(move |_, rendered| log.lock().unwrap().push(rendered.to_string()));
        bf.run().unwrap();
        assert_eq!(*renders.lock().unwrap(), vec!["1".to_string(), "12".to_string()]);
    }

    #[test]
    fn zero_cell_skips_loop_body() {
        let (mut bf, _) = harness("[>+<-]>+", VmConfig::default(), &[]);
        let report = bf.run().unwrap();
        assert_eq!(bf.tape().cells()[..2], [0, 1]);
        assert_eq!(report.steps, 3);
    }

    #[test]
    fn zero_cell_skip_respects_nesting() {
        // A naive scan would stop at the inner ']' and run the trailing '+'
        let (mut bf, _) = harness("[[]+]", VmConfig::default(), &[]);
        bf.run().unwrap();
        assert_eq!(bf.tape().read(), 0);
    }

    #[test]
    fn simple_loop_moves_value() {
        let (mut bf, _) = harness("+++[>+<-]", VmConfig::default(), &[]);
        bf.run().unwrap();
        assert_eq!(bf.tape().cells()[..2], [0, 3]);
    }

    #[test]
    fn nested_loops_multiply() {
        // 3 * 4 into cell 2, counters cleared
        let (mut bf, _) = harness("+++[>++++[>+<-]<-]", VmConfig::default(), &[]);
        bf.run().unwrap();
        assert_eq!(bf.tape().cells()[..3], [0, 0, 12]);
    }

    #[test]
    fn empty_loop_on_zero_cell_is_ok() {
        assert!(run("[]").is_ok());
    }

    #[test]
    fn unmatched_open_bracket_halts_with_position() {
        let err = run("[+").unwrap_err();
        assert!(matches!(err, RunError::UnmatchedOpen { position: 0, scanned_to: 2 }));
        assert_eq!(err.position(), Some(0));
    }

    #[test]
    fn unmatched_open_keeps_earlier_output_only() {
        let code = format!("{}.>[+.", "+".repeat(49));
        let (mut bf, events) = harness(&code, VmConfig::default(), &[]);
        let err = bf.run().unwrap_err();
        assert!(matches!(err, RunError::UnmatchedOpen { position: 51, .. }));
        assert_eq!(bf.output(), "1");
        assert_eq!(events.lock().unwrap().len(), 1);
        assert_eq!(bf.tape().read(), 0);
    }

    #[test]
    fn unmatched_open_with_nonzero_cell_runs_body_then_fails() {
        let (mut bf, _) = harness("+[>+", VmConfig::default(), &[]);
        let err = bf.run().unwrap_err();
        assert!(matches!(err, RunError::UnmatchedOpen { position: 1, scanned_to: 4 }));
        assert_eq!(bf.tape().cells()[..2], [1, 1]);
    }

    #[test]
    fn inner_unmatched_open_is_found_behind_matched_pair() {
        let err = run("[[]").unwrap_err();
        assert_eq!(err.position(), Some(0));
    }

    #[test]
    fn unmatched_close_bracket_is_ignored() {
        let (mut bf, _) = harness("+]+", VmConfig::default(), &[]);
        bf.run().unwrap();
        assert_eq!(bf.tape().read(), 2);
    }

    #[test]
    fn wrapping_subtraction() {
        let (mut bf, _) = harness("-", VmConfig::default(), &[]);
        bf.run().unwrap();
        assert_eq!(bf.tape().read(), 255);
    }

    #[test]
    fn wrapping_addition() {
        let (mut bf, _) = harness(&"+".repeat(256), VmConfig::default(), &[]);
        bf.run().unwrap();
        assert_eq!(bf.tape().read(), 0);
    }

    #[test]
    fn saturating_dialect_clamps() {
        let config = VmConfig { wrapping: false, ..VmConfig::default() };
        let (mut bf, _) = harness(&format!("-{}", "+".repeat(300)), config, &[]);
        bf.run().unwrap();
        assert_eq!(bf.tape().read(), 255);
    }

    #[test]
    fn fixed_tape_never_grows() {
        let config = VmConfig { memory: 3, dynamic_memory: false, ..VmConfig::default() };
        let (mut bf, _) = harness(">>>>>+", config, &[]);
        bf.run().unwrap();
        assert_eq!(bf.tape().cells(), &[0, 0, 1]);
    }

    #[test]
    fn leading_left_moves_stay_at_zero() {
        let (mut bf, _) = harness("<<<+", VmConfig::default(), &[]);
        bf.run().unwrap();
        assert_eq!(bf.tape().pointer(), 0);
        assert_eq!(bf.tape().read(), 1);
    }

    #[test]
    fn dynamic_tape_grows_past_initial_length() {
        let config = VmConfig { memory: 2, ..VmConfig::default() };
        let (mut bf, _) = harness("+>+>+>+", config, &[]);
        bf.run().unwrap();
        assert_eq!(bf.tape().cells(), &[1, 1, 1, 1]);
    }

    #[test]
    fn reads_input_and_echoes() {
        let (mut bf, _) = harness(",.", VmConfig::default(), b"Z");
        assert_eq!(bf.run().unwrap().output, "Z");
    }

    #[test]
    fn end_of_input_sets_cell_to_zero() {
        let (mut bf, _) = harness("+++,", VmConfig::default(), &[]);
        bf.run().unwrap();
        assert_eq!(bf.tape().read(), 0);
    }

    #[test]
    fn cat_program_stops_at_end_of_input() {
        let (mut bf, _) = harness(",[.,]", VmConfig::default(), b"echo");
        assert_eq!(bf.run().unwrap().output, "echo");
    }

    #[test]
    fn narrow_cells_map_input_bytes() {
        let narrow = VmConfig { bits: 4, ..VmConfig::default() };
        let (mut bf, _) = harness(",", narrow, b"Z");
        bf.run().unwrap();
        assert_eq!(bf.tape().read(), 90 & 15);

        let saturating = VmConfig { bits: 4, wrapping: false, ..VmConfig::default() };
        let (mut bf, _) = harness(",", saturating, b"Z");
        bf.run().unwrap();
        assert_eq!(bf.tape().read(), 15);
    }

    #[test]
    fn unrepresentable_output_is_skipped_and_counted() {
        let wide = VmConfig { bits: 32, ..VmConfig::default() };
        let code = format!("-.{}.", "+".repeat(49));
        let (mut bf, events) = harness(&code, wide, &[]);
        let report = bf.run().unwrap();
        assert_eq!(report.faults, 1);
        assert_eq!(report.output, "0");
        assert_eq!(events.lock().unwrap().len(), 1);
    }

    #[test]
    fn failing_input_is_skipped() {
        struct Broken;
        impl InputSource for Broken {
            fn read_byte(&mut self) -> io::Result<Option<u8>> {
                Err(io::Error::other("device gone"))
            }
        }
        let (mut bf, _) = harness("++,+", VmConfig::default(), &[]);
        bf.set_input(Broken);
        let report = bf.run().unwrap();
        assert_eq!(report.faults, 1);
        assert_eq!(bf.tape().read(), 3);
    }

    #[test]
    fn wide_cells_print_unicode() {
        let wide = VmConfig { bits: 16, ..VmConfig::default() };
        // 0x263A, built as 38 * 256 + 58
        let code = format!("{}[>{}<-]>{}.", "+".repeat(38), "+".repeat(256), "+".repeat(58));
        let (mut bf, _) = harness(&code, wide, &[]);
        assert_eq!(bf.run().unwrap().output, "\u{263A}");
    }

    #[test]
    fn invalid_config_is_rejected() {
        let bad = VmConfig { bits: 0, ..VmConfig::default() };
        assert!(matches!(Interpreter::with_config("+", bad), Err(ConfigError::InvalidBits { bits: 0 })));
    }

    #[test]
    fn step_limit_aborts_infinite_loop() {
        let (mut bf, _) = harness("+[]", VmConfig::default(), &[]);
        let ctrl = StepControl::new(Some(50), Arc::new(AtomicBool::new(false)));
        let err = bf.run_with_control(ctrl).unwrap_err();
        assert!(matches!(err, RunError::StepLimitExceeded { limit: 50 }));
        assert_eq!(err.to_string(), "Execution aborted: step limit exceeded (50)");
    }

    #[test]
    fn cancel_flag_aborts_before_next_step() {
        let (mut bf, _) = harness("+++", VmConfig::default(), &[]);
        let ctrl = StepControl::new(None, Arc::new(AtomicBool::new(true)));
        assert!(matches!(bf.run_with_control(ctrl), Err(RunError::Canceled)));
        assert_eq!(bf.tape().read(), 0);
    }

    #[test]
    fn debug_run_suppresses_io_but_advances_state() {
        let (mut bf, events) = harness("++.,+", VmConfig::default(), b"Z");
        let report = bf.run_debug().unwrap();
        assert!(events.lock().unwrap().is_empty());
        assert_eq!(report.output, "\u{2}");
        assert_eq!(bf.tape().read(), 1);
    }

    #[test]
    fn bracket_map_pairs_nested_and_leaves_strays() {
        let program: Vec<char> = "][[]".chars().collect();
        assert_eq!(match_brackets(&program), vec![None, None, Some(3), Some(2)]);
    }
}
