//! Input and output collaborators for `,` and `.`.
//!
//! The interpreter only needs to read one byte and to report changes to its output
//! accumulator. Where those bytes come from or go to is decided by the host.

use std::io::{self, IsTerminal, Read, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::style::Print;
use crossterm::{cursor, queue, terminal};

/// A blocking source of input bytes. `Ok(None)` signals end of input.
pub trait InputSource {
    fn read_byte(&mut self) -> io::Result<Option<u8>>;
}

/// One change to the output accumulator, produced by a single `.`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputEvent {
    Append(char),
    Newline,
    /// Cell value 127: the last character was removed, if there was one.
    Retract(Option<char>),
}

pub trait OutputSink {
    /// Called once per `.` with the change and the full accumulator after it.
    fn emit(&mut self, event: OutputEvent, rendered: &str) -> io::Result<()>;

    /// Called once when the run stops, whether it completed or halted.
    fn finish(&mut self, _rendered: &str) -> io::Result<()> {
        Ok(())
    }
}

/// Reads exactly one byte from stdin per request.
#[derive(Debug, Default)]
pub struct StdinInput;

impl InputSource for StdinInput {
    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        let mut buf = [0u8; 1];
        match io::stdin().read(&mut buf)? {
            0 => Ok(None),
            _ => Ok(Some(buf[0])),
        }
    }
}

/// Single keypress capture from an interactive terminal, without echo.
///
/// Raw mode is only held while waiting for a key. Ctrl+D ends input; Ctrl+C ends
/// input and raises the cancel flag, since raw mode swallows SIGINT.
#[derive(Debug, Default)]
pub struct TerminalInput {
    cancel_flag: Option<Arc<AtomicBool>>,
}

impl TerminalInput {
    pub fn new(cancel_flag: Arc<AtomicBool>) -> Self {
        Self { cancel_flag: Some(cancel_flag) }
    }

    fn next_key(&self) -> io::Result<Option<u8>> {
        loop {
            let Event::Key(KeyEvent { code, modifiers, kind, .. }) = event::read()? else {
                continue;
            };
            if kind != KeyEventKind::Press {
                continue;
            }
            let ctrl = modifiers.contains(KeyModifiers::CONTROL);
            let byte = match code {
                KeyCode::Char('d') if ctrl => return Ok(None),
                KeyCode::Char('c') if ctrl => {
                    if let Some(flag) = self.cancel_flag.as_ref() {
                        flag.store(true, Ordering::Relaxed);
                    }
                    return Ok(None);
                }
                KeyCode::Char(ch) => match u8::try_from(u32::from(ch)) {
                    Ok(b) => b,
                    Err(_) => continue,
                },
                KeyCode::Enter => b'\n',
                KeyCode::Tab => b'\t',
                KeyCode::Backspace => 127,
                KeyCode::Esc => 27,
                _ => continue,
            };
            return Ok(Some(byte));
        }
    }
}

impl InputSource for TerminalInput {
    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        terminal::enable_raw_mode()?;
        let result = self.next_key();
        terminal::disable_raw_mode()?;
        result
    }
}

/// Writes program output to stdout.
///
/// On a terminal every event is shown immediately and a retraction erases the
/// last glyph. When stdout is redirected, already-written bytes cannot be taken
/// back, so the final rendering is written once when the run stops.
#[derive(Debug)]
pub struct StdoutSink {
    live: bool,
}

impl StdoutSink {
    pub fn detect() -> Self {
        Self { live: io::stdout().is_terminal() }
    }
}

impl OutputSink for StdoutSink {
    fn emit(&mut self, event: OutputEvent, rendered: &str) -> io::Result<()> {
        if !self.live {
            return Ok(());
        }
        let mut out = io::stdout().lock();
        match event {
            OutputEvent::Append(ch) => write!(out, "{ch}")?,
            OutputEvent::Newline => writeln!(out)?,
            OutputEvent::Retract(Some(retracted)) => write_retract(&mut out, retracted, rendered)?,
            OutputEvent::Retract(None) => {}
        }
        out.flush()
    }

    fn finish(&mut self, rendered: &str) -> io::Result<()> {
        let mut out = io::stdout().lock();
        if !self.live {
            out.write_all(rendered.as_bytes())?;
        }
        out.flush()
    }
}

/// Erase `retracted` from a live terminal. A backspace cannot cross a line break,
/// so retracting a newline moves up one line and redraws the line now ending
/// `rendered`.
fn write_retract<W: Write>(out: &mut W, retracted: char, rendered: &str) -> io::Result<()> {
    if retracted == '\n' {
        let last_line = rendered.rsplit('\n').next().unwrap_or_default();
        queue!(out, cursor::MoveToPreviousLine(1), Print(last_line))?;
        Ok(())
    } else {
        out.write_all(b"\x08 \x08")
    }
}

/// Adapts a closure into an [`InputSource`].
pub(crate) struct FnInput<F>(pub(crate) F);

impl<F> InputSource for FnInput<F>
where
    F: FnMut() -> Option<u8>,
{
    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        Ok((self.0)())
    }
}

/// Adapts a closure into an [`OutputSink`].
pub(crate) struct FnOutput<F>(pub(crate) F);

impl<F> OutputSink for FnOutput<F>
where
    F: FnMut(OutputEvent, &str),
{
    fn emit(&mut self, event: OutputEvent, rendered: &str) -> io::Result<()> {
        (self.0)(event, rendered);
        Ok(())
    }
}
