use std::io::{self, Write};
use crate::RunError;

/// Pretty-print a [`RunError`] with caret positioning where it has one.
/// If `program` is `Some("bf")`, messages are prefixed with "bf: ...".
pub fn print_run_error(program: Option<&str>, code: &str, err: &RunError) {
    let msg = match program {
        Some(p) => format!("{p}: {err}"),
        None => err.to_string(),
    };

    match err.position() {
        Some(pos) => print_error_with_context(&msg, code, pos),
        None => {
            eprintln!("{msg}");
            let _ = io::stderr().flush();
        }
    }
}

/// Print a concise error with instruction index and a caret context window,
/// working with UTF-8 by slicing using char indices.
pub fn print_error_with_context(prefix: &str, code: &str, pos: usize) {
    eprintln!("{prefix}");

    // Show a short window around the position for context
    const WINDOW_CHARS: usize = 32;

    let total_chars = code.chars().count();
    let start_char = pos.saturating_sub(WINDOW_CHARS);
    let end_char = (pos + WINDOW_CHARS + 1).min(total_chars);

    // Newlines and tabs would break the caret alignment
    let slice: String = code
        .chars()
        .skip(start_char)
        .take(end_char.saturating_sub(start_char))
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect();

    eprintln!("  {}", slice);

    let caret_offset_chars = pos.saturating_sub(start_char);
    eprintln!("  {}^", " ".repeat(caret_offset_chars));
    let _ = io::stderr().flush();
}
