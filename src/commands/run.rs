use clap::Args;
use std::{fs, thread};
use std::io::{self, IsTerminal, Write};
use std::sync::{mpsc, Arc};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use crate::cli_util::print_run_error;
use crate::config;
use crate::io::{StdinInput, TerminalInput};
use crate::{Interpreter, RunError, RunReport, StepControl};

/// How long a timed-out run may take to notice cancellation and flush its output.
const CANCEL_GRACE: Duration = Duration::from_millis(500);

#[derive(Args, Debug)]
#[command(disable_help_flag = true)]
pub struct RunArgs {
    /// Print a step-by-step table of operations instead of executing
    #[arg(short = 'd', long = "debug")]
    pub debug: bool,

    /// Read Brainfuck code from PATH instead of positional "<code>"
    #[arg(short = 'f', long = "file")]
    pub file: Option<String>,

    /// Concatenated Brainfuck code parts
    #[arg(value_name = "code", trailing_var_arg = true)]
    pub code: Vec<String>,

    /// Initial number of tape cells
    #[arg(short = 'm', long = "memory", value_name = "CELLS")]
    pub memory: Option<usize>,

    /// Cell width in bits (1..=32)
    #[arg(short = 'b', long = "bits", value_name = "N")]
    pub bits: Option<u32>,

    /// Wrap cell values on overflow (false saturates)
    #[arg(long = "wrapping", value_name = "BOOL")]
    pub wrapping: Option<bool>,

    /// Grow the tape past its initial length (false pins the pointer to the last cell)
    #[arg(long = "dynamic-memory", value_name = "BOOL")]
    pub dynamic_memory: Option<bool>,

    /// Wall-clock timeout in milliseconds (fallback BF_TIMEOUT_MS; default none)
    #[arg(long = "timeout", value_name = "MS")]
    pub timeout_ms: Option<u64>,

    /// Maximum interpreter steps before abort (fallback BF_MAX_STEPS; default unlimited)
    #[arg(long = "max-steps", value_name = "N")]
    pub max_steps: Option<u64>,

    /// Show this help
    #[arg(short = 'h', long = "help", action = clap::ArgAction::SetTrue)]
    pub help: bool,
}

pub fn run(program: &str, args: RunArgs) -> i32 {
    if args.help {
        usage_and_exit(program, 0);
    }

    let RunArgs {
        debug,
        file,
        code,
        memory,
        bits,
        wrapping,
        dynamic_memory,
        timeout_ms,
        max_steps,
        ..
    } = args;

    if file.is_none() && code.is_empty() {
        usage_and_exit(program, 2);
    }

    if file.is_some() && !code.is_empty() {
        eprintln!("{program}: cannot use positional code together with --file");
        usage_and_exit(program, 2);
    }

    let code_str = if let Some(path) = file {
        match fs::read_to_string(&path) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("{program}: failed to read code file as UTF-8: {e}");
                let _ = io::stderr().flush();
                return 1;
            }
        }
    } else {
        code.join("")
    };

    // Resolve tape settings: flags -> config file -> defaults
    let mut vm_config = *config::defaults();
    if let Some(memory) = memory { vm_config.memory = memory; }
    if let Some(bits) = bits { vm_config.bits = bits; }
    if let Some(wrapping) = wrapping { vm_config.wrapping = wrapping; }
    if let Some(dynamic_memory) = dynamic_memory { vm_config.dynamic_memory = dynamic_memory; }

    let mut bf = match Interpreter::with_config(code_str.clone(), vm_config) {
        Ok(bf) => bf,
        Err(e) => {
            eprintln!("{program}: invalid configuration: {e}");
            let _ = io::stderr().flush();
            return 1;
        }
    };

    // Resolve limits: flags -> env -> defaults
    let timeout_ms = timeout_ms
        .or_else(|| std::env::var("BF_TIMEOUT_MS").ok().and_then(|s| s.parse::<u64>().ok()));
    let max_steps = max_steps
        .or_else(|| std::env::var("BF_MAX_STEPS").ok().and_then(|s| s.parse::<u64>().ok()));

    let cancel = Arc::new(AtomicBool::new(false));

    // First ctrl+c asks the run to stop; a second one exits even if the program is blocked on input
    let handler_flag = cancel.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        if handler_flag.swap(true, Ordering::Relaxed) {
            let _ = io::stdout().flush();
            let _ = io::stderr().flush();
            std::process::exit(130);
        }
    }) {
        eprintln!("{program}: failed to set ctrl+c handler: {e}");
        let _ = io::stderr().flush();
        return 1;
    }

    if io::stdin().is_terminal() {
        bf.set_input(TerminalInput::new(cancel.clone()));
    } else {
        bf.set_input(StdinInput);
    }

    // Execute on a worker thread with cooperative cancellation
    let (tx, rx) = mpsc::channel::<(Result<RunReport, RunError>, String)>();
    let cancel_clone = cancel.clone();

    thread::spawn(move || {
        let max_steps = max_steps.map(|n| usize::try_from(n).unwrap_or(usize::MAX));
        let ctrl = StepControl::new(max_steps, cancel_clone);
        let res = if debug {
            bf.run_debug_with_control(ctrl)
        } else {
            bf.run_with_control(ctrl)
        };
        let _ = tx.send((res, bf.output().to_string()));
    });

    let received = match timeout_ms {
        Some(ms) => rx.recv_timeout(Duration::from_millis(ms)),
        None => rx.recv().map_err(|_| mpsc::RecvTimeoutError::Disconnected),
    };

    let (exit_code, output) = match received {
        Ok((Ok(report), output)) => {
            tracing::debug!(steps = report.steps, faults = report.faults, "run completed");
            (0, output)
        }
        Ok((Err(err @ RunError::StepLimitExceeded { .. }), output)) => {
            eprintln!("{err}");
            (1, output)
        }
        Ok((Err(RunError::Canceled), output)) => {
            eprintln!("Execution aborted: interrupted");
            (1, output)
        }
        Ok((Err(other), output)) => {
            print_run_error(Some(program), &code_str, &other);
            (1, output)
        }
        Err(mpsc::RecvTimeoutError::Timeout) => {
            cancel.store(true, Ordering::Relaxed);
            // The worker may be parked in a raw-mode key read
            let _ = crossterm::terminal::disable_raw_mode();
            eprintln!(
                "Execution aborted: wall-clock timeout exceeded ({} ms)",
                timeout_ms.unwrap_or_default()
            );
            // Give the worker a moment to stop and flush what it printed; a blocked read keeps it parked
            match rx.recv_timeout(CANCEL_GRACE) {
                Ok((_, output)) => (1, output),
                Err(_) => (1, String::new()),
            }
        }
        Err(mpsc::RecvTimeoutError::Disconnected) => (1, String::new()),
    };
    let _ = io::stderr().flush();

    // For readability, ensure output ends with a newline
    if !output.is_empty() && !output.ends_with('\n') {
        println!();
    }
    let _ = io::stdout().flush();
    exit_code
}

fn usage_and_exit(program: &str, code: i32) -> ! {
    eprintln!(
        r#"Usage:
  {0} run [OPTIONS] "<code>"
  {0} run [OPTIONS] --file <PATH>

Options:
  --file,  -f <PATH>       Read Brainfuck code from PATH instead of positional "<code>"
  --memory, -m <CELLS>     Initial tape length (default 30000)
  --bits,   -b <N>         Cell width in bits, 1..=32 (default 8)
  --wrapping <BOOL>        Wrap on overflow; false saturates (default true)
  --dynamic-memory <BOOL>  Grow the tape on demand; false pins the pointer to the last cell (default true)
  --timeout <MS>           Abort after MS milliseconds (fallback BF_TIMEOUT_MS)
  --max-steps <N>          Abort after N instructions (fallback BF_MAX_STEPS)
  --debug, -d              Print a step-by-step table of operations instead of executing
  --help,  -h              Show this help

Notes:
- Characters outside of Brainfuck's ><+-.,[] are ignored and can be used as comments.
- Put `--` before code that starts with '-'.
- Input (`,`) reads one key from a terminal, or one byte from piped stdin; at end of input the cell is set to 0.
- Output (`.`) of cell value 10 prints a newline; 127 erases the last printed character.
- Defaults for the tape options can be set in the [vm] section of ~/.config/bf.toml (or the file named by BF_CONFIG).

Examples:
- Load Brainfuck code from a file:
    {0} run --file ./program.bf
- Saturating 16-bit cells on a fixed 100-cell tape:
    {0} run --bits 16 --wrapping false --memory 100 --dynamic-memory false --file ./program.bf
- Read bytes from a file as stdin (`,` will consume file input):
    {0} run ",[.,]" < input.txt
"#,
        program
    );
    let _ = io::stderr().flush();
    std::process::exit(code);
}
