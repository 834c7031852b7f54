//! Timestamped log lines with source locations and optional ANSI colour.
//!
//! Provides the [`tlog!`] macro for consistent log output in the format:
//!
//! ```text
//! 20260211T21:33:12.000 - src/journal.rs:42 - journal: saved e-3 happy (7/10)
//! ```
//!
//! When writing to a terminal, timestamps and source locations are dimmed
//! and moods get their own stable colour.
//!
//! By default log lines go to stderr.  Call [`set_writer`] to redirect output
//! to any [`std::io::Write`] implementor (file, in-memory buffer, etc.).
//! Installing a custom writer also disables ANSI colour codes.

use std::io::{self, IsTerminal, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{LazyLock, Mutex};

use crate::catalog::MoodKind;

static COLOUR_ENABLED: AtomicBool = AtomicBool::new(false);

static LOG_WRITER: LazyLock<Mutex<Box<dyn Write + Send>>> =
    LazyLock::new(|| Mutex::new(Box::new(io::stderr())));

/// Initialize the logging system. Call once at startup before any logging.
/// Detects whether stderr supports ANSI colours.
pub fn init() {
    let is_terminal = std::io::stderr().is_terminal();
    COLOUR_ENABLED.store(is_terminal, Ordering::Relaxed);
}

/// Replace the log writer.  All subsequent [`tlog!`] output goes to `w`.
/// Also disables ANSI colour codes.
pub fn set_writer(w: Box<dyn Write + Send>) {
    COLOUR_ENABLED.store(false, Ordering::Relaxed);
    let mut writer = LOG_WRITER.lock().unwrap_or_else(|e| e.into_inner());
    *writer = w;
}

pub fn colour_enabled() -> bool {
    COLOUR_ENABLED.load(Ordering::Relaxed)
}

// ANSI escape codes
const RESET: &str = "\x1b[0m";
const DIM: &str = "\x1b[2m";
const ENTRY_ID_COLOUR: &str = "\x1b[93m"; // bright yellow

/// One colour per mood, in catalog order.
const MOOD_COLOURS: [&str; 9] = [
    "\x1b[92m", // happy: bright green
    "\x1b[96m", // calm: bright cyan
    "\x1b[95m", // excited: bright magenta
    "\x1b[94m", // sad: bright blue
    "\x1b[34m", // tired: blue
    "\x1b[33m", // anxious: yellow
    "\x1b[91m", // angry: bright red
    "\x1b[35m", // loved: magenta
    "\x1b[37m", // other: white
];

fn mood_colour(mood: MoodKind) -> &'static str {
    let index = MoodKind::ALL
        .iter()
        .position(|m| *m == mood)
        .unwrap_or(MOOD_COLOURS.len() - 1);
    MOOD_COLOURS[index]
}

/// Format a mood key for log output, e.g. `happy`.
pub fn mood(mood: MoodKind) -> String {
    if colour_enabled() {
        format!("{}{}{RESET}", mood_colour(mood), mood.key())
    } else {
        mood.key().to_string()
    }
}

/// Format an entry id for log output, e.g. `e-12`.
pub fn entry_id(id: u64) -> String {
    if colour_enabled() {
        format!("{ENTRY_ID_COLOUR}e-{id}{RESET}")
    } else {
        format!("e-{id}")
    }
}

/// Format the current wall-clock time as `YYYYMMDDTHH:MM:SS.mmm`.
pub fn format_timestamp() -> String {
    chrono::Local::now().format("%Y%m%dT%H:%M:%S%.3f").to_string()
}

/// Write a single log line to the current writer.
///
/// Called by the [`tlog!`] macro; not intended for direct use.
pub fn emit(file: &str, line: u32, msg: &str) {
    let ts = format_timestamp();
    let formatted = if colour_enabled() {
        format!("{DIM}{ts}{RESET} {DIM}{file}:{line}{RESET} {msg}")
    } else {
        format!("{ts} - {file}:{line} - {msg}")
    };
    let mut writer = LOG_WRITER.lock().unwrap_or_else(|e| e.into_inner());
    let _ = writeln!(*writer, "{formatted}");
}

/// Emit a log line to the current writer with timestamp and source location.
///
/// # Usage
///
/// ```ignore
/// tlog!("journal: loaded {} entries", count);
/// tlog!("journal: saved {}", logging::entry_id(entry.id));
/// ```
#[macro_export]
macro_rules! tlog {
    ($($arg:tt)*) => {{
        $crate::logging::emit(file!(), line!(), &format!($($arg)*));
    }};
}
