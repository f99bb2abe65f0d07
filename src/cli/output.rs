//! Shared CLI output helpers for consistent operator-facing text.
//!
//! In JSON mode the human-readable helpers print nothing and commands emit
//! a single JSON document through [`json`] instead.

use std::fmt::Display;
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};

use owo_colors::OwoColorize;
use serde::Serialize;

const RULE_WIDTH: usize = 56;

static JSON_MODE: AtomicBool = AtomicBool::new(false);

/// Switch every helper to JSON mode.
pub fn set_json(enabled: bool) {
    JSON_MODE.store(enabled, Ordering::Relaxed);
}

#[must_use]
pub fn is_json() -> bool {
    JSON_MODE.load(Ordering::Relaxed)
}

/// Print a section header and separator.
pub fn section(title: &str) {
    if is_json() {
        return;
    }
    println!();
    println!("{}", title.bold());
    println!("{}", "─".repeat(RULE_WIDTH).dimmed());
}

/// Print a simple key/value line.
pub fn key_value(label: &str, value: impl Display) {
    if is_json() {
        return;
    }
    println!("{:<14} {value}", label.dimmed());
}

/// Print a successful status line.
pub fn ok(message: &str) {
    if is_json() {
        return;
    }
    println!("{} {message}", "✓".green());
}

/// Print a warning status line.
pub fn warn(message: &str) {
    if is_json() {
        return;
    }
    println!("{} {message}", "⚠".yellow());
}

/// Print an error status line. Always goes to stderr, even in JSON mode.
pub fn error(message: &str) {
    eprintln!("{} {message}", "✗".red());
}

/// Print a single-line note.
pub fn note(message: &str) {
    if is_json() {
        return;
    }
    println!("{}", message.dimmed());
}

/// Start a progress line in the format `Label... `.
pub fn progress(label: &str) {
    if is_json() {
        return;
    }
    print!("{label}... ");
    let _ = io::stdout().flush();
}

/// Finish a progress line.
pub fn progress_done(success: bool) {
    if is_json() {
        return;
    }
    if success {
        println!("{}", "ok".green());
    } else {
        println!("{}", "failed".red());
    }
}

/// Cyan-highlight a value for inline use.
#[must_use]
pub fn highlight(value: impl Display) -> String {
    format!("{}", value.cyan())
}

/// Emit `value` as pretty JSON on stdout.
///
/// # Errors
///
/// Returns a serialization error if `value` cannot be encoded.
pub fn json<T: Serialize>(value: &T) -> serde_json::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Ask a yes/no question on stdin. Anything but `y` or `yes` is a no.
#[must_use]
pub fn confirm(question: &str) -> bool {
    print!("{question} [y/N] ");
    let _ = io::stdout().flush();

    let mut input = String::new();
    if io::stdin().read_line(&mut input).is_err() {
        return false;
    }
    matches!(input.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
