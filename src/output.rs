//! User-facing progress lines.
//!
//! Write failures are ignored.

use console::style;
use std::fmt::Display;
use std::io::Write;
use std::path::Path;

/// `<message> '<subject>'` with the subject highlighted.
pub fn progress(out: &mut dyn Write, message: &str, subject: &str) {
    let _ = writeln!(
        out,
        "{} {}",
        style(message).cyan(),
        style(format!("'{subject}'")).white().bold()
    );
}

pub fn success(out: &mut dyn Write, message: &str, subject: &str) {
    let _ = writeln!(
        out,
        "{} {}",
        style(message).green(),
        style(format!("'{subject}'")).white().bold()
    );
}

pub fn file(out: &mut dyn Write, message: &str, path: &Path) {
    let _ = writeln!(out, "{} {}", message, style(format!("'{}'", path.display())).green());
}

pub fn failure(out: &mut dyn Write, error: &dyn Display) {
    let _ = writeln!(out, "{}", style(error.to_string()).red());
}
