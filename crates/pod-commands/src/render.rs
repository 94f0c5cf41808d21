//! Terminal rendering of command results.
//!
//! Renderers are projections over a command's `data` payload; they never
//! look anything up themselves.

use std::io::{self, Write};

use colored::Colorize;
use serde_json::Value;

use crate::error::CommandError;

/// Renders a successful command's data payload.
pub type RenderFn = fn(&Value, &mut dyn Write) -> io::Result<()>;

pub fn render_error(err: &CommandError, out: &mut dyn Write) -> io::Result<()> {
    writeln!(
        out,
        "{} {} {}",
        "✗".red().bold(),
        err.message,
        format!("({})", err.code).dimmed()
    )
}

/// Fallback renderer: strings print as-is, objects as `key: value` lines.
pub fn render_value(data: &Value, out: &mut dyn Write) -> io::Result<()> {
    match data {
        Value::Null => Ok(()),
        Value::String(s) => writeln!(out, "{s}"),
        Value::Object(map) => {
            for (key, value) in map {
                writeln!(out, "{}: {}", key.bold(), scalar(value))?;
            }
            Ok(())
        }
        other => writeln!(out, "{other}"),
    }
}

/// A success line with a check mark.
pub fn ok_line(out: &mut dyn Write, message: &str) -> io::Result<()> {
    writeln!(out, "{} {}", "✓".green().bold(), message)
}

/// Plain text for a scalar JSON value; strings lose their quotes.
pub fn scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "-".to_string(),
        other => other.to_string(),
    }
}

/// Field of an object payload as plain text, `-` when absent.
pub fn field(data: &Value, key: &str) -> String {
    data.get(key).map(scalar).unwrap_or_else(|| "-".to_string())
}

/// A directory entry name, coloured by kind.
pub fn entry_name(name: &str, container: bool) -> String {
    if container {
        name.blue().bold().to_string()
    } else {
        name.to_string()
    }
}
