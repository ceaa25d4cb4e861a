//! Shared helpers for the command layer.

use std::io::Read;

use anyhow::Context;

/// Read a whole input: a file path, or stdin when `source` is `None` or `"-"`.
pub fn read_input(source: Option<&str>) -> anyhow::Result<String> {
    match source {
        None | Some("-") => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path))
        }
    }
}

/// Message text from the argument, or stdin with one trailing newline removed.
pub fn message_or_stdin(message: Option<String>) -> anyhow::Result<String> {
    match message {
        Some(text) => Ok(text),
        None => Ok(strip_trailing_newline(read_input(None)?)),
    }
}

/// Remove a single trailing `\n` or `\r\n`, as left by `echo` or a heredoc.
pub fn strip_trailing_newline(mut text: String) -> String {
    if text.ends_with('\n') {
        text.pop();
        if text.ends_with('\r') {
            text.pop();
        }
    }
    text
}

/// First `max` characters of `text`, with "..." appended if it was cut.
pub fn preview(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let head: String = text.chars().take(max).collect();
        format!("{}...", head)
    }
}
