//! Diagnostic rendering for `validate`

use ariadne::{Config, Label, Report, ReportKind, Source};
use ngxclair_config::{ConfigError, ErrorKind};
use std::collections::HashMap;
use std::ops::Range;

/// Source text of every file mentioned by an error, read on first use
#[derive(Debug, Default)]
pub struct SourceCache {
    files: HashMap<String, Option<String>>,
}

impl SourceCache {
    fn get(&mut self, file: &str) -> Option<&str> {
        self.files
            .entry(file.to_string())
            .or_insert_with(|| std::fs::read_to_string(file).ok())
            .as_deref()
    }
}

fn label(kind: ErrorKind) -> &'static str {
    match kind {
        ErrorKind::UnknownDirective => "unknown directive",
        ErrorKind::NotAllowedHere => "not allowed in this block",
        ErrorKind::InvalidArguments => "bad arguments or terminator",
        ErrorKind::InvalidFlag => "expected on or off",
        ErrorKind::UnbalancedBraces => "unbalanced braces",
        ErrorKind::Unterminated => "unterminated here",
        ErrorKind::ScriptBlock => "script block not closed",
        ErrorKind::IncludeNotFound | ErrorKind::IncludeGlob => "include failed",
        ErrorKind::IncludeCycle => "include cycle",
        ErrorKind::Io => "unreadable",
    }
}

/// Character range covering line `line` (1-based) of `text`
fn line_span(text: &str, line: usize) -> Range<usize> {
    let mut start = 0;
    for (index, content) in text.split('\n').enumerate() {
        let len = content.chars().count();
        if index + 1 == line {
            return start..start + len;
        }
        start += len + 1;
    }
    let end = text.chars().count();
    end..end
}

/// Render `error` as a labelled snippet, or as one line when its source
/// cannot be shown
pub fn render(error: &ConfigError, cache: &mut SourceCache) -> String {
    let (Some(line), Some(text)) = (error.line, cache.get(&error.file)) else {
        return format!("error: {}\n", error);
    };

    let id = error.file.as_str();
    let span = line_span(text, line);
    let mut out = Vec::new();
    let written = Report::build(ReportKind::Error, (id, span.clone()))
        .with_config(Config::default().with_color(false))
        .with_message(&error.reason)
        .with_label(Label::new((id, span)).with_message(label(error.kind)))
        .finish()
        .write((id, Source::from(text)), &mut out);

    match written {
        Ok(()) => String::from_utf8_lossy(&out).into_owned(),
        Err(_) => format!("error: {}\n", error),
    }
}

/// A note for errors after which the rest of the file went unchecked
pub fn stopped_note(error: &ConfigError) -> Option<String> {
    if !error.kind.is_fatal() {
        return None;
    }
    Some(match error.line {
        Some(line) => format!("note: {} was not checked past line {}", error.file, line),
        None => format!("note: {} was not checked", error.file),
    })
}
