//! Line-oriented record extraction shared by the DSL and mesh readers.

use regex::Regex;
use std::collections::HashMap;

/// A logical line of DSL text with its comment split off.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// 1-based line number of the first physical line.
    pub line: usize,
    pub content: String,
    pub comment: Option<String>,
}

impl Record {
    /// Fields separated by runs of tabs and spaces.
    pub fn tokens(&self) -> Vec<&str> {
        tokenize(&self.content)
    }

    /// Inline comment, or an empty string when the line had none.
    pub fn annotation(&self) -> String {
        self.comment.clone().unwrap_or_default()
    }
}

pub fn tokenize(content: &str) -> Vec<&str> {
    content
        .split([' ', '\t'])
        .filter(|token| !token.is_empty())
        .collect()
}

/// Splits a line at the first `#`. Both halves are trimmed; an empty comment is `None`.
pub fn strip_comment(line: &str) -> (&str, Option<&str>) {
    match line.split_once('#') {
        Some((content, comment)) => {
            let comment = comment.trim();
            (
                content.trim(),
                (!comment.is_empty()).then_some(comment),
            )
        }
        None => (line.trim(), None),
    }
}

/// Turns the body of a section into records.
///
/// Blank and comment-only lines are dropped. A line whose content ends in `\` is joined
/// with the next one; the record keeps the line number where it started.
pub fn records(text: &str, first_line: usize) -> Vec<Record> {
    let mut out = Vec::new();
    let mut pending: Option<(usize, String, Vec<String>)> = None;

    for (offset, raw) in text.lines().enumerate() {
        let line_no = first_line + offset;
        let (content, comment) = strip_comment(raw);

        if content.is_empty() {
            if let Some((line, content, comments)) = pending.take() {
                out.extend(finish(line, content, comments));
            }
            continue;
        }

        let (piece, continued) = match content.strip_suffix('\\') {
            Some(head) => (head.trim_end(), true),
            None => (content, false),
        };

        let (line, mut joined, mut comments) =
            pending.take().unwrap_or((line_no, String::new(), Vec::new()));
        if !joined.is_empty() && !piece.is_empty() {
            joined.push(' ');
        }
        joined.push_str(piece);
        comments.extend(comment.map(str::to_string));

        if continued {
            pending = Some((line, joined, comments));
        } else {
            out.extend(finish(line, joined, comments));
        }
    }

    if let Some((line, content, comments)) = pending {
        out.extend(finish(line, content, comments));
    }
    out
}

/// A continuation chain made only of `\` markers yields no record.
fn finish(line: usize, content: String, comments: Vec<String>) -> Option<Record> {
    if content.is_empty() {
        return None;
    }
    Some(Record {
        line,
        content,
        comment: (!comments.is_empty()).then(|| comments.join(" ")),
    })
}

/// Named capture groups of `pattern` matched against `content`.
pub fn capture<'t>(pattern: &Regex, content: &'t str) -> Option<HashMap<String, &'t str>> {
    let caps = pattern.captures(content)?;
    Some(
        pattern
            .capture_names()
            .flatten()
            .filter_map(|name| caps.name(name).map(|m| (name.to_string(), m.as_str())))
            .collect(),
    )
}
