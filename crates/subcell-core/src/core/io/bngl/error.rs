use crate::core::io::records::Record;
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Malformed input in section '{section}' on line {line}: {reason} (line: '{content}')")]
    MalformedInput {
        section: String,
        line: usize,
        content: String,
        reason: String,
    },
}

impl BuildError {
    pub(crate) fn malformed(section: &str, record: &Record, reason: impl Into<String>) -> Self {
        Self::MalformedInput {
            section: section.to_string(),
            line: record.line,
            content: record.content.clone(),
            reason: reason.into(),
        }
    }

    pub(crate) fn malformed_line(
        section: &str,
        line: usize,
        content: &str,
        reason: impl Into<String>,
    ) -> Self {
        Self::MalformedInput {
            section: section.to_string(),
            line,
            content: content.trim().to_string(),
            reason: reason.into(),
        }
    }
}
