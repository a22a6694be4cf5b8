//! Scanner for reaction rule lines.
//!
//! Three dialects are accepted, picked by substring:
//!
//! ```text
//! [name:] lhs -> rhs kf() TotalRate
//! [name:] lhs <-> rhs kf, kr
//! [name:] lhs -> rhs kf
//! ```

use crate::core::models::entities::ReactionKind;

const TOTAL_RATE: &str = "TotalRate";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedReaction {
    pub name: String,
    pub definition: String,
    pub kf: String,
    pub kr: String,
    pub kind: ReactionKind,
}

/// Parses the content of one reaction record. The error is a human-readable reason.
pub fn parse_reaction(content: &str) -> Result<ParsedReaction, String> {
    let (name, body) = split_name(content.trim());

    let has_total_rate = body.split_whitespace().any(|t| t == TOTAL_RATE);
    let has_reverse = body.contains("<->");

    let (definition, kf, kr, kind) = match (has_total_rate, has_reverse) {
        (true, true) => {
            return Err(format!(
                "ambiguous reaction dialect: both '{}' and '<->' present",
                TOTAL_RATE
            ));
        }
        (true, false) => {
            let rest = body
                .trim_end()
                .strip_suffix(TOTAL_RATE)
                .ok_or_else(|| format!("'{}' must be the last token", TOTAL_RATE))?;
            let (definition, kf) = split_last_token(rest)?;
            if !kf.ends_with("()") {
                return Err(format!(
                    "'{}' reactions need a function rate such as 'kf()', found '{}'",
                    TOTAL_RATE, kf
                ));
            }
            (definition, kf, "", ReactionKind::TotalRate)
        }
        (false, true) => {
            let arrow = body.find("<->").unwrap_or(0);
            match top_level_comma_after(body, arrow) {
                Some(comma) => {
                    let kr = body[comma + 1..].trim();
                    if kr.split_whitespace().count() > 1 {
                        return Err(format!("unexpected text after reverse rate: '{}'", kr));
                    }
                    let (definition, kf) = split_last_token(&body[..comma])?;
                    (definition, kf, kr, ReactionKind::Bidirectional)
                }
                None => {
                    let (definition, kf) = split_last_token(body)?;
                    (definition, kf, "", ReactionKind::Bidirectional)
                }
            }
        }
        (false, false) => {
            let (definition, kf) = split_last_token(body)?;
            (definition, kf, "", ReactionKind::Unidirectional)
        }
    };

    if !definition.contains("->") {
        return Err(if kf.contains("->") {
            "reaction rate is missing".to_string()
        } else {
            "reaction definition has no '->' arrow".to_string()
        });
    }

    Ok(ParsedReaction {
        name: name.to_string(),
        definition: definition.to_string(),
        kf: kf.to_string(),
        kr: kr.to_string(),
        kind,
    })
}

/// Splits an optional `name:` prefix. The name is word characters, optionally followed by
/// one space before the colon.
fn split_name(line: &str) -> (&str, &str) {
    let word_end = line
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .unwrap_or(line.len());
    if word_end == 0 {
        return ("", line);
    }
    let after = &line[word_end..];
    let after = after.strip_prefix(' ').unwrap_or(after);
    match after.strip_prefix(':') {
        Some(rest) => (&line[..word_end], rest.trim()),
        None => ("", line),
    }
}

fn split_last_token(text: &str) -> Result<(&str, &str), String> {
    let text = text.trim_end();
    match text.rsplit_once([' ', '\t']) {
        Some((head, last)) => Ok((head.trim(), last)),
        None if text.contains("->") => Err("reaction rate is missing".to_string()),
        None => Err("expected 'definition rate'".to_string()),
    }
}

/// Last comma after `from` that is not inside parentheses.
fn top_level_comma_after(text: &str, from: usize) -> Option<usize> {
    let mut depth = 0i32;
    let mut found = None;
    for (idx, c) in text.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth -= 1,
            ',' if depth == 0 && idx > from => found = Some(idx),
            _ => {}
        }
    }
    found
}
