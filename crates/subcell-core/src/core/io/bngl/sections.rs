use super::error::BuildError;
use crate::core::io::records::{strip_comment, tokenize};
use phf::{Map, phf_map};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SectionKind {
    Compartments,
    Parameters,
    Functions,
    MoleculeTypes,
    Species,
    ReactionRules,
    Observables,
    Diffusions,
}

/// Section names with whitespace removed, lowercased.
static SECTION_NAMES: Map<&'static str, SectionKind> = phf_map! {
    "compartments" => SectionKind::Compartments,
    "parameters" => SectionKind::Parameters,
    "functions" => SectionKind::Functions,
    "moleculetypes" => SectionKind::MoleculeTypes,
    "species" => SectionKind::Species,
    "seedspecies" => SectionKind::Species,
    "reactionrules" => SectionKind::ReactionRules,
    "observables" => SectionKind::Observables,
    "diffusions" => SectionKind::Diffusions,
};

const WRAPPER: &str = "model";

impl SectionKind {
    /// Order in which the builder maps sections: structures come before anything that
    /// looks them up.
    pub const PARSE_ORDER: [SectionKind; 8] = [
        SectionKind::Compartments,
        SectionKind::Parameters,
        SectionKind::Functions,
        SectionKind::MoleculeTypes,
        SectionKind::Species,
        SectionKind::ReactionRules,
        SectionKind::Observables,
        SectionKind::Diffusions,
    ];

    /// Order in which the writer emits sections.
    pub const WRITE_ORDER: [SectionKind; 8] = [
        SectionKind::Parameters,
        SectionKind::Compartments,
        SectionKind::MoleculeTypes,
        SectionKind::Species,
        SectionKind::Observables,
        SectionKind::Functions,
        SectionKind::ReactionRules,
        SectionKind::Diffusions,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        SECTION_NAMES.get(normalize(name).as_str()).copied()
    }

    /// Canonical name written after `begin` / `end`.
    pub fn title(&self) -> &'static str {
        match self {
            Self::Compartments => "compartments",
            Self::Parameters => "parameters",
            Self::Functions => "functions",
            Self::MoleculeTypes => "molecule types",
            Self::Species => "species",
            Self::ReactionRules => "reaction rules",
            Self::Observables => "observables",
            Self::Diffusions => "diffusions",
        }
    }
}

fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Raw body of one recognised section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub kind: SectionKind,
    /// 1-based line number of the first body line.
    pub first_line: usize,
    pub body: String,
}

enum Marker<'a> {
    Begin(&'a str),
    End(&'a str),
}

fn marker(line: &str) -> Option<Marker<'_>> {
    let (content, _) = strip_comment(line);
    let (keyword, rest) = match content.split_once([' ', '\t']) {
        Some((keyword, rest)) => (keyword, rest.trim()),
        None => (content, ""),
    };
    if keyword.eq_ignore_ascii_case("begin") {
        Some(Marker::Begin(rest))
    } else if keyword.eq_ignore_ascii_case("end") {
        Some(Marker::End(rest))
    } else {
        None
    }
}

struct OpenSection<'a> {
    name: String,
    title: &'a str,
    begin_line: usize,
    lines: Vec<&'a str>,
}

/// Splits model text into its `begin` / `end` delimited sections.
///
/// `begin model` / `end model` wrappers are transparent. Sections with unknown names are
/// skipped. Text outside any section is ignored.
pub fn split_sections(text: &str) -> Result<Vec<Section>, BuildError> {
    let mut sections = Vec::new();
    let mut open: Option<OpenSection<'_>> = None;

    for (idx, line) in text.lines().enumerate() {
        let line_no = idx + 1;

        match marker(line) {
            Some(Marker::Begin(name)) => {
                if let Some(current) = &open {
                    return Err(BuildError::malformed_line(
                        current.title,
                        line_no,
                        line,
                        format!(
                            "section '{}' opened before '{}' (line {}) was closed",
                            name, current.title, current.begin_line
                        ),
                    ));
                }
                let normalized = normalize(name);
                if normalized == WRAPPER {
                    continue;
                }
                if normalized.is_empty() {
                    return Err(BuildError::malformed_line(
                        WRAPPER,
                        line_no,
                        line,
                        "section name is missing",
                    ));
                }
                open = Some(OpenSection {
                    name: normalized,
                    title: name,
                    begin_line: line_no,
                    lines: Vec::new(),
                });
            }
            Some(Marker::End(name)) => {
                let normalized = normalize(name);
                let Some(current) = open.take() else {
                    if normalized == WRAPPER {
                        continue;
                    }
                    return Err(BuildError::malformed_line(
                        name,
                        line_no,
                        line,
                        "'end' without a matching 'begin'",
                    ));
                };
                if normalized != current.name {
                    return Err(BuildError::malformed_line(
                        current.title,
                        line_no,
                        line,
                        format!(
                            "expected 'end {}' but found 'end {}'",
                            current.title, name
                        ),
                    ));
                }
                match SectionKind::from_name(&current.name) {
                    Some(kind) => sections.push(Section {
                        kind,
                        first_line: current.begin_line + 1,
                        body: current.lines.join("\n"),
                    }),
                    None => debug!(
                        section = current.title,
                        line = current.begin_line,
                        "Skipping unsupported section"
                    ),
                }
            }
            None => {
                if let Some(current) = open.as_mut() {
                    current.lines.push(line);
                }
            }
        }
    }

    match open {
        Some(current) => Err(BuildError::malformed_line(
            current.title,
            current.begin_line,
            &format!("begin {}", current.title),
            "section is never closed",
        )),
        None => Ok(sections),
    }
}
