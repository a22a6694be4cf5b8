//! Per-entity rule sets. Every rule only appends to the entity's findings; nothing
//! short-circuits.

use super::report::{Severity, ValidationMessage};
use crate::core::models::entities::{
    Diffusion, Entity, Function, Molecule, Observable, Parameter, Reaction, ReactionKind,
    Species, Structure,
};
use crate::core::models::model::Model;
use crate::core::utils::identifiers::{
    function_names, molecule_names, parameter_names, structure_names,
};
use std::collections::{HashMap, HashSet};

pub(crate) const DUPLICATE_NAME: &str = "has been defined more than once";
pub(crate) const DUPLICATE_DEFINITION: &str = "BNG definition has been declared more than once";
pub(crate) const INVALID_DEFINITION: &str = "invalid BNG definition";
pub(crate) const MISSING_DEFINITION: &str = "BNG definition is missing";
pub(crate) const STRUCTURE_CYCLE: &str = "structure hierarchy contains a cycle";

/// Messages collected for one entity.
#[derive(Debug)]
pub(crate) struct Findings {
    context: String,
    messages: Vec<ValidationMessage>,
}

impl Findings {
    fn for_entity<E: Entity>(entity: &E) -> Self {
        Self {
            context: entity.context(),
            messages: Vec::new(),
        }
    }

    fn push(&mut self, severity: Severity, text: impl Into<String>) {
        self.messages.push(ValidationMessage {
            severity,
            text: text.into(),
            context: self.context.clone(),
        });
    }

    fn error(&mut self, text: impl Into<String>) {
        self.push(Severity::Error, text);
    }

    fn warning(&mut self, text: impl Into<String>) {
        self.push(Severity::Warning, text);
    }

    fn info(&mut self, text: impl Into<String>) {
        self.push(Severity::Info, text);
    }

    /// One error per name in `names` not found in any of `known`.
    fn unresolved<'a>(
        &mut self,
        names: impl IntoIterator<Item = &'a str>,
        known: &[&HashSet<&str>],
        kind: &str,
    ) {
        for name in names {
            if !known.iter().any(|set| set.contains(name)) {
                self.error(format!("{} {} is not defined in the model", name, kind));
            }
        }
    }

    pub(crate) fn into_messages(self) -> Vec<ValidationMessage> {
        self.messages
    }
}

fn count_by<'a, T>(items: &'a [T], key: impl Fn(&'a T) -> &'a str) -> HashMap<&'a str, usize> {
    let mut counts = HashMap::new();
    for item in items {
        *counts.entry(key(item)).or_insert(0) += 1;
    }
    counts
}

fn is_repeated(counts: &HashMap<&str, usize>, key: &str) -> bool {
    counts.get(key).is_some_and(|&n| n > 1)
}

/// Name and definition lookups over the whole model, built once per validation run.
pub(crate) struct ModelIndex<'m> {
    model: &'m Model,
    structures: HashSet<&'m str>,
    parameters: HashSet<&'m str>,
    functions: HashSet<&'m str>,
    observables: HashSet<&'m str>,
    molecules: HashSet<&'m str>,
    parents: HashMap<&'m str, &'m str>,
    names: HashMap<&'static str, HashMap<&'m str, usize>>,
    definitions: HashMap<&'static str, HashMap<&'m str, usize>>,
}

impl<'m> ModelIndex<'m> {
    pub(crate) fn new(model: &'m Model) -> Self {
        let mut parents = HashMap::new();
        for s in &model.structures {
            parents.entry(s.name.as_str()).or_insert(s.parent_name.as_str());
        }

        let names = HashMap::from([
            ("structures", count_by(&model.structures, |e| e.name.as_str())),
            ("parameters", count_by(&model.parameters, |e| e.name.as_str())),
            ("functions", count_by(&model.functions, |e| e.name.as_str())),
            ("molecules", count_by(&model.molecules, |e| e.name.as_str())),
            ("species", count_by(&model.species, |e| e.name.as_str())),
            ("reactions", count_by(&model.reactions, |e| e.name.as_str())),
            ("observables", count_by(&model.observables, |e| e.name.as_str())),
            ("diffusions", count_by(&model.diffusions, |e| e.name.as_str())),
        ]);
        let definitions = HashMap::from([
            ("molecules", count_by(&model.molecules, |e| e.definition.as_str())),
            ("species", count_by(&model.species, |e| e.definition.as_str())),
            ("reactions", count_by(&model.reactions, |e| e.definition.as_str())),
            ("observables", count_by(&model.observables, |e| e.definition.as_str())),
            ("diffusions", count_by(&model.diffusions, |e| e.definition.as_str())),
        ]);

        Self {
            model,
            structures: model.structures.iter().map(|s| s.name.as_str()).collect(),
            parameters: model.parameters.iter().map(|p| p.name.as_str()).collect(),
            functions: model.functions.iter().map(|f| f.name.as_str()).collect(),
            observables: model.observables.iter().map(|o| o.name.as_str()).collect(),
            molecules: model
                .molecules
                .iter()
                .flat_map(|m| molecule_names(&m.definition))
                .collect(),
            parents,
            names,
            definitions,
        }
    }

    fn duplicate_name<E: Entity>(&self, entity: &E) -> bool {
        self.names
            .get(E::TYPE.collection_name())
            .is_some_and(|counts| is_repeated(counts, entity.name()))
    }

    fn duplicate_definition<E: Entity>(&self, entity: &E) -> bool {
        self.definitions
            .get(E::TYPE.collection_name())
            .is_some_and(|counts| is_repeated(counts, entity.definition()))
    }

    /// True when following parent links from `name` leads back to `name`.
    fn in_cycle(&self, name: &str) -> bool {
        let mut current = name;
        for _ in 0..self.parents.len() {
            match self.parents.get(current) {
                Some(parent) if parent.is_empty() => return false,
                Some(parent) if *parent == name => return true,
                Some(parent) => current = *parent,
                None => return false,
            }
        }
        false
    }
}

fn common<E: Entity>(index: &ModelIndex<'_>, entity: &E, check_definition: bool) -> Findings {
    let mut findings = Findings::for_entity(entity);
    if index.duplicate_name(entity) {
        findings.error(DUPLICATE_NAME);
    }
    if check_definition && index.duplicate_definition(entity) {
        findings.error(DUPLICATE_DEFINITION);
    }
    findings
}

/// Structure, molecule and well-formedness checks shared by patterns.
fn pattern_references(findings: &mut Findings, index: &ModelIndex<'_>, pattern: &str) {
    findings.unresolved(structure_names(pattern), &[&index.structures], "structure");

    let molecules = molecule_names(pattern);
    if molecules.is_empty() {
        findings.error(INVALID_DEFINITION);
    }
    findings.unresolved(molecules, &[&index.molecules], "molecule");
}

pub(crate) fn structure(index: &ModelIndex<'_>, s: &Structure) -> Findings {
    let mut findings = common(index, s, false);

    if s.kind.is_none() {
        findings.error("dimensional type is missing");
    }
    if !s.parent_name.is_empty() && !index.structures.contains(s.parent_name.as_str()) {
        findings.error(format!(
            "{} structure is not defined in the model",
            s.parent_name
        ));
    }
    if index.in_cycle(&s.name) {
        findings.error(STRUCTURE_CYCLE);
    }
    findings.unresolved(parameter_names(&s.size), &[&index.parameters], "parameter");

    if s.uni_prot_id.as_deref().is_none_or(str::is_empty) {
        findings.warning("UniProt SL id is missing");
    }
    if s.go_id.as_deref().is_none_or(str::is_empty) {
        findings.warning("GO id is missing");
    }
    if s.description.as_deref().is_none_or(str::is_empty) {
        findings.info("description is missing");
    }
    findings
}

pub(crate) fn parameter(index: &ModelIndex<'_>, p: &Parameter) -> Findings {
    let mut findings = common(index, p, false);
    if p.definition.trim().is_empty() {
        findings.error(INVALID_DEFINITION);
    }
    findings.unresolved(parameter_names(&p.definition), &[&index.parameters], "parameter");
    findings
}

pub(crate) fn function(index: &ModelIndex<'_>, f: &Function) -> Findings {
    let mut findings = common(index, f, false);
    if f.definition.trim().is_empty() {
        findings.error(INVALID_DEFINITION);
    }

    let argument: HashSet<&str> = [f.argument.as_str()]
        .into_iter()
        .filter(|a| !a.is_empty())
        .collect();
    findings.unresolved(
        parameter_names(&f.definition),
        &[&index.parameters, &index.observables, &argument],
        "parameter",
    );
    findings.unresolved(function_names(&f.definition), &[&index.functions], "function");
    findings
}

pub(crate) fn molecule(index: &ModelIndex<'_>, m: &Molecule) -> Findings {
    let mut findings = common(index, m, true);

    if m.definition.trim().is_empty() {
        findings.error(MISSING_DEFINITION);
    } else if molecule_names(&m.definition).is_empty() {
        findings.error(INVALID_DEFINITION);
    }
    if m.agent_type.is_none() {
        findings.warning("agent type is missing");
    }
    if m.description.as_deref().is_none_or(str::is_empty) {
        findings.info("description is missing");
    }
    if m.gene_name.as_deref().is_none_or(str::is_empty) {
        findings.info("gene name is missing");
    }
    findings
}

pub(crate) fn species(index: &ModelIndex<'_>, s: &Species) -> Findings {
    let mut findings = common(index, s, true);
    pattern_references(&mut findings, index, &s.definition);

    for source in &index.model.config.conc_sources {
        let value = s.concentration.get(source).map_or("", String::as_str);
        if value.trim().is_empty() {
            findings.error(format!("{} concentration is missing", source));
        }
        findings.unresolved(parameter_names(value), &[&index.parameters], "parameter");
    }
    findings
}

/// Reactants and products of a rule, split on `+` (except the `!+` bond wildcard) and on
/// the arrow.
pub(crate) fn participants(definition: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let bytes = definition.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        let sep_len = if bytes[i..].starts_with(b"<->") {
            3
        } else if bytes[i..].starts_with(b"->") {
            2
        } else if bytes[i] == b'+' && (i == 0 || bytes[i - 1] != b'!') {
            1
        } else {
            0
        };
        if sep_len > 0 {
            parts.push(definition[start..i].trim());
            i += sep_len;
            start = i;
        } else {
            i += 1;
        }
    }
    parts.push(definition[start..].trim());
    parts.retain(|p| !p.is_empty() && *p != "0");
    parts
}

pub(crate) fn reaction(index: &ModelIndex<'_>, r: &Reaction) -> Findings {
    let mut findings = Findings::for_entity(r);
    if !r.name.is_empty() && index.duplicate_name(r) {
        findings.error(DUPLICATE_NAME);
    }
    if index.duplicate_definition(r) {
        findings.error(DUPLICATE_DEFINITION);
    }

    if !index.structures.is_empty()
        && participants(&r.definition)
            .iter()
            .any(|p| structure_names(p).is_empty())
    {
        findings.error("missing structures in reaction definition");
    }
    pattern_references(&mut findings, index, &r.definition);

    if r.kf.trim().is_empty() {
        findings.error("rate is missing");
    }
    if r.kind == ReactionKind::Bidirectional && r.kr.trim().is_empty() {
        findings.error("reverse rate is missing");
    }
    for rate in [&r.kf, &r.kr] {
        findings.unresolved(parameter_names(rate), &[&index.parameters], "parameter");
        findings.unresolved(function_names(rate), &[&index.functions], "function");
    }
    findings
}

pub(crate) fn observable(index: &ModelIndex<'_>, o: &Observable) -> Findings {
    let mut findings = common(index, o, true);
    pattern_references(&mut findings, index, &o.definition);
    findings
}

pub(crate) fn diffusion(index: &ModelIndex<'_>, d: &Diffusion) -> Findings {
    let mut findings = common(index, d, true);
    pattern_references(&mut findings, index, &d.definition);
    findings.unresolved(parameter_names(&d.rate), &[&index.parameters], "parameter");
    findings
}
