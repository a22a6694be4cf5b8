use super::error::BuildError;
use super::reaction::parse_reaction;
use super::sections::{SectionKind, split_sections};
use crate::core::io::records::{Record, capture, records};
use crate::core::models::entities::{
    Diffusion, Function, Molecule, Observable, ObservableKind, Parameter, Reaction, Species,
    Structure, StructureKind,
};
use crate::core::models::ids::{IdGenerator, RandomIdGenerator};
use crate::core::models::model::{Model, ModelConfig};
use crate::core::utils::identifiers::{is_identifier, structure_names};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::{debug, info, instrument};

static DIFFUSION_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^@(?P<structure>[A-Za-z]\w*):(?P<species>\w+\(.*\))$")
        .expect("diffusion prefix pattern is valid")
});

static DIFFUSION_SUFFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<species>\w+\(.*\))@(?P<structure>[A-Za-z]\w*)$")
        .expect("diffusion suffix pattern is valid")
});

/// Builds a [`Model`] from model DSL text.
///
/// Construction is all-or-nothing: the first malformed line aborts the build and no
/// partial model is returned. Unresolved references are not build errors; they are left
/// for the validator.
#[derive(Clone)]
pub struct ModelBuilder {
    ids: Arc<dyn IdGenerator>,
    config: ModelConfig,
    name: String,
}

impl Default for ModelBuilder {
    fn default() -> Self {
        Self {
            ids: Arc::new(RandomIdGenerator),
            config: ModelConfig::default(),
            name: String::new(),
        }
    }
}

impl std::fmt::Debug for ModelBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelBuilder")
            .field("config", &self.config)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl ModelBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    /// Concentration sources species values are assigned to, in column order.
    pub fn with_conc_sources(mut self, sources: Vec<String>) -> Self {
        self.config = ModelConfig::with_sources(sources);
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    /// Parses `text` into a model. The model id is drawn first, then entity ids in
    /// section parse order (structures, parameters, functions, molecules, species,
    /// reactions, observables, diffusions).
    #[instrument(level = "debug", skip_all, fields(bytes = text.len()))]
    pub fn build(&self, text: &str) -> Result<Model, BuildError> {
        let sections = split_sections(text)?;

        let mut by_kind: HashMap<SectionKind, Vec<Record>> = HashMap::new();
        for section in &sections {
            by_kind
                .entry(section.kind)
                .or_default()
                .extend(records(&section.body, section.first_line));
        }

        let mut model = Model::empty(self.ids.next_id(), self.config.clone());
        model.name = self.name.clone();

        for kind in SectionKind::PARSE_ORDER {
            let Some(recs) = by_kind.get(&kind) else {
                continue;
            };
            debug!(section = kind.title(), records = recs.len(), "Mapping section");
            for record in recs {
                self.map_record(&mut model, kind, record)?;
            }
        }

        info!(
            structures = model.structures.len(),
            parameters = model.parameters.len(),
            species = model.species.len(),
            reactions = model.reactions.len(),
            "Model built"
        );
        Ok(model)
    }

    fn map_record(
        &self,
        model: &mut Model,
        kind: SectionKind,
        record: &Record,
    ) -> Result<(), BuildError> {
        match kind {
            SectionKind::Compartments => {
                let structure = self.structure(record)?;
                model.structures.push(structure);
            }
            SectionKind::Parameters => {
                let parameter = self.parameter(record)?;
                model.parameters.push(parameter);
            }
            SectionKind::Functions => {
                let function = self.function(record)?;
                model.functions.push(function);
            }
            SectionKind::MoleculeTypes => {
                let molecule = self.molecule(record)?;
                model.molecules.push(molecule);
            }
            SectionKind::Species => {
                let species = self.species(record, &model.structures)?;
                model.species.push(species);
            }
            SectionKind::ReactionRules => {
                let reaction = self.reaction(record)?;
                model.reactions.push(reaction);
            }
            SectionKind::Observables => {
                let observable = self.observable(record)?;
                model.observables.push(observable);
            }
            SectionKind::Diffusions => {
                let diffusion = self.diffusion(record)?;
                model.diffusions.push(diffusion);
            }
        }
        Ok(())
    }

    fn structure(&self, record: &Record) -> Result<Structure, BuildError> {
        let section = SectionKind::Compartments.title();
        let tokens = record.tokens();
        if !(3..=4).contains(&tokens.len()) {
            return Err(BuildError::malformed(
                section,
                record,
                "expected 'name dimensions size [parent]'",
            ));
        }
        let kind = StructureKind::from_dimensions(tokens[1]);
        if kind.is_none() {
            debug!(
                line = record.line,
                dims = tokens[1],
                "Structure dimension is neither 2 nor 3"
            );
        }
        let parent_name = match tokens.get(3) {
            Some(&"-") | None => String::new(),
            Some(parent) => parent.to_string(),
        };
        Ok(Structure {
            name: tokens[0].to_string(),
            kind,
            size: match tokens[2] {
                "-" => String::new(),
                size => size.to_string(),
            },
            parent_name,
            annotation: record.annotation(),
            uni_prot_id: None,
            go_id: None,
            description: None,
            entity_id: self.ids.next_id(),
        })
    }

    fn parameter(&self, record: &Record) -> Result<Parameter, BuildError> {
        let tokens = record.tokens();
        let (name, rest) = tokens
            .split_first()
            .ok_or_else(|| BuildError::malformed("parameters", record, "parameter name is missing"))?;
        let rest = match rest.split_first() {
            Some((&"=", tail)) => tail,
            _ => rest,
        };
        Ok(Parameter {
            name: name.to_string(),
            definition: rest.join(" "),
            annotation: record.annotation(),
            units: None,
            references: None,
            entity_id: self.ids.next_id(),
        })
    }

    fn function(&self, record: &Record) -> Result<Function, BuildError> {
        let section = SectionKind::Functions.title();
        let content = record.content.as_str();

        let open = content.find('(').ok_or_else(|| {
            BuildError::malformed(section, record, "expected 'name(argument) = expression'")
        })?;
        let name = content[..open].trim();
        if !is_identifier(name) {
            return Err(BuildError::malformed(
                section,
                record,
                format!("invalid function name '{}'", name),
            ));
        }
        let close = content[open..]
            .find(')')
            .map(|offset| open + offset)
            .ok_or_else(|| BuildError::malformed(section, record, "unclosed argument list"))?;
        let argument = content[open + 1..close].trim();
        let body = content[close + 1..].trim_start();
        let body = body.strip_prefix('=').unwrap_or(body).trim();

        Ok(Function {
            name: name.to_string(),
            argument: argument.to_string(),
            definition: body.to_string(),
            annotation: record.annotation(),
            units: None,
            references: None,
            entity_id: self.ids.next_id(),
        })
    }

    fn molecule(&self, record: &Record) -> Result<Molecule, BuildError> {
        let tokens = record.tokens();
        let (&definition, rest) = tokens.split_first().ok_or_else(|| {
            BuildError::malformed(
                SectionKind::MoleculeTypes.title(),
                record,
                "molecule definition is missing",
            )
        })?;
        let name = definition
            .split_once('(')
            .map_or(definition, |(name, _)| name);
        if name.is_empty() {
            return Err(BuildError::malformed(
                SectionKind::MoleculeTypes.title(),
                record,
                "molecule name is missing",
            ));
        }
        if !rest.is_empty() {
            debug!(line = record.line, "Ignoring trailing tokens after molecule type");
        }
        Ok(Molecule {
            name: name.to_string(),
            definition: definition.to_string(),
            annotation: record.annotation(),
            agent_type: None,
            description: None,
            gene_name: None,
            uni_prot_id: None,
            go_id: None,
            pub_chem_id: None,
            entity_id: self.ids.next_id(),
        })
    }

    fn species(&self, record: &Record, structures: &[Structure]) -> Result<Species, BuildError> {
        let tokens = record.tokens();
        let (&definition, values) = tokens.split_first().ok_or_else(|| {
            BuildError::malformed(SectionKind::Species.title(), record, "species pattern is missing")
        })?;
        let sources = &self.config.conc_sources;
        if values.len() > sources.len() {
            return Err(BuildError::malformed(
                SectionKind::Species.title(),
                record,
                format!(
                    "{} concentration values given but only {} concentration source(s) registered",
                    values.len(),
                    sources.len()
                ),
            ));
        }

        let concentration: BTreeMap<String, String> = sources
            .iter()
            .enumerate()
            .map(|(i, source)| {
                let value = values.get(i).map(|v| v.to_string()).unwrap_or_default();
                (source.clone(), value)
            })
            .collect();

        Ok(Species {
            name: species_name(definition),
            definition: definition.to_string(),
            concentration,
            unit: default_unit(definition, structures),
            annotation: record.annotation(),
            entity_id: self.ids.next_id(),
        })
    }

    fn reaction(&self, record: &Record) -> Result<Reaction, BuildError> {
        let parsed = parse_reaction(&record.content).map_err(|reason| {
            BuildError::malformed(SectionKind::ReactionRules.title(), record, reason)
        })?;
        Ok(Reaction {
            name: parsed.name,
            definition: parsed.definition,
            kf: parsed.kf,
            kr: parsed.kr,
            kind: parsed.kind,
            annotation: record.annotation(),
            entity_id: self.ids.next_id(),
        })
    }

    fn observable(&self, record: &Record) -> Result<Observable, BuildError> {
        let section = SectionKind::Observables.title();
        let tokens = record.tokens();
        if tokens.len() < 3 {
            return Err(BuildError::malformed(
                section,
                record,
                "expected 'Molecules|Species name pattern'",
            ));
        }
        let kind = ObservableKind::from_keyword(tokens[0]).ok_or_else(|| {
            BuildError::malformed(
                section,
                record,
                format!(
                    "unknown observable type '{}' (expected Molecules or Species)",
                    tokens[0]
                ),
            )
        })?;
        Ok(Observable {
            name: tokens[1].to_string(),
            kind,
            definition: tokens[2..].join(" "),
            annotation: record.annotation(),
            entity_id: self.ids.next_id(),
        })
    }

    fn diffusion(&self, record: &Record) -> Result<Diffusion, BuildError> {
        let section = SectionKind::Diffusions.title();
        let tokens = record.tokens();
        if tokens.len() < 3 {
            return Err(BuildError::malformed(
                section,
                record,
                "expected 'name pattern rate'",
            ));
        }
        let pattern = tokens[1];
        let parts = capture(&DIFFUSION_PREFIX, pattern)
            .or_else(|| capture(&DIFFUSION_SUFFIX, pattern))
            .ok_or_else(|| {
                BuildError::malformed(
                    section,
                    record,
                    format!(
                        "pattern '{}' must be '@structure:Mol(...)' or 'Mol(...)@structure'",
                        pattern
                    ),
                )
            })?;

        Ok(Diffusion {
            name: tokens[0].to_string(),
            definition: pattern.to_string(),
            species_definition: parts["species"].to_string(),
            structure: parts["structure"].to_string(),
            rate: tokens[2..].join(" "),
            units: None,
            annotation: record.annotation(),
            entity_id: self.ids.next_id(),
        })
    }
}

/// Words of a species pattern joined by `_`: `A(s~p)@cyt` becomes `A_s_p_cyt` and
/// `RasGTP()` becomes `Ras_GTP`.
pub fn species_name(definition: &str) -> String {
    definition
        .split(|c: char| !c.is_ascii_alphanumeric())
        .flat_map(split_words)
        .collect::<Vec<_>>()
        .join("_")
}

/// Splits an alphanumeric run at case and digit boundaries: `GTPase2` gives `GT`,
/// `Pase`, `2`.
fn split_words(run: &str) -> Vec<&str> {
    let bytes = run.as_bytes();
    let mut words = Vec::new();
    let mut start = 0;
    for i in 1..bytes.len() {
        let (prev, cur) = (bytes[i - 1], bytes[i]);
        let next_lower = bytes.get(i + 1).is_some_and(u8::is_ascii_lowercase);
        let boundary = prev.is_ascii_digit() != cur.is_ascii_digit()
            || (prev.is_ascii_lowercase() && cur.is_ascii_uppercase())
            || (prev.is_ascii_uppercase() && cur.is_ascii_uppercase() && next_lower);
        if boundary {
            words.push(&run[start..i]);
            start = i;
        }
    }
    if start < run.len() {
        words.push(&run[start..]);
    }
    words
}

fn default_unit(definition: &str, structures: &[Structure]) -> String {
    structure_names(definition)
        .first()
        .and_then(|name| structures.iter().find(|s| s.name == *name))
        .and_then(|s| s.kind)
        .map(|kind| kind.default_species_unit().to_string())
        .unwrap_or_default()
}
