//! Cross-reference validation of a built model.
//!
//! Every entity is checked against every other collection: names must be unique,
//! definitions must not repeat, and each identifier extracted from a DSL expression must
//! resolve. Results are advisory; the model is only read.

mod report;
mod rules;

pub use report::{Severity, ValidationMessage, ValidationReport};

use super::config::ValidationConfig;
use crate::core::models::entities::Entity;
use crate::core::models::model::Model;
use rules::{Findings, ModelIndex};
use std::collections::HashSet;
use tracing::{debug, info, instrument};

pub struct ModelValidator<'m> {
    model: &'m Model,
    config: ValidationConfig,
}

struct Collector {
    report: ValidationReport,
    seen: HashSet<(String, String)>,
    max_messages: usize,
}

impl Collector {
    fn new(max_messages: usize) -> Self {
        Self {
            report: ValidationReport {
                valid: true,
                ..ValidationReport::default()
            },
            seen: HashSet::new(),
            max_messages,
        }
    }

    fn add<E: Entity>(&mut self, entity: &E, findings: Findings) {
        let messages = findings.into_messages();
        for message in &messages {
            if message.is_error() {
                self.report.valid = false;
            }
            if !self
                .seen
                .insert((message.context.clone(), message.text.clone()))
            {
                continue;
            }
            if self.report.messages.len() < self.max_messages {
                self.report.messages.push(message.clone());
            } else {
                self.report.truncated = true;
            }
        }
        self.report
            .entity_messages
            .entry(entity.entity_id())
            .or_default()
            .extend(messages);
    }
}

impl<'m> ModelValidator<'m> {
    pub fn new(model: &'m Model) -> Self {
        Self {
            model,
            config: ValidationConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ValidationConfig) -> Self {
        self.config = config;
        self
    }

    /// Runs every rule set. Entities are visited in the order structures, parameters,
    /// functions, molecules, species, observables, reactions, diffusions.
    #[instrument(level = "debug", skip_all, fields(entities = self.model.entity_count()))]
    pub fn validate(&self) -> ValidationReport {
        let model = self.model;
        let index = ModelIndex::new(model);
        let mut collector = Collector::new(self.config.max_messages);

        for s in &model.structures {
            collector.add(s, rules::structure(&index, s));
        }
        for p in &model.parameters {
            collector.add(p, rules::parameter(&index, p));
        }
        for f in &model.functions {
            collector.add(f, rules::function(&index, f));
        }
        for m in &model.molecules {
            collector.add(m, rules::molecule(&index, m));
        }
        for s in &model.species {
            collector.add(s, rules::species(&index, s));
        }
        for o in &model.observables {
            collector.add(o, rules::observable(&index, o));
        }
        for r in &model.reactions {
            collector.add(r, rules::reaction(&index, r));
        }
        for d in &model.diffusions {
            collector.add(d, rules::diffusion(&index, d));
        }

        let report = collector.report;
        if report.truncated {
            debug!(
                max = self.config.max_messages,
                "Validation message list truncated"
            );
        }
        info!(
            valid = report.valid,
            errors = report.count(Severity::Error),
            warnings = report.count(Severity::Warning),
            "Model validated"
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::io::bngl::ModelBuilder;
    use crate::core::models::entities::{AgentType, Structure, StructureKind};
    use crate::core::models::ids::{IdGenerator, SequentialIdGenerator};
    use std::sync::Arc;

    fn build(text: &str) -> Model {
        ModelBuilder::new()
            .with_id_generator(Arc::new(SequentialIdGenerator::new()))
            .build(text)
            .unwrap()
    }

    fn errors(report: &ValidationReport) -> Vec<String> {
        report
            .errors()
            .map(|m| format!("{}: {}", m.context, m.text))
            .collect()
    }

    fn annotate_structures(model: &mut Model) {
        for s in &mut model.structures {
            s.uni_prot_id = Some("SL-0091".into());
            s.go_id = Some("GO:0005737".into());
            s.description = Some("region".into());
        }
    }

    fn annotate_molecules(model: &mut Model) {
        for m in &mut model.molecules {
            m.agent_type = Some(AgentType::Protein);
            m.description = Some("protein".into());
            m.gene_name = Some("GENE".into());
        }
    }

    const VALID: &str = "\
begin parameters
  kon 1e6
  koff 0.1
  D 1e-12
  vol 1e-15
end parameters
begin compartments
  ec 3 1e-12
  pm 2 1e-9 ec
  cyt 3 vol pm
end compartments
begin molecule types
  A(x)
  R(l)
end molecule types
begin species
  A(x)@cyt 100
  R(l)@pm kon*1e-3
end species
begin observables
  Molecules A_tot A()@cyt
end observables
begin functions
  f(t) = kon * A_tot / t
end functions
begin reaction rules
  bind: A(x)@cyt + R(l)@pm <-> A(x!1)@cyt.R(l!1)@pm kon, koff
  deg: A(x)@cyt -> 0 f() TotalRate
end reaction rules
begin diffusions
  dA A(x)@cyt D
end diffusions
";

    #[test]
    fn consistent_model_is_valid_with_only_advisory_messages() {
        let mut model = build(VALID);
        let report = ModelValidator::new(&model).validate();
        assert!(report.is_valid(), "{:?}", errors(&report));
        assert!(report.count(Severity::Warning) > 0);

        annotate_structures(&mut model);
        annotate_molecules(&mut model);
        let report = ModelValidator::new(&model).validate();
        assert!(report.messages.is_empty(), "{:?}", report.messages);
    }

    #[test]
    fn species_with_unknown_structure_yields_single_error() {
        let model = build(
            "begin molecule types\nA()\nend molecule types\nbegin species\nA()@cyt 1\nend species",
        );
        let report = ModelValidator::new(&model).validate();
        assert!(!report.is_valid());

        let errors: Vec<_> = report.errors().collect();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].context, format!("Species {}", model.species[0].name));
        assert!(errors[0].text.contains("cyt"));
        assert_eq!(
            report.messages_for(model.species[0].entity_id).len(),
            1
        );
    }

    #[test]
    fn duplicate_names_and_definitions_are_errors() {
        let model = build(
            "begin molecule types\nA()\nend molecule types\n\
             begin observables\nMolecules o1 A()\nMolecules o1 A()\nend observables",
        );
        let report = ModelValidator::new(&model).validate();
        let errors = errors(&report);
        assert!(errors.contains(&"Observable o1: has been defined more than once".to_string()));
        assert!(errors.contains(
            &"Observable o1: BNG definition has been declared more than once".to_string()
        ));
        // Two entities share context and text; the aggregate keeps one of each.
        assert_eq!(errors.len(), 2);
        assert_eq!(report.messages_for(model.observables[1].entity_id).len(), 2);
    }

    #[test]
    fn unnamed_reactions_are_exempt_from_duplicate_name_rule() {
        let model = build(
            "begin parameters\nk 1\nend parameters\n\
             begin molecule types\nA()\nB()\nend molecule types\n\
             begin reaction rules\nA() -> B() k\nB() -> A() k\nend reaction rules",
        );
        let report = ModelValidator::new(&model).validate();
        assert!(report.is_valid(), "{:?}", errors(&report));
    }

    #[test]
    fn reaction_rules_check_rates_and_structures() {
        let model = build(
            "begin compartments\ncyt 3 1\nend compartments\n\
             begin molecule types\nA()\nend molecule types\n\
             begin reaction rules\nr1: A()@cyt <-> A() kf\nr2: A()@nuc -> 0 g()\nend reaction rules",
        );
        let report = ModelValidator::new(&model).validate();
        let errors = errors(&report);
        assert!(errors.contains(&"Reaction r1: missing structures in reaction definition".to_string()));
        assert!(errors.contains(&"Reaction r1: reverse rate is missing".to_string()));
        assert!(errors.contains(&"Reaction r1: kf parameter is not defined in the model".to_string()));
        assert!(errors.contains(&"Reaction r2: nuc structure is not defined in the model".to_string()));
        assert!(errors.contains(&"Reaction r2: g function is not defined in the model".to_string()));
        assert!(!errors.iter().any(|e| e.starts_with("Reaction r2: missing structures")));
    }

    #[test]
    fn species_need_every_concentration_source() {
        let model = ModelBuilder::new()
            .with_id_generator(Arc::new(SequentialIdGenerator::new()))
            .with_conc_sources(vec!["default".into(), "ko".into()])
            .build("begin molecule types\nA()\nend molecule types\nbegin species\nA() c0\nend species")
            .unwrap();
        let report = ModelValidator::new(&model).validate();
        let errors = errors(&report);
        assert_eq!(
            errors,
            vec![
                "Species A: c0 parameter is not defined in the model".to_string(),
                "Species A: ko concentration is missing".to_string(),
            ]
        );
    }

    #[test]
    fn functions_resolve_arguments_observables_and_calls() {
        let model = build(
            "begin parameters\nk 1\nend parameters\n\
             begin molecule types\nA()\nend molecule types\n\
             begin observables\nMolecules Atot A()\nend observables\n\
             begin functions\nf(x) = k * Atot * x + exp(y)\ng() = f(1) + h(2)\nend functions",
        );
        let report = ModelValidator::new(&model).validate();
        assert_eq!(
            errors(&report),
            vec![
                "Function f: y parameter is not defined in the model".to_string(),
                "Function g: h function is not defined in the model".to_string(),
            ]
        );
    }

    #[test]
    fn structure_hierarchy_rules() {
        let mut model = build(
            "begin compartments\na 3 1 b\nb 3 1 a\nc 3 size missing\nd 4 1\nend compartments",
        );
        annotate_structures(&mut model);
        let report = ModelValidator::new(&model).validate();
        assert_eq!(
            errors(&report),
            vec![
                "Structure a: structure hierarchy contains a cycle".to_string(),
                "Structure b: structure hierarchy contains a cycle".to_string(),
                "Structure c: missing structure is not defined in the model".to_string(),
                "Structure c: size parameter is not defined in the model".to_string(),
                "Structure d: dimensional type is missing".to_string(),
            ]
        );
    }

    #[test]
    fn molecule_rules_distinguish_missing_and_invalid_definitions() {
        let mut model = build("begin molecule types\nA\nend molecule types");
        model.molecules.push(model.molecules[0].clone());
        model.molecules[1].name = "B".into();
        model.molecules[1].definition = String::new();
        model.molecules[1].entity_id = SequentialIdGenerator::starting_at(99).next_id();
        let report = ModelValidator::new(&model).validate();
        let errors = errors(&report);
        assert!(errors.contains(&"Molecule A: invalid BNG definition".to_string()));
        assert!(errors.contains(&"Molecule B: BNG definition is missing".to_string()));
        assert!(report.messages.iter().any(|m| m.severity == Severity::Warning
            && m.text == "agent type is missing"));
    }

    #[test]
    fn aggregate_is_bounded_without_changing_validity() {
        let model = build(
            "begin species\nA()@x 1\nB()@y 1\nC()@z 1\nend species",
        );
        let report = ModelValidator::new(&model)
            .with_config(ValidationConfig { max_messages: 2 })
            .validate();
        assert_eq!(report.messages.len(), 2);
        assert!(report.truncated);
        assert!(!report.is_valid());
        assert_eq!(report.entity_messages.len(), 3);
    }

    #[test]
    fn validation_is_deterministic_and_read_only() {
        let model = build(VALID);
        let snapshot = model.clone();
        let first = ModelValidator::new(&model).validate();
        let second = ModelValidator::new(&model).validate();
        assert_eq!(first, second);
        assert_eq!(model, snapshot);
    }

    #[test]
    fn missing_structure_kind_on_hand_built_entity() {
        let mut model = build("");
        model.structures.push(Structure {
            name: "cyt".into(),
            kind: None,
            size: "1".into(),
            parent_name: String::new(),
            annotation: String::new(),
            uni_prot_id: None,
            go_id: None,
            description: None,
            entity_id: SequentialIdGenerator::starting_at(10).next_id(),
        });
        let report = ModelValidator::new(&model).validate();
        assert_eq!(errors(&report), vec!["Structure cyt: dimensional type is missing"]);

        model.structures[0].kind = Some(StructureKind::Compartment);
        assert!(ModelValidator::new(&model).validate().is_valid());
    }
}
