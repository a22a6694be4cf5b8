use super::ids::EntityId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Dimensionality of a structure: a 3-D compartment or a 2-D membrane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StructureKind {
    Compartment,
    Membrane,
}

impl StructureKind {
    /// Maps the DSL dimension column (`3` or `2`) to a kind.
    pub fn from_dimensions(dims: &str) -> Option<Self> {
        match dims.trim() {
            "3" => Some(Self::Compartment),
            "2" => Some(Self::Membrane),
            _ => None,
        }
    }

    pub fn dimensions(&self) -> u8 {
        match self {
            Self::Compartment => 3,
            Self::Membrane => 2,
        }
    }

    /// Unit inferred for species and diffusions that live in a structure of this kind.
    pub fn default_species_unit(&self) -> &'static str {
        match self {
            Self::Compartment => "M",
            Self::Membrane => "#",
        }
    }
}

impl fmt::Display for StructureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Compartment => write!(f, "compartment"),
            Self::Membrane => write!(f, "membrane"),
        }
    }
}

impl FromStr for StructureKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "compartment" | "3" => Ok(Self::Compartment),
            "membrane" | "2" => Ok(Self::Membrane),
            other => Err(format!("unknown structure type '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Structure {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: Option<StructureKind>,
    pub size: String,
    /// Empty for root structures.
    #[serde(default)]
    pub parent_name: String,
    #[serde(default)]
    pub annotation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uni_prot_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub go_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub entity_id: EntityId,
}

impl Structure {
    pub fn is_root(&self) -> bool {
        self.parent_name.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Parameter {
    pub name: String,
    pub definition: String,
    #[serde(default)]
    pub annotation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub units: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub references: Option<String>,
    pub entity_id: EntityId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Function {
    pub name: String,
    /// Empty when the function takes no argument.
    #[serde(default)]
    pub argument: String,
    pub definition: String,
    #[serde(default)]
    pub annotation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub units: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub references: Option<String>,
    pub entity_id: EntityId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgentType {
    #[serde(rename = "ion")]
    Ion,
    #[serde(rename = "protein")]
    Protein,
    #[serde(rename = "protein family")]
    ProteinFamily,
    #[serde(rename = "protein multimer")]
    ProteinMultimer,
    #[serde(rename = "metabolite")]
    Metabolite,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Molecule {
    pub name: String,
    pub definition: String,
    #[serde(default)]
    pub annotation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_type: Option<AgentType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gene_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uni_prot_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub go_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pub_chem_id: Option<String>,
    pub entity_id: EntityId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Species {
    pub name: String,
    pub definition: String,
    /// Initial concentration per concentration source.
    pub concentration: BTreeMap<String, String>,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub annotation: String,
    pub entity_id: EntityId,
}

/// Which of the three reaction-line dialects a reaction was written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ReactionKind {
    #[default]
    Unidirectional,
    Bidirectional,
    /// Forward rate is a function giving the total rate of the rule.
    TotalRate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reaction {
    /// May be empty; unnamed reactions are legal.
    #[serde(default)]
    pub name: String,
    pub definition: String,
    pub kf: String,
    #[serde(default)]
    pub kr: String,
    #[serde(default)]
    pub kind: ReactionKind,
    #[serde(default)]
    pub annotation: String,
    pub entity_id: EntityId,
}

impl Reaction {
    pub fn is_bidirectional(&self) -> bool {
        self.kind == ReactionKind::Bidirectional
    }

    /// Left- and right-hand sides of the rule, split on the first arrow.
    pub fn sides(&self) -> Option<(&str, &str)> {
        let (lhs, rhs) = match self.definition.split_once("<->") {
            Some(pair) => pair,
            None => self.definition.split_once("->")?,
        };
        Some((lhs.trim(), rhs.trim()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ObservableKind {
    #[default]
    Molecules,
    Species,
}

impl ObservableKind {
    pub fn keyword(&self) -> &'static str {
        match self {
            Self::Molecules => "Molecules",
            Self::Species => "Species",
        }
    }

    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "Molecules" => Some(Self::Molecules),
            "Species" => Some(Self::Species),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Observable {
    pub name: String,
    #[serde(default)]
    pub kind: ObservableKind,
    pub definition: String,
    #[serde(default)]
    pub annotation: String,
    pub entity_id: EntityId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diffusion {
    pub name: String,
    /// Full pattern as written, including the `@structure` affinity.
    pub definition: String,
    pub species_definition: String,
    pub structure: String,
    pub rate: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub units: Option<String>,
    #[serde(default)]
    pub annotation: String,
    pub entity_id: EntityId,
}

/// The eight entity collections of a model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityType {
    Structure,
    Parameter,
    Function,
    Molecule,
    Species,
    Reaction,
    Observable,
    Diffusion,
}

impl EntityType {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Structure => "Structure",
            Self::Parameter => "Parameter",
            Self::Function => "Function",
            Self::Molecule => "Molecule",
            Self::Species => "Species",
            Self::Reaction => "Reaction",
            Self::Observable => "Observable",
            Self::Diffusion => "Diffusion",
        }
    }

    pub fn collection_name(&self) -> &'static str {
        match self {
            Self::Structure => "structures",
            Self::Parameter => "parameters",
            Self::Function => "functions",
            Self::Molecule => "molecules",
            Self::Species => "species",
            Self::Reaction => "reactions",
            Self::Observable => "observables",
            Self::Diffusion => "diffusions",
        }
    }
}

/// Common view over the entity kinds, used by the collection-wide validation rules.
pub trait Entity {
    const TYPE: EntityType;

    fn name(&self) -> &str;
    fn entity_id(&self) -> EntityId;
    fn definition(&self) -> &str;

    /// Context string attached to validation messages, e.g. `Species A_cyt`.
    fn context(&self) -> String {
        format!("{} {}", Self::TYPE.label(), self.name())
    }
}

macro_rules! impl_entity {
    ($ty:ty, $kind:expr, $def:ident) => {
        impl Entity for $ty {
            const TYPE: EntityType = $kind;

            fn name(&self) -> &str {
                &self.name
            }
            fn entity_id(&self) -> EntityId {
                self.entity_id
            }
            fn definition(&self) -> &str {
                &self.$def
            }
        }
    };
}

impl_entity!(Structure, EntityType::Structure, size);
impl_entity!(Parameter, EntityType::Parameter, definition);
impl_entity!(Function, EntityType::Function, definition);
impl_entity!(Molecule, EntityType::Molecule, definition);
impl_entity!(Species, EntityType::Species, definition);
impl_entity!(Reaction, EntityType::Reaction, definition);
impl_entity!(Observable, EntityType::Observable, definition);
impl_entity!(Diffusion, EntityType::Diffusion, definition);
