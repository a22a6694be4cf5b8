use super::entities::{
    Diffusion, Function, Molecule, Observable, Parameter, Reaction, Species, Structure,
};
use super::ids::EntityId;
use super::mesh::Mesh;
use serde::{Deserialize, Serialize};

/// Name of the concentration source every new model starts with.
pub const DEFAULT_CONC_SOURCE: &str = "default";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelConfig {
    /// Registered concentration sources, in the order species values are assigned.
    pub conc_sources: Vec<String>,
    pub visible_conc_sources: Vec<String>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self::with_sources(vec![DEFAULT_CONC_SOURCE.to_string()])
    }
}

impl ModelConfig {
    pub fn with_sources(sources: Vec<String>) -> Self {
        Self {
            visible_conc_sources: sources.clone(),
            conc_sources: sources,
        }
    }
}

/// Reference to a simulation run against this model. Simulation execution lives elsewhere;
/// the model only carries the link so the serialized tree keeps its shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationRef {
    pub name: String,
    pub entity_id: EntityId,
}

/// A complete spatial reaction-network model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Model {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub annotation: String,
    #[serde(default)]
    pub config: ModelConfig,
    #[serde(default)]
    pub structures: Vec<Structure>,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    #[serde(default)]
    pub functions: Vec<Function>,
    #[serde(default)]
    pub molecules: Vec<Molecule>,
    #[serde(default)]
    pub species: Vec<Species>,
    #[serde(default)]
    pub reactions: Vec<Reaction>,
    #[serde(default)]
    pub observables: Vec<Observable>,
    #[serde(default)]
    pub diffusions: Vec<Diffusion>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mesh: Option<Mesh>,
    #[serde(default)]
    pub simulations: Vec<SimulationRef>,
}

impl Model {
    pub fn empty(id: EntityId, config: ModelConfig) -> Self {
        Self {
            id,
            name: String::new(),
            annotation: String::new(),
            config,
            structures: Vec::new(),
            parameters: Vec::new(),
            functions: Vec::new(),
            molecules: Vec::new(),
            species: Vec::new(),
            reactions: Vec::new(),
            observables: Vec::new(),
            diffusions: Vec::new(),
            mesh: None,
            simulations: Vec::new(),
        }
    }

    pub fn structure(&self, name: &str) -> Option<&Structure> {
        self.structures.iter().find(|s| s.name == name)
    }

    pub fn parameter(&self, name: &str) -> Option<&Parameter> {
        self.parameters.iter().find(|p| p.name == name)
    }

    pub fn entity_count(&self) -> usize {
        self.structures.len()
            + self.parameters.len()
            + self.functions.len()
            + self.molecules.len()
            + self.species.len()
            + self.reactions.len()
            + self.observables.len()
            + self.diffusions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entity_count() == 0
    }
}
