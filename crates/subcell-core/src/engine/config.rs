use crate::core::models::mesh::MeshMeta;
use crate::core::models::model::DEFAULT_CONC_SOURCE;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("Invalid value for {name}: {reason}")]
    InvalidValue { name: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationConfig {
    /// Upper bound on the aggregate message list.
    pub max_messages: usize,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self { max_messages: 1000 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionConfig {
    /// Structure count from which surfaces are extracted in parallel.
    pub parallel_threshold: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            parallel_threshold: 4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SamplingConfig {
    pub max_points: usize,
    pub seed: Option<u64>,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            max_points: 30_000,
            seed: None,
        }
    }
}

/// Location of the three TetGen tables plus the structure assignment for a mesh.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshSource {
    pub nodes_path: PathBuf,
    pub faces_path: PathBuf,
    pub elements_path: PathBuf,
    pub meta: MeshMeta,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImportConfig {
    /// Name given to the built model.
    pub model_name: String,
    pub conc_sources: Vec<String>,
    pub validation: ValidationConfig,
    pub extraction: ExtractionConfig,
    pub mesh: Option<MeshSource>,
}

#[derive(Default)]
pub struct ImportConfigBuilder {
    model_name: Option<String>,
    conc_sources: Option<Vec<String>>,
    max_messages: Option<usize>,
    parallel_threshold: Option<usize>,
    mesh: Option<MeshSource>,
}

impl ImportConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn model_name(mut self, name: impl Into<String>) -> Self {
        self.model_name = Some(name.into());
        self
    }

    pub fn conc_sources(mut self, sources: Vec<String>) -> Self {
        self.conc_sources = Some(sources);
        self
    }
    pub fn max_messages(mut self, max: usize) -> Self {
        self.max_messages = Some(max);
        self
    }
    pub fn parallel_threshold(mut self, threshold: usize) -> Self {
        self.parallel_threshold = Some(threshold);
        self
    }
    pub fn mesh(mut self, mesh: MeshSource) -> Self {
        self.mesh = Some(mesh);
        self
    }

    pub fn build(self) -> Result<ImportConfig, ConfigError> {
        let conc_sources = self
            .conc_sources
            .unwrap_or_else(|| vec![DEFAULT_CONC_SOURCE.to_string()]);
        if conc_sources.is_empty() {
            return Err(ConfigError::InvalidValue {
                name: "conc_sources",
                reason: "at least one concentration source is required".to_string(),
            });
        }
        if let Some(duplicate) = conc_sources
            .iter()
            .enumerate()
            .find(|(i, s)| conc_sources[..*i].contains(*s))
            .map(|(_, s)| s)
        {
            return Err(ConfigError::InvalidValue {
                name: "conc_sources",
                reason: format!("'{}' is listed more than once", duplicate),
            });
        }

        let validation = ValidationConfig {
            max_messages: self
                .max_messages
                .unwrap_or(ValidationConfig::default().max_messages),
        };
        if validation.max_messages == 0 {
            return Err(ConfigError::InvalidValue {
                name: "max_messages",
                reason: "must be greater than zero".to_string(),
            });
        }

        let extraction = ExtractionConfig {
            parallel_threshold: self
                .parallel_threshold
                .unwrap_or(ExtractionConfig::default().parallel_threshold),
        };

        if let Some(mesh) = &self.mesh {
            if !(mesh.meta.scale.is_finite() && mesh.meta.scale > 0.0) {
                return Err(ConfigError::InvalidValue {
                    name: "scale",
                    reason: format!("{} is not a positive number", mesh.meta.scale),
                });
            }
        }

        Ok(ImportConfig {
            model_name: self.model_name.unwrap_or_default(),
            conc_sources,
            validation,
            extraction,
            mesh: self.mesh,
        })
    }
}

#[derive(Default)]
pub struct SamplingConfigBuilder {
    max_points: Option<usize>,
    seed: Option<u64>,
}

impl SamplingConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_points(mut self, max: usize) -> Self {
        self.max_points = Some(max);
        self
    }
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn build(self) -> Result<SamplingConfig, ConfigError> {
        let max_points = self
            .max_points
            .ok_or(ConfigError::MissingParameter("max_points"))?;
        if max_points == 0 {
            return Err(ConfigError::InvalidValue {
                name: "max_points",
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(SamplingConfig {
            max_points,
            seed: self.seed,
        })
    }
}
