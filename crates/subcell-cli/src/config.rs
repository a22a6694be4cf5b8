mod defaults;

use crate::cli::ConfigArgs;
use crate::error::{CliError, Result};
use crate::utils::parser;
use defaults::DefaultsConfig;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use subcellular::core::models::entities::StructureKind;
use subcellular::core::models::mesh::{FreeDiffusionBoundary, MeshMeta, MeshStructure};
use subcellular::engine::config as core_config;
use tracing::debug;

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
struct PartialModelConfig {
    #[serde(rename = "concentration-sources")]
    concentration_sources: Option<Vec<String>>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
struct PartialValidationConfig {
    #[serde(rename = "max-messages")]
    max_messages: Option<usize>,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
struct PartialMeshStructure {
    name: String,
    #[serde(rename = "type")]
    kind: StructureKind,
    #[serde(rename = "tet-idxs", default)]
    tet_idxs: Vec<usize>,
    #[serde(rename = "tri-idxs", default)]
    tri_idxs: Vec<usize>,
}

impl From<PartialMeshStructure> for MeshStructure {
    fn from(p: PartialMeshStructure) -> Self {
        Self {
            name: p.name,
            kind: p.kind,
            tet_idxs: p.tet_idxs,
            tri_idxs: p.tri_idxs,
            size: None,
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
struct PartialFreeDiffusionBoundary {
    name: String,
    #[serde(rename = "tri-idxs", default)]
    tri_idxs: Vec<usize>,
}

impl From<PartialFreeDiffusionBoundary> for FreeDiffusionBoundary {
    fn from(p: PartialFreeDiffusionBoundary) -> Self {
        Self {
            name: p.name,
            tri_idxs: p.tri_idxs,
        }
    }
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
struct PartialMeshConfig {
    nodes: Option<PathBuf>,
    faces: Option<PathBuf>,
    elements: Option<PathBuf>,
    scale: Option<f64>,
    #[serde(rename = "mesh-name-root")]
    mesh_name_root: Option<String>,
    #[serde(default)]
    structures: Vec<PartialMeshStructure>,
    #[serde(rename = "free-diffusion-boundaries", default)]
    free_diffusion_boundaries: Vec<PartialFreeDiffusionBoundary>,
}

impl PartialMeshConfig {
    fn resolve_paths(&mut self, base_dir: &Path) {
        for path in [&mut self.nodes, &mut self.faces, &mut self.elements]
            .into_iter()
            .flatten()
        {
            if path.is_relative() {
                *path = base_dir.join(&*path);
            }
        }
    }
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
struct PartialExtractionConfig {
    #[serde(rename = "parallel-threshold")]
    parallel_threshold: Option<usize>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
struct PartialSamplingConfig {
    #[serde(rename = "max-points")]
    max_points: Option<usize>,
    seed: Option<u64>,
}

/// Project file contents. Every key is optional; missing keys fall back to
/// [`DefaultsConfig`]. Mesh paths in the file are relative to the file's directory.
#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct PartialProjectConfig {
    model: Option<PartialModelConfig>,
    validation: Option<PartialValidationConfig>,
    mesh: Option<PartialMeshConfig>,
    extraction: Option<PartialExtractionConfig>,
    sampling: Option<PartialSamplingConfig>,
}

impl PartialProjectConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content).map_err(|e| CliError::parsing(path, e))?;
        if let Some(mesh) = config.mesh.as_mut() {
            mesh.resolve_paths(path.parent().unwrap_or(Path::new(".")));
        }
        Ok(config)
    }

    /// Reads the config file named by `args` (if any) and applies its `-S` overrides.
    pub fn load(args: &ConfigArgs) -> Result<Self> {
        let mut config = match &args.config {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_set_values(&args.set_values)?;
        Ok(config)
    }

    pub fn has_mesh(&self) -> bool {
        self.mesh.is_some()
    }

    pub fn import_config(
        &self,
        cli_conc_sources: &[String],
        include_mesh: bool,
    ) -> Result<core_config::ImportConfig> {
        let defaults = DefaultsConfig::default();

        let conc_sources = if cli_conc_sources.is_empty() {
            self.model
                .as_ref()
                .and_then(|m| m.concentration_sources.clone())
                .unwrap_or(defaults.conc_sources)
        } else {
            cli_conc_sources.to_vec()
        };
        let max_messages = self
            .validation
            .as_ref()
            .and_then(|v| v.max_messages)
            .unwrap_or(defaults.max_messages);

        let mut builder = core_config::ImportConfigBuilder::new()
            .conc_sources(conc_sources)
            .max_messages(max_messages)
            .parallel_threshold(self.extraction_config().parallel_threshold);

        if include_mesh {
            if let Some(source) = self.mesh_source(None)? {
                builder = builder.mesh(source);
            }
        }

        builder.build().map_err(|e| CliError::Config(e.to_string()))
    }

    pub fn extraction_config(&self) -> core_config::ExtractionConfig {
        core_config::ExtractionConfig {
            parallel_threshold: self
                .extraction
                .as_ref()
                .and_then(|e| e.parallel_threshold)
                .unwrap_or(DefaultsConfig::default().parallel_threshold),
        }
    }

    /// The mesh declared by the `[mesh]` section, or `None` when there is none.
    /// `scale` overrides the file value.
    pub fn mesh_source(&self, scale: Option<f64>) -> Result<Option<core_config::MeshSource>> {
        let Some(mesh) = &self.mesh else {
            return Ok(None);
        };
        let require = |path: &Option<PathBuf>, key: &str| -> Result<PathBuf> {
            path.clone().ok_or_else(|| {
                CliError::Config(format!("`mesh.{}` is required when a mesh is declared.", key))
            })
        };
        let nodes_path = require(&mesh.nodes, "nodes")?;
        let faces_path = require(&mesh.faces, "faces")?;
        let elements_path = require(&mesh.elements, "elements")?;

        let scale = scale
            .or(mesh.scale)
            .unwrap_or(DefaultsConfig::default().scale);
        if !(scale.is_finite() && scale > 0.0) {
            return Err(CliError::Config(format!(
                "`mesh.scale` must be a positive number, got {}",
                scale
            )));
        }

        let mesh_name_root = mesh.mesh_name_root.clone().or_else(|| {
            nodes_path
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
        });

        Ok(Some(core_config::MeshSource {
            nodes_path,
            faces_path,
            elements_path,
            meta: MeshMeta {
                scale,
                mesh_name_root,
                structures: mesh.structures.iter().cloned().map(Into::into).collect(),
                free_diffusion_boundaries: mesh
                    .free_diffusion_boundaries
                    .iter()
                    .cloned()
                    .map(Into::into)
                    .collect(),
            },
        }))
    }

    pub fn sampling_config(
        &self,
        cli_seed: Option<u64>,
        cli_max_points: Option<usize>,
    ) -> Result<core_config::SamplingConfig> {
        let file = self.sampling.clone().unwrap_or_default();
        let mut builder = core_config::SamplingConfigBuilder::new().max_points(
            cli_max_points
                .or(file.max_points)
                .unwrap_or(DefaultsConfig::default().max_points),
        );
        if let Some(seed) = cli_seed.or(file.seed) {
            builder = builder.seed(seed);
        }
        builder.build().map_err(|e| CliError::Config(e.to_string()))
    }

    fn apply_set_values(&mut self, set_values: &[String]) -> Result<()> {
        for kv_pair in set_values {
            let (key, value) =
                parser::parse_assignment(kv_pair).map_err(|e| CliError::Config(e.to_string()))?;
            let invalid = |e: parser::ParseError| CliError::Config(e.to_string());

            match key {
                "model.concentration-sources" => {
                    self.model
                        .get_or_insert_with(Default::default)
                        .concentration_sources = Some(parser::parse_list(value));
                }
                "validation.max-messages" => {
                    self.validation
                        .get_or_insert_with(Default::default)
                        .max_messages =
                        Some(parser::parse_value(key, value, "integer").map_err(invalid)?);
                }
                "mesh.nodes" => {
                    self.mesh.get_or_insert_with(Default::default).nodes = Some(value.into());
                }
                "mesh.faces" => {
                    self.mesh.get_or_insert_with(Default::default).faces = Some(value.into());
                }
                "mesh.elements" => {
                    self.mesh.get_or_insert_with(Default::default).elements = Some(value.into());
                }
                "mesh.scale" => {
                    self.mesh.get_or_insert_with(Default::default).scale =
                        Some(parser::parse_value(key, value, "float").map_err(invalid)?);
                }
                "mesh.mesh-name-root" => {
                    self.mesh.get_or_insert_with(Default::default).mesh_name_root =
                        Some(value.to_string());
                }
                "extraction.parallel-threshold" => {
                    self.extraction
                        .get_or_insert_with(Default::default)
                        .parallel_threshold =
                        Some(parser::parse_value(key, value, "integer").map_err(invalid)?);
                }
                "sampling.max-points" => {
                    self.sampling
                        .get_or_insert_with(Default::default)
                        .max_points =
                        Some(parser::parse_value(key, value, "integer").map_err(invalid)?);
                }
                "sampling.seed" => {
                    self.sampling.get_or_insert_with(Default::default).seed =
                        Some(parser::parse_value(key, value, "integer").map_err(invalid)?);
                }
                _ => {
                    return Err(CliError::Config(format!(
                        "Unsupported configuration key for --set: '{}'",
                        key
                    )));
                }
            }
        }
        Ok(())
    }
}
