use crate::core::io::bngl::ModelBuilder;
use crate::core::io::tetgen::TetGenMesh;
use crate::core::models::ids::{IdGenerator, RandomIdGenerator};
use crate::core::models::mesh::Mesh;
use crate::core::models::model::Model;
use crate::engine::config::{ExtractionConfig, ImportConfig, MeshSource};
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::surface::{SurfaceExtractor, structure_size};
use crate::engine::validation::{ModelValidator, ValidationReport};
use std::sync::Arc;
use tracing::{info, instrument, warn};

#[derive(Debug, Clone)]
pub struct ImportResult {
    /// The built model, with the ingested mesh attached when one was configured.
    pub model: Model,
    pub report: ValidationReport,
}

/// Imports model text with randomly generated entity ids.
pub fn run(
    text: &str,
    config: &ImportConfig,
    reporter: &ProgressReporter,
) -> Result<ImportResult, EngineError> {
    run_with_ids(text, config, Arc::new(RandomIdGenerator), reporter)
}

#[instrument(skip_all, name = "import_workflow")]
pub fn run_with_ids(
    text: &str,
    config: &ImportConfig,
    ids: Arc<dyn IdGenerator>,
    reporter: &ProgressReporter,
) -> Result<ImportResult, EngineError> {
    // === Phase 1: Build ===
    reporter.report(Progress::PhaseStart { name: "Model Build" });
    let builder = ModelBuilder::new()
        .with_name(config.model_name.clone())
        .with_id_generator(ids)
        .with_conc_sources(config.conc_sources.clone());
    let mut model = builder.build(text)?;
    reporter.report(Progress::PhaseFinish);

    // === Phase 2: Validation ===
    reporter.report(Progress::PhaseStart { name: "Validation" });
    let report = ModelValidator::new(&model)
        .with_config(config.validation.clone())
        .validate();
    reporter.report(Progress::StatusUpdate {
        text: format!(
            "{} message(s), model is {}",
            report.messages.len(),
            if report.is_valid() { "valid" } else { "invalid" }
        ),
    });
    reporter.report(Progress::PhaseFinish);

    // === Phase 3: Mesh (optional) ===
    if let Some(source) = &config.mesh {
        let mesh = load_mesh(source, &config.extraction, reporter)?;
        report_unmatched_structures(&model, &mesh, reporter);
        model.mesh = Some(mesh);
    }

    info!(
        entities = model.entity_count(),
        valid = report.is_valid(),
        with_mesh = model.mesh.is_some(),
        "Import complete"
    );
    Ok(ImportResult { model, report })
}

/// Ingests the TetGen tables of `source`, checks the structure assignment against them,
/// extracts every structure surface and fills in structure sizes.
#[instrument(skip_all, name = "mesh_workflow")]
pub fn load_mesh(
    source: &MeshSource,
    extraction: &ExtractionConfig,
    reporter: &ProgressReporter,
) -> Result<Mesh, EngineError> {
    reporter.report(Progress::PhaseStart {
        name: "Mesh Ingestion",
    });
    let volume =
        TetGenMesh::read_from_paths(&source.nodes_path, &source.faces_path, &source.elements_path)?;
    let mut mesh = Mesh::new(source.meta.clone(), volume);
    mesh.check_indices()?;
    info!(
        nodes = mesh.volume().node_count(),
        faces = mesh.volume().faces.len(),
        elements = mesh.volume().elements.len(),
        "Mesh ingested"
    );
    reporter.report(Progress::PhaseFinish);

    reporter.report(Progress::PhaseStart {
        name: "Surface Extraction",
    });
    let surfaces = SurfaceExtractor::extract_all(&mesh, extraction, reporter)?;
    let scale = mesh.meta.scale;
    let sizes = mesh
        .meta
        .structures
        .iter()
        .map(|s| structure_size(mesh.volume(), s, scale))
        .collect::<Result<Vec<_>, _>>()?;
    for (structure, size) in mesh.meta.structures.iter_mut().zip(sizes) {
        structure.size = Some(size);
    }
    mesh.mesh.surface = surfaces;
    reporter.report(Progress::PhaseFinish);

    Ok(mesh)
}

fn report_unmatched_structures(model: &Model, mesh: &Mesh, reporter: &ProgressReporter) {
    for structure in &model.structures {
        if mesh.meta.structure(&structure.name).is_none() {
            warn!(structure = %structure.name, "Model structure has no mesh assignment");
            reporter.report(Progress::Message(format!(
                "structure '{}' has no mesh assignment",
                structure.name
            )));
        }
    }
    for structure in &mesh.meta.structures {
        if model
            .structures
            .iter()
            .all(|s| !s.name.eq_ignore_ascii_case(&structure.name))
        {
            warn!(structure = %structure.name, "Mesh structure is not declared in the model");
            reporter.report(Progress::Message(format!(
                "mesh structure '{}' is not declared in the model",
                structure.name
            )));
        }
    }
}
