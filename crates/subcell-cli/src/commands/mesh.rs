use crate::cli::MeshArgs;
use crate::commands::write_json;
use crate::config::PartialProjectConfig;
use crate::error::{CliError, Result};
use crate::ui::UiEvent;
use crate::utils::progress::CliProgressHandler;
use subcellular::core::models::mesh::Mesh;
use subcellular::workflows;
use tokio::sync::mpsc;
use tracing::info;

/// Resolves the project's `[mesh]` section and runs ingestion plus surface extraction.
pub(crate) fn load_project_mesh(
    config: &PartialProjectConfig,
    scale: Option<f64>,
    ui_sender: mpsc::Sender<UiEvent>,
) -> Result<Mesh> {
    let source = config.mesh_source(scale)?.ok_or_else(|| {
        CliError::Config("no [mesh] section in the configuration; pass one with -c".to_string())
    })?;
    let extraction = config.extraction_config();
    let reporter = CliProgressHandler::new(ui_sender).reporter();

    let mesh = tokio::task::block_in_place(|| {
        workflows::import::load_mesh(&source, &extraction, &reporter)
    })?;
    info!(
        "Mesh ready: {} node(s), {} structure(s).",
        mesh.volume().node_count(),
        mesh.meta.structures.len()
    );
    Ok(mesh)
}

pub async fn run(args: MeshArgs, ui_sender: mpsc::Sender<UiEvent>) -> Result<()> {
    let config = PartialProjectConfig::load(&args.config)?;

    println!("Starting mesh ingestion...");
    let mesh = load_project_mesh(&config, args.scale, ui_sender)?;

    write_json(&args.output, &mesh)?;
    println!(
        "✓ Mesh with {} surface(s) written to: {}",
        mesh.mesh.surface.len(),
        args.output.display()
    );
    Ok(())
}
