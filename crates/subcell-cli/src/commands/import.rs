use crate::cli::ImportArgs;
use crate::commands::{model_name, read_model_text, write_json};
use crate::config::PartialProjectConfig;
use crate::error::{CliError, Result};
use crate::ui::UiEvent;
use crate::utils::progress::CliProgressHandler;
use subcellular::engine::error::EngineError;
use subcellular::engine::validation::Severity;
use subcellular::workflows;
use tokio::sync::mpsc;
use tracing::{info, warn};

pub async fn run(args: ImportArgs, ui_sender: mpsc::Sender<UiEvent>) -> Result<()> {
    let partial_config = PartialProjectConfig::load(&args.config)?;
    info!("Merging configuration from file and CLI arguments...");
    let mut final_config = partial_config.import_config(&args.conc_sources, !args.no_mesh)?;
    final_config.model_name = model_name(&args.model);
    if args.no_mesh && partial_config.has_mesh() {
        info!("Mesh declared in the configuration is skipped (--no-mesh).");
    }

    let text = read_model_text(&args.model)?;

    let reporter = CliProgressHandler::new(ui_sender).reporter();

    println!("Starting model import...");
    let result = tokio::task::block_in_place(|| {
        workflows::import::run(&text, &final_config, &reporter)
    })
    .map_err(|e| match e {
        EngineError::Build { source } => CliError::parsing(&args.model, source),
        other => CliError::Core(other),
    })?;

    let errors = result.report.count(Severity::Error);
    let warnings = result.report.count(Severity::Warning);
    info!(
        "Workflow finished: {} entities, {} error(s), {} warning(s).",
        result.model.entity_count(),
        errors,
        warnings
    );

    if !result.report.is_valid() {
        if args.strict {
            return Err(CliError::InvalidModel {
                path: args.model,
                errors,
            });
        }
        warn!("Model has {} validation error(s); writing it anyway.", errors);
        println!(
            "Warning: model has {} validation error(s). Run `subcell check` for details.",
            errors
        );
    }

    write_json(&args.output, &result.model)?;
    println!(
        "✓ Model with {} entities{} written to: {}",
        result.model.entity_count(),
        if result.model.mesh.is_some() { " and mesh" } else { "" },
        args.output.display()
    );

    Ok(())
}
