use crate::cli::FmtArgs;
use crate::commands::model_name;
use crate::error::{CliError, Result};
use std::io::Write;
use subcellular::core::io::bngl::{BnglFile, ModelBuilder};
use subcellular::core::io::traits::ModelFile;
use tracing::info;

pub async fn run(args: FmtArgs) -> Result<()> {
    let mut builder = ModelBuilder::new().with_name(model_name(&args.model));
    if !args.conc_sources.is_empty() {
        builder = builder.with_conc_sources(args.conc_sources.clone());
    }
    let file = BnglFile::new(builder);

    let model = file
        .read_from_path(&args.model)
        .map_err(|e| CliError::parsing(&args.model, e))?;
    info!("Parsed {} entities from {:?}", model.entity_count(), &args.model);

    match &args.output {
        Some(path) => {
            file.write_to_path(&model, path)
                .map_err(|e| CliError::parsing(path, e))?;
            println!("✓ Formatted model written to: {}", path.display());
        }
        None => {
            let mut buffer = Vec::new();
            file.write_to(&model, &mut buffer)
                .map_err(|e| CliError::Other(e.into()))?;
            let stdout = std::io::stdout();
            let mut handle = stdout.lock();
            handle.write_all(&buffer)?;
            handle.flush()?;
        }
    }
    Ok(())
}
