use crate::cli::ScatterArgs;
use crate::commands::mesh::load_project_mesh;
use crate::config::PartialProjectConfig;
use crate::error::{CliError, Result};
use crate::ui::UiEvent;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::fs::File;
use std::io::BufWriter;
use subcellular::core::io::occupancy::{read_spatial_sample, write_points};
use subcellular::workflows;
use tokio::sync::mpsc;
use tracing::info;

pub async fn run(args: ScatterArgs, ui_sender: mpsc::Sender<UiEvent>) -> Result<()> {
    let config = PartialProjectConfig::load(&args.config)?;
    let sampling = config.sampling_config(args.seed, args.max_points)?;

    info!("Loading molecule counts from {:?}", &args.counts);
    let counts = File::open(&args.counts).map_err(|e| CliError::parsing(&args.counts, e))?;
    let sample = read_spatial_sample(counts).map_err(|e| CliError::parsing(&args.counts, e))?;
    info!(
        "{} row(s) with {} molecule(s) in total.",
        sample.records.len(),
        sample.total_count()
    );

    let mesh = load_project_mesh(&config, None, ui_sender)?;

    let mut rng = match sampling.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let points = workflows::scatter::run(&mesh, &sample, &sampling, &mut rng)?;

    let writer = BufWriter::new(File::create(&args.output)?);
    write_points(writer, &points).map_err(|e| CliError::parsing(&args.output, e))?;
    println!(
        "✓ {} point(s) written to: {}",
        points.len(),
        args.output.display()
    );
    Ok(())
}
