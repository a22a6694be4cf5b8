use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "Subcellular Platform Developers",
    version,
    about = "subcell - check, format and import spatial reaction-network models, ingest TetGen meshes and scatter simulated molecule counts.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Set the number of threads used for surface extraction.
    /// Defaults to the number of available logical cores.
    #[arg(short = 'j', long, global = true, value_name = "NUM")]
    pub threads: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build and validate a model file, printing every validation message.
    Check(CheckArgs),
    /// Re-write a model file in canonical section order and layout.
    Fmt(FmtArgs),
    /// Build, validate and (optionally) attach a meshed geometry, writing the model as JSON.
    Import(ImportArgs),
    /// Ingest a TetGen mesh and extract the surface of every structure.
    Mesh(MeshArgs),
    /// Scatter per-simplex molecule counts into renderable points.
    Scatter(ScatterArgs),
}

/// Project configuration shared by the subcommands.
#[derive(Args, Debug, Default, Clone)]
pub struct ConfigArgs {
    /// Path to the project configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S validation.max-messages=50
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

/// Arguments for the `check` subcommand.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Path to the model file.
    #[arg(required = true, value_name = "MODEL")]
    pub model: PathBuf,

    #[command(flatten)]
    pub config: ConfigArgs,

    /// Override the concentration sources species values are assigned to, in column order.
    #[arg(long = "conc-source", value_name = "NAME")]
    pub conc_sources: Vec<String>,

    /// Only print error-severity messages.
    #[arg(long)]
    pub errors_only: bool,

    /// Print the validation report as JSON instead of text.
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `fmt` subcommand.
#[derive(Args, Debug)]
pub struct FmtArgs {
    /// Path to the model file.
    #[arg(required = true, value_name = "MODEL")]
    pub model: PathBuf,

    /// Output path. The formatted model is printed to stdout when omitted.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Override the concentration sources species values are assigned to, in column order.
    #[arg(long = "conc-source", value_name = "NAME")]
    pub conc_sources: Vec<String>,
}

/// Arguments for the `import` subcommand.
#[derive(Args, Debug)]
pub struct ImportArgs {
    /// Path to the model file.
    #[arg(required = true, value_name = "MODEL")]
    pub model: PathBuf,

    /// Path for the JSON output.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub output: PathBuf,

    #[command(flatten)]
    pub config: ConfigArgs,

    /// Override the concentration sources species values are assigned to, in column order.
    #[arg(long = "conc-source", value_name = "NAME")]
    pub conc_sources: Vec<String>,

    /// Skip the mesh even if the config file declares one.
    #[arg(long)]
    pub no_mesh: bool,

    /// Fail instead of writing the output when the model has validation errors.
    #[arg(long)]
    pub strict: bool,
}

/// Arguments for the `mesh` subcommand.
#[derive(Args, Debug)]
pub struct MeshArgs {
    /// Path for the JSON output.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub output: PathBuf,

    #[command(flatten)]
    pub config: ConfigArgs,

    /// Override the mesh scale from the config file.
    #[arg(long, value_name = "FLOAT")]
    pub scale: Option<f64>,
}

/// Arguments for the `scatter` subcommand.
#[derive(Args, Debug)]
pub struct ScatterArgs {
    /// CSV file with `structure,molecule,simplex,count` rows.
    #[arg(long, required = true, value_name = "PATH")]
    pub counts: PathBuf,

    /// Path for the CSV point output.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub output: PathBuf,

    #[command(flatten)]
    pub config: ConfigArgs,

    /// Seed for the random number generator. Runs with the same seed are reproducible.
    #[arg(long, value_name = "INT")]
    pub seed: Option<u64>,

    /// Override the maximum number of points written.
    #[arg(long, value_name = "INT")]
    pub max_points: Option<usize>,
}
