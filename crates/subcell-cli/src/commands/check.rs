use crate::cli::CheckArgs;
use crate::commands::{model_name, read_model_text};
use crate::config::PartialProjectConfig;
use crate::error::{CliError, Result};
use std::fmt::Write;
use subcellular::core::io::bngl::ModelBuilder;
use subcellular::engine::validation::{ModelValidator, Severity, ValidationReport};
use tracing::info;

pub async fn run(args: CheckArgs) -> Result<()> {
    let config = PartialProjectConfig::load(&args.config)?;
    let import_config = config.import_config(&args.conc_sources, false)?;

    let text = read_model_text(&args.model)?;
    let model = ModelBuilder::new()
        .with_name(model_name(&args.model))
        .with_conc_sources(import_config.conc_sources.clone())
        .build(&text)
        .map_err(|e| CliError::parsing(&args.model, e))?;

    info!("Validating {} entities...", model.entity_count());
    let report = ModelValidator::new(&model)
        .with_config(import_config.validation)
        .validate();

    if args.json {
        let json = serde_json::to_string_pretty(&report)
            .map_err(|e| CliError::Other(e.into()))?;
        println!("{}", json);
    } else {
        print!("{}", render_report(&report, args.errors_only));
    }

    if report.is_valid() {
        Ok(())
    } else {
        Err(CliError::InvalidModel {
            path: args.model,
            errors: report.count(Severity::Error),
        })
    }
}

/// Human-readable report: one line per message, then a summary line.
pub fn render_report(report: &ValidationReport, errors_only: bool) -> String {
    let mut out = String::new();
    for message in &report.messages {
        if errors_only && !message.is_error() {
            continue;
        }
        let _ = writeln!(out, "{}", message);
    }
    if report.truncated {
        let _ = writeln!(out, "... further messages omitted");
    }
    let _ = writeln!(
        out,
        "{}: {} error(s), {} warning(s), {} info",
        if report.is_valid() { "valid" } else { "invalid" },
        report.count(Severity::Error),
        report.count(Severity::Warning),
        report.count(Severity::Info),
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;
    use std::path::Path;
    use tempfile::tempdir;

    fn check_args(model: &Path, extra: &[&str]) -> CheckArgs {
        let mut args = vec!["subcell", "check", model.to_str().unwrap()];
        args.extend_from_slice(extra);
        match Cli::parse_from(args).command {
            Commands::Check(args) => args,
            _ => panic!("Expected 'check' subcommand"),
        }
    }

    #[tokio::test]
    async fn valid_model_passes() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ok.bngl");
        std::fs::write(&path, "begin parameters\nk1 1.0\nend parameters\n").unwrap();
        run(check_args(&path, &[])).await.unwrap();
    }

    #[tokio::test]
    async fn invalid_model_reports_error_count() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.bngl");
        std::fs::write(
            &path,
            "begin molecule types\nA()\nend molecule types\nbegin species\nA()@cyt 1\nend species\n",
        )
        .unwrap();
        let err = run(check_args(&path, &["--errors-only"])).await.unwrap_err();
        assert!(matches!(err, CliError::InvalidModel { errors: 1, .. }));
    }

    #[tokio::test]
    async fn malformed_model_is_a_parsing_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.bngl");
        std::fs::write(&path, "begin species\nA() 1\n").unwrap();
        let err = run(check_args(&path, &[])).await.unwrap_err();
        assert!(matches!(err, CliError::FileParsing { .. }));
    }

    #[test]
    fn render_report_filters_and_summarizes() {
        let model = ModelBuilder::new()
            .build("begin compartments\ncyt 3 1\nend compartments\nbegin species\nA()@cyt 1\nend species")
            .unwrap();
        let report = ModelValidator::new(&model).validate();

        let all = render_report(&report, false);
        assert!(all.contains("[warning] Structure cyt: GO id is missing"));
        assert!(all.ends_with("invalid: 1 error(s), 2 warning(s), 1 info\n"));

        let errors = render_report(&report, true);
        assert!(!errors.contains("[warning]"));
        assert!(errors.contains("[error] Species A_cyt: A molecule is not defined in the model"));
    }
}
