//! TIFF Inspector - Metadata reports for TIFF and BigTIFF files.
//!
//! This binary reads one file, builds its report and prints the requested view.

use clap::Parser;
use std::process::ExitCode;
use tracing::{debug, error};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tiff_inspector::{
    config::{Config, OutputFormat},
    describe::Description,
    inspect_file, InspectError, Report, SchemaSet,
};

#[tokio::main]
async fn main() -> ExitCode {
    let config = Config::parse();

    init_logging(config.verbose);

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    match run(&config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let report = load_report(config).await?;

    match config.output {
        OutputFormat::Json => println!("{}", report.to_json(!config.compact)?),
        OutputFormat::Structure => {
            for line in report.structure_lines() {
                println!("{}", line);
            }
        }
        OutputFormat::Descriptions => print_descriptions(&report, config)?,
    }

    Ok(())
}

/// Load the schemas, build the report and apply the configured views.
async fn load_report(config: &Config) -> Result<Report, InspectError> {
    let schemas = match config.schema_dir {
        Some(ref dir) => SchemaSet::from_dir(dir)?,
        None => SchemaSet::embedded()?,
    };

    let mut report = inspect_file(&config.path, &schemas).await?;

    if let Some(ref selector) = config.series {
        debug!(%selector, "Selecting series");
        report = report.select_series(selector)?;
    }
    if let Some(ref selector) = config.levels {
        debug!(%selector, "Selecting levels");
        report = report.select_levels(selector)?;
    }

    Ok(report)
}

/// Print every ImageDescription, XML pruned to the configured depth if any.
fn print_descriptions(report: &Report, config: &Config) -> serde_json::Result<()> {
    let max_text_length = Some(config.text_limit());

    for found in report.image_descriptions() {
        let description = Description::parse(found.text);
        println!(
            "Series {} Level {} Page {} ({})",
            found.series,
            found.level,
            found.page,
            description.kind()
        );

        match description {
            Description::Xml(_) => {
                let rendered = description.render(config.depth_limit(), max_text_length);
                if config.compact {
                    println!("{}", serde_json::to_string(&rendered)?);
                } else {
                    println!("{}", serde_json::to_string_pretty(&rendered)?);
                }
            }
            Description::Plain(ref text) => {
                println!("{}", tiff_inspector::truncate_text(text, max_text_length));
            }
        }
    }

    Ok(())
}

/// Initialize the tracing/logging subsystem.
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "tiff_inspector=debug"
    } else {
        "tiff_inspector=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
