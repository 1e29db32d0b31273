//! Axon CLI library
//!
//! This module contains the core CLI logic for the Axon diagram tool.

pub mod error_adapter;

mod args;
mod config;

pub use args::{Args, MeasureKind};
pub use error_adapter::ErrorAdapter;

use std::fs;

use log::{debug, info};

use axon::{
    AxonError, Session,
    config::AppConfig,
    text::{CosmicTextMeasure, FixedAdvanceMeasure},
};

fn new_session(config: AppConfig, measure: MeasureKind) -> Session {
    match measure {
        MeasureKind::Font => Session::new(config, CosmicTextMeasure::new()),
        MeasureKind::Fixed => Session::new(config, FixedAdvanceMeasure::default()),
    }
}

/// Run the Axon CLI application
///
/// This function loads the input document, scaffolds layers missing their
/// mandatory attributes, lays the diagram out, and writes the normalized
/// document to the output file.
///
/// # Arguments
///
/// * `args` - Command-line arguments
///
/// # Errors
///
/// Returns `AxonError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - Invalid JSON or records
/// - Relationships breaking a connection rule
pub fn run(args: &Args) -> Result<(), AxonError> {
    info!(
        input_path = args.input,
        output_path = args.output;
        "Processing diagram"
    );

    let app_config = config::load_config(args.config.as_ref())?;

    let source = fs::read_to_string(&args.input)?;

    let mut session = new_session(app_config, args.measure);
    session.load_json(&source)?;

    let scaffolded = session.scaffold_all();
    debug!(attributes = scaffolded; "Scaffolded layers without attributes");

    session.layout();

    let output = session.save_json()?;
    fs::write(&args.output, output)?;

    info!(
        output_file = args.output,
        elements = session.diagram().len();
        "Document exported successfully"
    );

    Ok(())
}
