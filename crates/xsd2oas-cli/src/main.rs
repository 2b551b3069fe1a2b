//! xsd2oas CLI - convert XML Schemas into OpenAPI documents
//!
//! This is the main entry point for the xsd2oas command, which reads an XSD,
//! writes the OpenAPI YAML and, on request, a sample JSON document and the
//! list of included element paths.

mod cli;
mod config;
mod error;
mod handlers;
mod logging;
mod output;

use cli::Cli;
use colored::control;
use config::Config;
use error::Result;
use handlers::ConvertOptions;
use logging::{timing::Timer, LoggingConfig};
use output::OutputWriter;
use std::process;
use tracing::instrument;

fn main() {
    // Parse command-line arguments
    let cli = match Cli::try_parse_args() {
        Ok(cli) => cli,
        Err(e) => {
            // Help and version requests print to stdout and succeed
            let _ = e.print();
            process::exit(if e.use_stderr() { error::EXIT_USAGE } else { 0 });
        }
    };

    // Set up colored output
    control::set_override(cli.use_color());

    // Initialize logging
    if let Err(e) = init_logging(&cli) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    match run(cli) {
        Ok(()) => process::exit(0),
        Err(e) => {
            eprintln!("{}", error::format_error(&e, control::SHOULD_COLORIZE.should_colorize()));

            if e.should_show_help() {
                eprintln!("\nFor more information, try '--help'");
            }

            process::exit(e.exit_code());
        }
    }
}

/// Main application logic
#[instrument(skip(cli), fields(verbosity = cli.verbosity_level()))]
fn run(cli: Cli) -> Result<()> {
    if let Some(shell) = cli.generate_completions {
        return handlers::handle_completions(shell);
    }

    let timer = Timer::new("cli_execution");

    let config = {
        let _config_timer = Timer::new("config_loading");
        tracing::info!("Loading configuration");
        Config::load_with_file(cli.config.as_deref())?
    };

    let options = ConvertOptions::resolve(&cli, &config)?;
    let mut output = OutputWriter::new(cli.use_color(), cli.quiet);
    handlers::handle_convert(&options, &mut output)?;

    tracing::info!(elapsed_ms = timer.elapsed().as_millis() as u64, "Conversion finished");
    Ok(())
}

/// Initialize the logging system
fn init_logging(cli: &Cli) -> Result<()> {
    // Create logging configuration from CLI args and environment
    let mut logging_config = LoggingConfig::from_verbosity(cli.verbosity_level());

    // Apply environment overrides
    logging_config.merge_with_env();

    // The flag beats the environment
    if let Some(format) = cli.log_format {
        logging_config.format = format;
    }

    // If quiet mode, only log errors
    if cli.quiet {
        logging_config.level = "error".to_string();
        logging_config.console = false;
    }

    logging::init_logging(logging_config)
}
