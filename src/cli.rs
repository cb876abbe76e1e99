//! Command-line interface implementation for cascade.
//! Provides argument parsing and help text formatting using clap.

use clap::{error::ErrorKind, Args, CommandFactory, Parser, Subcommand};
use std::path::PathBuf;

use crate::constants::SITE_CONFIG_FILE;

/// Command-line arguments structure for cascade.
#[derive(Parser, Debug)]
#[command(author, version, about = "cascade: static site builder with cascading configuration", long_about = None)]
pub struct Cli {
    /// Enable verbose logging output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands. Adding a command means adding a variant here.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate the website from input files
    Generate(GenerateArgs),
}

/// Arguments of the `generate` command.
#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Site configuration file, relative to the source directory
    #[arg(short = 'c', long, value_name = "FILENAME", default_value = SITE_CONFIG_FILE)]
    pub site_config: PathBuf,

    /// Source directory
    #[arg(value_name = "SOURCE_DIR")]
    pub source_dir: PathBuf,

    /// Destination directory
    #[arg(value_name = "DEST_DIR")]
    pub dest_dir: PathBuf,
}

/// Parses command line arguments and returns the Cli structure.
///
/// # Exits
/// * With status code 1 and the help text if arguments are missing
/// * With clap's default error handling for other argument errors
pub fn get_args() -> Cli {
    match Cli::try_parse() {
        Ok(args) => args,
        Err(e) => match e.kind() {
            ErrorKind::MissingRequiredArgument
            | ErrorKind::MissingSubcommand
            | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
                // Nothing sensible to do if stdout is gone.
                let _ = Cli::command()
                    .help_template(
                        r#"{about-section}
{usage-heading} {usage}

{all-args}
{after-help}
"#,
                    )
                    .print_help();
                std::process::exit(1);
            }
            _ => e.exit(),
        },
    }
}
