//! cascade's main application entry point.
//! Parses the command line and dispatches to the selected command.

use anyhow::{bail, Context};
use cascade::{
    cli::{get_args, Command, GenerateArgs},
    generate,
    logger::init_logger,
};

/// Main application entry point.
fn main() {
    let args = get_args();
    init_logger(args.verbose);

    let result = match args.command {
        Command::Generate(generate_args) => run_generate(generate_args),
    };

    if let Err(err) = result {
        eprintln!("{err:#}");
        std::process::exit(1);
    }
}

/// Runs the `generate` command.
///
/// # Errors
/// * When the build is aborted, e.g. the site configuration is missing
/// * When any file failed, so partial builds never pass silently
fn run_generate(args: GenerateArgs) -> anyhow::Result<()> {
    let report = generate(&args.source_dir, &args.dest_dir, &args.site_config)
        .with_context(|| format!("Failed to build '{}'", args.source_dir.display()))?;

    println!(
        "Generated {}: {} rendered, {} copied, {} renamed, {} skipped, {} failed.",
        args.dest_dir.display(),
        report.rendered(),
        report.copied(),
        report.renamed(),
        report.skipped(),
        report.failed()
    );

    if !report.is_success() {
        for failure in report.failures() {
            eprintln!("failed: {}", failure.source.display());
        }
        for err in &report.walk_errors {
            eprintln!("failed: {err}");
        }
        bail!("{} file(s) could not be generated", report.failed());
    }
    Ok(())
}
