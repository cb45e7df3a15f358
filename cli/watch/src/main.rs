//! bf-watch CLI
//!
//! Bucket change detection and single-object transfers for S3.

use clap::Parser;

mod args;
mod run;

use args::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    // Logs go to stderr, so stdout carries only emitted messages
    bf_cli_common::init_logging(args.log_level)?;

    let Some(stats) = run::execute(args).await? else {
        return Ok(());
    };

    eprintln!();
    eprintln!("Poll completed:");
    eprintln!("  Pages listed:     {}", stats.pages);
    eprintln!("  Keys listed:      {}", stats.keys_listed);
    eprintln!("  Keys filtered:    {}", stats.keys_filtered);
    eprintln!("  Keys retained:    {}", stats.keys_retained);
    eprintln!("  Added:            {}", stats.adds);
    eprintln!("  Deleted:          {}", stats.deletes);
    eprintln!("  Errors:           {}", stats.errors.len());

    if let Some(duration) = stats.duration() {
        eprintln!(
            "  Duration:         {:.2}s",
            duration.num_milliseconds() as f64 / 1000.0
        );
    }

    if stats.has_errors() {
        for error in &stats.errors {
            eprintln!("  Error: {}", error);
        }
        std::process::exit(4); // Partial failure
    }

    Ok(())
}
