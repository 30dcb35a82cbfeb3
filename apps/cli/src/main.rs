//! schoolscout CLI — discover, enrich, and draft private-school outreach.
//!
//! Leads are discovered via a search provider, enriched from their own
//! websites, scored for contactability, and turned into local draft files
//! for manual review. Nothing is ever sent automatically.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
