//! nsrecords CLI: scrape the NetSuite Records Browser into JSON.
//!
//! Discovers every record page linked from the browser's start page and
//! extracts each record's field table.

mod commands;
mod source;

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
