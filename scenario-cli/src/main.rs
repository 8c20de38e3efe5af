use anyhow::Context;
use clap::Parser;

use scenario_cli::{Cli, logging, run};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    logging::init_logging(cli.log_level.as_deref(), cli.log_file.as_deref())?;

    let report = run(&cli)?;
    let json = serde_json::to_string_pretty(&report).context("serializing report")?;
    println!("{json}");

    Ok(())
}
