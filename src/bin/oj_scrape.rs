use std::io::Read as _;
use std::process::ExitCode;

use anyhow::Context as _;
use clap::Parser as _;

use oj_scrape::cli::{self, Cli};

fn main() -> ExitCode {
    if let Err(err) = try_main() {
        eprintln!("{err:#}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

fn try_main() -> anyhow::Result<()> {
    oj_scrape::logging::init().context("init logging")?;

    let cli = Cli::parse();
    tracing::debug!(?cli, "parsed cli");

    let options = cli::load_options(cli.config.as_deref())?;
    let mut input = String::new();
    std::io::stdin()
        .read_to_string(&mut input)
        .context("read stdin")?;

    let output = cli::envelope(cli::execute(&cli.command, &options, &input))?;
    println!("{}", serde_json::to_string(&output).context("serialize envelope")?);
    Ok(())
}
