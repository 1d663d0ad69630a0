#![allow(clippy::cargo_common_metadata)]
use anyhow::Result;
use novile_deb::{cli, config::Config, setup_logging};

fn main() -> Result<()> {
    let args = cli::parse_args();

    setup_logging(args.debug)?;

    let config = Config::from_args(&args)?;

    cli::execute_command(&config, &args.command)
}
