use anyhow::Result;
use clap::Parser;

use pipedrive::cli::{self, Cli};
use pipedrive::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let config = Config::load()?;
    log::debug!("Running {:?}", cli.command);

    cli::run(cli, config).await
}
