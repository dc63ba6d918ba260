use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod args;
mod commands;
mod context;
mod shell;

use args::{Cli, Command, StudioCommand};
use context::AppContext;

fn init_tracing() {
    let filter = EnvFilter::try_from_env("FITCHECK_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    match cli.command {
        Command::Studio(StudioCommand::Classify { names }) => commands::classify(&names),
        Command::Studio(StudioCommand::Poses) => commands::poses(),
        Command::Studio(command) => {
            let ctx = AppContext::build(cli.home)?;
            commands::mount(&ctx).await;
            commands::run(&ctx, command).await?;
        }
        Command::Shell => shell::run(AppContext::build(cli.home)?).await?,
    }

    Ok(())
}
