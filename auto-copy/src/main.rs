use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use auto_copy::{ConfigLoad, DEFAULT_CONFIG_FILE, MirrorConfig, MirrorWatcher, logging};
use clap::Parser;
use tracing::{error, info};

/// Mirror file changes from a watched folder into backup folders.
#[derive(Debug, Parser)]
#[command(name = "auto-copy", version)]
struct Cli {
    /// Path to the JSON config file.
    #[arg(long, env = "AUTO_COPY_CONFIG", default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> ExitCode {
    logging::init();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = match MirrorConfig::load_or_create(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?
    {
        ConfigLoad::Loaded(config) => config,
        ConfigLoad::TemplateCreated(path) => {
            info!(
                "Config file created at {}, please edit it and restart the script",
                path.display()
            );
            return Ok(());
        }
    };

    let mut watcher = MirrorWatcher::from_config(Arc::new(config));
    watcher.run().await?;
    Ok(())
}
