use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use navsync::script::run_script;
use navsync::{Config, InitialContext};

/// Replay a navigation script against an in-memory history and print where
/// the host and the stack end up after every command.
#[derive(Parser, Debug)]
#[command(name = "navsync", version, about)]
struct Cli {
    /// Route configuration (TOML)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Script to run; read from stdin when omitted
    #[arg(value_name = "SCRIPT")]
    script: Option<PathBuf>,

    /// Start from this path instead of `/`
    #[arg(long, value_name = "PATH")]
    initial_path: Option<String>,

    /// Print the example configuration and exit
    #[arg(long)]
    print_example_config: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    if cli.print_example_config {
        print!("{}", navsync::config::EXAMPLE_CONFIG);
        return Ok(());
    }

    let config = match &cli.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => Config::from_toml_str(navsync::config::EXAMPLE_CONFIG)
            .context("Failed to parse bundled example config")?,
    };

    let source = match &cli.script {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read script {}", path.display()))?,
        None => {
            let mut source = String::new();
            io::stdin()
                .read_to_string(&mut source)
                .context("Failed to read script from stdin")?;
            source
        }
    };

    let context = InitialContext {
        request_path: cli.initial_path,
    };
    let mut stdout = io::stdout().lock();
    run_script(&source, config, context, &mut stdout).await?;
    Ok(())
}
