use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use looksee::commands::Command;
use looksee_core::SingletonInstanceMode;

#[derive(Parser)]
#[command(name = "looksee")]
#[command(about = "Inspect the method lookup path of an object model snapshot", long_about = None)]
struct Cli {
    /// Model snapshot file (YAML, or JSON by extension)
    #[arg(short, long, env = "LOOKSEE_MODEL")]
    model: PathBuf,

    /// Introspector configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the configured singleton mode (strict or lenient)
    #[arg(long)]
    singleton_mode: Option<SingletonInstanceMode>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Enable debug output
    #[arg(short, long)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.debug {
        tracing::Level::TRACE
    } else if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(cli.debug)
        .with_writer(std::io::stderr)
        .init();

    let config = looksee::load_config(cli.config.as_deref(), cli.singleton_mode)?;
    let mut loaded = looksee::load_model(&cli.model)?;
    let output = looksee::run(&cli.command, &mut loaded, config)?;
    if !output.is_empty() {
        println!("{}", output);
    }
    Ok(())
}
