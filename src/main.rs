use std::path::PathBuf;

use anyhow::{Error, bail};
use clap::{Parser, Subcommand, command};
use tracing::debug;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::{
    configuration::{Config, load_configuration},
    icons::{IconState, decode_placeholder, verify_icons, write_icons},
    utils::resolve_output_dir,
};

mod configuration;
mod icons;
mod utils;

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Write icons here instead of the `icons` directory next to the executable
    #[arg(short, long, value_name = "DIR", global = true)]
    out_dir: Option<PathBuf>,

    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    debug: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the placeholder icons (default when no command is given)
    Generate,
    /// Check that every icon exists and matches the embedded image
    Verify,
}

fn init_logging(debug: u8) -> WorkerGuard {
    let level = match debug {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let (writer, guard) = tracing_appender::non_blocking(std::io::stderr());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .init();

    guard
}

fn main() -> Result<(), Error> {
    let cli = Cli::parse();
    let _guard = init_logging(cli.debug);

    let config = match &cli.config {
        Some(path) => load_configuration(path)?,
        None => Config::default(),
    };

    let out_dir = resolve_output_dir(cli.out_dir.as_deref(), &config)?;
    let icon = decode_placeholder()?;
    debug!(out_dir = %out_dir.display(), sizes = ?config.sizes, "resolved run");

    match cli.command.unwrap_or(Commands::Generate) {
        Commands::Generate => {
            write_icons(&out_dir, &config.sizes, &icon, |path| {
                println!("wrote {}", path.display())
            })?;
        }
        Commands::Verify => {
            let statuses = verify_icons(&out_dir, &config.sizes, &icon)?;
            for status in &statuses {
                println!("{} {}", status.state, status.path.display());
            }

            let bad = statuses
                .iter()
                .filter(|s| s.state != IconState::Ok)
                .count();
            if bad > 0 {
                bail!("{bad} of {} icons missing or out of date", statuses.len());
            }
        }
    }

    Ok(())
}
