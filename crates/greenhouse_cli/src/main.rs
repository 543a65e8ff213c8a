//! Greenhouse CLI
//!
//! ```bash
//! greenhouse run scenarios/settings_entrance.json --report out/report.json
//! greenhouse sample --screen settings --interval-ms 100 --press edit_profile@1200
//! greenhouse init-config
//! ```

mod sample;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use greenhouse_screens::{
    run_loaded_scenario, GreenhouseConfig, HeadlessRuntime, HeadlessScenario, ScreenKind,
    CONFIG_FILE,
};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::sample::{sample_frames, PressAt};

#[derive(Parser)]
#[command(name = "greenhouse")]
#[command(version, about = "Greenhouse motion tools", long_about = None)]
struct Cli {
    /// Path to greenhouse.toml, or a directory containing one
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "warn")]
    log: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a headless scenario and print its report
    Run {
        /// Scenario JSON file
        scenario: PathBuf,

        /// Also write the report to this relative path
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// Print a screen's frames as JSON lines
    Sample {
        #[arg(long, default_value = "settings")]
        screen: ScreenKind,

        #[arg(long, default_value_t = 100)]
        interval_ms: u64,

        #[arg(long, default_value_t = 3000)]
        duration_ms: u64,

        /// Press an element at a logical time
        #[arg(long = "press", value_name = "TARGET@MS")]
        presses: Vec<PressAt>,
    },

    /// Write the default configuration
    InitConfig {
        #[arg(default_value = CONFIG_FILE)]
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn init_tracing(default_level: &str) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .or_else(|_| EnvFilter::try_new(default_level))
                .unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

fn load_config(path: Option<&Path>) -> Result<GreenhouseConfig> {
    match path {
        Some(path) => GreenhouseConfig::load_from_dir(path),
        None if Path::new(CONFIG_FILE).is_file() => GreenhouseConfig::load_from_dir(Path::new(".")),
        None => Ok(GreenhouseConfig::default()),
    }
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(&cli.log);

    match cli.command {
        Commands::Run { scenario, report } => {
            let config = load_config(cli.config.as_deref())?;
            let loaded = HeadlessScenario::from_path(&scenario)?;
            let outcome = run_loaded_scenario(&loaded, config.headless.run_config(), &config)
                .with_context(|| format!("Failed to run {}", scenario.display()))?;

            outcome.report().write_to_writer(&mut std::io::stdout().lock())?;
            if let Some(path) = report {
                outcome.report().write_to_path(&path)?;
                info!(path = %path.display(), "report written");
            }

            if outcome.is_failed() {
                return Ok(ExitCode::from(1));
            }
        }
        Commands::Sample {
            screen,
            interval_ms,
            duration_ms,
            presses,
        } => {
            let config = load_config(cli.config.as_deref())?;
            let mut runtime = HeadlessRuntime::new(screen, config.headless.run_config(), &config)?;
            let mut out = std::io::stdout().lock();
            let written = sample_frames(&mut runtime, interval_ms, duration_ms, &presses, &mut out)?;
            out.flush()?;
            info!(%screen, frames = written, "sampled");
        }
        Commands::InitConfig { path, force } => {
            if path.exists() && !force {
                bail!("{} already exists (use --force to overwrite)", path.display());
            }
            let content = GreenhouseConfig::default().to_toml()?;
            fs::write(&path, content)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Wrote {}", path.display());
        }
    }

    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_sample_args() {
        let cli = Cli::try_parse_from([
            "greenhouse",
            "sample",
            "--screen",
            "home",
            "--press",
            "box@100",
            "--press",
            "box@900",
        ])
        .unwrap();
        match cli.command {
            Commands::Sample {
                screen, presses, ..
            } => {
                assert_eq!(screen, ScreenKind::Home);
                assert_eq!(presses.len(), 2);
                assert_eq!(presses[1].at_ms, 900);
            }
            _ => panic!("expected sample"),
        }
    }

    #[test]
    fn test_unknown_screen_is_rejected() {
        assert!(Cli::try_parse_from(["greenhouse", "sample", "--screen", "login"]).is_err());
    }
}
