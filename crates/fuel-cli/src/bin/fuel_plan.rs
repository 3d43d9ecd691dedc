//! Compute fuel reports for scenario files.
//!
//! Each file is planned on its own blocking task, so several scenarios run
//! in parallel without sharing any state.

use anyhow::Context;
use chrono::Utc;
use clap::Parser;
use fuel_cli::{Config, Scenario};
use fuel_core::{IntegrationDirection, WeightUnit};
use std::path::PathBuf;

/// Plan trip, reserve and block fuel for one or more scenario files
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Scenario JSON files
    #[arg(required = true)]
    scenarios: Vec<PathBuf>,

    /// Weight unit for the printed report (kg or lb)
    #[arg(long)]
    unit: Option<WeightUnit>,

    /// Integration direction (backward or forward)
    #[arg(long)]
    direction: Option<IntegrationDirection>,

    /// Split route legs longer than this many nm
    #[arg(long)]
    spacing: Option<f64>,

    /// Print the report as JSON instead of text
    #[arg(long)]
    json: bool,
}

impl Args {
    fn config(&self) -> Config {
        let mut config = Config::from_env();
        if let Some(unit) = self.unit {
            config.weight_unit = unit;
        }
        if self.direction.is_some() {
            config.direction = self.direction;
        }
        if self.spacing.is_some() {
            config.intermediate_spacing_nm = self.spacing;
        }
        config
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = args.config();
    fuel_cli::init_tracing(config.log_json)?;
    tracing::debug!(?config, "configuration");

    let mut tasks = Vec::with_capacity(args.scenarios.len());
    for path in args.scenarios.clone() {
        let config = config.clone();
        tasks.push(tokio::task::spawn_blocking(move || {
            let scenario = Scenario::load(&path)?;
            let report = scenario
                .run(&config)
                .with_context(|| format!("fuel calculation failed for {}", path.display()))?;
            Ok::<_, anyhow::Error>((scenario.title(), report))
        }));
    }

    let mut failures = 0;
    for task in tasks {
        match task.await? {
            Ok((title, report)) => {
                if args.json {
                    println!("{}", serde_json::to_string_pretty(&report)?);
                } else {
                    println!("{title}  ({})", Utc::now().format("%Y-%m-%d %H:%MZ"));
                    println!("{}", report.display(config.weight_unit));
                }
            }
            Err(e) => {
                failures += 1;
                eprintln!("{e:#}");
            }
        }
    }

    if failures > 0 {
        anyhow::bail!("{failures} scenario(s) failed");
    }
    Ok(())
}
