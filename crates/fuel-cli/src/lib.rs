//! Fuel CLI - command line front end for the fuel planning engine.
//!
//! Binaries:
//! - fuel_plan: compute fuel reports for one or more scenario files
//! - avg_wind: average along-track wind and air distance between two points

pub mod config;
pub mod scenario;

pub use config::Config;
pub use scenario::{Scenario, WindSpec};

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global subscriber. Logs go to stderr so reports on stdout stay clean.
pub fn init_tracing(json: bool) -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with((!json).then(|| fmt::layer().with_writer(std::io::stderr)))
        .with(json.then(|| fmt::layer().json().with_writer(std::io::stderr)))
        .with(EnvFilter::from_default_env().add_directive("fuel_core=info".parse()?))
        .try_init()?;
    Ok(())
}
