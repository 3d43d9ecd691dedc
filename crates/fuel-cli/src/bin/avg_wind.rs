//! Average along-track wind between two points, as used to weight route search edges.

use clap::Parser;
use fuel_cli::{Config, Scenario};
use fuel_core::{AvgWindCalculator, LatLon};
use std::path::PathBuf;

/// Estimate the average wind component and air distance between two points
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Scenario supplying the wind data and performance profile
    scenario: PathBuf,

    #[arg(long, allow_hyphen_values = true)]
    from_lat: f64,

    #[arg(long, allow_hyphen_values = true)]
    from_lon: f64,

    #[arg(long, allow_hyphen_values = true)]
    to_lat: f64,

    #[arg(long, allow_hyphen_values = true)]
    to_lon: f64,

    /// Fly this true airspeed instead of the profile's cruise speed
    #[arg(long)]
    ktas: Option<f64>,

    /// Fly this altitude (ft) instead of the profile's recommended cruise altitude
    #[arg(long)]
    altitude: Option<f64>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = Config::from_env();
    fuel_cli::init_tracing(config.log_json)?;
    let scenario = Scenario::load(&args.scenario)?;
    let wind = scenario.wind.table();
    if !wind.has_data() {
        tracing::warn!("scenario has no wind data, result is calm air");
    }

    let from = LatLon::new(args.from_lat, args.from_lon);
    let to = LatLon::new(args.to_lat, args.to_lon);
    let city_pair = AvgWindCalculator::for_city_pair(
        wind.as_ref(),
        &scenario.profile,
        scenario.parameters.zfw_kg,
        &from,
        &to,
    );
    let calc = AvgWindCalculator::new(
        wind.as_ref(),
        args.ktas.unwrap_or(city_pair.ktas()),
        args.altitude.unwrap_or(city_pair.alt_ft()),
    )
    .with_sample_spacing(scenario.effective_rules(&config).avg_wind_sample_spacing_nm);

    let component = calc.average_wind_component(&from, &to)?;
    let air = calc.air_distance(&from, &to)?;
    println!("altitude         {:>8.0} ft", calc.alt_ft());
    println!("true airspeed    {:>8.0} kt", calc.ktas());
    println!("wind component   {:>+8.1} kt", component);
    println!("ground distance  {:>8.1} nm", fuel_core::Coordinate::distance_nm(&from, &to));
    println!("air distance     {:>8.1} nm", air);
    Ok(())
}
