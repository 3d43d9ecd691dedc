pub mod avg_wind;
pub mod error;
pub mod fuel_report;
pub mod interp;
pub mod models;
pub mod node_builder;
pub mod perf;
pub mod plan_node;
pub mod rules;
pub mod spatial;
pub mod speed;
pub mod wind;

pub use avg_wind::AvgWindCalculator;
pub use error::{ErrorKind, FuelError, Result};
pub use fuel_report::{
    FuelReport, FuelReportGenerator, GeneratorState, LegDetail, ReportDisplay, ReserveAccumulation,
    TripBurn,
};
pub use models::{FuelParameters, Route, WeightUnit, Waypoint, KG_LB_RATIO};
pub use node_builder::{CruiseAltitude, NodeBuilder, ProfileNode, VerticalProfile};
pub use perf::{FlightPhase, FuelFlowTables, PerformanceProfile, TabularProfile};
pub use plan_node::{NodeValue, PlanNode};
pub use rules::{IntegrationDirection, PlanningRules};
pub use spatial::{Coordinate, LatLon};
pub use wind::{GridWindTable, NoWind, UniformWind, WindLevel, WindTable, WindVector};
