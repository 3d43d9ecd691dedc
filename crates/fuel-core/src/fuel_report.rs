//! Fuel report generation: trip burn over the plan nodes, then reserves.
//!
//! The calculation runs two named phases. [`TripBurn`] sweeps the node
//! sequence once in the configured [`IntegrationDirection`]; its trip fuel
//! feeds [`ReserveAccumulation`], whose landing fuel anchors the next sweep.
//! The phases alternate until trip fuel settles.

use crate::error::{FuelError, Result};
use crate::models::{FuelParameters, Route, WeightUnit};
use crate::node_builder::{CruiseAltitude, NodeBuilder, VerticalProfile};
use crate::perf::{FlightPhase, PerformanceProfile};
use crate::plan_node::{check_ground_speed, Kinematics, NodeState, PlanNode, PlanNodeInputs};
use crate::rules::{IntegrationDirection, PlanningRules};
use crate::wind::WindTable;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info, trace, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeneratorState {
    Initialized,
    Integrating,
    Completed,
    Failed,
}

/// One leg of the trip, in route order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegDetail {
    pub from: String,
    pub to: String,
    pub phase: FlightPhase,
    pub distance_nm: f64,
    pub altitude_ft: f64,
    pub ktas: f64,
    pub gs: f64,
    pub time_min: f64,
    pub fuel_kg: f64,
    /// Fuel on board at the end of the leg.
    pub fuel_remaining_kg: f64,
}

/// Result of one directional sweep over the plan nodes.
#[derive(Debug)]
pub struct TripBurn<'a> {
    pub nodes: Vec<PlanNode<'a>>,
    pub legs: Vec<LegDetail>,
    pub trip_fuel: f64,
    pub trip_time_min: f64,
    pub cruise_altitude_ft: f64,
    pub toc_distance_nm: f64,
    pub tod_distance_nm: f64,
}

impl TripBurn<'_> {
    /// Fail with [`FuelError::FuelExhausted`] if fuel on board drops below
    /// `-tolerance_kg` at any node after the origin.
    pub fn check_fuel_on_board(&self, tolerance_kg: f64) -> Result<()> {
        for (i, node) in self.nodes.iter().enumerate().skip(1) {
            if node.fuel_on_board() < -tolerance_kg {
                return Err(FuelError::FuelExhausted {
                    leg: i - 1,
                    fuel_on_board: node.fuel_on_board(),
                });
            }
        }
        Ok(())
    }
}

/// Reserve quantities (kg) accumulated from the destination outward.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReserveAccumulation {
    pub contingency: f64,
    pub hold: f64,
    pub alternate: f64,
    pub alternate_time_min: f64,
    pub final_reserve: f64,
    pub extra: f64,
    pub apu: f64,
    pub taxi: f64,
}

impl ReserveAccumulation {
    /// Fuel expected on board at touchdown.
    pub fn landing_fuel(&self) -> f64 {
        self.contingency + self.hold + self.alternate + self.final_reserve + self.extra
    }
}

/// Reserves that do not depend on trip fuel.
#[derive(Debug, Clone, Copy)]
struct FixedReserves {
    final_reserve: f64,
    alternate: f64,
    alternate_time_min: f64,
    apu: f64,
    taxi: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuelReport {
    pub trip_fuel_kg: f64,
    pub contingency_fuel_kg: f64,
    pub hold_fuel_kg: f64,
    pub extra_fuel_kg: f64,
    pub alternate_fuel_kg: f64,
    pub final_reserve_fuel_kg: f64,
    pub apu_fuel_kg: f64,
    pub taxi_fuel_kg: f64,
    pub total_fuel_kg: f64,
    pub takeoff_fuel_kg: f64,
    pub predicted_landing_fuel_kg: f64,
    pub trip_time_min: f64,
    pub alternate_time_min: f64,
    pub cruise_altitude_ft: f64,
    pub zfw_kg: f64,
    pub legs: Vec<LegDetail>,
}

impl FuelReport {
    pub fn takeoff_weight_kg(&self) -> f64 {
        self.zfw_kg + self.takeoff_fuel_kg
    }

    pub fn landing_weight_kg(&self) -> f64 {
        self.zfw_kg + self.predicted_landing_fuel_kg
    }

    /// Render the report in `unit`. Times print as HH:MM.
    pub fn to_text(&self, unit: WeightUnit) -> String {
        self.display(unit).to_string()
    }

    /// The report as a [`fmt::Display`] in `unit`.
    pub fn display(&self, unit: WeightUnit) -> ReportDisplay<'_> {
        ReportDisplay { report: self, unit }
    }
}

/// Text rendering of a [`FuelReport`], from [`FuelReport::display`].
pub struct ReportDisplay<'a> {
    report: &'a FuelReport,
    unit: WeightUnit,
}

impl fmt::Display for ReportDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let r = self.report;
        let w = |kg: f64| self.unit.from_kg(kg).round() as i64;
        writeln!(f, "{:<14}{:>10} {:>8}", "", format!("FUEL {}", self.unit), "TIME")?;
        let rows = [
            ("TRIP", r.trip_fuel_kg, Some(r.trip_time_min)),
            ("CONTINGENCY", r.contingency_fuel_kg, None),
            ("HOLD", r.hold_fuel_kg, None),
            ("ALTERNATE", r.alternate_fuel_kg, Some(r.alternate_time_min)),
            ("FINAL RSV", r.final_reserve_fuel_kg, None),
            ("EXTRA", r.extra_fuel_kg, None),
            ("APU", r.apu_fuel_kg, None),
            ("TAXI", r.taxi_fuel_kg, None),
            ("TOTAL", r.total_fuel_kg, None),
        ];
        for (label, kg, time) in rows {
            let time = time.map(hhmm).unwrap_or_default();
            writeln!(f, "{label:<14}{:>10} {time:>8}", w(kg))?;
        }
        writeln!(f)?;
        for (label, kg) in [
            ("TAKEOFF FUEL", r.takeoff_fuel_kg),
            ("LANDING FUEL", r.predicted_landing_fuel_kg),
            ("ZFW", r.zfw_kg),
            ("TOW", r.takeoff_weight_kg()),
            ("LW", r.landing_weight_kg()),
        ] {
            writeln!(f, "{label:<14}{:>10}", w(kg))?;
        }
        writeln!(f, "{:<14}{:>10}", "CRZ ALT FT", r.cruise_altitude_ft.round() as i64)?;

        if r.legs.is_empty() {
            return Ok(());
        }
        writeln!(f)?;
        writeln!(
            f,
            "{:<10}{:<10}{:>4}{:>8}{:>7}{:>6}{:>6}{:>7}{:>9}{:>9}",
            "FROM", "TO", "PH", "DIST", "ALT", "TAS", "GS", "TIME", "BURN", "FOB"
        )?;
        for leg in &r.legs {
            writeln!(
                f,
                "{:<10}{:<10}{:>4}{:>8.1}{:>7.0}{:>6.0}{:>6.0}{:>7}{:>9}{:>9}",
                leg.from,
                leg.to,
                leg.phase.to_string(),
                leg.distance_nm,
                leg.altitude_ft,
                leg.ktas,
                leg.gs,
                hhmm(leg.time_min),
                w(leg.fuel_kg),
                w(leg.fuel_remaining_kg)
            )?;
        }
        Ok(())
    }
}

fn hhmm(minutes: f64) -> String {
    let total = minutes.round() as i64;
    format!("{:02}:{:02}", total / 60, total % 60)
}

/// Integrates fuel and time over a route and produces a [`FuelReport`].
pub struct FuelReportGenerator<'a> {
    route: &'a Route,
    alternates: &'a [Route],
    profile: &'a dyn PerformanceProfile,
    wind: &'a dyn WindTable,
    params: FuelParameters,
    cruise: CruiseAltitude,
    rules: PlanningRules,
    state: GeneratorState,
}

impl<'a> FuelReportGenerator<'a> {
    pub fn new(
        route: &'a Route,
        profile: &'a dyn PerformanceProfile,
        wind: &'a dyn WindTable,
        params: FuelParameters,
    ) -> Self {
        Self {
            route,
            alternates: &[],
            profile,
            wind,
            params,
            cruise: CruiseAltitude::default(),
            rules: PlanningRules::default(),
            state: GeneratorState::Initialized,
        }
    }

    /// Routes from the destination to each alternate airport.
    pub fn with_alternates(mut self, alternates: &'a [Route]) -> Self {
        self.alternates = alternates;
        self
    }

    pub fn with_cruise_altitude(mut self, cruise: CruiseAltitude) -> Self {
        self.cruise = cruise;
        self
    }

    pub fn with_rules(mut self, rules: PlanningRules) -> Self {
        self.rules = rules;
        self
    }

    pub fn state(&self) -> GeneratorState {
        self.state
    }

    fn set_state(&mut self, state: GeneratorState) {
        debug!(from = ?self.state, to = ?state, "fuel report generator state");
        self.state = state;
    }

    pub fn generate(&mut self) -> Result<FuelReport> {
        self.set_state(GeneratorState::Integrating);
        match self.run() {
            Ok(report) => {
                self.set_state(GeneratorState::Completed);
                Ok(report)
            }
            Err(err) => {
                warn!(error = %err, kind = ?err.kind(), "fuel calculation failed");
                self.set_state(GeneratorState::Failed);
                Err(err)
            }
        }
    }

    fn validate(&self) -> Result<()> {
        self.params.validate()?;
        if !(self.rules.convergence_tolerance_kg > 0.0) {
            return Err(FuelError::InvalidParameter {
                name: "convergence_tolerance_kg",
                value: self.rules.convergence_tolerance_kg,
                reason: "must be positive",
            });
        }
        if let Some(spacing) = self.rules.intermediate_spacing_nm {
            if !(spacing > 0.0 && spacing.is_finite()) {
                return Err(FuelError::InvalidParameter {
                    name: "intermediate_spacing_nm",
                    value: spacing,
                    reason: "must be positive",
                });
            }
        }
        Ok(())
    }

    fn run(&self) -> Result<FuelReport> {
        self.validate()?;
        if !self.wind.has_data() {
            warn!("no wind data loaded, planning in calm air");
        }

        let zfw = self.params.zfw_kg;
        let fixed = self.fixed_reserves()?;
        let builder = NodeBuilder::new(self.route, self.profile)
            .with_intermediate_spacing(self.rules.intermediate_spacing_nm);

        let mut cruise_altitude: Option<f64> = None;
        let mut trip_estimate: Option<f64> = None;
        for iteration in 1..=self.rules.max_iterations {
            let reserves = self.reserves(&fixed, trip_estimate.unwrap_or(0.0));
            let landing_fuel = reserves.landing_fuel();
            let landing_weight = zfw + landing_fuel;
            let origin_weight = landing_weight + trip_estimate.unwrap_or(0.0);

            let level = match cruise_altitude {
                Some(level) => level,
                None => {
                    let level = builder.select_cruise_altitude(
                        self.cruise,
                        zfw,
                        origin_weight,
                        landing_weight,
                        self.rules.cruise_level_step_ft,
                    )?;
                    cruise_altitude = Some(level);
                    level
                }
            };
            let profile = builder.build(level, origin_weight, landing_weight)?;

            let burn = match self.rules.direction {
                IntegrationDirection::Backward => {
                    self.sweep(self.route, &profile, Sweep::backward(landing_weight, landing_fuel))?
                }
                IntegrationDirection::Forward => {
                    let estimate = match trip_estimate {
                        Some(trip) => trip,
                        None => {
                            let seed = Sweep::backward(landing_weight, landing_fuel);
                            self.sweep(self.route, &profile, seed)?.trip_fuel
                        }
                    };
                    self.sweep(
                        self.route,
                        &profile,
                        Sweep::forward(landing_weight + estimate, landing_fuel + estimate),
                    )?
                }
            };
            debug!(
                iteration,
                trip_fuel = burn.trip_fuel,
                landing_fuel,
                cruise_alt_ft = level,
                "trip burn"
            );

            if let Some(previous) = trip_estimate {
                if (burn.trip_fuel - previous).abs() < self.rules.convergence_tolerance_kg {
                    burn.check_fuel_on_board(self.rules.convergence_tolerance_kg)?;
                    return self.finish(burn, &fixed);
                }
            }
            trip_estimate = Some(burn.trip_fuel);
        }
        Err(FuelError::NotConverged {
            iterations: self.rules.max_iterations,
        })
    }

    fn finish(&self, burn: TripBurn<'a>, fixed: &FixedReserves) -> Result<FuelReport> {
        let r = self.reserves(fixed, burn.trip_fuel);
        let total =
            burn.trip_fuel + r.contingency + r.hold + r.extra + r.alternate + r.final_reserve + r.apu + r.taxi;
        if let Some(capacity) = self.params.max_fuel_kg {
            if total > capacity {
                return Err(FuelError::FuelCapacityExceeded {
                    required_kg: total,
                    capacity_kg: capacity,
                });
            }
        }
        let report = FuelReport {
            trip_fuel_kg: burn.trip_fuel,
            contingency_fuel_kg: r.contingency,
            hold_fuel_kg: r.hold,
            extra_fuel_kg: r.extra,
            alternate_fuel_kg: r.alternate,
            final_reserve_fuel_kg: r.final_reserve,
            apu_fuel_kg: r.apu,
            taxi_fuel_kg: r.taxi,
            total_fuel_kg: total,
            takeoff_fuel_kg: total - r.taxi - r.apu,
            predicted_landing_fuel_kg: total - burn.trip_fuel - r.taxi - r.apu,
            trip_time_min: burn.trip_time_min,
            alternate_time_min: r.alternate_time_min,
            cruise_altitude_ft: burn.cruise_altitude_ft,
            zfw_kg: self.params.zfw_kg,
            legs: burn.legs,
        };
        info!(
            trip = report.trip_fuel_kg,
            total = report.total_fuel_kg,
            cruise_alt_ft = report.cruise_altitude_ft,
            "fuel report complete"
        );
        Ok(report)
    }

    fn hold_flow(&self, weight: f64, alt_ft: f64) -> f64 {
        let kias = self.profile.hold_kias(weight);
        self.profile.fuel_flow(FlightPhase::Hold, weight, alt_ft, kias)
    }

    fn fixed_reserves(&self) -> Result<FixedReserves> {
        let zfw = self.params.zfw_kg;
        // Flown down to the zero fuel weight.
        let final_reserve =
            self.hold_flow(zfw, self.rules.final_reserve_altitude_ft) * self.params.final_reserve_min;

        let mut alternate = 0.0;
        let mut alternate_time_min = 0.0;
        for alt_route in self.alternates {
            let anchor = zfw + final_reserve;
            let builder = NodeBuilder::new(alt_route, self.profile)
                .with_intermediate_spacing(self.rules.intermediate_spacing_nm);
            let level = builder.select_cruise_altitude(
                CruiseAltitude::Optimum,
                zfw,
                anchor,
                anchor,
                self.rules.cruise_level_step_ft,
            )?;
            let profile = builder.build(level, anchor, anchor)?;
            let burn = self.sweep(alt_route, &profile, Sweep::backward(anchor, final_reserve))?;
            debug!(
                alternate = %alt_route.destination().ident,
                fuel = burn.trip_fuel,
                time_min = burn.trip_time_min,
                "alternate trip"
            );
            if burn.trip_fuel > alternate {
                alternate = burn.trip_fuel;
                alternate_time_min = burn.trip_time_min;
            }
        }

        Ok(FixedReserves {
            final_reserve,
            alternate,
            alternate_time_min,
            apu: self.profile.apu_fuel_flow() * self.params.apu_min,
            taxi: self.profile.taxi_fuel_flow() * self.params.taxi_min,
        })
    }

    fn reserves(&self, fixed: &FixedReserves, trip_fuel: f64) -> ReserveAccumulation {
        let contingency = self.params.contingency_pct / 100.0 * trip_fuel;
        let extra = self.params.extra_kg;
        // Weight on leaving the hold.
        let hold_weight =
            self.params.zfw_kg + contingency + fixed.alternate + fixed.final_reserve + extra;
        let hold = self.hold_flow(hold_weight, self.rules.hold_altitude_ft) * self.params.hold_min;
        ReserveAccumulation {
            contingency,
            hold,
            alternate: fixed.alternate,
            alternate_time_min: fixed.alternate_time_min,
            final_reserve: fixed.final_reserve,
            extra,
            apu: fixed.apu,
            taxi: fixed.taxi,
        }
    }

    fn node_inputs<'r>(
        &self,
        route: &'r Route,
        profile: &VerticalProfile,
        i: usize,
        weight: f64,
    ) -> PlanNodeInputs<'r>
    where
        'a: 'r,
    {
        let node = &profile.nodes[i];
        let waypoints = route.waypoints();
        let next_plan_coordinate = profile
            .nodes
            .get(i + 1)
            .map(|n| n.value.coordinate())
            .unwrap_or_else(|| node.value.coordinate());
        PlanNodeInputs {
            index: i,
            value: node.value.clone(),
            wind: self.wind,
            prev_waypoint: &waypoints[node.prev_route_index],
            next_route_waypoint: &waypoints[node.next_route_index],
            next_plan_coordinate,
            alt_ft: node.alt_ft,
            kias: self.profile.kias(node.phase, weight),
        }
    }

    /// Time (min) and fuel (kg) for the leg starting at node `i`.
    fn leg_burn(
        &self,
        profile: &VerticalProfile,
        inputs: &PlanNodeInputs<'_>,
        kinematics: &Kinematics,
        weight: f64,
    ) -> (f64, f64) {
        let i = inputs.index;
        let phase = profile.nodes[i].phase;
        let time = profile.leg_distance_nm(i) / kinematics.gs * 60.0;
        let flow = self
            .profile
            .fuel_flow(phase, weight, inputs.alt_ft, inputs.kias);
        (time, flow * time)
    }

    fn sweep<'r>(
        &self,
        route: &'r Route,
        profile: &VerticalProfile,
        sweep: Sweep,
    ) -> Result<TripBurn<'r>>
    where
        'a: 'r,
    {
        let n = profile.nodes.len();
        let mut weight = vec![0.0; n];
        let mut fuel = vec![0.0; n];
        let mut elapsed = vec![0.0; n];
        // Filled in sweep order; reversed afterwards for a backward sweep.
        let mut evaluated: Vec<(PlanNodeInputs<'r>, Kinematics)> = Vec::with_capacity(n);
        let mut legs: Vec<(f64, f64)> = Vec::with_capacity(n.saturating_sub(1));

        let evaluate = |i: usize, w: f64| -> Result<(PlanNodeInputs<'r>, Kinematics)> {
            let inputs = self.node_inputs(route, profile, i, w);
            let kinematics = Kinematics::evaluate(&inputs);
            check_ground_speed(&inputs, kinematics.gs)?;
            Ok((inputs, kinematics))
        };

        match sweep.direction {
            IntegrationDirection::Backward => {
                let last = n - 1;
                weight[last] = sweep.anchor_weight;
                fuel[last] = sweep.anchor_fuel;
                evaluated.push(evaluate(last, sweep.anchor_weight)?);
                for i in (0..last).rev() {
                    let w = weight[i + 1];
                    let (inputs, kinematics) = evaluate(i, w)?;
                    let (time, burn) = self.leg_burn(profile, &inputs, &kinematics, w);
                    trace!(leg = i, time, burn, gs = kinematics.gs, "backward leg");
                    weight[i] = weight[i + 1] + burn;
                    fuel[i] = fuel[i + 1] + burn;
                    // Counted from the destination here; flipped below.
                    elapsed[i] = elapsed[i + 1] + time;
                    legs.push((time, burn));
                    evaluated.push((inputs, kinematics));
                }
                evaluated.reverse();
                legs.reverse();
                let total = elapsed[0];
                for e in &mut elapsed {
                    *e = total - *e;
                }
            }
            IntegrationDirection::Forward => {
                weight[0] = sweep.anchor_weight;
                fuel[0] = sweep.anchor_fuel;
                for i in 0..n - 1 {
                    let w = weight[i];
                    let (inputs, kinematics) = evaluate(i, w)?;
                    let (time, burn) = self.leg_burn(profile, &inputs, &kinematics, w);
                    trace!(leg = i, time, burn, gs = kinematics.gs, "forward leg");
                    weight[i + 1] = weight[i] - burn;
                    // A deficit here is left for the converged pass to judge.
                    fuel[i + 1] = fuel[i] - burn;
                    elapsed[i + 1] = elapsed[i] + time;
                    legs.push((time, burn));
                    evaluated.push((inputs, kinematics));
                }
                evaluated.push(evaluate(n - 1, weight[n - 1])?);
            }
        }

        let trip_time = elapsed[n - 1];
        let mut nodes = Vec::with_capacity(n);
        for (i, (inputs, kinematics)) in evaluated.into_iter().enumerate() {
            let state = NodeState {
                gross_weight: weight[i],
                fuel_on_board: fuel[i],
                time_remaining: trip_time - elapsed[i],
            };
            nodes.push(PlanNode::from_parts(inputs, state, kinematics)?);
        }

        let mut details = Vec::with_capacity(n.saturating_sub(1));
        let mut trip_fuel = 0.0;
        for (i, (time, burn)) in legs.into_iter().enumerate() {
            trip_fuel += burn;
            details.push(LegDetail {
                from: nodes[i].value().label(),
                to: nodes[i + 1].value().label(),
                phase: profile.nodes[i].phase,
                distance_nm: profile.leg_distance_nm(i),
                altitude_ft: nodes[i].alt_ft(),
                ktas: nodes[i].ktas(),
                gs: nodes[i].gs(),
                time_min: time,
                fuel_kg: burn,
                fuel_remaining_kg: fuel[i + 1],
            });
        }

        Ok(TripBurn {
            nodes,
            legs: details,
            trip_fuel,
            trip_time_min: trip_time,
            cruise_altitude_ft: profile.cruise_altitude_ft,
            toc_distance_nm: profile.toc_distance_nm,
            tod_distance_nm: profile.tod_distance_nm,
        })
    }
}

/// Anchor of one sweep.
#[derive(Debug, Clone, Copy)]
struct Sweep {
    direction: IntegrationDirection,
    anchor_weight: f64,
    anchor_fuel: f64,
}

impl Sweep {
    fn backward(anchor_weight: f64, anchor_fuel: f64) -> Self {
        Self {
            direction: IntegrationDirection::Backward,
            anchor_weight,
            anchor_fuel,
        }
    }

    fn forward(anchor_weight: f64, anchor_fuel: f64) -> Self {
        Self {
            direction: IntegrationDirection::Forward,
            anchor_weight,
            anchor_fuel,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interp::{Table1D, Table2D};
    use crate::models::Waypoint;
    use crate::perf::{FuelFlowTables, TabularProfile};
    use crate::spatial::offset_by_bearing;
    use crate::wind::NoWind;

    fn profile() -> TabularProfile {
        TabularProfile {
            name: "TEST".into(),
            fuel_flow: FuelFlowTables {
                climb: Table2D::constant(60.0),
                cruise: Table2D::new(
                    vec![40_000.0, 80_000.0],
                    vec![0.0, 40_000.0],
                    vec![vec![30.0, 30.0], vec![50.0, 50.0]],
                )
                .unwrap(),
                descent: Table2D::constant(20.0),
                hold: Table2D::constant(40.0),
            },
            climb_gradient: Table1D::constant(300.0),
            descent_gradient: Table1D::constant(300.0),
            climb_kias: Table1D::constant(290.0),
            cruise_kias: Table1D::constant(280.0),
            descent_kias: Table1D::constant(290.0),
            hold_kias: Table1D::constant(210.0),
            max_cruise_altitude: Table1D::constant(41_000.0),
            optimum_cruise_altitude: Table2D::constant(35_000.0),
            taxi_flow_kg_min: 10.0,
            apu_flow_kg_min: 2.0,
        }
    }

    fn route() -> Route {
        let waypoints = (0..4)
            .map(|i| {
                let p = offset_by_bearing(10.0, 10.0, 300.0 * i as f64, 80.0);
                Waypoint::from_coordinate(format!("W{i}"), &p)
            })
            .collect();
        Route::new(waypoints).unwrap()
    }

    fn params() -> FuelParameters {
        FuelParameters {
            zfw_kg: 50_000.0,
            ..FuelParameters::default()
        }
    }

    #[test]
    fn weight_and_fuel_decrease_along_route() {
        let route = route();
        let perf = profile();
        let mut generator = FuelReportGenerator::new(&route, &perf, &NoWind, params());
        assert_eq!(generator.state(), GeneratorState::Initialized);
        let report = generator.generate().unwrap();
        assert_eq!(generator.state(), GeneratorState::Completed);

        assert!(report.trip_fuel_kg > 0.0);
        for pair in report.legs.windows(2) {
            assert!(pair[1].fuel_remaining_kg <= pair[0].fuel_remaining_kg);
        }
        let last = report.legs.last().unwrap();
        assert!((last.fuel_remaining_kg - report.predicted_landing_fuel_kg).abs() < 0.1);
    }

    #[test]
    fn backward_sweep_nodes_are_consistent() {
        let route = route();
        let perf = profile();
        let generator = FuelReportGenerator::new(&route, &perf, &NoWind, params());
        let vp = NodeBuilder::new(&route, &perf)
            .build(35_000.0, 60_000.0, 55_000.0)
            .unwrap();
        let burn = generator
            .sweep(&route, &vp, Sweep::backward(55_000.0, 5_000.0))
            .unwrap();

        assert_eq!(burn.nodes.len(), vp.nodes.len());
        let last = burn.nodes.last().unwrap();
        assert_eq!(last.gross_weight(), 55_000.0);
        assert_eq!(last.time_remaining(), 0.0);
        let first = &burn.nodes[0];
        assert!((first.fuel_on_board() - 5_000.0 - burn.trip_fuel).abs() < 1e-6);
        assert!((first.time_remaining() - burn.trip_time_min).abs() < 1e-9);
        for pair in burn.nodes.windows(2) {
            assert!(pair[1].gross_weight() <= pair[0].gross_weight());
            assert!(pair[1].time_remaining() <= pair[0].time_remaining());
        }
    }

    #[test]
    fn forward_sweep_reports_exhausted_fuel() {
        let route = route();
        let perf = profile();
        let generator = FuelReportGenerator::new(&route, &perf, &NoWind, params());
        let vp = NodeBuilder::new(&route, &perf)
            .build(35_000.0, 60_000.0, 55_000.0)
            .unwrap();
        let burn = generator
            .sweep(&route, &vp, Sweep::forward(51_000.0, 1_000.0))
            .unwrap();
        assert!(burn.trip_fuel > 1_000.0);
        let err = burn.check_fuel_on_board(0.01).unwrap_err();
        assert!(matches!(err, FuelError::FuelExhausted { fuel_on_board, .. } if fuel_on_board < 0.0));

        let full = generator
            .sweep(&route, &vp, Sweep::forward(60_000.0, 10_000.0))
            .unwrap();
        assert!(full.check_fuel_on_board(0.01).is_ok());
    }

    #[test]
    fn failed_generation_sets_failed_state() {
        let route = route();
        let perf = profile();
        let mut bad = params();
        bad.contingency_pct = 150.0;
        let mut generator = FuelReportGenerator::new(&route, &perf, &NoWind, bad);
        assert!(generator.generate().is_err());
        assert_eq!(generator.state(), GeneratorState::Failed);
    }

    #[test]
    fn too_few_iterations_does_not_converge() {
        let route = route();
        let perf = profile();
        let rules = PlanningRules {
            max_iterations: 1,
            ..PlanningRules::default()
        };
        let err = FuelReportGenerator::new(&route, &perf, &NoWind, params())
            .with_rules(rules)
            .generate()
            .unwrap_err();
        assert_eq!(err, FuelError::NotConverged { iterations: 1 });
    }

    #[test]
    fn text_report_converts_units() {
        let route = route();
        let perf = profile();
        let report = FuelReportGenerator::new(&route, &perf, &NoWind, params())
            .generate()
            .unwrap();
        let kg = report.to_text(WeightUnit::Kg);
        let lb = report.to_text(WeightUnit::Lb);
        assert!(kg.contains("FUEL KG"));
        assert!(lb.contains("FUEL LB"));
        assert_eq!(report.display(WeightUnit::Kg).to_string(), kg);
        assert!(kg.lines().any(|l| l.starts_with("TOTAL")));
        assert!(kg.contains(&format!("{}", report.total_fuel_kg.round() as i64)));
        assert!(lb.contains(&format!("{}", WeightUnit::Lb.from_kg(report.total_fuel_kg).round() as i64)));
        assert_eq!(hhmm(125.4), "02:05");
    }
}
