//! Vertical profile construction: where the climb ends and the descent begins.

use crate::error::{FuelError, Result};
use crate::models::{Route, Waypoint};
use crate::perf::{FlightPhase, PerformanceProfile};
use crate::plan_node::{IntermediateNode, NodeValue, RouteNode, TocNode, TodNode};
use crate::spatial::{initial_course_deg, interpolate_along, LatLon};
use serde::{Deserialize, Serialize};

/// Distance (nm) within which a TOC/TOD is considered to sit on an existing node.
const COINCIDENT_NM: f64 = 1e-6;

/// How the cruise altitude of a calculation is chosen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum CruiseAltitude {
    /// Use exactly this altitude (ft); fail if the route is too short for it.
    Fixed { altitude_ft: f64 },
    /// Highest semicircular flight level below the profile's recommendation that fits the route.
    #[default]
    Optimum,
}

/// One node of the vertical profile, before any weight or fuel is attached.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileNode {
    pub value: NodeValue,
    pub distance_from_origin_nm: f64,
    pub alt_ft: f64,
    /// Phase of the leg that starts at this node.
    pub phase: FlightPhase,
    /// Route waypoint this node sits on, kept when a TOC/TOD takes its place.
    pub route_index: Option<usize>,
    /// Index of the route waypoint before this node (the origin for the origin itself).
    pub prev_route_index: usize,
    /// Index of the route waypoint after this node (the destination for the destination itself).
    pub next_route_index: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VerticalProfile {
    pub nodes: Vec<ProfileNode>,
    pub cruise_altitude_ft: f64,
    pub toc_distance_nm: f64,
    pub tod_distance_nm: f64,
    pub total_distance_nm: f64,
}

impl VerticalProfile {
    pub fn toc_index(&self) -> Option<usize> {
        self.nodes.iter().position(|n| n.value.is_toc())
    }

    pub fn tod_index(&self) -> Option<usize> {
        self.nodes.iter().position(|n| n.value.is_tod())
    }

    /// Distance (nm) of the leg starting at node `i`.
    pub fn leg_distance_nm(&self, i: usize) -> f64 {
        self.nodes[i + 1].distance_from_origin_nm - self.nodes[i].distance_from_origin_nm
    }
}

/// Turns a lateral route into an ordered sequence of profile nodes.
pub struct NodeBuilder<'a> {
    route: &'a Route,
    profile: &'a dyn PerformanceProfile,
    intermediate_spacing_nm: Option<f64>,
}

impl<'a> NodeBuilder<'a> {
    pub fn new(route: &'a Route, profile: &'a dyn PerformanceProfile) -> Self {
        Self {
            route,
            profile,
            intermediate_spacing_nm: None,
        }
    }

    pub fn with_intermediate_spacing(mut self, spacing_nm: Option<f64>) -> Self {
        self.intermediate_spacing_nm = spacing_nm;
        self
    }

    /// Climb and descent distances (nm) for a cruise altitude.
    pub fn climb_descent_nm(
        &self,
        cruise_alt_ft: f64,
        origin_weight: f64,
        landing_weight: f64,
    ) -> Result<(f64, f64)> {
        let origin_elev = self.route.origin_elevation_ft();
        let dest_elev = self.route.destination_elevation_ft();
        if !cruise_alt_ft.is_finite() || cruise_alt_ft < origin_elev.max(dest_elev) {
            return Err(FuelError::InvalidParameter {
                name: "cruise_altitude_ft",
                value: cruise_alt_ft,
                reason: "must be finite and not below airport elevation",
            });
        }
        let climb_gradient = self.profile.climb_gradient(origin_weight);
        let descent_gradient = self.profile.descent_gradient(landing_weight);
        for (name, gradient) in [
            ("climb_gradient", climb_gradient),
            ("descent_gradient", descent_gradient),
        ] {
            if !(gradient > 0.0) {
                return Err(FuelError::InvalidParameter {
                    name,
                    value: gradient,
                    reason: "must be positive",
                });
            }
        }
        Ok((
            (cruise_alt_ft - origin_elev) / climb_gradient,
            (cruise_alt_ft - dest_elev) / descent_gradient,
        ))
    }

    fn check_feasible(
        &self,
        cruise_alt_ft: f64,
        origin_weight: f64,
        landing_weight: f64,
    ) -> Result<(f64, f64)> {
        let (climb_nm, descent_nm) =
            self.climb_descent_nm(cruise_alt_ft, origin_weight, landing_weight)?;
        let route_nm = self.route.total_distance_nm();
        if climb_nm + descent_nm > route_nm + COINCIDENT_NM {
            return Err(FuelError::InfeasibleProfile {
                cruise_altitude_ft: cruise_alt_ft,
                climb_nm,
                descent_nm,
                route_nm,
            });
        }
        Ok((climb_nm, descent_nm))
    }

    /// Resolve a cruise altitude policy to an altitude in ft.
    pub fn select_cruise_altitude(
        &self,
        policy: CruiseAltitude,
        zfw: f64,
        origin_weight: f64,
        landing_weight: f64,
        level_step_ft: f64,
    ) -> Result<f64> {
        match policy {
            CruiseAltitude::Fixed { altitude_ft } => {
                self.check_feasible(altitude_ft, origin_weight, landing_weight)?;
                Ok(altitude_ft)
            }
            CruiseAltitude::Optimum => {
                let distance = self.route.total_distance_nm();
                let target = self
                    .profile
                    .estimated_cruise_altitude(distance, zfw)
                    .min(self.profile.max_cruise_altitude(origin_weight));
                let origin = self.route.origin();
                let dest = self.route.destination();
                let course = initial_course_deg(origin.lat, origin.lon, dest.lat, dest.lon);
                let floor = self
                    .route
                    .origin_elevation_ft()
                    .max(self.route.destination_elevation_ft());
                let step = if level_step_ft > 0.0 {
                    level_step_ft
                } else {
                    2000.0
                };

                let mut level = semicircular_level(target, course);
                let mut last_err = None;
                while level >= floor {
                    match self.check_feasible(level, origin_weight, landing_weight) {
                        Ok(_) => {
                            tracing::debug!(level, target, course, "selected cruise altitude");
                            return Ok(level);
                        }
                        Err(err @ FuelError::InfeasibleProfile { .. }) => last_err = Some(err),
                        Err(err) => return Err(err),
                    }
                    level -= step;
                }
                Err(last_err.unwrap_or(FuelError::InfeasibleProfile {
                    cruise_altitude_ft: target,
                    climb_nm: 0.0,
                    descent_nm: 0.0,
                    route_nm: distance,
                }))
            }
        }
    }

    /// Build the node sequence for a cruise altitude.
    ///
    /// `origin_weight` drives the climb gradient and `landing_weight` the descent gradient.
    pub fn build(
        &self,
        cruise_alt_ft: f64,
        origin_weight: f64,
        landing_weight: f64,
    ) -> Result<VerticalProfile> {
        let (climb_nm, descent_nm) =
            self.check_feasible(cruise_alt_ft, origin_weight, landing_weight)?;
        let mut nodes = self.lateral_nodes();
        let total = nodes
            .last()
            .map(|n| n.distance_from_origin_nm)
            .unwrap_or(0.0);

        let toc_distance = climb_nm.min(total);
        let tod_distance = (total - descent_nm).max(toc_distance);

        let toc_idx = match find_coincident(&nodes, toc_distance) {
            Some(i) => {
                let replaces = route_waypoint(&nodes[i].value);
                nodes[i].value = NodeValue::Toc(TocNode {
                    coordinate: nodes[i].value.coordinate(),
                    replaces,
                });
                i
            }
            None => insert_synthetic(&mut nodes, toc_distance, |coordinate| {
                NodeValue::Toc(TocNode {
                    coordinate,
                    replaces: None,
                })
            }),
        };

        match find_coincident(&nodes, tod_distance) {
            Some(i) if i != toc_idx && !nodes[i].value.is_toc() => {
                let replaces = route_waypoint(&nodes[i].value);
                nodes[i].value = NodeValue::Tod(TodNode {
                    coordinate: nodes[i].value.coordinate(),
                    replaces,
                });
            }
            Some(i) => {
                // TOC and TOD share a point: cruise has zero length.
                let mut tod = nodes[i].clone();
                if let Some(k) = tod.route_index.take() {
                    tod.prev_route_index = k;
                }
                tod.value = NodeValue::Tod(TodNode {
                    coordinate: tod.value.coordinate(),
                    replaces: None,
                });
                nodes.insert(i + 1, tod);
            }
            None => {
                insert_synthetic(&mut nodes, tod_distance, |coordinate| {
                    NodeValue::Tod(TodNode {
                        coordinate,
                        replaces: None,
                    })
                });
            }
        }

        let profile = VerticalProfile {
            nodes: Vec::new(),
            cruise_altitude_ft: cruise_alt_ft,
            toc_distance_nm: toc_distance,
            tod_distance_nm: tod_distance,
            total_distance_nm: total,
        };
        let nodes = self.assign_vertical(nodes, &profile, origin_weight, landing_weight);
        tracing::debug!(
            nodes = nodes.len(),
            cruise_alt_ft,
            toc_nm = toc_distance,
            tod_nm = tod_distance,
            total_nm = total,
            "built vertical profile"
        );
        Ok(VerticalProfile { nodes, ..profile })
    }

    /// Route waypoints plus intermediate nodes, with distances from the origin.
    fn lateral_nodes(&self) -> Vec<ProfileNode> {
        let waypoints = self.route.waypoints();
        let last = waypoints.len() - 1;
        let leg_distances = self.route.leg_distances_nm();
        let mut nodes = Vec::with_capacity(waypoints.len());
        let mut distance = 0.0;

        for (i, wpt) in waypoints.iter().enumerate() {
            nodes.push(ProfileNode {
                value: NodeValue::Route(RouteNode {
                    waypoint: wpt.clone(),
                    index: i,
                }),
                distance_from_origin_nm: distance,
                alt_ft: 0.0,
                phase: FlightPhase::Cruise,
                route_index: Some(i),
                prev_route_index: i.saturating_sub(1),
                next_route_index: (i + 1).min(last),
            });
            if i == last {
                break;
            }

            let leg = leg_distances[i];
            if let Some(spacing) = self.intermediate_spacing_nm.filter(|s| *s > 0.0) {
                let parts = (leg / spacing).ceil() as usize;
                for k in 1..parts {
                    let offset = leg * k as f64 / parts as f64;
                    nodes.push(ProfileNode {
                        value: NodeValue::Intermediate(IntermediateNode {
                            coordinate: interpolate_along(wpt, &waypoints[i + 1], offset),
                        }),
                        distance_from_origin_nm: distance + offset,
                        alt_ft: 0.0,
                        phase: FlightPhase::Cruise,
                        route_index: None,
                        prev_route_index: i,
                        next_route_index: i + 1,
                    });
                }
            }
            distance += leg;
        }
        nodes
    }

    fn assign_vertical(
        &self,
        mut nodes: Vec<ProfileNode>,
        profile: &VerticalProfile,
        origin_weight: f64,
        landing_weight: f64,
    ) -> Vec<ProfileNode> {
        let crz = profile.cruise_altitude_ft;
        let origin_elev = self.route.origin_elevation_ft();
        let dest_elev = self.route.destination_elevation_ft();
        let climb_gradient = self.profile.climb_gradient(origin_weight);
        let descent_gradient = self.profile.descent_gradient(landing_weight);

        let mut seen_toc = false;
        let mut seen_tod = false;
        for node in &mut nodes {
            let d = node.distance_from_origin_nm;
            seen_toc |= node.value.is_toc();
            seen_tod |= node.value.is_tod();
            (node.phase, node.alt_ft) = if seen_tod {
                let alt = dest_elev + (profile.total_distance_nm - d).max(0.0) * descent_gradient;
                (FlightPhase::Descent, alt.min(crz))
            } else if seen_toc {
                (FlightPhase::Cruise, crz)
            } else {
                let alt = origin_elev + d * climb_gradient;
                (FlightPhase::Climb, alt.min(crz))
            };
            if node.value.is_toc() || node.value.is_tod() {
                node.alt_ft = crz;
            }
        }
        nodes
    }
}

fn route_waypoint(value: &NodeValue) -> Option<Waypoint> {
    match value {
        NodeValue::Route(node) => Some(node.waypoint.clone()),
        NodeValue::Intermediate(_) | NodeValue::Toc(_) | NodeValue::Tod(_) => None,
    }
}

fn find_coincident(nodes: &[ProfileNode], distance: f64) -> Option<usize> {
    nodes
        .iter()
        .position(|n| (n.distance_from_origin_nm - distance).abs() <= COINCIDENT_NM)
}

/// Insert a node at `distance` between its neighbours, interpolating along their great circle.
fn insert_synthetic(
    nodes: &mut Vec<ProfileNode>,
    distance: f64,
    make: impl FnOnce(LatLon) -> NodeValue,
) -> usize {
    let after = nodes
        .iter()
        .rposition(|n| n.distance_from_origin_nm < distance)
        .unwrap_or(0);
    let before = &nodes[after];
    let next = &nodes[(after + 1).min(nodes.len() - 1)];
    let coordinate = interpolate_along(
        &before.value.coordinate(),
        &next.value.coordinate(),
        distance - before.distance_from_origin_nm,
    );
    let (prev_route_index, next_route_index) = match before.route_index {
        Some(k) => (k, k + 1),
        None => (before.prev_route_index, before.next_route_index),
    };
    let node = ProfileNode {
        value: make(coordinate),
        distance_from_origin_nm: distance,
        alt_ft: 0.0,
        phase: FlightPhase::Cruise,
        route_index: None,
        prev_route_index,
        next_route_index,
    };
    nodes.insert(after + 1, node);
    after + 1
}

/// Round down to the semicircular level for a true course: odd thousands eastbound, even westbound.
pub fn semicircular_level(altitude_ft: f64, course_deg: f64) -> f64 {
    if course_deg.rem_euclid(360.0) < 180.0 {
        ((altitude_ft - 1000.0) / 2000.0).floor() * 2000.0 + 1000.0
    } else {
        (altitude_ft / 2000.0).floor() * 2000.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interp::{Table1D, Table2D};
    use crate::perf::{FuelFlowTables, TabularProfile};
    use crate::spatial::{offset_by_bearing, Coordinate};

    fn profile(climb_gradient: f64, descent_gradient: f64) -> TabularProfile {
        TabularProfile {
            name: "TEST".into(),
            fuel_flow: FuelFlowTables {
                climb: Table2D::constant(60.0),
                cruise: Table2D::constant(40.0),
                descent: Table2D::constant(20.0),
                hold: Table2D::constant(35.0),
            },
            climb_gradient: Table1D::constant(climb_gradient),
            descent_gradient: Table1D::constant(descent_gradient),
            climb_kias: Table1D::constant(290.0),
            cruise_kias: Table1D::constant(280.0),
            descent_kias: Table1D::constant(290.0),
            hold_kias: Table1D::constant(210.0),
            max_cruise_altitude: Table1D::constant(41_000.0),
            optimum_cruise_altitude: Table2D::constant(38_500.0),
            taxi_flow_kg_min: 10.0,
            apu_flow_kg_min: 2.0,
        }
    }

    /// Waypoints `spacing_nm` apart along a true course from (0, 0).
    fn route(count: usize, spacing_nm: f64, course: f64) -> Route {
        let waypoints = (0..count)
            .map(|i| {
                let p = offset_by_bearing(0.0, 0.0, spacing_nm * i as f64, course);
                Waypoint::from_coordinate(format!("WP{i}"), &p)
            })
            .collect();
        Route::new(waypoints).unwrap()
    }

    #[test]
    fn toc_precedes_tod_with_interpolated_positions() {
        let route = route(3, 500.0, 90.0);
        let perf = profile(300.0, 350.0);
        let vp = NodeBuilder::new(&route, &perf)
            .build(35_000.0, 70_000.0, 60_000.0)
            .unwrap();

        let toc = vp.toc_index().unwrap();
        let tod = vp.tod_index().unwrap();
        assert!(toc < tod);
        assert_eq!(vp.nodes.len(), 5);
        assert!((vp.toc_distance_nm - 35_000.0 / 300.0).abs() < 1e-9);
        assert!((vp.tod_distance_nm - (vp.total_distance_nm - 100.0)).abs() < 1e-6);

        let toc_node = &vp.nodes[toc];
        let origin = route.origin();
        assert!((origin.distance_nm(&toc_node.value.coordinate()) - vp.toc_distance_nm).abs() < 1e-6);
        assert_eq!(toc_node.alt_ft, 35_000.0);
        assert_eq!(toc_node.phase, FlightPhase::Cruise);
        assert_eq!(vp.nodes[0].phase, FlightPhase::Climb);
        assert_eq!(vp.nodes[tod].phase, FlightPhase::Descent);
        assert_eq!((toc_node.prev_route_index, toc_node.next_route_index), (0, 1));
        assert_eq!((vp.nodes[tod].prev_route_index, vp.nodes[tod].next_route_index), (1, 2));
    }

    #[test]
    fn altitudes_follow_linear_climb_and_descent() {
        let route = route(3, 200.0, 90.0);
        let perf = profile(80.0, 200.0);
        let vp = NodeBuilder::new(&route, &perf)
            .build(20_000.0, 70_000.0, 60_000.0)
            .unwrap();
        let labels: Vec<_> = vp.nodes.iter().map(|n| n.value.label()).collect();
        assert_eq!(labels, ["WP0", "WP1", "TOC", "TOD", "WP2"]);

        let alts: Vec<_> = vp.nodes.iter().map(|n| n.alt_ft).collect();
        assert_eq!(alts[0], 0.0);
        assert!((alts[1] - 16_000.0).abs() < 1e-6);
        assert_eq!(alts[2], 20_000.0);
        assert_eq!(alts[3], 20_000.0);
        assert!(alts[4].abs() < 1e-6);
        assert_eq!(vp.nodes[1].phase, FlightPhase::Climb);
    }

    #[test]
    fn toc_on_existing_waypoint_does_not_duplicate() {
        let route = route(3, 100.0, 90.0);
        // Exactly 100 nm of climb lands TOC on WP1.
        let perf = profile(300.0, 1_000_000.0);
        let vp = NodeBuilder::new(&route, &perf)
            .build(30_000.0, 70_000.0, 60_000.0)
            .unwrap();
        let labels: Vec<_> = vp.nodes.iter().map(|n| n.value.label()).collect();
        assert_eq!(labels, ["WP0", "WP1/TOC", "TOD", "WP2"]);
        assert_eq!(vp.nodes[1].value.coordinate(), route.waypoints()[1].to_lat_lon());
    }

    #[test]
    fn too_short_route_is_infeasible() {
        let route = route(2, 150.0, 90.0);
        let perf = profile(300.0, 300.0);
        let err = NodeBuilder::new(&route, &perf)
            .build(35_000.0, 70_000.0, 60_000.0)
            .unwrap_err();
        assert!(matches!(err, FuelError::InfeasibleProfile { .. }));
    }

    #[test]
    fn exact_fit_puts_toc_and_tod_together() {
        let route = route(2, 200.0, 90.0);
        let total = route.total_distance_nm();
        let perf = profile(30_000.0 / (total / 2.0), 30_000.0 / (total / 2.0));
        let vp = NodeBuilder::new(&route, &perf)
            .build(30_000.0, 70_000.0, 60_000.0)
            .unwrap();
        let toc = vp.toc_index().unwrap();
        let tod = vp.tod_index().unwrap();
        assert_eq!(tod, toc + 1);
        assert!(vp.leg_distance_nm(toc).abs() < 1e-6);
    }

    #[test]
    fn intermediate_nodes_split_long_legs() {
        let route = route(2, 1000.0, 45.0);
        let perf = profile(1e9, 1e9);
        let vp = NodeBuilder::new(&route, &perf)
            .with_intermediate_spacing(Some(300.0))
            .build(0.0, 70_000.0, 60_000.0)
            .unwrap();
        let intermediates = vp
            .nodes
            .iter()
            .filter(|n| matches!(n.value, NodeValue::Intermediate(_)))
            .count();
        assert_eq!(intermediates, 3);
        for i in 0..vp.nodes.len() - 1 {
            assert!(vp.leg_distance_nm(i) <= 300.0 + 1e-9);
        }
    }

    #[test]
    fn cruise_below_airport_elevation_is_invalid() {
        let route = route(2, 500.0, 90.0).with_elevations(5000.0, 0.0).unwrap();
        let perf = profile(300.0, 300.0);
        let err = NodeBuilder::new(&route, &perf)
            .build(4000.0, 70_000.0, 60_000.0)
            .unwrap_err();
        assert!(matches!(
            err,
            FuelError::InvalidParameter {
                name: "cruise_altitude_ft",
                ..
            }
        ));
    }

    #[test]
    fn semicircular_rule_by_direction() {
        assert_eq!(semicircular_level(38_500.0, 90.0), 37_000.0);
        assert_eq!(semicircular_level(38_500.0, 270.0), 38_000.0);
        assert_eq!(semicircular_level(37_000.0, 10.0), 37_000.0);
    }

    #[test]
    fn optimum_picks_highest_feasible_level() {
        let perf = profile(300.0, 300.0);
        let east = route(2, 2000.0, 90.0);
        let level = NodeBuilder::new(&east, &perf)
            .select_cruise_altitude(CruiseAltitude::Optimum, 50_000.0, 70_000.0, 60_000.0, 2000.0)
            .unwrap();
        assert_eq!(level, 37_000.0);

        let west = route(2, 2000.0, 270.0);
        let level = NodeBuilder::new(&west, &perf)
            .select_cruise_altitude(CruiseAltitude::Optimum, 50_000.0, 70_000.0, 60_000.0, 2000.0)
            .unwrap();
        assert_eq!(level, 38_000.0);

        // 180 nm route fits at most 27,000 ft of climb and descent at 300 ft/nm.
        let short = route(2, 180.0, 90.0);
        let level = NodeBuilder::new(&short, &perf)
            .select_cruise_altitude(CruiseAltitude::Optimum, 50_000.0, 70_000.0, 60_000.0, 2000.0)
            .unwrap();
        assert_eq!(level, 27_000.0);
    }
}
