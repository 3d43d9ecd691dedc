//! Plan nodes: the points the fuel integration steps through.
//!
//! Variable units: altitude ft, time min, distance nm, speed kt, weight and
//! fuel kg. "Previous" and "next" always refer to route order, never to the
//! order in which an integration sweep visits the nodes.

use crate::error::{FuelError, Result};
use crate::models::Waypoint;
use crate::spatial::{Coordinate, LatLon, Vector3D};
use crate::speed::ktas;
use crate::wind::{WindTable, WindVector};
use std::fmt;

/// A waypoint of the lateral route; `index` is its position in the route.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteNode {
    pub waypoint: Waypoint,
    pub index: usize,
}

/// A point injected along a route leg.
#[derive(Debug, Clone, PartialEq)]
pub struct IntermediateNode {
    pub coordinate: LatLon,
}

/// Transition from climb to cruise.
#[derive(Debug, Clone, PartialEq)]
pub struct TocNode {
    pub coordinate: LatLon,
    /// Route waypoint whose position this node took over, if any.
    pub replaces: Option<Waypoint>,
}

/// Transition from cruise to descent.
#[derive(Debug, Clone, PartialEq)]
pub struct TodNode {
    pub coordinate: LatLon,
    pub replaces: Option<Waypoint>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeValue {
    Route(RouteNode),
    Intermediate(IntermediateNode),
    Toc(TocNode),
    Tod(TodNode),
}

impl NodeValue {
    pub fn coordinate(&self) -> LatLon {
        match self {
            NodeValue::Route(node) => node.waypoint.to_lat_lon(),
            NodeValue::Intermediate(node) => node.coordinate,
            NodeValue::Toc(node) => node.coordinate,
            NodeValue::Tod(node) => node.coordinate,
        }
    }

    /// Identifier shown in leg breakdowns.
    pub fn label(&self) -> String {
        match self {
            NodeValue::Route(node) => node.waypoint.ident.clone(),
            NodeValue::Intermediate(_) => "(INT)".to_string(),
            NodeValue::Toc(TocNode {
                replaces: Some(wpt),
                ..
            }) => format!("{}/TOC", wpt.ident),
            NodeValue::Toc(_) => "TOC".to_string(),
            NodeValue::Tod(TodNode {
                replaces: Some(wpt),
                ..
            }) => format!("{}/TOD", wpt.ident),
            NodeValue::Tod(_) => "TOD".to_string(),
        }
    }

    pub fn is_toc(&self) -> bool {
        matches!(self, NodeValue::Toc(_))
    }

    pub fn is_tod(&self) -> bool {
        matches!(self, NodeValue::Tod(_))
    }
}

impl fmt::Display for NodeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// Speed over ground when flying `ktas` along a unit track `(east, north)` in `wind`.
///
/// The aircraft crabs to hold the track: crosswind costs airspeed, along-track wind adds to it.
/// Returns NaN when the crosswind exceeds the true airspeed.
pub fn ground_speed(ktas: f64, wind: WindVector, track: Option<(f64, f64)>) -> f64 {
    let Some((track_e, track_n)) = track else {
        return ktas;
    };
    let along = wind.east_kt * track_e + wind.north_kt * track_n;
    let cross = wind.east_kt * track_n - wind.north_kt * track_e;
    let head = ktas * ktas - cross * cross;
    if head < 0.0 {
        return f64::NAN;
    }
    head.sqrt() + along
}

/// Unit track at `here` toward `next`, falling back to continuing the great circle from `prev`.
pub(crate) fn track_at(here: &Vector3D, prev: &Vector3D, next: &Vector3D) -> Option<(f64, f64)> {
    let tangent = here
        .tangent_toward(next)
        .or_else(|| here.tangent_toward(prev).map(|t| -t))?;
    Some((tangent.dot(&here.east()), tangent.dot(&here.north())))
}

/// True airspeed and ground speed of one node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Kinematics {
    pub ktas: f64,
    pub gs: f64,
    pub wind: WindVector,
}

impl Kinematics {
    /// Wind is sampled at the node's own coordinate and altitude.
    pub fn evaluate(inputs: &PlanNodeInputs<'_>) -> Kinematics {
        let here = inputs.value.coordinate();
        let tas = ktas(inputs.kias, inputs.alt_ft);
        let wind = inputs.wind.sample(&here, inputs.alt_ft);
        let track = track_at(
            &here.to_vector3d(),
            &inputs.prev_waypoint.to_vector3d(),
            &inputs.next_plan_coordinate.to_vector3d(),
        );
        Kinematics {
            ktas: tas,
            gs: ground_speed(tas, wind, track),
            wind,
        }
    }
}

/// Static inputs of a plan node: what it is, where it sits and how it is flown.
#[derive(Clone)]
pub struct PlanNodeInputs<'a> {
    /// Position in the plan, origin = 0.
    pub index: usize,
    pub value: NodeValue,
    pub wind: &'a dyn WindTable,
    pub prev_waypoint: &'a Waypoint,
    pub next_route_waypoint: &'a Waypoint,
    pub next_plan_coordinate: LatLon,
    pub alt_ft: f64,
    pub kias: f64,
}

/// Integration state at a node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeState {
    pub gross_weight: f64,
    pub fuel_on_board: f64,
    /// Minutes still to fly to the destination.
    pub time_remaining: f64,
}

pub struct PlanNode<'a> {
    inputs: PlanNodeInputs<'a>,
    state: NodeState,
    kinematics: Kinematics,
}

impl<'a> PlanNode<'a> {
    pub fn new(inputs: PlanNodeInputs<'a>, state: NodeState) -> Result<Self> {
        let kinematics = Kinematics::evaluate(&inputs);
        Self::from_parts(inputs, state, kinematics)
    }

    /// Build from kinematics already evaluated for these inputs.
    pub fn from_parts(
        inputs: PlanNodeInputs<'a>,
        state: NodeState,
        kinematics: Kinematics,
    ) -> Result<Self> {
        check_ground_speed(&inputs, kinematics.gs)?;
        Ok(Self {
            inputs,
            state,
            kinematics,
        })
    }

    pub fn value(&self) -> &NodeValue {
        &self.inputs.value
    }

    pub fn coordinate(&self) -> LatLon {
        self.inputs.value.coordinate()
    }

    pub fn wind_table(&self) -> &'a dyn WindTable {
        self.inputs.wind
    }

    pub fn prev_waypoint(&self) -> &'a Waypoint {
        self.inputs.prev_waypoint
    }

    pub fn next_route_waypoint(&self) -> &'a Waypoint {
        self.inputs.next_route_waypoint
    }

    pub fn next_plan_coordinate(&self) -> LatLon {
        self.inputs.next_plan_coordinate
    }

    pub fn alt_ft(&self) -> f64 {
        self.inputs.alt_ft
    }

    pub fn kias(&self) -> f64 {
        self.inputs.kias
    }

    pub fn gross_weight(&self) -> f64 {
        self.state.gross_weight
    }

    pub fn fuel_on_board(&self) -> f64 {
        self.state.fuel_on_board
    }

    pub fn time_remaining(&self) -> f64 {
        self.state.time_remaining
    }

    pub fn state(&self) -> NodeState {
        self.state
    }

    pub fn ktas(&self) -> f64 {
        self.kinematics.ktas
    }

    pub fn gs(&self) -> f64 {
        self.kinematics.gs
    }

    pub fn wind(&self) -> WindVector {
        self.kinematics.wind
    }
}

impl fmt::Debug for PlanNode<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlanNode")
            .field("index", &self.inputs.index)
            .field("value", &self.inputs.value)
            .field("alt_ft", &self.inputs.alt_ft)
            .field("state", &self.state)
            .field("kinematics", &self.kinematics)
            .finish_non_exhaustive()
    }
}

pub(crate) fn check_ground_speed(inputs: &PlanNodeInputs<'_>, gs: f64) -> Result<()> {
    if gs > 0.0 && gs.is_finite() {
        return Ok(());
    }
    Err(FuelError::NonPositiveGroundSpeed {
        leg: inputs.index,
        from: inputs.value.label(),
        ground_speed: gs,
    })
}
