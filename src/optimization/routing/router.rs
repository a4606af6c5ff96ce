use serde::Serialize;
use tracing::{debug, info, warn};

use crate::optimization::data::traffic::TimeOfDay;
use crate::optimization::data::{CityData, Location};
use crate::optimization::error::OptimizationError;
use crate::optimization::id::Id;
use crate::optimization::network::builder::{
    build_routing_graph, congestion, routing_weight, GraphRequestBuilder,
};
use crate::optimization::network::TravelMode;
use crate::optimization::routing::dijkstra::{Dijkstra, ShortestPathTree};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteStep {
    pub from: String,
    pub to: String,
    pub from_name: String,
    pub to_name: String,
    pub distance: f64,
    pub condition: u8,
    pub traffic: u32,
    pub capacity: f64,
    pub congestion: f64,
    /// Minutes.
    pub time: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteResult {
    pub path: Vec<String>,
    pub path_names: Vec<String>,
    /// (x, y) of every location on the path.
    pub coordinates: Vec<(f64, f64)>,
    pub total_distance: f64,
    /// Minutes, the sum over all step times.
    pub total_time: f64,
    pub steps: Vec<RouteStep>,
    pub average_congestion: f64,
    pub time_of_day: TimeOfDay,
    pub requested_mode: TravelMode,
    pub mode_used: TravelMode,
    /// Set if an emergency route was only found under normal traffic conditions.
    pub degraded: bool,
}

pub fn shortest_route(
    data: &CityData,
    start: &str,
    end: &str,
    time_of_day: TimeOfDay,
) -> Result<RouteResult, OptimizationError> {
    find_path(data, start, end, time_of_day, TravelMode::Normal)
}

pub fn emergency_route(
    data: &CityData,
    start: &str,
    end: &str,
    time_of_day: TimeOfDay,
) -> Result<RouteResult, OptimizationError> {
    find_path(data, start, end, time_of_day, TravelMode::Emergency)
}

#[tracing::instrument(level = "trace", skip(data))]
pub fn find_path(
    data: &CityData,
    start: &str,
    end: &str,
    time_of_day: TimeOfDay,
    mode: TravelMode,
) -> Result<RouteResult, OptimizationError> {
    let from = data
        .location_id(start)
        .ok_or_else(|| OptimizationError::InvalidLocation(start.to_string()))?;
    let to = data
        .location_id(end)
        .ok_or_else(|| OptimizationError::InvalidLocation(end.to_string()))?;

    let mut mode_used = mode;
    let mut tree = search(data, &from, &to, time_of_day, mode)?;

    if tree.distance(to.internal()).is_none() && mode == TravelMode::Emergency {
        warn!("No emergency route from {start} to {end}. Falling back to normal routing.");
        mode_used = TravelMode::Normal;
        tree = search(data, &from, &to, time_of_day, mode_used)?;
    }

    let (nodes, roads) = tree.path_to(to.internal()).ok_or_else(|| {
        OptimizationError::NoPathFound {
            from: start.to_string(),
            to: end.to_string(),
        }
    })?;

    let result = assemble(data, &nodes, &roads, time_of_day, mode, mode_used);
    info!(
        "Route {start} -> {end} ({time_of_day}, {mode_used}): {} stops, {:.2} km, {:.2} min",
        result.path.len(),
        result.total_distance,
        result.total_time
    );
    Ok(result)
}

fn search(
    data: &CityData,
    from: &Id<Location>,
    to: &Id<Location>,
    time_of_day: TimeOfDay,
    mode: TravelMode,
) -> Result<ShortestPathTree, OptimizationError> {
    let request = GraphRequestBuilder::default()
        .time_of_day(time_of_day)
        .mode(mode)
        .build();
    let graph = build_routing_graph(data, &request);
    for id in [from, to] {
        if !graph.contains(id) {
            return Err(OptimizationError::InvalidLocation(id.external().to_string()));
        }
    }
    Ok(Dijkstra::search(&graph, from.internal(), Some(to.internal())))
}

/// Builds the per road breakdown from the data for the mode that produced the path.
fn assemble(
    data: &CityData,
    nodes: &[usize],
    roads: &[usize],
    time_of_day: TimeOfDay,
    requested_mode: TravelMode,
    mode_used: TravelMode,
) -> RouteResult {
    let locations: Vec<&Location> = nodes.iter().map(|&n| &data.locations()[n]).collect();

    let steps: Vec<RouteStep> = locations
        .windows(2)
        .zip(roads)
        .map(|(pair, &road_index)| {
            let (from, to) = (pair[0], pair[1]);
            let road = &data.roads()[road_index];
            let traffic = data.traffic(&from.id, &to.id, time_of_day);
            let step = RouteStep {
                from: from.id.external().to_string(),
                to: to.id.external().to_string(),
                from_name: from.name.clone(),
                to_name: to.name.clone(),
                distance: road.distance,
                condition: road.condition,
                traffic,
                capacity: road.capacity,
                congestion: congestion(traffic, road.capacity),
                time: routing_weight(road, traffic, mode_used),
            };
            debug!(
                "Step {} -> {}: {:.2} km, congestion {:.2}, {:.2} min",
                step.from, step.to, step.distance, step.congestion, step.time
            );
            step
        })
        .collect();

    let average_congestion = if steps.is_empty() {
        0.
    } else {
        steps.iter().map(|s| s.congestion).sum::<f64>() / steps.len() as f64
    };

    RouteResult {
        path: locations
            .iter()
            .map(|l| l.id.external().to_string())
            .collect(),
        path_names: locations.iter().map(|l| l.name.clone()).collect(),
        coordinates: locations.iter().map(|l| (l.coord.x(), l.coord.y())).collect(),
        total_distance: steps.iter().map(|s| s.distance).sum(),
        total_time: steps.iter().map(|s| s.time).sum(),
        steps,
        average_congestion,
        time_of_day,
        requested_mode,
        mode_used,
        degraded: requested_mode != mode_used,
    }
}
