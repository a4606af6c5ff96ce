use itertools::Itertools;
use serde::Serialize;
use tracing::debug;

use crate::optimization::data::CityData;
use crate::optimization::schedule::ScheduleSettings;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BusSchedule {
    pub route_id: String,
    pub stops: Vec<String>,
    pub stop_names: Vec<String>,
    /// Passengers between all stop pairs of the route, both directions.
    pub demand: u64,
    pub optimal_buses: f64,
    pub current_buses: u32,
    /// Passengers over the daily capacity of the current fleet. 0 without buses.
    pub utilization: f64,
}

pub fn optimize_bus_routes(data: &CityData, settings: &ScheduleSettings) -> Vec<BusSchedule> {
    let daily_capacity_per_bus = settings.bus_capacity * settings.trips_per_bus;
    data.bus_routes()
        .iter()
        .map(|route| {
            let demand: u64 = route
                .stops
                .iter()
                .tuple_combinations()
                .map(|(a, b)| data.undirected_demand(a, b))
                .sum();
            let optimal_buses = settings
                .min_buses
                .max(demand as f64 / daily_capacity_per_bus);
            let utilization = if route.buses > 0 {
                route.passengers as f64 / (route.buses as f64 * daily_capacity_per_bus)
            } else {
                0.
            };
            debug!(
                "Bus route {}: demand {demand}, {optimal_buses:.1} buses, utilization {utilization:.2}",
                route.id
            );
            BusSchedule {
                route_id: route.id.clone(),
                stops: route.stops.iter().map(|s| s.external().to_string()).collect(),
                stop_names: route
                    .stops
                    .iter()
                    .map(|s| data.location(s).name.clone())
                    .collect(),
                demand,
                optimal_buses,
                current_buses: route.buses,
                utilization,
            }
        })
        .collect()
}
