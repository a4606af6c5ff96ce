//! Resource constrained scheduling for public transport and road maintenance.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::optimization::data::CityData;

pub mod bus;
pub mod improvement;
pub mod maintenance;
pub mod metro;

pub use bus::{optimize_bus_routes, BusSchedule};
pub use improvement::{estimate_improvement, ImprovementEstimate};
pub use maintenance::{optimize_road_maintenance, MaintenancePlan, SelectedRoad};
pub use metro::{frequency_table, optimize_metro_lines, MetroSchedule};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct ScheduleSettings {
    /// Road maintenance budget in million EGP.
    pub maintenance_budget: usize,
    /// Passengers per train.
    pub train_capacity: f64,
    pub operating_hours: f64,
    /// Trains per hour every station pair is served with at least.
    pub min_frequency: f64,
    pub min_trains: u32,
    /// Passengers per bus and trip.
    pub bus_capacity: f64,
    pub trips_per_bus: f64,
    pub min_buses: f64,
    /// Upper bound of the overall improvement estimate.
    pub max_improvement: f64,
}

impl Default for ScheduleSettings {
    fn default() -> Self {
        ScheduleSettings {
            maintenance_budget: 500,
            train_capacity: 1000.,
            operating_hours: 18.,
            min_frequency: 2.,
            min_trains: 4,
            bus_capacity: 50.,
            trips_per_bus: 10.,
            min_buses: 2.,
            max_improvement: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduleReport {
    pub metro_schedules: Vec<MetroSchedule>,
    pub bus_schedules: Vec<BusSchedule>,
    pub maintenance_plan: MaintenancePlan,
    pub estimated_improvement: ImprovementEstimate,
}

#[tracing::instrument(level = "trace", skip(data, settings))]
pub fn optimize_schedules(data: &CityData, settings: &ScheduleSettings) -> ScheduleReport {
    let metro_schedules = optimize_metro_lines(data, settings);
    let bus_schedules = optimize_bus_routes(data, settings);
    let maintenance_plan = optimize_road_maintenance(data, settings);
    let estimated_improvement = estimate_improvement(
        &metro_schedules,
        &bus_schedules,
        &maintenance_plan,
        settings,
    );
    info!(
        "Schedules: {} metro lines, {} bus routes, {} roads to maintain, estimated improvement {:.1}%",
        metro_schedules.len(),
        bus_schedules.len(),
        maintenance_plan.selected_roads.len(),
        estimated_improvement.total * 100.
    );
    ScheduleReport {
        metro_schedules,
        bus_schedules,
        maintenance_plan,
        estimated_improvement,
    }
}
