use serde::Serialize;

use crate::optimization::schedule::{BusSchedule, MaintenancePlan, MetroSchedule, ScheduleSettings};

/// Rough share of travel time the schedules would save, per area and overall.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ImprovementEstimate {
    pub metro: f64,
    pub bus: f64,
    pub road: f64,
    pub total: f64,
}

pub fn estimate_improvement(
    metro_schedules: &[MetroSchedule],
    bus_schedules: &[BusSchedule],
    maintenance_plan: &MaintenancePlan,
    settings: &ScheduleSettings,
) -> ImprovementEstimate {
    let metro = metro_schedules
        .iter()
        .filter(|m| m.current_trains > 0)
        .map(|m| m.trains_needed as f64 / m.current_trains as f64 * 0.2)
        .sum::<f64>();

    let bus = bus_schedules
        .iter()
        .filter(|b| b.current_buses > 0 && b.utilization > 1.)
        .map(|b| b.optimal_buses / b.current_buses as f64 * 0.15)
        .sum::<f64>();

    let road = if maintenance_plan.selected_roads.is_empty() {
        0.
    } else {
        maintenance_plan.average_improvement * 0.05
    };

    ImprovementEstimate {
        metro,
        bus,
        road,
        total: settings.max_improvement.min((metro + bus + road) / 3.),
    }
}

#[cfg(test)]
mod tests {
    use assert_approx_eq::assert_approx_eq;

    use crate::optimization::schedule::improvement::estimate_improvement;
    use crate::optimization::schedule::{
        BusSchedule, MaintenancePlan, MetroSchedule, ScheduleSettings,
    };

    fn metro(trains_needed: u32, current_trains: u32) -> MetroSchedule {
        MetroSchedule {
            line_id: String::from("M"),
            line_name: String::from("M"),
            stations: vec![],
            station_names: vec![],
            optimal_frequency: 2.,
            trains_needed,
            current_trains,
        }
    }

    fn bus(optimal_buses: f64, current_buses: u32, utilization: f64) -> BusSchedule {
        BusSchedule {
            route_id: String::from("B"),
            stops: vec![],
            stop_names: vec![],
            demand: 0,
            optimal_buses,
            current_buses,
            utilization,
        }
    }

    fn empty_plan() -> MaintenancePlan {
        MaintenancePlan {
            budget: 500,
            selected_roads: vec![],
            total_cost: 0,
            total_value: 0.,
            average_improvement: 0.,
        }
    }

    #[test]
    fn sum_areas() {
        let estimate = estimate_improvement(
            &[metro(40, 40), metro(10, 0)],
            &[bus(30., 20, 1.5), bus(30., 20, 0.9), bus(5., 0, 0.)],
            &empty_plan(),
            &ScheduleSettings::default(),
        );

        assert_approx_eq!(0.2, estimate.metro);
        assert_approx_eq!(0.225, estimate.bus);
        assert_eq!(0., estimate.road);
        assert_approx_eq!(0.425 / 3., estimate.total);
    }

    #[test]
    fn total_is_capped() {
        let metros: Vec<_> = (0..10).map(|_| metro(80, 40)).collect();
        let estimate =
            estimate_improvement(&metros, &[], &empty_plan(), &ScheduleSettings::default());

        assert_approx_eq!(4., estimate.metro);
        assert_eq!(0.5, estimate.total);
    }
}
