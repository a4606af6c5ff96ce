use serde::Serialize;
use tracing::debug;

use crate::optimization::data::traffic::TimeOfDay;
use crate::optimization::data::{CityData, Road};
use crate::optimization::schedule::ScheduleSettings;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectedRoad {
    pub from: String,
    pub to: String,
    pub from_name: String,
    pub to_name: String,
    pub condition: u8,
    /// Peak of morning and evening traffic.
    pub traffic: u32,
    /// Million EGP to bring the road to condition 10.
    pub cost: usize,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MaintenancePlan {
    pub budget: usize,
    pub selected_roads: Vec<SelectedRoad>,
    pub total_cost: usize,
    pub total_value: f64,
    /// Mean of `10 - condition` over the selected roads. 0 if nothing is selected.
    pub average_improvement: f64,
}

fn candidate(data: &CityData, road: &Road) -> SelectedRoad {
    let traffic = data
        .traffic(&road.from, &road.to, TimeOfDay::Morning)
        .max(data.traffic(&road.from, &road.to, TimeOfDay::Evening));
    let (from, to) = (data.location(&road.from), data.location(&road.to));

    let population_factor = match (from.population, to.population) {
        (Some(a), Some(b)) => (a + b) as f64 / 1_000_000.,
        _ => 0.,
    };
    let critical_factor = if from.is_facility() || to.is_facility() {
        2.
    } else {
        1.
    };
    let gap = 10 - road.condition;
    let improvement = gap as f64 * 0.5;

    SelectedRoad {
        from: road.from.external().to_string(),
        to: road.to.external().to_string(),
        from_name: from.name.clone(),
        to_name: to.name.clone(),
        condition: road.condition,
        traffic,
        cost: gap as usize * 5,
        value: traffic as f64 * (1. + population_factor) * critical_factor * improvement,
    }
}

/// Solves the 0/1 knapsack over (cost, value) items. Returns the indices of the chosen
/// items in descending order.
pub fn knapsack(items: &[(usize, f64)], budget: usize) -> Vec<usize> {
    let n = items.len();
    let mut table = vec![vec![0_f64; budget + 1]; n + 1];

    for i in 1..=n {
        let (cost, value) = items[i - 1];
        for w in 0..=budget {
            table[i][w] = if cost <= w {
                table[i - 1][w].max(table[i - 1][w - cost] + value)
            } else {
                table[i - 1][w]
            };
        }
    }

    let mut selected = Vec::new();
    let mut w = budget;
    for i in (1..=n).rev() {
        if table[i][w] != table[i - 1][w] {
            selected.push(i - 1);
            w -= items[i - 1].0;
        }
    }
    selected
}

pub fn optimize_road_maintenance(data: &CityData, settings: &ScheduleSettings) -> MaintenancePlan {
    let candidates: Vec<SelectedRoad> = data.roads().iter().map(|r| candidate(data, r)).collect();
    let items: Vec<(usize, f64)> = candidates.iter().map(|c| (c.cost, c.value)).collect();
    let chosen = knapsack(&items, settings.maintenance_budget);

    let selected_roads: Vec<SelectedRoad> =
        chosen.iter().map(|&i| candidates[i].clone()).collect();
    for road in &selected_roads {
        debug!(
            "Maintain road {}-{}: cost {}, value {:.1}",
            road.from, road.to, road.cost, road.value
        );
    }

    let average_improvement = if selected_roads.is_empty() {
        0.
    } else {
        selected_roads
            .iter()
            .map(|r| (10 - r.condition) as f64)
            .sum::<f64>()
            / selected_roads.len() as f64
    };

    MaintenancePlan {
        budget: settings.maintenance_budget,
        total_cost: selected_roads.iter().map(|r| r.cost).sum(),
        total_value: selected_roads.iter().map(|r| r.value).sum(),
        selected_roads,
        average_improvement,
    }
}
