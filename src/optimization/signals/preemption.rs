use std::collections::VecDeque;

use itertools::Itertools;
use nohash_hasher::IntSet;
use tracing::{debug, info};

use crate::optimization::data::traffic::TimeOfDay;
use crate::optimization::data::{CityData, Location};
use crate::optimization::error::OptimizationError;
use crate::optimization::id::Id;
use crate::optimization::signals::allocation::plan_intersection;
use crate::optimization::signals::{IntersectionPlan, PreemptionRecord, SignalSettings};

/// Intersections (locations with more than two roads) an emergency vehicle passes between
/// two consecutive stops. Directly connected stops pass none. Otherwise the locations are
/// explored breadth first from `start` until `end` is reached, and every examined neighbor
/// that is an intersection is reported in discovery order.
pub fn intersections_between(
    data: &CityData,
    start: &Id<Location>,
    end: &Id<Location>,
) -> Vec<Id<Location>> {
    if data.road_between(start, end).is_some() {
        return Vec::new();
    }

    let mut intersections = Vec::new();
    let mut recorded = IntSet::default();
    let mut visited = IntSet::default();
    let mut queue = VecDeque::from([start.clone()]);
    visited.insert(start.clone());

    while let Some(current) = queue.pop_front() {
        if current == *end {
            break;
        }
        for neighbor in data.neighbors(&current) {
            if data.degree(neighbor) > 2 && recorded.insert(neighbor.clone()) {
                intersections.push(neighbor.clone());
            }
            if visited.insert(neighbor.clone()) {
                queue.push_back(neighbor.clone());
            }
        }
    }
    intersections
}

fn waiting_time(green: f64, cycle: f64) -> f64 {
    cycle * (1. - green / cycle) / 2.
}

/// Gives the approach from `arriving_from` the preemption share of the cycle and scales all
/// other approaches down. If several roads join the intersection and `arriving_from`, only
/// the first of their phases is preempted. Returns None if `arriving_from` is not an
/// approach of the plan.
fn preempt(
    plan: &IntersectionPlan,
    arriving_from: &str,
    settings: &SignalSettings,
) -> Option<(IntersectionPlan, f64)> {
    let emergency_phase = plan
        .phases
        .iter()
        .position(|p| p.from_id == arriving_from)?;
    let original = &plan.phases[emergency_phase];
    let mut modified = plan.clone();
    for (i, phase) in modified.phases.iter_mut().enumerate() {
        if i == emergency_phase {
            phase.green_time_seconds = plan.cycle_time_seconds * settings.preemption_share;
            phase.emergency_priority = true;
        } else {
            phase.green_time_seconds *= settings.preemption_reduction;
        }
    }

    let cycle = plan.cycle_time_seconds;
    let preempted_green = plan.cycle_time_seconds * settings.preemption_share;
    let time_saved = (waiting_time(original.green_time_seconds, cycle)
        - waiting_time(preempted_green, cycle))
    .max(0.);
    Some((modified, time_saved))
}

#[tracing::instrument(level = "trace", skip(data, settings))]
pub fn emergency_preemption(
    data: &CityData,
    route: &[String],
    time_of_day: TimeOfDay,
    settings: &SignalSettings,
) -> Result<Vec<PreemptionRecord>, OptimizationError> {
    if route.len() < 2 {
        return Err(OptimizationError::EmptyInput(String::from(
            "an emergency route needs at least two stops",
        )));
    }
    let stops = route
        .iter()
        .map(|s| {
            data.location_id(s)
                .ok_or_else(|| OptimizationError::InvalidLocation(s.clone()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut records = Vec::new();
    for (from, to) in stops.iter().tuple_windows() {
        for intersection in intersections_between(data, from, to) {
            let Some(plan) = plan_intersection(data, &intersection, time_of_day, settings) else {
                continue;
            };
            let Some((modified_plan, time_saved)) = preempt(&plan, from.external(), settings)
            else {
                debug!("Intersection {intersection} has no approach from {from}. Skipping it.");
                continue;
            };
            records.push(PreemptionRecord {
                intersection_id: plan.intersection_id.clone(),
                intersection_name: plan.intersection_name.clone(),
                emergency_approach: from.external().to_string(),
                emergency_approach_name: data.location(from).name.clone(),
                original_plan: plan,
                modified_plan,
                time_saved_seconds: time_saved,
            });
        }
    }

    info!(
        "Emergency preemption along {} stops changes {} signal plans",
        stops.len(),
        records.len()
    );
    Ok(records)
}
