use itertools::Itertools;
use nohash_hasher::IntSet;
use tracing::{debug, info};

use crate::optimization::data::traffic::TimeOfDay;
use crate::optimization::data::{CityData, Location};
use crate::optimization::id::Id;
use crate::optimization::signals::{ApproachScore, IntersectionPlan, SignalPhase, SignalSettings};

/// The `count` locations with the most existing roads. Ties keep the order in which the
/// locations first appear in the road list.
pub fn major_intersections(data: &CityData, count: usize) -> Vec<Id<Location>> {
    let mut seen = IntSet::default();
    data.roads()
        .iter()
        .flat_map(|r| [&r.from, &r.to])
        .filter(|id| seen.insert((*id).clone()))
        .cloned()
        .sorted_by_key(|id| std::cmp::Reverse(data.degree(id)))
        .take(count)
        .collect()
}

/// Scores every approach of `intersection`, highest priority first.
pub fn score_approaches(
    data: &CityData,
    intersection: &Id<Location>,
    time_of_day: TimeOfDay,
    settings: &SignalSettings,
) -> Vec<ApproachScore> {
    data.connected_roads(intersection)
        .filter_map(|road| {
            let other = road.other_end(intersection)?;
            let traffic = data.traffic(intersection, other, time_of_day);
            let congestion = traffic as f64 / road.capacity;
            let location = data.location(other);
            let bonus = if location.is_facility()
                && settings
                    .priority_categories
                    .iter()
                    .any(|c| *c == location.category)
            {
                settings.priority_bonus
            } else {
                0.
            };
            Some(ApproachScore {
                from_id: other.external().to_string(),
                from_name: location.name.clone(),
                traffic,
                congestion,
                priority: 1. + settings.congestion_weight * congestion + bonus,
            })
        })
        .sorted_by(|a, b| b.priority.total_cmp(&a.priority))
        .collect()
}

/// Distributes the cycle over the scored approaches. Returns the phases and the cycle
/// length they add up to, which exceeds the configured cycle if the minimum greens alone
/// do not fit into it.
pub fn allocate_green_time(
    scores: &[ApproachScore],
    settings: &SignalSettings,
) -> (Vec<SignalPhase>, f64) {
    let minimum = settings.min_green * scores.len() as f64;
    let cycle = settings.cycle_time.max(minimum);
    let remaining = cycle - minimum;
    let total_priority: f64 = scores.iter().map(|s| s.priority).sum();

    let phases = scores
        .iter()
        .map(|score| {
            let extra = if total_priority > 0. {
                score.priority / total_priority * remaining
            } else {
                0.
            };
            SignalPhase {
                from_id: score.from_id.clone(),
                from_name: score.from_name.clone(),
                traffic: score.traffic,
                congestion: score.congestion,
                priority: score.priority,
                green_time_seconds: settings.min_green + extra,
                emergency_priority: false,
            }
        })
        .collect();
    (phases, cycle)
}

/// Plans a single intersection. Returns None for locations without roads.
pub fn plan_intersection(
    data: &CityData,
    intersection: &Id<Location>,
    time_of_day: TimeOfDay,
    settings: &SignalSettings,
) -> Option<IntersectionPlan> {
    let scores = score_approaches(data, intersection, time_of_day, settings);
    if scores.is_empty() {
        return None;
    }
    let (phases, cycle) = allocate_green_time(&scores, settings);
    debug!(
        "Intersection {intersection}: {} approaches, cycle {cycle} s",
        phases.len()
    );
    Some(IntersectionPlan {
        intersection_id: intersection.external().to_string(),
        intersection_name: data.location(intersection).name.clone(),
        approach_count: data.degree(intersection),
        phases,
        cycle_time_seconds: cycle,
    })
}

/// Plans the requested intersections, or the busiest ones if none are requested. Unknown
/// ids and locations without roads are skipped.
#[tracing::instrument(level = "trace", skip(data, settings))]
pub fn optimize_signals(
    data: &CityData,
    intersection_ids: &[String],
    time_of_day: TimeOfDay,
    settings: &SignalSettings,
) -> Vec<IntersectionPlan> {
    let intersections = if intersection_ids.is_empty() {
        major_intersections(data, settings.top_intersections)
    } else {
        intersection_ids
            .iter()
            .filter_map(|id| data.location_id(id))
            .collect()
    };

    let plans: Vec<IntersectionPlan> = intersections
        .iter()
        .filter_map(|id| plan_intersection(data, id, time_of_day, settings))
        .collect();
    info!(
        "Planned signals for {} of {} intersections ({time_of_day})",
        plans.len(),
        intersections.len()
    );
    plans
}
