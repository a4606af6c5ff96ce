//! Traffic signal timing.
//!
//! Green time is distributed greedily by approach priority: every approach receives a
//! minimum green and the remainder of the cycle is split proportionally to the priorities.
//! Emergency preemption takes such a plan and hands most of the cycle to the approach an
//! emergency vehicle arrives from.

use serde::{Deserialize, Serialize};

pub mod allocation;
pub mod preemption;

pub use allocation::{
    allocate_green_time, major_intersections, optimize_signals, plan_intersection,
    score_approaches,
};
pub use preemption::{emergency_preemption, intersections_between};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct SignalSettings {
    /// Seconds.
    pub cycle_time: f64,
    /// Seconds every approach gets at least.
    pub min_green: f64,
    /// Number of intersections planned if none are requested.
    pub top_intersections: usize,
    /// Facility categories whose approaches get the priority bonus.
    pub priority_categories: Vec<String>,
    pub priority_bonus: f64,
    pub congestion_weight: f64,
    /// Share of the cycle given to the arriving emergency approach.
    pub preemption_share: f64,
    /// Factor applied to all other approaches during preemption.
    pub preemption_reduction: f64,
}

impl Default for SignalSettings {
    fn default() -> Self {
        SignalSettings {
            cycle_time: 120.,
            min_green: 15.,
            top_intersections: 10,
            priority_categories: vec![
                String::from("Medical"),
                String::from("Airport"),
                String::from("Government"),
            ],
            priority_bonus: 2.,
            congestion_weight: 2.,
            preemption_share: 0.7,
            preemption_reduction: 0.3,
        }
    }
}

/// Priority of one approach of an intersection before green time is assigned.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApproachScore {
    pub from_id: String,
    pub from_name: String,
    pub traffic: u32,
    /// Traffic over capacity, not capped.
    pub congestion: f64,
    pub priority: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignalPhase {
    pub from_id: String,
    pub from_name: String,
    pub traffic: u32,
    pub congestion: f64,
    pub priority: f64,
    pub green_time_seconds: f64,
    pub emergency_priority: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntersectionPlan {
    pub intersection_id: String,
    pub intersection_name: String,
    pub approach_count: usize,
    pub phases: Vec<SignalPhase>,
    pub cycle_time_seconds: f64,
}

impl IntersectionPlan {
    pub fn phase(&self, from_id: &str) -> Option<&SignalPhase> {
        self.phases.iter().find(|p| p.from_id == from_id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreemptionRecord {
    pub intersection_id: String,
    pub intersection_name: String,
    pub emergency_approach: String,
    pub emergency_approach_name: String,
    pub original_plan: IntersectionPlan,
    pub modified_plan: IntersectionPlan,
    pub time_saved_seconds: f64,
}
