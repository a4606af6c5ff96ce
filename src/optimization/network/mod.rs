use std::fmt::{Display, Formatter};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

pub mod builder;

#[derive(
    PartialEq, Eq, Hash, Debug, ValueEnum, Clone, Copy, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum TravelMode {
    #[default]
    Normal,
    Emergency,
}

impl TravelMode {
    pub fn speed_profile(self) -> SpeedProfile {
        match self {
            TravelMode::Normal => SpeedProfile {
                base_speed: 30.,
                decay: 0.4,
                floor: 0.2,
            },
            TravelMode::Emergency => SpeedProfile {
                base_speed: 80.,
                decay: 0.3,
                floor: 0.4,
            },
        }
    }
}

impl Display for TravelMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            TravelMode::Normal => f.write_str("normal"),
            TravelMode::Emergency => f.write_str("emergency"),
        }
    }
}

/// How fast vehicles of a mode move and how strongly congestion slows them down.
/// Speeds are in km/h.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeedProfile {
    pub base_speed: f64,
    pub decay: f64,
    pub floor: f64,
}

impl SpeedProfile {
    pub fn speed_factor(&self, congestion: f64) -> f64 {
        self.floor.max(1. - congestion * self.decay)
    }

    pub fn speed(&self, congestion: f64) -> f64 {
        self.base_speed * self.speed_factor(congestion)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GraphPurpose {
    #[default]
    Routing,
    NetworkDesign,
}
