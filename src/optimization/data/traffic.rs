use std::fmt::{Display, Formatter};
use std::str::FromStr;

use ahash::{AHashMap, RandomState};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Volume returned for roads without an observation for the requested time of day.
pub const DEFAULT_TRAFFIC_VOLUME: u32 = 1000;

#[derive(
    PartialEq, Eq, Hash, Debug, ValueEnum, Clone, Copy, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum TimeOfDay {
    #[default]
    Morning,
    Afternoon,
    Evening,
    Night,
}

impl TimeOfDay {
    pub const ALL: [TimeOfDay; 4] = [
        TimeOfDay::Morning,
        TimeOfDay::Afternoon,
        TimeOfDay::Evening,
        TimeOfDay::Night,
    ];

    fn slot(self) -> usize {
        match self {
            TimeOfDay::Morning => 0,
            TimeOfDay::Afternoon => 1,
            TimeOfDay::Evening => 2,
            TimeOfDay::Night => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TimeOfDay::Morning => "morning",
            TimeOfDay::Afternoon => "afternoon",
            TimeOfDay::Evening => "evening",
            TimeOfDay::Night => "night",
        }
    }
}

impl Display for TimeOfDay {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeOfDay {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TimeOfDay::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown time of day '{s}'"))
    }
}

/// Observed vehicle counts per undirected road and time bucket.
#[derive(Debug)]
pub struct TrafficTable {
    volumes: AHashMap<(usize, usize), [Option<u32>; 4]>,
}

impl Default for TrafficTable {
    fn default() -> Self {
        Self {
            volumes: AHashMap::with_hasher(RandomState::with_seed(42)),
        }
    }
}

impl TrafficTable {
    /// Registers the observations for the road between `a` and `b`. The first pattern
    /// registered for a pair wins, so the lookup for a pair is independent of direction.
    pub fn insert(&mut self, a: usize, b: usize, volumes: [Option<u32>; 4]) {
        self.volumes
            .entry(undirected_key(a, b))
            .or_insert(volumes);
    }

    pub fn volume(&self, a: usize, b: usize, time_of_day: TimeOfDay) -> u32 {
        self.volumes
            .get(&undirected_key(a, b))
            .and_then(|v| v[time_of_day.slot()])
            .unwrap_or(DEFAULT_TRAFFIC_VOLUME)
    }

    pub fn len(&self) -> usize {
        self.volumes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.volumes.is_empty()
    }
}

pub(crate) fn undirected_key(a: usize, b: usize) -> (usize, usize) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

#[cfg(test)]
mod tests {
    use crate::optimization::data::traffic::{TimeOfDay, TrafficTable, DEFAULT_TRAFFIC_VOLUME};

    #[test]
    fn lookup_is_symmetric() {
        let mut table = TrafficTable::default();
        table.insert(3, 1, [Some(2800), Some(1500), Some(2600), Some(800)]);

        assert_eq!(2800, table.volume(1, 3, TimeOfDay::Morning));
        assert_eq!(2800, table.volume(3, 1, TimeOfDay::Morning));
        assert_eq!(800, table.volume(1, 3, TimeOfDay::Night));
    }

    #[test]
    fn missing_observation_falls_back() {
        let mut table = TrafficTable::default();
        table.insert(0, 1, [Some(10), None, None, None]);

        assert_eq!(DEFAULT_TRAFFIC_VOLUME, table.volume(0, 1, TimeOfDay::Evening));
        assert_eq!(DEFAULT_TRAFFIC_VOLUME, table.volume(4, 5, TimeOfDay::Morning));
    }

    #[test]
    fn first_pattern_wins() {
        let mut table = TrafficTable::default();
        table.insert(0, 1, [Some(10), None, None, None]);
        table.insert(1, 0, [Some(20), None, None, None]);

        assert_eq!(10, table.volume(1, 0, TimeOfDay::Morning));
        assert_eq!(1, table.len());
    }

    #[test]
    fn parse_time_of_day() {
        assert_eq!(Ok(TimeOfDay::Evening), "evening".parse());
        assert_eq!(Ok(TimeOfDay::Night), " Night ".parse());
        assert!("noon".parse::<TimeOfDay>().is_err());
        assert_eq!(TimeOfDay::Morning, TimeOfDay::default());
    }
}
