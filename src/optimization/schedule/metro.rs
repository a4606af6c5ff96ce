use serde::Serialize;
use tracing::debug;

use crate::optimization::data::{CityData, Location};
use crate::optimization::id::Id;
use crate::optimization::schedule::ScheduleSettings;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetroSchedule {
    pub line_id: String,
    pub line_name: String,
    pub stations: Vec<String>,
    pub station_names: Vec<String>,
    /// Trains per hour.
    pub optimal_frequency: f64,
    pub trains_needed: u32,
    pub current_trains: u32,
}

/// Interval table of required frequencies. `table[i][j]` for `i < j` is the frequency needed
/// between station `i` and station `j`: at least the direct floor derived from the corridor
/// demand, lowered if the trip can be split at an intermediate station whose two parts
/// both need less. Entries with `i >= j` are unused and stay zero.
pub fn frequency_table(
    data: &CityData,
    stations: &[Id<Location>],
    settings: &ScheduleSettings,
) -> Vec<Vec<f64>> {
    let n = stations.len();
    let mut table = vec![vec![0_f64; n]; n];

    for i in 0..n {
        for j in i + 1..n {
            let demand = data.undirected_demand(&stations[i], &stations[j]) as f64;
            table[i][j] = settings
                .min_frequency
                .max(demand / settings.train_capacity / settings.operating_hours);
        }
    }

    for length in 2..n {
        for i in 0..n - length {
            let j = i + length;
            let split = (i + 1..j)
                .map(|k| table[i][k].max(table[k][j]))
                .fold(f64::INFINITY, f64::min);
            table[i][j] = table[i][j].min(split);
        }
    }
    table
}

pub fn optimize_metro_lines(data: &CityData, settings: &ScheduleSettings) -> Vec<MetroSchedule> {
    data.transit_lines()
        .iter()
        .filter(|line| line.stations.len() >= 2)
        .map(|line| {
            let table = frequency_table(data, &line.stations, settings);
            let optimal_frequency = table[0][line.stations.len() - 1];
            let trains_needed = settings
                .min_trains
                .max((optimal_frequency * settings.operating_hours).round() as u32);
            debug!(
                "Metro line {}: {optimal_frequency:.2} trains per hour, {trains_needed} trains",
                line.id
            );
            MetroSchedule {
                line_id: line.id.clone(),
                line_name: line.name.clone(),
                stations: line
                    .stations
                    .iter()
                    .map(|s| s.external().to_string())
                    .collect(),
                station_names: line
                    .stations
                    .iter()
                    .map(|s| data.location(s).name.clone())
                    .collect(),
                optimal_frequency,
                trains_needed,
                current_trains: line.current_trains.unwrap_or(trains_needed),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use assert_approx_eq::assert_approx_eq;

    use crate::optimization::data::CityData;
    use crate::optimization::schedule::metro::{frequency_table, optimize_metro_lines};
    use crate::optimization::schedule::ScheduleSettings;
    use crate::test_utils::{demand, io_city, metro_line, neighborhood};

    fn city(demands: &[(&str, &str, u64)], current_trains: Option<u32>) -> CityData {
        let mut city = io_city(
            ["1", "2", "3", "4", "5"]
                .iter()
                .map(|id| neighborhood(id, 1000))
                .collect(),
            vec![],
        );
        city.metro
            .lines
            .push(metro_line("M1", &["1", "2", "3", "4", "5"], current_trains));
        for (from, to, passengers) in demands {
            city.demand.pairs.push(demand(from, to, *passengers));
        }
        CityData::try_from(city).unwrap()
    }

    #[test]
    fn low_demand_uses_minimum_frequency() {
        let data = city(&[], None);
        let schedules = optimize_metro_lines(&data, &ScheduleSettings::default());

        assert_eq!(1, schedules.len());
        assert_approx_eq!(2., schedules[0].optimal_frequency);
        // 2 trains per hour over 18 hours
        assert_eq!(36, schedules[0].trains_needed);
        assert_eq!(36, schedules[0].current_trains);
    }

    #[test]
    fn split_lowers_end_to_end_frequency() {
        // 1-5 direct needs 90000 / 1000 / 18 = 5 trains per hour, splitting at 2 only the minimum
        let data = city(
            &[("1", "5", 60_000), ("5", "1", 30_000), ("1", "3", 54_000), ("3", "5", 36_000)],
            Some(40),
        );
        let schedules = optimize_metro_lines(&data, &ScheduleSettings::default());

        assert_approx_eq!(2., schedules[0].optimal_frequency);
        assert_eq!(40, schedules[0].current_trains);
    }

    #[test]
    fn table_properties() {
        let data = city(
            &[("1", "2", 72_000), ("2", "3", 90_000), ("1", "4", 180_000), ("4", "5", 10_000)],
            None,
        );
        let settings = ScheduleSettings::default();
        let stations: Vec<_> = data.transit_lines()[0].stations.clone();
        let table = frequency_table(&data, &stations, &settings);

        for i in 0..stations.len() {
            for j in i + 1..stations.len() {
                let direct = settings.min_frequency.max(
                    data.undirected_demand(&stations[i], &stations[j]) as f64 / 1000. / 18.,
                );
                assert!(table[i][j] >= settings.min_frequency);
                assert!(table[i][j] <= direct + 1e-12);
            }
        }
        assert_approx_eq!(4., table[0][1]);
        assert_approx_eq!(2., table[0][3]);
    }

    #[test]
    fn constant_demand_is_monotone_in_span() {
        let pairs: Vec<(String, String)> = (1..=5)
            .flat_map(|i| (i + 1..=5).map(move |j| (i.to_string(), j.to_string())))
            .collect();
        let demands: Vec<(&str, &str, u64)> = pairs
            .iter()
            .map(|(a, b)| (a.as_str(), b.as_str(), 108_000))
            .collect();
        let data = city(&demands, None);
        let stations = data.transit_lines()[0].stations.clone();
        let table = frequency_table(&data, &stations, &ScheduleSettings::default());

        for length in 1..stations.len() - 1 {
            for i in 0..stations.len() - length - 1 {
                assert!(table[i][i + length] <= table[i][i + length + 1] + 1e-12);
            }
        }
        assert_approx_eq!(6., table[0][4]);
    }
}
