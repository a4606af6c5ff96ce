use std::fs;
use std::path::{Path, PathBuf};

use crate::optimization::data::CityData;
use crate::optimization::io::dataset::{
    IOBusRoute, IOCity, IODemand, IOLocation, IOLocationKind, IORoad, IOStop, IOTrafficPattern,
    IOTransitLine, Locations, Roads,
};

pub const CAIRO_DATASET: &str = "./assets/cairo/cairo-city.xml";
pub const CAIRO_CONFIG: &str = "./assets/cairo/config.yml";

pub fn cairo_data() -> CityData {
    CityData::from_file(Path::new(CAIRO_DATASET)).expect("Failed to load the bundled dataset")
}

pub fn create_folders(path: PathBuf) -> PathBuf {
    fs::create_dir_all(&path)
        .unwrap_or_else(|_e| panic!("Failed to create folders for path {path:?}"));
    path
}

pub fn io_city(locations: Vec<IOLocation>, roads: Vec<IORoad>) -> IOCity {
    IOCity {
        name: Some(String::from("test city")),
        locations: Locations { locations },
        roads: Roads { roads },
        ..Default::default()
    }
}

pub fn neighborhood(id: &str, population: u64) -> IOLocation {
    IOLocation {
        id: id.to_string(),
        name: format!("Neighborhood {id}"),
        kind: IOLocationKind::Neighborhood,
        category: String::from("Residential"),
        population: Some(population),
        x: 0.,
        y: 0.,
    }
}

pub fn facility(id: &str, category: &str) -> IOLocation {
    IOLocation {
        id: id.to_string(),
        name: format!("{category} {id}"),
        kind: IOLocationKind::Facility,
        category: category.to_string(),
        population: None,
        x: 0.,
        y: 0.,
    }
}

pub fn road(from: &str, to: &str, distance: f64, capacity: f64, condition: u8) -> IORoad {
    IORoad {
        from: from.to_string(),
        to: to.to_string(),
        distance,
        capacity,
        condition: Some(condition),
        cost: None,
    }
}

pub fn potential_road(from: &str, to: &str, distance: f64, cost: f64) -> IORoad {
    IORoad {
        from: from.to_string(),
        to: to.to_string(),
        distance,
        capacity: 3000.,
        condition: None,
        cost: Some(cost),
    }
}

/// Volumes in the order morning, afternoon, evening, night.
pub fn traffic_pattern(from: &str, to: &str, volumes: [u32; 4]) -> IOTrafficPattern {
    IOTrafficPattern {
        from: from.to_string(),
        to: to.to_string(),
        morning: Some(volumes[0]),
        afternoon: Some(volumes[1]),
        evening: Some(volumes[2]),
        night: Some(volumes[3]),
    }
}

pub fn demand(from: &str, to: &str, passengers: u64) -> IODemand {
    IODemand {
        from: from.to_string(),
        to: to.to_string(),
        passengers,
    }
}

fn stops(ids: &[&str]) -> Vec<IOStop> {
    ids.iter()
        .map(|id| IOStop { id: id.to_string() })
        .collect()
}

pub fn metro_line(id: &str, stations: &[&str], current_trains: Option<u32>) -> IOTransitLine {
    IOTransitLine {
        id: id.to_string(),
        name: format!("Line {id}"),
        passengers: 1_000_000,
        current_trains,
        stations: stops(stations),
    }
}

pub fn bus_route(id: &str, stops_ids: &[&str], buses: u32, passengers: u64) -> IOBusRoute {
    IOBusRoute {
        id: id.to_string(),
        buses,
        passengers,
        stops: stops(stops_ids),
    }
}
