//! Immutable city dataset shared by all engines.
//!
//! A [CityData] is built once from an [IOCity] (usually read from an xml file) and
//! validated while doing so. Every location id is interned into a dense index, and all
//! lookups the engines need (road between two locations, roads at a location, traffic,
//! demand) are answered through hash maps or adjacency lists keyed by those indices.

use std::path::Path;

use ahash::{AHashMap, RandomState};
use geo::Point;
use serde::Serialize;
use tracing::info;

use crate::optimization::error::DatasetError;
use crate::optimization::id::{Id, IdStore};
use crate::optimization::io::dataset::{IOCity, IOLocationKind, IORoad, IOStop};

pub mod traffic;

use traffic::{undirected_key, TimeOfDay, TrafficTable};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationKind {
    Neighborhood,
    Facility,
}

#[derive(Debug)]
pub struct Location {
    pub id: Id<Location>,
    pub name: String,
    pub kind: LocationKind,
    pub category: String,
    pub population: Option<u64>,
    pub coord: Point<f64>,
}

impl Location {
    pub fn is_facility(&self) -> bool {
        self.kind == LocationKind::Facility
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RoadStatus {
    Existing,
    Potential { cost: f64 },
}

#[derive(Debug, Clone)]
pub struct Road {
    pub from: Id<Location>,
    pub to: Id<Location>,
    pub distance: f64,
    pub capacity: f64,
    pub condition: u8,
    pub status: RoadStatus,
}

impl Road {
    pub fn is_existing(&self) -> bool {
        self.status == RoadStatus::Existing
    }

    pub fn construction_cost(&self) -> Option<f64> {
        match self.status {
            RoadStatus::Existing => None,
            RoadStatus::Potential { cost } => Some(cost),
        }
    }

    /// Returns the endpoint opposite to `end`, or None if the road does not touch `end`.
    pub fn other_end(&self, end: &Id<Location>) -> Option<&Id<Location>> {
        if &self.from == end {
            Some(&self.to)
        } else if &self.to == end {
            Some(&self.from)
        } else {
            None
        }
    }
}

#[derive(Debug)]
pub struct TransitLine {
    pub id: String,
    pub name: String,
    pub stations: Vec<Id<Location>>,
    pub passengers: u64,
    pub current_trains: Option<u32>,
}

#[derive(Debug)]
pub struct BusRoute {
    pub id: String,
    pub stops: Vec<Id<Location>>,
    pub buses: u32,
    pub passengers: u64,
}

#[derive(Debug)]
pub struct CityData {
    name: Option<String>,
    location_ids: IdStore<Location>,
    locations: Vec<Location>,
    roads: Vec<Road>,
    potential_roads: Vec<Road>,
    traffic: TrafficTable,
    transit_lines: Vec<TransitLine>,
    bus_routes: Vec<BusRoute>,
    demand: AHashMap<(usize, usize), u64>,
    // undirected location pair -> first existing road between them
    road_index: AHashMap<(usize, usize), usize>,
    // location -> indices of incident existing roads, in dataset order
    adjacency: Vec<Vec<usize>>,
}

impl CityData {
    pub fn from_file(path: &Path) -> Result<Self, DatasetError> {
        let io_city = IOCity::from_file(path)?;
        let data = CityData::try_from(io_city)?;
        info!(
            "CityData: loaded {} locations, {} roads, {} potential roads, {} metro lines and {} bus routes.",
            data.locations.len(),
            data.roads.len(),
            data.potential_roads.len(),
            data.transit_lines.len(),
            data.bus_routes.len()
        );
        Ok(data)
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn locations(&self) -> &[Location] {
        &self.locations
    }

    pub fn neighborhoods(&self) -> impl Iterator<Item = &Location> {
        self.locations.iter().filter(|l| !l.is_facility())
    }

    pub fn facilities(&self) -> impl Iterator<Item = &Location> {
        self.locations.iter().filter(|l| l.is_facility())
    }

    /// Existing roads, in dataset order.
    pub fn roads(&self) -> &[Road] {
        &self.roads
    }

    pub fn potential_roads(&self) -> &[Road] {
        &self.potential_roads
    }

    pub fn transit_lines(&self) -> &[TransitLine] {
        &self.transit_lines
    }

    pub fn bus_routes(&self) -> &[BusRoute] {
        &self.bus_routes
    }

    pub fn location_exists(&self, id: &str) -> bool {
        self.location_ids.contains(id)
    }

    pub fn location_id(&self, id: &str) -> Option<Id<Location>> {
        self.location_ids.get_from_ext(id)
    }

    pub fn location(&self, id: &Id<Location>) -> &Location {
        &self.locations[id.internal()]
    }

    pub fn location_name(&self, id: &str) -> String {
        match self.location_id(id) {
            Some(id) => self.location(&id).name.clone(),
            None => format!("Unknown Location ({id})"),
        }
    }

    /// The existing road between `a` and `b` in either direction.
    pub fn road_between(&self, a: &Id<Location>, b: &Id<Location>) -> Option<&Road> {
        self.road_index
            .get(&undirected_key(a.internal(), b.internal()))
            .map(|&index| &self.roads[index])
    }

    /// All existing roads touching `id`, in dataset order.
    pub fn connected_roads(&self, id: &Id<Location>) -> impl Iterator<Item = &Road> {
        self.adjacency[id.internal()]
            .iter()
            .map(move |&index| &self.roads[index])
    }

    /// Indices into [CityData::roads] of all existing roads touching `id`.
    pub fn connected_road_indices(&self, id: &Id<Location>) -> &[usize] {
        &self.adjacency[id.internal()]
    }

    pub fn neighbors<'a>(
        &'a self,
        id: &'a Id<Location>,
    ) -> impl Iterator<Item = &'a Id<Location>> + 'a {
        self.connected_roads(id).filter_map(move |r| r.other_end(id))
    }

    /// Number of existing roads touching `id`.
    pub fn degree(&self, id: &Id<Location>) -> usize {
        self.adjacency[id.internal()].len()
    }

    pub fn traffic(&self, a: &Id<Location>, b: &Id<Location>, time_of_day: TimeOfDay) -> u32 {
        self.traffic.volume(a.internal(), b.internal(), time_of_day)
    }

    /// Passenger demand between `a` and `b`, summed over both directions.
    pub fn undirected_demand(&self, a: &Id<Location>, b: &Id<Location>) -> u64 {
        let forward = self.demand.get(&(a.internal(), b.internal()));
        let backward = self.demand.get(&(b.internal(), a.internal()));
        forward.copied().unwrap_or(0) + backward.copied().unwrap_or(0)
    }

    fn resolve(
        &self,
        id: &str,
        context: impl Fn() -> String,
    ) -> Result<Id<Location>, DatasetError> {
        self.location_id(id)
            .ok_or_else(|| DatasetError::UnknownLocation {
                context: context(),
                id: id.to_string(),
            })
    }

    fn convert_road(&self, io_road: &IORoad, potential: bool) -> Result<Road, DatasetError> {
        let context = || format!("road {}-{}", io_road.from, io_road.to);
        let invalid = |reason: String| DatasetError::InvalidRecord {
            context: context(),
            reason,
        };

        let from = self.resolve(&io_road.from, context)?;
        let to = self.resolve(&io_road.to, context)?;
        if io_road.distance <= 0. || !io_road.distance.is_finite() {
            return Err(invalid(format!("distance {} must be positive", io_road.distance)));
        }
        if io_road.capacity <= 0. || !io_road.capacity.is_finite() {
            return Err(invalid(format!("capacity {} must be positive", io_road.capacity)));
        }

        // newly built roads are in perfect condition
        let condition = io_road.condition.unwrap_or(10);
        if !(1..=10).contains(&condition) {
            return Err(invalid(format!("condition {condition} is outside of 1..=10")));
        }

        let status = if potential {
            let cost = io_road
                .cost
                .ok_or_else(|| invalid(String::from("potential road without cost")))?;
            if cost < 0. {
                return Err(invalid(format!("cost {cost} must not be negative")));
            }
            RoadStatus::Potential { cost }
        } else {
            RoadStatus::Existing
        };

        Ok(Road {
            from,
            to,
            distance: io_road.distance,
            capacity: io_road.capacity,
            condition,
            status,
        })
    }

    fn convert_stops(
        &self,
        stops: &[IOStop],
        context: impl Fn() -> String + Copy,
    ) -> Result<Vec<Id<Location>>, DatasetError> {
        stops.iter().map(|s| self.resolve(&s.id, context)).collect()
    }
}

impl TryFrom<IOCity> for CityData {
    type Error = DatasetError;

    fn try_from(io_city: IOCity) -> Result<Self, Self::Error> {
        let mut data = CityData {
            name: io_city.name,
            location_ids: IdStore::new(),
            locations: Vec::new(),
            roads: Vec::new(),
            potential_roads: Vec::new(),
            traffic: TrafficTable::default(),
            transit_lines: Vec::new(),
            bus_routes: Vec::new(),
            demand: AHashMap::with_hasher(RandomState::with_seed(42)),
            road_index: AHashMap::with_hasher(RandomState::with_seed(42)),
            adjacency: Vec::new(),
        };

        for io_location in io_city.locations.locations {
            if data.location_ids.contains(&io_location.id) {
                return Err(DatasetError::DuplicateLocation(io_location.id));
            }
            let id = data.location_ids.create_id(&io_location.id);
            let kind = match io_location.kind {
                IOLocationKind::Neighborhood => LocationKind::Neighborhood,
                IOLocationKind::Facility => LocationKind::Facility,
            };
            data.locations.push(Location {
                id,
                name: io_location.name,
                kind,
                category: io_location.category,
                population: io_location.population,
                coord: Point::new(io_location.x, io_location.y),
            });
        }
        data.adjacency = vec![Vec::new(); data.locations.len()];

        for io_road in &io_city.roads.roads {
            let road = data.convert_road(io_road, false)?;
            let index = data.roads.len();
            let (from, to) = (road.from.internal(), road.to.internal());
            data.road_index
                .entry(undirected_key(from, to))
                .or_insert(index);
            data.adjacency[from].push(index);
            if from != to {
                data.adjacency[to].push(index);
            }
            data.roads.push(road);
        }

        for io_road in &io_city.potential_roads.roads {
            let road = data.convert_road(io_road, true)?;
            data.potential_roads.push(road);
        }

        for pattern in &io_city.traffic.patterns {
            let context = || format!("traffic pattern {}-{}", pattern.from, pattern.to);
            let from = data.resolve(&pattern.from, context)?;
            let to = data.resolve(&pattern.to, context)?;
            data.traffic.insert(
                from.internal(),
                to.internal(),
                [
                    pattern.morning,
                    pattern.afternoon,
                    pattern.evening,
                    pattern.night,
                ],
            );
        }

        for io_line in io_city.metro.lines {
            let context = || format!("metro line {}", io_line.id);
            let stations = data.convert_stops(&io_line.stations, context)?;
            if stations.len() < 2 {
                return Err(DatasetError::InvalidRecord {
                    context: context(),
                    reason: String::from("a line needs at least two stations"),
                });
            }
            data.transit_lines.push(TransitLine {
                id: io_line.id,
                name: io_line.name,
                stations,
                passengers: io_line.passengers,
                current_trains: io_line.current_trains,
            });
        }

        for io_route in io_city.buses.routes {
            let context = || format!("bus route {}", io_route.id);
            let stops = data.convert_stops(&io_route.stops, context)?;
            data.bus_routes.push(BusRoute {
                id: io_route.id,
                stops,
                buses: io_route.buses,
                passengers: io_route.passengers,
            });
        }

        for pair in &io_city.demand.pairs {
            let context = || format!("demand pair {}-{}", pair.from, pair.to);
            let from = data.resolve(&pair.from, context)?;
            let to = data.resolve(&pair.to, context)?;
            *data
                .demand
                .entry((from.internal(), to.internal()))
                .or_insert(0) += pair.passengers;
        }

        Ok(data)
    }
}
