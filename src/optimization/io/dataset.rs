use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::optimization::error::DatasetError;
use crate::optimization::io::xml;

#[derive(Debug, Deserialize, Serialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum IOLocationKind {
    Neighborhood,
    Facility,
}

#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct IOLocation {
    #[serde(rename = "@id")]
    pub id: String,
    #[serde(rename = "@name")]
    pub name: String,
    #[serde(rename = "@kind")]
    pub kind: IOLocationKind,
    #[serde(rename = "@type")]
    pub category: String,
    #[serde(rename = "@population", skip_serializing_if = "Option::is_none")]
    pub population: Option<u64>,
    #[serde(rename = "@x")]
    pub x: f64,
    #[serde(rename = "@y")]
    pub y: f64,
}

#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct IORoad {
    #[serde(rename = "@from")]
    pub from: String,
    #[serde(rename = "@to")]
    pub to: String,
    #[serde(rename = "@distance")]
    pub distance: f64,
    #[serde(rename = "@capacity")]
    pub capacity: f64,
    #[serde(rename = "@condition", skip_serializing_if = "Option::is_none")]
    pub condition: Option<u8>,
    #[serde(rename = "@cost", skip_serializing_if = "Option::is_none")]
    pub cost: Option<f64>,
}

#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct IOTrafficPattern {
    #[serde(rename = "@from")]
    pub from: String,
    #[serde(rename = "@to")]
    pub to: String,
    #[serde(rename = "@morning", skip_serializing_if = "Option::is_none")]
    pub morning: Option<u32>,
    #[serde(rename = "@afternoon", skip_serializing_if = "Option::is_none")]
    pub afternoon: Option<u32>,
    #[serde(rename = "@evening", skip_serializing_if = "Option::is_none")]
    pub evening: Option<u32>,
    #[serde(rename = "@night", skip_serializing_if = "Option::is_none")]
    pub night: Option<u32>,
}

#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct IOStop {
    #[serde(rename = "@id")]
    pub id: String,
}

#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct IOTransitLine {
    #[serde(rename = "@id")]
    pub id: String,
    #[serde(rename = "@name")]
    pub name: String,
    #[serde(rename = "@passengers")]
    pub passengers: u64,
    #[serde(rename = "@current_trains", skip_serializing_if = "Option::is_none")]
    pub current_trains: Option<u32>,
    #[serde(rename = "station", default)]
    pub stations: Vec<IOStop>,
}

#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct IOBusRoute {
    #[serde(rename = "@id")]
    pub id: String,
    #[serde(rename = "@buses")]
    pub buses: u32,
    #[serde(rename = "@passengers")]
    pub passengers: u64,
    #[serde(rename = "stop", default)]
    pub stops: Vec<IOStop>,
}

#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct IODemand {
    #[serde(rename = "@from")]
    pub from: String,
    #[serde(rename = "@to")]
    pub to: String,
    #[serde(rename = "@passengers")]
    pub passengers: u64,
}

#[derive(Debug, Deserialize, Serialize, PartialEq, Clone, Default)]
pub struct Locations {
    #[serde(rename = "location", default)]
    pub locations: Vec<IOLocation>,
}

#[derive(Debug, Deserialize, Serialize, PartialEq, Clone, Default)]
pub struct Roads {
    #[serde(rename = "road", default)]
    pub roads: Vec<IORoad>,
}

#[derive(Debug, Deserialize, Serialize, PartialEq, Clone, Default)]
pub struct Traffic {
    #[serde(rename = "pattern", default)]
    pub patterns: Vec<IOTrafficPattern>,
}

#[derive(Debug, Deserialize, Serialize, PartialEq, Clone, Default)]
pub struct Metro {
    #[serde(rename = "line", default)]
    pub lines: Vec<IOTransitLine>,
}

#[derive(Debug, Deserialize, Serialize, PartialEq, Clone, Default)]
pub struct Buses {
    #[serde(rename = "route", default)]
    pub routes: Vec<IOBusRoute>,
}

#[derive(Debug, Deserialize, Serialize, PartialEq, Clone, Default)]
pub struct Demand {
    #[serde(rename = "pair", default)]
    pub pairs: Vec<IODemand>,
}

/// File representation of a city dataset. Existing and potential roads live in separate
/// sections; potential roads carry a construction cost instead of a condition.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone, Default)]
#[serde(rename = "city")]
pub struct IOCity {
    #[serde(rename = "@name", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub locations: Locations,
    #[serde(default)]
    pub roads: Roads,
    #[serde(default)]
    pub potential_roads: Roads,
    #[serde(default)]
    pub traffic: Traffic,
    #[serde(default)]
    pub metro: Metro,
    #[serde(default)]
    pub buses: Buses,
    #[serde(default)]
    pub demand: Demand,
}

impl IOCity {
    pub fn from_file(path: &Path) -> Result<IOCity, DatasetError> {
        let city: IOCity = xml::read_from_file(path)?;
        info!(
            "IOCity: Finished reading dataset. It contains {} locations, {} roads and {} potential roads.",
            city.locations.locations.len(),
            city.roads.roads.len(),
            city.potential_roads.roads.len()
        );
        Ok(city)
    }

    pub fn to_file(&self, path: &Path) -> Result<(), DatasetError> {
        xml::write_to_file(self, path, "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n")
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error;
    use std::path::Path;

    use quick_xml::de::from_str;

    use crate::optimization::io::dataset::{IOCity, IOLocationKind};

    const SMALL_CITY: &str = r#"<?xml version="1.0" encoding="utf-8"?>
        <city name="small city">
            <locations>
                <location id="1" name="Maadi" kind="neighborhood" type="Residential" population="250000" x="31.25" y="29.96"/>
                <location id="F1" name="Airport" kind="facility" type="Airport" x="31.41" y="30.11"/>
            </locations>
            <roads>
                <road from="1" to="F1" distance="8.5" capacity="3000" condition="7"/>
            </roads>
            <potential_roads>
                <road from="F1" to="1" distance="22.8" capacity="4000" cost="450"/>
            </potential_roads>
            <traffic>
                <pattern from="1" to="F1" morning="2800" night="800"/>
            </traffic>
            <metro>
                <line id="M1" name="Line 1" passengers="1500000">
                    <station id="1"/>
                    <station id="F1"/>
                </line>
            </metro>
            <buses>
                <route id="B1" buses="25" passengers="35000">
                    <stop id="F1"/>
                    <stop id="1"/>
                </route>
            </buses>
            <demand>
                <pair from="1" to="F1" passengers="12000"/>
            </demand>
        </city>
    "#;

    #[test]
    fn parse_small_city() -> Result<(), Box<dyn Error>> {
        let city: IOCity = from_str(SMALL_CITY)?;

        assert_eq!("small city", city.name.as_ref().unwrap());
        assert_eq!(2, city.locations.locations.len());

        let facility = &city.locations.locations[1];
        assert_eq!("F1", facility.id);
        assert_eq!(IOLocationKind::Facility, facility.kind);
        assert_eq!(None, facility.population);

        let road = &city.roads.roads[0];
        assert_eq!(Some(7), road.condition);
        assert_eq!(None, road.cost);

        let potential = &city.potential_roads.roads[0];
        assert_eq!(None, potential.condition);
        assert_eq!(Some(450.), potential.cost);

        let pattern = &city.traffic.patterns[0];
        assert_eq!(Some(2800), pattern.morning);
        assert_eq!(None, pattern.afternoon);

        assert_eq!(2, city.metro.lines[0].stations.len());
        assert_eq!(None, city.metro.lines[0].current_trains);
        assert_eq!("F1", city.buses.routes[0].stops[0].id);
        assert_eq!(12000, city.demand.pairs[0].passengers);
        Ok(())
    }

    #[test]
    fn write_and_read_gzipped() {
        let city: IOCity = from_str(SMALL_CITY).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("city.xml.gz");

        city.to_file(&path).unwrap();
        let read = IOCity::from_file(&path).unwrap();
        assert_eq!(city, read);
    }

    #[test]
    fn read_bundled_dataset() {
        let city = IOCity::from_file(Path::new("./assets/cairo/cairo-city.xml")).unwrap();

        assert_eq!(27, city.locations.locations.len());
        assert_eq!(36, city.roads.roads.len());
        assert_eq!(15, city.potential_roads.roads.len());
        assert_eq!(36, city.traffic.patterns.len());
        assert_eq!(3, city.metro.lines.len());
        assert_eq!(12, city.buses.routes.len());
        assert_eq!(21, city.demand.pairs.len());
    }
}
