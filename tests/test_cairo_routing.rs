use assert_approx_eq::assert_approx_eq;
use rust_city_opt::optimization::data::traffic::TimeOfDay;
use rust_city_opt::optimization::error::OptimizationError;
use rust_city_opt::optimization::network::builder::{build_routing_graph, GraphRequestBuilder};
use rust_city_opt::optimization::network::TravelMode;
use rust_city_opt::optimization::routing::dijkstra::Dijkstra;
use rust_city_opt::optimization::routing::{emergency_route, find_path, shortest_route};
use rust_city_opt::test_utils::cairo_data;

#[test]
fn route_from_maadi_to_airport() {
    let data = cairo_data();
    let route = shortest_route(&data, "1", "F1", TimeOfDay::Morning).unwrap();

    assert_eq!("1", route.path.first().unwrap());
    assert_eq!("F1", route.path.last().unwrap());
    assert_eq!("Maadi", route.path_names[0]);
    assert_eq!(route.path.len(), route.coordinates.len());
    assert_approx_eq!(31.25, route.coordinates[0].0);

    let time: f64 = route.steps.iter().map(|s| s.time).sum();
    assert_approx_eq!(time, route.total_time);
    for step in &route.steps {
        assert!(data
            .road_between(
                &data.location_id(&step.from).unwrap(),
                &data.location_id(&step.to).unwrap()
            )
            .is_some());
    }
}

#[test]
fn emergency_routes_are_faster() {
    let data = cairo_data();
    let pairs = [("1", "F1"), ("7", "F9"), ("13", "F10"), ("F11", "F12"), ("15", "4")];
    for time_of_day in TimeOfDay::ALL {
        for (from, to) in pairs {
            let normal = shortest_route(&data, from, to, time_of_day).unwrap();
            let emergency = emergency_route(&data, from, to, time_of_day).unwrap();
            assert!(emergency.total_time <= normal.total_time);
            assert!(!emergency.degraded);
        }
    }
}

#[test]
fn settle_order_over_whole_city() {
    let data = cairo_data();
    for mode in [TravelMode::Normal, TravelMode::Emergency] {
        let request = GraphRequestBuilder::default()
            .time_of_day(TimeOfDay::Evening)
            .mode(mode)
            .build();
        let graph = build_routing_graph(&data, &request);
        let source = data.location_id("3").unwrap().internal();
        let tree = Dijkstra::search(&graph, source, None);

        // F3 to F6 have no roads
        assert_eq!(23, tree.settled.len());
        for window in tree.settled.windows(2) {
            assert!(window[0].1 <= window[1].1);
        }
    }
}

#[test]
fn isolated_facility_is_unreachable() {
    let data = cairo_data();
    for mode in [TravelMode::Normal, TravelMode::Emergency] {
        assert_eq!(
            Err(OptimizationError::NoPathFound {
                from: String::from("1"),
                to: String::from("F3"),
            }),
            find_path(&data, "1", "F3", TimeOfDay::Night, mode)
        );
    }
}

#[test]
fn unknown_location_is_rejected() {
    let data = cairo_data();
    assert_eq!(
        Err(OptimizationError::InvalidLocation(String::from("F99"))),
        emergency_route(&data, "F99", "1", TimeOfDay::Morning)
    );
}
