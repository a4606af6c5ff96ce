//! Builds the weighted graph views the engines work on.
//!
//! Routing graphs are stored in CSR form (`first_out`, `head`, per edge weight) over the
//! dense location indices, with travel time in minutes as weight. Network design graphs are
//! an undirected edge list over existing and potential roads.

use derive_builder::Builder;
use tracing::debug;

use crate::optimization::data::traffic::TimeOfDay;
use crate::optimization::data::{CityData, Location, Road, RoadStatus};
use crate::optimization::id::Id;
use crate::optimization::network::{GraphPurpose, TravelMode};

/// Congestion is capped at 200% of the road capacity.
pub const MAX_CONGESTION: f64 = 2.0;

#[derive(Debug, Clone, PartialEq, Default)]
pub enum NodeSelection {
    #[default]
    All,
    Subset(Vec<Id<Location>>),
}

#[derive(Debug, Clone, PartialEq, Builder, Default)]
#[builder(default, build_fn(private, name = "fallible_build"))]
pub struct GraphRequest {
    pub time_of_day: TimeOfDay,
    pub mode: TravelMode,
    pub purpose: GraphPurpose,
    pub prioritize_population: bool,
    pub nodes: NodeSelection,
}

impl GraphRequestBuilder {
    pub fn build(&self) -> GraphRequest {
        self.fallible_build()
            .expect("All fields of a graph request have defaults")
    }
}

pub fn congestion(traffic: u32, capacity: f64) -> f64 {
    (traffic as f64 / capacity).min(MAX_CONGESTION)
}

/// Travel time in minutes on `road` given the observed `traffic`.
pub fn routing_weight(road: &Road, traffic: u32, mode: TravelMode) -> f64 {
    let congestion = congestion(traffic, road.capacity);
    let speed = mode.speed_profile().speed(congestion);
    let condition_factor = 1. + (10. - road.condition as f64) * 0.05;
    road.distance / speed * condition_factor * 60.
}

/// Dimensionless cost of keeping or building `road` in a network design.
pub fn design_weight(road: &Road, population: u64, prioritize_population: bool) -> f64 {
    let base = match road.status {
        RoadStatus::Existing => road.distance * (1. + (10. - road.condition as f64) / 10.),
        RoadStatus::Potential { cost } => road.distance * (1. + cost / 1000.),
    };
    if prioritize_population {
        base / (1. + population as f64 / 1_000_000.)
    } else {
        base
    }
}

fn selected_nodes(data: &CityData, selection: &NodeSelection) -> Vec<bool> {
    match selection {
        NodeSelection::All => vec![true; data.locations().len()],
        NodeSelection::Subset(ids) => {
            let mut included = vec![false; data.locations().len()];
            for id in ids {
                if let Some(slot) = included.get_mut(id.internal()) {
                    *slot = true;
                }
            }
            included
        }
    }
}

#[derive(Debug, Clone)]
pub struct RoutingGraph {
    pub(crate) first_out: Vec<usize>,
    pub(crate) head: Vec<usize>,
    pub(crate) weight: Vec<f64>,
    pub(crate) road: Vec<usize>,
    included: Vec<bool>,
    pub time_of_day: TimeOfDay,
    pub mode: TravelMode,
}

impl RoutingGraph {
    pub fn number_of_nodes(&self) -> usize {
        self.first_out.len() - 1
    }

    pub fn number_of_edges(&self) -> usize {
        self.head.len()
    }

    pub fn contains(&self, node: &Id<Location>) -> bool {
        self.included.get(node.internal()).copied().unwrap_or(false)
    }

    /// Outgoing edges of `node` as (head, weight in minutes, index into the existing roads).
    pub fn out_edges(&self, node: usize) -> impl Iterator<Item = (usize, f64, usize)> + '_ {
        (self.first_out[node]..self.first_out[node + 1])
            .map(move |i| (self.head[i], self.weight[i], self.road[i]))
    }
}

#[derive(Debug, Clone)]
pub struct DesignEdge<'data> {
    pub road: &'data Road,
    pub weight: f64,
}

#[derive(Debug, Clone)]
pub struct DesignGraph<'data> {
    /// Selected locations, in dataset order.
    pub nodes: Vec<Id<Location>>,
    /// Existing roads followed by potential roads, in dataset order.
    pub edges: Vec<DesignEdge<'data>>,
    included: Vec<bool>,
}

impl DesignGraph<'_> {
    pub fn contains(&self, node: &Id<Location>) -> bool {
        self.included.get(node.internal()).copied().unwrap_or(false)
    }

    /// Size of the index space node ids live in.
    pub fn index_bound(&self) -> usize {
        self.included.len()
    }
}

/// Builds the routing view of the existing roads. Both directions of every road are
/// added; roads with an endpoint outside the requested node set are skipped.
#[tracing::instrument(level = "trace", skip(data))]
pub fn build_routing_graph(data: &CityData, request: &GraphRequest) -> RoutingGraph {
    let included = selected_nodes(data, &request.nodes);
    let mut first_out = Vec::with_capacity(included.len() + 1);
    let mut head = Vec::new();
    let mut weight = Vec::new();
    let mut road_indices = Vec::new();

    first_out.push(0);
    for location in data.locations() {
        let from = &location.id;
        if included[from.internal()] {
            for &index in data.connected_road_indices(from) {
                let road = &data.roads()[index];
                let Some(to) = road.other_end(from) else {
                    continue;
                };
                if !included[to.internal()] {
                    continue;
                }
                let traffic = data.traffic(from, to, request.time_of_day);
                head.push(to.internal());
                weight.push(routing_weight(road, traffic, request.mode));
                road_indices.push(index);
            }
        }
        first_out.push(head.len());
    }

    debug!(
        "Built routing graph with {} nodes and {} directed edges for {} in {} mode",
        included.iter().filter(|&&i| i).count(),
        head.len(),
        request.time_of_day,
        request.mode
    );

    RoutingGraph {
        first_out,
        head,
        weight,
        road: road_indices,
        included,
        time_of_day: request.time_of_day,
        mode: request.mode,
    }
}

/// Builds the network design view over existing and potential roads. Missing population
/// counts as zero.
#[tracing::instrument(level = "trace", skip(data))]
pub fn build_design_graph<'data>(
    data: &'data CityData,
    request: &GraphRequest,
) -> DesignGraph<'data> {
    let included = selected_nodes(data, &request.nodes);
    let nodes = data
        .locations()
        .iter()
        .filter(|l| included[l.id.internal()])
        .map(|l| l.id.clone())
        .collect();

    let edges = data
        .roads()
        .iter()
        .chain(data.potential_roads())
        .filter(|r| included[r.from.internal()] && included[r.to.internal()])
        .map(|road| {
            let population = data.location(&road.from).population.unwrap_or(0)
                + data.location(&road.to).population.unwrap_or(0);
            DesignEdge {
                road,
                weight: design_weight(road, population, request.prioritize_population),
            }
        })
        .collect::<Vec<_>>();

    debug!("Built design graph with {} edges", edges.len());

    DesignGraph {
        nodes,
        edges,
        included,
    }
}

/// Builds the graph view matching the purpose of the request.
pub enum GraphView<'data> {
    Routing(RoutingGraph),
    NetworkDesign(DesignGraph<'data>),
}

pub fn build_graph<'data>(data: &'data CityData, request: &GraphRequest) -> GraphView<'data> {
    match request.purpose {
        GraphPurpose::Routing => GraphView::Routing(build_routing_graph(data, request)),
        GraphPurpose::NetworkDesign => {
            GraphView::NetworkDesign(build_design_graph(data, request))
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_approx_eq::assert_approx_eq;

    use crate::optimization::data::traffic::TimeOfDay;
    use crate::optimization::data::CityData;
    use crate::optimization::network::builder::{
        build_design_graph, build_graph, build_routing_graph, congestion, routing_weight,
        GraphRequestBuilder, GraphView, NodeSelection,
    };
    use crate::optimization::network::{GraphPurpose, TravelMode};
    use crate::test_utils::{
        facility, io_city, neighborhood, potential_road, road, traffic_pattern,
    };

    /// Two neighborhoods connected through a degree three intersection.
    fn intersection_city() -> CityData {
        let mut city = io_city(
            vec![
                neighborhood("A", 100_000),
                neighborhood("B", 200_000),
                neighborhood("X", 0),
                facility("F1", "Medical"),
            ],
            vec![
                road("A", "X", 5., 2000., 8),
                road("X", "B", 3., 2000., 10),
                road("X", "F1", 1., 1000., 5),
            ],
        );
        city.traffic
            .patterns
            .push(traffic_pattern("A", "X", [2000, 1000, 1500, 500]));
        city.potential_roads
            .roads
            .push(potential_road("A", "B", 6., 500.));
        CityData::try_from(city).unwrap()
    }

    #[test]
    fn routing_weight_at_full_congestion() {
        let data = intersection_city();
        let a = data.location_id("A").unwrap();
        let x = data.location_id("X").unwrap();
        let road = data.road_between(&a, &x).unwrap();
        let traffic = data.traffic(&a, &x, TimeOfDay::Morning);

        assert_approx_eq!(1.0, congestion(traffic, road.capacity));
        // 5 km / (30 km/h * 0.6) * 1.1 * 60
        assert_approx_eq!(18.333333, routing_weight(road, traffic, TravelMode::Normal), 1e-5);
        // 5 km / (80 km/h * 0.7) * 1.1 * 60
        assert_approx_eq!(
            5.892857,
            routing_weight(road, traffic, TravelMode::Emergency),
            1e-5
        );
    }

    #[test]
    fn congestion_is_capped() {
        assert_approx_eq!(2.0, congestion(10_000, 1000.));
        assert_approx_eq!(0.5, congestion(500, 1000.));
    }

    #[test]
    fn routing_graph_is_symmetric() {
        let data = intersection_city();
        let request = GraphRequestBuilder::default()
            .time_of_day(TimeOfDay::Morning)
            .build();
        let graph = build_routing_graph(&data, &request);

        assert_eq!(4, graph.number_of_nodes());
        assert_eq!(6, graph.number_of_edges());

        let a = data.location_id("A").unwrap().internal();
        let x = data.location_id("X").unwrap().internal();
        let a_to_x: Vec<_> = graph.out_edges(a).collect();
        let x_to_a = graph.out_edges(x).find(|(h, _, _)| *h == a).unwrap();
        assert_eq!(1, a_to_x.len());
        assert_approx_eq!(a_to_x[0].1, x_to_a.1);
    }

    #[test]
    fn routing_graph_skips_unselected_nodes() {
        let data = intersection_city();
        let request = GraphRequestBuilder::default()
            .nodes(NodeSelection::Subset(vec![
                data.location_id("A").unwrap(),
                data.location_id("X").unwrap(),
            ]))
            .build();
        let graph = build_routing_graph(&data, &request);

        assert_eq!(2, graph.number_of_edges());
        assert!(graph.contains(&data.location_id("X").unwrap()));
        assert!(!graph.contains(&data.location_id("B").unwrap()));
    }

    #[test]
    fn design_weights() {
        let data = intersection_city();
        let plain = build_design_graph(
            &data,
            &GraphRequestBuilder::default()
                .purpose(GraphPurpose::NetworkDesign)
                .build(),
        );
        assert_eq!(4, plain.nodes.len());
        assert_eq!(4, plain.edges.len());
        // 5 * (1 + 2 / 10)
        assert_approx_eq!(6.0, plain.edges[0].weight);
        // 6 * (1 + 500 / 1000)
        assert_approx_eq!(9.0, plain.edges[3].weight);

        let prioritized = build_design_graph(
            &data,
            &GraphRequestBuilder::default()
                .purpose(GraphPurpose::NetworkDesign)
                .prioritize_population(true)
                .build(),
        );
        // A has 100k inhabitants and X none
        assert_approx_eq!(6.0 / 1.1, prioritized.edges[0].weight);
        // the facility contributes no population
        assert_approx_eq!(1.0 * 1.5, prioritized.edges[2].weight);
        assert_approx_eq!(9.0 / 1.3, prioritized.edges[3].weight);
    }

    #[test]
    fn build_graph_by_purpose() {
        let data = intersection_city();
        let routing = build_graph(&data, &GraphRequestBuilder::default().build());
        assert!(matches!(routing, GraphView::Routing(_)));

        let design = build_graph(
            &data,
            &GraphRequestBuilder::default()
                .purpose(GraphPurpose::NetworkDesign)
                .build(),
        );
        assert!(matches!(design, GraphView::NetworkDesign(_)));
    }
}
