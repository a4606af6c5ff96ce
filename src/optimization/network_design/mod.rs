//! Minimum cost road network over existing and potential roads.
//!
//! Both algorithms work on the design graph of [crate::optimization::network::builder] and
//! report a spanning forest with `disconnected` set when the graph has more than one
//! component.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::optimization::data::{CityData, Location};
use crate::optimization::id::Id;
use crate::optimization::network::builder::{
    build_design_graph, DesignEdge, DesignGraph, GraphRequestBuilder,
};
use crate::optimization::network::GraphPurpose;

pub mod kruskal;
pub mod prim;

#[derive(PartialEq, Eq, Debug, ValueEnum, Clone, Copy, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum NetworkAlgorithm {
    #[default]
    Prim,
    Kruskal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TreeEdge {
    pub from: String,
    pub to: String,
    pub from_name: String,
    pub to_name: String,
    pub distance: f64,
    pub capacity: f64,
    pub condition: u8,
    pub weight: f64,
    pub existing: bool,
    pub construction_cost: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NetworkDesign {
    pub algorithm: NetworkAlgorithm,
    pub prioritize_population: bool,
    /// Locations covered by the selected edges, in dataset order.
    pub nodes: Vec<String>,
    pub edges: Vec<TreeEdge>,
    pub total_distance: f64,
    pub total_weight: f64,
    /// Sum over the selected potential roads.
    pub total_construction_cost: f64,
    pub critical_facilities_connected: bool,
    /// Set if no single tree spans all locations. The result is a spanning forest then.
    pub disconnected: bool,
}

/// Selected edge indices into [DesignGraph::edges] and the covered nodes.
pub(crate) struct SpanningSelection {
    pub edges: Vec<usize>,
    pub covered: Vec<bool>,
    pub disconnected: bool,
}

#[tracing::instrument(level = "trace", skip(data))]
pub fn optimize_network(
    data: &CityData,
    algorithm: NetworkAlgorithm,
    prioritize_population: bool,
    critical_facilities: &[String],
) -> NetworkDesign {
    let request = GraphRequestBuilder::default()
        .purpose(GraphPurpose::NetworkDesign)
        .prioritize_population(prioritize_population)
        .build();
    let graph = build_design_graph(data, &request);

    let selection = match algorithm {
        NetworkAlgorithm::Prim => prim::spanning_tree(&graph),
        NetworkAlgorithm::Kruskal => kruskal::spanning_forest(&graph),
    };

    let design = assemble(
        data,
        &graph,
        selection,
        algorithm,
        prioritize_population,
        critical_facilities,
    );

    if design.disconnected {
        warn!(
            "Network design with {algorithm:?} covers only {} of {} locations.",
            design.nodes.len(),
            graph.nodes.len()
        );
    }
    info!(
        "Network design with {algorithm:?}: {} roads, {:.2} km, construction cost {:.1}",
        design.edges.len(),
        design.total_distance,
        design.total_construction_cost
    );
    design
}

fn tree_edge(data: &CityData, edge: &DesignEdge) -> TreeEdge {
    let road = edge.road;
    TreeEdge {
        from: road.from.external().to_string(),
        to: road.to.external().to_string(),
        from_name: data.location(&road.from).name.clone(),
        to_name: data.location(&road.to).name.clone(),
        distance: road.distance,
        capacity: road.capacity,
        condition: road.condition,
        weight: edge.weight,
        existing: road.is_existing(),
        construction_cost: road.construction_cost(),
    }
}

fn assemble(
    data: &CityData,
    graph: &DesignGraph,
    selection: SpanningSelection,
    algorithm: NetworkAlgorithm,
    prioritize_population: bool,
    critical_facilities: &[String],
) -> NetworkDesign {
    let edges: Vec<TreeEdge> = selection
        .edges
        .iter()
        .map(|&i| tree_edge(data, &graph.edges[i]))
        .collect();

    let nodes = graph
        .nodes
        .iter()
        .filter(|id| selection.covered[id.internal()])
        .map(|id| id.external().to_string())
        .collect();

    let endpoints: Vec<&Id<Location>> = selection
        .edges
        .iter()
        .flat_map(|&i| [&graph.edges[i].road.from, &graph.edges[i].road.to])
        .collect();
    let critical_facilities_connected = critical_facilities
        .iter()
        .all(|f| endpoints.iter().any(|e| e.external() == f.as_str()));

    NetworkDesign {
        algorithm,
        prioritize_population,
        nodes,
        total_distance: edges.iter().map(|e| e.distance).sum(),
        total_weight: edges.iter().map(|e| e.weight).sum(),
        total_construction_cost: edges.iter().filter_map(|e| e.construction_cost).sum(),
        edges,
        critical_facilities_connected,
        disconnected: selection.disconnected,
    }
}
