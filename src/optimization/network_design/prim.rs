use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use crate::optimization::network::builder::DesignGraph;
use crate::optimization::network_design::SpanningSelection;

/// Candidate edge ordered by weight first and position in the edge list second.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Candidate {
    weight: f64,
    edge: usize,
}

impl Eq for Candidate {}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.weight
            .total_cmp(&other.weight)
            .then(self.edge.cmp(&other.edge))
    }
}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Grows a tree from the first node, always adding the cheapest edge that crosses the
/// tree boundary. Stops early if no crossing edge is left.
pub(crate) fn spanning_tree(graph: &DesignGraph) -> SpanningSelection {
    let mut covered = vec![false; graph.index_bound()];
    let mut edges = Vec::new();

    let Some(seed) = graph.nodes.first() else {
        return SpanningSelection {
            edges,
            covered,
            disconnected: false,
        };
    };

    let mut incident: Vec<Vec<usize>> = vec![Vec::new(); graph.index_bound()];
    for (i, edge) in graph.edges.iter().enumerate() {
        incident[edge.road.from.internal()].push(i);
        incident[edge.road.to.internal()].push(i);
    }

    let mut queue = BinaryHeap::new();
    let add_node = |node: usize,
                    covered: &mut Vec<bool>,
                    queue: &mut BinaryHeap<Reverse<Candidate>>| {
        covered[node] = true;
        for &i in &incident[node] {
            queue.push(Reverse(Candidate {
                weight: graph.edges[i].weight,
                edge: i,
            }));
        }
    };

    add_node(seed.internal(), &mut covered, &mut queue);
    let mut tree_size = 1;

    while tree_size < graph.nodes.len() {
        let Some(Reverse(candidate)) = queue.pop() else {
            break;
        };
        let road = graph.edges[candidate.edge].road;
        let (from, to) = (road.from.internal(), road.to.internal());
        let next = match (covered[from], covered[to]) {
            (true, false) => to,
            (false, true) => from,
            _ => continue,
        };
        edges.push(candidate.edge);
        add_node(next, &mut covered, &mut queue);
        tree_size += 1;
    }

    SpanningSelection {
        disconnected: tree_size < graph.nodes.len(),
        edges,
        covered,
    }
}
