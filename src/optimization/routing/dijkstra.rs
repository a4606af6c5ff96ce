use std::cmp::Ordering;

use keyed_priority_queue::KeyedPriorityQueue;

use crate::optimization::network::builder::RoutingGraph;

/// Travel time wrapper ordered in reverse, so that the max-queue pops the smallest cost first.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cost(pub f64);

impl Eq for Cost {}

impl Ord for Cost {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0).reverse()
    }
}

impl PartialOrd for Cost {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Cost {
    pub fn get(&self) -> f64 {
        self.0
    }
}

/// Result of a single source search. Nodes the search did not reach have no distance.
#[derive(Debug, Clone)]
pub struct ShortestPathTree {
    pub source: usize,
    pub distances: Vec<Option<f64>>,
    /// Predecessor node and the road used to reach each node.
    pub predecessors: Vec<Option<(usize, usize)>>,
    /// Nodes in the order they were finalized, with their final distance.
    pub settled: Vec<(usize, f64)>,
}

impl ShortestPathTree {
    pub fn distance(&self, node: usize) -> Option<f64> {
        self.distances.get(node).copied().flatten()
    }

    /// Walks the predecessor pointers back from `target`. Returns the visited nodes from
    /// source to target and the roads between them.
    pub fn path_to(&self, target: usize) -> Option<(Vec<usize>, Vec<usize>)> {
        self.distance(target)?;
        let mut nodes = vec![target];
        let mut roads = Vec::new();
        let mut current = target;
        while let Some((previous, road)) = self.predecessors[current] {
            nodes.push(previous);
            roads.push(road);
            current = previous;
        }
        nodes.reverse();
        roads.reverse();
        Some((nodes, roads))
    }
}

pub struct Dijkstra {}

impl Dijkstra {
    /// Searches from `from` until `to` is finalized, or the whole reachable graph if no
    /// target is given. Each node is finalized at most once.
    pub fn search(graph: &RoutingGraph, from: usize, to: Option<usize>) -> ShortestPathTree {
        let node_count = graph.number_of_nodes();
        let mut distances: Vec<Option<f64>> = vec![None; node_count];
        let mut predecessors = vec![None; node_count];
        let mut finalized = vec![false; node_count];
        let mut settled = Vec::new();

        let mut queue = KeyedPriorityQueue::new();
        queue.push(from, Cost(0.));
        distances[from] = Some(0.);

        while let Some((current_id, current_distance)) = queue.pop() {
            finalized[current_id] = true;
            settled.push((current_id, current_distance.get()));
            if Some(current_id) == to {
                break;
            }

            for (neighbour, weight, road) in graph.out_edges(current_id) {
                if finalized[neighbour] {
                    continue;
                }
                let candidate = current_distance.get() + weight;
                let improves = distances[neighbour].map_or(true, |known| candidate < known);
                if improves {
                    // push updates the priority if the node is already queued
                    queue.push(neighbour, Cost(candidate));
                    distances[neighbour] = Some(candidate);
                    predecessors[neighbour] = Some((current_id, road));
                }
            }
        }

        // Nodes still queued were reached but never finalized. Their tentative distance
        // is not a shortest path, so they are reported as unreached.
        for (node, done) in finalized.iter().enumerate() {
            if !done {
                distances[node] = None;
                predecessors[node] = None;
            }
        }

        ShortestPathTree {
            source: from,
            distances,
            predecessors,
            settled,
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_approx_eq::assert_approx_eq;

    use crate::optimization::data::CityData;
    use crate::optimization::network::builder::{build_routing_graph, GraphRequestBuilder};
    use crate::optimization::routing::dijkstra::{Cost, Dijkstra};
    use crate::test_utils::{io_city, neighborhood, road};

    /// 0 - 1 - 2 - 3 in a line plus a slow shortcut 0 - 3 and an isolated node 4.
    fn line_city() -> CityData {
        let city = io_city(
            vec![
                neighborhood("0", 10),
                neighborhood("1", 10),
                neighborhood("2", 10),
                neighborhood("3", 10),
                neighborhood("4", 10),
            ],
            vec![
                road("0", "1", 1., 10_000., 10),
                road("1", "2", 1., 10_000., 10),
                road("2", "3", 1., 10_000., 10),
                road("0", "3", 10., 10_000., 10),
            ],
        );
        CityData::try_from(city).unwrap()
    }

    #[test]
    fn cost_ordering_is_reversed() {
        assert!(Cost(1.) > Cost(2.));
        assert_eq!(std::cmp::Ordering::Equal, Cost(3.).cmp(&Cost(3.)));
    }

    #[test]
    fn shortest_path_along_line() {
        let data = line_city();
        let graph = build_routing_graph(&data, &GraphRequestBuilder::default().build());
        let tree = Dijkstra::search(&graph, 0, Some(3));

        let (nodes, roads) = tree.path_to(3).unwrap();
        assert_eq!(vec![0, 1, 2, 3], nodes);
        assert_eq!(vec![0, 1, 2], roads);

        // 1 km at 30 km/h with traffic 1000 on capacity 10000: 30 * 0.96
        let per_edge = 1. / (30. * 0.96) * 60.;
        assert_approx_eq!(3. * per_edge, tree.distance(3).unwrap());
    }

    #[test]
    fn settle_order_is_monotone() {
        let data = line_city();
        let graph = build_routing_graph(&data, &GraphRequestBuilder::default().build());
        let tree = Dijkstra::search(&graph, 2, None);

        assert_eq!(4, tree.settled.len());
        assert_eq!((2, 0.), tree.settled[0]);
        for window in tree.settled.windows(2) {
            assert!(window[0].1 <= window[1].1);
        }
    }

    #[test]
    fn unreachable_node_has_no_distance() {
        let data = line_city();
        let graph = build_routing_graph(&data, &GraphRequestBuilder::default().build());
        let tree = Dijkstra::search(&graph, 0, Some(4));

        assert_eq!(None, tree.distance(4));
        assert!(tree.path_to(4).is_none());
        assert_eq!(Some((vec![0], vec![])), tree.path_to(0));
    }

    #[test]
    fn stop_at_target() {
        let data = line_city();
        let graph = build_routing_graph(&data, &GraphRequestBuilder::default().build());
        let tree = Dijkstra::search(&graph, 0, Some(1));

        assert_eq!(1, tree.settled.last().unwrap().0);
        assert_eq!(None, tree.distance(3));
    }
}
