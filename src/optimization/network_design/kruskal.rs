use itertools::Itertools;

use crate::optimization::network::builder::DesignGraph;
use crate::optimization::network_design::SpanningSelection;

/// Union find with path compression and union by rank.
#[derive(Debug)]
pub struct DisjointSet {
    parent: Vec<usize>,
    rank: Vec<u8>,
}

impl DisjointSet {
    pub fn new(size: usize) -> Self {
        DisjointSet {
            parent: (0..size).collect(),
            rank: vec![0; size],
        }
    }

    pub fn find(&mut self, element: usize) -> usize {
        let mut root = element;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        let mut current = element;
        while self.parent[current] != root {
            let next = self.parent[current];
            self.parent[current] = root;
            current = next;
        }
        root
    }

    /// Merges the sets of `a` and `b`. Returns false if they were already in the same set.
    pub fn union(&mut self, a: usize, b: usize) -> bool {
        let (root_a, root_b) = (self.find(a), self.find(b));
        if root_a == root_b {
            return false;
        }
        match self.rank[root_a].cmp(&self.rank[root_b]) {
            std::cmp::Ordering::Less => self.parent[root_a] = root_b,
            std::cmp::Ordering::Greater => self.parent[root_b] = root_a,
            std::cmp::Ordering::Equal => {
                self.parent[root_b] = root_a;
                self.rank[root_a] += 1;
            }
        }
        true
    }
}

/// Accepts edges in ascending weight order (ties keep their input order) unless they close
/// a cycle. Yields a spanning forest if the graph is not connected.
pub(crate) fn spanning_forest(graph: &DesignGraph) -> SpanningSelection {
    let mut covered = vec![false; graph.index_bound()];
    let mut edges = Vec::new();
    let target = graph.nodes.len().saturating_sub(1);
    let mut sets = DisjointSet::new(graph.index_bound());

    for (i, edge) in graph
        .edges
        .iter()
        .enumerate()
        .sorted_by(|a, b| a.1.weight.total_cmp(&b.1.weight))
    {
        if edges.len() == target {
            break;
        }
        let (from, to) = (edge.road.from.internal(), edge.road.to.internal());
        if sets.union(from, to) {
            covered[from] = true;
            covered[to] = true;
            edges.push(i);
        }
    }

    SpanningSelection {
        disconnected: edges.len() < target,
        edges,
        covered,
    }
}

#[cfg(test)]
mod tests {
    use crate::optimization::network_design::kruskal::DisjointSet;

    #[test]
    fn union_and_find() {
        let mut sets = DisjointSet::new(5);
        assert!(sets.union(0, 1));
        assert!(sets.union(2, 3));
        assert!(!sets.union(1, 0));
        assert_ne!(sets.find(0), sets.find(2));

        assert!(sets.union(1, 3));
        assert_eq!(sets.find(0), sets.find(2));
        assert_eq!(sets.find(4), 4);
    }
}
