//! The shared graph view for data and query graphs.

use crate::types::{VId, VLabel};
use derive_more::Display;
use log::info;
use rayon::prelude::*;
use std::collections::BTreeSet;

/// An undirected vertex-labeled graph in CSR form.
///
/// The neighbor list of every vertex is sorted by (label asc, degree desc,
/// id asc), and a per-vertex label index maps each label to its sub-range
/// of the neighbor list. Both orders are contractual: the matching order
/// builder and the backtracker iterate neighbors in this order, and
/// [`is_neighbor`](Graph::is_neighbor) binary-searches inside a label
/// range.
pub struct Graph {
    graph_id: i32,
    num_edges: usize,
    num_labels: usize,
    max_label: VLabel,
    labels: Vec<VLabel>,
    label_frequency: Vec<usize>,
    offsets: Vec<usize>,
    neighbors: Vec<VId>,
    label_offsets: Vec<(usize, usize)>,
}

impl Graph {
    /// Builds a graph from dense vertex ids `0..n` and undirected edges.
    ///
    /// Labels must already be remapped; `-1` is the label that no data
    /// vertex carries.
    pub fn from_iter<V, E>(graph_id: i32, vertices: V, edges: E) -> Self
    where
        V: IntoIterator<Item = (VId, VLabel)>,
        E: IntoIterator<Item = (VId, VId)>,
    {
        let vertices: Vec<(VId, VLabel)> = vertices.into_iter().collect();
        let num_vertices = vertices.len();
        let mut labels = vec![-1; num_vertices];
        for (v, l) in vertices {
            labels[v as usize] = l;
        }
        let mut adj: Vec<Vec<VId>> = vec![Vec::new(); num_vertices];
        let mut num_edges = 0;
        for (v1, v2) in edges {
            adj[v1 as usize].push(v2);
            adj[v2 as usize].push(v1);
            num_edges += 1;
        }
        let degrees: Vec<usize> = adj.iter().map(|neighbors| neighbors.len()).collect();
        adj.par_iter_mut()
            .for_each(|neighbors| sort_by_label_degree(neighbors, &labels, &degrees));
        let mut offsets = Vec::with_capacity(num_vertices + 1);
        let mut total = 0;
        offsets.push(0);
        for neighbors in &adj {
            total += neighbors.len();
            offsets.push(total);
        }
        let neighbors: Vec<VId> = adj.into_iter().flatten().collect();
        let label_set: BTreeSet<VLabel> = labels.iter().copied().collect();
        let max_label = label_set.iter().next_back().copied().unwrap_or(-1);
        let mut label_frequency = vec![0; (max_label + 1).max(0) as usize];
        for &l in &labels {
            if l >= 0 {
                label_frequency[l as usize] += 1;
            }
        }
        let label_offsets = build_label_index(&offsets, &neighbors, &labels, max_label);
        info!(
            "graph {}: {} vertices, {} edges, {} labels",
            graph_id,
            num_vertices,
            num_edges,
            label_set.len()
        );
        Graph {
            graph_id,
            num_edges,
            num_labels: label_set.len(),
            max_label,
            labels,
            label_frequency,
            offsets,
            neighbors,
            label_offsets,
        }
    }

    pub fn graph_id(&self) -> i32 {
        self.graph_id
    }

    pub fn num_vertices(&self) -> usize {
        self.offsets.len() - 1
    }

    pub fn num_edges(&self) -> usize {
        self.num_edges
    }

    pub fn num_labels(&self) -> usize {
        self.num_labels
    }

    pub fn max_label(&self) -> VLabel {
        self.max_label
    }

    pub fn label(&self, v: VId) -> VLabel {
        self.labels[v as usize]
    }

    pub fn degree(&self, v: VId) -> usize {
        self.offsets[v as usize + 1] - self.offsets[v as usize]
    }

    /// The number of vertices carrying `label`.
    pub fn label_frequency(&self, label: VLabel) -> usize {
        if label < 0 {
            return 0;
        }
        self.label_frequency.get(label as usize).copied().unwrap_or(0)
    }

    /// All neighbors of `v`, sorted by (label asc, degree desc, id asc).
    pub fn neighbors(&self, v: VId) -> &[VId] {
        &self.neighbors[self.offsets[v as usize]..self.offsets[v as usize + 1]]
    }

    /// The neighbors of `v` carrying `label`.
    pub fn neighbors_by_label(&self, v: VId, label: VLabel) -> &[VId] {
        let width = (self.max_label + 1).max(0) as usize;
        if label < 0 || label as usize >= width {
            return &[];
        }
        let (begin, end) = self.label_offsets[v as usize * width + label as usize];
        &self.neighbors[begin..end]
    }

    /// Whether `u` and `v` are adjacent, in O(log deg(u)).
    pub fn is_neighbor(&self, u: VId, v: VId) -> bool {
        self.neighbors_by_label(u, self.label(v))
            .binary_search_by(|&w| {
                self.degree(v)
                    .cmp(&self.degree(w))
                    .then_with(|| w.cmp(&v))
            })
            .is_ok()
    }
}

/// Sorts a neighbor list by (label asc, degree desc, id asc).
pub(crate) fn sort_by_label_degree(list: &mut [VId], labels: &[VLabel], degrees: &[usize]) {
    list.sort_unstable_by(|&a, &b| {
        labels[a as usize]
            .cmp(&labels[b as usize])
            .then_with(|| degrees[b as usize].cmp(&degrees[a as usize]))
            .then_with(|| a.cmp(&b))
    });
}

/// Builds the per-vertex label index over a CSR neighbor array whose lists
/// are already label-sorted: each maximal run of equally-labeled neighbors
/// becomes that label's range. Unset entries stay `(0, 0)`, the empty
/// range.
pub(crate) fn build_label_index(
    offsets: &[usize],
    neighbors: &[VId],
    labels: &[VLabel],
    max_label: VLabel,
) -> Vec<(usize, usize)> {
    let width = (max_label + 1).max(0) as usize;
    let num_vertices = offsets.len().saturating_sub(1);
    let mut index = vec![(0, 0); num_vertices * width];
    for v in 0..num_vertices {
        let (begin, end) = (offsets[v], offsets[v + 1]);
        let mut run_begin = begin;
        while run_begin < end {
            let label = labels[neighbors[run_begin] as usize];
            let mut run_end = run_begin + 1;
            while run_end < end && labels[neighbors[run_end] as usize] == label {
                run_end += 1;
            }
            if label >= 0 {
                index[v * width + label as usize] = (run_begin, run_end);
            }
            run_begin = run_end;
        }
    }
    index
}

#[derive(Debug, Display)]
#[display(fmt = "{} {} {}", num_vertices, num_edges, num_labels)]
pub struct GraphInfo {
    num_vertices: usize,
    num_edges: usize,
    num_labels: usize,
}

impl GraphInfo {
    pub fn new(graph: &Graph) -> Self {
        Self {
            num_vertices: graph.num_vertices(),
            num_edges: graph.num_edges(),
            num_labels: graph.num_labels(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_labeled_graph() -> Graph {
        Graph::from_iter(
            0,
            vec![(0, 0), (1, 1), (2, 0), (3, 1), (4, 2)],
            vec![(0, 1), (0, 2), (0, 3), (0, 4), (1, 2), (3, 4)],
        )
    }

    #[test]
    fn test_counts() {
        let g = create_labeled_graph();
        assert_eq!(g.num_vertices(), 5);
        assert_eq!(g.num_edges(), 6);
        assert_eq!(g.num_labels(), 3);
        assert_eq!(g.max_label(), 2);
        assert_eq!(g.degree(0), 4);
        assert_eq!(g.degree(1), 2);
        assert_eq!(g.label(4), 2);
        assert_eq!(g.label_frequency(0), 2);
        assert_eq!(g.label_frequency(1), 2);
        assert_eq!(g.label_frequency(2), 1);
        assert_eq!(g.label_frequency(-1), 0);
    }

    #[test]
    fn test_neighbor_order() {
        let g = create_labeled_graph();
        // label 0: {2}; label 1: {1, 3} with equal degree, id asc; label 2: {4}
        assert_eq!(g.neighbors(0), &[2, 1, 3, 4]);
        assert_eq!(g.neighbors(1), &[0, 2]);
    }

    #[test]
    fn test_label_ranges() {
        let g = create_labeled_graph();
        assert_eq!(g.neighbors_by_label(0, 0), &[2]);
        assert_eq!(g.neighbors_by_label(0, 1), &[1, 3]);
        assert_eq!(g.neighbors_by_label(0, 2), &[4]);
        assert_eq!(g.neighbors_by_label(1, 1), &[] as &[VId]);
        assert_eq!(g.neighbors_by_label(1, -1), &[] as &[VId]);
    }

    #[test]
    fn test_is_neighbor() {
        let g = create_labeled_graph();
        assert!(g.is_neighbor(0, 3));
        assert!(g.is_neighbor(3, 0));
        assert!(g.is_neighbor(1, 2));
        assert!(!g.is_neighbor(1, 3));
        assert!(!g.is_neighbor(2, 4));
    }

    #[test]
    fn test_isolated_vertex() {
        let g = Graph::from_iter(0, vec![(0, 0), (1, 0)], vec![]);
        assert_eq!(g.neighbors(0), &[] as &[VId]);
        assert_eq!(g.degree(1), 0);
        assert!(!g.is_neighbor(0, 1));
    }

    #[test]
    fn test_unseen_label() {
        let g = Graph::from_iter(0, vec![(0, -1), (1, 0)], vec![(0, 1)]);
        assert_eq!(g.label(0), -1);
        assert_eq!(g.label_frequency(-1), 0);
        // a -1 neighbor owns no label range
        assert_eq!(g.neighbors_by_label(1, -1), &[] as &[VId]);
        assert_eq!(g.neighbors(1), &[0]);
    }

    #[test]
    fn test_info() {
        let g = create_labeled_graph();
        assert_eq!(GraphInfo::new(&g).to_string(), "5 6 3");
    }
}
