//! The candidate sets of the query vertices.

use crate::graph::Graph;
use crate::types::VId;

/// For each query vertex, the data vertices that may match it.
///
/// The per-vertex order is arbitrary but stable; the backtracker iterates
/// it as given, so the emission order of embeddings depends on it.
pub struct CandidateSet {
    sets: Vec<Vec<VId>>,
}

impl CandidateSet {
    pub fn new(sets: Vec<Vec<VId>>) -> Self {
        CandidateSet { sets }
    }

    /// The label-and-degree filter: `C(u)` holds the data vertices whose
    /// label equals `u`'s and whose degree is at least `u`'s, in ascending
    /// id order. A query vertex labeled `-1` gets an empty set.
    pub fn from_filter(data: &Graph, query: &Graph) -> Self {
        let width = (data.max_label() + 1).max(0) as usize;
        let mut by_label: Vec<Vec<VId>> = vec![Vec::new(); width];
        for v in 0..data.num_vertices() {
            let l = data.label(v as VId);
            if l >= 0 {
                by_label[l as usize].push(v as VId);
            }
        }
        let sets = (0..query.num_vertices())
            .map(|u| {
                let l = query.label(u as VId);
                if l < 0 || l as usize >= width {
                    return Vec::new();
                }
                by_label[l as usize]
                    .iter()
                    .copied()
                    .filter(|&v| data.degree(v) >= query.degree(u as VId))
                    .collect()
            })
            .collect();
        CandidateSet { sets }
    }

    pub fn num_vertices(&self) -> usize {
        self.sets.len()
    }

    pub fn count(&self, u: VId) -> usize {
        self.sets[u as usize].len()
    }

    pub fn candidates(&self, u: VId) -> &[VId] {
        &self.sets[u as usize]
    }
}
