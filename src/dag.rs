//! The matching order DAG built from a query graph.

use crate::candidates::CandidateSet;
use crate::graph::{build_label_index, sort_by_label_degree, Graph};
use crate::types::{VId, VLabel};
use itertools::Itertools;
use log::debug;
use std::fmt;

/// Keeps the ranking away from a division by zero once a pending vertex
/// has no unvisited neighbors left; small enough not to reorder distinct
/// ratios.
const EPSILON: f64 = 1e-6;

/// The query graph rooted and oriented into a matching order.
///
/// Every undirected query edge becomes exactly one directed edge flowing
/// from an earlier-visited vertex to a later-visited one, so the result is
/// acyclic and `root` reaches every vertex of a connected query. Children
/// keep the query's label metadata and a label index; parents are a plain
/// CSR.
pub struct Dag {
    root: VId,
    order: Vec<VId>,
    num_edges: usize,
    max_label: VLabel,
    labels: Vec<VLabel>,
    label_frequency: Vec<usize>,
    child_offsets: Vec<usize>,
    children: Vec<VId>,
    child_label_offsets: Vec<(usize, usize)>,
    parent_offsets: Vec<usize>,
    parents: Vec<VId>,
}

impl Dag {
    /// Roots the query at the vertex minimizing `|C(v)| / deg(v)` and
    /// orients all edges by a greedy best-first expansion ranked by
    /// `|C(v)| / (deg_remaining(v) + EPSILON)`.
    pub fn build(query: &Graph, cs: &CandidateSet) -> Dag {
        let num_vertices = query.num_vertices();
        let root = select_root(query, cs);
        debug!("matching order rooted at u{}", root);

        let mut visited = vec![false; num_vertices];
        let mut pending = vec![false; num_vertices];
        let mut deg_remaining: Vec<usize> =
            (0..num_vertices).map(|v| query.degree(v as VId)).collect();
        let mut order = Vec::with_capacity(num_vertices);
        let mut child_lists: Vec<Vec<VId>> = vec![Vec::new(); num_vertices];
        let mut parent_lists: Vec<Vec<VId>> = vec![Vec::new(); num_vertices];
        let mut num_edges = 0;

        let mut next = if num_vertices == 0 { None } else { Some(root) };
        while let Some(v) = next {
            visited[v as usize] = true;
            pending[v as usize] = false;
            order.push(v);
            for &u in query.neighbors(v) {
                deg_remaining[u as usize] -= 1;
                if visited[u as usize] {
                    child_lists[u as usize].push(v);
                    parent_lists[v as usize].push(u);
                    num_edges += 1;
                } else {
                    pending[u as usize] = true;
                }
            }
            next = select_next(cs, &visited, &pending, &deg_remaining);
        }
        debug!("matching order: {:?}", order);

        let labels: Vec<VLabel> = (0..num_vertices).map(|v| query.label(v as VId)).collect();
        let degrees: Vec<usize> = (0..num_vertices).map(|v| query.degree(v as VId)).collect();
        for list in child_lists.iter_mut() {
            sort_by_label_degree(list, &labels, &degrees);
        }
        let (child_offsets, children) = into_csr(child_lists);
        let (parent_offsets, parents) = into_csr(parent_lists);
        let max_label = query.max_label();
        let child_label_offsets = build_label_index(&child_offsets, &children, &labels, max_label);
        let label_frequency = (0..(max_label + 1).max(0))
            .map(|l| query.label_frequency(l))
            .collect();

        Dag {
            root,
            order,
            num_edges,
            max_label,
            labels,
            label_frequency,
            child_offsets,
            children,
            child_label_offsets,
            parent_offsets,
            parents,
        }
    }

    pub fn root(&self) -> VId {
        self.root
    }

    /// The visit order of the expansion; `order()[0]` is the root.
    pub fn order(&self) -> &[VId] {
        &self.order
    }

    pub fn num_vertices(&self) -> usize {
        self.child_offsets.len() - 1
    }

    pub fn num_edges(&self) -> usize {
        self.num_edges
    }

    pub fn max_label(&self) -> VLabel {
        self.max_label
    }

    pub fn label(&self, u: VId) -> VLabel {
        self.labels[u as usize]
    }

    pub fn label_frequency(&self, label: VLabel) -> usize {
        if label < 0 {
            return 0;
        }
        self.label_frequency.get(label as usize).copied().unwrap_or(0)
    }

    /// Children of `u`, sorted by (label asc, query degree desc, id asc).
    pub fn children(&self, u: VId) -> &[VId] {
        &self.children[self.child_offsets[u as usize]..self.child_offsets[u as usize + 1]]
    }

    /// The children of `u` carrying `label`.
    pub fn children_by_label(&self, u: VId, label: VLabel) -> &[VId] {
        let width = (self.max_label + 1).max(0) as usize;
        if label < 0 || label as usize >= width {
            return &[];
        }
        let (begin, end) = self.child_label_offsets[u as usize * width + label as usize];
        &self.children[begin..end]
    }

    pub fn parents(&self, u: VId) -> &[VId] {
        &self.parents[self.parent_offsets[u as usize]..self.parent_offsets[u as usize + 1]]
    }
}

impl fmt::Display for Dag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "root: u{}", self.root)?;
        writeln!(
            f,
            "order: {}",
            self.order.iter().map(|u| format!("u{}", u)).join(" ")
        )?;
        for u in 0..self.num_vertices() {
            let children = self.children(u as VId);
            if !children.is_empty() {
                writeln!(
                    f,
                    "u{} -> {}",
                    u,
                    children.iter().map(|c| format!("u{}", c)).join(" ")
                )?;
            }
        }
        Ok(())
    }
}

/// The vertex minimizing `|C(v)| / deg(v)`, ties broken by lowest id.
fn select_root(query: &Graph, cs: &CandidateSet) -> VId {
    let mut root = 0;
    let mut best = f64::INFINITY;
    for u in 0..query.num_vertices() {
        let ratio = cs.count(u as VId) as f64 / query.degree(u as VId) as f64;
        if ratio < best {
            root = u as VId;
            best = ratio;
        }
    }
    root
}

/// The pending vertex minimizing `|C(v)| / (deg_remaining(v) + EPSILON)`,
/// ties broken by highest id.
fn select_next(
    cs: &CandidateSet,
    visited: &[bool],
    pending: &[bool],
    deg_remaining: &[usize],
) -> Option<VId> {
    let mut best: Option<(f64, VId)> = None;
    for u in 0..visited.len() {
        if !pending[u] || visited[u] {
            continue;
        }
        let rank = cs.count(u as VId) as f64 / (deg_remaining[u] as f64 + EPSILON);
        match best {
            Some((best_rank, _)) if rank > best_rank => {}
            _ => best = Some((rank, u as VId)),
        }
    }
    best.map(|(_, u)| u)
}

fn into_csr(lists: Vec<Vec<VId>>) -> (Vec<usize>, Vec<VId>) {
    let mut offsets = Vec::with_capacity(lists.len() + 1);
    let mut total = 0;
    offsets.push(0);
    for list in &lists {
        total += list.len();
        offsets.push(total);
    }
    (offsets, lists.into_iter().flatten().collect())
}
