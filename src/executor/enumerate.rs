//! The backtracking enumerator.

use super::frontier::{Extension, Frontier};
use crate::candidates::CandidateSet;
use crate::dag::Dag;
use crate::graph::Graph;
use crate::types::VId;
use std::collections::HashSet;
use std::io::{self, Write};

/// Enumerates every embedding of `query` into `data` under the candidate
/// sets `cs`.
///
/// Writes the header line `t <n>` and one line `a <v_0> ... <v_{n-1}>` per
/// embedding, and returns the number of embeddings. The emission order is
/// deterministic for fixed inputs.
pub fn enumerate<W: Write>(
    out: &mut W,
    data: &Graph,
    query: &Graph,
    cs: &CandidateSet,
) -> io::Result<usize> {
    writeln!(out, "t {}", query.num_vertices())?;
    let dag = Dag::build(query, cs);
    Matcher::new(data, &dag, cs).run(out)
}

fn write_embedding<W: Write>(buf: &mut W, row: &[VId]) -> io::Result<()> {
    write!(buf, "a")?;
    for &v in row {
        write!(buf, " {}", v)?;
    }
    writeln!(buf)
}

/// One entry of the iteration stack: the query vertex matched at this
/// level, its candidate list, the cursor into it, and the undo logs for
/// the frontier mutations made here.
#[derive(Default)]
struct Level {
    vertex: VId,
    candidates: Vec<VId>,
    cursor: usize,
    mapped: VId,
    added: Vec<Extension>,
    popped: Option<Extension>,
}

impl Level {
    fn enter(vertex: VId, candidates: Vec<VId>) -> Self {
        Level {
            vertex,
            candidates,
            ..Level::default()
        }
    }
}

struct Matcher<'a> {
    data: &'a Graph,
    dag: &'a Dag,
    cs: &'a CandidateSet,
    mapping: Vec<Option<VId>>,
    used: HashSet<VId>,
    frontier: Frontier,
    levels: Vec<Level>,
    num_rows: usize,
}

impl<'a> Matcher<'a> {
    fn new(data: &'a Graph, dag: &'a Dag, cs: &'a CandidateSet) -> Self {
        let num_vertices = dag.num_vertices();
        Matcher {
            data,
            dag,
            cs,
            mapping: vec![None; num_vertices],
            used: HashSet::new(),
            frontier: Frontier::new(),
            levels: (0..num_vertices + 1).map(|_| Level::default()).collect(),
            num_rows: 0,
        }
    }

    /// Drives the state machine over `level` until it unwinds past the
    /// root. `returning` is set while ascending, so the level we land on
    /// first undoes the commitment it descended with.
    fn run<W: Write>(mut self, out: &mut W) -> io::Result<usize> {
        let num_vertices = self.dag.num_vertices();
        if num_vertices == 0 {
            return Ok(0);
        }
        let root = self.dag.root();
        self.levels[1] = Level::enter(root, self.cs.candidates(root).to_vec());
        let mut level = 1;
        let mut returning = false;
        while level > 0 {
            if returning {
                if let Some(popped) = self.levels[level].popped.take() {
                    self.frontier.insert(popped);
                }
                let mapped = self.levels[level].mapped;
                self.used.remove(&mapped);
                returning = false;
            }
            // extensions recorded here described the abandoned choice
            let added = std::mem::take(&mut self.levels[level].added);
            for extension in &added {
                self.frontier.remove(extension);
            }
            while self.levels[level].cursor < self.levels[level].candidates.len()
                && self
                    .used
                    .contains(&self.levels[level].candidates[self.levels[level].cursor])
            {
                self.levels[level].cursor += 1;
            }
            if self.levels[level].cursor >= self.levels[level].candidates.len() {
                let vertex = self.levels[level].vertex;
                self.mapping[vertex as usize] = None;
                level -= 1;
                if level > 0 {
                    // the parent must try its next candidate
                    self.levels[level].cursor += 1;
                    returning = true;
                }
                continue;
            }
            let vertex = self.levels[level].vertex;
            let v = self.levels[level].candidates[self.levels[level].cursor];
            self.mapping[vertex as usize] = Some(v);
            self.used.insert(v);
            if level == num_vertices {
                self.emit(out)?;
            }
            if !self.extend(level, vertex) {
                // some child lost its last candidate under this choice
                self.levels[level].cursor += 1;
                self.used.remove(&v);
                continue;
            }
            if self.frontier.is_empty() {
                self.levels[level].cursor += 1;
                self.used.remove(&v);
                continue;
            }
            let next = self.frontier.pop_min().unwrap();
            let next_vertex = next.vertex();
            self.levels[level].mapped = v;
            self.levels[level].popped = Some(next.clone());
            level += 1;
            self.levels[level] = Level::enter(next_vertex, next.into_candidates());
        }
        Ok(self.num_rows)
    }

    /// Inserts a frontier entry for every child of `vertex` whose parents
    /// are now all matched. Returns `false` on a dead end, leaving the
    /// entries already inserted to be rolled back through the undo log.
    fn extend(&mut self, level: usize, vertex: VId) -> bool {
        let dag = self.dag;
        for &child in dag.children(vertex) {
            if !self.parents_matched(child) {
                continue;
            }
            let candidates = self.filter_candidates(child);
            if candidates.is_empty() {
                return false;
            }
            let extension = Extension::new(child, candidates);
            self.frontier.insert(extension.clone());
            self.levels[level].added.push(extension);
        }
        true
    }

    fn parents_matched(&self, child: VId) -> bool {
        self.dag
            .parents(child)
            .iter()
            .all(|&p| self.mapping[p as usize].is_some())
    }

    /// The candidates of `child` not yet in the image and adjacent in the
    /// data graph to the match of every parent.
    fn filter_candidates(&self, child: VId) -> Vec<VId> {
        let parents = self.dag.parents(child);
        self.cs
            .candidates(child)
            .iter()
            .copied()
            .filter(|&w| {
                !self.used.contains(&w)
                    && parents
                        .iter()
                        .all(|&p| self.data.is_neighbor(self.mapping[p as usize].unwrap(), w))
            })
            .collect()
    }

    fn emit<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        let row: Vec<VId> = self.mapping.iter().map(|m| m.unwrap()).collect();
        write_embedding(out, &row)?;
        self.num_rows += 1;
        Ok(())
    }
}
