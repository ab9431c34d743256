//! The text front end: the `t`/`v`/`e` graph format and the candidate-set
//! format.
//!
//! A graph file is
//!
//! ```text
//! t <graph_id> <num_vertices>
//! v <vertex_id> <label>          (num_vertices times, ids 0..n-1)
//! e <v1> <v2> <edge_label>       (undirected; the edge label is ignored)
//! ```
//!
//! A candidate-set file is
//!
//! ```text
//! t <num_query_vertices>
//! c <u> <count> <v_1> ... <v_count>
//! ```

use crate::candidates::CandidateSet;
use crate::error::{Error, Result};
use crate::graph::Graph;
use crate::types::{VId, VLabel};
use nom::{
    bytes::complete::tag,
    character::complete::{digit1, multispace0, space1},
    combinator::{map_res, opt, recognize},
    multi::count,
    sequence::{pair, preceded},
    IResult,
};
use std::collections::BTreeSet;
use std::io::ErrorKind;
use std::path::Path;

/// The dense label remap collected from the data graph.
///
/// Raw labels seen on data vertices are reassigned to `0..k` in ascending
/// raw order; every other label maps to `-1`. One value per data graph,
/// threaded explicitly into both graph constructions.
pub struct LabelMap {
    table: Vec<VLabel>,
}

impl LabelMap {
    pub fn from_labels<I>(labels: I) -> Self
    where
        I: IntoIterator<Item = VLabel>,
    {
        let seen: BTreeSet<VLabel> = labels.into_iter().filter(|&l| l >= 0).collect();
        let size = seen
            .iter()
            .next_back()
            .map_or(0, |&max| max as usize + 1);
        let mut table = vec![-1; size];
        for (dense, raw) in seen.into_iter().enumerate() {
            table[raw as usize] = dense as VLabel;
        }
        LabelMap { table }
    }

    pub fn get(&self, raw: VLabel) -> VLabel {
        if raw < 0 {
            return -1;
        }
        self.table.get(raw as usize).copied().unwrap_or(-1)
    }
}

/// A graph file parsed but not yet remapped.
pub struct GraphText {
    pub graph_id: i32,
    pub num_vertices: usize,
    pub vertices: Vec<(VId, VLabel)>,
    pub edges: Vec<(VId, VId)>,
}

fn parse_vid(input: &str) -> IResult<&str, VId> {
    map_res(digit1, |s: &str| s.parse::<VId>())(input)
}

fn parse_usize(input: &str) -> IResult<&str, usize> {
    map_res(digit1, |s: &str| s.parse::<usize>())(input)
}

fn parse_i32(input: &str) -> IResult<&str, i32> {
    map_res(recognize(pair(opt(tag("-")), digit1)), |s: &str| {
        s.parse::<i32>()
    })(input)
}

fn graph_header(input: &str) -> IResult<&str, (i32, usize)> {
    let (input, _) = preceded(multispace0, tag("t"))(input)?;
    let (input, graph_id) = preceded(space1, parse_i32)(input)?;
    let (input, num_vertices) = preceded(space1, parse_usize)(input)?;
    Ok((input, (graph_id, num_vertices)))
}

fn vertex_line(input: &str) -> IResult<&str, (VId, VLabel)> {
    let (input, _) = preceded(multispace0, tag("v"))(input)?;
    let (input, id) = preceded(space1, parse_vid)(input)?;
    let (input, label) = preceded(space1, parse_i32)(input)?;
    Ok((input, (id, label)))
}

fn edge_line(input: &str) -> IResult<&str, (VId, VId)> {
    let (input, _) = preceded(multispace0, tag("e"))(input)?;
    let (input, v1) = preceded(space1, parse_vid)(input)?;
    let (input, v2) = preceded(space1, parse_vid)(input)?;
    let (input, _elabel) = preceded(space1, parse_i32)(input)?;
    Ok((input, (v1, v2)))
}

pub fn parse_graph(mut input: &str) -> IResult<&str, GraphText> {
    let (rest, (graph_id, num_vertices)) = graph_header(input)?;
    input = rest;
    let mut vertices = Vec::with_capacity(num_vertices);
    let mut edges = Vec::new();
    loop {
        if let Ok((rest, vertex)) = vertex_line(input) {
            vertices.push(vertex);
            input = rest;
        } else if let Ok((rest, edge)) = edge_line(input) {
            edges.push(edge);
            input = rest;
        } else {
            break;
        }
    }
    let (input, _) = multispace0(input)?;
    Ok((
        input,
        GraphText {
            graph_id,
            num_vertices,
            vertices,
            edges,
        },
    ))
}

fn candidate_header(input: &str) -> IResult<&str, usize> {
    let (input, _) = preceded(multispace0, tag("t"))(input)?;
    preceded(space1, parse_usize)(input)
}

fn candidate_line(input: &str) -> IResult<&str, (VId, Vec<VId>)> {
    let (input, _) = preceded(multispace0, tag("c"))(input)?;
    let (input, u) = preceded(space1, parse_vid)(input)?;
    let (input, len) = preceded(space1, parse_usize)(input)?;
    let (input, candidates) = count(preceded(space1, parse_vid), len)(input)?;
    Ok((input, (u, candidates)))
}

pub fn parse_candidates(mut input: &str) -> IResult<&str, (usize, Vec<(VId, Vec<VId>)>)> {
    let (rest, num_vertices) = candidate_header(input)?;
    input = rest;
    let mut lines = Vec::with_capacity(num_vertices);
    while let Ok((rest, line)) = candidate_line(input) {
        lines.push(line);
        input = rest;
    }
    let (input, _) = multispace0(input)?;
    Ok((input, (num_vertices, lines)))
}

fn read_to_string(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == ErrorKind::NotFound {
            Error::InputNotFound(path.to_path_buf())
        } else {
            Error::InputMalformed(path.to_path_buf(), e.to_string())
        }
    })
}

fn parse_graph_text(path: &Path, text: &str) -> Result<GraphText> {
    let malformed = |message: String| Error::InputMalformed(path.to_path_buf(), message);
    let parsed = match parse_graph(text) {
        Ok((rest, parsed)) if rest.is_empty() => parsed,
        Ok((rest, _)) => {
            return Err(malformed(format!(
                "unexpected input at {:?}",
                rest.lines().next().unwrap_or("")
            )))
        }
        Err(e) => return Err(malformed(e.to_string())),
    };
    if parsed.vertices.len() != parsed.num_vertices {
        return Err(malformed(format!(
            "expected {} vertices, found {}",
            parsed.num_vertices,
            parsed.vertices.len()
        )));
    }
    let in_range = |v: VId| (v as usize) < parsed.num_vertices;
    if let Some(&(v, _)) = parsed.vertices.iter().find(|&&(v, _)| !in_range(v)) {
        return Err(malformed(format!("vertex id {} out of range", v)));
    }
    if let Some(&(v1, v2)) = parsed
        .edges
        .iter()
        .find(|&&(v1, v2)| !in_range(v1) || !in_range(v2))
    {
        return Err(malformed(format!("edge ({}, {}) out of range", v1, v2)));
    }
    Ok(parsed)
}

/// Reads a data graph and the label remap collected from it.
pub fn read_data_graph<P: AsRef<Path>>(path: P) -> Result<(Graph, LabelMap)> {
    let path = path.as_ref();
    let text = read_to_string(path)?;
    let parsed = parse_graph_text(path, &text)?;
    let label_map = LabelMap::from_labels(parsed.vertices.iter().map(|&(_, l)| l));
    let graph = Graph::from_iter(
        parsed.graph_id,
        parsed
            .vertices
            .iter()
            .map(|&(v, l)| (v, label_map.get(l))),
        parsed.edges.iter().copied(),
    );
    Ok((graph, label_map))
}

/// Reads a query graph under the data graph's label remap.
pub fn read_query_graph<P: AsRef<Path>>(path: P, label_map: &LabelMap) -> Result<Graph> {
    let path = path.as_ref();
    let text = read_to_string(path)?;
    let parsed = parse_graph_text(path, &text)?;
    Ok(Graph::from_iter(
        parsed.graph_id,
        parsed
            .vertices
            .iter()
            .map(|&(v, l)| (v, label_map.get(l))),
        parsed.edges.iter().copied(),
    ))
}

/// Reads a candidate-set file, validated against the query.
pub fn read_candidates<P: AsRef<Path>>(path: P, query: &Graph) -> Result<CandidateSet> {
    let path = path.as_ref();
    let text = read_to_string(path)?;
    let malformed = |message: String| Error::InputMalformed(path.to_path_buf(), message);
    let (num_vertices, lines) = match parse_candidates(&text) {
        Ok((rest, parsed)) if rest.is_empty() => parsed,
        Ok(_) => return Err(malformed("unexpected trailing input".into())),
        Err(e) => return Err(malformed(e.to_string())),
    };
    if num_vertices != query.num_vertices() {
        return Err(malformed(format!(
            "candidate sets for {} vertices, query has {}",
            num_vertices,
            query.num_vertices()
        )));
    }
    let mut sets: Vec<Option<Vec<VId>>> = (0..num_vertices).map(|_| None).collect();
    for (u, candidates) in lines {
        let slot = sets
            .get_mut(u as usize)
            .ok_or_else(|| malformed(format!("query vertex {} out of range", u)))?;
        if slot.is_some() {
            return Err(malformed(format!("duplicate candidate line for {}", u)));
        }
        *slot = Some(candidates);
    }
    let sets = sets
        .into_iter()
        .enumerate()
        .map(|(u, set)| set.ok_or_else(|| malformed(format!("no candidate line for {}", u))))
        .collect::<Result<_>>()?;
    Ok(CandidateSet::new(sets))
}
