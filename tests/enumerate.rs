use sgmatch::{candidates::CandidateSet, dag::Dag, executor::enumerate, graph::Graph};
use std::collections::HashSet;

fn run(data: &Graph, query: &Graph, cs: &CandidateSet) -> (String, usize) {
    let mut buf = Vec::new();
    let num_rows = enumerate(&mut buf, data, query, cs).unwrap();
    (String::from_utf8(buf).unwrap(), num_rows)
}

fn embeddings(output: &str) -> HashSet<Vec<u32>> {
    output
        .lines()
        .filter(|line| line.starts_with('a'))
        .map(|line| line[2..].split(' ').map(|x| x.parse().unwrap()).collect())
        .collect()
}

fn assert_sound(output: &str, data: &Graph, query: &Graph) {
    for row in embeddings(output) {
        assert_eq!(row.len(), query.num_vertices());
        let distinct: HashSet<u32> = row.iter().copied().collect();
        assert_eq!(distinct.len(), row.len());
        for i in 0..query.num_vertices() {
            assert_eq!(query.label(i as u32), data.label(row[i]));
            for &j in query.neighbors(i as u32) {
                assert!(data.is_neighbor(row[i], row[j as usize]));
            }
        }
    }
}

fn complete_graph(graph_id: i32, n: u32) -> Graph {
    let vertices: Vec<(u32, i32)> = (0..n).map(|v| (v, 0)).collect();
    let mut edges = Vec::new();
    for v1 in 0..n {
        for v2 in v1 + 1..n {
            edges.push((v1, v2));
        }
    }
    Graph::from_iter(graph_id, vertices, edges)
}

#[test]
fn test_triangle_into_k4() {
    let data = complete_graph(0, 4);
    let query = complete_graph(1, 3);
    let cs = CandidateSet::new(vec![vec![0, 1, 2, 3]; 3]);
    let (output, num_rows) = run(&data, &query, &cs);
    assert!(output.starts_with("t 3\n"));
    assert_eq!(num_rows, 24);
    let mut expected = HashSet::new();
    for v0 in 0..4 {
        for v1 in 0..4 {
            for v2 in 0..4 {
                if v0 != v1 && v0 != v2 && v1 != v2 {
                    expected.insert(vec![v0, v1, v2]);
                }
            }
        }
    }
    assert_eq!(embeddings(&output), expected);
    assert_sound(&output, &data, &query);
}

#[test]
fn test_path_into_star() {
    let data = Graph::from_iter(
        0,
        vec![(0, 0), (1, 0), (2, 0), (3, 0)],
        vec![(0, 1), (0, 2), (0, 3)],
    );
    let query = Graph::from_iter(1, vec![(0, 0), (1, 0), (2, 0)], vec![(0, 1), (1, 2)]);
    let cs = CandidateSet::new(vec![vec![0, 1, 2, 3]; 3]);
    let (output, num_rows) = run(&data, &query, &cs);
    assert_eq!(num_rows, 6);
    // the middle query vertex can only match the center
    assert_eq!(
        output,
        "t 3\na 1 0 2\na 1 0 3\na 2 0 1\na 2 0 3\na 3 0 1\na 3 0 2\n"
    );
    assert_sound(&output, &data, &query);
}

#[test]
fn test_unmatchable_label_emits_header_only() {
    let data = complete_graph(0, 4);
    let query = Graph::from_iter(
        1,
        vec![(0, 1), (1, 0), (2, 0)],
        vec![(0, 1), (1, 2), (0, 2)],
    );
    // no data vertex carries label 1
    let cs = CandidateSet::from_filter(&data, &query);
    assert_eq!(cs.count(0), 0);
    let (output, num_rows) = run(&data, &query, &cs);
    assert_eq!(num_rows, 0);
    assert_eq!(output, "t 3\n");
}

#[test]
fn test_two_disjoint_triangles() {
    let data = Graph::from_iter(
        0,
        (0..6).map(|v| (v, 0)).collect::<Vec<_>>(),
        vec![(0, 1), (1, 2), (0, 2), (3, 4), (4, 5), (3, 5)],
    );
    let query = complete_graph(1, 3);
    let cs = CandidateSet::from_filter(&data, &query);
    let (output, num_rows) = run(&data, &query, &cs);
    assert_eq!(num_rows, 12);
    for row in embeddings(&output) {
        let first_component = row.iter().all(|&v| v < 3);
        let second_component = row.iter().all(|&v| v >= 3);
        assert!(first_component || second_component);
    }
    assert_sound(&output, &data, &query);
}

#[test]
fn test_root_binds_smallest_candidate_set() {
    let data = complete_graph(0, 4);
    let query = Graph::from_iter(1, vec![(0, 0), (1, 0)], vec![(0, 1)]);
    let cs = CandidateSet::new(vec![vec![2], vec![0, 1, 2, 3]]);
    assert_eq!(Dag::build(&query, &cs).root(), 0);
    let (output, num_rows) = run(&data, &query, &cs);
    assert_eq!(num_rows, 3);
    // the single-candidate vertex is matched first, and first to 2
    assert!(output.lines().nth(1).unwrap().starts_with("a 2 "));
}

#[test]
fn test_square_into_itself() {
    let square = |graph_id| {
        Graph::from_iter(
            graph_id,
            vec![(0, 0), (1, 0), (2, 0), (3, 0)],
            vec![(0, 1), (1, 2), (2, 3), (0, 3)],
        )
    };
    let (data, query) = (square(0), square(1));
    let cs = CandidateSet::from_filter(&data, &query);
    let (output, num_rows) = run(&data, &query, &cs);
    // |Aut(C4)| = 8
    assert_eq!(num_rows, 8);
    assert_sound(&output, &data, &query);
}

#[test]
fn test_single_vertex_query() {
    let data = complete_graph(0, 4);
    let query = Graph::from_iter(1, vec![(0, 0)], vec![]);
    let cs = CandidateSet::from_filter(&data, &query);
    let (output, num_rows) = run(&data, &query, &cs);
    assert_eq!(num_rows, 4);
    assert_eq!(output, "t 1\na 0\na 1\na 2\na 3\n");
}

#[test]
fn test_empty_candidates_mid_query() {
    let data = complete_graph(0, 4);
    let query = Graph::from_iter(1, vec![(0, 0), (1, 0), (2, 0)], vec![(0, 1), (1, 2)]);
    let cs = CandidateSet::new(vec![vec![0, 1], vec![0, 1], vec![]]);
    let (output, num_rows) = run(&data, &query, &cs);
    assert_eq!(num_rows, 0);
    assert_eq!(output, "t 3\n");
}

#[test]
fn test_rerun_is_byte_identical() {
    let data = complete_graph(0, 4);
    let query = complete_graph(1, 3);
    let cs = CandidateSet::new(vec![vec![0, 1, 2, 3]; 3]);
    let (first, _) = run(&data, &query, &cs);
    let (second, _) = run(&data, &query, &cs);
    assert_eq!(first, second);
}

#[test]
fn test_candidate_order_changes_order_not_set() {
    let data = complete_graph(0, 4);
    let query = complete_graph(1, 3);
    let ascending = CandidateSet::new(vec![vec![0, 1, 2, 3]; 3]);
    let shuffled = CandidateSet::new(vec![
        vec![3, 1, 0, 2],
        vec![2, 3, 1, 0],
        vec![1, 0, 3, 2],
    ]);
    let (out1, rows1) = run(&data, &query, &ascending);
    let (out2, rows2) = run(&data, &query, &shuffled);
    assert_eq!(rows1, rows2);
    assert_eq!(embeddings(&out1), embeddings(&out2));
}
