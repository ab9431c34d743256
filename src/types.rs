//! Vertex id and label types shared by the query and data sides.

/// The vertex id type.
///
/// Query and data vertex ids live in disjoint dense ranges `0..n`.
pub type VId = u32;

/// The vertex label type.
///
/// `-1` marks a query label that no data vertex carries.
pub type VLabel = i32;
