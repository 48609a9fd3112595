//! Error types for graph construction.

use thiserror::Error;

/// Structural precondition failures in a caller-supplied graph.
///
/// These indicate a malformed input, not a transient condition: a graph that
/// trips one of these cannot produce a meaningful elimination order, so
/// construction aborts instead of guessing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    #[error("tail and head arrays differ in length ({tail_len} vs {head_len})")]
    ArcArrayLengthMismatch { tail_len: usize, head_len: usize },

    #[error("arc {arc} references node {node_id}, but the graph has only {node_count} nodes")]
    NodeIdOutOfRange {
        arc: usize,
        node_id: u32,
        node_count: u32,
    },

    #[error("arc {tail} -> {head} has no matching reverse arc; the arc list must be symmetric")]
    MissingReverseArc { tail: u32, head: u32 },

    #[error("latitude/longitude must have one entry per node (expected {expected}, got {lat_len}/{lon_len})")]
    CoordinateLengthMismatch {
        expected: usize,
        lat_len: usize,
        lon_len: usize,
    },
}
