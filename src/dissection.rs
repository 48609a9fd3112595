//! Recursive separator decomposition and order linearization.
//!
//! The order producer: recursively split each connected fragment with a
//! vertex separator, record the separator vertices, and recurse into what
//! remains. The resulting separator forest is linearized into a flat
//! permutation in which every tree node's separator vertices precede those
//! of all its descendants. That permutation is the elimination order handed
//! to the CCH builder.

use std::time::Instant;

use crate::error::GraphError;
use crate::fragment::{
    decompose_graph_fragment_into_connected_components, make_graph_fragment, Fragment, INVALID_ID,
};
use crate::inertial::inertial_flow;
use crate::progress::ProgressLog;

/// One node of the separator forest, in first-child/next-sibling encoding.
///
/// Links are indices into [`SeparatorDecomposition::tree`]; [`INVALID_ID`]
/// means "no child" or "no sibling". The node's separator vertices occupy
/// `order[first_separator_vertex..last_separator_vertex]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeparatorTreeNode {
    pub left_child: u32,
    pub right_sibling: u32,
    pub first_separator_vertex: u32,
    pub last_separator_vertex: u32,
}

/// A separator forest plus the flat order it linearizes to.
///
/// The tree is an index-addressed arena. A disconnected input yields one
/// tree per connected component; the roots are chained through
/// `right_sibling`, starting at `tree[0]` for non-empty graphs. `order`
/// contains every original node id exactly once, ancestors before
/// descendants.
#[derive(Debug, Clone, Default)]
pub struct SeparatorDecomposition {
    pub tree: Vec<SeparatorTreeNode>,
    pub order: Vec<u32>,
}

/// Reduces a node-side partition to a vertex separator.
///
/// Takes the endpoints on the *larger* side of every arc leaving the
/// smaller side. At most one separator node per crossing arc, and removing
/// the separator leaves no arc between the two remaining sides.
pub fn derive_separator_from_cut(fragment: &Fragment, cut: &[bool]) -> Vec<bool> {
    debug_assert_eq!(cut.len(), fragment.node_count());

    let flagged = cut.iter().filter(|&&on_side| on_side).count();
    let small_side = flagged <= fragment.node_count() / 2;

    let mut is_separator = vec![false; fragment.node_count()];
    for a in 0..fragment.arc_count() {
        let x = fragment.tail[a] as usize;
        let y = fragment.head[a] as usize;
        if cut[x] == small_side && cut[y] != small_side {
            is_separator[y] = true;
        }
    }
    is_separator
}

/// Recursively decomposes `fragment` along vertex separators.
///
/// `compute_separator` is called for every connected piece with more than
/// one node and must return a per-node separator flag for it. Pieces with
/// at most one node become leaves whose range covers the node itself.
pub fn compute_separator_decomposition(
    fragment: Fragment,
    compute_separator: impl Fn(&Fragment) -> Vec<bool>,
    log: ProgressLog,
) -> SeparatorDecomposition {
    let node_count = fragment.node_count();
    let mut decomposition = SeparatorDecomposition {
        tree: Vec::new(),
        order: Vec::with_capacity(node_count),
    };

    let start = Instant::now();
    log.report(|| format!("Start decomposing graph with {node_count} nodes"));
    let parts = decompose_graph_fragment_into_connected_components(fragment);
    log.report(|| format!("Top-level graph has {} connected components", parts.len()));

    let mut previous_root = INVALID_ID;
    for part in parts {
        let root = build_subtree(part, &compute_separator, log, &mut decomposition);
        if previous_root != INVALID_ID {
            decomposition.tree[previous_root as usize].right_sibling = root;
        }
        previous_root = root;
    }

    debug_assert_eq!(decomposition.order.len(), node_count);
    tracing::info!(
        node_count,
        tree_nodes = decomposition.tree.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "separator decomposition finished"
    );
    log.report(|| {
        format!(
            "Finished separator decomposition with {} tree nodes after {} ms",
            decomposition.tree.len(),
            start.elapsed().as_millis()
        )
    });
    decomposition
}

/// Builds the subtree of one connected fragment, returns its root index.
fn build_subtree(
    fragment: Fragment,
    compute_separator: &impl Fn(&Fragment) -> Vec<bool>,
    log: ProgressLog,
    out: &mut SeparatorDecomposition,
) -> u32 {
    let node_count = fragment.node_count();
    let first_separator_vertex = out.order.len() as u32;

    if node_count <= 1 {
        out.order.extend_from_slice(&fragment.global_node_id);
        let index = out.tree.len() as u32;
        out.tree.push(SeparatorTreeNode {
            left_child: INVALID_ID,
            right_sibling: INVALID_ID,
            first_separator_vertex,
            last_separator_vertex: out.order.len() as u32,
        });
        return index;
    }

    let report = log.is_enabled() && node_count > 1000;
    if report {
        log.report(|| format!("Computing separator for component with {node_count} nodes"));
    }
    let mut is_separator = compute_separator(&fragment);
    debug_assert_eq!(is_separator.len(), node_count);
    if is_separator.iter().all(|&sep| !sep) {
        // An empty separator would not shrink anything; dissolving the
        // fragment into one flat range keeps the recursion finite.
        is_separator = vec![true; node_count];
    }

    for (x, &sep) in is_separator.iter().enumerate() {
        if sep {
            out.order.push(fragment.global_node_id[x]);
        }
    }
    if report {
        log.report(|| {
            format!(
                "Separator has {} of {node_count} nodes",
                out.order.len() as u32 - first_separator_vertex
            )
        });
    }

    let index = out.tree.len() as u32;
    out.tree.push(SeparatorTreeNode {
        left_child: INVALID_ID,
        right_sibling: INVALID_ID,
        first_separator_vertex,
        last_separator_vertex: out.order.len() as u32,
    });

    let keep: Vec<bool> = is_separator.iter().map(|&sep| !sep).collect();
    let remainder = fragment.induced_subgraph(&keep);
    drop(fragment);

    let mut previous_child = INVALID_ID;
    for part in decompose_graph_fragment_into_connected_components(remainder) {
        let child = build_subtree(part, compute_separator, log, out);
        if previous_child == INVALID_ID {
            out.tree[index as usize].left_child = child;
        } else {
            out.tree[previous_child as usize].right_sibling = child;
        }
        previous_child = child;
    }
    index
}

/// Linearizes the separator decomposition of `fragment` into a flat order.
///
/// Every original node id appears exactly once; a tree node's separator
/// vertices appear strictly before those of both its children.
pub fn compute_nested_node_dissection_order(
    fragment: Fragment,
    compute_separator: impl Fn(&Fragment) -> Vec<bool>,
    log: ProgressLog,
) -> Vec<u32> {
    compute_separator_decomposition(fragment, compute_separator, log).order
}

/// The composed entry point: nested dissection with inertial-flow cuts.
///
/// Builds the whole-graph fragment from the symmetric arc list, then drives
/// the recursive decomposition with a separator callback that runs inertial
/// flow on each piece and reduces the balanced cut to a vertex separator.
/// Returns the elimination order, a permutation of `[0, node_count)`.
pub fn compute_nested_node_dissection_order_using_inertial_flow(
    node_count: u32,
    tail: &[u32],
    head: &[u32],
    latitude: &[f32],
    longitude: &[f32],
    log: ProgressLog,
) -> Result<Vec<u32>, GraphError> {
    if latitude.len() != node_count as usize || longitude.len() != node_count as usize {
        return Err(GraphError::CoordinateLengthMismatch {
            expected: node_count as usize,
            lat_len: latitude.len(),
            lon_len: longitude.len(),
        });
    }

    let start = Instant::now();
    let fragment = make_graph_fragment(node_count, tail, head)?;
    log.report(|| {
        format!(
            "Built graph fragment with {} nodes and {} arcs in {} ms",
            fragment.node_count(),
            fragment.arc_count(),
            start.elapsed().as_millis()
        )
    });

    let compute_separator = |piece: &Fragment| {
        let cut = inertial_flow(piece, latitude, longitude, log);
        derive_separator_from_cut(piece, &cut.is_node_on_side)
    };

    Ok(compute_nested_node_dissection_order(
        fragment,
        compute_separator,
        log,
    ))
}
