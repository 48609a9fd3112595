//! Graph fragments: induced subgraphs with local node numbering.
//!
//! A [`Fragment`] is the unit the recursive dissection works on. It stores a
//! symmetric arc list in CSR layout over locally renumbered nodes, and keeps
//! `global_node_id` so every result computed on a fragment can be projected
//! back to the caller's original node ids. Fragments are owned values: each
//! recursion step works on fully disjoint fragments, so there is no shared
//! mutable graph state anywhere in the pipeline.

use rustc_hash::FxHashMap;

use crate::error::GraphError;

/// Sentinel for "no node", "no arc" and "no tree link".
pub const INVALID_ID: u32 = u32::MAX;

/// An induced subgraph over a subset of the original nodes.
///
/// Invariants (checked in debug builds after every construction):
/// - `first_out` is a prefix sum; arcs of local node `x` occupy
///   `first_out[x]..first_out[x + 1]` and have `tail[a] == x`.
/// - The arc set is symmetric: `back_arc[back_arc[a]] == a`,
///   `tail[a] == head[back_arc[a]]` and `head[a] == tail[back_arc[a]]`.
#[derive(Debug, Clone, Default)]
pub struct Fragment {
    /// Local node index -> original node id.
    pub global_node_id: Vec<u32>,
    /// CSR offsets into `tail`/`head`, length `node_count + 1`.
    pub first_out: Vec<u32>,
    pub tail: Vec<u32>,
    pub head: Vec<u32>,
    /// Index of the reverse arc of each arc.
    pub back_arc: Vec<u32>,
}

impl Fragment {
    pub fn node_count(&self) -> usize {
        self.global_node_id.len()
    }

    pub fn arc_count(&self) -> usize {
        self.head.len()
    }

    /// Outgoing arc indices of local node `x`.
    pub fn out_arcs(&self, x: usize) -> std::ops::Range<usize> {
        self.first_out[x] as usize..self.first_out[x + 1] as usize
    }

    /// The induced sub-fragment over the local nodes with `keep[x] == true`.
    ///
    /// Kept nodes are renumbered in increasing local-id order; an arc
    /// survives only if both endpoints are kept. Since reverse arcs share
    /// their endpoints, the surviving arc set is again symmetric.
    pub fn induced_subgraph(&self, keep: &[bool]) -> Fragment {
        debug_assert_eq!(keep.len(), self.node_count());

        let mut local_id = vec![INVALID_ID; self.node_count()];
        let mut kept_count = 0u32;
        for (x, &kept) in keep.iter().enumerate() {
            if kept {
                local_id[x] = kept_count;
                kept_count += 1;
            }
        }

        let mut part = Fragment::default();
        part.global_node_id.reserve(kept_count as usize);
        part.first_out.reserve(kept_count as usize + 1);
        part.first_out.push(0);

        let mut arc_new_id = vec![INVALID_ID; self.arc_count()];
        let mut kept_arcs: Vec<u32> = Vec::new();
        for x in 0..self.node_count() {
            if !keep[x] {
                continue;
            }
            part.global_node_id.push(self.global_node_id[x]);
            for xy in self.out_arcs(x) {
                let y = self.head[xy] as usize;
                if !keep[y] {
                    continue;
                }
                arc_new_id[xy] = kept_arcs.len() as u32;
                kept_arcs.push(xy as u32);
                part.tail.push(local_id[x]);
                part.head.push(local_id[y]);
            }
            part.first_out.push(part.tail.len() as u32);
        }

        part.back_arc = kept_arcs
            .iter()
            .map(|&a| arc_new_id[self.back_arc[a as usize] as usize])
            .collect();

        part.debug_validate();
        part
    }

    /// Debug-build invariant check, mirrored on every construction path.
    pub(crate) fn debug_validate(&self) {
        if !cfg!(debug_assertions) {
            return;
        }
        assert_eq!(self.first_out.len(), self.node_count() + 1);
        assert_eq!(self.tail.len(), self.head.len());
        assert_eq!(self.back_arc.len(), self.head.len());
        assert_eq!(self.first_out[self.node_count()] as usize, self.arc_count());
        for x in 0..self.node_count() {
            for xy in self.out_arcs(x) {
                assert_eq!(self.tail[xy] as usize, x);
            }
        }
        for a in 0..self.arc_count() {
            let b = self.back_arc[a] as usize;
            assert!(b < self.arc_count());
            assert_eq!(self.back_arc[b] as usize, a);
            assert_eq!(self.tail[a], self.head[b]);
            assert_eq!(self.head[a], self.tail[b]);
        }
    }
}

/// Builds the identity fragment over the whole input graph.
///
/// `tail`/`head` must describe a symmetric arc list: every arc needs a
/// matching reverse arc (a self-loop counts as its own reverse). Arcs are
/// re-sorted by tail internally, so the input order does not matter.
///
/// Fails with a [`GraphError`] when the arrays disagree in length, an
/// endpoint is out of `[0, node_count)`, or an arc lacks its reverse.
pub fn make_graph_fragment(
    node_count: u32,
    tail: &[u32],
    head: &[u32],
) -> Result<Fragment, GraphError> {
    if tail.len() != head.len() {
        return Err(GraphError::ArcArrayLengthMismatch {
            tail_len: tail.len(),
            head_len: head.len(),
        });
    }
    for a in 0..tail.len() {
        for &node_id in [tail[a], head[a]].iter() {
            if node_id >= node_count {
                return Err(GraphError::NodeIdOutOfRange {
                    arc: a,
                    node_id,
                    node_count,
                });
            }
        }
    }

    let n = node_count as usize;
    let m = tail.len();

    // Counting sort by tail; stable, so parallel arcs keep their input order.
    let mut first_out = vec![0u32; n + 1];
    for &t in tail {
        first_out[t as usize + 1] += 1;
    }
    for x in 0..n {
        first_out[x + 1] += first_out[x];
    }
    let mut cursor = first_out.clone();
    let mut sorted_tail = vec![0u32; m];
    let mut sorted_head = vec![0u32; m];
    for a in 0..m {
        let slot = cursor[tail[a] as usize] as usize;
        cursor[tail[a] as usize] += 1;
        sorted_tail[slot] = tail[a];
        sorted_head[slot] = head[a];
    }

    // Match every arc to its reverse. The k-th arc from x to y pairs with
    // the k-th arc from y to x, so parallel arc bundles pair up cleanly.
    let mut by_endpoints: FxHashMap<(u32, u32), Vec<u32>> = FxHashMap::default();
    for a in 0..m {
        by_endpoints
            .entry((sorted_tail[a], sorted_head[a]))
            .or_default()
            .push(a as u32);
    }

    let mut back_arc = vec![INVALID_ID; m];
    for (&(x, y), forward) in &by_endpoints {
        if x == y {
            for &a in forward {
                back_arc[a as usize] = a;
            }
            continue;
        }
        if x > y {
            if !by_endpoints.contains_key(&(y, x)) {
                return Err(GraphError::MissingReverseArc { tail: x, head: y });
            }
            continue;
        }
        let reverse = by_endpoints.get(&(y, x)).map(Vec::as_slice).unwrap_or(&[]);
        if forward.len() != reverse.len() {
            let (t, h) = if forward.len() > reverse.len() {
                (x, y)
            } else {
                (y, x)
            };
            return Err(GraphError::MissingReverseArc { tail: t, head: h });
        }
        for (&a, &b) in forward.iter().zip(reverse) {
            back_arc[a as usize] = b;
            back_arc[b as usize] = a;
        }
    }

    let fragment = Fragment {
        global_node_id: (0..node_count).collect(),
        first_out,
        tail: sorted_tail,
        head: sorted_head,
        back_arc,
    };
    fragment.debug_validate();
    Ok(fragment)
}

/// Splits a fragment into its connected components.
///
/// Each arc/back-arc pair counts as one undirected edge. Every component
/// becomes its own fragment with local ids renumbered from 0 in discovery
/// order; `global_node_id` is carried through from the parent, so results
/// still project back to the original graph. A connected input is returned
/// unchanged.
pub fn decompose_graph_fragment_into_connected_components(fragment: Fragment) -> Vec<Fragment> {
    let n = fragment.node_count();
    let m = fragment.arc_count();
    if n == 0 {
        return Vec::new();
    }

    let mut component = vec![INVALID_ID; n];
    let mut local_id = vec![0u32; n];
    let mut component_members: Vec<Vec<u32>> = Vec::new();
    let mut stack: Vec<u32> = Vec::new();

    for root in 0..n {
        if component[root] != INVALID_ID {
            continue;
        }
        let c = component_members.len() as u32;
        let mut members = Vec::new();
        component[root] = c;
        local_id[root] = 0;
        members.push(root as u32);
        stack.push(root as u32);
        while let Some(x) = stack.pop() {
            for xy in fragment.out_arcs(x as usize) {
                let y = fragment.head[xy] as usize;
                if component[y] == INVALID_ID {
                    component[y] = c;
                    local_id[y] = members.len() as u32;
                    members.push(y as u32);
                    stack.push(y as u32);
                }
            }
        }
        component_members.push(members);
    }

    if component_members.len() == 1 {
        return vec![fragment];
    }
    tracing::debug!(
        node_count = n,
        components = component_members.len(),
        "fragment decomposed into connected components"
    );

    // Arcs stay within their component, so one shared renumbering array is
    // enough: each component fills its entries before reading them back.
    let mut arc_new_id = vec![INVALID_ID; m];
    let mut parts = Vec::with_capacity(component_members.len());
    for members in &component_members {
        let mut part = Fragment::default();
        part.global_node_id.reserve(members.len());
        part.first_out.reserve(members.len() + 1);
        part.first_out.push(0);

        let mut part_arcs: Vec<u32> = Vec::new();
        for &x in members {
            part.global_node_id.push(fragment.global_node_id[x as usize]);
            for xy in fragment.out_arcs(x as usize) {
                arc_new_id[xy] = part_arcs.len() as u32;
                part_arcs.push(xy as u32);
                part.tail.push(local_id[x as usize]);
                part.head.push(local_id[fragment.head[xy] as usize]);
            }
            part.first_out.push(part.tail.len() as u32);
        }
        part.back_arc = part_arcs
            .iter()
            .map(|&a| arc_new_id[fragment.back_arc[a as usize] as usize])
            .collect();

        part.debug_validate();
        parts.push(part);
    }
    parts
}
