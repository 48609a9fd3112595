//! Unit-capacity blocking-flow engine on graph fragments.
//!
//! A Dinic-style maximum flow between two node *sets*. Each call to
//! [`BlockingFlow::advance`] runs one phase: a breadth-first layering of the
//! residual graph followed by a depth-first sweep that saturates a maximal
//! set of augmenting paths inside that layering. Phases must run in
//! sequence; the layering of one phase depends on the arcs saturated by the
//! previous one. When a phase finds no augmenting path the flow is maximal
//! and, by max-flow/min-cut, `flow_intensity` equals the minimum number of
//! arcs separating the source set from the target set.

use crate::fragment::Fragment;

/// One side of a source/target minimum cut.
#[derive(Debug, Clone)]
pub struct CutSide {
    /// Number of nodes with their flag set in `is_node_on_side`.
    pub node_on_side_count: u32,
    /// Number of arcs crossing between the side and the rest.
    pub cut_size: u32,
    /// Per-node membership flag, indexed by local node id.
    pub is_node_on_side: Vec<bool>,
}

/// Flips `side` to its complement when it covers half the nodes or more.
///
/// Afterwards `node_on_side_count <= node_count / 2`.
pub fn pick_smaller_side(side: &mut CutSide) {
    let node_count = side.is_node_on_side.len() as u32;
    if side.node_on_side_count >= node_count.div_ceil(2) {
        side.node_on_side_count = node_count - side.node_on_side_count;
        for flag in &mut side.is_node_on_side {
            *flag = !*flag;
        }
    }
}

/// Phase-based maximum flow between a source and a target node set.
///
/// Transient: one instance belongs to one fragment plus one source/target
/// pair and is discarded after its cut has been extracted.
pub struct BlockingFlow<'a> {
    fragment: &'a Fragment,
    is_source: Vec<bool>,
    is_target: Vec<bool>,
    flow_intensity: u32,
    is_arc_saturated: Vec<bool>,
    is_arc_blocked: Vec<bool>,
    finished: bool,
}

impl<'a> BlockingFlow<'a> {
    /// `is_source` and `is_target` must be non-empty, disjoint node sets of
    /// the fragment.
    pub fn new(fragment: &'a Fragment, is_source: Vec<bool>, is_target: Vec<bool>) -> Self {
        assert_eq!(is_source.len(), fragment.node_count());
        assert_eq!(is_target.len(), fragment.node_count());
        debug_assert!(is_source.iter().any(|&s| s));
        debug_assert!(is_target.iter().any(|&t| t));
        debug_assert!(
            is_source
                .iter()
                .zip(&is_target)
                .all(|(&s, &t)| !(s && t)),
            "a source node cannot also be a target node"
        );

        Self {
            is_source,
            is_target,
            flow_intensity: 0,
            is_arc_saturated: vec![false; fragment.arc_count()],
            is_arc_blocked: vec![false; fragment.arc_count()],
            finished: false,
            fragment,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// The flow pushed so far; equals the minimum cut once finished.
    pub fn current_flow_intensity(&self) -> u32 {
        self.flow_intensity
    }

    /// Runs one phase. A no-op once the flow is finished.
    pub fn advance(&mut self) {
        if self.finished {
            return;
        }
        if self.build_layering() {
            self.flow_intensity += self.augment_unblocked_paths();
        } else {
            self.finished = true;
        }
    }

    /// Phases until no augmenting path remains.
    pub fn run_to_completion(&mut self) {
        while !self.finished {
            self.advance();
        }
    }

    /// Breadth-first layering from the source set. Marks every arc that
    /// cannot be part of a shortest augmenting path as blocked. Returns
    /// whether any target node is still reachable.
    fn build_layering(&mut self) -> bool {
        let g = self.fragment;
        let n = g.node_count();

        let mut on_same_level_or_lower = vec![false; n];
        let mut pushed = vec![false; n];
        for blocked in &mut self.is_arc_blocked {
            *blocked = false;
        }

        let mut queue = vec![0u32; n];
        let mut queue_end = 0usize;
        for x in 0..n {
            if self.is_source[x] {
                queue[queue_end] = x as u32;
                queue_end += 1;
                pushed[x] = true;
            }
        }
        let mut queue_begin = 0usize;
        let mut level_end = queue_end;

        let mut target_reachable = false;
        while queue_begin != queue_end {
            for i in queue_begin..level_end {
                on_same_level_or_lower[queue[i] as usize] = true;
            }
            for i in queue_begin..level_end {
                let x = queue[i] as usize;
                for xy in g.out_arcs(x) {
                    if self.is_arc_saturated[xy] {
                        self.is_arc_blocked[xy] = true;
                        continue;
                    }
                    let y = g.head[xy] as usize;
                    if on_same_level_or_lower[y] {
                        self.is_arc_blocked[xy] = true;
                    } else if self.is_target[y] {
                        target_reachable = true;
                    } else if !pushed[y] {
                        queue[queue_end] = y as u32;
                        queue_end += 1;
                        pushed[y] = true;
                    }
                }
            }
            queue_begin = level_end;
            level_end = queue_end;
        }
        target_reachable
    }

    /// Depth-first search for augmenting paths through unblocked arcs, with
    /// dead-end pruning. Saturates every path found and returns how many.
    fn augment_unblocked_paths(&mut self) -> u32 {
        let g = self.fragment;
        let n = g.node_count();

        let mut path_node = vec![0u32; n + 1];
        let mut path_arc = vec![0u32; n];
        let mut augmented_path_count = 0u32;

        for s in 0..n {
            if !self.is_source[s] {
                continue;
            }
            path_node[0] = s as u32;
            let mut path_len = 0usize;
            loop {
                let x = path_node[path_len] as usize;
                match g.out_arcs(x).find(|&xy| !self.is_arc_blocked[xy]) {
                    None => {
                        if path_len == 0 {
                            break;
                        }
                        // Dead end: retreat and block the arc that led here.
                        path_len -= 1;
                        self.is_arc_blocked[path_arc[path_len] as usize] = true;
                    }
                    Some(xy) => {
                        let y = g.head[xy] as usize;
                        path_arc[path_len] = xy as u32;
                        path_len += 1;
                        path_node[path_len] = y as u32;
                        if self.is_target[y] {
                            for i in 0..path_len {
                                let a = path_arc[i] as usize;
                                debug_assert!(!self.is_arc_saturated[a]);
                                self.is_arc_blocked[a] = true;
                                let b = g.back_arc[a] as usize;
                                if self.is_arc_saturated[b] {
                                    // Pushing against earlier flow cancels it.
                                    self.is_arc_saturated[b] = false;
                                } else {
                                    self.is_arc_saturated[a] = true;
                                }
                            }
                            path_len = 0;
                            augmented_path_count += 1;
                        }
                    }
                }
            }
        }
        augmented_path_count
    }

    /// Nodes still reachable from the source set in the final residual
    /// graph. Must not be called before [`is_finished`](Self::is_finished).
    pub fn get_source_cut(&self) -> CutSide {
        assert!(self.finished, "cut requested before the flow is maximal");
        self.reachable_side(&self.is_source, |xy| !self.is_arc_saturated[xy])
    }

    /// Nodes that can still reach the target set in the final residual
    /// graph. Must not be called before [`is_finished`](Self::is_finished).
    pub fn get_target_cut(&self) -> CutSide {
        assert!(self.finished, "cut requested before the flow is maximal");
        self.reachable_side(&self.is_target, |xy| {
            !self.is_arc_saturated[self.fragment.back_arc[xy] as usize]
        })
    }

    fn reachable_side(&self, seed: &[bool], is_residual: impl Fn(usize) -> bool) -> CutSide {
        let g = self.fragment;
        let n = g.node_count();

        let mut side = CutSide {
            node_on_side_count: 0,
            cut_size: self.flow_intensity,
            is_node_on_side: vec![false; n],
        };
        let mut stack: Vec<u32> = Vec::with_capacity(n);
        for x in 0..n {
            if seed[x] {
                stack.push(x as u32);
                side.is_node_on_side[x] = true;
                side.node_on_side_count += 1;
            }
        }
        while let Some(x) = stack.pop() {
            for xy in g.out_arcs(x as usize) {
                if !is_residual(xy) {
                    continue;
                }
                let y = g.head[xy] as usize;
                if !side.is_node_on_side[y] {
                    side.is_node_on_side[y] = true;
                    side.node_on_side_count += 1;
                    stack.push(y as u32);
                }
            }
        }
        side
    }

    /// The most balanced minimum cut the final residual graph admits.
    ///
    /// Starts from the residual source and target sides, then alternately
    /// grows whichever side is currently smaller by piercing one saturated
    /// arc at a time, until that side cannot grow without touching the
    /// other. The returned side is normalized with [`pick_smaller_side`].
    /// Must not be called before [`is_finished`](Self::is_finished).
    pub fn get_balanced_cut(&self) -> CutSide {
        assert!(self.finished, "cut requested before the flow is maximal");
        let g = self.fragment;
        let n = g.node_count();
        let m = g.arc_count();

        fn enlarge(
            g: &Fragment,
            forward: bool,
            is_arc_saturated: &[bool],
            reachable: &mut [bool],
            count: &mut u32,
            stack: &mut Vec<u32>,
            pierce_candidates: &mut Vec<u32>,
        ) {
            while let Some(x) = stack.pop() {
                *count += 1;
                for xy in g.out_arcs(x as usize) {
                    let saturated = if forward {
                        is_arc_saturated[xy]
                    } else {
                        is_arc_saturated[g.back_arc[xy] as usize]
                    };
                    let y = g.head[xy] as usize;
                    if saturated {
                        pierce_candidates.push(y as u32);
                    } else if !reachable[y] {
                        reachable[y] = true;
                        stack.push(y as u32);
                    }
                }
            }
        }

        let mut source_reachable = self.is_source.clone();
        let mut target_reachable = self.is_target.clone();
        let mut source_count = 0u32;
        let mut target_count = 0u32;

        let mut stack: Vec<u32> = Vec::with_capacity(n);
        // Nodes can appear several times among the candidates, once per
        // saturated arc pointing at them.
        let mut source_pierce: Vec<u32> = Vec::with_capacity(m);
        let mut target_pierce: Vec<u32> = Vec::with_capacity(m);

        for x in 0..n {
            if self.is_source[x] {
                stack.push(x as u32);
            }
        }
        enlarge(
            g,
            true,
            &self.is_arc_saturated,
            &mut source_reachable,
            &mut source_count,
            &mut stack,
            &mut source_pierce,
        );
        for x in 0..n {
            if self.is_target[x] {
                stack.push(x as u32);
            }
        }
        enlarge(
            g,
            false,
            &self.is_arc_saturated,
            &mut target_reachable,
            &mut target_count,
            &mut stack,
            &mut target_pierce,
        );

        let mut side = loop {
            if source_count <= target_count {
                let pierce_node = loop {
                    match source_pierce.pop() {
                        None => break None,
                        Some(y) => {
                            if !source_reachable[y as usize] && !target_reachable[y as usize] {
                                break Some(y);
                            }
                        }
                    }
                };
                match pierce_node {
                    None => {
                        break CutSide {
                            node_on_side_count: source_count,
                            cut_size: self.flow_intensity,
                            is_node_on_side: source_reachable,
                        }
                    }
                    Some(y) => {
                        source_reachable[y as usize] = true;
                        stack.push(y);
                        enlarge(
                            g,
                            true,
                            &self.is_arc_saturated,
                            &mut source_reachable,
                            &mut source_count,
                            &mut stack,
                            &mut source_pierce,
                        );
                    }
                }
            } else {
                let pierce_node = loop {
                    match target_pierce.pop() {
                        None => break None,
                        Some(y) => {
                            if !source_reachable[y as usize] && !target_reachable[y as usize] {
                                break Some(y);
                            }
                        }
                    }
                };
                match pierce_node {
                    None => {
                        break CutSide {
                            node_on_side_count: target_count,
                            cut_size: self.flow_intensity,
                            is_node_on_side: target_reachable,
                        }
                    }
                    Some(y) => {
                        target_reachable[y as usize] = true;
                        stack.push(y);
                        enlarge(
                            g,
                            false,
                            &self.is_arc_saturated,
                            &mut target_reachable,
                            &mut target_count,
                            &mut stack,
                            &mut target_pierce,
                        );
                    }
                }
            }
        };

        pick_smaller_side(&mut side);
        side
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fragment::make_graph_fragment;

    fn arcs_of_edges(edges: &[(u32, u32)]) -> (Vec<u32>, Vec<u32>) {
        let mut tail = Vec::new();
        let mut head = Vec::new();
        for &(a, b) in edges {
            tail.push(a);
            head.push(b);
            tail.push(b);
            head.push(a);
        }
        (tail, head)
    }

    fn node_set(node_count: usize, members: &[usize]) -> Vec<bool> {
        let mut set = vec![false; node_count];
        for &x in members {
            set[x] = true;
        }
        set
    }

    fn path_fragment(len: u32) -> crate::fragment::Fragment {
        let edges: Vec<(u32, u32)> = (0..len - 1).map(|i| (i, i + 1)).collect();
        let (tail, head) = arcs_of_edges(&edges);
        make_graph_fragment(len, &tail, &head).unwrap()
    }

    #[test]
    fn test_path_graph_has_unit_max_flow() {
        let fragment = path_fragment(5);
        let mut flow = BlockingFlow::new(&fragment, node_set(5, &[0]), node_set(5, &[4]));
        flow.run_to_completion();

        assert!(flow.is_finished());
        assert_eq!(flow.current_flow_intensity(), 1);

        let source_cut = flow.get_source_cut();
        assert_eq!(source_cut.cut_size, 1);
        assert!(source_cut.is_node_on_side[0]);
        assert!(!source_cut.is_node_on_side[4]);

        let target_cut = flow.get_target_cut();
        assert_eq!(target_cut.cut_size, 1);
        assert!(target_cut.is_node_on_side[4]);
        assert!(!target_cut.is_node_on_side[0]);
    }

    #[test]
    fn test_balanced_cut_moves_to_the_middle_of_a_path() {
        // Every edge of the path is a minimum cut; the piercing growth must
        // end near the middle, not at the 1-vs-4 split the sources give.
        let fragment = path_fragment(5);
        let mut flow = BlockingFlow::new(&fragment, node_set(5, &[0]), node_set(5, &[4]));
        flow.run_to_completion();

        let cut = flow.get_balanced_cut();
        assert_eq!(cut.cut_size, 1);
        assert_eq!(cut.node_on_side_count, 2);
        let members: Vec<usize> = (0..5).filter(|&x| cut.is_node_on_side[x]).collect();
        assert!(members == vec![0, 1] || members == vec![3, 4]);
    }

    #[test]
    fn test_flow_intensity_equals_min_cut_across_two_bridges() {
        // Two triangles joined by the bridges 0-3 and 1-4; min cut is 2.
        let (tail, head) = arcs_of_edges(&[
            (0, 1),
            (1, 2),
            (2, 0),
            (3, 4),
            (4, 5),
            (5, 3),
            (0, 3),
            (1, 4),
        ]);
        let fragment = make_graph_fragment(6, &tail, &head).unwrap();
        let mut flow = BlockingFlow::new(&fragment, node_set(6, &[2]), node_set(6, &[5]));
        flow.run_to_completion();

        assert_eq!(flow.current_flow_intensity(), 2);
        let cut = flow.get_balanced_cut();
        assert_eq!(cut.cut_size, flow.current_flow_intensity());
        assert_eq!(cut.node_on_side_count, 3);

        // The only 2-arc cut separates the triangles.
        let side_of_2 = cut.is_node_on_side[2];
        assert_eq!(cut.is_node_on_side[0], side_of_2);
        assert_eq!(cut.is_node_on_side[1], side_of_2);
        assert_eq!(cut.is_node_on_side[3], !side_of_2);
        assert_eq!(cut.is_node_on_side[4], !side_of_2);
        assert_eq!(cut.is_node_on_side[5], !side_of_2);
    }

    #[test]
    fn test_pick_smaller_side_bounds_the_side_size() {
        for node_count in 1..=8usize {
            for count in 0..=node_count {
                let mut side = CutSide {
                    node_on_side_count: count as u32,
                    cut_size: 0,
                    is_node_on_side: (0..node_count).map(|x| x < count).collect(),
                };
                pick_smaller_side(&mut side);
                assert!(side.node_on_side_count as usize <= node_count / 2);
                let flagged = side.is_node_on_side.iter().filter(|&&f| f).count();
                assert_eq!(flagged, side.node_on_side_count as usize);
            }
        }
    }

    #[test]
    #[should_panic(expected = "before the flow is maximal")]
    fn test_cut_accessor_before_finish_is_a_usage_error() {
        let fragment = path_fragment(3);
        let flow = BlockingFlow::new(&fragment, node_set(3, &[0]), node_set(3, &[2]));
        let _ = flow.get_balanced_cut();
    }
}
