//! Inertial-flow partitioning.
//!
//! Road networks embed in the plane, and good separators tend to run
//! perpendicular to some geographic direction. Inertial flow exploits this:
//! project all nodes onto a direction, declare the lowest slice the flow
//! source and the highest slice the flow target, and let the blocking-flow
//! engine find the smallest cut between them. Trying a handful of
//! directions and keeping the best cut is cheap and works remarkably well
//! in practice.

use std::time::Instant;

use rayon::prelude::*;

use crate::flow::{BlockingFlow, CutSide};
use crate::fragment::Fragment;
use crate::progress::ProgressLog;

/// Smallest admissible fraction of nodes on the lighter side of a cut.
///
/// Conservative enough to keep the recursion depth logarithmic by ruling
/// out degenerate 1-vs-(n-1) splits, while leaving the flow computation
/// room to find a small cut. A tuning constant, not a hard requirement.
pub const DEFAULT_MIN_BALANCE: f32 = 0.25;

/// Projection directions tried per partitioning step: both coordinate axes
/// and both diagonals.
const PROJECTIONS: [fn(f32, f32) -> f32; 4] = [
    |lat, _lon| lat,
    |_lat, lon| lon,
    |lat, lon| lat + lon,
    |lat, lon| lat - lon,
];

/// [`inertial_flow_with_balance`] with [`DEFAULT_MIN_BALANCE`].
pub fn inertial_flow(
    fragment: &Fragment,
    latitude: &[f32],
    longitude: &[f32],
    log: ProgressLog,
) -> CutSide {
    inertial_flow_with_balance(fragment, DEFAULT_MIN_BALANCE, latitude, longitude, log)
}

/// Computes a balanced cut of `fragment` using inertial flow.
///
/// `latitude`/`longitude` are indexed by *original* node id (the fragment's
/// `global_node_id` entries). For every projection direction the lowest and
/// highest `min_balance` fraction of nodes become flow sources and targets;
/// the direction whose finished flow yields the smallest balanced cut wins,
/// with ties broken toward the larger (more balanced) side and then toward
/// the earlier direction. The returned side is already normalized to the
/// smaller side.
///
/// Degenerate geometry is harmless: a direction with constant projected
/// coordinates merely picks an arbitrary but deterministic source/target
/// split, and the best-of-all-directions selection absorbs the loss.
///
/// `min_balance` must lie in `(0, 0.5]` and the fragment must have at least
/// two nodes.
pub fn inertial_flow_with_balance(
    fragment: &Fragment,
    min_balance: f32,
    latitude: &[f32],
    longitude: &[f32],
    log: ProgressLog,
) -> CutSide {
    assert!(
        min_balance > 0.0 && min_balance <= 0.5,
        "min_balance must lie in (0, 0.5]"
    );
    let node_count = fragment.node_count();
    assert!(
        node_count >= 2,
        "cannot partition a fragment with fewer than two nodes"
    );

    let side_size = ((node_count as f32 * min_balance) as usize).clamp(1, node_count / 2);

    let start = Instant::now();
    log.report(|| {
        format!(
            "Start running inertial flow with min balance {} on fragment with {} nodes and {} arcs",
            min_balance,
            node_count,
            fragment.arc_count()
        )
    });

    let mut cuts: Vec<CutSide> = PROJECTIONS
        .par_iter()
        .map(|projection| {
            let key = |x: u32| {
                let id = fragment.global_node_id[x as usize] as usize;
                projection(latitude[id], longitude[id])
            };
            let (is_source, is_target) = select_source_and_target(node_count, side_size, key);
            let mut flow = BlockingFlow::new(fragment, is_source, is_target);
            flow.run_to_completion();
            flow.get_balanced_cut()
        })
        .collect();

    let mut best = 0;
    for candidate in 1..cuts.len() {
        if is_better_cut(&cuts[candidate], &cuts[best]) {
            best = candidate;
        }
    }

    tracing::debug!(
        node_count,
        direction = best,
        cut_size = cuts[best].cut_size,
        side_count = cuts[best].node_on_side_count,
        "inertial flow finished"
    );
    log.report(|| {
        format!(
            "Inertial flow finished after {} ms; the cut has {} arcs and the smaller side has {} nodes",
            start.elapsed().as_millis(),
            cuts[best].cut_size,
            cuts[best].node_on_side_count
        )
    });

    cuts.swap_remove(best)
}

/// Smaller cut wins; on equal cut size the more balanced side wins.
fn is_better_cut(candidate: &CutSide, best: &CutSide) -> bool {
    candidate.cut_size < best.cut_size
        || (candidate.cut_size == best.cut_size
            && candidate.node_on_side_count > best.node_on_side_count)
}

/// Marks the `side_size` nodes with the smallest keys as sources and the
/// `side_size` nodes with the largest keys as targets.
///
/// Uses two partial selections instead of a full sort; ties are resolved
/// arbitrarily but deterministically.
fn select_source_and_target(
    node_count: usize,
    side_size: usize,
    key: impl Fn(u32) -> f32,
) -> (Vec<bool>, Vec<bool>) {
    debug_assert!(side_size >= 1 && 2 * side_size <= node_count);

    let mut ids: Vec<u32> = (0..node_count as u32).collect();
    let by_key = |l: &u32, r: &u32| key(*l).total_cmp(&key(*r));
    ids.select_nth_unstable_by(side_size, by_key);
    ids[side_size..].select_nth_unstable_by(node_count - 2 * side_size, by_key);

    let mut is_source = vec![false; node_count];
    let mut is_target = vec![false; node_count];
    for &x in &ids[..side_size] {
        is_source[x as usize] = true;
    }
    for &x in &ids[node_count - side_size..] {
        is_target[x as usize] = true;
    }
    (is_source, is_target)
}
