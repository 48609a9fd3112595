//! End-to-end checks of the ordering pipeline on randomized graphs.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use flowcut::{
    compute_separator_decomposition, derive_separator_from_cut, inertial_flow,
    make_graph_fragment, Fragment, ProgressLog, SeparatorDecomposition, INVALID_ID,
};

/// Random connected graph: a random spanning tree plus `extra` random
/// edges, with random planar coordinates. Returns symmetric arc lists.
fn random_graph(
    rng: &mut StdRng,
    node_count: u32,
    extra: usize,
) -> (Vec<u32>, Vec<u32>, Vec<f32>, Vec<f32>) {
    let mut tail = Vec::new();
    let mut head = Vec::new();
    let mut push_edge = |a: u32, b: u32| {
        tail.push(a);
        head.push(b);
        tail.push(b);
        head.push(a);
    };

    for x in 1..node_count {
        push_edge(x, rng.random_range(0..x));
    }
    for _ in 0..extra {
        let a = rng.random_range(0..node_count);
        let b = rng.random_range(0..node_count);
        if a != b {
            push_edge(a, b);
        }
    }

    let latitude = (0..node_count).map(|_| rng.random_range(-90.0..90.0)).collect();
    let longitude = (0..node_count)
        .map(|_| rng.random_range(-180.0..180.0))
        .collect();
    (tail, head, latitude, longitude)
}

fn inertial_decomposition(
    fragment: Fragment,
    latitude: &[f32],
    longitude: &[f32],
) -> SeparatorDecomposition {
    compute_separator_decomposition(
        fragment,
        |piece| {
            let cut = inertial_flow(piece, latitude, longitude, ProgressLog::none());
            derive_separator_from_cut(piece, &cut.is_node_on_side)
        },
        ProgressLog::none(),
    )
}

fn assert_is_permutation(order: &[u32], node_count: u32) {
    let mut seen = vec![false; node_count as usize];
    assert_eq!(order.len(), node_count as usize);
    for &x in order {
        assert!(!seen[x as usize], "node {x} appears twice in the order");
        seen[x as usize] = true;
    }
}

/// The tree ranges must partition `[0, node_count)` and every tree node's
/// separator must precede the separators of all its descendants.
fn assert_tree_ranges_are_nested(decomposition: &SeparatorDecomposition, node_count: u32) {
    let mut covered = vec![false; node_count as usize];
    for node in &decomposition.tree {
        assert!(node.first_separator_vertex <= node.last_separator_vertex);
        for position in node.first_separator_vertex..node.last_separator_vertex {
            assert!(!covered[position as usize], "order position {position} claimed twice");
            covered[position as usize] = true;
        }

        let mut child = node.left_child;
        while child != INVALID_ID {
            let child_node = decomposition.tree[child as usize];
            assert!(node.last_separator_vertex <= child_node.first_separator_vertex);
            child = child_node.right_sibling;
        }
    }
    assert!(covered.iter().all(|&c| c), "order positions left unclaimed");
}

/// The defining separator property: every edge must connect two nodes whose
/// tree nodes lie on one root-to-leaf path. An edge between disjoint
/// subtrees would mean some separator failed to disconnect its pieces.
fn assert_separators_disconnect(
    decomposition: &SeparatorDecomposition,
    tail: &[u32],
    head: &[u32],
    node_count: u32,
) {
    let mut parent = vec![INVALID_ID; decomposition.tree.len()];
    let mut depth = vec![0u32; decomposition.tree.len()];
    for (index, node) in decomposition.tree.iter().enumerate() {
        let mut child = node.left_child;
        while child != INVALID_ID {
            parent[child as usize] = index as u32;
            depth[child as usize] = depth[index] + 1;
            child = decomposition.tree[child as usize].right_sibling;
        }
    }

    let mut tree_node_of = vec![INVALID_ID; node_count as usize];
    for (index, node) in decomposition.tree.iter().enumerate() {
        for position in node.first_separator_vertex..node.last_separator_vertex {
            tree_node_of[decomposition.order[position as usize] as usize] = index as u32;
        }
    }

    for (&x, &y) in tail.iter().zip(head) {
        let mut a = tree_node_of[x as usize];
        let mut b = tree_node_of[y as usize];
        while depth[a as usize] > depth[b as usize] {
            a = parent[a as usize];
        }
        while depth[b as usize] > depth[a as usize] {
            b = parent[b as usize];
        }
        assert_eq!(
            a, b,
            "edge {x}-{y} connects disjoint subtrees of the separator tree"
        );
    }
}

#[test]
fn test_random_connected_graphs() {
    for (seed, node_count, extra) in [(1u64, 30u32, 20), (2, 75, 60), (3, 150, 100)] {
        let mut rng = StdRng::seed_from_u64(seed);
        let (tail, head, latitude, longitude) = random_graph(&mut rng, node_count, extra);
        let fragment = make_graph_fragment(node_count, &tail, &head).unwrap();

        let decomposition = inertial_decomposition(fragment, &latitude, &longitude);

        assert_is_permutation(&decomposition.order, node_count);
        assert_tree_ranges_are_nested(&decomposition, node_count);
        assert_separators_disconnect(&decomposition, &tail, &head, node_count);
    }
}

#[test]
fn test_disconnected_graph_produces_a_forest() {
    let mut rng = StdRng::seed_from_u64(7);
    let (mut tail, mut head, mut latitude, mut longitude) = random_graph(&mut rng, 40, 25);
    let (tail_b, head_b, latitude_b, longitude_b) = random_graph(&mut rng, 40, 25);
    tail.extend(tail_b.iter().map(|&x| x + 40));
    head.extend(head_b.iter().map(|&x| x + 40));
    latitude.extend(latitude_b);
    longitude.extend(longitude_b);

    let fragment = make_graph_fragment(80, &tail, &head).unwrap();
    let decomposition = inertial_decomposition(fragment, &latitude, &longitude);

    assert_is_permutation(&decomposition.order, 80);
    assert_tree_ranges_are_nested(&decomposition, 80);
    assert_separators_disconnect(&decomposition, &tail, &head, 80);

    // Two components, two roots chained through the first one's sibling link.
    assert_ne!(decomposition.tree[0].right_sibling, INVALID_ID);
}

#[test]
fn test_grid_order_starts_with_a_full_separator() {
    // 8x8 grid with coordinates matching the layout. Whatever direction
    // wins, the top separator must split the grid into pieces that no
    // longer touch, which the disconnection check verifies transitively.
    let width = 8u32;
    let mut tail = Vec::new();
    let mut head = Vec::new();
    let mut push_edge = |a: u32, b: u32| {
        tail.push(a);
        head.push(b);
        tail.push(b);
        head.push(a);
    };
    for row in 0..width {
        for col in 0..width {
            let id = row * width + col;
            if col + 1 < width {
                push_edge(id, id + 1);
            }
            if row + 1 < width {
                push_edge(id, id + width);
            }
        }
    }
    let node_count = width * width;
    let latitude: Vec<f32> = (0..node_count).map(|id| (id / width) as f32).collect();
    let longitude: Vec<f32> = (0..node_count).map(|id| (id % width) as f32).collect();

    let fragment = make_graph_fragment(node_count, &tail, &head).unwrap();
    let decomposition = inertial_decomposition(fragment, &latitude, &longitude);

    assert_is_permutation(&decomposition.order, node_count);
    assert_tree_ranges_are_nested(&decomposition, node_count);
    assert_separators_disconnect(&decomposition, &tail, &head, node_count);

    // A straight grid-line separator has at most `width` nodes.
    let root = decomposition.tree[0];
    let top_separator = root.last_separator_vertex - root.first_separator_vertex;
    assert!(top_separator <= width, "top separator has {top_separator} nodes");
}
