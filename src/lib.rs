//! Nested-dissection elimination orders for road networks.
//!
//! Produces the node order that a customizable contraction hierarchy is
//! built on. The pipeline: wrap the symmetric input graph in a
//! [`Fragment`], recursively split it with balanced vertex separators found
//! by inertial flow (a handful of geographic projection directions, each
//! resolved with a unit-capacity blocking-flow computation), and linearize
//! the resulting separator forest so that separators precede the pieces
//! they split.
//!
//! Most callers only need the composed entry point:
//!
//! ```no_run
//! use flowcut::{compute_nested_node_dissection_order_using_inertial_flow, ProgressLog};
//!
//! # let (node_count, tail, head) = (0u32, vec![], vec![]);
//! # let (latitude, longitude): (Vec<f32>, Vec<f32>) = (vec![], vec![]);
//! let order = compute_nested_node_dissection_order_using_inertial_flow(
//!     node_count,
//!     &tail,
//!     &head,
//!     &latitude,
//!     &longitude,
//!     ProgressLog::none(),
//! )?;
//! # Ok::<(), flowcut::GraphError>(())
//! ```
//!
//! The intermediate layers (fragments, the blocking-flow engine, inertial
//! cuts, the separator tree) are public for callers that want custom
//! separator strategies or the tree structure itself.

pub mod dissection;
pub mod error;
pub mod flow;
pub mod fragment;
pub mod inertial;
pub mod progress;

pub use dissection::{
    compute_nested_node_dissection_order,
    compute_nested_node_dissection_order_using_inertial_flow, compute_separator_decomposition,
    derive_separator_from_cut, SeparatorDecomposition, SeparatorTreeNode,
};
pub use error::GraphError;
pub use flow::{pick_smaller_side, BlockingFlow, CutSide};
pub use fragment::{
    decompose_graph_fragment_into_connected_components, make_graph_fragment, Fragment, INVALID_ID,
};
pub use inertial::{inertial_flow, inertial_flow_with_balance, DEFAULT_MIN_BALANCE};
pub use progress::ProgressLog;
