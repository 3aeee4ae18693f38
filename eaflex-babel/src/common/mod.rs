//! The mapping core between the tier graph and the interlinear tree.
//!
//! Leaves first: [`time_order`] and [`tokenizer`] are pure helpers,
//! [`tier_schema`] describes the generated tier hierarchy, [`ids`] hands out
//! annotation ids and checks every emitted annotation. The two directions
//! live in [`tree_to_tiers`] and [`tiers_to_tree`].

pub mod ids;
pub mod tier_schema;
pub mod tiers_to_tree;
pub mod time_order;
pub mod tokenizer;
pub mod tree_to_tiers;

pub use tiers_to_tree::{tiers_to_tree, tiers_to_tree_with_segments};
pub use tree_to_tiers::{tree_to_tiers, tree_to_tiers_with_segments};
