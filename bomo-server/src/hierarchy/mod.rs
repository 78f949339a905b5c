//! Tag hierarchy engine
//!
//! Pure forest logic over an in-memory snapshot of every tag: level
//! derivation, cycle checks, level propagation, path resolution and tree
//! assembly. Nothing here touches the database except [`TagArena::load`].

mod arena;
mod tree;

pub use arena::{LevelFix, TagArena};
pub use tree::{NoteCounts, assemble_tree};
pub(crate) use tree::name_order;

use thiserror::Error;

/// Structural violations detected by the engine
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HierarchyError {
    #[error("Tag {0} not found")]
    NotFound(i64),

    #[error("Tag {0} cannot be its own parent")]
    SelfParent(i64),

    #[error("Moving tag {tag_id} under {parent_id} would create a cycle")]
    Cycle { tag_id: i64, parent_id: i64 },
}
