use thiserror::Error;

use crate::engine::ItemKey;
use crate::flags::ControlFlags;

/// Everything that can go wrong when building or updating a layout tree.
///
/// These are caller bugs, not transient conditions: none are retried
/// internally, and a caller that sees one should fix its tree construction
/// rather than resume.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum LayoutError {
    /// The key is negative or past the end of the arena.
    #[error("item key {0:?} is out of range")]
    InvalidKey(ItemKey),

    /// The root was passed to an operation that requires a non-root item.
    #[error("the root item cannot be used here")]
    RootNotAllowed,

    /// The item is already linked into the tree.
    #[error("item {0:?} already has a parent")]
    AlreadyInserted(ItemKey),

    /// An operation was given the same key for two distinct roles.
    #[error("item {0:?} cannot be linked relative to itself")]
    EqualKeys(ItemKey),

    /// A flag setter was given bits outside its mask group.
    #[error("flags {flags:?} fall outside the allowed mask {mask:?}")]
    MaskViolation {
        flags: ControlFlags,
        mask: ControlFlags,
    },

    /// Row and column were requested at the same time.
    #[error("box-model flags {0:?} request both row and column")]
    IncompatibleFlags(ControlFlags),

    /// The arena's internal invariants no longer hold.
    #[error("invalid internal state: {0}")]
    InvalidState(&'static str),
}
