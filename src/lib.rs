//! Block Compat - compatibility layer for block-based content
//!
//! This crate backports the block utilities that the host content platform
//! introduced natively in release 6.4: recursive block-tree serialization
//! with mutable pre/post visitor hooks, comment delimiter construction, and
//! grouping of hooked block types by anchor and relative position. A small
//! version gate answers whether a given host still needs the layer at all.

pub mod compat;
pub mod core;
mod tests;

// Re-export commonly used types
pub use self::core::block::{Block, InnerEntry};
pub use self::core::registry::{
    BlockHook, BlockType, BlockTypeRegistry, HookedBlockMap, RegistryError, RelativePosition,
};
pub use self::core::serializer::{
    serialize_block_tree, SerializeError, TreeSerializer, DEFAULT_MAX_DEPTH,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
