//! Core block abstractions
//!
//! This module holds the block data model, the comment delimiter
//! construction, the recursive tree serializer, and the block type registry.

pub mod block;
pub mod delimiter;
pub mod registry;
pub mod serializer;

pub use self::block::{Block, InnerEntry};
