//! Block data model
//!
//! This module defines the parsed block tree: a `Block` node carries a type
//! name, a JSON attribute object, and an ordered mix of literal markup chunks
//! and child blocks. Trees are produced upstream by a block parser; this crate
//! only walks and serializes them.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single entry in a block's `inner_content` sequence.
///
/// Entries are either pre-rendered markup emitted verbatim, or placeholder
/// slots. The i-th placeholder corresponds to `inner_blocks[i]`; the wire
/// format encodes a placeholder as JSON `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InnerEntry {
    /// Pre-rendered markup, appended to the output as-is.
    Chunk(String),
    /// Slot consumed by the next unconsumed entry of `inner_blocks`.
    Child,
}

impl InnerEntry {
    /// Whether this entry is a child placeholder.
    pub fn is_placeholder(&self) -> bool {
        matches!(self, InnerEntry::Child)
    }
}

impl From<String> for InnerEntry {
    fn from(chunk: String) -> Self {
        InnerEntry::Chunk(chunk)
    }
}

impl From<&str> for InnerEntry {
    fn from(chunk: &str) -> Self {
        InnerEntry::Chunk(chunk.to_string())
    }
}

/// A node in the parsed block tree.
///
/// Field names follow the platform's canonical JSON shape (`blockName`,
/// `attrs`, `innerContent`, `innerBlocks`), so parsed block JSON deserializes
/// directly into this type.
///
/// `attrs` is held as a raw [`serde_json::Value`] rather than a typed map:
/// upstream parsers occasionally hand over non-object values, and the
/// serializer normalizes those to an empty object during the walk rather than
/// rejecting the tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    /// Block type name, e.g. `"core/paragraph"`. `None` marks a freeform
    /// chunk that serializes without comment delimiters.
    #[serde(default)]
    pub block_name: Option<String>,
    /// Block attributes, normally a JSON object.
    #[serde(default = "empty_attrs")]
    pub attrs: Value,
    /// Ordered markup chunks and child placeholders, document order.
    #[serde(default)]
    pub inner_content: Vec<InnerEntry>,
    /// Child blocks, document order. Owned exclusively by this node.
    #[serde(default)]
    pub inner_blocks: Vec<Block>,
}

fn empty_attrs() -> Value {
    Value::Object(Map::new())
}

impl Default for Block {
    fn default() -> Self {
        Self {
            block_name: None,
            attrs: empty_attrs(),
            inner_content: Vec::new(),
            inner_blocks: Vec::new(),
        }
    }
}

impl Block {
    /// Create an empty named block.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            block_name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Create a freeform block: no type name, a single literal chunk.
    pub fn freeform(content: impl Into<String>) -> Self {
        Self {
            inner_content: vec![InnerEntry::Chunk(content.into())],
            ..Self::default()
        }
    }

    /// Set a single attribute. A non-object `attrs` value is replaced by an
    /// empty object first.
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        if !self.attrs.is_object() {
            self.attrs = empty_attrs();
        }
        if let Some(map) = self.attrs.as_object_mut() {
            map.insert(key.into(), value.into());
        }
        self
    }

    /// Replace the whole attribute value.
    pub fn with_attrs(mut self, attrs: Value) -> Self {
        self.attrs = attrs;
        self
    }

    /// Append a literal markup chunk to `inner_content`.
    pub fn with_chunk(mut self, chunk: impl Into<String>) -> Self {
        self.inner_content.push(InnerEntry::Chunk(chunk.into()));
        self
    }

    /// Append a child block, adding the matching placeholder to
    /// `inner_content` so the two sequences stay correlated.
    pub fn with_child(mut self, child: Block) -> Self {
        self.inner_content.push(InnerEntry::Child);
        self.inner_blocks.push(child);
        self
    }

    /// Whether this block is a freeform chunk (no type name).
    pub fn is_freeform(&self) -> bool {
        self.block_name.is_none()
    }

    /// Number of child placeholders in `inner_content`.
    ///
    /// For a well-formed tree this equals `inner_blocks.len()`; the
    /// serializer reports a mismatch as a fatal error.
    pub fn placeholder_count(&self) -> usize {
        self.inner_content
            .iter()
            .filter(|entry| entry.is_placeholder())
            .count()
    }

    /// Depth of this subtree: 1 for a leaf.
    pub fn depth(&self) -> usize {
        1 + self
            .inner_blocks
            .iter()
            .map(Block::depth)
            .max()
            .unwrap_or(0)
    }
}
