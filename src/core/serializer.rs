//! Block tree serialization
//!
//! This module walks a parsed block forest and produces the delimited markup
//! string, optionally invoking visitor hooks immediately before and after
//! each node. Hooks receive the block and its parent as mutable references,
//! and the adjacent sibling as a value copy; whatever they return is injected
//! into the output around the block, and whatever they mutate is visible to
//! the delimiter-wrapping step and to later sibling visits.
//!
//! The walk is synchronous and single-threaded. A hook that panics unwinds
//! the whole serialization; nothing is caught and no partial output escapes.

use serde_json::{Map, Value};

use crate::core::block::{Block, InnerEntry};
use crate::core::delimiter;

/// Default bound on tree depth during serialization.
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Visitor hook invoked around a block's serialization.
///
/// Arguments are the block under visit, its parent (`None` at the top level),
/// and the adjacent sibling (previous sibling for pre-visit, next sibling for
/// post-visit, `None` at either end). The returned string, if any, is
/// injected into the serialized output.
///
/// While a hook runs on a child block, the child's slot in the parent's
/// `inner_blocks` temporarily holds a default placeholder block; inspect the
/// child through the first argument, never through the parent. A hook that
/// shrinks the parent's `inner_blocks` below the slot being visited makes the
/// tree unrestorable and fails the walk with
/// [`SerializeError::MissingInnerBlock`].
pub type VisitFn<'a> =
    Box<dyn FnMut(&mut Block, Option<&mut Block>, Option<&Block>) -> Option<String> + 'a>;

/// Serialization errors
#[derive(Debug, thiserror::Error)]
pub enum SerializeError {
    /// `inner_content` holds more placeholders than `inner_blocks` has
    /// children. The tree contract is violated upstream; serialization stops
    /// without producing output.
    #[error(
        "block {block_name:?}: content placeholder #{placeholder_index} has no matching inner block ({available} available)"
    )]
    MissingInnerBlock {
        block_name: Option<String>,
        placeholder_index: usize,
        available: usize,
    },

    /// The tree is nested deeper than the configured limit.
    #[error("block tree exceeds the maximum serialization depth of {limit}")]
    DepthExceeded { limit: usize },
}

/// Recursive block serializer with optional pre/post visitor hooks.
///
/// Without hooks this is a plain structural serializer; with hooks it allows
/// markup injection and in-place tree mutation during the walk.
///
/// # Example
/// ```
/// use block_compat::{Block, TreeSerializer};
///
/// let mut blocks = vec![Block::new("core/paragraph").with_chunk("hi")];
/// let mut serializer = TreeSerializer::new()
///     .with_pre_visit(|block, _parent, _prev| {
///         block.block_name.as_ref().map(|name| format!("<!-- seen: {name} -->"))
///     });
/// let markup = serializer.serialize_forest(&mut blocks).unwrap();
/// assert!(markup.starts_with("<!-- seen: core/paragraph -->"));
/// ```
pub struct TreeSerializer<'a> {
    pre_visit: Option<VisitFn<'a>>,
    post_visit: Option<VisitFn<'a>>,
    max_depth: usize,
}

impl<'a> TreeSerializer<'a> {
    /// Create a serializer with no hooks and the default depth limit.
    pub fn new() -> Self {
        Self {
            pre_visit: None,
            post_visit: None,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Set the hook invoked before each block is serialized.
    pub fn with_pre_visit(
        mut self,
        hook: impl FnMut(&mut Block, Option<&mut Block>, Option<&Block>) -> Option<String> + 'a,
    ) -> Self {
        self.pre_visit = Some(Box::new(hook));
        self
    }

    /// Set the hook whose markup is appended after each block's subtree.
    pub fn with_post_visit(
        mut self,
        hook: impl FnMut(&mut Block, Option<&mut Block>, Option<&Block>) -> Option<String> + 'a,
    ) -> Self {
        self.post_visit = Some(Box::new(hook));
        self
    }

    /// Override the depth limit.
    pub fn with_max_depth(mut self, limit: usize) -> Self {
        self.max_depth = limit;
        self
    }

    /// Serialize an ordered sequence of sibling blocks into one markup
    /// string.
    ///
    /// For each block, the pre-visit hook runs first (parent `None`, previous
    /// sibling or `None`), then the post-visit hook is evaluated (next
    /// sibling or `None`), then the block's subtree is serialized, then the
    /// post-visit markup is appended. An empty slice yields an empty string.
    pub fn serialize_forest(&mut self, blocks: &mut [Block]) -> Result<String, SerializeError> {
        log::trace!("serializing forest of {} top-level blocks", blocks.len());

        let mut result = String::new();
        for index in 0..blocks.len() {
            // Siblings are handed to hooks as value copies; only the block
            // under visit (and its parent, at deeper levels) is mutable.
            let previous = index.checked_sub(1).map(|i| blocks[i].clone());
            let next = blocks.get(index + 1).cloned();
            let block = &mut blocks[index];

            result.push_str(&invoke(&mut self.pre_visit, block, None, previous.as_ref()));
            let post_markup = invoke(&mut self.post_visit, block, None, next.as_ref());
            result.push_str(&self.block_at_depth(block, 1)?);
            result.push_str(&post_markup);
        }
        Ok(result)
    }

    /// Serialize a single block and its subtree.
    ///
    /// Walks `inner_content` left to right: literal chunks are appended
    /// verbatim; each placeholder consumes the next entry of `inner_blocks`,
    /// running both hooks around the recursive serialization of that child
    /// with this block as the parent. After the walk, a non-object `attrs`
    /// is normalized to an empty object (the one locally-recovered condition)
    /// and the content is wrapped in comment delimiters.
    pub fn serialize_block(&mut self, block: &mut Block) -> Result<String, SerializeError> {
        self.block_at_depth(block, 1)
    }

    fn block_at_depth(
        &mut self,
        block: &mut Block,
        depth: usize,
    ) -> Result<String, SerializeError> {
        if depth > self.max_depth {
            return Err(SerializeError::DepthExceeded {
                limit: self.max_depth,
            });
        }

        let mut content = String::new();
        let mut child_index = 0;

        // Walk a snapshot of the entry list; hooks mutating the parent's
        // `inner_content` mid-walk cannot skew the iteration, matching the
        // upstream platform's iteration over a value copy.
        let entries = block.inner_content.clone();

        for entry in &entries {
            if let InnerEntry::Chunk(chunk) = entry {
                content.push_str(chunk);
                continue;
            }

            if child_index >= block.inner_blocks.len() {
                return Err(SerializeError::MissingInnerBlock {
                    block_name: block.block_name.clone(),
                    placeholder_index: child_index,
                    available: block.inner_blocks.len(),
                });
            }

            let previous = child_index
                .checked_sub(1)
                .map(|i| block.inner_blocks[i].clone());
            let next = block.inner_blocks.get(child_index + 1).cloned();

            // Lift the child out of the parent so hooks can hold both
            // mutably at once; the slot is restored after recursion.
            let mut child = std::mem::take(&mut block.inner_blocks[child_index]);

            content.push_str(&invoke(
                &mut self.pre_visit,
                &mut child,
                Some(&mut *block),
                previous.as_ref(),
            ));
            let post_markup = invoke(
                &mut self.post_visit,
                &mut child,
                Some(&mut *block),
                next.as_ref(),
            );

            let child_output = self.block_at_depth(&mut child, depth + 1);

            // A hook may have shrunk the child list; a slot that can no
            // longer be restored is the same structural violation as a
            // dangling placeholder.
            if child_index >= block.inner_blocks.len() {
                return Err(SerializeError::MissingInnerBlock {
                    block_name: block.block_name.clone(),
                    placeholder_index: child_index,
                    available: block.inner_blocks.len(),
                });
            }
            block.inner_blocks[child_index] = child;
            content.push_str(&child_output?);
            content.push_str(&post_markup);

            child_index += 1;
        }

        if !block.attrs.is_object() {
            block.attrs = Value::Object(Map::new());
        }

        Ok(delimiter::comment_delimited_content(
            block.block_name.as_deref(),
            &block.attrs,
            &content,
        ))
    }
}

impl Default for TreeSerializer<'_> {
    fn default() -> Self {
        Self::new()
    }
}

/// Run a hook if one is set. An unset hook and a hook returning `None` both
/// contribute nothing.
fn invoke(
    hook: &mut Option<VisitFn<'_>>,
    block: &mut Block,
    parent: Option<&mut Block>,
    neighbor: Option<&Block>,
) -> String {
    match hook {
        Some(hook) => hook(block, parent, neighbor).unwrap_or_default(),
        None => String::new(),
    }
}

/// Serialize a block forest without hooks.
pub fn serialize_block_tree(blocks: &mut [Block]) -> Result<String, SerializeError> {
    TreeSerializer::new().serialize_forest(blocks)
}

impl Block {
    /// Serialize this block and its subtree without hooks.
    pub fn serialize(&mut self) -> Result<String, SerializeError> {
        TreeSerializer::new().serialize_block(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_forest_is_empty_string() {
        assert_eq!(serialize_block_tree(&mut []).unwrap(), "");
    }

    #[test]
    fn test_leaf_block() {
        let mut block = Block::new("core/paragraph").with_chunk("hi");
        assert_eq!(
            block.serialize().unwrap(),
            "<!-- wp:core/paragraph -->hi<!-- /wp:core/paragraph -->"
        );
    }

    #[test]
    fn test_nested_child_has_no_extra_characters() {
        let mut parent =
            Block::new("core/quote").with_child(Block::new("core/bold").with_chunk("x"));
        assert_eq!(
            parent.serialize().unwrap(),
            "<!-- wp:core/quote --><!-- wp:core/bold -->x<!-- /wp:core/bold --><!-- /wp:core/quote -->"
        );
    }

    #[test]
    fn test_attrs_normalized_during_walk() {
        let mut block = Block::new("core/html")
            .with_attrs(json!("not-a-mapping"))
            .with_chunk("<hr/>");
        let out = block.serialize().unwrap();
        assert_eq!(out, "<!-- wp:core/html --><hr/><!-- /wp:core/html -->");
        // The normalization is an observable mutation of the tree.
        assert_eq!(block.attrs, json!({}));
    }

    #[test]
    fn test_placeholder_without_child_is_fatal() {
        let mut block = Block::new("core/group");
        block.inner_content.push(InnerEntry::Child);

        let err = block.serialize().unwrap_err();
        match err {
            SerializeError::MissingInnerBlock {
                placeholder_index,
                available,
                ..
            } => {
                assert_eq!(placeholder_index, 0);
                assert_eq!(available, 0);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_depth_limit() {
        let mut tree = Block::new("core/group");
        for _ in 0..5 {
            tree = Block::new("core/group").with_child(tree);
        }

        let err = TreeSerializer::new()
            .with_max_depth(3)
            .serialize_block(&mut tree)
            .unwrap_err();
        assert!(matches!(err, SerializeError::DepthExceeded { limit: 3 }));

        // The same tree fits under the default limit.
        assert!(tree.serialize().is_ok());
    }

    #[test]
    fn test_hooks_can_mutate_block_before_finalization() {
        let mut blocks = vec![Block::new("core/paragraph").with_chunk("hi")];
        let markup = TreeSerializer::new()
            .with_pre_visit(|block, _parent, _prev| {
                block.attrs = json!({ "injected": true });
                None
            })
            .serialize_forest(&mut blocks)
            .unwrap();

        assert_eq!(
            markup,
            "<!-- wp:core/paragraph {\"injected\":true} -->hi<!-- /wp:core/paragraph -->"
        );
    }

    #[test]
    fn test_hooks_can_mutate_parent() {
        let mut parent = Block::new("core/group")
            .with_child(Block::new("core/paragraph").with_chunk("a"));

        TreeSerializer::new()
            .with_pre_visit(|_block, parent, _prev| {
                if let Some(parent) = parent {
                    parent.attrs = json!({ "touched": true });
                }
                None
            })
            .serialize_block(&mut parent)
            .unwrap();

        assert_eq!(parent.attrs, json!({ "touched": true }));
    }
}
