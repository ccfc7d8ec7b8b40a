//! Block type registry and hooked-block grouping
//!
//! This module provides a thread-safe registry of block type declarations.
//! Beyond the usual register/lookup surface, it answers the one question
//! the compatibility layer needs: which block types declare themselves
//! hooked to which anchor, at which relative position.
//!
//! The registry uses parking_lot's `RwLock` for concurrent reads and
//! exclusive writes, and remembers registration order so hook grouping is
//! deterministic.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// Position of a hooked block relative to its anchor block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelativePosition {
    /// Inserted immediately before the anchor block.
    Before,
    /// Inserted immediately after the anchor block.
    After,
    /// Inserted as the anchor block's first child.
    FirstChild,
    /// Inserted as the anchor block's last child.
    LastChild,
}

impl RelativePosition {
    /// Wire-format name for the position.
    pub fn as_str(&self) -> &'static str {
        match self {
            RelativePosition::Before => "before",
            RelativePosition::After => "after",
            RelativePosition::FirstChild => "first_child",
            RelativePosition::LastChild => "last_child",
        }
    }
}

impl std::fmt::Display for RelativePosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A hook declaration carried by a block type: "insert me at `position`
/// relative to every `anchor` block".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHook {
    /// Type name of the anchor block.
    pub anchor: String,
    /// Where to insert relative to the anchor.
    pub position: RelativePosition,
}

/// A registered block type declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockType {
    /// Unique block type name, e.g. `"core/post"`.
    pub name: String,
    /// Hook declarations, in declaration order.
    #[serde(default)]
    pub block_hooks: Vec<BlockHook>,
}

impl BlockType {
    /// Create a block type with no hook declarations.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            block_hooks: Vec::new(),
        }
    }

    /// Declare this type hooked to `anchor` at `position`.
    pub fn with_hook(mut self, anchor: impl Into<String>, position: RelativePosition) -> Self {
        self.block_hooks.push(BlockHook {
            anchor: anchor.into(),
            position,
        });
        self
    }
}

/// Hooked block types grouped by anchor block name, then relative position.
/// The inner vectors hold declaring type names in registration order.
pub type HookedBlockMap = HashMap<String, HashMap<RelativePosition, Vec<String>>>;

#[derive(Default)]
struct RegistryInner {
    types: HashMap<String, BlockType>,
    // Registration order, for deterministic hook grouping.
    order: Vec<String>,
}

/// Thread-safe registry of block types.
///
/// # Example
/// ```
/// use block_compat::{BlockType, BlockTypeRegistry, RelativePosition};
///
/// let registry = BlockTypeRegistry::new();
/// registry
///     .register(BlockType::new("acme/like-button").with_hook("core/post", RelativePosition::After))
///     .unwrap();
/// let hooked = registry.hooked_blocks();
/// assert_eq!(hooked["core/post"][&RelativePosition::After], vec!["acme/like-button"]);
/// ```
#[derive(Clone)]
pub struct BlockTypeRegistry {
    inner: Arc<RwLock<RegistryInner>>,
}

impl BlockTypeRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(RegistryInner::default())),
        }
    }

    /// Register a block type.
    ///
    /// # Returns
    /// * `Ok(())` if registration succeeds
    /// * `Err(RegistryError)` if the name is empty or already registered
    pub fn register(&self, block_type: BlockType) -> Result<(), RegistryError> {
        if block_type.name.is_empty() {
            return Err(RegistryError::InvalidBlockType(
                "block type name cannot be empty".into(),
            ));
        }

        let mut inner = self.inner.write();
        if inner.types.contains_key(&block_type.name) {
            return Err(RegistryError::DuplicateBlockType(block_type.name));
        }

        inner.order.push(block_type.name.clone());
        inner.types.insert(block_type.name.clone(), block_type);
        Ok(())
    }

    /// Unregister a block type by name.
    pub fn unregister(&self, name: &str) -> Result<BlockType, RegistryError> {
        let mut inner = self.inner.write();
        let removed = inner
            .types
            .remove(name)
            .ok_or_else(|| RegistryError::BlockTypeNotFound(name.to_string()))?;
        inner.order.retain(|n| n != name);
        Ok(removed)
    }

    /// Look up a block type by name.
    pub fn get(&self, name: &str) -> Result<BlockType, RegistryError> {
        let inner = self.inner.read();
        inner
            .types
            .get(name)
            .cloned()
            .ok_or_else(|| RegistryError::BlockTypeNotFound(name.to_string()))
    }

    /// All registered block types, in registration order.
    pub fn all(&self) -> Vec<BlockType> {
        let inner = self.inner.read();
        inner
            .order
            .iter()
            .filter_map(|name| inner.types.get(name).cloned())
            .collect()
    }

    /// Check whether a block type is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.inner.read().types.contains_key(name)
    }

    /// Number of registered block types.
    pub fn count(&self) -> usize {
        self.inner.read().types.len()
    }

    /// Remove all registered block types.
    pub fn clear(&self) {
        let mut inner = self.inner.write();
        inner.types.clear();
        inner.order.clear();
    }

    /// Group every registered hook declaration by anchor block name and
    /// relative position.
    ///
    /// Within each `anchor -> position` group, declaring type names appear
    /// in registration order. Types without hook declarations contribute
    /// nothing.
    pub fn hooked_blocks(&self) -> HookedBlockMap {
        let inner = self.inner.read();
        let mut hooked: HookedBlockMap = HashMap::new();

        for name in &inner.order {
            let Some(block_type) = inner.types.get(name) else {
                continue;
            };
            for hook in &block_type.block_hooks {
                hooked
                    .entry(hook.anchor.clone())
                    .or_default()
                    .entry(hook.position)
                    .or_default()
                    .push(block_type.name.clone());
            }
        }

        hooked
    }
}

impl Default for BlockTypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Registry error types
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// Block type with the given name was not found
    #[error("block type not found: {0}")]
    BlockTypeNotFound(String),

    /// Attempted to register a block type name twice
    #[error("duplicate block type: {0}")]
    DuplicateBlockType(String),

    /// Block type declaration failed validation
    #[error("invalid block type: {0}")]
    InvalidBlockType(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_get() {
        let registry = BlockTypeRegistry::new();
        registry.register(BlockType::new("core/post")).unwrap();

        assert_eq!(registry.count(), 1);
        assert!(registry.contains("core/post"));
        assert_eq!(registry.get("core/post").unwrap().name, "core/post");
    }

    #[test]
    fn test_duplicate_registration() {
        let registry = BlockTypeRegistry::new();
        registry.register(BlockType::new("core/post")).unwrap();

        let result = registry.register(BlockType::new("core/post"));
        assert!(matches!(
            result.unwrap_err(),
            RegistryError::DuplicateBlockType(_)
        ));
    }

    #[test]
    fn test_empty_name_rejected() {
        let registry = BlockTypeRegistry::new();
        let result = registry.register(BlockType::new(""));
        assert!(matches!(
            result.unwrap_err(),
            RegistryError::InvalidBlockType(_)
        ));
    }

    #[test]
    fn test_unregister() {
        let registry = BlockTypeRegistry::new();
        registry.register(BlockType::new("core/post")).unwrap();

        let removed = registry.unregister("core/post").unwrap();
        assert_eq!(removed.name, "core/post");
        assert_eq!(registry.count(), 0);

        assert!(matches!(
            registry.unregister("core/post").unwrap_err(),
            RegistryError::BlockTypeNotFound(_)
        ));
    }

    #[test]
    fn test_all_preserves_registration_order() {
        let registry = BlockTypeRegistry::new();
        for name in ["c/three", "a/one", "b/two"] {
            registry.register(BlockType::new(name)).unwrap();
        }

        let names: Vec<_> = registry.all().into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["c/three", "a/one", "b/two"]);
    }

    #[test]
    fn test_hooked_blocks_groups_by_anchor_and_position() {
        let registry = BlockTypeRegistry::new();
        registry
            .register(
                BlockType::new("acme/like-button")
                    .with_hook("core/post", RelativePosition::After),
            )
            .unwrap();
        registry
            .register(
                BlockType::new("acme/share-bar")
                    .with_hook("core/post", RelativePosition::After)
                    .with_hook("core/comment", RelativePosition::Before),
            )
            .unwrap();
        registry.register(BlockType::new("core/post")).unwrap();

        let hooked = registry.hooked_blocks();

        assert_eq!(
            hooked["core/post"][&RelativePosition::After],
            vec!["acme/like-button", "acme/share-bar"]
        );
        assert_eq!(
            hooked["core/comment"][&RelativePosition::Before],
            vec!["acme/share-bar"]
        );
        // Types without hooks never appear as keys.
        assert!(!hooked.contains_key("acme/like-button"));
    }

    #[test]
    fn test_hooked_blocks_empty_registry() {
        let registry = BlockTypeRegistry::new();
        assert!(registry.hooked_blocks().is_empty());
    }

    #[test]
    fn test_relative_position_wire_names() {
        assert_eq!(RelativePosition::FirstChild.to_string(), "first_child");
        assert_eq!(
            serde_json::to_string(&RelativePosition::LastChild).unwrap(),
            "\"last_child\""
        );
        let parsed: RelativePosition = serde_json::from_str("\"before\"").unwrap();
        assert_eq!(parsed, RelativePosition::Before);
    }

    #[test]
    fn test_thread_safety() {
        use std::thread;

        let registry = BlockTypeRegistry::new();
        let mut handles = vec![];

        for i in 0..10 {
            let registry = registry.clone();
            handles.push(thread::spawn(move || {
                registry
                    .register(
                        BlockType::new(format!("acme/block-{i}"))
                            .with_hook("core/post", RelativePosition::After),
                    )
                    .unwrap();
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(registry.count(), 10);
        assert_eq!(
            registry.hooked_blocks()["core/post"][&RelativePosition::After].len(),
            10
        );
    }
}
