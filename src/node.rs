//! Content nodes, the unit of sourced data in a Siteloom build.
//!
//! Every piece of content a source plugin pulls into the build (a markdown
//! file, a CMS entry, an image) becomes a [`ContentNode`]: a free-form data
//! record with a stable id, optional parent/child links, and an
//! [`NodeInternal`] envelope that carries ownership and content-identity
//! metadata the engine relies on for change detection.
//!
//! Nodes are constructed through [`ContentNode::builder`], which computes
//! the content digest from the node's data when the caller does not supply
//! one.
//!
//! # Examples
//!
//! ```rust
//! use siteloom_store::node::ContentNode;
//! use serde_json::json;
//!
//! let node = ContentNode::builder("post-1", "MarkdownPost")
//!     .with_owner("source-filesystem")
//!     .with_content("# Hello")
//!     .with_media_type("text/markdown")
//!     .with_field("slug", json!("/hello/"))
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(node.type_name(), "MarkdownPost");
//! assert!(!node.internal.content_digest.is_empty());
//! ```

use std::collections::BTreeMap;

use miette::Diagnostic;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::digest::{DigestError, content_digest_of};
use crate::types::{ContentDigest, NodeId};

// ============================================================================
// Node Data
// ============================================================================

/// A single sourced content record.
///
/// The typed fields cover the linkage and bookkeeping surface; everything a
/// plugin attaches beyond that lives in the flattened `fields` map, so the
/// serialized form keeps plugin data at the top level of the node object.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentNode {
    /// Stable id chosen by the sourcing plugin.
    pub id: NodeId,
    /// Parent node, when this node was derived from another.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<NodeId>,
    /// Ids of nodes derived from this one.
    #[serde(default)]
    pub children: Vec<NodeId>,
    /// Engine bookkeeping envelope.
    pub internal: NodeInternal,
    /// Materialized resolver output, populated by the data layer when the
    /// node's custom fields have been resolved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved: Option<Value>,
    /// Plugin-attached data, flattened into the node object.
    #[serde(flatten)]
    pub fields: FxHashMap<String, Value>,
}

/// Bookkeeping metadata the engine maintains per node.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeInternal {
    /// Data-layer type this node belongs to.
    #[serde(rename = "type")]
    pub type_name: String,
    /// Global insertion counter, assigned when the node enters the store.
    /// Gives nodes a stable creation order independent of id ordering.
    #[serde(default)]
    pub counter: u64,
    /// Name of the plugin that created the node.
    pub owner: String,
    /// Digest of the node's content, used for change detection.
    pub content_digest: ContentDigest,
    /// Media type of `content`, when the node carries raw content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
    /// Raw content body, when small enough to keep inline.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Human-readable description used in error messages.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ContentNode {
    /// Starts building a node with the two fields every node must have.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use siteloom_store::node::ContentNode;
    ///
    /// let node = ContentNode::builder("author-7", "Author").build().unwrap();
    /// assert_eq!(node.id, "author-7");
    /// ```
    pub fn builder(id: impl Into<NodeId>, type_name: impl Into<String>) -> ContentNodeBuilder {
        ContentNodeBuilder {
            id: id.into(),
            type_name: type_name.into(),
            parent: None,
            children: Vec::new(),
            owner: String::new(),
            content_digest: None,
            media_type: None,
            content: None,
            description: None,
            fields: FxHashMap::default(),
        }
    }

    /// Data-layer type of this node.
    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.internal.type_name
    }

    /// Name of the plugin that owns this node.
    #[must_use]
    pub fn owner(&self) -> &str {
        &self.internal.owner
    }

    /// Returns `true` if this node was derived from another node.
    #[must_use]
    pub fn has_parent(&self) -> bool {
        self.parent.is_some()
    }

    /// Looks up a plugin-attached field by name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Fluent builder for [`ContentNode`].
///
/// Created via [`ContentNode::builder`]. The final [`build`](Self::build)
/// validates linkage and fills in the content digest when one was not set
/// explicitly.
#[derive(Debug)]
pub struct ContentNodeBuilder {
    id: NodeId,
    type_name: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    owner: String,
    content_digest: Option<ContentDigest>,
    media_type: Option<String>,
    content: Option<String>,
    description: Option<String>,
    fields: FxHashMap<String, Value>,
}

impl ContentNodeBuilder {
    /// Sets the parent this node was derived from.
    #[must_use]
    pub fn with_parent(mut self, parent: impl Into<NodeId>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// Adds a derived child node id.
    #[must_use]
    pub fn with_child(mut self, child: impl Into<NodeId>) -> Self {
        self.children.push(child.into());
        self
    }

    /// Sets the owning plugin name.
    #[must_use]
    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = owner.into();
        self
    }

    /// Sets an explicit content digest, skipping digest computation.
    #[must_use]
    pub fn with_content_digest(mut self, digest: impl Into<ContentDigest>) -> Self {
        self.content_digest = Some(digest.into());
        self
    }

    /// Sets the inline raw content body.
    #[must_use]
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    /// Sets the media type of the raw content.
    #[must_use]
    pub fn with_media_type(mut self, media_type: impl Into<String>) -> Self {
        self.media_type = Some(media_type.into());
        self
    }

    /// Sets the human-readable description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Attaches a plugin data field.
    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, value: Value) -> Self {
        self.fields.insert(name.into(), value);
        self
    }

    /// Finalizes the node.
    ///
    /// When no digest was supplied, one is computed over the node's type,
    /// inline content, and plugin fields (fields hash in sorted key order so
    /// the digest is insertion-order independent).
    pub fn build(self) -> Result<ContentNode, NodeError> {
        if self.id.is_empty() {
            return Err(NodeError::EmptyId);
        }
        if self.parent.as_deref() == Some(self.id.as_str()) {
            return Err(NodeError::SelfParent { id: self.id });
        }

        let content_digest = match self.content_digest {
            Some(digest) if digest.is_empty() => {
                return Err(NodeError::EmptyDigest { id: self.id });
            }
            Some(digest) => digest,
            None => {
                let sorted_fields: BTreeMap<&String, &Value> = self.fields.iter().collect();
                content_digest_of(&(&self.type_name, &self.content, sorted_fields))?
            }
        };

        Ok(ContentNode {
            id: self.id,
            parent: self.parent,
            children: self.children,
            internal: NodeInternal {
                type_name: self.type_name,
                counter: 0,
                owner: self.owner,
                content_digest,
                media_type: self.media_type,
                content: self.content,
                description: self.description,
            },
            resolved: None,
            fields: self.fields,
        })
    }
}

// ============================================================================
// Error Types
// ============================================================================

/// Errors raised while constructing a node.
#[derive(Debug, Error, Diagnostic)]
pub enum NodeError {
    /// The node id was empty.
    #[error("node id must not be empty")]
    #[diagnostic(
        code(siteloom::node::empty_id),
        help("Source plugins must assign every node a stable, non-empty id.")
    )]
    EmptyId,

    /// The node listed itself as its own parent.
    #[error("node {id} cannot be its own parent")]
    #[diagnostic(code(siteloom::node::self_parent))]
    SelfParent { id: NodeId },

    /// An explicit content digest was empty.
    #[error("node {id} has an empty content digest")]
    #[diagnostic(
        code(siteloom::node::empty_digest),
        help("Pass a real digest to with_content_digest, or omit it to have one computed.")
    )]
    EmptyDigest { id: NodeId },

    /// The content digest could not be computed.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Digest(#[from] DigestError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_digest_ignores_field_insertion_order() {
        let a = ContentNode::builder("n1", "Post")
            .with_field("title", json!("One"))
            .with_field("slug", json!("/one/"))
            .build()
            .unwrap();
        let b = ContentNode::builder("n1", "Post")
            .with_field("slug", json!("/one/"))
            .with_field("title", json!("One"))
            .build()
            .unwrap();
        assert_eq!(a.internal.content_digest, b.internal.content_digest);
    }

    #[test]
    fn test_explicit_digest_wins() {
        let node = ContentNode::builder("n1", "Post")
            .with_content_digest("abc123")
            .build()
            .unwrap();
        assert_eq!(node.internal.content_digest, "abc123");
    }

    #[test]
    fn test_empty_explicit_digest_rejected() {
        let err = ContentNode::builder("n1", "Post")
            .with_content_digest("")
            .build()
            .unwrap_err();
        assert!(matches!(err, NodeError::EmptyDigest { .. }));
    }

    #[test]
    fn test_self_parent_rejected() {
        let err = ContentNode::builder("n1", "Post")
            .with_parent("n1")
            .build()
            .unwrap_err();
        assert!(matches!(err, NodeError::SelfParent { .. }));
    }
}
