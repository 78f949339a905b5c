//! Tag Model
//!
//! Tags form a forest: every tag optionally points at a parent and caches its
//! depth in `level` (roots are level 0).

use serde::{Deserialize, Serialize};

use super::serde_helpers::deserialize_some;

/// Default tag color
pub const DEFAULT_TAG_COLOR: &str = "#3B82F6";

/// Maximum tag name length (in characters, after trimming)
pub const MAX_TAG_NAME_LEN: usize = 50;

/// Tag entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    pub id: i64,
    pub name: String,
    pub color: String,
    pub parent_id: Option<i64>,
    /// Number of ancestors; derived from `parent_id`, never client-supplied
    pub level: i32,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Tag {
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// Create tag payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagCreate {
    pub name: String,
    pub color: Option<String>,
    pub parent_id: Option<i64>,
}

impl TagCreate {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn under(mut self, parent_id: i64) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }
}

/// Update tag payload
///
/// `parent_id` distinguishes "absent" (`None`, keep the parent) from an
/// explicit `null` (`Some(None)`, move the tag to the root).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(
        default,
        deserialize_with = "deserialize_some",
        skip_serializing_if = "Option::is_none"
    )]
    pub parent_id: Option<Option<i64>>,
}

impl TagUpdate {
    pub fn rename(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    pub fn reparent(parent_id: Option<i64>) -> Self {
        Self {
            parent_id: Some(parent_id),
            ..Default::default()
        }
    }

    pub fn recolor(color: impl Into<String>) -> Self {
        Self {
            color: Some(color.into()),
            ..Default::default()
        }
    }
}

/// Tag with its direct relations and counters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagDetail {
    #[serde(flatten)]
    pub tag: Tag,
    pub parent: Option<Tag>,
    pub children: Vec<Tag>,
    pub note_count: i64,
    pub child_count: i64,
    /// Names from the root down to this tag (only when requested)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<Vec<String>>,
}

/// Node of the assembled tag forest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagNode {
    #[serde(flatten)]
    pub tag: Tag,
    pub note_count: i64,
    pub child_count: i64,
    pub children: Vec<TagNode>,
}

impl TagNode {
    /// Pre-order traversal of this node and its descendants
    pub fn flatten(&self) -> Vec<&Tag> {
        let mut out = Vec::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            out.push(&node.tag);
            stack.extend(node.children.iter().rev());
        }
        out
    }
}

/// Usage entry for the stats view
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct TagUsage {
    pub id: i64,
    pub name: String,
    pub color: String,
    pub usage_count: i64,
}

/// Tag usage statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagStats {
    pub total: i64,
    pub most_used: Vec<TagUsage>,
}

/// List view selector for `GET /api/tags`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TagView {
    #[default]
    All,
    Root,
    Tree,
}

/// Query string of `GET /api/tags`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagListQuery {
    #[serde(default)]
    pub view: TagView,
    pub search: Option<String>,
    /// Direct children of this tag only
    pub parent_id: Option<i64>,
    #[serde(default)]
    pub stats: bool,
}

/// Query string of `GET /api/tags/{id}`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TagDetailQuery {
    #[serde(default)]
    pub path: bool,
}
