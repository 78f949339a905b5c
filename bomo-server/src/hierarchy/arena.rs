//! In-memory tag forest
//!
//! Built from one bulk fetch; structural checks walk parent links in memory
//! instead of issuing a query per ancestor.

use std::collections::{HashMap, HashSet, VecDeque};

use serde::Serialize;
use shared::models::Tag;
use sqlx::SqliteConnection;

use super::HierarchyError;
use super::tree::name_order;
use crate::db::repository::{RepoResult, tag};

/// A cached level that differs from the one implied by the parent chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelFix {
    pub id: i64,
    pub stored: i32,
    pub expected: i32,
}

/// Snapshot of the tag forest keyed by id
#[derive(Debug, Clone, Default)]
pub struct TagArena {
    tags: HashMap<i64, Tag>,
    children: HashMap<i64, Vec<i64>>,
}

impl TagArena {
    pub fn from_tags(tags: impl IntoIterator<Item = Tag>) -> Self {
        let mut arena = Self::default();
        for tag in tags {
            arena.insert(tag);
        }
        arena
    }

    /// Snapshot every tag reachable through `conn`
    pub async fn load(conn: &mut SqliteConnection) -> RepoResult<Self> {
        Ok(Self::from_tags(tag::find_all(conn).await?))
    }

    /// Add a freshly inserted tag
    pub fn insert(&mut self, tag: Tag) {
        if let Some(parent_id) = tag.parent_id {
            self.children.entry(parent_id).or_default().push(tag.id);
        }
        self.tags.insert(tag.id, tag);
    }

    pub fn get(&self, id: i64) -> Option<&Tag> {
        self.tags.get(&id)
    }

    pub fn contains(&self, id: i64) -> bool {
        self.tags.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Tags ordered by level, then name
    pub fn sorted(&self) -> Vec<&Tag> {
        let mut tags: Vec<&Tag> = self.tags.values().collect();
        tags.sort_by(|a, b| a.level.cmp(&b.level).then_with(|| name_order(a, b)));
        tags
    }

    /// Direct children ordered by name
    pub fn children(&self, id: i64) -> Vec<&Tag> {
        let mut kids: Vec<&Tag> = self
            .children
            .get(&id)
            .into_iter()
            .flatten()
            .filter_map(|child| self.tags.get(child))
            .collect();
        kids.sort_by(|a, b| name_order(a, b));
        kids
    }

    /// Level a tag gets under `parent_id`
    pub fn compute_level(&self, parent_id: Option<i64>) -> Result<i32, HierarchyError> {
        match parent_id {
            None => Ok(0),
            Some(parent_id) => self
                .tags
                .get(&parent_id)
                .map(|parent| parent.level + 1)
                .ok_or(HierarchyError::NotFound(parent_id)),
        }
    }

    /// Reject moves that would make `tag_id` its own ancestor
    pub fn validate_reparent(
        &self,
        tag_id: i64,
        new_parent: Option<i64>,
    ) -> Result<(), HierarchyError> {
        let Some(parent_id) = new_parent else {
            return Ok(());
        };
        if parent_id == tag_id {
            return Err(HierarchyError::SelfParent(tag_id));
        }
        if !self.contains(parent_id) {
            return Err(HierarchyError::NotFound(parent_id));
        }

        let cycle = HierarchyError::Cycle { tag_id, parent_id };
        let mut seen = HashSet::new();
        let mut cursor = Some(parent_id);
        while let Some(current) = cursor {
            if current == tag_id || !seen.insert(current) {
                return Err(cycle);
            }
            cursor = self.tags.get(&current).and_then(|t| t.parent_id);
        }
        Ok(())
    }

    /// Apply a validated move to the snapshot
    pub fn reparent(&mut self, tag_id: i64, new_parent: Option<i64>, level: i32) {
        let Some(tag) = self.tags.get_mut(&tag_id) else {
            return;
        };
        let old_parent = std::mem::replace(&mut tag.parent_id, new_parent);
        tag.level = level;

        if let Some(old) = old_parent
            && let Some(siblings) = self.children.get_mut(&old)
        {
            siblings.retain(|id| *id != tag_id);
        }
        if let Some(new) = new_parent {
            self.children.entry(new).or_default().push(tag_id);
        }
    }

    /// Rewrite descendant levels of `root_id` from its current level
    ///
    /// Returns the corrections applied to the snapshot; a second call
    /// returns nothing.
    pub fn propagate_levels(&mut self, root_id: i64) -> Result<Vec<LevelFix>, HierarchyError> {
        if !self.contains(root_id) {
            return Err(HierarchyError::NotFound(root_id));
        }

        let mut fixes = Vec::new();
        let mut seen = HashSet::from([root_id]);
        let mut queue = VecDeque::from([root_id]);
        while let Some(parent_id) = queue.pop_front() {
            let Some(parent_level) = self.tags.get(&parent_id).map(|t| t.level) else {
                continue;
            };
            let kids = self.children.get(&parent_id).cloned().unwrap_or_default();
            for child_id in kids {
                if !seen.insert(child_id) {
                    continue;
                }
                if let Some(child) = self.tags.get_mut(&child_id) {
                    let expected = parent_level + 1;
                    if child.level != expected {
                        fixes.push(LevelFix {
                            id: child_id,
                            stored: child.level,
                            expected,
                        });
                        child.level = expected;
                    }
                    queue.push_back(child_id);
                }
            }
        }
        Ok(fixes)
    }

    /// Root-to-tag names
    pub fn resolve_path(&self, id: i64) -> Result<Vec<String>, HierarchyError> {
        let mut names = Vec::new();
        let mut seen = HashSet::new();
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            if !seen.insert(current) {
                return Err(HierarchyError::Cycle {
                    tag_id: id,
                    parent_id: current,
                });
            }
            let tag = self
                .tags
                .get(&current)
                .ok_or(HierarchyError::NotFound(current))?;
            names.push(tag.name.clone());
            cursor = tag.parent_id;
        }
        names.reverse();
        Ok(names)
    }

    /// Every tag whose cached level disagrees with its depth
    ///
    /// Depth is counted from true roots and from orphans whose parent is
    /// missing. Tags trapped in a parent loop have no depth and are skipped.
    pub fn check_consistency(&self) -> Vec<LevelFix> {
        let mut fixes: Vec<LevelFix> = self
            .depths()
            .into_iter()
            .filter_map(|(id, expected)| {
                let stored = self.tags.get(&id)?.level;
                (stored != expected).then_some(LevelFix {
                    id,
                    stored,
                    expected,
                })
            })
            .collect();
        fixes.sort_by_key(|fix| (fix.expected, fix.id));
        fixes
    }

    /// Overwrite every inconsistent level in the snapshot
    pub fn repair_levels(&mut self) -> Vec<LevelFix> {
        let fixes = self.check_consistency();
        for fix in &fixes {
            if let Some(tag) = self.tags.get_mut(&fix.id) {
                tag.level = fix.expected;
            }
        }
        fixes
    }

    fn depths(&self) -> HashMap<i64, i32> {
        let mut depths = HashMap::with_capacity(self.tags.len());
        let mut queue: VecDeque<i64> = self
            .tags
            .values()
            .filter(|t| t.parent_id.is_none_or(|p| !self.contains(p)))
            .map(|t| t.id)
            .collect();
        for id in &queue {
            depths.insert(*id, 0);
        }

        while let Some(parent_id) = queue.pop_front() {
            let depth = depths.get(&parent_id).copied().unwrap_or_default() + 1;
            for child_id in self.children.get(&parent_id).into_iter().flatten() {
                if self.contains(*child_id) && !depths.contains_key(child_id) {
                    depths.insert(*child_id, depth);
                    queue.push_back(*child_id);
                }
            }
        }
        depths
    }
}
