//! Tag Service
//!
//! Public operation surface over the tag forest. Structural mutations are
//! serialized by a hierarchy-wide lock and each runs in a single SQLite
//! transaction, so validation, the parent write and level propagation commit
//! together or not at all. Reads never take the lock.

use std::collections::HashMap;
use std::sync::Arc;

use shared::models::{
    DEFAULT_TAG_COLOR, NoteFilter, Pagination, Tag, TagCreate, TagDetail, TagNode, TagNotes,
    TagStats, TagUpdate,
};
use shared::util::{now_millis, snowflake_id};
use sqlx::SqliteConnection;
use tokio::sync::Mutex;

use super::error::{TagError, TagResult};
use crate::db::DbService;
use crate::db::repository::tag::{NewTag, TagCounts};
use crate::db::repository::{RepoError, note, tag};
use crate::hierarchy::{HierarchyError, LevelFix, NoteCounts, TagArena, assemble_tree, name_order};
use crate::utils::validation::{name_key, validate_color, validate_search_term, validate_tag_name};

#[derive(Clone, Debug)]
pub struct TagService {
    db: DbService,
    hierarchy_lock: Arc<Mutex<()>>,
}

impl TagService {
    pub fn new(db: DbService) -> Self {
        Self {
            db,
            hierarchy_lock: Arc::new(Mutex::new(())),
        }
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Create a tag under an optional parent
    pub async fn create(&self, data: TagCreate) -> TagResult<TagDetail> {
        let _guard = self.hierarchy_lock.lock().await;
        let mut tx = self.db.pool.begin().await?;
        let mut arena = TagArena::load(&mut tx).await?;

        let created = insert_tag(&mut tx, &mut arena, data)
            .await
            .inspect_err(|e| log_rejection("create", e))?;
        tx.commit().await?;

        tracing::info!(id = created.id, name = %created.name, level = created.level, "Tag created");
        Ok(fresh_detail(&arena, created))
    }

    /// Create several tags in order; the first failure rolls back the batch
    ///
    /// Later entries may name earlier ones as their parent.
    pub async fn create_batch(&self, items: Vec<TagCreate>) -> TagResult<Vec<TagDetail>> {
        let _guard = self.hierarchy_lock.lock().await;
        let mut tx = self.db.pool.begin().await?;
        let mut arena = TagArena::load(&mut tx).await?;

        let mut created = Vec::with_capacity(items.len());
        for data in items {
            let tag = insert_tag(&mut tx, &mut arena, data)
                .await
                .inspect_err(|e| log_rejection("create_batch", e))?;
            created.push(tag);
        }
        tx.commit().await?;

        tracing::info!(count = created.len(), "Tag batch created");
        Ok(created
            .into_iter()
            .map(|tag| fresh_detail(&arena, tag))
            .collect())
    }

    /// Rename, recolor and/or move a tag
    ///
    /// The returned detail is read inside the same transaction, so it is
    /// exactly the state that was committed.
    pub async fn update(&self, id: i64, data: TagUpdate) -> TagResult<TagDetail> {
        let _guard = self.hierarchy_lock.lock().await;
        let mut tx = self.db.pool.begin().await?;
        update_tag(&mut tx, id, data)
            .await
            .inspect_err(|e| log_rejection("update", e))?;
        let detail = load_detail(&mut tx, id, false).await?;
        tx.commit().await?;
        Ok(detail)
    }

    /// Delete a leaf tag together with its note associations
    pub async fn delete(&self, id: i64) -> TagResult<Tag> {
        let _guard = self.hierarchy_lock.lock().await;
        let mut tx = self.db.pool.begin().await?;

        let existing = tag::find_by_id(&mut tx, id)
            .await?
            .ok_or(TagError::NotFound(id))?;

        let count = tag::count_children(&mut tx, id).await?;
        if count > 0 {
            let err = TagError::HasChildren { id, count };
            log_rejection("delete", &err);
            return Err(err);
        }

        let detached = tag::delete_associations(&mut tx, id).await?;
        tag::delete(&mut tx, id).await?;
        tx.commit().await?;

        tracing::info!(id, name = %existing.name, detached, "Tag deleted");
        Ok(existing)
    }

    /// Rewrite every cached level that disagrees with its parent chain
    pub async fn repair_levels(&self) -> TagResult<Vec<LevelFix>> {
        let _guard = self.hierarchy_lock.lock().await;
        let mut tx = self.db.pool.begin().await?;
        let mut arena = TagArena::load(&mut tx).await?;

        let fixes = arena.repair_levels();
        write_levels(&mut tx, &fixes).await?;
        tx.commit().await?;

        if fixes.is_empty() {
            tracing::debug!("Tag levels consistent");
        } else {
            tracing::warn!(repaired = fixes.len(), "Repaired inconsistent tag levels");
        }
        Ok(fixes)
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// One tag with parent, direct children, counters and optional path
    pub async fn get_by_id(&self, id: i64, include_path: bool) -> TagResult<TagDetail> {
        let mut conn = self.db.pool.acquire().await?;
        load_detail(&mut conn, id, include_path).await
    }

    /// Names from the root down to the tag
    pub async fn path(&self, id: i64) -> TagResult<Vec<String>> {
        let mut conn = self.db.pool.acquire().await?;
        let arena = TagArena::load(&mut conn).await?;
        Ok(arena.resolve_path(id)?)
    }

    /// Every tag ordered by level, then name
    pub async fn list_all(&self) -> TagResult<Vec<TagDetail>> {
        let mut conn = self.db.pool.acquire().await?;
        let (arena, counts) = load_view(&mut conn).await?;
        Ok(arena
            .sorted()
            .into_iter()
            .map(|tag| detail_of(&arena, &counts, tag))
            .collect())
    }

    /// Direct children of `parent_id`, or the roots when `None`
    pub async fn children(&self, parent_id: Option<i64>) -> TagResult<Vec<TagDetail>> {
        let mut conn = self.db.pool.acquire().await?;
        let (arena, counts) = load_view(&mut conn).await?;
        if let Some(id) = parent_id
            && !arena.contains(id)
        {
            return Err(TagError::NotFound(id));
        }
        Ok(tag::find_by_parent(&mut conn, parent_id)
            .await?
            .iter()
            .filter_map(|found| arena.get(found.id))
            .map(|tag| detail_of(&arena, &counts, tag))
            .collect())
    }

    /// Root tags with their full subtrees
    pub async fn list_roots(&self) -> TagResult<Vec<TagNode>> {
        let mut forest = self.tree().await?;
        forest.retain(|node| node.tag.is_root());
        Ok(forest)
    }

    /// The whole forest
    pub async fn tree(&self) -> TagResult<Vec<TagNode>> {
        let mut conn = self.db.pool.acquire().await?;
        let flat = tag::find_all(&mut conn).await?;
        let notes: NoteCounts = tag::counts(&mut conn)
            .await?
            .into_iter()
            .map(|c| (c.id, c.note_count))
            .collect();
        Ok(assemble_tree(&flat, &notes))
    }

    /// Case-insensitive substring search on names, ordered by name
    pub async fn search(&self, term: &str) -> TagResult<Vec<TagDetail>> {
        let term = validate_search_term(term)?;
        let mut conn = self.db.pool.acquire().await?;
        let (arena, counts) = load_view(&mut conn).await?;

        let matches: Vec<&Tag> = match term {
            Some(term) => tag::search(&mut conn, &name_key(&term))
                .await?
                .iter()
                .filter_map(|found| arena.get(found.id))
                .collect(),
            None => {
                let mut all = arena.sorted();
                all.sort_by(|a, b| name_order(a, b));
                all
            }
        };
        Ok(matches
            .into_iter()
            .map(|tag| detail_of(&arena, &counts, tag))
            .collect())
    }

    /// Total count plus the `top_n` most used tags
    pub async fn stats(&self, top_n: i64) -> TagResult<TagStats> {
        let mut conn = self.db.pool.acquire().await?;
        let total = tag::count(&mut conn).await?;
        let most_used = tag::most_used(&mut conn, top_n.max(0)).await?;
        Ok(TagStats { total, most_used })
    }

    /// One page of the notes attached to a tag
    pub async fn notes_for_tag(&self, id: i64, filter: &NoteFilter) -> TagResult<TagNotes> {
        let tag = self.get_by_id(id, false).await?;
        let (limit, offset) = (filter.limit(), filter.offset());

        let mut conn = self.db.pool.acquire().await?;
        let notes = note::find_by_tag(&mut conn, id, filter.status, limit, offset).await?;
        let total = note::count_by_tag(&mut conn, id, filter.status).await?;

        Ok(TagNotes {
            notes,
            pagination: Pagination::new(total, limit, offset),
            tag,
        })
    }

    /// Tags whose cached level is stale; nothing is written
    pub async fn check_consistency(&self) -> TagResult<Vec<LevelFix>> {
        let mut conn = self.db.pool.acquire().await?;
        let arena = TagArena::load(&mut conn).await?;
        Ok(arena.check_consistency())
    }

    pub async fn is_empty(&self) -> TagResult<bool> {
        let mut conn = self.db.pool.acquire().await?;
        Ok(tag::count(&mut conn).await? == 0)
    }
}

// ============================================================================
// Transaction bodies
// ============================================================================

async fn insert_tag(
    conn: &mut SqliteConnection,
    arena: &mut TagArena,
    data: TagCreate,
) -> TagResult<Tag> {
    let name = validate_tag_name(&data.name)?;
    let color = match data.color {
        Some(color) => {
            validate_color(&color)?;
            color
        }
        None => DEFAULT_TAG_COLOR.to_string(),
    };

    let key = name_key(&name);
    if tag::find_by_name_key(conn, &key).await?.is_some() {
        return Err(TagError::DuplicateName(name));
    }

    let level = arena.compute_level(data.parent_id).map_err(parent_error)?;
    let created = tag::insert(
        conn,
        NewTag {
            id: snowflake_id(),
            name: &name,
            name_key: &key,
            color: &color,
            parent_id: data.parent_id,
            level,
            now: now_millis(),
        },
    )
    .await
    .map_err(|e| duplicate_or(e, &name))?;

    arena.insert(created.clone());
    Ok(created)
}

async fn update_tag(conn: &mut SqliteConnection, id: i64, data: TagUpdate) -> TagResult<()> {
    let mut arena = TagArena::load(conn).await?;
    let current = arena.get(id).cloned().ok_or(TagError::NotFound(id))?;
    let now = now_millis();

    let name = match data.name.as_deref() {
        Some(raw) => {
            let name = validate_tag_name(raw)?;
            let key = name_key(&name);
            if let Some(other) = tag::find_by_name_key(conn, &key).await?
                && other.id != id
            {
                return Err(TagError::DuplicateName(name));
            }
            Some((name, key))
        }
        None => None,
    };
    if let Some(color) = data.color.as_deref() {
        validate_color(color)?;
    }

    if name.is_some() || data.color.is_some() {
        let pair = name.as_ref().map(|(n, k)| (n.as_str(), k.as_str()));
        tag::update_attrs(conn, id, pair, data.color.as_deref(), now)
            .await
            .map_err(|e| duplicate_or(e, pair.map_or(current.name.as_str(), |(n, _)| n)))?;
    }

    if let Some(new_parent) = data.parent_id {
        arena
            .validate_reparent(id, new_parent)
            .map_err(parent_error)?;
        let level = arena.compute_level(new_parent).map_err(parent_error)?;

        tag::set_parent(conn, id, new_parent, level, now).await?;
        arena.reparent(id, new_parent, level);
        let fixes = arena.propagate_levels(id)?;
        write_levels(conn, &fixes).await?;

        tracing::info!(
            id,
            name = %current.name,
            from = ?current.parent_id,
            to = ?new_parent,
            level,
            descendants = fixes.len(),
            "Tag moved"
        );
    } else {
        tracing::info!(id, name = %current.name, "Tag updated");
    }
    Ok(())
}

async fn write_levels(conn: &mut SqliteConnection, fixes: &[LevelFix]) -> TagResult<()> {
    for fix in fixes {
        tag::set_level(conn, fix.id, fix.expected).await?;
    }
    Ok(())
}

// ============================================================================
// Helpers
// ============================================================================

async fn load_detail(
    conn: &mut SqliteConnection,
    id: i64,
    include_path: bool,
) -> TagResult<TagDetail> {
    let arena = TagArena::load(conn).await?;
    let tag = arena.get(id).cloned().ok_or(TagError::NotFound(id))?;

    let note_count = tag::count_notes(conn, id).await?;
    let path = if include_path {
        Some(arena.resolve_path(id)?)
    } else {
        None
    };

    let mut detail = detail_of(&arena, &HashMap::new(), &tag);
    detail.note_count = note_count;
    detail.path = path;
    Ok(detail)
}

async fn load_view(
    conn: &mut SqliteConnection,
) -> TagResult<(TagArena, HashMap<i64, TagCounts>)> {
    let arena = TagArena::load(conn).await?;
    let counts = tag::counts(conn)
        .await?
        .into_iter()
        .map(|c| (c.id, c))
        .collect();
    Ok((arena, counts))
}

fn detail_of(arena: &TagArena, counts: &HashMap<i64, TagCounts>, tag: &Tag) -> TagDetail {
    let children: Vec<Tag> = arena.children(tag.id).into_iter().cloned().collect();
    TagDetail {
        tag: tag.clone(),
        parent: tag.parent_id.and_then(|p| arena.get(p)).cloned(),
        note_count: counts.get(&tag.id).map_or(0, |c| c.note_count),
        child_count: children.len() as i64,
        children,
        path: None,
    }
}

fn fresh_detail(arena: &TagArena, tag: Tag) -> TagDetail {
    TagDetail {
        parent: tag.parent_id.and_then(|p| arena.get(p)).cloned(),
        tag,
        children: Vec::new(),
        note_count: 0,
        child_count: 0,
        path: None,
    }
}

/// A missing id during parent resolution names the parent, not the tag
fn parent_error(err: HierarchyError) -> TagError {
    match err {
        HierarchyError::NotFound(parent_id) => TagError::ParentNotFound(parent_id),
        other => other.into(),
    }
}

/// The unique index can still fire if the pre-check raced a writer outside
/// this process
fn duplicate_or(err: RepoError, name: &str) -> TagError {
    match err {
        RepoError::Duplicate(_) => TagError::DuplicateName(name.to_string()),
        other => other.into(),
    }
}

fn log_rejection(op: &'static str, err: &TagError) {
    match err {
        TagError::Storage(_) => {}
        TagError::Cycle { .. } | TagError::SelfParent(_) | TagError::HasChildren { .. } => {
            tracing::warn!(op, error = %err, "Tag mutation rejected")
        }
        _ => tracing::debug!(op, error = %err, "Tag mutation rejected"),
    }
}
