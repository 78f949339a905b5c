//! Tag Repository

use super::{RepoError, RepoResult};
use shared::models::{Tag, TagUsage};
use sqlx::SqliteConnection;

const COLUMNS: &str = "id, name, color, parent_id, level, created_at, updated_at";

/// Row to insert; `name_key` is the case-folded name backing the unique index
#[derive(Debug, Clone)]
pub struct NewTag<'a> {
    pub id: i64,
    pub name: &'a str,
    pub name_key: &'a str,
    pub color: &'a str,
    pub parent_id: Option<i64>,
    pub level: i32,
    pub now: i64,
}

/// Per-tag counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::FromRow)]
pub struct TagCounts {
    pub id: i64,
    pub note_count: i64,
    pub child_count: i64,
}

/// All tags ordered by level, then name
pub async fn find_all(conn: &mut SqliteConnection) -> RepoResult<Vec<Tag>> {
    let tags = sqlx::query_as::<_, Tag>(&format!(
        "SELECT {COLUMNS} FROM tag ORDER BY level, name_key, name"
    ))
    .fetch_all(&mut *conn)
    .await?;
    Ok(tags)
}

pub async fn find_by_id(conn: &mut SqliteConnection, id: i64) -> RepoResult<Option<Tag>> {
    let tag = sqlx::query_as::<_, Tag>(&format!("SELECT {COLUMNS} FROM tag WHERE id = ?"))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(tag)
}

/// Direct children of `parent_id` (roots when `None`), ordered by name
pub async fn find_by_parent(
    conn: &mut SqliteConnection,
    parent_id: Option<i64>,
) -> RepoResult<Vec<Tag>> {
    // `IS` compares NULL as a value
    let tags = sqlx::query_as::<_, Tag>(&format!(
        "SELECT {COLUMNS} FROM tag WHERE parent_id IS ? ORDER BY name_key, name"
    ))
    .bind(parent_id)
    .fetch_all(&mut *conn)
    .await?;
    Ok(tags)
}

pub async fn find_by_name_key(
    conn: &mut SqliteConnection,
    name_key: &str,
) -> RepoResult<Option<Tag>> {
    let tag = sqlx::query_as::<_, Tag>(&format!(
        "SELECT {COLUMNS} FROM tag WHERE name_key = ? LIMIT 1"
    ))
    .bind(name_key)
    .fetch_optional(&mut *conn)
    .await?;
    Ok(tag)
}

/// Tags whose folded name contains `term_key`, ordered by name
pub async fn search(conn: &mut SqliteConnection, term_key: &str) -> RepoResult<Vec<Tag>> {
    let tags = sqlx::query_as::<_, Tag>(&format!(
        "SELECT {COLUMNS} FROM tag WHERE instr(name_key, ?) > 0 ORDER BY name_key, name"
    ))
    .bind(term_key)
    .fetch_all(&mut *conn)
    .await?;
    Ok(tags)
}

pub async fn insert(conn: &mut SqliteConnection, row: NewTag<'_>) -> RepoResult<Tag> {
    sqlx::query(
        "INSERT INTO tag (id, name, name_key, color, parent_id, level, created_at, updated_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)",
    )
    .bind(row.id)
    .bind(row.name)
    .bind(row.name_key)
    .bind(row.color)
    .bind(row.parent_id)
    .bind(row.level)
    .bind(row.now)
    .execute(&mut *conn)
    .await?;

    find_by_id(conn, row.id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create tag".into()))
}

/// Rename and/or recolor; `None` keeps the stored value
pub async fn update_attrs(
    conn: &mut SqliteConnection,
    id: i64,
    name: Option<(&str, &str)>,
    color: Option<&str>,
    now: i64,
) -> RepoResult<()> {
    let (name, name_key) = name.unzip();
    let rows = sqlx::query(
        "UPDATE tag SET name = COALESCE(?1, name), name_key = COALESCE(?2, name_key), \
         color = COALESCE(?3, color), updated_at = ?4 WHERE id = ?5",
    )
    .bind(name)
    .bind(name_key)
    .bind(color)
    .bind(now)
    .bind(id)
    .execute(&mut *conn)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Tag {id} not found")));
    }
    Ok(())
}

/// Move a tag; `level` must already be derived from the new parent
pub async fn set_parent(
    conn: &mut SqliteConnection,
    id: i64,
    parent_id: Option<i64>,
    level: i32,
    now: i64,
) -> RepoResult<()> {
    let rows = sqlx::query("UPDATE tag SET parent_id = ?1, level = ?2, updated_at = ?3 WHERE id = ?4")
        .bind(parent_id)
        .bind(level)
        .bind(now)
        .bind(id)
        .execute(&mut *conn)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Tag {id} not found")));
    }
    Ok(())
}

/// Overwrite the cached level only
pub async fn set_level(conn: &mut SqliteConnection, id: i64, level: i32) -> RepoResult<()> {
    sqlx::query("UPDATE tag SET level = ? WHERE id = ?")
        .bind(level)
        .bind(id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

/// Remove every note association of a tag
pub async fn delete_associations(conn: &mut SqliteConnection, id: i64) -> RepoResult<u64> {
    let rows = sqlx::query("DELETE FROM note_tag WHERE tag_id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await?;
    Ok(rows.rows_affected())
}

/// Hard delete; `note_tag` rows go with it via `ON DELETE CASCADE`
pub async fn delete(conn: &mut SqliteConnection, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM tag WHERE id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await?;
    Ok(rows.rows_affected() > 0)
}

pub async fn count(conn: &mut SqliteConnection) -> RepoResult<i64> {
    let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM tag")
        .fetch_one(&mut *conn)
        .await?;
    Ok(total)
}

pub async fn count_children(conn: &mut SqliteConnection, id: i64) -> RepoResult<i64> {
    let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM tag WHERE parent_id = ?")
        .bind(id)
        .fetch_one(&mut *conn)
        .await?;
    Ok(total)
}

pub async fn count_notes(conn: &mut SqliteConnection, id: i64) -> RepoResult<i64> {
    let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM note_tag WHERE tag_id = ?")
        .bind(id)
        .fetch_one(&mut *conn)
        .await?;
    Ok(total)
}

/// Note and child counts for every tag in one pass
pub async fn counts(conn: &mut SqliteConnection) -> RepoResult<Vec<TagCounts>> {
    let rows = sqlx::query_as::<_, TagCounts>(
        "SELECT t.id, \
         (SELECT COUNT(*) FROM note_tag nt WHERE nt.tag_id = t.id) AS note_count, \
         (SELECT COUNT(*) FROM tag c WHERE c.parent_id = t.id) AS child_count \
         FROM tag t",
    )
    .fetch_all(&mut *conn)
    .await?;
    Ok(rows)
}

/// Tags ranked by number of attached notes (ties broken by name)
pub async fn most_used(conn: &mut SqliteConnection, limit: i64) -> RepoResult<Vec<TagUsage>> {
    let rows = sqlx::query_as::<_, TagUsage>(
        "SELECT t.id, t.name, t.color, COUNT(nt.note_id) AS usage_count \
         FROM tag t LEFT JOIN note_tag nt ON nt.tag_id = t.id \
         GROUP BY t.id, t.name, t.color, t.name_key \
         ORDER BY usage_count DESC, t.name_key, t.name \
         LIMIT ?",
    )
    .bind(limit)
    .fetch_all(&mut *conn)
    .await?;
    Ok(rows)
}
