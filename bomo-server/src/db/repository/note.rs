//! Note Repository
//!
//! Notes are managed outside the tag API; only the pieces the tag endpoints
//! and their fixtures need live here.

use super::{RepoError, RepoResult};
use shared::models::{Note, NoteCreate, NoteStatus, TagBadge};
use shared::util::{now_millis, snowflake_id};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection};
use std::collections::HashMap;

const COLUMNS: &str =
    "n.id, n.title, n.content, n.note_type, n.status, n.is_pinned, n.is_favorite, n.created_at, n.updated_at";

#[derive(sqlx::FromRow)]
struct BadgeRow {
    note_id: i64,
    #[sqlx(flatten)]
    badge: TagBadge,
}

pub async fn find_by_id(conn: &mut SqliteConnection, id: i64) -> RepoResult<Option<Note>> {
    let note = sqlx::query_as::<_, Note>(&format!("SELECT {COLUMNS} FROM note n WHERE n.id = ?"))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    match note {
        Some(note) => Ok(attach_tags(conn, vec![note]).await?.pop()),
        None => Ok(None),
    }
}

/// Insert a note and its tag associations
pub async fn create(conn: &mut SqliteConnection, data: NoteCreate) -> RepoResult<Note> {
    let id = snowflake_id();
    let now = now_millis();
    sqlx::query(
        "INSERT INTO note (id, title, content, note_type, status, is_pinned, is_favorite, created_at, updated_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)",
    )
    .bind(id)
    .bind(&data.title)
    .bind(&data.content)
    .bind(data.note_type.unwrap_or_default())
    .bind(data.status.unwrap_or_default())
    .bind(data.is_pinned)
    .bind(data.is_favorite)
    .bind(now)
    .execute(&mut *conn)
    .await?;

    for tag_id in &data.tag_ids {
        sqlx::query("INSERT OR IGNORE INTO note_tag (note_id, tag_id) VALUES (?, ?)")
            .bind(id)
            .bind(tag_id)
            .execute(&mut *conn)
            .await?;
    }

    find_by_id(conn, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create note".into()))
}

/// Delete a note; its associations cascade, the tags stay
pub async fn delete(conn: &mut SqliteConnection, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM note WHERE id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await?;
    Ok(rows.rows_affected() > 0)
}

/// One page of notes attached to `tag_id`, most recently updated first
pub async fn find_by_tag(
    conn: &mut SqliteConnection,
    tag_id: i64,
    status: Option<NoteStatus>,
    limit: i64,
    offset: i64,
) -> RepoResult<Vec<Note>> {
    let notes = sqlx::query_as::<_, Note>(&format!(
        "SELECT {COLUMNS} FROM note n JOIN note_tag nt ON nt.note_id = n.id \
         WHERE nt.tag_id = ?1 AND (?2 IS NULL OR n.status = ?2) \
         ORDER BY n.updated_at DESC, n.id DESC LIMIT ?3 OFFSET ?4"
    ))
    .bind(tag_id)
    .bind(status)
    .bind(limit)
    .bind(offset)
    .fetch_all(&mut *conn)
    .await?;
    attach_tags(conn, notes).await
}

pub async fn count_by_tag(
    conn: &mut SqliteConnection,
    tag_id: i64,
    status: Option<NoteStatus>,
) -> RepoResult<i64> {
    let total = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM note n JOIN note_tag nt ON nt.note_id = n.id \
         WHERE nt.tag_id = ?1 AND (?2 IS NULL OR n.status = ?2)",
    )
    .bind(tag_id)
    .bind(status)
    .fetch_one(&mut *conn)
    .await?;
    Ok(total)
}

/// Load tag badges for a page of notes in a single query
async fn attach_tags(conn: &mut SqliteConnection, mut notes: Vec<Note>) -> RepoResult<Vec<Note>> {
    if notes.is_empty() {
        return Ok(notes);
    }

    let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(
        "SELECT nt.note_id, t.id, t.name, t.color FROM note_tag nt \
         JOIN tag t ON t.id = nt.tag_id WHERE nt.note_id IN (",
    );
    let mut ids = qb.separated(", ");
    for note in &notes {
        ids.push_bind(note.id);
    }
    qb.push(") ORDER BY t.level, t.name_key");

    let rows: Vec<BadgeRow> = qb.build_query_as().fetch_all(&mut *conn).await?;
    let mut by_note: HashMap<i64, Vec<TagBadge>> = HashMap::new();
    for row in rows {
        by_note.entry(row.note_id).or_default().push(row.badge);
    }
    for note in &mut notes {
        note.tags = by_note.remove(&note.id).unwrap_or_default();
    }
    Ok(notes)
}
