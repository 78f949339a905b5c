//! Note Model
//!
//! Notes own their own lifecycle; the tag API only reads them through the
//! `note_tag` association.

use serde::{Deserialize, Serialize};

use super::serde_helpers::bool_false;
use super::tag::TagDetail;

/// Default page size for note listings
pub const DEFAULT_NOTE_LIMIT: i64 = 20;

/// Upper bound for a single page of notes
pub const MAX_NOTE_LIMIT: i64 = 100;

/// Note kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum NoteType {
    #[default]
    General,
    Reading,
    Insight,
    Todo,
}

/// Publication status of a note
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum NoteStatus {
    #[default]
    Draft,
    Published,
    Archived,
}

impl NoteStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "DRAFT",
            Self::Published => "PUBLISHED",
            Self::Archived => "ARCHIVED",
        }
    }
}

/// Minimal tag info carried by a note
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct TagBadge {
    pub id: i64,
    pub name: String,
    pub color: String,
}

/// Note entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: i64,
    pub title: String,
    pub content: String,
    #[serde(rename = "type")]
    pub note_type: NoteType,
    pub status: NoteStatus,
    pub is_pinned: bool,
    pub is_favorite: bool,
    pub created_at: i64,
    pub updated_at: i64,

    // -- Relations (populated by application code, skipped by FromRow) --
    #[cfg_attr(feature = "db", sqlx(skip))]
    #[serde(default)]
    pub tags: Vec<TagBadge>,
}

/// Create note payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteCreate {
    pub title: String,
    pub content: String,
    #[serde(rename = "type")]
    pub note_type: Option<NoteType>,
    pub status: Option<NoteStatus>,
    #[serde(default, deserialize_with = "bool_false")]
    pub is_pinned: bool,
    #[serde(default, deserialize_with = "bool_false")]
    pub is_favorite: bool,
    #[serde(default)]
    pub tag_ids: Vec<i64>,
}

/// Filter for listing the notes attached to a tag
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NoteFilter {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    pub status: Option<NoteStatus>,
}

impl NoteFilter {
    /// Page size clamped to `1..=MAX_NOTE_LIMIT`
    pub fn limit(&self) -> i64 {
        self.limit
            .unwrap_or(DEFAULT_NOTE_LIMIT)
            .clamp(1, MAX_NOTE_LIMIT)
    }

    /// Offset, never negative
    pub fn offset(&self) -> i64 {
        self.offset.unwrap_or(0).max(0)
    }
}

/// Offset pagination metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
    pub has_more: bool,
}

impl Pagination {
    pub fn new(total: i64, limit: i64, offset: i64) -> Self {
        Self {
            total,
            limit,
            offset,
            has_more: offset + limit < total,
        }
    }
}

/// Notes attached to a tag, one page at a time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagNotes {
    pub notes: Vec<Note>,
    pub pagination: Pagination,
    pub tag: TagDetail,
}
