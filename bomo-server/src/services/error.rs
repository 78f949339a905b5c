//! Tag service errors

use axum::response::IntoResponse;
use shared::error::{AppError, ErrorCode};
use thiserror::Error;

use crate::db::repository::RepoError;
use crate::hierarchy::HierarchyError;
use crate::utils::validation::ValidationError;

/// Failures of tag operations
#[derive(Debug, Error)]
pub enum TagError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Tag name '{0}' already exists")]
    DuplicateName(String),

    #[error("Tag {0} not found")]
    NotFound(i64),

    #[error("Parent tag {0} not found")]
    ParentNotFound(i64),

    #[error("Tag {0} cannot be its own parent")]
    SelfParent(i64),

    #[error("Moving tag {tag_id} under {parent_id} would create a cycle")]
    Cycle { tag_id: i64, parent_id: i64 },

    #[error("Tag {id} still has {count} child tag(s)")]
    HasChildren { id: i64, count: i64 },

    #[error("Storage error: {0}")]
    Storage(#[from] RepoError),
}

impl From<sqlx::Error> for TagError {
    fn from(err: sqlx::Error) -> Self {
        TagError::Storage(err.into())
    }
}

impl From<HierarchyError> for TagError {
    fn from(err: HierarchyError) -> Self {
        match err {
            HierarchyError::NotFound(id) => TagError::NotFound(id),
            HierarchyError::SelfParent(id) => TagError::SelfParent(id),
            HierarchyError::Cycle { tag_id, parent_id } => TagError::Cycle { tag_id, parent_id },
        }
    }
}

impl From<TagError> for AppError {
    fn from(err: TagError) -> Self {
        let message = err.to_string();
        match err {
            TagError::Validation(v) => v.into(),
            TagError::DuplicateName(name) => {
                AppError::with_message(ErrorCode::TagNameExists, message).with_detail("name", name)
            }
            TagError::NotFound(id) => {
                AppError::with_message(ErrorCode::TagNotFound, message).with_detail("id", id)
            }
            TagError::ParentNotFound(id) => {
                AppError::with_message(ErrorCode::TagParentNotFound, message)
                    .with_detail("parentId", id)
            }
            TagError::SelfParent(id) => {
                AppError::with_message(ErrorCode::TagSelfParent, message).with_detail("id", id)
            }
            TagError::Cycle { tag_id, parent_id } => {
                AppError::with_message(ErrorCode::TagCycle, message)
                    .with_detail("id", tag_id)
                    .with_detail("parentId", parent_id)
            }
            TagError::HasChildren { id, count } => {
                AppError::with_message(ErrorCode::TagHasChildren, message)
                    .with_detail("id", id)
                    .with_detail("childCount", count)
            }
            TagError::Storage(RepoError::Duplicate(msg)) => {
                AppError::with_message(ErrorCode::TagNameExists, msg)
            }
            TagError::Storage(RepoError::NotFound(msg)) => {
                AppError::with_message(ErrorCode::NotFound, msg)
            }
            TagError::Storage(db_err) => {
                tracing::error!(error = %db_err, "Tag service database error");
                AppError::new(ErrorCode::DatabaseError)
            }
        }
    }
}

impl IntoResponse for TagError {
    fn into_response(self) -> axum::response::Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

/// Result type for tag operations
pub type TagResult<T> = Result<T, TagError>;
