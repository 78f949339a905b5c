//! Unified error codes for BOMO
//!
//! This module defines all error codes used by bomo-server and its clients.
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Tag errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and cross-language compatibility (Rust, TypeScript, etc.)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,

    // ==================== 1xxx: Tag ====================
    /// Tag not found
    TagNotFound = 1001,
    /// Tag name already exists (case-insensitive, global)
    TagNameExists = 1002,
    /// Tag cannot be its own parent
    TagSelfParent = 1003,
    /// Reparenting would create a cycle
    TagCycle = 1004,
    /// Tag still has child tags
    TagHasChildren = 1005,
    /// Parent tag not found
    TagParentNotFound = 1006,
    /// Tag color is not a #RRGGBB value
    TagInvalidColor = 1007,

    // ==================== 9xxx: System ====================
    /// Database error
    DatabaseError = 9002,
    /// Request did not finish within the configured timeout
    TimeoutError = 9004,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",

            // Tag
            ErrorCode::TagNotFound => "Tag not found",
            ErrorCode::TagNameExists => "Tag name already exists",
            ErrorCode::TagSelfParent => "A tag cannot be its own parent",
            ErrorCode::TagCycle => "A tag cannot be moved under its own descendant",
            ErrorCode::TagHasChildren => "Tag has child tags; delete or move them first",
            ErrorCode::TagParentNotFound => "Parent tag not found",
            ErrorCode::TagInvalidColor => "Color must be a hex value like #2563EB",

            // System
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::TimeoutError => "Operation timed out",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),

            // Tag
            1001 => Ok(ErrorCode::TagNotFound),
            1002 => Ok(ErrorCode::TagNameExists),
            1003 => Ok(ErrorCode::TagSelfParent),
            1004 => Ok(ErrorCode::TagCycle),
            1005 => Ok(ErrorCode::TagHasChildren),
            1006 => Ok(ErrorCode::TagParentNotFound),
            1007 => Ok(ErrorCode::TagInvalidColor),

            // System
            9002 => Ok(ErrorCode::DatabaseError),
            9004 => Ok(ErrorCode::TimeoutError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
