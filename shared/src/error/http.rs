//! HTTP status code mapping for error codes

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Get the appropriate HTTP status code for this error code
    pub fn http_status(&self) -> StatusCode {
        match self {
            // Success
            Self::Success => StatusCode::OK,

            // 404 Not Found
            Self::NotFound
            | Self::TagNotFound
            | Self::TagParentNotFound => StatusCode::NOT_FOUND,

            // 408 Request Timeout
            Self::TimeoutError => StatusCode::REQUEST_TIMEOUT,

            // 500 Internal Server Error
            Self::DatabaseError => StatusCode::INTERNAL_SERVER_ERROR,

            // 400 Bad Request: validation, duplicate names and hierarchy rules
            Self::ValidationFailed
            | Self::TagNameExists
            | Self::TagSelfParent
            | Self::TagCycle
            | Self::TagHasChildren
            | Self::TagInvalidColor => StatusCode::BAD_REQUEST,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_status() {
        assert_eq!(ErrorCode::Success.http_status(), StatusCode::OK);
    }

    #[test]
    fn test_not_found_status() {
        assert_eq!(ErrorCode::NotFound.http_status(), StatusCode::NOT_FOUND);
        assert_eq!(ErrorCode::TagNotFound.http_status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ErrorCode::TagParentNotFound.http_status(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_duplicate_name_is_bad_request() {
        assert_eq!(ErrorCode::TagNameExists.http_status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_hierarchy_rules_are_bad_request() {
        assert_eq!(ErrorCode::TagSelfParent.http_status(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorCode::TagCycle.http_status(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorCode::TagHasChildren.http_status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ErrorCode::ValidationFailed.http_status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ErrorCode::TagInvalidColor.http_status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_system_error_status() {
        assert_eq!(
            ErrorCode::DatabaseError.http_status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ErrorCode::TimeoutError.http_status(),
            StatusCode::REQUEST_TIMEOUT
        );
    }
}
