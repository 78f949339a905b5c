//! 统一错误处理
//!
//! 请求级错误统一使用 `shared::error`：
//! - [`AppError`] - 应用错误 (错误码 + 消息 + 详情)
//! - [`ApiResponse`] - API 响应结构
//!
//! # 使用示例
//!
//! ```ignore
//! // 返回错误
//! Err(AppError::validation("标签名不能为空"))
//!
//! // 返回成功响应
//! Ok(ok(tag))
//! ```

pub use shared::error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};

/// 成功响应
pub fn ok<T>(data: T) -> ApiResponse<T> {
    ApiResponse::success(data)
}

/// 带消息的成功响应
pub fn ok_with_message<T>(message: impl Into<String>, data: T) -> ApiResponse<T> {
    ApiResponse::success_with_message(message, data)
}
