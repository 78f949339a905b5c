//! 请求提取器
//!
//! 包装 axum 的 `Json` / `Query` / `Path`：解析失败时不再返回纯文本，
//! 而是 400 + `ApiResponse` 信封 (错误码 `ValidationFailed`，`details.source`
//! 标明出错位置 body | query | path)。

use axum::extract::{FromRequest, FromRequestParts};
use shared::error::AppError;

/// JSON 请求体
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct Json<T>(pub T);

/// 查询字符串
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct Query<T>(pub T);

/// 路径参数
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct Path<T>(pub T);
