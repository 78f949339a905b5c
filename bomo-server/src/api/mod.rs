//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`tags`] - 标签层级接口

pub mod health;
pub mod tags;

use std::time::Duration;

use axum::response::{IntoResponse, Response};
use axum::{Router, http::StatusCode, middleware};
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;

use crate::core::ServerState;
use crate::middleware::logging_middleware;
use crate::utils::ErrorCode;

// Re-export common types for handlers
pub use crate::utils::{ApiResponse, AppError, AppResult};

/// Build the Axum router (without state)
pub fn routes() -> Router<ServerState> {
    Router::<ServerState>::new()
        .merge(health::router())
        .merge(tags::router())
}

/// Build the complete application: routes, state and middleware stack
pub fn build_app(state: ServerState) -> Router {
    let timeout = Duration::from_millis(state.config.request_timeout_ms);
    with_timeout(routes().with_state(state), timeout)
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
        .layer(middleware::from_fn(logging_middleware))
}

/// Abort requests slower than `timeout` with a 408 envelope
fn with_timeout(router: Router, timeout: Duration) -> Router {
    router
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            timeout,
        ))
        .layer(middleware::map_response(timeout_envelope))
}

/// Handlers never answer 408 themselves, so any 408 here came from the timeout
async fn timeout_envelope(response: Response) -> Response {
    if response.status() == StatusCode::REQUEST_TIMEOUT {
        return AppError::new(ErrorCode::TimeoutError).into_response();
    }
    response
}
