//! Tag API 模块
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /api/tags | GET | 列表 / 搜索 / 树 / 统计 |
//! | /api/tags | POST | 创建标签 |
//! | /api/tags/batch | POST | 批量创建 (全部成功或全部回滚) |
//! | /api/tags/consistency | GET | 列出层级缓存不一致的标签 |
//! | /api/tags/repair | POST | 修复层级缓存 |
//! | /api/tags/{id} | GET | 标签详情 (`?path=true` 附带路径) |
//! | /api/tags/{id} | PUT | 重命名 / 改色 / 移动 |
//! | /api/tags/{id} | DELETE | 删除叶子标签 |
//! | /api/tags/{id}/notes | GET | 标签下的笔记 (分页) |

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/tags", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route("/batch", post(handler::create_batch))
        .route("/consistency", get(handler::consistency))
        .route("/repair", post(handler::repair))
        .route(
            "/{id}",
            get(handler::get_by_id)
                .put(handler::update)
                .delete(handler::delete),
        )
        .route("/{id}/notes", get(handler::notes))
}
