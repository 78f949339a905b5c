//! Tag API Handlers

use axum::{extract::State, http::StatusCode};
use serde::Serialize;

use crate::core::ServerState;
use crate::hierarchy::LevelFix;
use crate::utils::extract::{Json, Path, Query};
use crate::utils::{ApiResponse, AppResult, ok, ok_with_message};
use shared::models::{
    NoteFilter, Tag, TagCreate, TagDetail, TagDetailQuery, TagListQuery, TagNode, TagNotes,
    TagStats, TagUpdate, TagView,
};

/// `GET /api/tags` 的响应体，形状取决于查询参数
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum TagListing {
    Flat(Vec<TagDetail>),
    Forest(Vec<TagNode>),
    Stats(TagStats),
}

#[derive(Debug, Serialize)]
pub struct RepairReport {
    repaired: usize,
    fixes: Vec<LevelFix>,
}

/// GET /api/tags - 获取标签
///
/// 优先级: `stats=true` > `search` > `parentId` > `view`
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<TagListQuery>,
) -> AppResult<ApiResponse<TagListing>> {
    if query.stats {
        let stats = state.tags.stats(state.config.stats_top_n).await?;
        return Ok(ok(TagListing::Stats(stats)));
    }
    if let Some(term) = query.search.as_deref() {
        let found = state.tags.search(term).await?;
        return Ok(ok(TagListing::Flat(found)));
    }
    if let Some(parent_id) = query.parent_id {
        let children = state.tags.children(Some(parent_id)).await?;
        return Ok(ok(TagListing::Flat(children)));
    }

    let listing = match query.view {
        TagView::All => TagListing::Flat(state.tags.list_all().await?),
        TagView::Root => TagListing::Forest(state.tags.list_roots().await?),
        TagView::Tree => TagListing::Forest(state.tags.tree().await?),
    };
    Ok(ok(listing))
}

/// GET /api/tags/:id - 获取单个标签
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Query(query): Query<TagDetailQuery>,
) -> AppResult<ApiResponse<TagDetail>> {
    let detail = state.tags.get_by_id(id, query.path).await?;
    Ok(ok(detail))
}

/// POST /api/tags - 创建标签
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<TagCreate>,
) -> AppResult<(StatusCode, ApiResponse<TagDetail>)> {
    let detail = state.tags.create(payload).await?;
    Ok((StatusCode::CREATED, ok_with_message("Tag created", detail)))
}

/// POST /api/tags/batch - 批量创建标签
pub async fn create_batch(
    State(state): State<ServerState>,
    Json(payload): Json<Vec<TagCreate>>,
) -> AppResult<(StatusCode, ApiResponse<Vec<TagDetail>>)> {
    let created = state.tags.create_batch(payload).await?;
    Ok((StatusCode::CREATED, ok_with_message("Tags created", created)))
}

/// PUT /api/tags/:id - 更新标签
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<TagUpdate>,
) -> AppResult<ApiResponse<TagDetail>> {
    let detail = state.tags.update(id, payload).await?;
    Ok(ok_with_message("Tag updated", detail))
}

/// DELETE /api/tags/:id - 删除标签
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<ApiResponse<Tag>> {
    let deleted = state.tags.delete(id).await?;
    Ok(ok_with_message("Tag deleted", deleted))
}

/// GET /api/tags/:id/notes - 标签下的笔记
pub async fn notes(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Query(filter): Query<NoteFilter>,
) -> AppResult<ApiResponse<TagNotes>> {
    let page = state.tags.notes_for_tag(id, &filter).await?;
    Ok(ok(page))
}

/// GET /api/tags/consistency - 检查层级缓存
pub async fn consistency(State(state): State<ServerState>) -> AppResult<ApiResponse<Vec<LevelFix>>> {
    let stale = state.tags.check_consistency().await?;
    Ok(ok(stale))
}

/// POST /api/tags/repair - 修复层级缓存
pub async fn repair(State(state): State<ServerState>) -> AppResult<ApiResponse<RepairReport>> {
    let fixes = state.tags.repair_levels().await?;
    Ok(ok(RepairReport {
        repaired: fixes.len(),
        fixes,
    }))
}
