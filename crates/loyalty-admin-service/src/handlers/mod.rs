//! HTTP 请求处理器

pub mod ingestion;
pub mod judgment;
pub mod member;
pub mod phase;
pub mod redemption;
pub mod reward;
pub mod slot;

use axum::{Json, extract::State};

use crate::{
    dto::{ApiResponse, HealthDto},
    state::AppState,
};

/// 健康检查
///
/// GET /api/health
pub async fn health(State(state): State<AppState>) -> Json<ApiResponse<HealthDto>> {
    Json(ApiResponse::success(HealthDto {
        status: "ok",
        service: "loyalty-admin-service",
        phase: state.engine.phase().current(),
    }))
}
