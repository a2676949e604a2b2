//! 计划阶段 API 处理器

use axum::{Json, extract::State};
use loyalty_engine::{PhaseView, SystemPhase};
use tracing::info;
use validator::Validate;

use crate::{
    dto::{ApiResponse, PhaseChangeDto, SetPhaseRequest},
    error::AdminError,
    state::AppState,
};

/// 获取当前阶段
///
/// GET /api/phase
pub async fn get_phase(State(state): State<AppState>) -> Json<ApiResponse<PhaseView>> {
    let phase = state.engine.phase().current();
    Json(ApiResponse::success(PhaseView::from(phase)))
}

/// 切换阶段（无条件，可跳过中间阶段）
///
/// PUT /api/phase
pub async fn set_phase(
    State(state): State<AppState>,
    Json(req): Json<SetPhaseRequest>,
) -> Result<Json<ApiResponse<PhaseChangeDto>>, AdminError> {
    req.validate()?;

    let phase: SystemPhase = req
        .phase
        .parse()
        .map_err(|e: loyalty_engine::UnknownPhase| AdminError::Validation(e.to_string()))?;
    let previous = state.engine.phase().set_phase(phase);

    info!(from = %previous, to = %phase, "Program phase set by admin");

    Ok(Json(ApiResponse::success(PhaseChangeDto {
        previous,
        current: PhaseView::from(phase),
    })))
}

/// 推进到循环中的下一个阶段
///
/// POST /api/phase/advance
pub async fn advance_phase(State(state): State<AppState>) -> Json<ApiResponse<PhaseChangeDto>> {
    let current = state.engine.phase().advance();
    let previous = current.previous();

    info!(from = %previous, to = %current, "Program phase advanced by admin");

    Json(ApiResponse::success(PhaseChangeDto {
        previous,
        current: PhaseView::from(current),
    }))
}
