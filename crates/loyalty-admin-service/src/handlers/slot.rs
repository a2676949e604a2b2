//! 领取时段 API 处理器

use axum::{Json, extract::State, http::StatusCode};
use loyalty_engine::{NewSlot, PickupSlot};
use validator::Validate;

use crate::{
    dto::{ApiResponse, CreateSlotRequest},
    error::AdminError,
    state::AppState,
};

/// 获取时段列表（按时间排序）
///
/// GET /api/slots
pub async fn list_slots(State(state): State<AppState>) -> Json<ApiResponse<Vec<PickupSlot>>> {
    Json(ApiResponse::success(state.engine.slots().list()))
}

/// 新增时段
///
/// POST /api/slots
pub async fn create_slot(
    State(state): State<AppState>,
    Json(req): Json<CreateSlotRequest>,
) -> Result<(StatusCode, Json<ApiResponse<PickupSlot>>), AdminError> {
    req.validate()?;

    let slot = state.engine.slots().add_slot(NewSlot::from(req))?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(slot))))
}
