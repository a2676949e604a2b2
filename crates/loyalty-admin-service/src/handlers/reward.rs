//! 奖品目录 API 处理器
//!
//! 上架、批量导入、库存与图片维护

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use loyalty_engine::{ImportReport, NewReward, Reward};
use tracing::info;
use validator::Validate;

use crate::{
    dto::{
        ApiResponse, CreateRewardRequest, LowStockQuery, ReplaceImageRequest, UpdateStockRequest,
    },
    error::AdminError,
    state::AppState,
};

/// 获取奖品列表
///
/// GET /api/rewards
pub async fn list_rewards(State(state): State<AppState>) -> Json<ApiResponse<Vec<Reward>>> {
    Json(ApiResponse::success(state.engine.catalog().list()))
}

/// 新增奖品
///
/// POST /api/rewards
pub async fn create_reward(
    State(state): State<AppState>,
    Json(req): Json<CreateRewardRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Reward>>), AdminError> {
    req.validate()?;

    let reward = state.engine.catalog().add_reward(NewReward::from(req))?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(reward))))
}

/// 批量导入奖品
///
/// POST /api/rewards/import
///
/// 请求体为纯文本，每行 `名称, 代币, 库存[, 图片地址]`
pub async fn import_rewards(
    State(state): State<AppState>,
    body: String,
) -> Result<Json<ApiResponse<ImportReport>>, AdminError> {
    if body.trim().is_empty() {
        return Err(AdminError::Validation("导入内容不能为空".to_string()));
    }

    let report = state.engine.catalog().import(&body);
    let message = format!(
        "导入 {} 条，拒绝 {} 条",
        report.imported.len(),
        report.rejected.len()
    );
    Ok(Json(ApiResponse::success_with_message(report, message)))
}

/// 调整库存
///
/// PATCH /api/rewards/{id}/stock
pub async fn update_stock(
    State(state): State<AppState>,
    Path(reward_id): Path<String>,
    Json(req): Json<UpdateStockRequest>,
) -> Result<Json<ApiResponse<Reward>>, AdminError> {
    let catalog = state.engine.catalog();
    let reward = match (req.delta, req.stock) {
        (Some(delta), None) => catalog.adjust_stock(&reward_id, delta)?,
        (None, Some(stock)) => catalog.set_stock(&reward_id, stock)?,
        _ => {
            return Err(AdminError::Validation(
                "delta 与 stock 必须且只能提供一个".to_string(),
            ));
        }
    };

    info!(reward_id = %reward.id, stock = reward.stock, "Reward stock updated");
    Ok(Json(ApiResponse::success(reward)))
}

/// 替换奖品图片
///
/// PUT /api/rewards/{id}/image
pub async fn replace_image(
    State(state): State<AppState>,
    Path(reward_id): Path<String>,
    Json(req): Json<ReplaceImageRequest>,
) -> Result<Json<ApiResponse<Reward>>, AdminError> {
    req.validate()?;

    let reward = state.engine.catalog().replace_image(&reward_id, &req.image)?;
    Ok(Json(ApiResponse::success(reward)))
}

/// 低库存奖品
///
/// GET /api/rewards/low-stock
pub async fn low_stock(
    State(state): State<AppState>,
    Query(query): Query<LowStockQuery>,
) -> Json<ApiResponse<Vec<Reward>>> {
    let rewards = match query.threshold {
        Some(threshold) => state.engine.catalog().low_stock(threshold),
        None => state.engine.low_stock(),
    };
    Json(ApiResponse::success(rewards))
}
