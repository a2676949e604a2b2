//! 兑换 API 处理器

use axum::{Json, extract::State};
use loyalty_engine::{RedeemRequest, RedemptionPreview, RedemptionReceipt};
use validator::Validate;

use crate::{
    dto::{ApiResponse, RedeemRewardRequest},
    error::AdminError,
    state::AppState,
};

/// 兑换奖品
///
/// POST /api/redemptions
pub async fn redeem(
    State(state): State<AppState>,
    Json(req): Json<RedeemRewardRequest>,
) -> Result<Json<ApiResponse<RedemptionReceipt>>, AdminError> {
    req.validate()?;

    let receipt = state
        .engine
        .redemption()
        .redeem(&RedeemRequest::from(req))?;
    Ok(Json(ApiResponse::success(receipt)))
}

/// 兑换预检，不修改任何数据
///
/// POST /api/redemptions/preview
pub async fn preview(
    State(state): State<AppState>,
    Json(req): Json<RedeemRewardRequest>,
) -> Result<Json<ApiResponse<RedemptionPreview>>, AdminError> {
    req.validate()?;

    let preview = state
        .engine
        .redemption()
        .preview(&RedeemRequest::from(req))?;
    Ok(Json(ApiResponse::success(preview)))
}
