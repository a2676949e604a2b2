//! 裁决 API 处理器

use axum::{
    Json,
    extract::{Path, State},
};
use loyalty_engine::{JudgmentOutcome, JudgmentSummary};

use crate::{dto::ApiResponse, error::AdminError, state::AppState};

/// 对全部会员执行裁决
///
/// POST /api/judgment/run
///
/// 批量裁决逐个锁定会员行，放到阻塞线程池执行
pub async fn run_judgment(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<JudgmentSummary>>, AdminError> {
    let engine = state.engine.clone();
    let summary = tokio::task::spawn_blocking(move || engine.judgment().judge_all())
        .await
        .map_err(|e| AdminError::Internal(format!("批量裁决任务异常: {e}")))?;
    Ok(Json(ApiResponse::success(summary)))
}

/// 裁决单个会员
///
/// POST /api/judgment/members/{id}
pub async fn judge_member(
    State(state): State<AppState>,
    Path(member_id): Path<String>,
) -> Result<Json<ApiResponse<JudgmentOutcome>>, AdminError> {
    let outcome = state.engine.judgment().judge(&member_id)?;
    Ok(Json(ApiResponse::success(outcome)))
}
