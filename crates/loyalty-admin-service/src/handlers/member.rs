//! 会员 API 处理器

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use loyalty_engine::{Advice, AuditEntry, MemberSummary, NewMember};
use validator::Validate;

use crate::{
    dto::{AdviceQuery, ApiResponse, CreateMemberRequest, HistoryQuery, MemberDetailDto},
    error::AdminError,
    state::AppState,
};

/// 会员列表
///
/// GET /api/members
pub async fn list_members(State(state): State<AppState>) -> Json<ApiResponse<Vec<MemberSummary>>> {
    Json(ApiResponse::success(state.engine.members()))
}

/// 新增会员
///
/// POST /api/members
pub async fn create_member(
    State(state): State<AppState>,
    Json(req): Json<CreateMemberRequest>,
) -> Result<(StatusCode, Json<ApiResponse<MemberDetailDto>>), AdminError> {
    req.validate()?;

    let member = state.engine.enroll(NewMember::from(req))?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(MemberDetailDto::from(&member))),
    ))
}

/// 会员详情
///
/// GET /api/members/{id}
pub async fn get_member(
    State(state): State<AppState>,
    Path(member_id): Path<String>,
) -> Result<Json<ApiResponse<MemberDetailDto>>, AdminError> {
    let member = state.engine.member(&member_id)?;
    Ok(Json(ApiResponse::success(MemberDetailDto::from(&member))))
}

/// 会员流水（最新在前）
///
/// GET /api/members/{id}/history
pub async fn get_history(
    State(state): State<AppState>,
    Path(member_id): Path<String>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<ApiResponse<Vec<AuditEntry>>>, AdminError> {
    query.validate()?;

    let history = state.engine.ledger().history(&member_id, query.limit)?;
    Ok(Json(ApiResponse::success(history)))
}

/// 兑换建议
///
/// GET /api/members/{id}/advice?rewardId=
pub async fn get_advice(
    State(state): State<AppState>,
    Path(member_id): Path<String>,
    Query(query): Query<AdviceQuery>,
) -> Result<Json<ApiResponse<Advice>>, AdminError> {
    let advice = state
        .engine
        .advisory()
        .advise(&member_id, query.reward_id.as_deref())
        .await?;
    Ok(Json(ApiResponse::success(advice)))
}
