//! 路由配置模块
//!
//! 定义所有 REST API 端点的路由映射

use axum::{
    Router,
    routing::{get, patch, post, put},
};

use crate::{handlers, state::AppState};

/// 构建计划阶段与周期任务路由
fn program_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/phase",
            get(handlers::phase::get_phase).put(handlers::phase::set_phase),
        )
        .route("/phase/advance", post(handlers::phase::advance_phase))
        .route(
            "/ingestion/sprints",
            post(handlers::ingestion::upload_sprints),
        )
        .route("/judgment/run", post(handlers::judgment::run_judgment))
        .route(
            "/judgment/members/{id}",
            post(handlers::judgment::judge_member),
        )
}

/// 构建奖品目录与领取时段路由
fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/rewards",
            get(handlers::reward::list_rewards).post(handlers::reward::create_reward),
        )
        .route("/rewards/import", post(handlers::reward::import_rewards))
        .route("/rewards/low-stock", get(handlers::reward::low_stock))
        .route("/rewards/{id}/stock", patch(handlers::reward::update_stock))
        .route("/rewards/{id}/image", put(handlers::reward::replace_image))
        .route(
            "/slots",
            get(handlers::slot::list_slots).post(handlers::slot::create_slot),
        )
}

/// 构建会员与兑换路由
fn member_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/members",
            get(handlers::member::list_members).post(handlers::member::create_member),
        )
        .route("/members/{id}", get(handlers::member::get_member))
        .route("/members/{id}/history", get(handlers::member::get_history))
        .route("/members/{id}/advice", get(handlers::member::get_advice))
        .route("/redemptions", post(handlers::redemption::redeem))
        .route("/redemptions/preview", post(handlers::redemption::preview))
}

/// 构建完整的 API 路由，由调用方挂载到 `/api`
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health))
        .merge(program_routes())
        .merge(catalog_routes())
        .merge(member_routes())
}
