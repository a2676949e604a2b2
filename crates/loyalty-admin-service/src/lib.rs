//! 忠诚度计划管理后台服务
//!
//! 提供阶段控制、活动上传、裁决、奖品目录与兑换的 REST API。
//!
//! ## 模块结构
//!
//! - `dto`: 请求和响应的数据传输对象
//! - `error`: 错误类型定义
//! - `handlers`: HTTP 请求处理器
//! - `routes`: 路由配置
//! - `state`: 应用状态
//!
//! ## 技术栈
//!
//! - Web 框架：Axum
//! - 数据验证：validator
//! - 序列化：serde (camelCase)

pub mod dto;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

use axum::Router;

pub use dto::ApiResponse;
pub use error::{AdminError, Result};
pub use state::AppState;

/// 构建挂载在 `/api` 下的应用路由
pub fn app(state: AppState) -> Router {
    Router::new()
        .nest("/api", routes::api_routes())
        .with_state(state)
}
