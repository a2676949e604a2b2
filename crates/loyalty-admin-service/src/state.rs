//! 应用状态定义

use std::sync::Arc;

use loyalty_engine::LoyaltyEngine;

/// Axum 应用共享状态
///
/// 引擎通过 Arc 在 handler 间共享
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<LoyaltyEngine>,
}

impl AppState {
    pub fn new(engine: LoyaltyEngine) -> Self {
        Self {
            engine: Arc::new(engine),
        }
    }
}
