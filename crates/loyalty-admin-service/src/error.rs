//! 管理后台错误类型定义
//!
//! 引擎的业务错误原样透传错误码，由本模块统一映射为 HTTP 状态码

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use loyalty_engine::LoyaltyError;
use serde_json::json;

/// 管理后台错误类型
#[derive(Debug, thiserror::Error)]
pub enum AdminError {
    // 验证错误
    #[error("参数验证失败: {0}")]
    Validation(String),

    // 引擎业务错误
    #[error(transparent)]
    Loyalty(#[from] LoyaltyError),

    // 系统错误
    #[error("内部错误: {0}")]
    Internal(String),
}

impl AdminError {
    /// 返回对应的 HTTP 状态码
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Loyalty(err) => match err {
                LoyaltyError::Validation(_) => StatusCode::BAD_REQUEST,

                LoyaltyError::MemberNotFound(_)
                | LoyaltyError::RewardNotFound(_)
                | LoyaltyError::SlotNotFound(_) => StatusCode::NOT_FOUND,

                LoyaltyError::PhaseLocked { .. } => StatusCode::LOCKED,

                LoyaltyError::InsufficientBalance { .. }
                | LoyaltyError::OutOfStock(_)
                | LoyaltyError::SlotFull(_)
                | LoyaltyError::AlreadyExists { .. } => StatusCode::CONFLICT,

                LoyaltyError::InvalidAmount { .. } | LoyaltyError::InvalidCatalogRow { .. } => {
                    StatusCode::UNPROCESSABLE_ENTITY
                }

                LoyaltyError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 返回错误码（用于 API 响应）
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Loyalty(err) => err.error_code(),
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    fn is_internal(&self) -> bool {
        matches!(
            self,
            Self::Internal(_) | Self::Loyalty(LoyaltyError::Internal(_))
        )
    }
}

impl IntoResponse for AdminError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // 系统级错误只返回通用提示，详细信息仅记录日志
        let message = if self.is_internal() {
            tracing::error!(error = %self, "内部错误");
            "服务内部错误，请稍后重试".to_string()
        } else {
            self.to_string()
        };

        let body = json!({
            "success": false,
            "code": self.error_code(),
            "message": message,
            "data": serde_json::Value::Null
        });

        (status, axum::Json(body)).into_response()
    }
}

/// 从 validator 错误转换
impl From<validator::ValidationErrors> for AdminError {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::Validation(errors.to_string())
    }
}

/// 服务层 Result 类型别名
pub type Result<T> = std::result::Result<T, AdminError>;
