//! 忠诚度引擎错误类型
//!
//! 所有错误都是可恢复的业务条件，由调用方转换为用户可见的提示

use thiserror::Error;

use crate::models::SystemPhase;

/// 忠诚度引擎错误类型
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoyaltyError {
    // === 账本相关错误 ===
    #[error("变动数量无效: {amount}，必须为正数")]
    InvalidAmount { amount: i64 },

    #[error("代币余额不足: 需要 {required}, 可用 {available}")]
    InsufficientBalance { required: i64, available: i64 },

    // === 奖品与时段相关错误 ===
    #[error("奖品库存不足: reward_id={0}")]
    OutOfStock(String),

    #[error("领取时段已满: slot_id={0}")]
    SlotFull(String),

    #[error("奖品导入行无效: 第 {line} 行 - {reason}")]
    InvalidCatalogRow { line: usize, reason: String },

    // === 阶段相关错误 ===
    #[error("当前阶段不允许此操作: 需要 {required}, 当前 {current}")]
    PhaseLocked {
        required: SystemPhase,
        current: SystemPhase,
    },

    // === 查找错误 ===
    #[error("会员不存在: {0}")]
    MemberNotFound(String),

    #[error("奖品不存在: {0}")]
    RewardNotFound(String),

    #[error("领取时段不存在: {0}")]
    SlotNotFound(String),

    #[error("记录已存在: {entity} id={id}")]
    AlreadyExists { entity: &'static str, id: String },

    #[error("参数校验失败: {0}")]
    Validation(String),

    #[error("内部错误: {0}")]
    Internal(String),
}

/// 忠诚度引擎 Result 类型别名
pub type Result<T> = std::result::Result<T, LoyaltyError>;

impl LoyaltyError {
    /// 检查是否为业务错误（非系统错误）
    pub fn is_business_error(&self) -> bool {
        !matches!(self, Self::Internal(_))
    }

    /// 获取错误码（用于 API 响应和指标标签）
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidAmount { .. } => "INVALID_AMOUNT",
            Self::InsufficientBalance { .. } => "INSUFFICIENT_BALANCE",
            Self::OutOfStock(_) => "OUT_OF_STOCK",
            Self::SlotFull(_) => "SLOT_FULL",
            Self::InvalidCatalogRow { .. } => "INVALID_CATALOG_ROW",
            Self::PhaseLocked { .. } => "PHASE_LOCKED",
            Self::MemberNotFound(_) => "MEMBER_NOT_FOUND",
            Self::RewardNotFound(_) => "REWARD_NOT_FOUND",
            Self::SlotNotFound(_) => "SLOT_NOT_FOUND",
            Self::AlreadyExists { .. } => "ALREADY_EXISTS",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}
