//! 服务层数据传输对象
//!
//! 定义服务层与外部交互使用的 DTO，与内部领域模型解耦

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::{AuditEntry, Grade, Member, PickupSlot, Reward};

// ==================== 兑换 ====================

/// 兑换请求
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedeemRequest {
    pub member_id: String,
    pub reward_id: String,
    pub slot_id: String,
}

impl RedeemRequest {
    pub fn new(
        member_id: impl Into<String>,
        reward_id: impl Into<String>,
        slot_id: impl Into<String>,
    ) -> Self {
        Self {
            member_id: member_id.into(),
            reward_id: reward_id.into(),
            slot_id: slot_id.into(),
        }
    }
}

/// 兑换回执
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RedemptionReceipt {
    pub member_id: String,
    pub balance: i64,
    pub entry: AuditEntry,
    pub reward: Reward,
    pub slot: PickupSlot,
}

/// 兑换预检结果，不修改任何数据
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RedemptionPreview {
    pub phase_open: bool,
    pub in_stock: bool,
    pub affordable: bool,
    pub slot_available: bool,
    pub balance: i64,
    pub cost: i64,
    /// 兑换后的余额，余额不足时为负数
    pub balance_after: i64,
    /// 按校验顺序第一个失败项的错误码
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blocked_by: Option<&'static str>,
}

impl RedemptionPreview {
    pub fn can_redeem(&self) -> bool {
        self.blocked_by.is_none()
    }
}

// ==================== 活动导入 ====================

/// 单个会员的冲刺活动报告
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityReport {
    pub member_id: String,
    /// 本周期完成的冲刺数，0 表示不活跃
    pub sprint_count: u32,
}

impl ActivityReport {
    pub fn new(member_id: impl Into<String>, sprint_count: u32) -> Self {
        Self {
            member_id: member_id.into(),
            sprint_count,
        }
    }
}

/// 一个周期的活动批次
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestionBatch {
    /// 周期标签，如 "June 2024"
    pub label: String,
    pub reports: Vec<ActivityReport>,
    /// 未出现在报告中的会员是否按不活跃处理
    #[serde(default)]
    pub mark_unreported_inactive: bool,
}

/// 活动批次处理结果
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestionReport {
    pub credited: usize,
    pub tokens_issued: i64,
    pub marked_inactive: usize,
    /// 找不到的会员编号
    pub unknown_members: Vec<String>,
}

// ==================== 会员视图 ====================

/// 会员概览（不含流水）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberSummary {
    pub id: String,
    pub name: String,
    pub email: String,
    pub grade: Grade,
    pub tokens: i64,
    pub inactive_months_consecutive: u32,
    pub inactive_months_cumulative: u32,
    pub token_expiry_date: NaiveDate,
}

impl From<&Member> for MemberSummary {
    fn from(member: &Member) -> Self {
        Self {
            id: member.id.clone(),
            name: member.name.clone(),
            email: member.email.clone(),
            grade: member.grade,
            tokens: member.tokens,
            inactive_months_consecutive: member.inactive_months_consecutive,
            inactive_months_cumulative: member.inactive_months_cumulative,
            token_expiry_date: member.token_expiry_date,
        }
    }
}
