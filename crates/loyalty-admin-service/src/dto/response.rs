//! 响应 DTO 定义

use loyalty_engine::{AuditEntry, Member, MemberSummary, PhaseView, SystemPhase};
use serde::Serialize;

/// API 统一响应
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub success: bool,
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    /// 创建成功响应
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            code: "SUCCESS".to_string(),
            message: "操作成功".to_string(),
            data: Some(data),
        }
    }

    /// 创建成功响应（自定义消息）
    pub fn success_with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            code: "SUCCESS".to_string(),
            message: message.into(),
            data: Some(data),
        }
    }
}

/// 阶段切换结果
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseChangeDto {
    pub previous: SystemPhase,
    pub current: PhaseView,
}

/// 会员详情（含最近流水）
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberDetailDto {
    #[serde(flatten)]
    pub summary: MemberSummary,
    pub recent_history: Vec<AuditEntry>,
}

impl MemberDetailDto {
    /// 详情页展示的流水条数
    pub const RECENT_HISTORY_LIMIT: usize = 10;
}

impl From<&Member> for MemberDetailDto {
    fn from(member: &Member) -> Self {
        Self {
            summary: MemberSummary::from(member),
            recent_history: member.recent_history(Self::RECENT_HISTORY_LIMIT),
        }
    }
}

/// 健康检查
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthDto {
    pub status: &'static str,
    pub service: &'static str,
    pub phase: SystemPhase,
}
