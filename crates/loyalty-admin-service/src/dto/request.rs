//! 请求 DTO 定义
//!
//! 所有 REST API 的请求参数和请求体结构

use chrono::NaiveDateTime;
use loyalty_engine::{
    ActivityReport, Grade, IngestionBatch, NewMember, NewReward, NewSlot, RedeemRequest,
};
use serde::Deserialize;
use validator::Validate;

/// 切换阶段请求
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SetPhaseRequest {
    #[validate(length(min = 1, message = "阶段不能为空"))]
    pub phase: String,
}

/// 冲刺活动上传请求
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SprintUploadRequest {
    #[validate(length(min = 1, max = 100, message = "周期标签长度必须在1-100个字符之间"))]
    pub label: String,
    #[validate(nested)]
    pub reports: Vec<SprintReportItem>,
    #[serde(default)]
    pub mark_unreported_inactive: bool,
}

/// 单个会员的冲刺数
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SprintReportItem {
    #[validate(length(min = 1, message = "会员编号不能为空"))]
    pub member_id: String,
    #[validate(range(max = 100, message = "单周期冲刺数不能超过100"))]
    pub sprint_count: u32,
}

impl From<SprintUploadRequest> for IngestionBatch {
    fn from(req: SprintUploadRequest) -> Self {
        Self {
            label: req.label,
            reports: req
                .reports
                .into_iter()
                .map(|item| ActivityReport::new(item.member_id, item.sprint_count))
                .collect(),
            mark_unreported_inactive: req.mark_unreported_inactive,
        }
    }
}

/// 新增会员请求
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateMemberRequest {
    pub id: Option<String>,
    #[validate(length(min = 1, max = 100, message = "姓名长度必须在1-100个字符之间"))]
    pub name: String,
    #[validate(email(message = "邮箱格式无效"))]
    pub email: String,
    pub grade: Option<Grade>,
    pub token_expiry_date: chrono::NaiveDate,
    #[validate(range(min = 0, message = "期初余额不能为负数"))]
    pub opening_balance: Option<i64>,
}

impl From<CreateMemberRequest> for NewMember {
    fn from(req: CreateMemberRequest) -> Self {
        let mut member = NewMember::new(req.name, req.email, req.token_expiry_date)
            .with_grade(req.grade.unwrap_or_default())
            .with_opening_balance(req.opening_balance.unwrap_or(0));
        if let Some(id) = req.id {
            member = member.with_id(id);
        }
        member
    }
}

/// 新增奖品请求
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateRewardRequest {
    pub id: Option<String>,
    #[validate(length(min = 1, max = 100, message = "奖品名称长度必须在1-100个字符之间"))]
    pub name: String,
    #[validate(range(min = 1, message = "兑换代币数必须为正数"))]
    pub cost: i64,
    pub stock: u32,
    pub image: Option<String>,
}

impl From<CreateRewardRequest> for NewReward {
    fn from(req: CreateRewardRequest) -> Self {
        Self {
            id: req.id,
            name: req.name,
            cost: req.cost,
            stock: req.stock,
            image: req.image,
        }
    }
}

/// 库存调整请求
///
/// `delta` 与 `stock` 二选一：前者增减库存，后者直接设置
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStockRequest {
    pub delta: Option<i64>,
    pub stock: Option<u32>,
}

/// 替换图片请求
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ReplaceImageRequest {
    #[validate(length(min = 1, max = 2048, message = "图片地址长度必须在1-2048个字符之间"))]
    pub image: String,
}

/// 新增领取时段请求
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateSlotRequest {
    pub id: Option<String>,
    pub datetime: NaiveDateTime,
    #[validate(range(min = 1, message = "名额必须大于0"))]
    pub quota: u32,
    pub booked: Option<u32>,
}

impl From<CreateSlotRequest> for NewSlot {
    fn from(req: CreateSlotRequest) -> Self {
        Self {
            id: req.id,
            datetime: req.datetime,
            quota: req.quota,
            booked: req.booked.unwrap_or(0),
        }
    }
}

/// 兑换请求
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RedeemRewardRequest {
    #[validate(length(min = 1, message = "会员编号不能为空"))]
    pub member_id: String,
    #[validate(length(min = 1, message = "奖品编号不能为空"))]
    pub reward_id: String,
    #[validate(length(min = 1, message = "时段编号不能为空"))]
    pub slot_id: String,
}

impl From<RedeemRewardRequest> for RedeemRequest {
    fn from(req: RedeemRewardRequest) -> Self {
        RedeemRequest::new(req.member_id, req.reward_id, req.slot_id)
    }
}

/// 流水查询参数
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct HistoryQuery {
    #[validate(range(min = 1, max = 500, message = "limit 必须在1-500之间"))]
    pub limit: Option<usize>,
}

/// 兑换建议查询参数
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdviceQuery {
    pub reward_id: Option<String>,
}

/// 低库存查询参数
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LowStockQuery {
    pub threshold: Option<u32>,
}
