//! 兑换建议
//!
//! 引擎只提供只读上下文（余额、等级、奖品名称与价格），
//! 具体的建议生成由实现 [`Advisor`] 的协作方完成。

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tracing::instrument;

use crate::catalog::RewardCatalog;
use crate::error::{LoyaltyError, Result};
use crate::models::{Grade, Reward};
use crate::store::MemberTable;

/// 达到目标代币还需要完成的冲刺数
///
/// `ceil(max(0, cost - balance) / rate)`
pub fn sprints_needed(cost: i64, balance: i64, rate: i64) -> u32 {
    let shortfall = (cost - balance).max(0);
    if shortfall == 0 || rate <= 0 {
        return 0;
    }
    let sprints = (shortfall + rate - 1) / rate;
    u32::try_from(sprints).unwrap_or(u32::MAX)
}

/// 某个奖品的冲刺计划
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SprintPlan {
    pub reward_id: String,
    pub reward_name: String,
    pub cost: i64,
    pub balance: i64,
    pub shortfall: i64,
    pub sprints_needed: u32,
    pub affordable: bool,
}

impl SprintPlan {
    pub fn new(reward: &Reward, balance: i64, rate: i64) -> Self {
        let shortfall = (reward.cost - balance).max(0);
        Self {
            reward_id: reward.id.clone(),
            reward_name: reward.name.clone(),
            cost: reward.cost,
            balance,
            shortfall,
            sprints_needed: sprints_needed(reward.cost, balance, rate),
            affordable: shortfall == 0,
        }
    }
}

/// 目录中的奖品条目（仅名称与价格）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogItem {
    pub id: String,
    pub name: String,
    pub cost: i64,
}

/// 提供给建议方的只读上下文
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvisoryContext {
    pub member_id: String,
    pub balance: i64,
    pub grade: Grade,
    pub sprint_rate: i64,
    pub catalog: Vec<CatalogItem>,
}

/// 建议结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Advice {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan: Option<SprintPlan>,
    pub message: String,
}

/// 建议生成方
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Advisor: Send + Sync {
    async fn advise(&self, context: &AdvisoryContext, plan: Option<SprintPlan>) -> Result<String>;
}

/// 基于规则的默认建议方
#[derive(Debug, Clone, Copy, Default)]
pub struct SprintPlanner;

#[async_trait]
impl Advisor for SprintPlanner {
    async fn advise(&self, context: &AdvisoryContext, plan: Option<SprintPlan>) -> Result<String> {
        let message = match plan {
            Some(plan) if plan.affordable => format!(
                "You can redeem {} now ({} tokens, balance {}).",
                plan.reward_name, plan.cost, plan.balance
            ),
            Some(plan) => format!(
                "You need {} more tokens for {}: about {} more sprint(s) at {} tokens each.",
                plan.shortfall, plan.reward_name, plan.sprints_needed, context.sprint_rate
            ),
            None => {
                let affordable: Vec<&str> = context
                    .catalog
                    .iter()
                    .filter(|item| item.cost <= context.balance)
                    .map(|item| item.name.as_str())
                    .collect();
                if affordable.is_empty() {
                    format!(
                        "With {} tokens nothing is affordable yet. Keep uploading sprints.",
                        context.balance
                    )
                } else {
                    format!(
                        "With {} tokens you can redeem: {}.",
                        context.balance,
                        affordable.join(", ")
                    )
                }
            }
        };
        Ok(message)
    }
}

/// 兑换建议服务
pub struct AdvisoryService {
    members: Arc<MemberTable>,
    catalog: RewardCatalog,
    sprint_rate: i64,
    advisor: Arc<dyn Advisor>,
}

impl AdvisoryService {
    pub fn new(
        members: Arc<MemberTable>,
        catalog: RewardCatalog,
        sprint_rate: i64,
        advisor: Arc<dyn Advisor>,
    ) -> Self {
        Self {
            members,
            catalog,
            sprint_rate,
            advisor,
        }
    }

    /// 构建会员的只读上下文
    pub fn context(&self, member_id: &str) -> Result<AdvisoryContext> {
        let member = self
            .members
            .get(member_id)
            .ok_or_else(|| LoyaltyError::MemberNotFound(member_id.to_string()))?;

        Ok(AdvisoryContext {
            member_id: member.id,
            balance: member.tokens,
            grade: member.grade,
            sprint_rate: self.sprint_rate,
            catalog: self
                .catalog
                .list()
                .into_iter()
                .map(|reward| CatalogItem {
                    id: reward.id,
                    name: reward.name,
                    cost: reward.cost,
                })
                .collect(),
        })
    }

    /// 计算会员兑换某个奖品的冲刺计划
    pub fn plan(&self, member_id: &str, reward_id: &str) -> Result<SprintPlan> {
        let balance = self
            .members
            .get(member_id)
            .map(|member| member.tokens)
            .ok_or_else(|| LoyaltyError::MemberNotFound(member_id.to_string()))?;
        let reward = self.catalog.get(reward_id)?;
        Ok(SprintPlan::new(&reward, balance, self.sprint_rate))
    }

    /// 生成建议
    #[instrument(skip(self))]
    pub async fn advise(&self, member_id: &str, reward_id: Option<&str>) -> Result<Advice> {
        let context = self.context(member_id)?;
        let plan = reward_id
            .map(|reward_id| self.plan(member_id, reward_id))
            .transpose()?;

        let message = self.advisor.advise(&context, plan.clone()).await?;
        Ok(Advice { plan, message })
    }
}
