//! 奖品目录服务

use std::sync::Arc;

use loyalty_shared::observability::metrics;
use serde::Serialize;
use tracing::{info, instrument, warn};

use super::import;
use crate::error::{LoyaltyError, Result};
use crate::models::{NewReward, Reward};
use crate::store::{Row, RewardTable};

/// 批量导入结果
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    pub imported: Vec<Reward>,
    pub rejected: Vec<RejectedRow>,
}

/// 被拒绝的导入行
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RejectedRow {
    pub line: usize,
    pub code: &'static str,
    pub reason: String,
}

impl RejectedRow {
    fn from_error(line: usize, err: &LoyaltyError) -> Self {
        Self {
            line,
            code: err.error_code(),
            reason: err.to_string(),
        }
    }
}

/// 奖品目录
#[derive(Clone)]
pub struct RewardCatalog {
    rewards: Arc<RewardTable>,
}

impl RewardCatalog {
    pub fn new(rewards: Arc<RewardTable>) -> Self {
        Self { rewards }
    }

    /// 新增奖品
    #[instrument(skip(self, request), fields(name = %request.name))]
    pub fn add_reward(&self, request: NewReward) -> Result<Reward> {
        validate_new_reward(&request)?;

        let reward = request.into_reward();
        if !self.rewards.insert(reward.clone()) {
            return Err(LoyaltyError::AlreadyExists {
                entity: "reward",
                id: reward.id,
            });
        }

        metrics::set_reward_stock(&reward.id, f64::from(reward.stock));
        info!(reward_id = %reward.id, cost = reward.cost, stock = reward.stock, "奖品已上架");
        Ok(reward)
    }

    /// 扣减一件库存，库存为 0 时失败且不做修改
    pub fn decrement_stock(&self, reward_id: &str) -> Result<Reward> {
        let row = self.reward_row(reward_id)?;
        let mut reward = row.lock();
        Self::decrement_locked(&mut reward)?;
        Ok(reward.clone())
    }

    /// 增减库存，结果最低为 0
    #[instrument(skip(self))]
    pub fn adjust_stock(&self, reward_id: &str, delta: i64) -> Result<Reward> {
        let row = self.reward_row(reward_id)?;
        let mut reward = row.lock();

        let target = i64::from(reward.stock)
            .saturating_add(delta)
            .clamp(0, i64::from(u32::MAX));
        let target = u32::try_from(target).unwrap_or(u32::MAX);
        Self::apply_stock(&mut reward, target);
        Ok(reward.clone())
    }

    /// 直接设置库存
    #[instrument(skip(self))]
    pub fn set_stock(&self, reward_id: &str, stock: u32) -> Result<Reward> {
        let row = self.reward_row(reward_id)?;
        let mut reward = row.lock();
        Self::apply_stock(&mut reward, stock);
        Ok(reward.clone())
    }

    /// 替换奖品图片
    pub fn replace_image(&self, reward_id: &str, image: &str) -> Result<Reward> {
        let image = image.trim();
        if image.is_empty() {
            return Err(LoyaltyError::Validation("图片地址不能为空".to_string()));
        }

        let row = self.reward_row(reward_id)?;
        let mut reward = row.lock();
        reward.image = image.to_string();
        info!(reward_id = %reward.id, "奖品图片已更新");
        Ok(reward.clone())
    }

    /// 批量导入奖品，无效行跳过并在报告中列出
    #[instrument(skip(self, text))]
    pub fn import(&self, text: &str) -> ImportReport {
        let mut report = ImportReport::default();

        for row in import::parse_rows(text) {
            match row.and_then(|request| self.add_reward(request)) {
                Ok(reward) => report.imported.push(reward),
                Err(err) => {
                    let line = match &err {
                        LoyaltyError::InvalidCatalogRow { line, .. } => *line,
                        _ => 0,
                    };
                    warn!(line, error = %err, "奖品导入行被拒绝");
                    report.rejected.push(RejectedRow::from_error(line, &err));
                }
            }
        }

        info!(
            imported = report.imported.len(),
            rejected = report.rejected.len(),
            "奖品批量导入完成"
        );
        report
    }

    pub fn get(&self, reward_id: &str) -> Result<Reward> {
        self.rewards
            .get(reward_id)
            .ok_or_else(|| LoyaltyError::RewardNotFound(reward_id.to_string()))
    }

    pub fn list(&self) -> Vec<Reward> {
        self.rewards.list()
    }

    /// 库存低于阈值的奖品，缺货的排在最前
    pub fn low_stock(&self, threshold: u32) -> Vec<Reward> {
        let mut rewards = self.rewards.list_by(|reward| reward.is_low_stock(threshold));
        rewards.sort_by_key(|reward| reward.stock);
        rewards
    }

    pub(crate) fn reward_row(&self, reward_id: &str) -> Result<Row<Reward>> {
        self.rewards
            .row(reward_id)
            .ok_or_else(|| LoyaltyError::RewardNotFound(reward_id.to_string()))
    }

    pub(crate) fn decrement_locked(reward: &mut Reward) -> Result<()> {
        if !reward.has_stock() {
            return Err(LoyaltyError::OutOfStock(reward.id.clone()));
        }
        reward.take_one();
        metrics::set_reward_stock(&reward.id, f64::from(reward.stock));
        Ok(())
    }

    fn apply_stock(reward: &mut Reward, stock: u32) {
        let previous = reward.stock;
        reward.stock = stock;
        metrics::set_reward_stock(&reward.id, f64::from(stock));
        info!(reward_id = %reward.id, from = previous, to = stock, "奖品库存已调整");
    }
}

fn validate_new_reward(request: &NewReward) -> Result<()> {
    if request.name.trim().is_empty() {
        return Err(LoyaltyError::Validation("奖品名称不能为空".to_string()));
    }
    if request.cost <= 0 {
        return Err(LoyaltyError::InvalidAmount {
            amount: request.cost,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PLACEHOLDER_IMAGE;

    fn catalog() -> RewardCatalog {
        let catalog = RewardCatalog::new(Arc::new(RewardTable::new()));
        catalog
            .add_reward(NewReward::new("Logitech MX Master 3S", 120, 5).with_id("r-1"))
            .unwrap();
        catalog
            .add_reward(NewReward::new("Sony WH-1000XM5", 350, 2).with_id("r-3"))
            .unwrap();
        catalog
            .add_reward(NewReward::new("Office Ergonomic Chair", 250, 0).with_id("r-5"))
            .unwrap();
        catalog
    }

    #[test]
    fn test_add_reward_validation() {
        let catalog = catalog();
        assert!(matches!(
            catalog.add_reward(NewReward::new("Free", 0, 1)),
            Err(LoyaltyError::InvalidAmount { amount: 0 })
        ));
        assert!(matches!(
            catalog.add_reward(NewReward::new("  ", 10, 1)),
            Err(LoyaltyError::Validation(_))
        ));
        assert!(matches!(
            catalog.add_reward(NewReward::new("Dup", 10, 1).with_id("r-1")),
            Err(LoyaltyError::AlreadyExists { .. })
        ));
    }

    #[test]
    fn test_decrement_stock() {
        let catalog = catalog();
        assert_eq!(catalog.decrement_stock("r-1").unwrap().stock, 4);

        let err = catalog.decrement_stock("r-5").unwrap_err();
        assert_eq!(err, LoyaltyError::OutOfStock("r-5".to_string()));
        assert_eq!(catalog.get("r-5").unwrap().stock, 0);
    }

    #[test]
    fn test_adjust_stock_clamps_at_zero() {
        let catalog = catalog();
        assert_eq!(catalog.adjust_stock("r-3", 3).unwrap().stock, 5);
        assert_eq!(catalog.adjust_stock("r-3", -10).unwrap().stock, 0);
        assert_eq!(catalog.set_stock("r-3", 7).unwrap().stock, 7);
    }

    #[test]
    fn test_replace_image() {
        let catalog = catalog();
        assert_eq!(catalog.get("r-1").unwrap().image, PLACEHOLDER_IMAGE);

        let reward = catalog
            .replace_image("r-1", "https://picsum.photos/id/1/300/300")
            .unwrap();
        assert_eq!(reward.image, "https://picsum.photos/id/1/300/300");
        assert!(catalog.replace_image("r-1", "").is_err());
        assert!(matches!(
            catalog.replace_image("r-404", "x"),
            Err(LoyaltyError::RewardNotFound(_))
        ));
    }

    #[test]
    fn test_low_stock_lists_out_of_stock_first() {
        let catalog = catalog();
        let ids: Vec<String> = catalog.low_stock(3).into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec!["r-5", "r-3"]);
    }

    #[test]
    fn test_import_skips_invalid_rows() {
        let catalog = RewardCatalog::new(Arc::new(RewardTable::new()));
        let report = catalog.import(
            "Name,Cost,Stock,ImageURL\nMouse,120,5,https://img/m\nFree,0,3\nPad,15,10\n",
        );

        assert_eq!(report.imported.len(), 2);
        assert_eq!(report.rejected.len(), 1);
        assert_eq!(report.rejected[0].line, 3);
        assert_eq!(report.rejected[0].code, "INVALID_CATALOG_ROW");
        assert_eq!(catalog.list().len(), 2);
        assert_eq!(report.imported[1].image, PLACEHOLDER_IMAGE);
    }
}
