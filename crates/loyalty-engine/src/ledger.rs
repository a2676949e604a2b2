//! 代币账本
//!
//! 会员余额的唯一修改入口。每次成功的变动都会在返回前追加且仅追加一条流水，
//! 校验失败时不做任何修改、不写任何流水。
//!
//! `*_locked` 系列函数作用于已加锁的会员，供需要在同一把行锁内组合多个操作的
//! 服务（活动导入、裁决、兑换）使用。

use std::sync::Arc;

use loyalty_shared::observability::metrics;
use tracing::{debug, instrument};

use crate::error::{LoyaltyError, Result};
use crate::models::{AuditEntry, EntryKind, Member};
use crate::store::MemberTable;

/// 代币账本服务
#[derive(Clone)]
pub struct TokenLedger {
    members: Arc<MemberTable>,
}

impl TokenLedger {
    pub fn new(members: Arc<MemberTable>) -> Self {
        Self { members }
    }

    /// 入账（EARN）
    #[instrument(skip(self, description), fields(member_id = %member_id))]
    pub fn credit(
        &self,
        member_id: &str,
        amount: i64,
        description: impl Into<String>,
    ) -> Result<AuditEntry> {
        let row = self.member_row(member_id)?;
        let mut member = row.lock();
        Self::credit_locked(&mut member, amount, description)
    }

    /// 扣减（SPEND / PENALTY / ADJUSTMENT）
    ///
    /// `amount` 为扣减的绝对值，流水记为负数
    #[instrument(skip(self, description), fields(member_id = %member_id))]
    pub fn debit(
        &self,
        member_id: &str,
        amount: i64,
        description: impl Into<String>,
        kind: EntryKind,
    ) -> Result<AuditEntry> {
        let row = self.member_row(member_id)?;
        let mut member = row.lock();
        Self::debit_locked(&mut member, amount, description, kind)
    }

    /// 管理员调整（ADJUSTMENT），`change` 可正可负但不能为 0
    #[instrument(skip(self, description), fields(member_id = %member_id))]
    pub fn adjust(
        &self,
        member_id: &str,
        change: i64,
        description: impl Into<String>,
    ) -> Result<AuditEntry> {
        let row = self.member_row(member_id)?;
        let mut member = row.lock();
        Self::adjust_locked(&mut member, change, description)
    }

    /// 当前余额（只读）
    pub fn current_balance(&self, member_id: &str) -> Result<i64> {
        let row = self.member_row(member_id)?;
        let balance = row.lock().tokens;
        Ok(balance)
    }

    /// 会员流水（最新在前）
    pub fn history(&self, member_id: &str, limit: Option<usize>) -> Result<Vec<AuditEntry>> {
        let row = self.member_row(member_id)?;
        let member = row.lock();
        Ok(member.recent_history(limit.unwrap_or(usize::MAX)))
    }

    // ==================== 行锁内操作 ====================

    pub(crate) fn credit_locked(
        member: &mut Member,
        amount: i64,
        description: impl Into<String>,
    ) -> Result<AuditEntry> {
        if amount <= 0 || member.tokens.checked_add(amount).is_none() {
            return Err(LoyaltyError::InvalidAmount { amount });
        }
        Ok(Self::append(member, amount, description, EntryKind::Earn))
    }

    pub(crate) fn debit_locked(
        member: &mut Member,
        amount: i64,
        description: impl Into<String>,
        kind: EntryKind,
    ) -> Result<AuditEntry> {
        match kind {
            EntryKind::Earn => {
                return Err(LoyaltyError::Validation(
                    "EARN 类型只能用于入账".to_string(),
                ));
            }
            // 清零惩罚可能作用于零余额，此时记一笔 0 变动
            EntryKind::Penalty if amount < 0 => {
                return Err(LoyaltyError::InvalidAmount { amount });
            }
            EntryKind::Spend | EntryKind::Adjustment if amount <= 0 => {
                return Err(LoyaltyError::InvalidAmount { amount });
            }
            _ => {}
        }

        if amount > member.tokens {
            return Err(LoyaltyError::InsufficientBalance {
                required: amount,
                available: member.tokens,
            });
        }

        Ok(Self::append(member, -amount, description, kind))
    }

    pub(crate) fn adjust_locked(
        member: &mut Member,
        change: i64,
        description: impl Into<String>,
    ) -> Result<AuditEntry> {
        if change == 0 {
            return Err(LoyaltyError::InvalidAmount { amount: change });
        }
        match member.tokens.checked_add(change) {
            None => return Err(LoyaltyError::InvalidAmount { amount: change }),
            Some(balance) if balance < 0 => {
                return Err(LoyaltyError::InsufficientBalance {
                    required: -change,
                    available: member.tokens,
                });
            }
            Some(_) => {}
        }
        Ok(Self::append(member, change, description, EntryKind::Adjustment))
    }

    /// 追加流水并同步余额，调用方负责所有前置校验
    pub(crate) fn append(
        member: &mut Member,
        change: i64,
        description: impl Into<String>,
        kind: EntryKind,
    ) -> AuditEntry {
        let entry = AuditEntry::new(change, description, kind);
        member.push_entry(entry.clone());

        metrics::record_ledger_entry(kind.as_str());
        debug!(
            member_id = %member.id,
            change = change,
            kind = %kind,
            balance = member.tokens,
            "账本流水已写入"
        );

        entry
    }

    fn member_row(&self, member_id: &str) -> Result<crate::store::Row<Member>> {
        self.members
            .row(member_id)
            .ok_or_else(|| LoyaltyError::MemberNotFound(member_id.to_string()))
    }
}
