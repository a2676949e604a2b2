//! 会员与账本流水模型

use std::collections::VecDeque;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::{EntryKind, Grade};

/// 账本流水（审计记录）
///
/// 创建后不可修改，只能追加
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub description: String,
    /// 带符号的变动数量，正数入账、负数扣减
    pub change: i64,
    pub kind: EntryKind,
}

impl AuditEntry {
    pub(crate) fn new(change: i64, description: impl Into<String>, kind: EntryKind) -> Self {
        Self {
            id: Uuid::now_v7().to_string(),
            timestamp: Utc::now(),
            description: description.into(),
            change,
            kind,
        }
    }
}

/// 会员
///
/// `tokens` 是冗余存储的余额，始终等于 `history` 中所有 `change` 之和。
/// 只有 `ledger` 模块会同时修改两者。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: String,
    pub name: String,
    pub email: String,
    pub grade: Grade,
    pub tokens: i64,
    pub inactive_months_consecutive: u32,
    pub inactive_months_cumulative: u32,
    pub token_expiry_date: NaiveDate,
    /// 最新的流水在最前
    pub history: VecDeque<AuditEntry>,
}

impl Member {
    /// 按流水重新计算的余额
    pub fn ledger_sum(&self) -> i64 {
        self.history.iter().map(|entry| entry.change).sum()
    }

    /// 余额与流水是否一致
    pub fn is_consistent(&self) -> bool {
        self.tokens >= 0 && self.tokens == self.ledger_sum()
    }

    /// 最近的 `limit` 条流水（最新在前）
    pub fn recent_history(&self, limit: usize) -> Vec<AuditEntry> {
        self.history.iter().take(limit).cloned().collect()
    }

    pub(crate) fn push_entry(&mut self, entry: AuditEntry) {
        self.tokens += entry.change;
        self.history.push_front(entry);
    }
}

/// 入会请求
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMember {
    /// 为空时自动生成
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub grade: Grade,
    pub token_expiry_date: NaiveDate,
    /// 期初余额，大于 0 时记一笔 ADJUSTMENT 流水
    #[serde(default)]
    pub opening_balance: i64,
    #[serde(default)]
    pub inactive_months_consecutive: u32,
    #[serde(default)]
    pub inactive_months_cumulative: u32,
}

impl NewMember {
    pub fn new(name: impl Into<String>, email: impl Into<String>, expiry: NaiveDate) -> Self {
        Self {
            id: None,
            name: name.into(),
            email: email.into(),
            grade: Grade::default(),
            token_expiry_date: expiry,
            opening_balance: 0,
            inactive_months_consecutive: 0,
            inactive_months_cumulative: 0,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_grade(mut self, grade: Grade) -> Self {
        self.grade = grade;
        self
    }

    pub fn with_opening_balance(mut self, tokens: i64) -> Self {
        self.opening_balance = tokens;
        self
    }

    pub fn with_inactivity(mut self, consecutive: u32, cumulative: u32) -> Self {
        self.inactive_months_consecutive = consecutive;
        self.inactive_months_cumulative = cumulative;
        self
    }

    /// 生成不含任何流水的会员实体，期初余额由调用方通过账本入账
    pub(crate) fn into_member(self) -> Member {
        Member {
            id: self
                .id
                .unwrap_or_else(|| format!("u-{}", Uuid::new_v4().simple())),
            name: self.name,
            email: self.email,
            grade: self.grade,
            tokens: 0,
            inactive_months_consecutive: self.inactive_months_consecutive,
            inactive_months_cumulative: self.inactive_months_cumulative,
            token_expiry_date: self.token_expiry_date,
            history: VecDeque::new(),
        }
    }
}
