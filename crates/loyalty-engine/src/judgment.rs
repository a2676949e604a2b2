//! 批量裁决
//!
//! 按固定顺序对会员执行惩罚规则，每次调用至多一项惩罚：
//!
//! 1. 连续不活跃达到阈值：清零全部余额（RESET），不再评估规则 2
//! 2. 累计不活跃达到阈值：余额减半并降一级（DOWNGRADE）
//! 3. 否则不做任何修改
//!
//! 裁决不清零计数器，也不是幂等的，调用方每个周期对每个会员只调用一次。

use std::sync::Arc;

use loyalty_shared::observability::metrics;
use parking_lot::Mutex;
use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::error::{LoyaltyError, Result};
use crate::ledger::TokenLedger;
use crate::models::{EntryKind, Grade, Member};
use crate::store::MemberTable;

/// 触发清零的连续不活跃月数
pub const CONSECUTIVE_RESET_THRESHOLD: u32 = 3;
/// 触发降级的累计不活跃月数
pub const CUMULATIVE_DOWNGRADE_THRESHOLD: u32 = 3;

pub const RESET_DESCRIPTION: &str = "PENALTY: 3 Months Consecutive Inactivity (Reset)";

fn downgrade_description(grade: Grade) -> String {
    format!("PENALTY: Cumulative Inactivity. Downgrade to {grade} & 50% Token Cut")
}

/// 单个会员的裁决结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JudgmentOutcome {
    /// 余额清零
    #[serde(rename_all = "camelCase")]
    Reset { member_id: String, cleared: i64 },
    /// 余额减半并降级
    #[serde(rename_all = "camelCase")]
    Downgrade {
        member_id: String,
        cut: i64,
        from: Grade,
        to: Grade,
    },
    /// 无惩罚
    #[serde(rename_all = "camelCase")]
    NoPenalty { member_id: String },
}

impl JudgmentOutcome {
    pub fn member_id(&self) -> &str {
        match self {
            Self::Reset { member_id, .. }
            | Self::Downgrade { member_id, .. }
            | Self::NoPenalty { member_id } => member_id,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Self::Reset { .. } => "reset",
            Self::Downgrade { .. } => "downgrade",
            Self::NoPenalty { .. } => "no_penalty",
        }
    }
}

/// 批量裁决汇总
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JudgmentSummary {
    pub resets: usize,
    pub downgrades: usize,
    pub untouched: usize,
    pub outcomes: Vec<JudgmentOutcome>,
}

impl JudgmentSummary {
    fn push(&mut self, outcome: JudgmentOutcome) {
        match outcome {
            JudgmentOutcome::Reset { .. } => self.resets += 1,
            JudgmentOutcome::Downgrade { .. } => self.downgrades += 1,
            JudgmentOutcome::NoPenalty { .. } => self.untouched += 1,
        }
        self.outcomes.push(outcome);
    }

    pub fn total(&self) -> usize {
        self.outcomes.len()
    }
}

/// 批量裁决引擎
pub struct BatchJudgmentEngine {
    members: Arc<MemberTable>,
    /// 同一时刻只允许一个批量裁决任务
    job: Mutex<()>,
}

impl BatchJudgmentEngine {
    pub fn new(members: Arc<MemberTable>) -> Self {
        Self {
            members,
            job: Mutex::new(()),
        }
    }

    /// 裁决单个会员
    #[instrument(skip(self))]
    pub fn judge(&self, member_id: &str) -> Result<JudgmentOutcome> {
        let row = self
            .members
            .row(member_id)
            .ok_or_else(|| LoyaltyError::MemberNotFound(member_id.to_string()))?;
        let mut member = row.lock();
        Self::judge_locked(&mut member)
    }

    /// 对全部会员执行裁决
    ///
    /// 单个会员失败只记录告警，不中断批次
    #[instrument(skip(self))]
    pub fn judge_all(&self) -> JudgmentSummary {
        let _job = self.job.lock();
        let mut summary = JudgmentSummary::default();

        for row in self.members.rows() {
            let mut member = row.lock();
            match Self::judge_locked(&mut member) {
                Ok(outcome) => summary.push(outcome),
                Err(e) => warn!(member_id = %member.id, error = %e, "会员裁决失败"),
            }
        }

        info!(
            resets = summary.resets,
            downgrades = summary.downgrades,
            untouched = summary.untouched,
            "批量裁决完成"
        );
        summary
    }

    pub(crate) fn judge_locked(member: &mut Member) -> Result<JudgmentOutcome> {
        let outcome = if member.inactive_months_consecutive >= CONSECUTIVE_RESET_THRESHOLD {
            let cleared = member.tokens;
            TokenLedger::debit_locked(member, cleared, RESET_DESCRIPTION, EntryKind::Penalty)?;
            JudgmentOutcome::Reset {
                member_id: member.id.clone(),
                cleared,
            }
        } else if member.inactive_months_cumulative >= CUMULATIVE_DOWNGRADE_THRESHOLD {
            let from = member.grade;
            let to = from.downgrade();
            // 扣减一半，奇数余额向下取整后按会员有利方向保留多出的 1 枚
            let cut = member.tokens / 2;
            TokenLedger::debit_locked(member, cut, downgrade_description(to), EntryKind::Penalty)?;
            member.grade = to;
            JudgmentOutcome::Downgrade {
                member_id: member.id.clone(),
                cut,
                from,
                to,
            }
        } else {
            JudgmentOutcome::NoPenalty {
                member_id: member.id.clone(),
            }
        };

        metrics::record_judgment(outcome.label());
        info!(
            member_id = %member.id,
            outcome = outcome.label(),
            balance = member.tokens,
            grade = %member.grade,
            "会员裁决完成"
        );
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewMember;
    use chrono::NaiveDate;

    fn member(grade: Grade, balance: i64, consecutive: u32, cumulative: u32) -> Member {
        let mut member = NewMember::new(
            "Budi Santoso",
            "budi.santoso@techno.co.id",
            NaiveDate::from_ymd_opt(2026, 12, 31).unwrap(),
        )
        .with_id("u-101")
        .with_grade(grade)
        .with_inactivity(consecutive, cumulative)
        .into_member();
        if balance > 0 {
            TokenLedger::adjust_locked(&mut member, balance, "Opening balance").unwrap();
        }
        member
    }

    #[test]
    fn test_reset_clears_balance() {
        let mut m = member(Grade::Ruby, 145, 3, 1);
        let outcome = BatchJudgmentEngine::judge_locked(&mut m).unwrap();

        assert_eq!(
            outcome,
            JudgmentOutcome::Reset {
                member_id: "u-101".to_string(),
                cleared: 145
            }
        );
        assert_eq!(m.tokens, 0);
        assert_eq!(m.grade, Grade::Ruby);
        assert_eq!(m.history[0].change, -145);
        assert_eq!(m.history[0].kind, EntryKind::Penalty);
        assert_eq!(m.history[0].description, RESET_DESCRIPTION);
        assert!(m.is_consistent());
    }

    #[test]
    fn test_reset_takes_precedence_over_downgrade() {
        let mut m = member(Grade::Diamond, 100, 4, 9);
        let outcome = BatchJudgmentEngine::judge_locked(&mut m).unwrap();

        assert!(matches!(outcome, JudgmentOutcome::Reset { .. }));
        assert_eq!(m.tokens, 0);
        // 不叠加降级
        assert_eq!(m.grade, Grade::Diamond);
        assert_eq!(m.history.len(), 2);
    }

    #[test]
    fn test_downgrade_halves_balance() {
        let mut m = member(Grade::Ruby, 145, 1, 3);
        let outcome = BatchJudgmentEngine::judge_locked(&mut m).unwrap();

        assert_eq!(
            outcome,
            JudgmentOutcome::Downgrade {
                member_id: "u-101".to_string(),
                cut: 72,
                from: Grade::Ruby,
                to: Grade::Sapphire,
            }
        );
        assert_eq!(m.tokens, 73);
        assert_eq!(m.grade, Grade::Sapphire);
        assert_eq!(
            m.history[0].description,
            "PENALTY: Cumulative Inactivity. Downgrade to Sapphire & 50% Token Cut"
        );
    }

    #[test]
    fn test_downgrade_floors_at_sapphire() {
        let mut m = member(Grade::Sapphire, 40, 0, 5);
        BatchJudgmentEngine::judge_locked(&mut m).unwrap();
        assert_eq!(m.grade, Grade::Sapphire);
        assert_eq!(m.tokens, 20);
    }

    #[test]
    fn test_reset_on_empty_balance_records_zero_entry() {
        let mut m = member(Grade::Ruby, 0, 3, 3);
        BatchJudgmentEngine::judge_locked(&mut m).unwrap();
        assert_eq!(m.tokens, 0);
        assert_eq!(m.history.len(), 1);
        assert_eq!(m.history[0].change, 0);
    }

    #[test]
    fn test_no_penalty_leaves_member_untouched() {
        let mut m = member(Grade::Ruby, 145, 1, 2);
        let before = m.clone();
        let outcome = BatchJudgmentEngine::judge_locked(&mut m).unwrap();

        assert!(matches!(outcome, JudgmentOutcome::NoPenalty { .. }));
        assert_eq!(m, before);
    }

    #[test]
    fn test_judgment_does_not_clear_counters() {
        let mut m = member(Grade::Diamond, 80, 0, 3);
        BatchJudgmentEngine::judge_locked(&mut m).unwrap();
        assert_eq!(m.inactive_months_cumulative, 3);

        // 再次裁决会再次惩罚
        BatchJudgmentEngine::judge_locked(&mut m).unwrap();
        assert_eq!(m.grade, Grade::Sapphire);
        assert_eq!(m.tokens, 20);
    }

    #[test]
    fn test_judge_all_summary() {
        let members = Arc::new(MemberTable::new());
        let mut reset = member(Grade::Ruby, 50, 3, 3);
        reset.id = "u-1".to_string();
        let mut downgrade = member(Grade::Diamond, 50, 0, 3);
        downgrade.id = "u-2".to_string();
        let mut clean = member(Grade::Ruby, 50, 0, 0);
        clean.id = "u-3".to_string();
        members.insert(reset);
        members.insert(downgrade);
        members.insert(clean);

        let engine = BatchJudgmentEngine::new(members.clone());
        let summary = engine.judge_all();

        assert_eq!(summary.resets, 1);
        assert_eq!(summary.downgrades, 1);
        assert_eq!(summary.untouched, 1);
        assert_eq!(summary.total(), 3);
        assert_eq!(summary.outcomes[0].member_id(), "u-1");
        assert_eq!(members.get("u-2").unwrap().grade, Grade::Ruby);
    }

    #[test]
    fn test_outcome_serialization() {
        let outcome = JudgmentOutcome::Downgrade {
            member_id: "u-1".to_string(),
            cut: 10,
            from: Grade::Ruby,
            to: Grade::Sapphire,
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["outcome"], "DOWNGRADE");
        assert_eq!(json["memberId"], "u-1");
        assert_eq!(json["to"], "SAPPHIRE");
    }
}
