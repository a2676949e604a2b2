//! 冲刺活动导入
//!
//! 有冲刺的会员按 `sprint_rate × 冲刺数` 入账并标记活跃；
//! 冲刺数为 0 的会员标记不活跃。

use std::collections::HashSet;
use std::sync::Arc;

use loyalty_shared::observability::metrics;
use tracing::{info, instrument, warn};

use crate::error::{LoyaltyError, Result};
use crate::inactivity::InactivityTracker;
use crate::ledger::TokenLedger;
use crate::models::Member;
use crate::phase::ProgramContext;
use crate::service::dto::{ActivityReport, IngestionBatch, IngestionReport};
use crate::store::MemberTable;

pub struct ActivityIngestionService {
    context: ProgramContext,
    members: Arc<MemberTable>,
}

impl ActivityIngestionService {
    pub fn new(context: ProgramContext, members: Arc<MemberTable>) -> Self {
        Self { context, members }
    }

    /// 处理一个周期的活动批次
    ///
    /// 找不到的会员跳过并在结果中列出，不中断批次
    #[instrument(skip(self, batch), fields(label = %batch.label, reports = batch.reports.len()))]
    pub fn ingest(&self, batch: &IngestionBatch) -> Result<IngestionReport> {
        let label = batch.label.trim();
        if label.is_empty() {
            return Err(LoyaltyError::Validation("周期标签不能为空".to_string()));
        }

        let mut report = IngestionReport::default();
        let mut seen = HashSet::new();

        for activity in &batch.reports {
            if !seen.insert(activity.member_id.as_str()) {
                return Err(LoyaltyError::Validation(format!(
                    "会员在同一批次中重复出现: {}",
                    activity.member_id
                )));
            }
        }

        for activity in &batch.reports {
            let Some(row) = self.members.row(&activity.member_id) else {
                warn!(member_id = %activity.member_id, "活动报告中的会员不存在");
                metrics::record_activity_report("unknown_member");
                report.unknown_members.push(activity.member_id.clone());
                continue;
            };

            let mut member = row.lock();
            let credited = self.apply(&mut member, activity, label)?;
            if credited > 0 {
                report.credited += 1;
                report.tokens_issued += credited;
            } else {
                report.marked_inactive += 1;
            }
        }

        if batch.mark_unreported_inactive {
            for row in self.members.rows() {
                let mut member = row.lock();
                if seen.contains(member.id.as_str()) {
                    continue;
                }
                InactivityTracker::mark_inactive_locked(&mut member);
                metrics::record_activity_report("unreported");
                report.marked_inactive += 1;
            }
        }

        info!(
            credited = report.credited,
            tokens_issued = report.tokens_issued,
            marked_inactive = report.marked_inactive,
            unknown = report.unknown_members.len(),
            "活动批次处理完成"
        );
        Ok(report)
    }

    /// 在会员行锁内应用一条报告，返回入账数量
    fn apply(&self, member: &mut Member, activity: &ActivityReport, label: &str) -> Result<i64> {
        if activity.sprint_count == 0 {
            InactivityTracker::mark_inactive_locked(member);
            metrics::record_activity_report("inactive");
            return Ok(0);
        }

        let amount = self
            .context
            .sprint_rate
            .checked_mul(i64::from(activity.sprint_count))
            .ok_or(LoyaltyError::InvalidAmount { amount: i64::MAX })?;

        TokenLedger::credit_locked(member, amount, format!("Sprint Upload: {label}"))?;
        InactivityTracker::mark_active_locked(member);
        metrics::record_activity_report("active");
        Ok(amount)
    }
}
