//! 不活跃计数器
//!
//! 连续计数在会员活跃时清零，累计计数只增不减

use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::error::{LoyaltyError, Result};
use crate::models::Member;
use crate::store::MemberTable;

/// 会员当前的不活跃计数
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InactivityCounters {
    pub consecutive: u32,
    pub cumulative: u32,
}

impl From<&Member> for InactivityCounters {
    fn from(member: &Member) -> Self {
        Self {
            consecutive: member.inactive_months_consecutive,
            cumulative: member.inactive_months_cumulative,
        }
    }
}

#[derive(Clone)]
pub struct InactivityTracker {
    members: Arc<MemberTable>,
}

impl InactivityTracker {
    pub fn new(members: Arc<MemberTable>) -> Self {
        Self { members }
    }

    /// 本周期有活动：连续计数清零
    pub fn mark_active(&self, member_id: &str) -> Result<InactivityCounters> {
        let row = self
            .members
            .row(member_id)
            .ok_or_else(|| LoyaltyError::MemberNotFound(member_id.to_string()))?;
        let mut member = row.lock();
        Self::mark_active_locked(&mut member);
        Ok(InactivityCounters::from(&*member))
    }

    /// 本周期无活动：两个计数各加一
    pub fn mark_inactive(&self, member_id: &str) -> Result<InactivityCounters> {
        let row = self
            .members
            .row(member_id)
            .ok_or_else(|| LoyaltyError::MemberNotFound(member_id.to_string()))?;
        let mut member = row.lock();
        Self::mark_inactive_locked(&mut member);
        Ok(InactivityCounters::from(&*member))
    }

    pub fn counters(&self, member_id: &str) -> Result<InactivityCounters> {
        self.members
            .get(member_id)
            .map(|member| InactivityCounters::from(&member))
            .ok_or_else(|| LoyaltyError::MemberNotFound(member_id.to_string()))
    }

    pub(crate) fn mark_active_locked(member: &mut Member) {
        member.inactive_months_consecutive = 0;
        debug!(member_id = %member.id, "会员标记为活跃");
    }

    pub(crate) fn mark_inactive_locked(member: &mut Member) {
        member.inactive_months_consecutive = member.inactive_months_consecutive.saturating_add(1);
        member.inactive_months_cumulative = member.inactive_months_cumulative.saturating_add(1);
        debug!(
            member_id = %member.id,
            consecutive = member.inactive_months_consecutive,
            cumulative = member.inactive_months_cumulative,
            "会员标记为不活跃"
        );
    }
}
