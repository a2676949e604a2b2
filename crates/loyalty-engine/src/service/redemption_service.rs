//! 奖品兑换服务
//!
//! 兑换流程：
//!
//! 1. 阶段校验（仅 REDEEM 阶段开放）-> 2. 奖品库存 -> 3. 会员余额 -> 4. 时段名额
//!    -> 5. 扣减代币、扣减库存、占用名额
//!
//! 所有校验在写入之前完成，任一校验失败都不会产生修改。
//! 加锁顺序固定为：阶段读锁 -> 会员 -> 奖品 -> 时段。

use std::sync::Arc;

use loyalty_shared::observability::metrics;
use tracing::{info, instrument, warn};

use crate::catalog::RewardCatalog;
use crate::error::{LoyaltyError, Result};
use crate::ledger::TokenLedger;
use crate::models::{EntryKind, SystemPhase};
use crate::phase::ProgramContext;
use crate::service::dto::{RedeemRequest, RedemptionPreview, RedemptionReceipt};
use crate::slots::SlotBookingService;
use crate::store::MemberTable;

/// 兑换协调器
pub struct RedemptionCoordinator {
    context: ProgramContext,
    members: Arc<MemberTable>,
    catalog: RewardCatalog,
    slots: SlotBookingService,
}

impl RedemptionCoordinator {
    pub fn new(
        context: ProgramContext,
        members: Arc<MemberTable>,
        catalog: RewardCatalog,
        slots: SlotBookingService,
    ) -> Self {
        Self {
            context,
            members,
            catalog,
            slots,
        }
    }

    /// 兑换奖品并预约领取时段
    #[instrument(
        skip(self, request),
        fields(
            member_id = %request.member_id,
            reward_id = %request.reward_id,
            slot_id = %request.slot_id,
        )
    )]
    pub fn redeem(&self, request: &RedeemRequest) -> Result<RedemptionReceipt> {
        let result = self.execute(request);

        match &result {
            Ok(receipt) => {
                metrics::record_redemption(&request.reward_id, "success");
                info!(
                    balance = receipt.balance,
                    stock = receipt.reward.stock,
                    booked = receipt.slot.booked,
                    "兑换成功"
                );
            }
            Err(e) => {
                metrics::record_redemption(&request.reward_id, e.error_code());
                warn!(error = %e, "兑换被拒绝");
            }
        }

        result
    }

    fn execute(&self, request: &RedeemRequest) -> Result<RedemptionReceipt> {
        // 阶段读锁一直持有到写入完成
        let _phase = self.context.phase.hold(SystemPhase::Redeem)?;

        let member_row = self
            .members
            .row(&request.member_id)
            .ok_or_else(|| LoyaltyError::MemberNotFound(request.member_id.clone()))?;
        let reward_row = self.catalog.reward_row(&request.reward_id)?;
        let slot_row = self.slots.slot_row(&request.slot_id)?;

        let mut member = member_row.lock();
        let mut reward = reward_row.lock();
        let mut slot = slot_row.lock();

        if !reward.has_stock() {
            return Err(LoyaltyError::OutOfStock(reward.id.clone()));
        }
        if member.tokens < reward.cost {
            return Err(LoyaltyError::InsufficientBalance {
                required: reward.cost,
                available: member.tokens,
            });
        }
        if !slot.has_capacity() {
            return Err(LoyaltyError::SlotFull(slot.id.clone()));
        }

        // 以下操作在上述校验通过后不会失败
        let entry = TokenLedger::append(
            &mut member,
            -reward.cost,
            format!("Redeemed: {}", reward.name),
            EntryKind::Spend,
        );
        RewardCatalog::decrement_locked(&mut reward)?;
        SlotBookingService::book_locked(&mut slot)?;

        Ok(RedemptionReceipt {
            member_id: member.id.clone(),
            balance: member.tokens,
            entry,
            reward: reward.clone(),
            slot: slot.clone(),
        })
    }

    /// 兑换预检
    pub fn preview(&self, request: &RedeemRequest) -> Result<RedemptionPreview> {
        let member = self
            .members
            .get(&request.member_id)
            .ok_or_else(|| LoyaltyError::MemberNotFound(request.member_id.clone()))?;
        let reward = self.catalog.get(&request.reward_id)?;
        let slot = self.slots.get(&request.slot_id)?;

        let phase_open = self.context.phase.current() == SystemPhase::Redeem;
        let in_stock = reward.has_stock();
        let affordable = member.tokens >= reward.cost;
        let slot_available = slot.has_capacity();

        let blocked_by = [
            (phase_open, "PHASE_LOCKED"),
            (in_stock, "OUT_OF_STOCK"),
            (affordable, "INSUFFICIENT_BALANCE"),
            (slot_available, "SLOT_FULL"),
        ]
        .into_iter()
        .find(|(passed, _)| !passed)
        .map(|(_, code)| code);

        Ok(RedemptionPreview {
            phase_open,
            in_stock,
            affordable,
            slot_available,
            balance: member.tokens,
            cost: reward.cost,
            balance_after: member.tokens - reward.cost,
            blocked_by,
        })
    }
}
