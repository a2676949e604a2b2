//! 领取时段预约

use std::sync::Arc;

use tracing::{info, instrument};

use crate::error::{LoyaltyError, Result};
use crate::models::{NewSlot, PickupSlot};
use crate::store::{Row, SlotTable};

#[derive(Clone)]
pub struct SlotBookingService {
    slots: Arc<SlotTable>,
}

impl SlotBookingService {
    pub fn new(slots: Arc<SlotTable>) -> Self {
        Self { slots }
    }

    /// 新增领取时段
    #[instrument(skip(self, request), fields(datetime = %request.datetime))]
    pub fn add_slot(&self, request: NewSlot) -> Result<PickupSlot> {
        if request.quota == 0 {
            return Err(LoyaltyError::Validation("时段名额必须大于 0".to_string()));
        }
        if request.booked > request.quota {
            return Err(LoyaltyError::Validation(format!(
                "已预约数 {} 超过名额 {}",
                request.booked, request.quota
            )));
        }

        let slot = request.into_slot();
        if !self.slots.insert(slot.clone()) {
            return Err(LoyaltyError::AlreadyExists {
                entity: "slot",
                id: slot.id,
            });
        }

        info!(slot_id = %slot.id, quota = slot.quota, "领取时段已创建");
        Ok(slot)
    }

    /// 预约一个名额，已满时失败且不做修改
    pub fn book(&self, slot_id: &str) -> Result<PickupSlot> {
        let row = self.slot_row(slot_id)?;
        let mut slot = row.lock();
        Self::book_locked(&mut slot)?;
        Ok(slot.clone())
    }

    pub fn get(&self, slot_id: &str) -> Result<PickupSlot> {
        self.slots
            .get(slot_id)
            .ok_or_else(|| LoyaltyError::SlotNotFound(slot_id.to_string()))
    }

    /// 按时间顺序列出全部时段
    pub fn list(&self) -> Vec<PickupSlot> {
        let mut slots = self.slots.list();
        slots.sort_by_key(|slot| slot.datetime);
        slots
    }

    pub(crate) fn slot_row(&self, slot_id: &str) -> Result<Row<PickupSlot>> {
        self.slots
            .row(slot_id)
            .ok_or_else(|| LoyaltyError::SlotNotFound(slot_id.to_string()))
    }

    pub(crate) fn book_locked(slot: &mut PickupSlot) -> Result<()> {
        if !slot.has_capacity() {
            return Err(LoyaltyError::SlotFull(slot.id.clone()));
        }
        slot.occupy();
        Ok(())
    }
}
