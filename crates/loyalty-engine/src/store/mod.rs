//! 内存存储层
//!
//! 以“实体表 + 行级锁”的方式保存会员、奖品和领取时段。
//!
//! ## 设计原则
//!
//! - 存储只负责保存与加锁，不包含业务规则
//! - 每个实体独立加锁，互不相关的兑换不会相互阻塞
//! - 需要同时锁定多个实体时，统一按 会员 -> 奖品 -> 时段 的顺序加锁

mod table;

use std::sync::Arc;

pub use table::{Keyed, Row, Table};

use crate::models::{Member, PickupSlot, Reward};

impl Keyed for Member {
    fn key(&self) -> &str {
        &self.id
    }
}

impl Keyed for Reward {
    fn key(&self) -> &str {
        &self.id
    }
}

impl Keyed for PickupSlot {
    fn key(&self) -> &str {
        &self.id
    }
}

pub type MemberTable = Table<Member>;
pub type RewardTable = Table<Reward>;
pub type SlotTable = Table<PickupSlot>;

/// 引擎的全部状态表
#[derive(Clone, Default)]
pub struct LoyaltyStore {
    pub members: Arc<MemberTable>,
    pub rewards: Arc<RewardTable>,
    pub slots: Arc<SlotTable>,
}

impl LoyaltyStore {
    pub fn new() -> Self {
        Self::default()
    }
}
