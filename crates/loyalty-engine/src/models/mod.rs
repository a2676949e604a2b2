//! 忠诚度引擎领域模型
//!
//! 包含会员、账本流水、奖品、领取时段等核心实体定义

pub mod enums;
pub mod member;
pub mod reward;

// 重新导出常用类型
pub use enums::{EntryKind, Grade, SystemPhase, UnknownPhase};
pub use member::{AuditEntry, Member, NewMember};
pub use reward::{NewReward, NewSlot, PLACEHOLDER_IMAGE, PickupSlot, Reward};
