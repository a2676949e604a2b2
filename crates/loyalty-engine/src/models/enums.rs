//! 忠诚度引擎枚举类型定义
//!
//! 所有枚举都支持 JSON（serde）序列化，序列化形式为 SCREAMING_SNAKE_CASE

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// 会员等级
///
/// 从低到高排列：Sapphire < Ruby < Diamond，派生的 `Ord` 即依赖该声明顺序
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Grade {
    /// 蓝宝石 - 最低等级
    #[default]
    Sapphire,
    /// 红宝石
    Ruby,
    /// 钻石 - 最高等级
    Diamond,
}

impl Grade {
    /// 等级序号，Sapphire = 0
    pub fn rank(self) -> u8 {
        match self {
            Self::Sapphire => 0,
            Self::Ruby => 1,
            Self::Diamond => 2,
        }
    }

    /// 降一级；最低等级降级后仍为自身
    pub fn downgrade(self) -> Self {
        match self {
            Self::Diamond => Self::Ruby,
            Self::Ruby | Self::Sapphire => Self::Sapphire,
        }
    }

    /// 展示名称
    pub fn label(self) -> &'static str {
        match self {
            Self::Sapphire => "Sapphire",
            Self::Ruby => "Ruby",
            Self::Diamond => "Diamond",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// 计划阶段
///
/// 固定循环：ACCUMULATION -> JUDGMENT -> REDEEM -> FULFILLMENT -> ACCUMULATION
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SystemPhase {
    /// 积累期 - 每月上传冲刺活动，兑换关闭
    #[default]
    Accumulation,
    /// 裁决期 - 计算惩罚与等级
    Judgment,
    /// 兑换期 - 唯一允许用代币兑换奖品的阶段
    Redeem,
    /// 履约期 - 线下领取实物
    Fulfillment,
}

impl SystemPhase {
    /// 按循环顺序排列的全部阶段
    pub const ALL: [SystemPhase; 4] = [
        Self::Accumulation,
        Self::Judgment,
        Self::Redeem,
        Self::Fulfillment,
    ];

    /// 循环中的序号
    pub fn ordinal(self) -> u8 {
        match self {
            Self::Accumulation => 0,
            Self::Judgment => 1,
            Self::Redeem => 2,
            Self::Fulfillment => 3,
        }
    }

    /// 循环中的下一个阶段
    pub fn next(self) -> Self {
        match self {
            Self::Accumulation => Self::Judgment,
            Self::Judgment => Self::Redeem,
            Self::Redeem => Self::Fulfillment,
            Self::Fulfillment => Self::Accumulation,
        }
    }

    /// 循环中的上一个阶段
    pub fn previous(self) -> Self {
        match self {
            Self::Accumulation => Self::Fulfillment,
            Self::Judgment => Self::Accumulation,
            Self::Redeem => Self::Judgment,
            Self::Fulfillment => Self::Redeem,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Accumulation => "ACCUMULATION",
            Self::Judgment => "JUDGMENT",
            Self::Redeem => "REDEEM",
            Self::Fulfillment => "FULFILLMENT",
        }
    }

    /// 阶段说明（面向管理员和会员展示）
    pub fn description(self) -> &'static str {
        match self {
            Self::Accumulation => "Routine sprint activity upload. Redemption Locked.",
            Self::Judgment => "Calculating penalties and grades. System maintenance.",
            Self::Redeem => "Redemption period OPEN. Book your rewards now.",
            Self::Fulfillment => "Physical handover of goods. Bring ID.",
        }
    }
}

impl fmt::Display for SystemPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 阶段名称解析失败
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("未知的计划阶段: {0}")]
pub struct UnknownPhase(pub String);

impl FromStr for SystemPhase {
    type Err = UnknownPhase;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase();
        Self::ALL
            .into_iter()
            .find(|phase| phase.as_str() == normalized)
            .ok_or_else(|| UnknownPhase(s.to_string()))
    }
}

/// 账本流水类型
///
/// 正数变动为入账，负数变动为扣减
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntryKind {
    /// 获取（+）- 冲刺活动换算
    Earn,
    /// 消费（-）- 兑换奖品
    Spend,
    /// 惩罚（-）- 不活跃清零或降级扣减
    Penalty,
    /// 调整（±）- 管理员手工调整、期初余额
    Adjustment,
}

impl EntryKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Earn => "EARN",
            Self::Spend => "SPEND",
            Self::Penalty => "PENALTY",
            Self::Adjustment => "ADJUSTMENT",
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
