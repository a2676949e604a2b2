//! 奖品与领取时段模型

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 未提供图片时使用的占位图
pub const PLACEHOLDER_IMAGE: &str = "https://via.placeholder.com/300";

/// 奖品
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reward {
    pub id: String,
    pub name: String,
    /// 兑换所需代币，恒为正数
    pub cost: i64,
    pub image: String,
    pub stock: u32,
}

impl Reward {
    pub fn has_stock(&self) -> bool {
        self.stock > 0
    }

    /// 库存是否低于预警阈值
    pub fn is_low_stock(&self, threshold: u32) -> bool {
        self.stock < threshold
    }

    /// 扣减一件库存，调用方必须已确认 `has_stock()`
    pub(crate) fn take_one(&mut self) {
        debug_assert!(self.stock > 0);
        self.stock -= 1;
    }
}

/// 新增奖品请求
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReward {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    pub cost: i64,
    pub stock: u32,
    #[serde(default)]
    pub image: Option<String>,
}

impl NewReward {
    pub fn new(name: impl Into<String>, cost: i64, stock: u32) -> Self {
        Self {
            id: None,
            name: name.into(),
            cost,
            stock,
            image: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    pub(crate) fn into_reward(self) -> Reward {
        Reward {
            id: self
                .id
                .unwrap_or_else(|| format!("r-{}", Uuid::new_v4().simple())),
            name: self.name,
            cost: self.cost,
            image: self
                .image
                .filter(|image| !image.trim().is_empty())
                .unwrap_or_else(|| PLACEHOLDER_IMAGE.to_string()),
            stock: self.stock,
        }
    }
}

/// 领取时段
///
/// 不变量：`booked <= quota`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PickupSlot {
    pub id: String,
    pub datetime: NaiveDateTime,
    pub quota: u32,
    pub booked: u32,
}

impl PickupSlot {
    pub fn has_capacity(&self) -> bool {
        self.booked < self.quota
    }

    pub fn remaining(&self) -> u32 {
        self.quota.saturating_sub(self.booked)
    }

    /// 占用一个名额，调用方必须已确认 `has_capacity()`
    pub(crate) fn occupy(&mut self) {
        debug_assert!(self.booked < self.quota);
        self.booked += 1;
    }
}

/// 新增领取时段请求
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSlot {
    #[serde(default)]
    pub id: Option<String>,
    pub datetime: NaiveDateTime,
    pub quota: u32,
    #[serde(default)]
    pub booked: u32,
}

impl NewSlot {
    pub fn new(datetime: NaiveDateTime, quota: u32) -> Self {
        Self {
            id: None,
            datetime,
            quota,
            booked: 0,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_booked(mut self, booked: u32) -> Self {
        self.booked = booked;
        self
    }

    pub(crate) fn into_slot(self) -> PickupSlot {
        PickupSlot {
            id: self
                .id
                .unwrap_or_else(|| format!("s-{}", Uuid::new_v4().simple())),
            datetime: self.datetime,
            quota: self.quota,
            booked: self.booked,
        }
    }
}
