//! 奖品目录：上架、库存维护与批量导入

pub mod import;
mod service;

pub use service::{ImportReport, RejectedRow, RewardCatalog};
