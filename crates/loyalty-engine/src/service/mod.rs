//! 服务层
//!
//! 组合账本、计数器、目录与时段，实现跨实体的业务流程。
//!
//! ## 模块结构
//!
//! - `dto`: 数据传输对象定义
//! - `redemption_service`: 奖品兑换
//! - `ingestion`: 冲刺活动导入

pub mod dto;
pub mod ingestion;
pub mod redemption_service;

pub use dto::*;
pub use ingestion::ActivityIngestionService;
pub use redemption_service::RedemptionCoordinator;
