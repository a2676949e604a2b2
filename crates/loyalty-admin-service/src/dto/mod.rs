//! 管理后台 DTO 模块
//!
//! 包含所有请求和响应的数据传输对象

pub mod request;
pub mod response;

pub use request::{
    AdviceQuery, CreateMemberRequest, CreateRewardRequest, CreateSlotRequest, HistoryQuery,
    LowStockQuery, RedeemRewardRequest, ReplaceImageRequest, SetPhaseRequest, SprintReportItem,
    SprintUploadRequest, UpdateStockRequest,
};
pub use response::{ApiResponse, HealthDto, MemberDetailDto, PhaseChangeDto};
