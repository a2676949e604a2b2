//! 忠诚度引擎
//!
//! 会员通过上传冲刺活动获得代币，在 REDEEM 阶段用代币兑换实物奖品并预约领取时段。
//! 不活跃的会员会在裁决阶段被清零或降级。
//!
//! ## 模块结构
//!
//! - `models`: 领域模型（会员、流水、奖品、时段、枚举）
//! - `store`: 行级加锁的内存表
//! - `ledger`: 代币账本，余额的唯一修改入口
//! - `inactivity`: 不活跃计数器
//! - `phase`: 计划阶段状态机与运行上下文
//! - `judgment`: 批量裁决
//! - `catalog`: 奖品目录与批量导入
//! - `slots`: 领取时段预约
//! - `service`: 兑换与活动导入
//! - `advisory`: 兑换建议
//! - `seed`: 演示数据
//!
//! 引擎核心是同步的：每个操作在返回前完成全部校验与写入，不涉及外部 I/O。

pub mod advisory;
pub mod catalog;
pub mod error;
pub mod inactivity;
pub mod judgment;
pub mod ledger;
pub mod models;
pub mod phase;
pub mod seed;
pub mod service;
pub mod slots;
pub mod store;

use std::sync::Arc;

use loyalty_shared::config::ProgramConfig;
use tracing::{info, instrument};

pub use advisory::{Advice, Advisor, AdvisoryService, SprintPlan, SprintPlanner, sprints_needed};
pub use catalog::{ImportReport, RewardCatalog};
pub use error::{LoyaltyError, Result};
pub use inactivity::{InactivityCounters, InactivityTracker};
pub use judgment::{BatchJudgmentEngine, JudgmentOutcome, JudgmentSummary};
pub use ledger::TokenLedger;
pub use models::*;
pub use phase::{PhaseStateMachine, PhaseView, ProgramContext};
pub use service::{
    ActivityIngestionService, ActivityReport, IngestionBatch, IngestionReport, MemberSummary,
    RedeemRequest, RedemptionCoordinator, RedemptionPreview, RedemptionReceipt,
};
pub use slots::SlotBookingService;
pub use store::LoyaltyStore;

/// 每次冲刺折算的默认代币数
pub const DEFAULT_SPRINT_RATE: i64 = 20;
/// 默认低库存预警阈值
pub const DEFAULT_LOW_STOCK_THRESHOLD: u32 = 3;

/// 引擎门面
///
/// 持有共享存储与运行上下文，并把它们分发给各个服务
pub struct LoyaltyEngine {
    context: ProgramContext,
    store: LoyaltyStore,
    ledger: TokenLedger,
    inactivity: InactivityTracker,
    judgment: BatchJudgmentEngine,
    catalog: RewardCatalog,
    slots: SlotBookingService,
    redemption: RedemptionCoordinator,
    ingestion: ActivityIngestionService,
    advisory: AdvisoryService,
}

impl Default for LoyaltyEngine {
    fn default() -> Self {
        Self::new(ProgramContext::default())
    }
}

impl LoyaltyEngine {
    /// 使用默认建议方创建引擎
    pub fn new(context: ProgramContext) -> Self {
        Self::with_advisor(context, Arc::new(SprintPlanner))
    }

    pub fn with_advisor(context: ProgramContext, advisor: Arc<dyn Advisor>) -> Self {
        let store = LoyaltyStore::new();
        let catalog = RewardCatalog::new(Arc::clone(&store.rewards));
        let slots = SlotBookingService::new(Arc::clone(&store.slots));

        Self {
            ledger: TokenLedger::new(Arc::clone(&store.members)),
            inactivity: InactivityTracker::new(Arc::clone(&store.members)),
            judgment: BatchJudgmentEngine::new(Arc::clone(&store.members)),
            redemption: RedemptionCoordinator::new(
                context.clone(),
                Arc::clone(&store.members),
                catalog.clone(),
                slots.clone(),
            ),
            ingestion: ActivityIngestionService::new(context.clone(), Arc::clone(&store.members)),
            advisory: AdvisoryService::new(
                Arc::clone(&store.members),
                catalog.clone(),
                context.sprint_rate,
                advisor,
            ),
            catalog,
            slots,
            context,
            store,
        }
    }

    /// 按配置创建引擎，需要时载入演示数据
    pub fn from_config(config: &ProgramConfig) -> Result<Self> {
        let engine = Self::new(ProgramContext::from_config(config)?);
        if config.seed_demo_data {
            seed::load_demo_data(&engine)?;
        }
        Ok(engine)
    }

    pub fn context(&self) -> &ProgramContext {
        &self.context
    }

    pub fn phase(&self) -> &PhaseStateMachine {
        &self.context.phase
    }

    pub fn ledger(&self) -> &TokenLedger {
        &self.ledger
    }

    pub fn inactivity(&self) -> &InactivityTracker {
        &self.inactivity
    }

    pub fn judgment(&self) -> &BatchJudgmentEngine {
        &self.judgment
    }

    pub fn catalog(&self) -> &RewardCatalog {
        &self.catalog
    }

    pub fn slots(&self) -> &SlotBookingService {
        &self.slots
    }

    pub fn redemption(&self) -> &RedemptionCoordinator {
        &self.redemption
    }

    pub fn ingestion(&self) -> &ActivityIngestionService {
        &self.ingestion
    }

    pub fn advisory(&self) -> &AdvisoryService {
        &self.advisory
    }

    /// 新会员入会
    ///
    /// 期初余额大于 0 时记一笔 ADJUSTMENT 流水，保证余额与流水一致
    #[instrument(skip(self, request), fields(name = %request.name))]
    pub fn enroll(&self, request: NewMember) -> Result<Member> {
        if request.name.trim().is_empty() || request.email.trim().is_empty() {
            return Err(LoyaltyError::Validation("会员姓名和邮箱不能为空".to_string()));
        }
        if request.opening_balance < 0 {
            return Err(LoyaltyError::InvalidAmount {
                amount: request.opening_balance,
            });
        }

        let opening_balance = request.opening_balance;
        let mut member = request.into_member();
        if self.store.members.contains(&member.id) {
            return Err(LoyaltyError::AlreadyExists {
                entity: "member",
                id: member.id,
            });
        }
        if opening_balance > 0 {
            TokenLedger::adjust_locked(&mut member, opening_balance, "Opening balance")?;
        }

        if !self.store.members.insert(member.clone()) {
            return Err(LoyaltyError::AlreadyExists {
                entity: "member",
                id: member.id,
            });
        }

        info!(member_id = %member.id, grade = %member.grade, tokens = member.tokens, "会员已入会");
        Ok(member)
    }

    /// 会员完整快照（含流水）
    pub fn member(&self, member_id: &str) -> Result<Member> {
        self.store
            .members
            .get(member_id)
            .ok_or_else(|| LoyaltyError::MemberNotFound(member_id.to_string()))
    }

    /// 全部会员概览
    pub fn members(&self) -> Vec<MemberSummary> {
        self.store
            .members
            .list()
            .iter()
            .map(MemberSummary::from)
            .collect()
    }

    /// 按配置阈值列出低库存奖品
    pub fn low_stock(&self) -> Vec<Reward> {
        self.catalog.low_stock(self.context.low_stock_threshold)
    }
}
