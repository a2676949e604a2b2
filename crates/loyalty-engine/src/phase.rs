//! 计划阶段状态机与运行上下文

use std::sync::Arc;

use loyalty_shared::config::ProgramConfig;
use loyalty_shared::observability::metrics;
use parking_lot::{RwLock, RwLockReadGuard};
use serde::Serialize;
use tracing::{info, instrument};

use crate::error::{LoyaltyError, Result};
use crate::models::SystemPhase;

/// 阶段状态机
///
/// 管理员切换阶段需要写锁；兑换在整个“检查-修改”期间持有读锁，
/// 保证同一笔兑换看到的阶段不会中途改变。
#[derive(Debug, Default)]
pub struct PhaseStateMachine {
    current: RwLock<SystemPhase>,
}

/// 阶段视图
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseView {
    pub phase: SystemPhase,
    pub description: &'static str,
    pub next: SystemPhase,
    pub redemption_open: bool,
}

impl From<SystemPhase> for PhaseView {
    fn from(phase: SystemPhase) -> Self {
        Self {
            phase,
            description: phase.description(),
            next: phase.next(),
            redemption_open: phase == SystemPhase::Redeem,
        }
    }
}

impl PhaseStateMachine {
    pub fn new(initial: SystemPhase) -> Self {
        metrics::set_program_phase(f64::from(initial.ordinal()));
        Self {
            current: RwLock::new(initial),
        }
    }

    pub fn current(&self) -> SystemPhase {
        *self.current.read()
    }

    /// 当前阶段在固定循环中的下一个阶段（仅用于展示）
    pub fn next(&self) -> SystemPhase {
        self.current().next()
    }

    /// 无条件切换阶段，返回切换前的阶段
    #[instrument(skip(self))]
    pub fn set_phase(&self, phase: SystemPhase) -> SystemPhase {
        let mut current = self.current.write();
        let previous = std::mem::replace(&mut *current, phase);
        metrics::set_program_phase(f64::from(phase.ordinal()));
        info!(from = %previous, to = %phase, "计划阶段已切换");
        previous
    }

    /// 切换到循环中的下一个阶段，返回新阶段
    pub fn advance(&self) -> SystemPhase {
        let mut current = self.current.write();
        let previous = *current;
        let next = previous.next();
        *current = next;
        metrics::set_program_phase(f64::from(next.ordinal()));
        info!(from = %previous, to = %next, "计划阶段已推进");
        next
    }

    /// 校验当前阶段
    pub fn assert_phase(&self, required: SystemPhase) -> Result<()> {
        self.hold(required).map(drop)
    }

    /// 校验阶段并持有读锁，在锁释放前阶段不会被切换
    pub fn hold(&self, required: SystemPhase) -> Result<RwLockReadGuard<'_, SystemPhase>> {
        let guard = self.current.read();
        if *guard != required {
            return Err(LoyaltyError::PhaseLocked {
                required,
                current: *guard,
            });
        }
        Ok(guard)
    }
}

/// 计划运行上下文
///
/// 由进程持有并显式传递给需要阶段或计划参数的组件
#[derive(Debug, Clone)]
pub struct ProgramContext {
    pub phase: Arc<PhaseStateMachine>,
    /// 每次冲刺折算的代币数
    pub sprint_rate: i64,
    pub low_stock_threshold: u32,
}

impl Default for ProgramContext {
    fn default() -> Self {
        Self {
            phase: Arc::new(PhaseStateMachine::default()),
            sprint_rate: crate::DEFAULT_SPRINT_RATE,
            low_stock_threshold: crate::DEFAULT_LOW_STOCK_THRESHOLD,
        }
    }
}

impl ProgramContext {
    pub fn new(initial: SystemPhase) -> Self {
        Self {
            phase: Arc::new(PhaseStateMachine::new(initial)),
            ..Self::default()
        }
    }

    /// 从配置构建，阶段名无法识别或冲刺汇率非正时返回校验错误
    pub fn from_config(config: &ProgramConfig) -> Result<Self> {
        let initial: SystemPhase = config
            .initial_phase
            .parse()
            .map_err(|e: crate::models::UnknownPhase| LoyaltyError::Validation(e.to_string()))?;

        if config.sprint_rate <= 0 {
            return Err(LoyaltyError::Validation(format!(
                "sprint_rate 必须为正数: {}",
                config.sprint_rate
            )));
        }

        Ok(Self {
            phase: Arc::new(PhaseStateMachine::new(initial)),
            sprint_rate: config.sprint_rate,
            low_stock_threshold: config.low_stock_threshold,
        })
    }
}
