//! 领取处理流程 - 流程层
//!
//! 核心职责：定义工位"一次领取"的完整流程
//!
//! 流程顺序：
//! 1. 领取（整批或按容量拆分）
//! 2. 处理（耗时 = 每单位时间 × 领取数量）
//! 3. 推进（合并进下一道工序，或在最后一道工序报告完成）
//!
//! 一旦领取成功，这次处理必定完成并推进，不存在失败路径。

use std::sync::Arc;

use tracing::debug;

use crate::orchestrator::Coordinator;
use crate::workflow::claim_ctx::ClaimCtx;

/// 一次流程的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotOutcome {
    /// 处理了若干单位
    Processed { units: u64 },
    /// 队列为空，工位保持空闲
    Idle,
}

/// 领取处理流程
///
/// - 不持有队列，只通过协调器访问
/// - 不关心循环与唤醒，由工位池负责
pub struct ClaimFlow {
    coordinator: Arc<Coordinator>,
}

impl ClaimFlow {
    /// 创建新的领取处理流程
    pub fn new(coordinator: Arc<Coordinator>) -> Self {
        Self { coordinator }
    }

    pub fn coordinator(&self) -> &Arc<Coordinator> {
        &self.coordinator
    }

    pub async fn run(&self, ctx: &ClaimCtx) -> SlotOutcome {
        // ========== 1. 领取 ==========
        let Some(claim) = self.coordinator.claim(ctx.stage_index, ctx.slot).await else {
            return SlotOutcome::Idle;
        };
        let units = claim.units();

        // ========== 2. 处理 ==========
        let delay = self.coordinator.processing_delay(ctx.stage_index, units);
        debug!("{} 处理 {} ({:?})", ctx, claim.batch, delay);
        tokio::time::sleep(delay).await;

        // ========== 3. 推进 ==========
        self.coordinator
            .advance(ctx.stage_index, ctx.slot, claim.batch)
            .await;

        SlotOutcome::Processed { units }
    }
}
