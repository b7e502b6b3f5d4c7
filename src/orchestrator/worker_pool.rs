//! 工位池 - 编排层
//!
//! 每道工序一个工位池，工位数量固定。
//! 每个工位是一个独立的任务，循环执行：领取 → 处理 → 推进 → 领取 ...
//! 队列为空时在该工序的唤醒信号上等待，而不是反复轮询。

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error};

use crate::orchestrator::coordinator::Coordinator;
use crate::workflow::{ClaimCtx, ClaimFlow, SlotOutcome};

/// 单道工序的工位池
pub struct WorkerPool {
    stage_name: String,
    handles: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// 为某道工序启动 `worker_count` 个工位
    ///
    /// 同时处于忙碌状态的领取数不会超过工位数。
    pub fn spawn(
        coordinator: Arc<Coordinator>,
        stage_index: usize,
        shutdown_rx: watch::Receiver<bool>,
    ) -> Self {
        let spec = coordinator.stage_spec(stage_index).clone();

        let handles = (0..spec.worker_count)
            .map(|slot| {
                let ctx = ClaimCtx::new(stage_index, spec.id.clone(), slot);
                let flow = ClaimFlow::new(Arc::clone(&coordinator));
                let shutdown_rx = shutdown_rx.clone();
                tokio::spawn(run_slot(flow, ctx, shutdown_rx))
            })
            .collect();

        debug!("工序 {} 启动 {} 个工位", spec.id, spec.worker_count);

        Self {
            stage_name: spec.id,
            handles,
        }
    }

    pub fn stage_name(&self) -> &str {
        &self.stage_name
    }

    pub fn worker_count(&self) -> usize {
        self.handles.len()
    }

    /// 等待所有工位退出（需先发出停止信号）
    pub async fn join(self) {
        let results = futures::future::join_all(self.handles).await;
        for result in results {
            if let Err(e) = result {
                error!("工序 {} 的工位任务异常退出: {}", self.stage_name, e);
            }
        }
    }
}

/// 单个工位的循环
async fn run_slot(flow: ClaimFlow, ctx: ClaimCtx, mut shutdown_rx: watch::Receiver<bool>) {
    loop {
        if *shutdown_rx.borrow() {
            break;
        }

        match flow.run(&ctx).await {
            SlotOutcome::Processed { .. } => continue,
            SlotOutcome::Idle => {
                tokio::select! {
                    _ = flow.coordinator().work_available(ctx.stage_index) => {}
                    changed = shutdown_rx.changed() => {
                        if changed.is_err() {
                            break;
                        }
                    }
                }
            }
        }
    }

    debug!("{} 停止", ctx);
}
