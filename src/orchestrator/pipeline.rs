//! 流水线：所有工序的工位池加上停止信号

use std::sync::Arc;

use tokio::sync::watch;
use tracing::info;

use crate::orchestrator::coordinator::Coordinator;
use crate::orchestrator::worker_pool::WorkerPool;

/// 运行中的流水线
///
/// 工位在收到停止信号之前一直待命，队列空了也不会退出。
pub struct Pipeline {
    coordinator: Arc<Coordinator>,
    pools: Vec<WorkerPool>,
    shutdown_tx: watch::Sender<bool>,
}

impl Pipeline {
    /// 为每道工序启动工位池
    pub fn start(coordinator: Arc<Coordinator>) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let pools = (0..coordinator.stage_count())
            .map(|stage| WorkerPool::spawn(Arc::clone(&coordinator), stage, shutdown_rx.clone()))
            .collect::<Vec<_>>();

        info!(
            "流水线已启动: {}",
            pools
                .iter()
                .map(|p| format!("{} x{}", p.stage_name(), p.worker_count()))
                .collect::<Vec<_>>()
                .join(" → ")
        );

        Self {
            coordinator,
            pools,
            shutdown_tx,
        }
    }

    pub fn coordinator(&self) -> &Arc<Coordinator> {
        &self.coordinator
    }

    /// 等待全部单位完成，然后停止
    pub async fn run_until_drained(self) {
        self.coordinator.wait_drained().await;
        self.shutdown().await;
    }

    /// 发出停止信号并等待所有工位退出
    ///
    /// 正在处理中的领取会先完成并推进。
    pub async fn shutdown(self) {
        self.shutdown_tx.send_replace(true);
        futures::future::join_all(self.pools.into_iter().map(WorkerPool::join)).await;
        info!("流水线已停止");
    }
}
