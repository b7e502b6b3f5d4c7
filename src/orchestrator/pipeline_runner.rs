//! 流水线运行器 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个应用的入口，负责一次完整运行的生命周期。
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：加载设置和订单，校验失败则在调度前直接退出
//! 2. **工位调整**：保证每道工序的工位足以吸收最大的单行数量
//! 3. **投放**：把订单展开成批次，按优先级投放到首道工序
//! 4. **运行**：启动所有工位池，等待全部单位完成后停止
//! 5. **全局统计**：汇总事件和各工序计数

use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use tokio::sync::mpsc;
use tracing::warn;

use crate::config::Config;
use crate::models::{
    flatten_orders, load_orders, load_settings_or_default, max_row_quantity, Batch, StageSequence,
};
use crate::orchestrator::{Coordinator, Pipeline};
use crate::services::{ProgressReporter, RunSummary};
use crate::utils::logging::{log_startup, log_worker_adjustment, print_final_stats};

/// 应用主结构
pub struct App {
    config: Config,
    sequence: StageSequence,
    batches: Vec<Batch>,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        // 加载流水线设置并校验
        let settings = load_settings_or_default(Path::new(&config.settings_file)).await?;
        let mut sequence = settings
            .build_sequence()
            .context("流水线设置校验失败")?;

        // 加载订单并展开为批次
        let orders = load_orders(Path::new(&config.input_file)).await?;
        let batches = flatten_orders(&orders).context("订单校验失败")?;

        // 调整工位数
        let max_row = max_row_quantity(&orders);
        let adjusted = sequence.ensure_row_capacity(max_row);
        log_worker_adjustment(max_row, &adjusted);

        Ok(Self::with_batches(config, sequence, batches))
    }

    /// 直接用已校验的工序序列和批次构建应用
    pub fn with_batches(config: Config, sequence: StageSequence, batches: Vec<Batch>) -> Self {
        Self {
            config,
            sequence,
            batches,
        }
    }

    pub fn sequence(&self) -> &StageSequence {
        &self.sequence
    }

    /// 运行应用主逻辑，直到所有单位通过最后一道工序
    pub async fn run(self) -> Result<RunSummary> {
        let reporter = ProgressReporter::new(self.config.output_log_file.clone());

        if self.batches.is_empty() {
            warn!("⚠️ 没有找到待处理的订单行，程序结束");
            // 仍然生成只有表头的进度日志
            let (_, events) = mpsc::unbounded_channel();
            return Ok(reporter.run(events).await?);
        }

        let total_units = self
            .batches
            .iter()
            .fold(0u64, |acc, b| acc.saturating_add(b.quantity));
        log_startup(&self.sequence, self.batches.len(), total_units);

        let started_at = Instant::now();
        let (coordinator, events) = Coordinator::new(self.sequence.clone());
        coordinator.seed(self.batches).await;

        // 事件消费者：所有发送端（即协调器）释放后自动结束
        let reporter_handle = tokio::spawn(reporter.run(events));

        let pipeline = Pipeline::start(coordinator.clone());
        pipeline.run_until_drained().await;

        let snapshots = coordinator.snapshots().await;
        drop(coordinator);

        let summary = reporter_handle.await.context("进度报告任务异常退出")??;

        print_final_stats(
            &summary,
            &snapshots,
            started_at.elapsed(),
            &self.config.output_log_file,
        );

        Ok(summary)
    }
}
