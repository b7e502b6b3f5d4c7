//! 进度报告服务 - 业务能力层
//!
//! 只负责"把事件写成人能读的进度"，不参与调度

use std::collections::BTreeMap;

use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;
use tracing::info;

use crate::error::{AppError, AppResult};
use crate::models::{EventKind, PipelineEvent};

/// 一次运行的汇总
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// 每道工序的领取次数
    pub claims_per_stage: BTreeMap<String, usize>,
    /// 每个 (order_seq, card_id) 在最后一道工序完成的数量
    pub finished_units: BTreeMap<(usize, u64), u64>,
}

impl RunSummary {
    /// 记录一个事件
    pub fn record(&mut self, event: &PipelineEvent) {
        match event.kind {
            EventKind::Started => {
                *self.claims_per_stage.entry(event.stage.clone()).or_default() += 1;
            }
            EventKind::Finished => {
                *self
                    .finished_units
                    .entry((event.order_seq, event.card_id))
                    .or_default() += event.quantity;
            }
        }
    }

    /// 完成的总单位数
    pub fn finished_total(&self) -> u64 {
        self.finished_units.values().sum()
    }

    /// 某个订单某种卡片完成的数量
    pub fn finished_for(&self, order_seq: usize, card_id: u64) -> u64 {
        self.finished_units
            .get(&(order_seq, card_id))
            .copied()
            .unwrap_or(0)
    }

    pub fn total_claims(&self) -> usize {
        self.claims_per_stage.values().sum()
    }
}

/// 进度报告服务
///
/// 职责：
/// - 创建进度日志文件（覆盖旧内容）并写入表头
/// - 消费事件通道，直到所有发送端关闭
/// - 每个事件输出一条日志，并追加到进度日志文件
/// - 汇总 `RunSummary`
pub struct ProgressReporter {
    log_file_path: String,
}

impl ProgressReporter {
    /// 创建新的进度报告服务
    pub fn new(log_file_path: impl Into<String>) -> Self {
        Self {
            log_file_path: log_file_path.into(),
        }
    }

    /// 消费事件直到通道关闭
    pub async fn run(
        self,
        mut events: mpsc::UnboundedReceiver<PipelineEvent>,
    ) -> AppResult<RunSummary> {
        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&self.log_file_path)
            .await
            .map_err(|e| AppError::file_write_failed(&self.log_file_path, e))?;

        let header = format!(
            "{}\n流水线进度日志 - {}\n{}\n\n",
            "=".repeat(60),
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
            "=".repeat(60)
        );
        file.write_all(header.as_bytes())
            .await
            .map_err(|e| AppError::file_write_failed(&self.log_file_path, e))?;

        let mut summary = RunSummary::default();

        while let Some(event) = events.recv().await {
            summary.record(&event);

            match event.kind {
                EventKind::Started => info!("▶ {}", event),
                EventKind::Finished => info!("✅ {}", event),
            }

            let line = format!(
                "{} {}\n",
                chrono::Local::now().format("%H:%M:%S%.3f"),
                event
            );
            file.write_all(line.as_bytes())
                .await
                .map_err(|e| AppError::file_write_failed(&self.log_file_path, e))?;
        }

        file.flush()
            .await
            .map_err(|e| AppError::file_write_failed(&self.log_file_path, e))?;

        Ok(summary)
    }
}
