//! 日志工具模块
//!
//! 提供日志格式化和输出的辅助函数

use std::time::Duration;
use tracing::info;

use crate::models::StageSequence;
use crate::orchestrator::StageSnapshot;
use crate::services::RunSummary;

/// 记录程序启动信息
///
/// # 参数
/// - `sequence`: 工序序列
/// - `batches`: 初始批次数
/// - `units`: 初始总单位数
pub fn log_startup(sequence: &StageSequence, batches: usize, units: u64) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 多工位流水线模式");
    info!("📦 待处理批次: {} 个, 共 {} 个单位", batches, units);
    for stage in sequence.stages() {
        info!(
            "   {}: 每单位 {}ms, 单次容量 {}, 工位 {}",
            stage.id, stage.processing_time_per_unit, stage.worker_capacity, stage.worker_count
        );
    }
    info!("{}", "=".repeat(60));
}

/// 记录工位数调整结果
///
/// # 参数
/// - `max_row`: 最大单行数量
/// - `adjusted`: 调整后的 (工序, 工位数)
pub fn log_worker_adjustment(max_row: u64, adjusted: &[(String, usize)]) {
    info!("最大单行数量: {}; 调整后的工位数:", max_row);
    for (stage, count) in adjusted {
        info!("   {}: {}", stage, count);
    }
}

/// 打印最终统计信息
///
/// # 参数
/// - `summary`: 运行汇总
/// - `snapshots`: 各工序统计快照
/// - `elapsed`: 运行耗时
/// - `log_file_path`: 日志文件路径
pub fn print_final_stats(
    summary: &RunSummary,
    snapshots: &[StageSnapshot],
    elapsed: Duration,
    log_file_path: &str,
) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("耗时: {:.3}s", elapsed.as_secs_f64());
    info!("{}", "=".repeat(60));
    for snapshot in snapshots {
        info!(
            "{}: 领取 {} 次 / {} 个单位, 峰值忙碌 {}/{}, 峰值队列深度 {}",
            snapshot.stage,
            snapshot.claims,
            snapshot.units_claimed,
            snapshot.peak_busy,
            snapshot.worker_count,
            snapshot.peak_queue_depth
        );
    }
    info!("{}", "─".repeat(60));
    info!("✅ 完成单位: {}", summary.finished_total());
    info!("{}", "=".repeat(60));
    info!("\n日志已保存至: {}", log_file_path);
}
