//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责工位调度和运行生命周期，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `coordinator` - 调度协调器
//! - 唯一持有所有工序的待处理队列、唤醒信号和计数
//! - 领取/拆分/回队首在一个锁内完成
//! - 推进时合并或插入下一道工序的队列
//!
//! ### `worker_pool` - 工位池
//! - 每道工序固定数量的工位任务
//! - 空闲时等待唤醒信号，收到停止信号后退出
//!
//! ### `pipeline` - 流水线
//! - 启动所有工位池，统一发出停止信号
//!
//! ### `pipeline_runner` - 应用入口
//! - 加载设置和订单、调整工位数、运行、输出统计
//!
//! ## 层次关系
//!
//! ```text
//! pipeline_runner (App)
//!     ↓
//! pipeline (Vec<WorkerPool>)
//!     ↓
//! worker_pool (每个工位一个任务)
//!     ↓
//! workflow::ClaimFlow (领取 → 处理 → 推进)
//!     ↓
//! coordinator → infrastructure::PendingQueue
//! ```

pub mod coordinator;
pub mod pipeline;
pub mod pipeline_runner;
pub mod worker_pool;

// 重新导出主要类型
pub use coordinator::{Coordinator, StageSnapshot};
pub use pipeline::Pipeline;
pub use pipeline_runner::App;
pub use worker_pool::WorkerPool;
