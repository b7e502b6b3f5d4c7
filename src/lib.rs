//! # Card Pipeline
//!
//! 一个模拟多工序卡片生产流水线的 Rust 应用程序
//!
//! ## 架构设计
//!
//! 本系统采用分层架构：
//!
//! ### ① 数据层（Models）
//! - `models/` - 批次、优先级键、订单、工序、设置、事件
//! - `models/loaders` - 订单 JSON 与设置 TOML 的加载
//!
//! ### ② 基础设施层（Infrastructure）
//! - `PendingQueue` - 每道工序的待处理队列，按优先级键有序
//!
//! ### ③ 流程层（Workflow）
//! - `ClaimCtx` - 工位上下文（工序 + 工位编号）
//! - `ClaimFlow` - 一次领取的完整流程（领取 → 处理 → 推进）
//!
//! ### ④ 编排层（Orchestration）
//! - `Coordinator` - 唯一持有所有工序状态的调度协调器
//! - `WorkerPool` / `Pipeline` - 工位任务与停止信号
//! - `App` - 加载、校验、运行、统计
//!
//! ### ⑤ 服务层（Services）
//! - `ProgressReporter` - 消费事件、写进度日志、汇总结果
//!
//! ## 模块结构

pub mod config;
pub mod error;
pub mod infrastructure;
pub mod logger;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{AppError, AppResult};
pub use infrastructure::PendingQueue;
pub use models::{Batch, PipelineEvent, PipelineSettings, PriorityKey, StageSequence};
pub use orchestrator::{App, Coordinator, Pipeline};
pub use services::RunSummary;
pub use workflow::{ClaimCtx, ClaimFlow};
