//! 工位上下文
//!
//! 封装"我是哪道工序的第几个工位"这一信息

use std::fmt::Display;

/// 工位上下文
#[derive(Debug, Clone)]
pub struct ClaimCtx {
    /// 工序下标
    pub stage_index: usize,

    /// 工序名称（仅用于日志显示）
    pub stage_name: String,

    /// 工位编号（从 0 开始）
    pub slot: usize,
}

impl ClaimCtx {
    /// 创建新的工位上下文
    pub fn new(stage_index: usize, stage_name: impl Into<String>, slot: usize) -> Self {
        Self {
            stage_index,
            stage_name: stage_name.into(),
            slot,
        }
    }
}

impl Display for ClaimCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[工序 {} 工位#{}]", self.stage_name, self.slot)
    }
}
