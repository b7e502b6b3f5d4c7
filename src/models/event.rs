use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::batch::{Batch, PriorityKey};

/// 事件类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    /// 工位开始处理一次领取
    Started,
    /// 最后一道工序完成
    Finished,
}

/// 对外可观察的流水线事件
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineEvent {
    pub kind: EventKind,
    pub stage: String,
    /// 工位编号
    pub slot: usize,
    pub card_id: u64,
    pub order_seq: usize,
    pub order_id: i64,
    pub priority: PriorityKey,
    pub quantity: u64,
}

impl PipelineEvent {
    pub fn new(kind: EventKind, stage: &str, slot: usize, batch: &Batch) -> Self {
        Self {
            kind,
            stage: stage.to_string(),
            slot,
            card_id: batch.card_id,
            order_seq: batch.order_seq(),
            order_id: batch.order_id,
            priority: batch.priority,
            quantity: batch.quantity,
        }
    }
}

impl fmt::Display for PipelineEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = match self.kind {
            EventKind::Started => "开始",
            EventKind::Finished => "完成",
        };
        write!(
            f,
            "{} {} #{}: {} 个卡片 {} | 优先级 {} | 订单 {}",
            verb, self.stage, self.slot, self.quantity, self.card_id, self.priority, self.order_id
        )
    }
}
