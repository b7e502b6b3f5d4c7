use serde::{Deserialize, Serialize};
use std::fmt;

/// 优先级键：(订单序号, 订单内优先级)，按字典序比较
///
/// 第 i 个订单的所有批次都排在第 i+1 个订单之前；
/// 同一订单内，优先级数值越小越先处理。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PriorityKey {
    /// 订单在输入中的序号（从 0 开始）
    pub order_seq: usize,
    /// 订单内优先级
    pub intra: i64,
}

impl PriorityKey {
    pub fn new(order_seq: usize, intra: i64) -> Self {
        Self { order_seq, intra }
    }
}

impl fmt::Display for PriorityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.order_seq, self.intra)
    }
}

/// 批次：某个订单中某种卡片的一定数量
///
/// 拆分和合并都不会改变批次的身份 (card_id, order_seq, priority)，
/// 只有数量会变化。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Batch {
    /// 卡片ID
    pub card_id: u64,
    /// 订单号（仅用于展示）
    pub order_id: i64,
    /// 剩余数量，存在期间始终大于 0
    pub quantity: u64,
    /// 优先级键
    pub priority: PriorityKey,
}

impl Batch {
    /// 创建新的批次
    pub fn new(card_id: u64, order_id: i64, quantity: u64, priority: PriorityKey) -> Self {
        Self {
            card_id,
            order_id,
            quantity,
            priority,
        }
    }

    /// 来源订单的序号
    pub fn order_seq(&self) -> usize {
        self.priority.order_seq
    }

    /// 是否为同一订单的同一种卡片（合并键）
    pub fn same_item(&self, other: &Batch) -> bool {
        self.card_id == other.card_id && self.order_seq() == other.order_seq()
    }

    /// 从本批次中拆出 `units` 个单位，返回拆出的部分
    ///
    /// 调用方保证 `0 < units < self.quantity`，拆分后两部分数量都为正。
    pub fn split_off(&mut self, units: u64) -> Batch {
        debug_assert!(units > 0 && units < self.quantity);
        self.quantity -= units;
        Batch {
            quantity: units,
            ..self.clone()
        }
    }
}

impl fmt::Display for Batch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "卡片 {} x{} (订单 {}, 优先级 {})",
            self.card_id, self.quantity, self.order_id, self.priority
        )
    }
}
