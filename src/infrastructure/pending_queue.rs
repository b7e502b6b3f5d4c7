//! 待处理队列 - 基础设施层
//!
//! 每道工序一个，按优先级键升序保存等待工位的批次

use std::collections::VecDeque;

use crate::models::Batch;

/// 一次领取的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Claim {
    /// 被领取的部分，数量即本次处理的数量
    pub batch: Batch,
    /// 拆分后留在队首的剩余数量；整批领取时为 `None`
    pub remainder: Option<u64>,
}

impl Claim {
    pub fn units(&self) -> u64 {
        self.batch.quantity
    }
}

/// `merge_or_insert` 的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    /// 合并进已有批次，附带合并后的数量
    Merged { quantity: u64 },
    /// 作为新批次插入，附带插入位置
    Inserted { position: usize },
}

/// 待处理队列
///
/// 职责：
/// - 始终按优先级键升序排列
/// - 数量为 0 的批次不会留在队列中
/// - 同一 (card_id, order_seq) 的批次只存在一份
///
/// 本身不做同步，由持有者负责加锁。
#[derive(Debug, Default)]
pub struct PendingQueue {
    batches: VecDeque<Batch>,
    peak_depth: usize,
}

impl PendingQueue {
    /// 创建空队列
    pub fn new() -> Self {
        Self::default()
    }

    /// 批量放入初始批次，然后整体排序一次
    ///
    /// 只用于初始投放，不合并相同的条目。
    pub fn push_sorted(&mut self, batches: impl IntoIterator<Item = Batch>) {
        self.batches
            .extend(batches.into_iter().filter(|b| b.quantity > 0));
        // 稳定排序：相同优先级保持投放顺序
        self.batches.make_contiguous().sort_by_key(|b| b.priority);
        self.track_depth();
    }

    /// 取出优先级最高的批次
    pub fn pop_head(&mut self) -> Option<Batch> {
        self.batches.pop_front()
    }

    /// 把批次放回队首
    ///
    /// 用于拆分后的剩余部分：它刚从队首取出，仍是优先级最高的。
    pub fn push_head(&mut self, batch: Batch) {
        debug_assert!(batch.quantity > 0);
        self.batches.push_front(batch);
        self.track_depth();
    }

    /// 合并或插入
    ///
    /// 已存在同一 (card_id, order_seq) 的条目时只累加数量，其键不变所以无需重排；
    /// 否则按优先级键插入。完成顺序是任意的，不能假设到达顺序就是优先级顺序。
    pub fn merge_or_insert(&mut self, batch: Batch) -> MergeOutcome {
        debug_assert!(batch.quantity > 0);

        if let Some(existing) = self.batches.iter_mut().find(|b| b.same_item(&batch)) {
            existing.quantity += batch.quantity;
            return MergeOutcome::Merged {
                quantity: existing.quantity,
            };
        }

        // 等价于追加后稳定排序：插在所有键不大于它的条目之后
        let position = self.batches.partition_point(|b| b.priority <= batch.priority);
        self.batches.insert(position, batch);
        self.track_depth();
        MergeOutcome::Inserted { position }
    }

    /// 领取队首批次，最多 `capacity` 个单位
    ///
    /// 超出容量时拆出 `capacity` 个单位，剩余部分立刻回到队首，
    /// 整个过程在一次调用内完成，其他工位看不到中间状态。
    pub fn claim(&mut self, capacity: u64) -> Option<Claim> {
        debug_assert!(capacity > 0);
        let mut head = self.pop_head()?;

        if head.quantity > capacity {
            let taken = head.split_off(capacity);
            let remainder = head.quantity;
            self.push_head(head);
            Some(Claim {
                batch: taken,
                remainder: Some(remainder),
            })
        } else {
            Some(Claim {
                batch: head,
                remainder: None,
            })
        }
    }

    pub fn peek_head(&self) -> Option<&Batch> {
        self.batches.front()
    }

    pub fn len(&self) -> usize {
        self.batches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }

    /// 队列中的总单位数
    pub fn total_units(&self) -> u64 {
        self.batches.iter().map(|b| b.quantity).sum()
    }

    /// 历史最大深度（队列不设上限，只做记录）
    pub fn peak_depth(&self) -> usize {
        self.peak_depth
    }

    pub fn iter(&self) -> impl Iterator<Item = &Batch> {
        self.batches.iter()
    }

    /// 是否按优先级键有序
    pub fn is_sorted(&self) -> bool {
        self.batches
            .iter()
            .zip(self.batches.iter().skip(1))
            .all(|(a, b)| a.priority <= b.priority)
    }

    fn track_depth(&mut self) {
        self.peak_depth = self.peak_depth.max(self.batches.len());
    }
}
