//! 调度协调器 - 编排层
//!
//! ## 职责
//!
//! 唯一持有所有工序状态的对象，显式传给每个工位：
//!
//! 1. **队列**：每道工序一个 `PendingQueue`，由互斥锁保护
//! 2. **唤醒**：每道工序一个"有活可干"信号，空闲工位在此等待
//! 3. **计数**：忙碌工位数、峰值、领取次数、领取单位数
//! 4. **事件**：开始/完成事件按发生顺序发往事件通道
//! 5. **完工检测**：最后一道工序完成的单位数等于投放总数时置位

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch, Mutex, Notify};
use tracing::debug;

use crate::infrastructure::{Claim, MergeOutcome, PendingQueue};
use crate::models::{Batch, EventKind, PipelineEvent, StageSequence, StageSpec};

/// 单道工序的运行状态
struct StageState {
    spec: StageSpec,
    next: Option<usize>,
    queue: Mutex<PendingQueue>,
    work_available: Notify,
    busy: AtomicUsize,
    peak_busy: AtomicUsize,
    claims: AtomicU64,
    units_claimed: AtomicU64,
}

impl StageState {
    fn new(spec: StageSpec, next: Option<usize>) -> Self {
        Self {
            spec,
            next,
            queue: Mutex::new(PendingQueue::new()),
            work_available: Notify::new(),
            busy: AtomicUsize::new(0),
            peak_busy: AtomicUsize::new(0),
            claims: AtomicU64::new(0),
            units_claimed: AtomicU64::new(0),
        }
    }
}

/// 某道工序在某一时刻的统计快照
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageSnapshot {
    pub stage: String,
    pub worker_count: usize,
    pub busy: usize,
    pub peak_busy: usize,
    pub claims: u64,
    pub units_claimed: u64,
    pub queue_depth: usize,
    pub queued_units: u64,
    pub peak_queue_depth: usize,
}

/// 调度协调器
pub struct Coordinator {
    stages: Vec<StageState>,
    events: mpsc::UnboundedSender<PipelineEvent>,
    total_units: AtomicU64,
    finished_units: AtomicU64,
    drained: watch::Sender<bool>,
}

impl Coordinator {
    /// 创建协调器，同时返回事件接收端
    pub fn new(sequence: StageSequence) -> (Arc<Self>, mpsc::UnboundedReceiver<PipelineEvent>) {
        let (events, events_rx) = mpsc::unbounded_channel();
        let (drained, _) = watch::channel(false);

        let stages = sequence
            .stages()
            .iter()
            .enumerate()
            .map(|(index, spec)| StageState::new(spec.clone(), sequence.next_index(index)))
            .collect();

        let coordinator = Self {
            stages,
            events,
            total_units: AtomicU64::new(0),
            finished_units: AtomicU64::new(0),
            drained,
        };

        (Arc::new(coordinator), events_rx)
    }

    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    pub fn stage_spec(&self, stage: usize) -> &StageSpec {
        &self.stages[stage].spec
    }

    /// 把初始批次投放到首道工序，整体排序一次
    ///
    /// 批次应来自 `flatten_orders`，其总数量已校验不会溢出。
    pub async fn seed(&self, batches: Vec<Batch>) {
        let units = batches
            .iter()
            .fold(0u64, |acc, b| acc.saturating_add(b.quantity));
        let count = batches.len();

        let first = &self.stages[0];
        {
            let mut queue = first.queue.lock().await;
            queue.push_sorted(batches);
        }
        let total = self.total_units.fetch_add(units, Ordering::SeqCst) + units;

        debug!(
            "投放 {} 个批次 ({} 个单位) 到工序 {}",
            count, units, first.spec.id
        );

        if total == self.finished_units.load(Ordering::SeqCst) {
            self.drained.send_replace(true);
        }
        first.work_available.notify_one();
    }

    /// 工位领取一次
    ///
    /// 出队、拆分、剩余部分回到队首在同一个锁内完成。
    /// 开始事件也在锁内发送，因此事件顺序就是领取顺序。
    pub async fn claim(&self, stage: usize, slot: usize) -> Option<Claim> {
        let state = &self.stages[stage];
        let mut queue = state.queue.lock().await;

        let claim = queue.claim(state.spec.worker_capacity)?;

        let busy = state.busy.fetch_add(1, Ordering::SeqCst) + 1;
        state.peak_busy.fetch_max(busy, Ordering::SeqCst);
        state.claims.fetch_add(1, Ordering::Relaxed);
        state
            .units_claimed
            .fetch_add(claim.units(), Ordering::Relaxed);

        if let Some(remainder) = claim.remainder {
            debug!(
                "{} #{} 拆分: 领取 {} 个, 剩余 {} 个回到队首",
                state.spec.id,
                slot,
                claim.units(),
                remainder
            );
        }

        let _ = self.events.send(PipelineEvent::new(
            EventKind::Started,
            &state.spec.id,
            slot,
            &claim.batch,
        ));

        // 队列里还有活，把唤醒传给下一个空闲工位
        if !queue.is_empty() {
            state.work_available.notify_one();
        }

        Some(claim)
    }

    /// 处理 `units` 个单位的耗时
    pub fn processing_delay(&self, stage: usize, units: u64) -> Duration {
        self.stages[stage].spec.processing_delay(units)
    }

    /// 处理完成后推进到下一道工序
    ///
    /// 有下一道工序时合并或插入其队列；最后一道工序则记录完成事件。
    pub async fn advance(&self, stage: usize, slot: usize, batch: Batch) {
        let state = &self.stages[stage];
        state.busy.fetch_sub(1, Ordering::SeqCst);

        match state.next {
            Some(next) => {
                let next_state = &self.stages[next];
                let outcome = {
                    let mut queue = next_state.queue.lock().await;
                    queue.merge_or_insert(batch)
                };
                if let MergeOutcome::Merged { quantity } = outcome {
                    debug!("{} 合并相同批次, 合并后数量 {}", next_state.spec.id, quantity);
                }
                next_state.work_available.notify_one();
            }
            None => {
                let units = batch.quantity;
                let _ = self.events.send(PipelineEvent::new(
                    EventKind::Finished,
                    &state.spec.id,
                    slot,
                    &batch,
                ));

                let finished = self.finished_units.fetch_add(units, Ordering::SeqCst) + units;
                if finished == self.total_units.load(Ordering::SeqCst) {
                    self.drained.send_replace(true);
                }
            }
        }
    }

    /// 等待工位的唤醒信号
    pub(crate) async fn work_available(&self, stage: usize) {
        self.stages[stage].work_available.notified().await;
    }

    /// 等待所有投放的单位都通过最后一道工序
    pub async fn wait_drained(&self) {
        let mut rx = self.drained.subscribe();
        let _ = rx.wait_for(|drained| *drained).await;
    }

    pub fn is_drained(&self) -> bool {
        *self.drained.borrow()
    }

    pub fn total_units(&self) -> u64 {
        self.total_units.load(Ordering::SeqCst)
    }

    pub fn finished_units(&self) -> u64 {
        self.finished_units.load(Ordering::SeqCst)
    }

    /// 读取某道工序的统计快照
    pub async fn stage_snapshot(&self, stage: usize) -> StageSnapshot {
        let state = &self.stages[stage];
        let queue = state.queue.lock().await;

        StageSnapshot {
            stage: state.spec.id.clone(),
            worker_count: state.spec.worker_count,
            busy: state.busy.load(Ordering::SeqCst),
            peak_busy: state.peak_busy.load(Ordering::SeqCst),
            claims: state.claims.load(Ordering::Relaxed),
            units_claimed: state.units_claimed.load(Ordering::Relaxed),
            queue_depth: queue.len(),
            queued_units: queue.total_units(),
            peak_queue_depth: queue.peak_depth(),
        }
    }

    /// 所有工序的统计快照
    pub async fn snapshots(&self) -> Vec<StageSnapshot> {
        let mut snapshots = Vec::with_capacity(self.stages.len());
        for stage in 0..self.stages.len() {
            snapshots.push(self.stage_snapshot(stage).await);
        }
        snapshots
    }
}
