//! 工序定义与工序序列

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// 单道工序的设置（启动后不可变）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageSpec {
    /// 工序名称
    pub id: String,
    /// 每个单位的处理时间（毫秒）
    pub processing_time_per_unit: u64,
    /// 单个工位一次最多领取的数量
    pub worker_capacity: u64,
    /// 工位数量
    pub worker_count: usize,
}

impl StageSpec {
    /// 处理 `units` 个单位所需的时间，与数量成正比
    pub fn processing_delay(&self, units: u64) -> Duration {
        Duration::from_millis(self.processing_time_per_unit.saturating_mul(units))
    }
}

/// 有序的工序序列
///
/// 只能通过 `PipelineSettings::build_sequence` 构建，
/// 因此工序名唯一、容量与工位数均大于 0。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageSequence {
    stages: Vec<StageSpec>,
}

impl StageSequence {
    pub(crate) fn new(stages: Vec<StageSpec>) -> Self {
        Self { stages }
    }

    /// 首道工序
    pub fn first(&self) -> &StageSpec {
        &self.stages[0]
    }

    pub fn stages(&self) -> &[StageSpec] {
        &self.stages
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&StageSpec> {
        self.stages.get(index)
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.stages.iter().position(|s| s.id == id)
    }

    /// 下一道工序的下标；最后一道工序返回 `None`
    pub fn next_index(&self, index: usize) -> Option<usize> {
        let next = index + 1;
        (next < self.stages.len()).then_some(next)
    }

    /// 下一道工序的名称；最后一道工序或未知工序返回 `None`
    pub fn next_stage(&self, id: &str) -> Option<&str> {
        self.index_of(id)
            .and_then(|i| self.next_index(i))
            .map(|i| self.stages[i].id.as_str())
    }

    /// 保证每道工序的工位足以一次吸收最大的单行数量
    ///
    /// 工位数调整为 `max(工位数, ceil(max_row_quantity / 容量))`，
    /// 返回调整后的 (工序, 工位数) 列表。
    pub fn ensure_row_capacity(&mut self, max_row_quantity: u64) -> Vec<(String, usize)> {
        self.stages
            .iter_mut()
            .map(|stage| {
                let needed = max_row_quantity.div_ceil(stage.worker_capacity) as usize;
                stage.worker_count = stage.worker_count.max(needed);
                (stage.id.clone(), stage.worker_count)
            })
            .collect()
    }
}
