//! 流水线设置
//!
//! 对应 settings.toml，结构为工序列表加上三张按工序名索引的表：
//!
//! ```toml
//! stages = ["paper", "cut", "assemble", "glue", "pack"]
//! first_stage = "paper"
//!
//! [times]
//! paper = 20
//! ```

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::models::stage::{StageSequence, StageSpec};

/// 流水线设置（未校验）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineSettings {
    /// 按顺序排列的工序
    pub stages: Vec<String>,
    /// 首道工序
    pub first_stage: String,
    /// 每单位处理时间（毫秒）
    #[serde(default)]
    pub times: BTreeMap<String, u64>,
    /// 工位数量
    #[serde(default)]
    pub counts: BTreeMap<String, usize>,
    /// 单个工位单次容量
    #[serde(default)]
    pub capacities: BTreeMap<String, u64>,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        let stages = ["paper", "cut", "assemble", "glue", "pack"];
        let table = |values: [u64; 5]| -> BTreeMap<String, u64> {
            stages
                .iter()
                .zip(values)
                .map(|(s, v)| (s.to_string(), v))
                .collect()
        };

        Self {
            stages: stages.iter().map(|s| s.to_string()).collect(),
            first_stage: "paper".to_string(),
            times: table([20, 70, 40, 15, 30]),
            counts: stages.iter().map(|s| (s.to_string(), 3)).collect(),
            capacities: table([40, 60, 45, 55, 25]),
        }
    }
}

impl PipelineSettings {
    /// 校验设置并构建工序序列
    pub fn build_sequence(&self) -> Result<StageSequence, ConfigError> {
        let leading = self.stages.first().ok_or(ConfigError::EmptyPipeline)?;

        let mut seen = HashSet::new();
        for stage in &self.stages {
            if !seen.insert(stage.as_str()) {
                return Err(ConfigError::DuplicateStage {
                    stage: stage.clone(),
                });
            }
        }

        if !seen.contains(self.first_stage.as_str()) {
            return Err(ConfigError::UnknownFirstStage {
                stage: self.first_stage.clone(),
            });
        }
        if &self.first_stage != leading {
            return Err(ConfigError::FirstStageNotLeading {
                stage: self.first_stage.clone(),
                leading: leading.clone(),
            });
        }

        check_known(&seen, self.times.keys(), "times")?;
        check_known(&seen, self.counts.keys(), "counts")?;
        check_known(&seen, self.capacities.keys(), "capacities")?;

        let mut specs = Vec::with_capacity(self.stages.len());
        for stage in &self.stages {
            let missing = |setting| ConfigError::MissingSetting {
                stage: stage.clone(),
                setting,
            };
            let time = *self.times.get(stage).ok_or_else(|| missing("times"))?;
            let count = *self.counts.get(stage).ok_or_else(|| missing("counts"))?;
            let capacity = *self
                .capacities
                .get(stage)
                .ok_or_else(|| missing("capacities"))?;

            if capacity == 0 {
                return Err(ConfigError::ZeroCapacity {
                    stage: stage.clone(),
                });
            }
            if count == 0 {
                return Err(ConfigError::ZeroWorkers {
                    stage: stage.clone(),
                });
            }

            specs.push(StageSpec {
                id: stage.clone(),
                processing_time_per_unit: time,
                worker_capacity: capacity,
                worker_count: count,
            });
        }

        Ok(StageSequence::new(specs))
    }
}

fn check_known<'a>(
    declared: &HashSet<&str>,
    keys: impl Iterator<Item = &'a String>,
    table: &'static str,
) -> Result<(), ConfigError> {
    for key in keys {
        if !declared.contains(key.as_str()) {
            return Err(ConfigError::UnknownStage {
                stage: key.clone(),
                table,
            });
        }
    }
    Ok(())
}
