use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 订单输入错误
    #[error("输入错误: {0}")]
    Input(#[from] InputError),
    /// 流水线配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
    /// 文件操作错误
    #[error("文件错误: {0}")]
    File(#[from] FileError),
}

/// 订单输入错误（调度开始前即失败，不做部分运行）
#[derive(Debug, Error)]
pub enum InputError {
    /// JSON 结构不合法：缺字段、类型错误、卡片ID格式错误等
    #[error("订单文件格式错误 ({path}): {source}")]
    Malformed {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    /// 数量必须为正数
    #[error("订单 {order} 中卡片 {card_id} 的数量 {quantity} 不是正数")]
    NonPositiveQuantity {
        order: i64,
        card_id: u64,
        quantity: i64,
    },
    /// 全部订单的总数量超出可计数范围
    #[error("订单 {order} 中卡片 {card_id} 使总数量溢出")]
    TotalQuantityOverflow { order: i64, card_id: u64 },
}

/// 流水线配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 没有声明任何工序
    #[error("工序列表为空")]
    EmptyPipeline,
    /// 工序重复声明（会形成环）
    #[error("工序 {stage} 重复声明")]
    DuplicateStage { stage: String },
    /// 首道工序不在工序列表中
    #[error("首道工序 {stage} 未在工序列表中声明")]
    UnknownFirstStage { stage: String },
    /// 首道工序不是列表中的第一个（前面的工序永远不可达）
    #[error("首道工序 {stage} 必须是工序列表的第一项 (当前第一项: {leading})")]
    FirstStageNotLeading { stage: String, leading: String },
    /// 配置表中出现未声明的工序
    #[error("{table} 中出现未声明的工序: {stage}")]
    UnknownStage { stage: String, table: &'static str },
    /// 工序缺少某项设置
    #[error("工序 {stage} 缺少设置项 {setting}")]
    MissingSetting { stage: String, setting: &'static str },
    /// 单次处理容量为 0
    #[error("工序 {stage} 的单次处理容量必须大于 0")]
    ZeroCapacity { stage: String },
    /// 工位数量为 0
    #[error("工序 {stage} 的工位数量必须大于 0")]
    ZeroWorkers { stage: String },
}

/// 文件操作错误
#[derive(Debug, Error)]
pub enum FileError {
    /// 文件不存在
    #[error("文件不存在: {path}")]
    NotFound { path: String },
    /// 读取文件失败
    #[error("读取文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 写入文件失败
    #[error("写入文件失败 ({path}): {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// TOML 解析失败
    #[error("TOML解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建文件读取错误
    pub fn file_read_failed(path: impl Into<String>, source: std::io::Error) -> Self {
        AppError::File(FileError::ReadFailed {
            path: path.into(),
            source,
        })
    }

    /// 创建文件写入错误
    pub fn file_write_failed(path: impl Into<String>, source: std::io::Error) -> Self {
        AppError::File(FileError::WriteFailed {
            path: path.into(),
            source,
        })
    }

    /// 创建订单格式错误
    pub fn malformed_input(path: impl Into<String>, source: serde_json::Error) -> Self {
        AppError::Input(InputError::Malformed {
            path: path.into(),
            source,
        })
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
