/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    /// 订单输入文件
    pub input_file: String,
    /// 流水线设置文件（TOML），不存在时使用默认设置
    pub settings_file: String,
    /// 进度日志文件
    pub output_log_file: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_file: "input.json".to_string(),
            settings_file: "settings.toml".to_string(),
            output_log_file: "output.txt".to_string(),
            verbose_logging: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            input_file: std::env::var("INPUT_FILE").unwrap_or(default.input_file),
            settings_file: std::env::var("SETTINGS_FILE").unwrap_or(default.settings_file),
            output_log_file: std::env::var("OUTPUT_LOG_FILE").unwrap_or(default.output_log_file),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
        }
    }
}
