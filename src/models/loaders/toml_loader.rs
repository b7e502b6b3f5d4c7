use std::path::Path;

use tokio::fs;

use crate::error::{AppError, AppResult, FileError};
use crate::models::settings::PipelineSettings;

/// 从 TOML 文件加载流水线设置
pub async fn load_settings(path: &Path) -> AppResult<PipelineSettings> {
    let path_str = path.display().to_string();

    let content = fs::read_to_string(path)
        .await
        .map_err(|e| AppError::file_read_failed(&path_str, e))?;

    let settings: PipelineSettings =
        toml::from_str(&content).map_err(|source| FileError::TomlParseFailed {
            path: path_str.clone(),
            source,
        })?;

    Ok(settings)
}

/// 加载流水线设置，文件不存在时使用默认设置
pub async fn load_settings_or_default(path: &Path) -> AppResult<PipelineSettings> {
    if fs::try_exists(path).await.unwrap_or(false) {
        tracing::info!("正在加载设置: {}", path.display());
        load_settings(path).await
    } else {
        tracing::info!("未找到设置文件 {}，使用默认设置", path.display());
        Ok(PipelineSettings::default())
    }
}
