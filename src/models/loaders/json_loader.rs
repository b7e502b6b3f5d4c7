use std::path::Path;

use tokio::fs;

use crate::error::{AppError, AppResult, FileError};
use crate::models::order::OrderRecord;

/// 解析订单 JSON 文本
///
/// `source_name` 只用于错误信息。
pub fn parse_orders(content: &str, source_name: &str) -> AppResult<Vec<OrderRecord>> {
    serde_json::from_str(content).map_err(|e| AppError::malformed_input(source_name, e))
}

/// 从文件加载订单列表
pub async fn load_orders(path: &Path) -> AppResult<Vec<OrderRecord>> {
    let path_str = path.display().to_string();

    if !fs::try_exists(path).await.unwrap_or(false) {
        return Err(FileError::NotFound { path: path_str }.into());
    }

    let content = fs::read_to_string(path)
        .await
        .map_err(|e| AppError::file_read_failed(&path_str, e))?;

    let orders = parse_orders(&content, &path_str)?;
    tracing::info!("成功加载 {} 个订单: {}", orders.len(), path_str);

    Ok(orders)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::InputError;
    use tokio_test::{assert_err, assert_ok};

    #[test]
    fn test_parse_orders() {
        let json = r#"[
            { "order": 1, "rows": [
                { "cardid": 101, "quantity": 120, "priority": 2 },
                { "cardid": 102, "quantity": 15, "priority": 1 }
            ] },
            { "order": 2, "rows": [] }
        ]"#;

        let orders = assert_ok!(parse_orders(json, "inline"));
        assert_eq!(orders.len(), 2);
        assert_eq!(orders[0].rows[0].cardid, 101);
        assert_eq!(orders[0].rows[1].priority, 1);
        assert!(orders[1].rows.is_empty());
    }

    #[test]
    fn test_parse_orders_missing_field() {
        let json = r#"[{ "order": 1, "rows": [{ "cardid": 101, "priority": 2 }] }]"#;
        let err = assert_err!(parse_orders(json, "inline"));
        assert!(matches!(err, AppError::Input(InputError::Malformed { .. })));
    }

    #[test]
    fn test_parse_orders_bad_card_id() {
        let json = r#"[{ "order": 1, "rows": [{ "cardid": "abc", "quantity": 1, "priority": 2 }] }]"#;
        assert_err!(parse_orders(json, "inline"));

        let json = r#"[{ "order": 1, "rows": [{ "cardid": -4, "quantity": 1, "priority": 2 }] }]"#;
        assert_err!(parse_orders(json, "inline"));
    }

    #[tokio::test]
    async fn test_load_orders_from_file() {
        let path = std::env::temp_dir().join(format!(
            "card_pipeline_orders_{}.json",
            std::process::id()
        ));
        tokio::fs::write(
            &path,
            r#"[{ "order": 5, "rows": [{ "cardid": 8, "quantity": 3, "priority": 0 }] }]"#,
        )
        .await
        .unwrap();

        let orders = assert_ok!(load_orders(&path).await);
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].order, 5);
        assert_eq!(orders[0].rows[0].quantity, 3);

        let _ = tokio::fs::remove_file(&path).await;
    }

    #[tokio::test]
    async fn test_load_orders_missing_file() {
        let result = load_orders(Path::new("definitely/not/here/input.json")).await;
        assert!(matches!(
            result,
            Err(AppError::File(FileError::NotFound { .. }))
        ));
    }
}
