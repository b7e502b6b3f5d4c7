use serde::{Deserialize, Serialize};

use crate::error::InputError;
use crate::models::batch::{Batch, PriorityKey};

/// 输入订单
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderRecord {
    /// 订单号
    pub order: i64,
    pub rows: Vec<OrderRow>,
}

/// 订单中的一行
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderRow {
    pub cardid: u64,
    /// 先按有符号数读入，便于给出"非正数"的明确错误
    pub quantity: i64,
    pub priority: i64,
}

/// 将订单列表展开为批次列表，每行一个批次
///
/// 订单在输入中的位置决定 `order_seq`，行的 `priority` 作为订单内优先级。
/// 任何一行数量非正都会使整个输入失败。
/// 总数量必须能用 u64 表示，之后调度中的所有累加（合并、完成计数）都不会超过它。
pub fn flatten_orders(orders: &[OrderRecord]) -> Result<Vec<Batch>, InputError> {
    let mut batches = Vec::with_capacity(orders.iter().map(|o| o.rows.len()).sum());
    let mut total: u64 = 0;

    for (order_seq, order) in orders.iter().enumerate() {
        for row in &order.rows {
            if row.quantity <= 0 {
                return Err(InputError::NonPositiveQuantity {
                    order: order.order,
                    card_id: row.cardid,
                    quantity: row.quantity,
                });
            }
            total = total.checked_add(row.quantity as u64).ok_or(
                InputError::TotalQuantityOverflow {
                    order: order.order,
                    card_id: row.cardid,
                },
            )?;
            batches.push(Batch::new(
                row.cardid,
                order.order,
                row.quantity as u64,
                PriorityKey::new(order_seq, row.priority),
            ));
        }
    }

    Ok(batches)
}

/// 所有订单中单行的最大数量
pub fn max_row_quantity(orders: &[OrderRecord]) -> u64 {
    orders
        .iter()
        .flat_map(|o| o.rows.iter())
        .map(|r| r.quantity.max(0) as u64)
        .max()
        .unwrap_or(0)
}
