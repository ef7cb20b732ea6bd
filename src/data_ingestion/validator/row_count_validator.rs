//! 筆數驗證
//!
//! 筆數不同時以整列比對找出範例差異列。比對為整列精確相等（值與型別都須相同），
//! 因此 `"100"` 與 `100` 會被視為不同列；這不是以鍵值為基礎的比對。

use super::report::{CheckDetail, CheckKind, CheckOutcome};
use polars::prelude::*;
use std::collections::HashSet;

/// 每個方向最多列出的範例差異列數
pub const EXAMPLE_ROW_LIMIT: usize = 5;

const KEY_SEPARATOR: char = '\u{1f}';

/// 以每格的值與型別組成整列鍵值
fn row_keys(df: &DataFrame) -> PolarsResult<Vec<String>> {
    let columns = df.get_columns();
    (0..df.height())
        .map(|row| {
            let cells = columns
                .iter()
                .map(|column| column.get(row).map(|value| format!("{:?}", value)))
                .collect::<PolarsResult<Vec<_>>>()?;
            Ok(cells.join(&KEY_SEPARATOR.to_string()))
        })
        .collect()
}

/// 可讀的整列表示
fn render_row(df: &DataFrame, row: usize) -> PolarsResult<String> {
    let cells = df
        .get_columns()
        .iter()
        .map(|column| column.get(row).map(|value| value.to_string()))
        .collect::<PolarsResult<Vec<_>>>()?;
    Ok(format!("({})", cells.join(", ")))
}

/// `left` 中整列不存在於 `right` 的前幾列
fn rows_missing_from(left: &DataFrame, right: &DataFrame) -> PolarsResult<Vec<String>> {
    let right_keys: HashSet<String> = row_keys(right)?.into_iter().collect();

    let mut examples = Vec::new();
    for (row, key) in row_keys(left)?.iter().enumerate() {
        if examples.len() == EXAMPLE_ROW_LIMIT {
            break;
        }
        if !right_keys.contains(key) {
            examples.push(render_row(left, row)?);
        }
    }
    Ok(examples)
}

/// 比較原始與入庫資料的筆數
pub fn validate_row_counts(raw: &DataFrame, ingested: &DataFrame, dataset: &str) -> CheckOutcome {
    if raw.height() == ingested.height() {
        return CheckOutcome::passed(
            dataset,
            CheckKind::RowCount,
            format!("Row count for {} matches between raw and ingested data.", dataset),
        );
    }

    let difference = raw.height() as i64 - ingested.height() as i64;
    let message = format!("Row count mismatch for {}. Difference: {}", dataset, difference);

    let examples = rows_missing_from(raw, ingested)
        .and_then(|raw_only| Ok((raw_only, rows_missing_from(ingested, raw)?)));

    match examples {
        Ok((raw_only, ingested_only)) => CheckOutcome::failed(dataset, CheckKind::RowCount, message)
            .with_detail(CheckDetail::RowDifference {
                difference,
                raw_only,
                ingested_only,
            }),
        Err(err) => CheckOutcome::failed(
            dataset,
            CheckKind::RowCount,
            format!("{} (example rows unavailable: {})", message, err),
        )
        .with_detail(CheckDetail::RowDifference {
            difference,
            raw_only: Vec::new(),
            ingested_only: Vec::new(),
        }),
    }
}
