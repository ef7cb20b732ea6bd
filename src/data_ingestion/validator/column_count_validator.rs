//! 欄數與欄名驗證

use super::report::{CheckDetail, CheckKind, CheckOutcome};
use polars::prelude::*;

fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect()
}

/// 比較欄數；欄數相同時將原始資料的欄名依位置改為入庫欄名
///
/// 後續的分組驗證以入庫端的標準欄名引用欄位，所以需要對齊。
/// 名稱原本就不同的位置會列在結果細節中，不會被靜默覆蓋。
pub fn validate_column_counts(
    mut raw: DataFrame,
    ingested: &DataFrame,
    dataset: &str,
) -> (DataFrame, CheckOutcome) {
    let raw_columns = column_names(&raw);
    let ingested_columns = column_names(ingested);

    if raw_columns.len() != ingested_columns.len() {
        let outcome = CheckOutcome::failed(
            dataset,
            CheckKind::ColumnCount,
            format!(
                "Column count mismatch for {}. Raw columns: {:?}; Ingested columns: {:?}",
                dataset, raw_columns, ingested_columns
            ),
        )
        .with_detail(CheckDetail::ColumnMismatch {
            raw_columns,
            ingested_columns,
        });
        return (raw, outcome);
    }

    let renamed: Vec<(String, String)> = raw_columns
        .into_iter()
        .zip(ingested_columns.iter().cloned())
        .filter(|(raw_name, ingested_name)| raw_name != ingested_name)
        .collect();

    if let Err(err) = raw.set_column_names(ingested_columns) {
        let outcome = CheckOutcome::errored(
            dataset,
            CheckKind::ColumnCount,
            format!("Failed to align column names for {}: {}", dataset, err),
        );
        return (raw, outcome);
    }

    let outcome = CheckOutcome::passed(
        dataset,
        CheckKind::ColumnCount,
        format!("Column count for {} matches between raw and ingested data.", dataset),
    )
    .with_detail(CheckDetail::ColumnsAligned { renamed });

    (raw, outcome)
}
