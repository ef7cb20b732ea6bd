//! 資料清理工具
//!
//! 欄名正規化、數值欄位強制轉型，以及移除入庫時附加的中繼欄位。
//! 所有函式都以值傳遞 `DataFrame` 並返回處理後的結果，由呼叫端串接。

use crate::data_ingestion::DatasetMap;
use once_cell::sync::Lazy;
use polars::prelude::*;
use std::collections::HashSet;
use thiserror::Error;
use tracing::warn;

/// latin1 解碼 UTF-8 BOM 後殘留的字元
const ENCODING_ARTIFACT: char = 'ï';

/// 欄名允許字元以外的字元：文字字元、空白、`/`、`-`
static INVALID_NAME_CHARS: Lazy<regex::Regex> =
    Lazy::new(|| regex::Regex::new(r"[^\w\s/\-]").expect("column name pattern is valid"));

/// 清理錯誤
#[derive(Error, Debug)]
pub enum CleanError {
    #[error("缺少欄位: {0}")]
    MissingColumn(String),

    #[error("Polars 錯誤: {0}")]
    PolarsError(#[from] PolarsError),
}

/// 正規化單一欄名
pub fn normalize_column_name(name: &str) -> String {
    let stripped = name.trim().replace(ENCODING_ARTIFACT, "");
    INVALID_NAME_CHARS
        .replace_all(&stripped, "")
        .trim()
        .to_string()
}

/// 清理後若有重名，後出現者加上 `_duplicated_<n>` 後綴
fn deduplicate(names: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::with_capacity(names.len());
    names
        .into_iter()
        .map(|name| {
            let mut candidate = name.clone();
            let mut n = 0;
            while seen.contains(&candidate) {
                candidate = format!("{}_duplicated_{}", name, n);
                n += 1;
            }
            seen.insert(candidate.clone());
            candidate
        })
        .collect()
}

/// 清理所有欄名
pub fn clean_column_names(mut df: DataFrame) -> DataFrame {
    let cleaned = deduplicate(
        df.get_column_names()
            .iter()
            .map(|name| normalize_column_name(name.as_str()))
            .collect(),
    );

    if let Err(err) = df.set_column_names(cleaned) {
        warn!("欄名清理失敗，保留原欄名: {}", err);
    }
    df
}

/// 解析金額文字，任何無法解析的值都視為 0
pub fn parse_amount(raw: Option<&str>) -> f64 {
    let Some(raw) = raw else {
        return 0.0;
    };

    let text = raw.replace(',', "");
    let text = text.trim();
    if text == "-" || text == "nan" {
        return 0.0;
    }

    match text.parse::<f64>() {
        Ok(value) if !value.is_nan() => value,
        _ => 0.0,
    }
}

/// 將欄位強制轉為 `Float64`，結果不含空值
pub fn clean_numeric_column(mut df: DataFrame, column: &str) -> Result<DataFrame, CleanError> {
    let text = df
        .column(column)
        .map_err(|_| CleanError::MissingColumn(column.to_string()))?
        .cast(&DataType::String)?;

    let values: Float64Chunked = text
        .str()?
        .into_iter()
        .map(|value| Some(parse_amount(value)))
        .collect();

    df.with_column(values.with_name(column.into()).into_series())?;
    Ok(df)
}

/// 移除指定欄位，不存在的欄位直接忽略
pub fn drop_unnecessary_columns(mut df: DataFrame, columns: &[&str]) -> DataFrame {
    for name in columns {
        match df.drop_in_place(name) {
            Ok(_) | Err(PolarsError::ColumnNotFound(_)) => {}
            Err(err) => warn!("無法移除欄位 {}: {}", name, err),
        }
    }
    df
}

/// 對資料集合中指定標籤的資料集移除欄位
pub fn prune_datasets(mut datasets: DatasetMap, labels: &[&str], columns: &[&str]) -> DatasetMap {
    for label in labels {
        if let Some(df) = datasets.remove(*label) {
            datasets.insert(label.to_string(), drop_unnecessary_columns(df, columns));
        }
    }
    datasets
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use proptest::prelude::*;
    use rstest::rstest;

    #[rstest]
    #[case("  Revenue  ", "Revenue")]
    #[case("ï»¿date_field", "date_field")]
    #[case("Cost (£)", "Cost")]
    #[case("Start/End-Date", "Start/End-Date")]
    #[case("Account Name!", "Account Name")]
    #[case("¿ Owner", "Owner")]
    #[case("", "")]
    fn test_normalize_column_name(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(normalize_column_name(raw), expected);
    }

    #[test]
    fn test_clean_column_names() {
        let df = df! {
            " Region " => ["Nord"],
            "ï»¿Revenue" => [10.0],
        }
        .unwrap();

        let df = clean_column_names(df);
        let names: Vec<&str> = df.get_column_names().iter().map(|n| n.as_str()).collect();
        assert_eq!(names, vec!["Region", "Revenue"]);
    }

    #[test]
    fn test_clean_column_names_on_empty_frame() {
        let df = clean_column_names(DataFrame::empty());
        assert_eq!(df.width(), 0);
    }

    #[test]
    fn test_clean_column_names_deduplicates_collisions() {
        let df = df! {
            "Cost" => [1],
            "Cost!" => [2],
        }
        .unwrap();

        let df = clean_column_names(df);
        let names: Vec<&str> = df.get_column_names().iter().map(|n| n.as_str()).collect();
        assert_eq!(names, vec!["Cost", "Cost_duplicated_0"]);
    }

    proptest! {
        #[test]
        fn prop_normalize_is_idempotent(name in "\\PC{0,24}") {
            let once = normalize_column_name(&name);
            prop_assert_eq!(normalize_column_name(&once), once.clone());
        }

        #[test]
        fn prop_parse_amount_is_total(raw in "\\PC{0,16}") {
            let value = parse_amount(Some(&raw));
            prop_assert!(!value.is_nan());
        }
    }

    #[test]
    fn test_clean_column_names_is_idempotent_on_frame() {
        let df = df! {
            " a!" => [1],
            "a" => [2],
            "ï»¿b c" => [3],
        }
        .unwrap();

        let once = clean_column_names(df);
        let twice = clean_column_names(once.clone());
        assert_eq!(once.get_column_names(), twice.get_column_names());
    }

    #[rstest]
    #[case(Some("1,234"), 1234.0)]
    #[case(Some("-"), 0.0)]
    #[case(Some("nan"), 0.0)]
    #[case(Some(""), 0.0)]
    #[case(Some("abc"), 0.0)]
    #[case(Some(" 12.5 "), 12.5)]
    #[case(Some("-3"), -3.0)]
    #[case(Some("NaN"), 0.0)]
    #[case(None, 0.0)]
    fn test_parse_amount(#[case] raw: Option<&str>, #[case] expected: f64) {
        assert_eq!(parse_amount(raw), expected);
    }

    #[test]
    fn test_clean_numeric_column() {
        let df = df! {
            "Revenue" => [Some("1,234"), Some("-"), Some("nan"), Some(""), Some("abc"), None],
        }
        .unwrap();

        let df = clean_numeric_column(df, "Revenue").unwrap();
        let column = df.column("Revenue").unwrap();
        assert_eq!(column.dtype(), &DataType::Float64);
        assert_eq!(column.null_count(), 0);

        let values: Vec<Option<f64>> = column.f64().unwrap().into_iter().collect();
        assert_eq!(
            values,
            vec![Some(1234.0), Some(0.0), Some(0.0), Some(0.0), Some(0.0), Some(0.0)]
        );
    }

    #[test]
    fn test_clean_numeric_column_from_integers() {
        let df = df! { "Cost" => [10i64, 20] }.unwrap();

        let df = clean_numeric_column(df, "Cost").unwrap();
        let values: Vec<Option<f64>> = df.column("Cost").unwrap().f64().unwrap().into_iter().collect();
        assert_eq!(values, vec![Some(10.0), Some(20.0)]);
    }

    #[test]
    fn test_clean_numeric_column_missing() {
        let df = df! { "Cost" => [1.0] }.unwrap();
        assert_matches!(
            clean_numeric_column(df, "Revenue"),
            Err(CleanError::MissingColumn(name)) if name == "Revenue"
        );
    }

    #[test]
    fn test_drop_unnecessary_columns_ignores_absent() {
        let df = df! {
            "id" => [1],
            "value" => [10],
            "createdAt" => ["2024-01-01"],
        }
        .unwrap();

        let df = drop_unnecessary_columns(df, &["id", "createdAt", "updatedAt"]);
        assert_eq!(df.width(), 1);
        assert!(df.column("value").is_ok());

        // 重複執行不應出錯
        let df = drop_unnecessary_columns(df, &["id", "createdAt", "updatedAt"]);
        assert_eq!(df.width(), 1);
    }

    #[test]
    fn test_drop_unnecessary_columns_keeps_order_of_remaining() {
        let df = df! {
            "id" => [1, 2],
            "date_field" => ["2024-01", "2024-02"],
            "updatedAt" => ["x", "y"],
            "Revenue" => [10.0, 20.0],
        }
        .unwrap();

        // 同一欄位列出兩次，第二次視為不存在
        let df = drop_unnecessary_columns(df, &["id", "updatedAt", "id"]);
        let names: Vec<&str> = df.get_column_names().iter().map(|name| name.as_str()).collect();
        assert_eq!(names, vec!["date_field", "Revenue"]);
        assert_eq!(df.height(), 2);
    }

    #[test]
    fn test_prune_datasets_only_touches_listed_labels() {
        let mut datasets = DatasetMap::new();
        datasets.insert("budget".to_string(), df! { "id" => [1], "Budget" => [5] }.unwrap());
        datasets.insert("jira".to_string(), df! { "id" => [1], "Key" => ["QA-1"] }.unwrap());

        let datasets = prune_datasets(datasets, &["budget", "costs"], &["id"]);
        assert_eq!(datasets["budget"].width(), 1);
        assert_eq!(datasets["jira"].width(), 2);
        assert!(!datasets.contains_key("costs"));
    }
}
