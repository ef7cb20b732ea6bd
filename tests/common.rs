#![allow(dead_code)]

use polars::prelude::*;
use qa_report::data_ingestion::DatasetMap;
use std::path::{Path, PathBuf};

/// 在暫存目錄寫入 latin1 編碼的 CSV
pub fn write_latin1_csv(dir: &Path, name: &str, content: &str) -> PathBuf {
    let (bytes, _, unmappable) = encoding_rs::WINDOWS_1252.encode(content);
    assert!(!unmappable, "fixture must be representable in latin1");

    let path = dir.join(format!("{}.csv", name));
    std::fs::write(&path, bytes).expect("failed to write fixture");
    path
}

/// 以 (分組, 金額) 建立資料集
pub fn dated_amounts(field: &str, rows: &[(&str, f64)]) -> DataFrame {
    let dates: Vec<&str> = rows.iter().map(|(date, _)| *date).collect();
    let amounts: Vec<f64> = rows.iter().map(|(_, amount)| *amount).collect();

    DataFrame::new(vec![
        Series::new("date_field".into(), dates).into_column(),
        Series::new(field.into(), amounts).into_column(),
    ])
    .expect("valid frame")
}

/// 在資料集前加上入庫中繼欄位
pub fn with_metadata(df: DataFrame) -> DataFrame {
    let height = df.height();
    let ids: Vec<i64> = (1..=height as i64).collect();
    let stamps: Vec<&str> = vec!["2024-06-01 00:00:00"; height];

    let mut columns = vec![
        Series::new("id".into(), ids).into_column(),
        Series::new("createdAt".into(), stamps.clone()).into_column(),
    ];
    columns.extend(df.get_columns().iter().cloned());
    columns.push(Series::new("updatedAt".into(), stamps).into_column());

    DataFrame::new(columns).expect("valid frame")
}

pub fn datasets(entries: Vec<(&str, DataFrame)>) -> DatasetMap {
    entries
        .into_iter()
        .map(|(name, df)| (name.to_string(), df))
        .collect()
}
