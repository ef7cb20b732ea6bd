use polars::prelude::DataFrame;
use std::collections::BTreeMap;

pub mod processor;
pub mod validator;

pub use processor::{
    clean_column_names, clean_numeric_column, drop_unnecessary_columns, prune_datasets, CsvReader,
    DataLoader,
};

/// 以資料集標籤為鍵的資料集合
pub type DatasetMap = BTreeMap<String, DataFrame>;
