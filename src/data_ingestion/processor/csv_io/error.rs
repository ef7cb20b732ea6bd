//! CSV 處理錯誤定義

use std::path::PathBuf;
use thiserror::Error;

/// CSV 處理錯誤類型
#[derive(Error, Debug)]
pub enum CsvError {
    #[error("檔案讀取錯誤: {path}: {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("不支援的文字編碼: {0}")]
    UnknownEncoding(String),

    #[error("Polars 錯誤: {0}")]
    PolarsError(#[from] polars::error::PolarsError),
}

/// CSV 處理結果類型
pub type CsvResult<T> = Result<T, CsvError>;
