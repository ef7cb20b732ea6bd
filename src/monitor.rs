//! 監控模組：日誌輸出設定

pub mod logger;

pub use logger::{init_logging, LogLineFormat, TIMESTAMP_FORMAT};
