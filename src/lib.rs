// 模組定義
pub mod config;
pub mod data_ingestion;
pub mod monitor;
pub mod reconcile;
pub mod storage;
