//! 儲存層：報表資料庫連線與查詢

pub mod database;

pub use database::{init_reporting_pool, rows_to_frame, DatabaseError, DatabaseResult, ReportingDatabase};
