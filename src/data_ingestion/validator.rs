//! 資料驗證器模組
//!
//! 比較同一資料集的原始與入庫兩個版本。每個驗證器都返回 `CheckOutcome`，
//! 不直接寫日誌，由呼叫端收集成 `ReconciliationReport`。
//!
//! # 主要功能
//!
//! - **筆數驗證**：筆數差異與整列範例
//! - **欄數驗證**：欄數比較與欄名對齊
//! - **分組驗證**：分組合計在容忍值內是否一致
//!
//! # 使用範例
//!
//! ```rust,ignore
//! use qa_report::data_ingestion::validator::{validate_grouped_data, GroupedCheck};
//!
//! let check = GroupedCheck::new("date_field", &["Revenue"]).with_tolerance(1.0);
//! let outcome = validate_grouped_data(&raw, &ingested, "revenue", &check);
//! ```

pub mod column_count_validator;
pub mod grouped_validator;
pub mod report;
pub mod row_count_validator;

// 重新導出常用類型
pub use column_count_validator::validate_column_counts;
pub use grouped_validator::{validate_grouped_data, GroupedCheck, DEFAULT_TOLERANCE, ROW_COUNT_COLUMN};
pub use report::{
    CheckDetail, CheckKind, CheckOutcome, CheckStatus, ReconciliationReport, ReportFormatter,
};
pub use row_count_validator::{validate_row_counts, EXAMPLE_ROW_LIMIT};
