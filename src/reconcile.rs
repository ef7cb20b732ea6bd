//! 對帳流程
//!
//! 載入 → 清理欄名 → 移除入庫中繼欄位 → 筆數與欄數驗證 → 分組驗證。
//! `reconcile` 不做任何 I/O，所有結果收集在報告中，最後由 `log_report` 統一輸出。

use crate::config::AppConfig;
use crate::data_ingestion::processor::{
    clean_column_names, clean_numeric_column, prune_datasets, CleanError, DataLoader,
};
use crate::data_ingestion::validator::{
    validate_column_counts, validate_grouped_data, validate_row_counts, CheckDetail, CheckKind,
    CheckOutcome, CheckStatus, GroupedCheck, ReconciliationReport, ReportFormatter,
    DEFAULT_TOLERANCE,
};
use crate::data_ingestion::DatasetMap;
use crate::storage::ReportingDatabase;
use anyhow::{Context, Result};
use polars::prelude::DataFrame;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::{debug, error, info, warn};

/// 分組驗證使用的分組欄位
pub const GROUP_FIELD: &str = "date_field";

/// 原始檔案的文字編碼
pub const RAW_ENCODING: &str = "latin1";

/// 入庫時附加的中繼欄位
pub const METADATA_COLUMNS: [&str; 3] = ["id", "createdAt", "updatedAt"];

/// 一次對帳執行的固定設定
#[derive(Debug, Clone)]
pub struct ReconciliationPlan {
    /// 資料集標籤 → 原始檔案路徑
    pub file_paths: BTreeMap<String, PathBuf>,
    pub raw_encoding: String,
    /// 資料集標籤 → 查詢語句
    pub queries: BTreeMap<String, String>,
    /// 需要移除中繼欄位的入庫資料集
    pub pruned_datasets: Vec<String>,
    pub pruned_columns: Vec<String>,
    /// 需要分組驗證的資料集
    pub grouped_checks: BTreeMap<String, GroupedCheck>,
}

impl Default for ReconciliationPlan {
    fn default() -> Self {
        let raw_datasets = ["budget", "costs", "crm", "revenue", "arr"];

        let file_paths = raw_datasets
            .iter()
            .map(|name| (name.to_string(), PathBuf::from(format!("data/raw/{}.csv", name))))
            .collect();

        let queries = [
            ("budget", "SELECT * FROM Budget"),
            ("costs", "SELECT * FROM Cost"),
            ("crm", "SELECT * FROM CRM"),
            ("revenue", "SELECT * FROM Revenue"),
            ("arr", "SELECT * FROM ARR_source"),
            ("jira", "SELECT * FROM JiraData"),
        ]
        .iter()
        .map(|(name, query)| (name.to_string(), query.to_string()))
        .collect();

        let grouped_checks = [("revenue", "Revenue"), ("costs", "Cost"), ("arr", "Revenue")]
            .iter()
            .map(|(name, field)| {
                (
                    name.to_string(),
                    GroupedCheck::new(GROUP_FIELD, &[*field]).with_tolerance(DEFAULT_TOLERANCE),
                )
            })
            .collect();

        Self {
            file_paths,
            raw_encoding: RAW_ENCODING.to_string(),
            queries,
            pruned_datasets: raw_datasets.iter().map(|s| s.to_string()).collect(),
            pruned_columns: METADATA_COLUMNS.iter().map(|s| s.to_string()).collect(),
            grouped_checks,
        }
    }
}

impl ReconciliationPlan {
    /// 將所有原始檔案路徑改為相對於指定目錄
    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        for path in self.file_paths.values_mut() {
            if let Some(file_name) = path.file_name() {
                *path = dir.join(file_name);
            }
        }
        self
    }
}

fn clean_all(datasets: DatasetMap) -> DatasetMap {
    datasets
        .into_iter()
        .map(|(name, df)| (name, clean_column_names(df)))
        .collect()
}

fn coerce_numeric_fields(mut df: DataFrame, check: &GroupedCheck) -> Result<DataFrame, CleanError> {
    for field in &check.numeric_fields {
        df = clean_numeric_column(df, field)?;
    }
    Ok(df)
}

/// 數值欄位先強制轉型，再做分組驗證；轉型失敗同樣記為錯誤結果
fn run_grouped_check(
    raw: &DataFrame,
    ingested: &DataFrame,
    dataset: &str,
    check: &GroupedCheck,
) -> CheckOutcome {
    let coerced = coerce_numeric_fields(raw.clone(), check)
        .and_then(|raw| Ok((raw, coerce_numeric_fields(ingested.clone(), check)?)));

    match coerced {
        Ok((raw, ingested)) => validate_grouped_data(&raw, &ingested, dataset, check),
        Err(err) => CheckOutcome::errored(
            dataset,
            CheckKind::Grouped,
            format!("Error validating grouped data for {}: {}", dataset, err),
        ),
    }
}

/// 對已載入的資料執行所有驗證
///
/// 只存在於入庫端的資料集（例如 jira）不驗證；只存在於原始端的資料集記為略過。
/// 單一資料集的驗證失敗不影響其他資料集。
pub fn reconcile(raw: DatasetMap, ingested: DatasetMap, plan: &ReconciliationPlan) -> ReconciliationReport {
    let mut report = ReconciliationReport::new();

    let pruned_labels: Vec<&str> = plan.pruned_datasets.iter().map(String::as_str).collect();
    let pruned_columns: Vec<&str> = plan.pruned_columns.iter().map(String::as_str).collect();

    let raw = clean_all(raw);
    let ingested = prune_datasets(clean_all(ingested), &pruned_labels, &pruned_columns);

    let mut aligned = DatasetMap::new();
    for (name, raw_df) in raw {
        let Some(ingested_df) = ingested.get(&name) else {
            report.push(CheckOutcome::skipped(
                &name,
                CheckKind::Presence,
                format!("No ingested data found for {}; skipping validation.", name),
            ));
            continue;
        };

        report.push(validate_row_counts(&raw_df, ingested_df, &name));

        let (raw_df, outcome) = validate_column_counts(raw_df, ingested_df, &name);
        report.push(outcome);
        aligned.insert(name, raw_df);
    }

    for (name, check) in &plan.grouped_checks {
        if let (Some(raw_df), Some(ingested_df)) = (aligned.get(name), ingested.get(name)) {
            report.push(run_grouped_check(raw_df, ingested_df, name, check));
        }
    }

    report.finish()
}

fn log_outcome(outcome: &CheckOutcome) {
    match outcome.status {
        CheckStatus::Passed => info!("{}", outcome.message),
        CheckStatus::Skipped => warn!("{}", outcome.message),
        CheckStatus::Failed | CheckStatus::Errored => error!("{}", outcome.message),
    }

    match &outcome.detail {
        CheckDetail::RowDifference { raw_only, ingested_only, .. } => {
            error!(
                "Example rows in raw but not in ingested for {}: {:?}",
                outcome.dataset, raw_only
            );
            error!(
                "Example rows in ingested but not in raw for {}: {:?}",
                outcome.dataset, ingested_only
            );
        }
        CheckDetail::ColumnsAligned { renamed } if !renamed.is_empty() => {
            for (raw_name, ingested_name) in renamed {
                warn!(
                    "Column name differs for {}: raw '{}' treated as ingested '{}'",
                    outcome.dataset, raw_name, ingested_name
                );
            }
        }
        _ => {}
    }
}

/// 依序輸出所有結果與摘要，DEBUG 級別另外輸出 JSON 版本
pub fn log_report(report: &ReconciliationReport) {
    for outcome in &report.outcomes {
        log_outcome(outcome);
    }
    info!("{}", ReportFormatter::format_text(report));

    match ReportFormatter::format_json(report) {
        Ok(json) => debug!("{}", json),
        Err(err) => warn!("無法輸出 JSON 摘要: {}", err),
    }
}

/// 完整執行一次對帳：連線、載入、驗證、輸出
///
/// 連線與載入失敗會直接返回錯誤；資料差異只記錄在報告中。
pub async fn run(config: &AppConfig, plan: &ReconciliationPlan) -> Result<ReconciliationReport> {
    let database = ReportingDatabase::connect(&config.database)
        .await
        .with_context(|| format!("無法連線至資料庫 {}", config.database.redacted_url()))?;

    let loader = DataLoader::with_encoding(&plan.raw_encoding).context("無法建立原始檔案讀取器")?;
    let raw = loader.load_files(&plan.file_paths).context("載入原始檔案失敗")?;
    let ingested = loader
        .load_queries(&database, &plan.queries)
        .await
        .context("載入入庫資料失敗")?;

    let report = reconcile(raw, ingested, plan);
    log_report(&report);

    Ok(report)
}
