use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 檢查種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CheckKind {
    /// 資料集是否兩端都存在
    Presence,
    RowCount,
    ColumnCount,
    Grouped,
}

impl fmt::Display for CheckKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CheckKind::Presence => "presence",
            CheckKind::RowCount => "row count",
            CheckKind::ColumnCount => "column count",
            CheckKind::Grouped => "grouped data",
        };
        f.write_str(name)
    }
}

/// 檢查狀態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CheckStatus {
    Passed,
    /// 發現資料差異
    Failed,
    /// 檢查本身無法完成（例如缺少分組欄位）
    Errored,
    Skipped,
}

/// 各檢查附帶的細節
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CheckDetail {
    None,
    RowDifference {
        /// 原始筆數減入庫筆數
        difference: i64,
        raw_only: Vec<String>,
        ingested_only: Vec<String>,
    },
    ColumnMismatch {
        raw_columns: Vec<String>,
        ingested_columns: Vec<String>,
    },
    /// 欄數相同時依位置對齊，列出名稱不同的位置 (原始, 入庫)
    ColumnsAligned {
        renamed: Vec<(String, String)>,
    },
    GroupDifferences {
        groups: Vec<String>,
        table: String,
    },
}

/// 單一資料集的單項檢查結果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckOutcome {
    pub dataset: String,
    pub check: CheckKind,
    pub status: CheckStatus,
    pub message: String,
    pub detail: CheckDetail,
}

impl CheckOutcome {
    pub fn passed(dataset: &str, check: CheckKind, message: impl Into<String>) -> Self {
        Self::new(dataset, check, CheckStatus::Passed, message)
    }

    pub fn failed(dataset: &str, check: CheckKind, message: impl Into<String>) -> Self {
        Self::new(dataset, check, CheckStatus::Failed, message)
    }

    pub fn errored(dataset: &str, check: CheckKind, message: impl Into<String>) -> Self {
        Self::new(dataset, check, CheckStatus::Errored, message)
    }

    pub fn skipped(dataset: &str, check: CheckKind, message: impl Into<String>) -> Self {
        Self::new(dataset, check, CheckStatus::Skipped, message)
    }

    fn new(dataset: &str, check: CheckKind, status: CheckStatus, message: impl Into<String>) -> Self {
        Self {
            dataset: dataset.to_string(),
            check,
            status,
            message: message.into(),
            detail: CheckDetail::None,
        }
    }

    pub fn with_detail(mut self, detail: CheckDetail) -> Self {
        self.detail = detail;
        self
    }

    /// 是否為需要人工檢查的結果
    pub fn is_finding(&self) -> bool {
        matches!(self.status, CheckStatus::Failed | CheckStatus::Errored)
    }
}

/// 一次對帳執行的報告
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconciliationReport {
    /// 開始時間
    pub start_time: DateTime<Utc>,
    /// 結束時間
    pub end_time: DateTime<Utc>,
    pub outcomes: Vec<CheckOutcome>,
}

impl Default for ReconciliationReport {
    fn default() -> Self {
        Self::new()
    }
}

impl ReconciliationReport {
    /// 創建新的報告
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            start_time: now,
            end_time: now,
            outcomes: Vec::new(),
        }
    }

    /// 完成報告
    pub fn finish(mut self) -> Self {
        self.end_time = Utc::now();
        self
    }

    pub fn push(&mut self, outcome: CheckOutcome) {
        self.outcomes.push(outcome);
    }

    /// 指定資料集的所有結果
    pub fn for_dataset<'a>(&'a self, dataset: &'a str) -> impl Iterator<Item = &'a CheckOutcome> + 'a {
        self.outcomes.iter().filter(move |o| o.dataset == dataset)
    }

    /// 查找指定資料集的指定檢查
    pub fn find(&self, dataset: &str, check: CheckKind) -> Option<&CheckOutcome> {
        self.outcomes
            .iter()
            .find(|o| o.dataset == dataset && o.check == check)
    }

    pub fn count(&self, status: CheckStatus) -> usize {
        self.outcomes.iter().filter(|o| o.status == status).count()
    }

    /// 所有需要人工檢查的結果
    pub fn findings(&self) -> impl Iterator<Item = &CheckOutcome> {
        self.outcomes.iter().filter(|o| o.is_finding())
    }

    pub fn has_findings(&self) -> bool {
        self.findings().next().is_some()
    }

    /// 獲取處理時間（秒）
    pub fn processing_time(&self) -> f64 {
        (self.end_time - self.start_time).num_milliseconds() as f64 / 1000.0
    }
}

/// 報告格式化器
pub struct ReportFormatter;

impl ReportFormatter {
    /// 格式化為人類可讀的文字
    pub fn format_text(report: &ReconciliationReport) -> String {
        let mut output = String::new();

        output.push_str("=== Reconciliation summary ===\n");
        output.push_str(&format!(
            "Started: {}\n",
            report.start_time.format("%Y-%m-%d %H:%M:%S")
        ));
        output.push_str(&format!("Duration: {:.2} s\n", report.processing_time()));
        output.push_str(&format!(
            "Checks: {} passed, {} failed, {} errored, {} skipped\n",
            report.count(CheckStatus::Passed),
            report.count(CheckStatus::Failed),
            report.count(CheckStatus::Errored),
            report.count(CheckStatus::Skipped),
        ));

        let findings: Vec<&CheckOutcome> = report.findings().collect();
        if !findings.is_empty() {
            output.push_str("Findings:\n");
            for outcome in findings {
                output.push_str(&format!(
                    "  [{:?}] {} / {}: {}\n",
                    outcome.status, outcome.dataset, outcome.check, outcome.message
                ));
            }
        }

        output
    }

    /// 格式化為JSON
    pub fn format_json(report: &ReconciliationReport) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(report)
    }
}
