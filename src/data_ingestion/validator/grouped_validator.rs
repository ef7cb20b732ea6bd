//! 分組一致性驗證
//!
//! 以分組欄位彙總各數值欄位的合計與每組筆數，兩端以完整外部連接對齊後
//! 取差值絕對值；任一數量超過容忍值的分組即為不一致。只存在於一端的分組，
//! 另一端視為 0。分組鍵為空值的列不參與彙總。

use super::report::{CheckDetail, CheckKind, CheckOutcome};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// 預設容忍值（1 個貨幣單位）
pub const DEFAULT_TOLERANCE: f64 = 1.0;

/// 每組筆數欄位名稱
pub const ROW_COUNT_COLUMN: &str = "row_count";

/// 連接後入庫端欄位的後綴
const INGESTED_SUFFIX: &str = "_right";

/// 分組驗證設定
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupedCheck {
    pub group_field: String,
    pub numeric_fields: Vec<String>,
    pub tolerance: f64,
}

impl GroupedCheck {
    pub fn new(group_field: impl Into<String>, numeric_fields: &[&str]) -> Self {
        Self {
            group_field: group_field.into(),
            numeric_fields: numeric_fields.iter().map(|f| f.to_string()).collect(),
            tolerance: DEFAULT_TOLERANCE,
        }
    }

    /// 設置容忍值
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// 所有比較的數量欄位：各數值欄位與每組筆數
    fn quantities(&self) -> Vec<String> {
        let mut quantities = self.numeric_fields.clone();
        quantities.push(ROW_COUNT_COLUMN.to_string());
        quantities
    }

    fn aggregate(&self, df: &DataFrame) -> LazyFrame {
        let group = self.group_field.as_str();
        let mut aggregations: Vec<Expr> = self
            .numeric_fields
            .iter()
            .map(|field| {
                col(field.as_str())
                    .sum()
                    .cast(DataType::Float64)
                    .alias(field.as_str())
            })
            .collect();
        aggregations.push(len().cast(DataType::Float64).alias(ROW_COUNT_COLUMN));

        df.clone()
            .lazy()
            .with_column(col(group).cast(DataType::String))
            .filter(col(group).is_not_null())
            .group_by([col(group)])
            .agg(aggregations)
    }

    /// 計算超過容忍值的分組差異表
    ///
    /// 返回的表格包含分組欄位與各數量的差值絕對值，依分組排序。
    pub fn differences(&self, raw: &DataFrame, ingested: &DataFrame) -> PolarsResult<DataFrame> {
        let group = self.group_field.as_str();
        let quantities = self.quantities();

        let mut selection = vec![col(group)];
        selection.extend(quantities.iter().map(|quantity| {
            (col(quantity.as_str()).fill_null(lit(0.0))
                - col(format!("{}{}", quantity, INGESTED_SUFFIX)).fill_null(lit(0.0)))
            .abs()
            .alias(quantity.as_str())
        }));

        let exceeds = quantities
            .iter()
            .map(|quantity| col(quantity.as_str()).gt(lit(self.tolerance)))
            .reduce(|acc, expr| acc.or(expr))
            .unwrap_or_else(|| lit(false));

        let differences = self
            .aggregate(raw)
            .join(
                self.aggregate(ingested),
                [col(group)],
                [col(group)],
                JoinArgs::new(JoinType::Full).with_coalesce(JoinCoalesce::CoalesceColumns),
            )
            .select(selection)
            .filter(exceeds)
            .collect()?;

        differences.sort([group], SortMultipleOptions::default())
    }
}

/// 比較分組彙總結果
///
/// 彙總過程的任何錯誤（例如缺少分組欄位）都轉為 `Errored` 結果，不會向外傳播。
pub fn validate_grouped_data(
    raw: &DataFrame,
    ingested: &DataFrame,
    dataset: &str,
    check: &GroupedCheck,
) -> CheckOutcome {
    let differences = match check.differences(raw, ingested) {
        Ok(differences) => differences,
        Err(err) => {
            return CheckOutcome::errored(
                dataset,
                CheckKind::Grouped,
                format!("Error validating grouped data for {}: {}", dataset, err),
            )
        }
    };

    if differences.height() == 0 {
        return CheckOutcome::passed(
            dataset,
            CheckKind::Grouped,
            format!("Grouped data for {} matches within tolerance.", dataset),
        );
    }

    let groups: Vec<String> = differences
        .column(check.group_field.as_str())
        .and_then(|column| column.str().map(|values| {
            values
                .into_iter()
                .map(|value| value.unwrap_or("null").to_string())
                .collect()
        }))
        .unwrap_or_default();

    CheckOutcome::failed(
        dataset,
        CheckKind::Grouped,
        format!(
            "Grouped data mismatch for {}. Differences exceeding tolerance: {}",
            dataset, differences
        ),
    )
    .with_detail(CheckDetail::GroupDifferences {
        groups,
        table: differences.to_string(),
    })
}
