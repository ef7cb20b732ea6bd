use crate::config::DatabaseConfig;
use polars::prelude::*;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use sqlx::postgres::types::PgInterval;
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions, PgRow};
use sqlx::{Column as _, ConnectOptions, Row, TypeInfo};
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

/// 資料庫錯誤
#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("資料庫連線失敗: {0}")]
    Connection(#[source] sqlx::Error),

    #[error("無效的連線字串: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("查詢失敗 ({query}): {source}")]
    Query {
        query: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("欄位 {column} 解碼失敗: {source}")]
    Decode {
        column: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("Polars 錯誤: {0}")]
    Polars(#[from] PolarsError),
}

pub type DatabaseResult<T> = Result<T, DatabaseError>;

/// 由配置的連線字串建立連線選項
pub fn connect_options(config: &DatabaseConfig) -> DatabaseResult<PgConnectOptions> {
    let url = config.connection_url()?;
    let options = PgConnectOptions::from_url(&url).map_err(DatabaseError::Connection)?;

    Ok(options.disable_statement_logging())
}

/// 初始化報表資料庫連線（唯讀，單一連線）
pub async fn init_reporting_pool(config: &DatabaseConfig) -> DatabaseResult<PgPool> {
    let options = connect_options(config)?;

    // 所有查詢依序執行，只需要一條連線
    let pool = PgPoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .connect_with(options)
        .await
        .map_err(DatabaseError::Connection)?;

    // 測試連接
    sqlx::query("SELECT 1")
        .execute(&pool)
        .await
        .map_err(DatabaseError::Connection)?;

    Ok(pool)
}

/// 報表資料庫包裝器（唯讀）
pub struct ReportingDatabase {
    pool: PgPool,
}

impl ReportingDatabase {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 依配置建立連線
    pub async fn connect(config: &DatabaseConfig) -> DatabaseResult<Self> {
        debug!("連線至 {}", config.redacted_url());
        Ok(Self::new(init_reporting_pool(config).await?))
    }

    /// 執行唯讀查詢並轉換為 DataFrame
    pub async fn fetch_frame(&self, query: &str) -> DatabaseResult<DataFrame> {
        let rows = sqlx::query(query)
            .fetch_all(&self.pool)
            .await
            .map_err(|source| DatabaseError::Query {
                query: query.to_string(),
                source,
            })?;

        debug!("查詢 {} 返回 {} 筆", query, rows.len());
        rows_to_frame(&rows)
    }
}

/// 欄位值緩衝，依 Postgres 型別決定 Polars 型別
#[derive(Debug)]
enum ColumnBuffer {
    Int(Vec<Option<i64>>),
    Float(Vec<Option<f64>>),
    Bool(Vec<Option<bool>>),
    Text(Vec<Option<String>>),
}

/// Postgres 型別對應的欄位種類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ColumnKind {
    Int16,
    Int32,
    Int64,
    Float32,
    Float64,
    Numeric,
    Bool,
    Date,
    Timestamp,
    TimestampTz,
    Time,
    Interval,
    Uuid,
    Json,
    Text,
}

impl ColumnKind {
    /// 由 Postgres 型別名稱判斷
    pub(crate) fn from_type_name(name: &str) -> Self {
        match name {
            "INT2" => Self::Int16,
            "INT4" => Self::Int32,
            "INT8" => Self::Int64,
            "FLOAT4" => Self::Float32,
            "FLOAT8" => Self::Float64,
            "NUMERIC" => Self::Numeric,
            "BOOL" => Self::Bool,
            "DATE" => Self::Date,
            "TIMESTAMP" => Self::Timestamp,
            "TIMESTAMPTZ" => Self::TimestampTz,
            "TIME" => Self::Time,
            "INTERVAL" => Self::Interval,
            "UUID" => Self::Uuid,
            "JSON" | "JSONB" => Self::Json,
            _ => Self::Text,
        }
    }

    fn buffer(self, capacity: usize) -> ColumnBuffer {
        match self {
            Self::Int16 | Self::Int32 | Self::Int64 => ColumnBuffer::Int(Vec::with_capacity(capacity)),
            Self::Float32 | Self::Float64 | Self::Numeric => {
                ColumnBuffer::Float(Vec::with_capacity(capacity))
            }
            Self::Bool => ColumnBuffer::Bool(Vec::with_capacity(capacity)),
            Self::Date
            | Self::Timestamp
            | Self::TimestampTz
            | Self::Time
            | Self::Interval
            | Self::Uuid
            | Self::Json
            | Self::Text => ColumnBuffer::Text(Vec::with_capacity(capacity)),
        }
    }
}

impl ColumnBuffer {
    fn push(&mut self, kind: ColumnKind, row: &PgRow, index: usize) -> Result<(), sqlx::Error> {
        match (self, kind) {
            (Self::Int(values), ColumnKind::Int16) => {
                values.push(row.try_get::<Option<i16>, _>(index)?.map(i64::from))
            }
            (Self::Int(values), ColumnKind::Int32) => {
                values.push(row.try_get::<Option<i32>, _>(index)?.map(i64::from))
            }
            (Self::Int(values), _) => values.push(row.try_get::<Option<i64>, _>(index)?),
            (Self::Float(values), ColumnKind::Float32) => {
                values.push(row.try_get::<Option<f32>, _>(index)?.map(f64::from))
            }
            (Self::Float(values), ColumnKind::Numeric) => values.push(
                row.try_get::<Option<Decimal>, _>(index)?
                    .and_then(|value| value.to_f64()),
            ),
            (Self::Float(values), _) => values.push(row.try_get::<Option<f64>, _>(index)?),
            (Self::Bool(values), _) => values.push(row.try_get::<Option<bool>, _>(index)?),
            (Self::Text(values), ColumnKind::Date) => values.push(
                row.try_get::<Option<chrono::NaiveDate>, _>(index)?
                    .map(|date| date.format("%Y-%m-%d").to_string()),
            ),
            (Self::Text(values), ColumnKind::Timestamp) => values.push(
                row.try_get::<Option<chrono::NaiveDateTime>, _>(index)?
                    .map(|ts| ts.format("%Y-%m-%d %H:%M:%S").to_string()),
            ),
            (Self::Text(values), ColumnKind::TimestampTz) => values.push(
                row.try_get::<Option<chrono::DateTime<chrono::Utc>>, _>(index)?
                    .map(|ts| ts.format("%Y-%m-%d %H:%M:%S").to_string()),
            ),
            (Self::Text(values), ColumnKind::Time) => values.push(
                row.try_get::<Option<chrono::NaiveTime>, _>(index)?
                    .map(|time| time.format("%H:%M:%S").to_string()),
            ),
            (Self::Text(values), ColumnKind::Interval) => values.push(
                row.try_get::<Option<PgInterval>, _>(index)?
                    .map(|interval| format_interval(&interval)),
            ),
            (Self::Text(values), ColumnKind::Uuid) => values.push(
                row.try_get::<Option<Uuid>, _>(index)?
                    .map(|id| id.to_string()),
            ),
            (Self::Text(values), ColumnKind::Json) => values.push(
                row.try_get::<Option<serde_json::Value>, _>(index)?
                    .map(|value| value.to_string()),
            ),
            // 無法以字串解碼的其他型別直接返回錯誤
            (Self::Text(values), _) => values.push(row.try_get::<Option<String>, _>(index)?),
        }
        Ok(())
    }

    fn into_column(self, name: &str) -> Column {
        match self {
            Self::Int(values) => Series::new(name.into(), values),
            Self::Float(values) => Series::new(name.into(), values),
            Self::Bool(values) => Series::new(name.into(), values),
            Self::Text(values) => Series::new(name.into(), values),
        }
        .into_column()
    }
}

/// 區間值轉為 `<months> mons <days> days HH:MM:SS[.ffffff]`
fn format_interval(interval: &PgInterval) -> String {
    let sign = if interval.microseconds < 0 { "-" } else { "" };
    let micros = interval.microseconds.unsigned_abs();
    let seconds = micros / 1_000_000;
    let fraction = micros % 1_000_000;

    let mut time = format!(
        "{}{:02}:{:02}:{:02}",
        sign,
        seconds / 3600,
        seconds % 3600 / 60,
        seconds % 60
    );
    if fraction > 0 {
        time.push_str(&format!(".{:06}", fraction));
    }

    format!("{} mons {} days {}", interval.months, interval.days, time)
}

/// 將查詢結果轉換為 DataFrame
///
/// 空結果集沒有欄位資訊，返回空的 DataFrame。
pub fn rows_to_frame(rows: &[PgRow]) -> DatabaseResult<DataFrame> {
    let Some(first) = rows.first() else {
        return Ok(DataFrame::empty());
    };

    let mut columns = Vec::with_capacity(first.len());
    for (index, column) in first.columns().iter().enumerate() {
        let kind = ColumnKind::from_type_name(column.type_info().name());
        let mut buffer = kind.buffer(rows.len());

        for row in rows {
            buffer
                .push(kind, row, index)
                .map_err(|source| DatabaseError::Decode {
                    column: column.name().to_string(),
                    source,
                })?;
        }

        columns.push(buffer.into_column(column.name()));
    }

    Ok(DataFrame::new(columns)?)
}
