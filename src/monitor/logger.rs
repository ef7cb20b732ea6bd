// monitor/logger.rs - 日誌記錄模組
//
// 日誌檔是本程式唯一的輸出，每次執行覆寫，
// 每行格式為 `YYYY-mm-dd HH:MM:SS - LEVEL: message`。

use crate::config::LogConfig;
use anyhow::{Context, Result};
use chrono::Local;
use std::fmt;
use std::fs::{self, File};
use std::path::Path;
use tracing::{Event, Subscriber};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields, MakeWriter};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::EnvFilter;

/// 日誌時間戳格式
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// 單行日誌格式
#[derive(Debug, Clone, Copy, Default)]
pub struct LogLineFormat;

impl<S, N> FormatEvent<S, N> for LogLineFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        write!(
            writer,
            "{} - {}: ",
            Local::now().format(TIMESTAMP_FORMAT),
            event.metadata().level()
        )?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// 級別只來自配置檔，不讀取 `RUST_LOG`
fn level_filter(level: &str) -> EnvFilter {
    EnvFilter::new(level.to_lowercase())
}

/// 以指定輸出建立訂閱者
pub fn build_subscriber<W>(level: &str, writer: W) -> impl Subscriber + Send + Sync
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    tracing_subscriber::fmt()
        .event_format(LogLineFormat)
        .with_env_filter(level_filter(level))
        .with_writer(writer)
        .finish()
}

/// 初始化日誌系統
///
/// 返回的 guard 必須持有到程式結束，否則緩衝中的日誌會遺失。
pub fn init_logging(config: &LogConfig) -> Result<WorkerGuard> {
    let file = open_log_file(&config.file)?;
    let (writer, guard) = tracing_appender::non_blocking(file);

    tracing::subscriber::set_global_default(build_subscriber(&config.level, writer))
        .context("設置日誌系統失敗")?;

    Ok(guard)
}

/// 開啟日誌檔，必要時建立目錄；既有內容會被截斷
fn open_log_file(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("無法創建日誌目錄: {}", parent.display()))?;
    }

    File::create(path).with_context(|| format!("無法創建日誌檔: {}", path.display()))
}
