//! CSV 檔案讀取器
//!
//! 原始匯出檔通常不是 UTF-8（預設為 latin1），因此先以指定編碼解碼成
//! UTF-8 文字，再交給 Polars 解析。

use super::error::{CsvError, CsvResult};
use encoding_rs::Encoding;
use polars::prelude::*;
use std::io::Cursor;
use std::path::Path;

/// CSV 讀取器配置
#[derive(Debug, Clone)]
pub struct CsvReaderConfig {
    /// 是否有標題行
    pub has_header: bool,
    /// 分隔符
    pub separator: u8,
    /// 檔案編碼
    pub encoding: &'static Encoding,
    /// 推斷模式類型時讀取的行數，`None` 表示掃描整個檔案
    pub infer_schema_length: Option<usize>,
}

impl Default for CsvReaderConfig {
    fn default() -> Self {
        Self {
            has_header: true,
            separator: b',',
            encoding: encoding_rs::UTF_8,
            // 數值欄位後段可能出現 `-`、`1,234` 之類的值，只看前幾行會讓解析失敗
            infer_schema_length: None,
        }
    }
}

/// CSV 檔案讀取器
#[derive(Debug, Clone)]
pub struct CsvReader {
    config: CsvReaderConfig,
}

impl Default for CsvReader {
    fn default() -> Self {
        Self::new(CsvReaderConfig::default())
    }
}

impl CsvReader {
    /// 創建新的 CSV 讀取器
    pub fn new(config: CsvReaderConfig) -> Self {
        Self { config }
    }

    /// 以編碼標籤（例如 `latin1`、`utf-8`）設定檔案編碼
    pub fn with_encoding_label(mut self, label: &str) -> CsvResult<Self> {
        self.config.encoding = Encoding::for_label(label.trim().as_bytes())
            .ok_or_else(|| CsvError::UnknownEncoding(label.to_string()))?;
        Ok(self)
    }

    /// 設定分隔符
    pub fn with_separator(mut self, separator: u8) -> Self {
        self.config.separator = separator;
        self
    }

    /// 目前使用的編碼名稱
    pub fn encoding_name(&self) -> &'static str {
        self.config.encoding.name()
    }

    /// 從檔案路徑讀取 CSV
    pub fn read_file<P: AsRef<Path>>(&self, path: P) -> CsvResult<DataFrame> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| CsvError::IoError {
            path: path.to_path_buf(),
            source,
        })?;

        self.read_bytes(&bytes)
    }

    /// 從字節數組讀取 CSV（先依配置編碼解碼）
    pub fn read_bytes(&self, data: &[u8]) -> CsvResult<DataFrame> {
        // 不做 BOM 偵測，以配置的編碼為準；殘留的 BOM 字元由欄名清理處理
        let (text, _had_errors) = self.config.encoding.decode_without_bom_handling(data);

        let df = CsvReadOptions::default()
            .with_has_header(self.config.has_header)
            .with_parse_options(CsvParseOptions::default().with_separator(self.config.separator))
            .with_infer_schema_length(self.config.infer_schema_length)
            .into_reader_with_file_handle(Cursor::new(text.as_bytes()))
            .finish()?;

        Ok(df)
    }

}
