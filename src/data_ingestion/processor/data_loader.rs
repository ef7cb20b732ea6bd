use super::csv_io::{CsvReader, CsvResult};
use crate::data_ingestion::DatasetMap;
use crate::storage::{DatabaseResult, ReportingDatabase};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::info;

/// 資料集載入器
///
/// 原始端從 CSV 檔案載入，入庫端從資料庫查詢載入，兩者都以資料集標籤為鍵。
#[derive(Debug, Clone, Default)]
pub struct DataLoader {
    reader: CsvReader,
}

impl DataLoader {
    pub fn new(reader: CsvReader) -> Self {
        Self { reader }
    }

    /// 以編碼標籤建立載入器
    pub fn with_encoding(label: &str) -> CsvResult<Self> {
        Ok(Self::new(CsvReader::default().with_encoding_label(label)?))
    }

    /// 載入所有原始檔案，任一檔案失敗即中止
    pub fn load_files(&self, file_paths: &BTreeMap<String, PathBuf>) -> CsvResult<DatasetMap> {
        let mut datasets = DatasetMap::new();
        for (name, path) in file_paths {
            let df = self.reader.read_file(path)?;
            info!(
                "Loaded raw file {} for {} ({} rows, {} columns, {})",
                path.display(),
                name,
                df.height(),
                df.width(),
                self.reader.encoding_name()
            );
            datasets.insert(name.clone(), df);
        }
        Ok(datasets)
    }

    /// 依序執行所有查詢，任一查詢失敗即中止
    pub async fn load_queries(
        &self,
        database: &ReportingDatabase,
        queries: &BTreeMap<String, String>,
    ) -> DatabaseResult<DatasetMap> {
        let mut datasets = DatasetMap::new();
        for (name, query) in queries {
            let df = database.fetch_frame(query).await?;
            info!(
                "Loaded ingested table for {} ({} rows, {} columns)",
                name,
                df.height(),
                df.width()
            );
            datasets.insert(name.clone(), df);
        }
        Ok(datasets)
    }
}
