//! CSV 檔案讀取與處理模組

pub mod reader;
pub mod error;

pub use reader::{CsvReader, CsvReaderConfig};
pub use error::{CsvError, CsvResult};
