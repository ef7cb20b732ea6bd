/// 配置管理模組
///
/// 本模組負責從 ini 檔案加載、驗證資料庫與日誌配置。
// 宣告子模組
pub mod loader;
pub mod types;
pub mod validation;

// 重新導出常用組件
pub use loader::{config_path_from_env, ConfigExt, ConfigLoader, CONFIG_PATH_ENV, DEFAULT_CONFIG_PATH};
pub use types::*;
pub use validation::{ValidationError, ValidationUtils, Validator};
