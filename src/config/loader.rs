use config::{Config, ConfigError, File, FileFormat, Value};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::env;
use std::path::{Path, PathBuf};

/// 預設配置檔路徑
pub const DEFAULT_CONFIG_PATH: &str = "config/config.ini";

/// 覆寫配置檔路徑的環境變數
pub const CONFIG_PATH_ENV: &str = "QA_REPORT_CONFIG";

/// 從環境變數取得配置檔路徑，未設定時使用預設值
pub fn config_path_from_env() -> PathBuf {
    env::var(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH))
}

/// 配置加載器，負責讀取 ini 格式的配置檔
pub struct ConfigLoader;

impl ConfigLoader {
    /// 載入指定路徑的 ini 配置
    pub fn load(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
        Config::builder()
            .add_source(File::from(path.as_ref()).format(FileFormat::Ini).required(true))
            .build()
    }

    /// 從字串載入 ini 配置（測試與內嵌配置使用）
    pub fn load_str(content: &str) -> Result<Config, ConfigError> {
        Config::builder()
            .add_source(File::from_str(content, FileFormat::Ini))
            .build()
    }
}

/// 配置獲取輔助特性
///
/// ini 區段名稱的大小寫在不同來源間並不一致（`[Database]` 與 `database`），
/// 因此區段查找不區分大小寫。
pub trait ConfigExt {
    /// 取得並反序列化指定區段，區段不存在時返回 `None`
    fn section<T: DeserializeOwned>(&self, section: &str) -> Result<Option<T>, ConfigError>;

    /// 取得必要區段，區段不存在時返回 `ConfigError::NotFound`
    fn required_section<T: DeserializeOwned>(&self, section: &str) -> Result<T, ConfigError> {
        self.section(section)?
            .ok_or_else(|| ConfigError::NotFound(section.to_string()))
    }
}

impl ConfigExt for Config {
    fn section<T: DeserializeOwned>(&self, section: &str) -> Result<Option<T>, ConfigError> {
        let root: HashMap<String, Value> = self.clone().try_deserialize()?;

        root.into_iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(section))
            .map(|(_, value)| value.try_deserialize::<T>())
            .transpose()
    }
}
