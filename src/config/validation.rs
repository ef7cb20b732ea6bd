use thiserror::Error;

/// ini 配置驗證錯誤，欄位名稱以 `Section.key` 表示
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("ini 配置缺少 {0}，無法建立報表資料庫連線或日誌")]
    MissingField(String),

    #[error("ini 配置 {field} = {value} 不受支援，可用值: {allowed}")]
    InvalidValue {
        field: String,
        value: String,
        allowed: String,
    },

    #[error("ini 配置 {field} = {value} 超出範圍 {min}..={max}")]
    OutOfRange {
        field: String,
        value: String,
        min: String,
        max: String,
    },
}

/// 配置區段驗證
pub trait Validator {
    fn validate(&self) -> Result<(), ValidationError>;
}

/// 配置區段共用的檢查
pub struct ValidationUtils;

impl ValidationUtils {
    /// 數值須落在閉區間內（例如埠號）
    pub fn in_range<T>(value: T, min: T, max: T, field: &str) -> Result<(), ValidationError>
    where
        T: PartialOrd + ToString,
    {
        if value < min || value > max {
            return Err(ValidationError::OutOfRange {
                field: field.to_string(),
                value: value.to_string(),
                min: min.to_string(),
                max: max.to_string(),
            });
        }
        Ok(())
    }

    /// 不分大小寫比對允許值（driver、日誌級別）
    pub fn one_of(value: &str, allowed: &[&str], field: &str) -> Result<(), ValidationError> {
        let normalized = value.trim().to_lowercase();
        if allowed.iter().any(|option| *option == normalized) {
            return Ok(());
        }

        Err(ValidationError::InvalidValue {
            field: field.to_string(),
            value: value.to_string(),
            allowed: allowed.join(", "),
        })
    }

    /// 連線欄位不可為空白
    pub fn not_empty(value: &str, field: &str) -> Result<(), ValidationError> {
        if value.trim().is_empty() {
            return Err(ValidationError::MissingField(field.to_string()));
        }
        Ok(())
    }
}
