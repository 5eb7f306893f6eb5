use crate::utils::error::{RelayError, Result};
use crate::utils::validation::{
    validate_non_empty_string, validate_path, validate_positive_number, validate_range,
    validate_url, Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_CATALOG_ENDPOINT: &str =
    "http://apis.data.go.kr/1471000/DURPrdlstInfoService03/getDurPrdlstInfoList03";
pub const DEFAULT_RECOGNITION_ENDPOINT: &str = "http://fake-ai-server/identify-medicine";
pub const PLACEHOLDER_API_KEY: &str = "YOUR_API_KEY";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    pub server: ServerConfig,
    pub recognition: RecognitionConfig,
    pub catalog: CatalogConfig,
    pub staging: StagingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            max_upload_bytes: 10 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecognitionMode {
    /// 呼叫外部辨識服務
    Http,
    /// 固定回傳 static_name，不發出請求
    Static,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecognitionConfig {
    pub mode: RecognitionMode,
    pub endpoint: String,
    pub static_name: String,
    pub timeout_seconds: u64,
}

impl Default for RecognitionConfig {
    fn default() -> Self {
        Self {
            mode: RecognitionMode::Static,
            endpoint: DEFAULT_RECOGNITION_ENDPOINT.to_string(),
            static_name: "타이레놀".to_string(),
            timeout_seconds: 30,
        }
    }
}

impl RecognitionConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub endpoint: String,
    pub api_key: String,
    pub timeout_seconds: u64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_CATALOG_ENDPOINT.to_string(),
            api_key: PLACEHOLDER_API_KEY.to_string(),
            timeout_seconds: 30,
        }
    }
}

impl CatalogConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    pub fn has_placeholder_key(&self) -> bool {
        self.api_key == PLACEHOLDER_API_KEY || self.api_key.starts_with("${")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StagingConfig {
    pub directory: String,
    pub keep_files: bool,
}

impl Default for StagingConfig {
    fn default() -> Self {
        Self {
            directory: "temp".to_string(),
            keep_files: true,
        }
    }
}

impl RelayConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(|e| RelayError::ConfigError {
            message: format!("cannot read {}: {}", path.as_ref().display(), e),
        })?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| RelayError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${MEDICINE_API_KEY})，未設定的保留原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| RelayError::Internal {
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        validate_non_empty_string("server.host", &self.server.host)?;
        validate_range("server.port", self.server.port, 1, u16::MAX)?;
        validate_positive_number("server.max_upload_bytes", self.server.max_upload_bytes, 1)?;

        match self.recognition.mode {
            RecognitionMode::Http => {
                validate_url("recognition.endpoint", &self.recognition.endpoint)?
            }
            RecognitionMode::Static => {
                validate_non_empty_string("recognition.static_name", &self.recognition.static_name)?
            }
        }
        validate_range("recognition.timeout_seconds", self.recognition.timeout_seconds, 1, 600)?;

        validate_url("catalog.endpoint", &self.catalog.endpoint)?;
        validate_non_empty_string("catalog.api_key", &self.catalog.api_key)?;
        validate_range("catalog.timeout_seconds", self.catalog.timeout_seconds, 1, 600)?;

        validate_path("staging.directory", &self.staging.directory)?;

        Ok(())
    }
}

impl Validate for RelayConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config().map_err(|e| match e {
            RelayError::InvalidRequest { field, reason } => RelayError::ConfigError {
                message: format!("{}: {}", field, reason),
            },
            other => other,
        })
    }
}
