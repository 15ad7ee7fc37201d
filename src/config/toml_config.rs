use crate::adapters::SourceConfig;
use crate::core::phone::MIN_INTERNATIONAL_DIGITS;
use crate::core::whatsapp::DEFAULT_WHATSAPP_URL;
use crate::utils::error::{Result, ScrapeError};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeConfig {
    pub run: RunConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub phone: PhoneConfig,
    #[serde(default)]
    pub whatsapp: WhatsappConfig,
    pub source: SourceConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// 輸出檔名前綴，同時作為工作表名稱
    pub name: String,
    #[serde(default = "default_output_path")]
    pub output_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_seconds: u64,
    pub connect_timeout_seconds: u64,
    pub concurrent_requests: usize,
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 30,
            connect_timeout_seconds: 10,
            concurrent_requests: 8,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64)".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PhoneConfig {
    pub default_country_code: String,
    pub min_digits: usize,
}

impl Default for PhoneConfig {
    fn default() -> Self {
        Self {
            default_country_code: "34".to_string(),
            min_digits: MIN_INTERNATIONAL_DIGITS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WhatsappConfig {
    pub base_url: String,
}

impl Default for WhatsappConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_WHATSAPP_URL.to_string(),
        }
    }
}

fn default_output_path() -> String {
    ".".to_string()
}

impl ScrapeConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| ScrapeError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${IFEMA_TENANT_ID})，未設定的變數原樣保留
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| ScrapeError::ConfigError {
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_credential("run.name", &self.run.name)?;
        validation::validate_path("run.output_path", &self.run.output_path)?;

        validation::validate_positive_number("http.timeout_seconds", self.http.timeout_seconds, 1)?;
        validation::validate_positive_number(
            "http.connect_timeout_seconds",
            self.http.connect_timeout_seconds,
            1,
        )?;
        validation::validate_positive_number(
            "http.concurrent_requests",
            self.http.concurrent_requests as u64,
            1,
        )?;

        validation::validate_country_code(
            "phone.default_country_code",
            &self.phone.default_country_code,
        )?;
        validation::validate_positive_number("phone.min_digits", self.phone.min_digits as u64, 1)?;
        validation::validate_url("whatsapp.base_url", &self.whatsapp.base_url)?;

        self.source.validate()
    }

    pub fn source_name(&self) -> &'static str {
        self.source.name()
    }

    pub fn output_path(&self) -> &str {
        &self.run.output_path
    }
}

impl Validate for ScrapeConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
