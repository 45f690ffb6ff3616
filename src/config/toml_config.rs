use crate::core::aggregate::{DEFAULT_MINOR_UNITS, MAX_MINOR_UNITS};
use crate::core::ConfigProvider;
use crate::utils::error::{ContributionError, Result};
use crate::utils::validation::{
    validate_non_empty_string, validate_output_formats, validate_path, validate_range,
    validate_required_field, Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub report: ReportConfig,
    #[serde(default)]
    pub currency: CurrencyConfig,
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    pub snapshot_path: Option<String>,
    pub output_path: String,
    #[serde(default = "default_output_formats")]
    pub output_formats: Vec<String>,
    pub include_unassigned: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrencyConfig {
    pub code: String,
    pub minor_units: Option<u32>,
}

impl Default for CurrencyConfig {
    fn default() -> Self {
        Self {
            code: "EUR".to_string(),
            minor_units: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub verbose: Option<bool>,
    pub json: Option<bool>,
}

fn default_output_formats() -> Vec<String> {
    vec!["csv".to_string(), "json".to_string()]
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ContributionError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| ContributionError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${STORE_EXPORT_DIR})，未設定的保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| ContributionError::ConfigValidationError {
            field: "env_substitution".to_string(),
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        let snapshot = validate_required_field("report.snapshot_path", &self.report.snapshot_path)?;
        validate_path("report.snapshot_path", snapshot)?;
        validate_path("report.output_path", &self.report.output_path)?;
        validate_output_formats("report.output_formats", &self.report.output_formats)?;
        validate_non_empty_string("currency.code", &self.currency.code)?;
        validate_range("currency.minor_units", self.minor_units(), 0, MAX_MINOR_UNITS)?;
        Ok(())
    }

    pub fn verbose(&self) -> bool {
        self.logging
            .as_ref()
            .and_then(|l| l.verbose)
            .unwrap_or(false)
    }

    pub fn json_logs(&self) -> bool {
        self.logging.as_ref().and_then(|l| l.json).unwrap_or(false)
    }
}

impl ConfigProvider for TomlConfig {
    fn snapshot_path(&self) -> &str {
        self.report.snapshot_path.as_deref().unwrap_or_default()
    }

    fn output_path(&self) -> &str {
        &self.report.output_path
    }

    fn output_formats(&self) -> &[String] {
        &self.report.output_formats
    }

    fn currency(&self) -> &str {
        &self.currency.code
    }

    fn minor_units(&self) -> u32 {
        self.currency.minor_units.unwrap_or(DEFAULT_MINOR_UNITS)
    }

    fn include_unassigned(&self) -> bool {
        self.report.include_unassigned.unwrap_or(true)
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
