use crate::domain::model::Credentials;
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

pub const DEFAULT_SOURCE_PATH: &str = "/home/user/uploaded_files/girlExport.csv";
pub const DEFAULT_CONVERTED_PATH: &str = "/home/user/webapp/cityheaven_import_ready.csv";
pub const DEFAULT_IMPORT_CSV: &str = "cityheaven_import_ready.csv";
pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub converter: ConverterConfig,
    pub api: ApiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConverterConfig {
    pub input_path: String,
    pub output_path: String,
    /// field -> header title; fields not listed are read by position
    pub columns: HashMap<String, String>,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            input_path: DEFAULT_SOURCE_PATH.to_string(),
            output_path: DEFAULT_CONVERTED_PATH.to_string(),
            columns: HashMap::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub phone_number: Option<String>,
    pub password: Option<String>,
    pub csv_path: String,
    /// 前台網址，設定後在結尾印出確認用連結
    pub site_url: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            phone_number: None,
            password: None,
            csv_path: DEFAULT_IMPORT_CSV.to_string(),
            site_url: None,
        }
    }
}

impl AppConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(EtlError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let mut table: toml::Table = toml::from_str(content).map_err(|e| EtlError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })?;

        Self::substitute_env_vars(&mut table)?;

        toml::Value::Table(table)
            .try_into::<Self>()
            .map_err(|e| EtlError::ConfigError {
                message: format!("TOML parsing error: {}", e),
            })
    }

    /// 在字串值裡替換環境變數 (例如 ${CAST_IMPORT_PASSWORD})。
    /// 引用到未設定變數的鍵會被移除，改用預設值或視為未設定。
    fn substitute_env_vars(table: &mut toml::Table) -> Result<()> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| EtlError::ConfigError {
            message: format!("invalid placeholder pattern: {}", e),
        })?;
        substitute_table(table, "", &re);
        Ok(())
    }
}

fn substitute_table(table: &mut toml::Table, prefix: &str, re: &Regex) {
    let mut unresolved = Vec::new();

    for (key, value) in table.iter_mut() {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{}.{}", prefix, key)
        };

        match value {
            toml::Value::String(s) => match expand_placeholders(s, re) {
                Some(expanded) => *s = expanded,
                None => {
                    tracing::warn!("'{}' references an unset environment variable, ignoring it", path);
                    unresolved.push(key.clone());
                }
            },
            toml::Value::Table(child) => substitute_table(child, &path, re),
            _ => {}
        }
    }

    for key in unresolved {
        table.remove(&key);
    }
}

/// `None` when any referenced variable is unset.
fn expand_placeholders(value: &str, re: &Regex) -> Option<String> {
    let mut missing = false;
    let expanded = re.replace_all(value, |caps: &regex::Captures| {
        std::env::var(&caps[1]).unwrap_or_else(|_| {
            missing = true;
            String::new()
        })
    });

    if missing {
        None
    } else {
        Some(expanded.into_owned())
    }
}

impl ApiConfig {
    pub fn credentials(&self) -> Result<Credentials> {
        let phone_number = validation::validate_required_field("api.phone_number", &self.phone_number)?;
        let password = validation::validate_required_field("api.password", &self.password)?;

        Ok(Credentials {
            phone_number: phone_number.clone(),
            password: password.clone(),
        })
    }
}

impl Validate for ConverterConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_path("converter.input_path", &self.input_path)?;
        validation::validate_path("converter.output_path", &self.output_path)?;

        for (field, title) in &self.columns {
            validation::validate_non_empty_string(&format!("converter.columns.{}", field), title)?;
        }
        Ok(())
    }
}

impl Validate for ApiConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_url("api.base_url", &self.base_url)?;
        validation::validate_path("api.csv_path", &self.csv_path)?;

        let credentials = self.credentials()?;
        validation::validate_non_empty_string("api.phone_number", &credentials.phone_number)?;
        validation::validate_non_empty_string("api.password", &credentials.password)?;

        if let Some(site_url) = &self.site_url {
            validation::validate_url("api.site_url", site_url)?;
        }
        Ok(())
    }
}
