pub mod toml_config;

use crate::utils::error::{EtlError, Result};
use clap::{Args, Parser, Subcommand};
use std::path::Path;
pub use toml_config::{ApiConfig, AppConfig, ConverterConfig};

pub const DEFAULT_CONFIG_FILE: &str = "cast-import.toml";
pub const DEFAULT_TEMPLATE_FILE: &str = "cast_import_template.csv";

#[derive(Debug, Clone, Parser)]
#[command(name = "cast-import")]
#[command(about = "Convert CityHeaven cast exports and bulk-import them into the cast admin")]
pub struct CliConfig {
    /// Path to TOML configuration file (optional when left at the default)
    #[arg(long, global = true)]
    pub config: Option<String>,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Emit logs as JSON")]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Convert a CityHeaven export into the import CSV schema
    Convert {
        #[arg(long)]
        input: Option<String>,

        #[arg(long)]
        output: Option<String>,
    },
    /// Log in and upload a converted CSV as one bulk import
    Import {
        #[arg(long)]
        csv: Option<String>,

        #[command(flatten)]
        api: ApiArgs,
    },
    /// Log in and download the server's CSV import template
    Template {
        #[arg(long, default_value = DEFAULT_TEMPLATE_FILE)]
        output: String,

        #[command(flatten)]
        api: ApiArgs,
    },
}

#[derive(Debug, Clone, Default, Args)]
pub struct ApiArgs {
    #[arg(long)]
    pub base_url: Option<String>,

    #[arg(long)]
    pub phone_number: Option<String>,

    #[arg(long)]
    pub password: Option<String>,
}

impl ApiArgs {
    fn apply(&self, api: &mut ApiConfig) {
        if let Some(base_url) = &self.base_url {
            api.base_url = base_url.clone();
        }
        if let Some(phone_number) = &self.phone_number {
            api.phone_number = Some(phone_number.clone());
        }
        if let Some(password) = &self.password {
            api.password = Some(password.clone());
        }
    }
}

impl CliConfig {
    /// 預設值 < TOML 檔 < 命令列參數
    pub fn load_app_config(&self) -> Result<AppConfig> {
        let mut config = match &self.config {
            Some(path) => AppConfig::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                AppConfig::from_file(DEFAULT_CONFIG_FILE)?
            }
            None => AppConfig::default(),
        };

        match &self.command {
            Command::Convert { input, output } => {
                if let Some(input) = input {
                    config.converter.input_path = input.clone();
                }
                if let Some(output) = output {
                    config.converter.output_path = output.clone();
                }
            }
            Command::Import { csv, api } => {
                if let Some(csv) = csv {
                    config.api.csv_path = csv.clone();
                }
                api.apply(&mut config.api);
            }
            Command::Template { output, api } => {
                if output.trim().is_empty() {
                    return Err(EtlError::ConfigError {
                        message: "template output path cannot be empty".to_string(),
                    });
                }
                api.apply(&mut config.api);
            }
        }

        Ok(config)
    }
}
