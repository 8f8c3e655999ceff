pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use adapters::{HttpCastApi, LocalStorage};
pub use config::{AppConfig, CliConfig, Command};
pub use core::{converter::CityHeavenConverter, importer::ImportPipeline};
pub use utils::error::{EtlError, Result};
