pub mod converter;
pub mod importer;
pub mod report;

pub use crate::domain::model::{CastRecord, ConversionStats, Credentials, ImportResponse};
pub use crate::domain::ports::{CastImportApi, Storage};
pub use crate::utils::error::Result;
