use crate::domain::model::{Credentials, ImportResponse};
use crate::domain::ports::{CastImportApi, Storage};
use crate::utils::error::{EtlError, Result};

/// CSV text ready to be uploaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvPayload {
    pub text: String,
    pub rows: usize,
}

impl CsvPayload {
    /// BOM-aware UTF-8 decoding. Row count is the number of lines minus the header.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let (text, had_errors) = encoding_rs::UTF_8.decode_with_bom_removal(bytes);
        if had_errors {
            return Err(EtlError::DecodeError {
                message: "file is not valid UTF-8".to_string(),
            });
        }

        let text = text.into_owned();
        let rows = text.trim().lines().count().saturating_sub(1);
        Ok(Self { text, rows })
    }
}

/// login → 讀取 CSV → 一次上傳
pub struct ImportPipeline<S: Storage, A: CastImportApi> {
    storage: S,
    api: A,
    credentials: Credentials,
}

impl<S: Storage, A: CastImportApi> ImportPipeline<S, A> {
    pub fn new(storage: S, api: A, credentials: Credentials) -> Self {
        Self {
            storage,
            api,
            credentials,
        }
    }

    pub async fn read_csv(&self, path: &str) -> Result<CsvPayload> {
        tracing::info!("📄 Reading CSV file ({})", path);
        let bytes = self.storage.read_file(path).await?;
        let payload = CsvPayload::decode(&bytes)?;
        tracing::info!("✅ CSV file loaded ({} rows)", payload.rows);
        Ok(payload)
    }

    /// Runs the three steps in order. A `success: false` body is returned as
    /// [`EtlError::ImportRejectedError`].
    pub async fn run(&self, csv_path: &str) -> Result<ImportResponse> {
        let token = self.api.login(&self.credentials).await?;
        let payload = self.read_csv(csv_path).await?;
        let response = self.api.import_csv(&token, &payload.text).await?;

        if !response.success {
            return Err(EtlError::ImportRejectedError {
                message: response
                    .message
                    .clone()
                    .unwrap_or_else(|| "Unknown error".to_string()),
            });
        }

        if let Some(twitter) = &response.twitter {
            for failure in twitter.results.iter().filter(|r| !r.success) {
                tracing::debug!(
                    "Cross-post failed for {}: {}",
                    failure.name.as_deref().unwrap_or("?"),
                    failure.error.as_deref().unwrap_or("unknown error")
                );
            }
        }

        Ok(response)
    }

    /// Downloads the server's import template and stores it at `output_path`.
    pub async fn download_template(&self, output_path: &str) -> Result<usize> {
        let token = self.api.login(&self.credentials).await?;
        let template = self.api.fetch_template(&token).await?;
        self.storage.write_file(output_path, &template).await?;
        tracing::info!("✅ Template saved to {}", output_path);
        Ok(template.len())
    }
}
