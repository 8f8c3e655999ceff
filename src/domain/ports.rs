use crate::domain::model::{Credentials, ImportResponse};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// 後台 cast-import API 的介面
#[async_trait]
pub trait CastImportApi: Send + Sync {
    /// Returns the bearer token issued for `credentials`.
    async fn login(&self, credentials: &Credentials) -> Result<String>;
    /// Uploads the whole CSV text in a single request.
    async fn import_csv(&self, token: &str, csv_data: &str) -> Result<ImportResponse>;
    async fn fetch_template(&self, token: &str) -> Result<Vec<u8>>;
}
