use crate::domain::model::{Credentials, ImportRequest, ImportResponse, LoginResponse};
use crate::domain::ports::CastImportApi;
use crate::utils::error::{EtlError, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};

pub const LOGIN_PATH: &str = "/api/auth/login";
pub const IMPORT_PATH: &str = "/api/cast-import/import";
pub const TEMPLATE_PATH: &str = "/api/cast-import/template";

/// reqwest implementation of [`CastImportApi`]. No timeout and no retry are configured.
pub struct HttpCastApi {
    base_url: String,
    client: Client,
}

impl HttpCastApi {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: Client::new(),
        }
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl CastImportApi for HttpCastApi {
    async fn login(&self, credentials: &Credentials) -> Result<String> {
        let url = self.endpoint(LOGIN_PATH);
        tracing::info!("🔐 Logging in ({})", url);

        let response = self.client.post(&url).json(credentials).send().await?;
        let status = response.status();
        tracing::debug!("Login response status: {}", status);

        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(EtlError::LoginError {
                status: status.as_u16(),
                body,
            });
        }

        let body: LoginResponse = response.json().await?;
        match body.token {
            Some(token) if !token.is_empty() => {
                tracing::info!("✅ Login succeeded");
                Ok(token)
            }
            _ => Err(EtlError::MissingTokenError),
        }
    }

    async fn import_csv(&self, token: &str, csv_data: &str) -> Result<ImportResponse> {
        let url = self.endpoint(IMPORT_PATH);
        tracing::info!("📤 Importing data ({})", url);
        tracing::info!("📊 Payload size: {} bytes", csv_data.len());

        let response = self
            .client
            .post(&url)
            .bearer_auth(token)
            .json(&ImportRequest { csv_data })
            .send()
            .await?;
        let status = response.status();
        tracing::info!("📥 Response (Status: {})", status.as_u16());

        let body = response.text().await?;
        if status != StatusCode::OK {
            return Err(EtlError::ImportHttpError {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ImportResponse = serde_json::from_str(&body)?;
        Ok(parsed)
    }

    async fn fetch_template(&self, token: &str) -> Result<Vec<u8>> {
        let url = self.endpoint(TEMPLATE_PATH);
        tracing::info!("📄 Downloading CSV template ({})", url);

        let response = self.client.get(&url).bearer_auth(token).send().await?;
        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(EtlError::ImportHttpError {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.bytes().await?.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn credentials() -> Credentials {
        Credentials {
            phone_number: "090-0000-0000".to_string(),
            password: "secret".to_string(),
        }
    }

    #[tokio::test]
    async fn test_login_posts_credentials_and_returns_token() {
        let server = MockServer::start();
        let login_mock = server.mock(|when, then| {
            when.method(POST)
                .path(LOGIN_PATH)
                .json_body(serde_json::json!({
                    "phone_number": "090-0000-0000",
                    "password": "secret"
                }));
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({"token": "abc", "user": {"id": 1}}));
        });

        let api = HttpCastApi::new(&server.base_url());
        let token = api.login(&credentials()).await.unwrap();

        login_mock.assert();
        assert_eq!(token, "abc");
    }

    #[tokio::test]
    async fn test_login_without_token_fails() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path(LOGIN_PATH);
            then.status(200).json_body(serde_json::json!({"token": ""}));
        });

        let api = HttpCastApi::new(&server.base_url());
        let err = api.login(&credentials()).await.unwrap_err();

        assert!(matches!(err, EtlError::MissingTokenError));
    }

    #[tokio::test]
    async fn test_login_rejection_keeps_status_and_body() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path(LOGIN_PATH);
            then.status(401).body("unauthorized");
        });

        let api = HttpCastApi::new(&server.base_url());
        let err = api.login(&credentials()).await.unwrap_err();

        match err {
            EtlError::LoginError { status, body } => {
                assert_eq!(status, 401);
                assert_eq!(body, "unauthorized");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_import_sends_bearer_token_and_csv_field() {
        let server = MockServer::start();
        let import_mock = server.mock(|when, then| {
            when.method(POST)
                .path(IMPORT_PATH)
                .header("authorization", "Bearer abc")
                .json_body(serde_json::json!({"csvData": "name,age\nYuki,28\n"}));
            then.status(200).json_body(serde_json::json!({
                "success": true,
                "summary": {"total": 1, "success": 1, "failed": 0, "newCasts": 0}
            }));
        });

        let api = HttpCastApi::new(&format!("{}/", server.base_url()));
        let response = api.import_csv("abc", "name,age\nYuki,28\n").await.unwrap();

        import_mock.assert();
        assert!(response.success);
        assert_eq!(response.summary.total, 1);
    }

    #[tokio::test]
    async fn test_import_non_200_is_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path(IMPORT_PATH);
            then.status(500)
                .json_body(serde_json::json!({"success": false, "message": "CSVインポートに失敗しました"}));
        });

        let api = HttpCastApi::new(&server.base_url());
        let err = api.import_csv("abc", "name\n").await.unwrap_err();

        assert!(matches!(err, EtlError::ImportHttpError { status: 500, .. }));
    }
}
