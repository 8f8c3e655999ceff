use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for '{field}' ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Login failed (status {status}): {body}")]
    LoginError { status: u16, body: String },

    #[error("Login response did not contain a token")]
    MissingTokenError,

    #[error("Import failed (status {status}): {body}")]
    ImportHttpError { status: u16, body: String },

    #[error("Import rejected by server: {message}")]
    ImportRejectedError { message: String },

    #[error("Source CSV has no header row")]
    EmptySourceError,

    #[error("Decoding error: {message}")]
    DecodeError { message: String },
}

impl EtlError {
    /// 給操作人員看的簡短訊息
    pub fn user_friendly_message(&self) -> String {
        match self {
            EtlError::ApiError(e) => format!("Request error: {}", e),
            EtlError::CsvError(e) => format!("CSV error: {}", e),
            EtlError::IoError(e) => format!("File error: {}", e),
            EtlError::SerializationError(e) => format!("Unexpected JSON from server: {}", e),
            EtlError::LoginError { status, body } => {
                format!("Login failed (Status: {})\nResponse: {}", status, body)
            }
            EtlError::MissingTokenError => "Could not obtain a token from the login response".to_string(),
            EtlError::ImportHttpError { status, body } => {
                format!("Import failed (Status: {})\nResponse: {}", status, body)
            }
            EtlError::ImportRejectedError { message } => message.clone(),
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            EtlError::ApiError(_) => "Check that the API server is reachable and the base URL is correct",
            EtlError::CsvError(_) | EtlError::DecodeError { .. } => {
                "Make sure the file is a UTF-8 encoded CSV"
            }
            EtlError::IoError(_) | EtlError::EmptySourceError => {
                "Check that the file exists and is readable/writable"
            }
            EtlError::SerializationError(_) => "Check the server version and its response format",
            EtlError::ConfigError { .. }
            | EtlError::InvalidConfigValueError { .. }
            | EtlError::MissingConfigError { .. } => {
                "Fix the configuration file or command-line flags"
            }
            EtlError::LoginError { .. } | EtlError::MissingTokenError => {
                "Verify the phone number and password"
            }
            EtlError::ImportHttpError { .. } | EtlError::ImportRejectedError { .. } => {
                "Inspect the server response and the CSV contents, then re-run the import"
            }
        }
    }

    /// 所有失敗都以 1 結束
    pub fn exit_code(&self) -> i32 {
        1
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;
