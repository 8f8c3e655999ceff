use anyhow::Result;
use cast_import::core::report::render_import_summary;
use cast_import::domain::model::Credentials;
use cast_import::{EtlError, HttpCastApi, ImportPipeline, LocalStorage};
use httpmock::prelude::*;
use tempfile::TempDir;

const READY_CSV: &str = "\u{feff}name,age,profile\r\nYuki,28,\"Shop says hi\"\r\n";

fn credentials() -> Credentials {
    Credentials {
        phone_number: "090-0000-0000".to_string(),
        password: "admin-password".to_string(),
    }
}

fn pipeline(server: &MockServer, dir: &TempDir) -> ImportPipeline<LocalStorage, HttpCastApi> {
    ImportPipeline::new(
        LocalStorage::new(dir.path()),
        HttpCastApi::new(&server.base_url()),
        credentials(),
    )
}

/// 登入拿到的 token 要帶在匯入請求的 Authorization header
#[tokio::test]
async fn test_login_token_is_sent_as_bearer() -> Result<()> {
    let temp_dir = TempDir::new()?;
    std::fs::write(temp_dir.path().join("ready.csv"), READY_CSV)?;

    let server = MockServer::start();
    let login_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/api/auth/login")
            .json_body(serde_json::json!({
                "phone_number": "090-0000-0000",
                "password": "admin-password"
            }));
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!({"token": "abc"}));
    });
    let import_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/api/cast-import/import")
            .header("authorization", "Bearer abc")
            .json_body(serde_json::json!({
                "csvData": "name,age,profile\r\nYuki,28,\"Shop says hi\"\r\n"
            }));
        then.status(200).json_body(serde_json::json!({
            "success": true,
            "message": "1件のキャストをインポートしました",
            "summary": {"total": 1, "success": 1, "failed": 0, "newCasts": 0},
            "errors": [],
            "twitter": {"attempted": 0, "results": []}
        }));
    });

    let response = pipeline(&server, &temp_dir).run("ready.csv").await?;

    login_mock.assert();
    import_mock.assert();
    assert!(response.success);
    assert_eq!(response.summary.success, 1);
    Ok(())
}

#[tokio::test]
async fn test_login_401_never_calls_import() -> Result<()> {
    let temp_dir = TempDir::new()?;
    std::fs::write(temp_dir.path().join("ready.csv"), READY_CSV)?;

    let server = MockServer::start();
    let login_mock = server.mock(|when, then| {
        when.method(POST).path("/api/auth/login");
        then.status(401)
            .json_body(serde_json::json!({"message": "認証に失敗しました"}));
    });
    let import_mock = server.mock(|when, then| {
        when.method(POST).path("/api/cast-import/import");
        then.status(200).json_body(serde_json::json!({"success": true}));
    });

    let err = pipeline(&server, &temp_dir)
        .run("ready.csv")
        .await
        .unwrap_err();

    login_mock.assert();
    import_mock.assert_hits(0);
    assert!(matches!(err, EtlError::LoginError { status: 401, .. }));
    assert_eq!(err.exit_code(), 1);
    assert!(err.user_friendly_message().contains("認証に失敗しました"));
    Ok(())
}

#[tokio::test]
async fn test_summary_with_errors_and_cross_posts() -> Result<()> {
    let temp_dir = TempDir::new()?;
    std::fs::write(temp_dir.path().join("ready.csv"), READY_CSV)?;

    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/api/auth/login");
        then.status(200).json_body(serde_json::json!({"token": "abc"}));
    });
    server.mock(|when, then| {
        when.method(POST).path("/api/cast-import/import");
        then.status(200).json_body(serde_json::json!({
            "success": true,
            "summary": {"total": 5, "success": 4, "failed": 1, "newCasts": 1},
            "errors": [{"row": 3, "error": "bad date"}],
            "twitter": {
                "attempted": 1,
                "results": [{"castId": 10, "name": "Yuki", "success": false, "error": "not configured"}]
            }
        }));
    });

    let response = pipeline(&server, &temp_dir).run("ready.csv").await?;
    let text = render_import_summary(&response);

    assert!(text.contains("Total rows: 5"));
    assert!(text.contains("Succeeded: 4"));
    assert!(text.contains("Failed: 1"));
    assert!(text.contains("New casts: 1"));
    assert!(text.contains("Row 3: bad date"));
    assert!(text.contains("Attempted: 1"));
    assert!(text.contains("Succeeded: 0"));
    Ok(())
}

#[tokio::test]
async fn test_import_non_200_reports_status_and_body() -> Result<()> {
    let temp_dir = TempDir::new()?;
    std::fs::write(temp_dir.path().join("ready.csv"), READY_CSV)?;

    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/api/auth/login");
        then.status(200).json_body(serde_json::json!({"token": "abc"}));
    });
    server.mock(|when, then| {
        when.method(POST).path("/api/cast-import/import");
        then.status(400)
            .json_body(serde_json::json!({"success": false, "message": "CSVデータが必要です"}));
    });

    let err = pipeline(&server, &temp_dir)
        .run("ready.csv")
        .await
        .unwrap_err();

    match &err {
        EtlError::ImportHttpError { status, body } => {
            assert_eq!(*status, 400);
            assert!(body.contains("CSVデータが必要です"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
    Ok(())
}

#[tokio::test]
async fn test_missing_csv_fails_after_login() -> Result<()> {
    let temp_dir = TempDir::new()?;

    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/api/auth/login");
        then.status(200).json_body(serde_json::json!({"token": "abc"}));
    });
    let import_mock = server.mock(|when, then| {
        when.method(POST).path("/api/cast-import/import");
        then.status(200).json_body(serde_json::json!({"success": true}));
    });

    let err = pipeline(&server, &temp_dir)
        .run("cityheaven_import_ready.csv")
        .await
        .unwrap_err();

    import_mock.assert_hits(0);
    assert!(matches!(err, EtlError::IoError(_)));
    Ok(())
}

#[tokio::test]
async fn test_template_download() -> Result<()> {
    let temp_dir = TempDir::new()?;

    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/api/auth/login");
        then.status(200).json_body(serde_json::json!({"token": "abc"}));
    });
    let template_mock = server.mock(|when, then| {
        when.method(GET)
            .path("/api/cast-import/template")
            .header("authorization", "Bearer abc");
        then.status(200)
            .header("Content-Type", "text/csv; charset=utf-8")
            .body("\u{feff}name,age\nさくら,28\n");
    });

    pipeline(&server, &temp_dir)
        .download_template("cast_import_template.csv")
        .await?;

    template_mock.assert();
    let saved = std::fs::read_to_string(temp_dir.path().join("cast_import_template.csv"))?;
    assert!(saved.starts_with('\u{feff}'));
    assert!(saved.contains("さくら"));
    Ok(())
}
