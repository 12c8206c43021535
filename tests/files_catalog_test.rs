use anyhow::Result;
use httpmock::prelude::*;
use provider_pipeline::core::catalog::{self, CatalogSortKey};
use provider_pipeline::{PipelineError, StageClient};

#[tokio::test]
async fn test_list_generated_files_decodes_records() -> Result<()> {
    let server = MockServer::start();

    let list = server.mock(|when, then| {
        when.method(GET).path("/files/list");
        then.status(200).json_body(serde_json::json!({
            "status": "success",
            "generated_files": [
                {
                    "filename": "ca_split_20240101_120000.csv",
                    "filepath": "output/ca_split_20240101_120000.csv",
                    "step": "State Split - CA Data",
                    "timestamp": "20240101_120000",
                    "records": 400,
                    "columns": 9,
                    "size_mb": 1.25
                },
                {
                    "filename": "ny_split_20240102_090000.csv",
                    "step": "State Split - NY Data",
                    "timestamp": "20240102_090000",
                    "records": 550
                }
            ],
            "count": 2
        }));
    });

    let client = StageClient::new();
    let files = client.list_generated_files(&server.base_url()).await?;

    list.assert();
    assert_eq!(files.len(), 2);
    assert_eq!(files[0].filename, "ca_split_20240101_120000.csv");
    assert_eq!(files[0].records, 400);
    assert_eq!(files[0].size_mb, 1.25);
    // Missing numeric fields default rather than failing the decode.
    assert_eq!(files[1].columns, 0);
    assert_eq!(files[1].size_mb, 0.0);

    Ok(())
}

#[tokio::test]
async fn test_list_failure_status_is_an_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/files/list");
        then.status(200)
            .json_body(serde_json::json!({ "status": "error", "error": "output folder missing" }));
    });

    let client = StageClient::new();
    let err = client.list_generated_files(&server.base_url()).await.unwrap_err();

    assert!(matches!(err, PipelineError::ProcessingError { .. }));
    assert!(err.to_string().contains("output folder missing"));
}

#[tokio::test]
async fn test_download_file_returns_raw_bytes() -> Result<()> {
    let server = MockServer::start();

    let download = server.mock(|when, then| {
        when.method(GET)
            .path("/files/download/ca_split_20240101_120000.csv");
        then.status(200)
            .header("Content-Type", "text/csv")
            .body("name,npi\nDr A,123\n");
    });

    let client = StageClient::new();
    let bytes = client
        .download_file(&server.base_url(), "ca_split_20240101_120000.csv")
        .await?;

    download.assert();
    assert_eq!(bytes, b"name,npi\nDr A,123\n");

    Ok(())
}

#[tokio::test]
async fn test_download_missing_file_is_an_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/files/download/absent.csv");
        then.status(404);
    });

    let client = StageClient::new();
    let err = client
        .download_file(&server.base_url(), "absent.csv")
        .await
        .unwrap_err();

    assert!(err.to_string().contains("absent.csv"));
}

#[tokio::test]
async fn test_fetched_catalog_filters_and_sorts() -> Result<()> {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/files/list");
        then.status(200).json_body(serde_json::json!({
            "status": "success",
            "generated_files": [
                { "filename": "one.csv", "step": "A", "timestamp": "20240101_120000", "records": 10 },
                { "filename": "two.csv", "step": "B", "timestamp": "20240103_120000", "records": 30 },
                { "filename": "three.csv", "step": "A", "timestamp": "20240102_120000", "records": 20 }
            ]
        }));
    });

    let client = StageClient::new();
    let files = client.list_generated_files(&server.base_url()).await?;

    let step_a = catalog::filter_by_step(&files, "A");
    assert_eq!(step_a.len(), 2);
    assert_eq!(step_a[0].filename, "one.csv");
    assert_eq!(step_a[1].filename, "three.csv");

    let mut sorted = files.clone();
    catalog::sort_files(&mut sorted, CatalogSortKey::Timestamp);
    assert_eq!(sorted[0].filename, "two.csv");

    catalog::sort_files(&mut sorted, CatalogSortKey::Records);
    assert_eq!(sorted[0].records, 30);

    Ok(())
}
