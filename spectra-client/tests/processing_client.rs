use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use spectra_client::infra::encoder::encode;
use spectra_client::infra::errors::{ApiError, ProcessingError, ProcessingErrorKind};
use spectra_client::infra::services::SubmitOptions;
use spectra_client::{ApiClient, ClientConfig};
use spectra_model::{EncodedImage, FilterConfig, apply_preset};
use tokio_util::sync::CancellationToken;

const PIXEL: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a, 0x42];

#[derive(Debug, Clone, PartialEq)]
struct ReceivedPart {
    name: String,
    file_name: Option<String>,
    content_type: Option<String>,
    data: Vec<u8>,
}

type Received = Arc<Mutex<Vec<ReceivedPart>>>;

async fn spawn_server(router: Router) -> anyhow::Result<String> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    Ok(format!("http://{addr}"))
}

fn client_for(base_url: &str) -> anyhow::Result<ApiClient> {
    Ok(ApiClient::new(&ClientConfig {
        server_url: base_url.to_string(),
        ..ClientConfig::default()
    })?)
}

fn image() -> EncodedImage {
    EncodedImage::from_bytes(PIXEL, "image/png")
}

fn success_body() -> Value {
    json!({
        "success": true,
        "original_image": "data:image/png;base64,AA==",
        "processed_image": "data:image/png;base64,AQ==",
        "magnitude_spectrum": "data:image/png;base64,Ag==",
        "filter_mask": "data:image/png;base64,Aw==",
        "metrics": { "mse": 3.25, "psnr": 43.01, "ssim": 0.981 }
    })
}

async fn record_parts(
    State(received): State<Received>,
    mut multipart: Multipart,
) -> impl IntoResponse {
    let mut parts = Vec::new();
    loop {
        match multipart.next_field().await {
            Ok(Some(field)) => {
                let name = field.name().unwrap_or_default().to_string();
                let file_name = field.file_name().map(str::to_string);
                let content_type = field.content_type().map(str::to_string);
                let data = match field.bytes().await {
                    Ok(data) => data.to_vec(),
                    Err(err) => {
                        return (StatusCode::BAD_REQUEST, err.to_string())
                            .into_response();
                    }
                };
                parts.push(ReceivedPart {
                    name,
                    file_name,
                    content_type,
                    data,
                });
            }
            Ok(None) => break,
            Err(err) => {
                return (StatusCode::BAD_REQUEST, err.to_string())
                    .into_response();
            }
        }
    }
    if let Ok(mut guard) = received.lock() {
        guard.extend(parts);
    }
    Json(success_body()).into_response()
}

#[tokio::test]
async fn process_sends_exact_multipart_and_parses_result() -> anyhow::Result<()> {
    let received: Received = Arc::default();
    let router = Router::new()
        .route("/api/process", post(record_parts))
        .with_state(received.clone());
    let client = client_for(&spawn_server(router).await?)?;

    let config = apply_preset("noise_reject")?;
    let payload = encode(Some(&image()), &config)?;
    let result = client
        .process(payload, SubmitOptions::new(Duration::from_secs(5)))
        .await?;

    assert_eq!(result.metrics.psnr, 43.01);
    assert_eq!(result.filter_mask.as_str(), "data:image/png;base64,Aw==");

    let parts = received.lock().unwrap().clone();
    let image_part = parts.iter().find(|p| p.name == "image").unwrap();
    assert_eq!(image_part.file_name.as_deref(), Some("image.png"));
    assert_eq!(image_part.content_type.as_deref(), Some("image/png"));
    assert_eq!(image_part.data, PIXEL);

    let mut fields: Vec<(String, String)> = parts
        .iter()
        .filter(|p| p.name != "image")
        .map(|p| (p.name.clone(), String::from_utf8(p.data.clone()).unwrap()))
        .collect();
    fields.sort();
    let mut expected: Vec<(String, String)> = [
        ("bandwidth", "20"),
        ("center_freq", "50"),
        ("cutoff", "20"),
        ("filter_mode", "bandreject"),
        ("filter_type", "gaussian"),
        ("order", "2"),
    ]
    .iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();
    expected.sort();
    assert_eq!(fields, expected);
    Ok(())
}

#[tokio::test]
async fn lowpass_request_omits_band_fields() -> anyhow::Result<()> {
    let received: Received = Arc::default();
    let router = Router::new()
        .route("/api/process", post(record_parts))
        .with_state(received.clone());
    let client = client_for(&spawn_server(router).await?)?;

    let config = FilterConfig {
        center_freq: Some(99),
        bandwidth: Some(9),
        ..FilterConfig::default()
    };
    let payload = encode(Some(&image()), &config)?;
    client
        .process(payload, SubmitOptions::new(Duration::from_secs(5)))
        .await?;

    let names: Vec<String> = received
        .lock()
        .unwrap()
        .iter()
        .map(|p| p.name.clone())
        .collect();
    assert!(!names.iter().any(|n| n == "center_freq" || n == "bandwidth"));
    assert!(names.iter().any(|n| n == "order"));
    Ok(())
}

#[tokio::test]
async fn structured_error_is_surfaced_as_rejected() -> anyhow::Result<()> {
    let router = Router::new().route(
        "/api/process",
        post(|| async {
            (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "Invalid filter type" })),
            )
        }),
    );
    let client = client_for(&spawn_server(router).await?)?;

    let payload = encode(Some(&image()), &FilterConfig::default())?;
    let err = client
        .process(payload, SubmitOptions::new(Duration::from_secs(5)))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        ProcessingError::Rejected {
            status: 400,
            message: "Invalid filter type".into()
        }
    );
    Ok(())
}

#[tokio::test]
async fn plain_text_failure_falls_back_to_body() -> anyhow::Result<()> {
    let router = Router::new().route(
        "/api/process",
        post(|| async {
            (StatusCode::INTERNAL_SERVER_ERROR, "Traceback: out of memory")
        }),
    );
    let client = client_for(&spawn_server(router).await?)?;

    let payload = encode(Some(&image()), &FilterConfig::default())?;
    let err = client
        .process(payload, SubmitOptions::new(Duration::from_secs(5)))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ProcessingErrorKind::Rejected);
    assert_eq!(err.to_string(), "Traceback: out of memory");
    Ok(())
}

#[tokio::test]
async fn incomplete_success_is_malformed() -> anyhow::Result<()> {
    let router = Router::new().route(
        "/api/process",
        post(|| async {
            let mut body = success_body();
            body.as_object_mut().unwrap().remove("metrics");
            Json(body)
        }),
    );
    let client = client_for(&spawn_server(router).await?)?;

    let payload = encode(Some(&image()), &FilterConfig::default())?;
    let err = client
        .process(payload, SubmitOptions::new(Duration::from_secs(5)))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ProcessingErrorKind::MalformedResponse);
    assert!(err.to_string().contains("metrics"));
    Ok(())
}

#[tokio::test]
async fn slow_service_times_out() -> anyhow::Result<()> {
    let router = Router::new().route(
        "/api/process",
        post(|| async {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Json(success_body())
        }),
    );
    let client = client_for(&spawn_server(router).await?)?;

    let payload = encode(Some(&image()), &FilterConfig::default())?;
    let timeout = Duration::from_millis(200);
    let err = client
        .process(payload, SubmitOptions::new(timeout))
        .await
        .unwrap_err();
    assert_eq!(err, ProcessingError::Timeout(timeout));
    Ok(())
}

#[tokio::test]
async fn cancellation_aborts_the_request() -> anyhow::Result<()> {
    let router = Router::new().route(
        "/api/process",
        post(|| async {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Json(success_body())
        }),
    );
    let client = client_for(&spawn_server(router).await?)?;

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        trigger.cancel();
    });

    let payload = encode(Some(&image()), &FilterConfig::default())?;
    let options =
        SubmitOptions::new(Duration::from_secs(10)).with_cancel(cancel);
    let err = client.process(payload, options).await.unwrap_err();
    assert_eq!(err, ProcessingError::Cancelled);
    Ok(())
}

#[tokio::test]
async fn unreachable_service_is_a_network_error() -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    drop(listener);
    let client = client_for(&format!("http://{addr}"))?;

    let payload = encode(Some(&image()), &FilterConfig::default())?;
    let err = client
        .process(payload, SubmitOptions::new(Duration::from_secs(5)))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ProcessingErrorKind::Network);
    Ok(())
}

#[tokio::test]
async fn health_and_upload_round_trip() -> anyhow::Result<()> {
    let router = Router::new()
        .route(
            "/api/health",
            get(|| async {
                Json(json!({ "status": "ok", "message": "Fourier service up" }))
            }),
        )
        .route(
            "/api/upload",
            post(|mut multipart: Multipart| async move {
                let mut filename = String::new();
                while let Ok(Some(field)) = multipart.next_field().await {
                    if field.name() == Some("image") {
                        filename = field.file_name().unwrap_or_default().to_string();
                    }
                }
                Json(json!({
                    "success": true,
                    "filename": filename,
                    "filepath": format!("uploads/{filename}"),
                }))
            }),
        );
    let client = client_for(&spawn_server(router).await?)?;

    let status = client.health().await?;
    assert!(status.is_ok());
    assert_eq!(status.message.as_deref(), Some("Fourier service up"));

    let uploaded = client.upload_image(PIXEL.to_vec(), "cat.png").await?;
    assert!(uploaded.success);
    assert_eq!(uploaded.filename, "cat.png");
    assert_eq!(uploaded.filepath.as_deref(), Some("uploads/cat.png"));
    Ok(())
}

#[tokio::test]
async fn failing_health_probe_reports_status() -> anyhow::Result<()> {
    let router = Router::new().route(
        "/api/health",
        get(|| async {
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "error": "warming up" })),
            )
        }),
    );
    let client = client_for(&spawn_server(router).await?)?;

    match client.health().await {
        Err(ApiError::Rejected { status, message }) => {
            assert_eq!(status, 503);
            assert_eq!(message, "warming up");
        }
        other => panic!("expected rejection, got {other:?}"),
    }
    Ok(())
}
