mod support;

use equipment_visualizer::api::{ApiClient, HISTORY_PATH, REPORT_PATH, UPLOAD_PATH};
use equipment_visualizer::config::{AuthConfig, ServerConfig};
use equipment_visualizer::error::ApiError;
use reqwest::StatusCode;
use support::{refused_url, MockBackend, MockResponse};

const HISTORY_BODY: &str = r#"[
    {"file_name":"plant_b.csv","uploaded_at":"2025-03-02T14:05:09.511Z","total_equipment":8,
     "avg_flowrate":98.25,"avg_pressure":4.9,"avg_temperature":88.0},
    {"file_name":"plant_a.csv","uploaded_at":"2025-03-01T08:00:00Z","total_equipment":15,
     "avg_flowrate":119.8,"avg_pressure":6.11,"avg_temperature":117.47}
]"#;

const SUMMARY_BODY: &str = r#"{"total_count":15,"avg_flowrate":119.8,"avg_pressure":6.11,
    "avg_temperature":117.47,"type_distribution":{"Valve":4,"Pump":4,"Compressor":3,
    "HeatExchanger":2,"Reactor":1,"Condenser":1}}"#;

fn client_for(urls: &[String]) -> ApiClient {
    let server = ServerConfig {
        base_url: urls[0].clone(),
        fallback_urls: urls[1..].to_vec(),
        timeout_secs: Some(5),
    };
    ApiClient::new(&server, &AuthConfig::default()).unwrap()
}

#[tokio::test]
async fn fetch_history_sends_basic_auth_and_keeps_backend_order() {
    let backend = MockBackend::start();
    backend.route("GET", HISTORY_PATH, MockResponse::json(200, HISTORY_BODY));

    let history = client_for(&[backend.url()]).fetch_history().await.unwrap();

    let names: Vec<&str> = history.iter().map(|e| e.file_name.as_str()).collect();
    assert_eq!(names, vec!["plant_b.csv", "plant_a.csv"]);
    assert_eq!(history[1].total_equipment, 15);

    let requests = backend.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(
        requests[0].header("authorization"),
        Some("Basic YWRtaW46YWRtaW4xMjM=")
    );
}

#[tokio::test]
async fn custom_credentials_are_used() {
    let backend = MockBackend::start();
    backend.route("GET", HISTORY_PATH, MockResponse::json(200, "[]"));

    let server = ServerConfig {
        base_url: backend.url(),
        fallback_urls: Vec::new(),
        timeout_secs: None,
    };
    let auth = AuthConfig {
        username: "analyst".to_string(),
        password: "s3cret".to_string(),
    };
    let history = ApiClient::new(&server, &auth)
        .unwrap()
        .fetch_history()
        .await
        .unwrap();

    assert!(history.is_empty());
    assert_eq!(
        backend.requests()[0].header("authorization"),
        Some("Basic YW5hbHlzdDpzM2NyZXQ=")
    );
}

#[tokio::test]
async fn upload_posts_csv_as_multipart_file_field() {
    let backend = MockBackend::start();
    backend.route("POST", UPLOAD_PATH, MockResponse::json(201, SUMMARY_BODY));

    let csv = b"Equipment Name,Type,Flowrate,Pressure,Temperature\nPump-1,Pump,120,5.2,110\n";
    let summary = client_for(&[backend.url()])
        .upload_csv("sample.csv", csv.to_vec())
        .await
        .unwrap();

    assert_eq!(summary.total_count, 15);
    assert_eq!(summary.avg_temperature, 117.47);
    let types: Vec<(&str, u64)> = summary.type_distribution.iter().collect();
    assert_eq!(types[0], ("Valve", 4));
    assert_eq!(types[5], ("Condenser", 1));

    let request = &backend.requests()[0];
    assert_eq!(request.method, "POST");
    assert!(request
        .header("content-type")
        .unwrap()
        .starts_with("multipart/form-data; boundary="));
    let body = request.body_text();
    assert!(body.contains(r#"name="file"; filename="sample.csv""#));
    assert!(body.contains("Content-Type: text/csv"));
    assert!(body.contains("Pump-1,Pump,120,5.2,110"));
}

#[tokio::test]
async fn upload_error_carries_backend_message() {
    let backend = MockBackend::start();
    backend.route(
        "POST",
        UPLOAD_PATH,
        MockResponse::json(400, r#"{"error":"Missing columns: Pressure"}"#),
    );

    let err = client_for(&[backend.url()])
        .upload_csv("broken.csv", b"a,b\n1,2\n".to_vec())
        .await
        .unwrap_err();

    match err {
        ApiError::Backend { status, message } => {
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(message.as_deref(), Some("Missing columns: Pressure"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn non_json_error_body_has_no_message() {
    let backend = MockBackend::start();
    backend.route(
        "POST",
        UPLOAD_PATH,
        MockResponse::html(500, "<h1>Server Error (500)</h1>"),
    );

    let err = client_for(&[backend.url()])
        .upload_csv("sample.csv", b"x".to_vec())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ApiError::Backend { status, message: None } if status == StatusCode::INTERNAL_SERVER_ERROR
    ));
}

#[tokio::test]
async fn malformed_success_body_is_a_decode_error() {
    let backend = MockBackend::start();
    backend.route("GET", HISTORY_PATH, MockResponse::json(200, r#"{"results":[]}"#));

    let err = client_for(&[backend.url()]).fetch_history().await.unwrap_err();
    assert!(matches!(err, ApiError::Decode(_)));
}

#[tokio::test]
async fn report_filename_comes_from_content_disposition() {
    let backend = MockBackend::start();
    backend.route(
        "GET",
        REPORT_PATH,
        MockResponse::pdf(b"%PDF-1.4 report", Some(r#"attachment; filename="report_12.pdf""#)),
    );

    let report = client_for(&[backend.url()]).download_report().await.unwrap();

    assert_eq!(report.file_name, "report_12.pdf");
    assert_eq!(report.bytes, b"%PDF-1.4 report");
}

#[tokio::test]
async fn report_without_content_disposition_is_report_pdf() {
    let backend = MockBackend::start();
    backend.route("GET", REPORT_PATH, MockResponse::pdf(b"%PDF-1.4", None));

    let report = client_for(&[backend.url()]).download_report().await.unwrap();
    assert_eq!(report.file_name, "report.pdf");
}

#[tokio::test]
async fn refused_connection_falls_back_to_next_url() {
    let backend = MockBackend::start();
    backend.route("GET", HISTORY_PATH, MockResponse::json(200, "[]"));
    backend.route("GET", REPORT_PATH, MockResponse::pdf(b"%PDF", None));

    let client = client_for(&[refused_url(), backend.url()]);
    client.fetch_history().await.unwrap();
    assert_eq!(client.active_base_url(), backend.url());

    // Clones share the switch.
    let clone = client.clone();
    clone.download_report().await.unwrap();
    assert_eq!(backend.requests().len(), 2);
}

#[tokio::test]
async fn all_urls_refused_is_a_request_error() {
    let client = client_for(&[refused_url(), refused_url()]);
    let err = client.fetch_history().await.unwrap_err();
    assert!(matches!(err, ApiError::Request(_)));
}
