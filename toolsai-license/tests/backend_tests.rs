use toolsai_license::{
    HttpBackend, HttpBackendConfig, InitResponse, LicenseError, LicensingBackend, MockBackend,
};
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── MockBackend ─────────────────────────────────────────────────

#[tokio::test]
async fn mock_backend_first_init_issues_session() {
    let backend = MockBackend::new();
    let res = backend.init().await.unwrap();
    assert!(res.success);
    assert!(res.session_id.is_some());
    assert!(res.message.contains("initialized"));
}

#[tokio::test]
async fn mock_backend_second_init_reports_already_initialized() {
    let backend = MockBackend::new();
    backend.init().await.unwrap();
    let res = backend.init().await.unwrap();
    assert!(res.success);
    assert!(res.session_id.is_none());
    assert!(res.message.contains("already"));
}

// ── InitResponse ────────────────────────────────────────────────

#[test]
fn init_response_accepts_both_session_id_spellings() {
    let id = uuid::Uuid::new_v4();
    let camel: InitResponse = serde_json::from_str(&format!(
        r#"{{"success":true,"message":"ok","sessionId":"{id}"}}"#
    ))
    .unwrap();
    let lower: InitResponse = serde_json::from_str(&format!(
        r#"{{"success":true,"message":"ok","sessionid":"{id}"}}"#
    ))
    .unwrap();
    assert_eq!(camel, lower);
    assert_eq!(camel.session_id.unwrap().as_uuid(), id);
}

#[test]
fn init_response_session_id_optional() {
    let res: InitResponse =
        serde_json::from_str(r#"{"success":false,"message":"disabled"}"#).unwrap();
    assert!(!res.success);
    assert!(res.session_id.is_none());
}

// ── HttpBackend ─────────────────────────────────────────────────

fn config_for(server: &MockServer) -> HttpBackendConfig {
    HttpBackendConfig {
        url: format!("{}/api/1.2/", server.uri()),
        owner_id: "owner123".to_string(),
        timeout_secs: 5,
        ..Default::default()
    }
}

#[test]
fn http_backend_config_defaults() {
    let cfg = HttpBackendConfig::default();
    assert_eq!(cfg.app_name, "Tools-AI");
    assert_eq!(cfg.version, "1.0");
    assert_eq!(cfg.timeout_secs, 30);
}

#[tokio::test]
async fn http_backend_init_success() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/1.2/"))
        .and(body_string_contains("type=init"))
        .and(body_string_contains("ownerid=owner123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": true,
            "message": "Initialized",
            "sessionid": uuid::Uuid::new_v4().to_string()
        })))
        .expect(1)
        .mount(&server)
        .await;

    let backend = HttpBackend::new(config_for(&server)).unwrap();
    let res = backend.init().await.unwrap();
    assert!(res.success);
    assert!(res.session_id.is_some());
}

#[tokio::test]
async fn http_backend_refusal_is_ok_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": false,
            "message": "Application is disabled"
        })))
        .mount(&server)
        .await;

    let backend = HttpBackend::new(config_for(&server)).unwrap();
    let res = backend.init().await.unwrap();
    assert!(!res.success);
    assert_eq!(res.message, "Application is disabled");
}

#[tokio::test]
async fn http_backend_server_error_is_transport() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let backend = HttpBackend::new(config_for(&server)).unwrap();
    let err = backend.init().await.unwrap_err();
    assert!(matches!(err, LicenseError::Transport(_)));
}

#[tokio::test]
async fn http_backend_malformed_body_is_transport() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("oops"))
        .mount(&server)
        .await;

    let backend = HttpBackend::new(config_for(&server)).unwrap();
    assert!(matches!(
        backend.init().await,
        Err(LicenseError::Transport(_))
    ));
}

#[tokio::test]
async fn http_backend_unreachable_is_transport() {
    let backend = HttpBackend::new(HttpBackendConfig {
        url: "http://127.0.0.1:9/api".to_string(),
        timeout_secs: 2,
        ..Default::default()
    })
    .unwrap();
    assert!(matches!(
        backend.init().await,
        Err(LicenseError::Transport(_))
    ));
}
