//! HTTP behaviour of `PagerDutyClient` against a mock PagerDuty server.

use pdack_api::{ApiError, ClientConfig, IncidentApi, PagerDutyClient, Session};
use pdack_core::IncidentStatus;
use serde_json::json;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_json, header, method, path, query_param},
};

const API_KEY: &str = "test-key";

fn client_for(server: &MockServer) -> PagerDutyClient {
    let config = ClientConfig::default().with_base_url(server.uri());
    PagerDutyClient::new(API_KEY, config).unwrap()
}

fn incident_json(id: &str, status: &str) -> serde_json::Value {
    json!({
        "id": id,
        "incident_number": 7,
        "status": status,
        "created_at": "2024-01-01T00:00:00Z",
        "service": {"summary": "payments"},
        "summary": format!("incident {id}"),
        "assignments": [],
        "priority": null
    })
}

async fn mount_incidents(server: &MockServer, status: &str, ids: &[&str]) {
    let incidents: Vec<_> = ids.iter().map(|id| incident_json(id, status)).collect();
    Mock::given(method("GET"))
        .and(path("/incidents"))
        .and(query_param("statuses[]", status))
        .and(query_param("user_ids[]", "PUSER01"))
        .and(query_param("limit", "100"))
        .and(header("Authorization", "Token token=test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "incidents": incidents,
            "limit": 100,
            "offset": 0,
            "more": false
        })))
        .mount(server)
        .await;
}

// ============================================================
// Current user
// ============================================================

#[tokio::test]
async fn test_current_user_resolves_id() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/me"))
        .and(header("Authorization", "Token token=test-key"))
        .and(header("Accept", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "user": {"id": "PUSER01", "name": "Kim Wexler", "email": "kim@example.com"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let session = Session::resolve(&client).await.unwrap();
    assert_eq!(session.user_id(), "PUSER01");
}

#[tokio::test]
async fn test_current_user_rejected_key_is_auth_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/me"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Unauthorized"))
        .mount(&server)
        .await;

    let err = client_for(&server).current_user().await.unwrap_err();
    match err {
        ApiError::Auth { status, ref body } => {
            assert_eq!(status, 401);
            assert_eq!(body, "Unauthorized");
        }
        other => panic!("Expected Auth, got: {:?}", other),
    }
}

#[tokio::test]
async fn test_current_user_server_error_is_auth_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/me"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = client_for(&server).current_user().await.unwrap_err();
    assert!(matches!(err, ApiError::Auth { status: 500, .. }));
}

// ============================================================
// Incident listing
// ============================================================

#[tokio::test]
async fn test_fetch_incidents_concatenates_in_status_order() {
    let server = MockServer::start().await;
    mount_incidents(&server, "triggered", &["T1", "T2"]).await;
    mount_incidents(&server, "acknowledged", &["A1", "A2", "A3"]).await;

    let incidents = client_for(&server)
        .fetch_incidents(
            "PUSER01",
            &[IncidentStatus::Triggered, IncidentStatus::Acknowledged],
        )
        .await
        .unwrap();

    let ids: Vec<_> = incidents.iter().map(|i| i.id.as_str()).collect();
    assert_eq!(ids, ["T1", "T2", "A1", "A2", "A3"]);
    assert!(incidents[..2].iter().all(|i| i.status == IncidentStatus::Triggered));
    assert!(incidents[2..].iter().all(|i| i.status == IncidentStatus::Acknowledged));
    assert_eq!(incidents[0].service, "payments");
}

#[tokio::test]
async fn test_fetch_incidents_failure_on_one_status_returns_nothing() {
    let server = MockServer::start().await;
    mount_incidents(&server, "triggered", &["T1", "T2"]).await;
    Mock::given(method("GET"))
        .and(path("/incidents"))
        .and(query_param("statuses[]", "acknowledged"))
        .respond_with(ResponseTemplate::new(503).set_body_string("Service Unavailable"))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .fetch_incidents(
            "PUSER01",
            &[IncidentStatus::Triggered, IncidentStatus::Acknowledged],
        )
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::Status { status: 503, .. }));
    assert!(err.is_transient());
}

#[tokio::test]
async fn test_fetch_incidents_malformed_payload_is_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/incidents"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"unexpected": true})))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .fetch_incidents("PUSER01", &[IncidentStatus::Triggered])
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Decode(_)), "got: {:?}", err);
}

#[tokio::test]
async fn test_fetch_incidents_skips_unqueryable_status() {
    let server = MockServer::start().await;
    mount_incidents(&server, "triggered", &["T1"]).await;

    let incidents = client_for(&server)
        .fetch_incidents("PUSER01", &[IncidentStatus::Other, IncidentStatus::Triggered])
        .await
        .unwrap();
    assert_eq!(incidents.len(), 1);
}

// ============================================================
// Acknowledge
// ============================================================

#[tokio::test]
async fn test_acknowledge_success_sends_reference_payload() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/incidents/PINC001"))
        .and(header("Authorization", "Token token=test-key"))
        .and(body_json(json!({
            "incident": {"type": "incident_reference", "status": "acknowledged"}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "incident": incident_json("PINC001", "acknowledged")
        })))
        .expect(1)
        .mount(&server)
        .await;

    let acked = client_for(&server)
        .acknowledge_incident("PINC001")
        .await
        .unwrap();
    assert!(acked);
}

#[tokio::test]
async fn test_acknowledge_conflict_returns_false() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/incidents/PINC001"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "error": {"message": "Incident Already Resolved", "code": 2001}
        })))
        .mount(&server)
        .await;

    let acked = client_for(&server)
        .acknowledge_incident("PINC001")
        .await
        .unwrap();
    assert!(!acked);
}

#[tokio::test]
async fn test_acknowledge_other_success_codes_return_false() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/incidents/PINC001"))
        .respond_with(ResponseTemplate::new(202))
        .mount(&server)
        .await;

    let acked = client_for(&server)
        .acknowledge_incident("PINC001")
        .await
        .unwrap();
    assert!(!acked, "only exactly 200 counts as acknowledged");
}

// ============================================================
// Transport failures
// ============================================================

#[tokio::test]
async fn test_connection_refused_is_network_error() {
    // Nothing listens on port 1
    let config = ClientConfig::default().with_base_url("http://127.0.0.1:1");
    let client = PagerDutyClient::new(API_KEY, config).unwrap();

    let err = client.current_user().await.unwrap_err();
    assert!(err.is_network_error(), "got: {:?}", err);
    assert!(err.is_transient());
}

#[tokio::test]
async fn test_slow_response_hits_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/incidents/PINC001"))
        .respond_with(ResponseTemplate::new(200).set_delay(std::time::Duration::from_secs(3)))
        .mount(&server)
        .await;

    let config = ClientConfig::default()
        .with_base_url(server.uri())
        .with_timeout_secs(1);
    let client = PagerDutyClient::new(API_KEY, config).unwrap();

    let err = client.acknowledge_incident("PINC001").await.unwrap_err();
    assert!(matches!(err, ApiError::Timeout(1)), "got: {:?}", err);
}
