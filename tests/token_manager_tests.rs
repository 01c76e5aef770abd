mod auth_support;

use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::json;
use tenantctl::auth::{AuthError, ManualClock, TokenManager, TokenStore};
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use auth_support::{
    error_body, form_encoded, holding, http_client, manager, token_body, CLIENT_ID,
    DEVICE_CODE_PATH, GRAPH, NOW, TOKEN_PATH,
};

#[tokio::test]
async fn fresh_token_makes_no_request() {
    let server = MockServer::start().await;
    let clock = Arc::new(ManualClock::new(NOW));
    let mgr = manager(&server, &clock).with_store(holding("AT0", Some("RT0"), NOW + 600));

    assert_eq!(mgr.ensure_access_token(GRAPH).await.unwrap(), "AT0");
    assert_eq!(
        mgr.ensure_access_token("https://contoso.sharepoint.com")
            .await
            .unwrap(),
        "AT0"
    );
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn device_code_flow_polls_until_authorized() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(DEVICE_CODE_PATH))
        .and(header("accept", "application/json"))
        .and(query_param("resource", GRAPH))
        .and(query_param("client_id", CLIENT_ID))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "user_code": "XYZ",
            "device_code": "abc",
            "verification_url": "https://login.example.com/device",
            "expires_in": "900",
            "interval": "5",
            "message": "go to url, enter XYZ"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string_contains("grant_type=device_code"))
        .and(body_string_contains("code=abc"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "authorization_pending",
            "error_description": "AADSTS70016: OAuth 2.0 device flow error. Authorization is pending."
        })))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .and(body_string_contains("grant_type=device_code"))
        .and(body_string_contains(format!("resource={}", form_encoded(GRAPH))))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("AT1", "RT1", NOW + 3_600)))
        .expect(1)
        .mount(&server)
        .await;

    let clock = Arc::new(ManualClock::new(NOW));
    let shown = Arc::new(std::sync::Mutex::new(Vec::<String>::new()));
    let sink = shown.clone();
    let mgr = manager(&server, &clock)
        .with_prompt(move |message| sink.lock().unwrap().push(message.to_string()));

    let token = mgr.ensure_access_token(GRAPH).await.expect("authorized");

    assert_eq!(token, "AT1");
    let store = mgr.snapshot().await;
    assert_eq!(store.access_token, "AT1");
    assert_eq!(store.refresh_token.as_deref(), Some("RT1"));
    assert_eq!(store.expires_at, NOW + 3_600);
    assert_eq!(clock.sleeps(), vec![Duration::from_secs(5); 3]);
    assert_eq!(shown.lock().unwrap().as_slice(), ["go to url, enter XYZ"]);
    server.verify().await;
}

#[tokio::test]
async fn terminal_poll_error_stops_the_timer() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(DEVICE_CODE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "device_code": "abc",
            "interval": 1,
            "message": "sign in"
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(error_body("code_expired", "device code expired")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let clock = Arc::new(ManualClock::new(NOW));
    let mgr = manager(&server, &clock);

    let err = mgr.ensure_access_token(GRAPH).await.unwrap_err();

    assert_eq!(err.code(), Some("code_expired"));
    assert_eq!(clock.sleeps().len(), 1);
    assert_eq!(mgr.snapshot().await, TokenStore::default());
    server.verify().await;
}

#[tokio::test]
async fn expired_token_is_refreshed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .and(header("accept", "application/json"))
        .and(body_string_contains("grant_type=refresh_token"))
        .and(body_string_contains("refresh_token=RT1"))
        .and(body_string_contains(format!("client_id={CLIENT_ID}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("AT2", "RT2", NOW + 3_600)))
        .expect(1)
        .mount(&server)
        .await;

    let clock = Arc::new(ManualClock::new(NOW));
    let mgr = manager(&server, &clock).with_store(holding("AT1", Some("RT1"), NOW - 5));

    assert_eq!(mgr.ensure_access_token(GRAPH).await.unwrap(), "AT2");
    assert_eq!(mgr.ensure_access_token(GRAPH).await.unwrap(), "AT2");
    assert_eq!(mgr.snapshot().await, holding("AT2", Some("RT2"), NOW + 3_600));
    server.verify().await;
}

#[tokio::test]
async fn revoked_refresh_token_is_rejected_without_touching_the_store() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .and(body_string_contains("grant_type=refresh_token"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(error_body("invalid_grant", "token revoked")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let clock = Arc::new(ManualClock::new(NOW));
    let before = holding("AT1", Some("RT1"), NOW - 5);
    let mgr = manager(&server, &clock).with_store(before.clone());

    let err = mgr.ensure_access_token(GRAPH).await.unwrap_err();

    assert_eq!(err.to_string(), "invalid_grant");
    match &err {
        AuthError::AuthorizationFailed { description, .. } => {
            assert_eq!(description.as_deref(), Some("token revoked"));
        }
        other => panic!("expected AuthorizationFailed, got {other:?}"),
    }
    assert_eq!(mgr.snapshot().await, before);
    server.verify().await;
}

#[tokio::test]
async fn unreachable_authority_surfaces_network_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(token_body("late", "late", NOW + 3_600))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let clock = Arc::new(ManualClock::new(NOW));
    let before = holding("AT1", Some("RT1"), NOW - 5);
    let mgr = TokenManager::new(Arc::new(http_client(&server, Duration::from_millis(200))))
        .with_clock(clock.clone())
        .with_store(before.clone());

    let err = mgr.ensure_access_token(GRAPH).await.unwrap_err();

    assert!(matches!(err, AuthError::Network(_)), "got {err:?}");
    assert_eq!(mgr.snapshot().await, before);
}

#[tokio::test]
async fn malformed_token_answer_is_invalid_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(503).set_body_string("Service Unavailable"))
        .mount(&server)
        .await;

    let clock = Arc::new(ManualClock::new(NOW));
    let mgr = manager(&server, &clock).with_store(holding("AT1", Some("RT1"), NOW - 5));

    let err = mgr.ensure_access_token(GRAPH).await.unwrap_err();
    assert!(matches!(err, AuthError::InvalidResponse(m) if m.contains("status 503")));
}

#[tokio::test]
async fn explicit_refresh_token_resolves_out_of_band() {
    let server = MockServer::start().await;
    let admin = "https://contoso-admin.sharepoint.com";
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .and(body_string_contains("refresh_token=RT-admin"))
        .and(body_string_contains(format!("resource={}", form_encoded(admin))))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("AT-admin", "RT-new", NOW + 3_600)))
        .expect(1)
        .mount(&server)
        .await;

    let clock = Arc::new(ManualClock::new(NOW));
    let before = holding("AT1", Some("RT1"), NOW + 600);
    let mgr = manager(&server, &clock).with_store(before.clone());

    let token = mgr.get_access_token(admin, "RT-admin").await.unwrap();

    assert_eq!(token, "AT-admin");
    assert_eq!(mgr.snapshot().await, before);
    server.verify().await;
}

#[tokio::test]
async fn disconnect_forces_device_code_on_next_use() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(DEVICE_CODE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "device_code": "dc-2",
            "interval": 2,
            "message": "sign in again"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .and(body_string_contains("code=dc-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("AT9", "RT9", NOW + 3_600)))
        .expect(1)
        .mount(&server)
        .await;

    let clock = Arc::new(ManualClock::new(NOW));
    let mgr = manager(&server, &clock).with_store(holding("AT1", Some("RT1"), NOW + 600));
    mgr.disconnect().await.unwrap();
    assert_eq!(mgr.snapshot().await, TokenStore::default());

    assert_eq!(mgr.ensure_access_token(GRAPH).await.unwrap(), "AT9");
    server.verify().await;
}
