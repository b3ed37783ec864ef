use std::time::Duration;

use broadcast_client::{ClientError, Transport};
use serde_json::Value;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn transport(server: &MockServer) -> Transport {
    Transport::new(server.uri(), "secret-token").expect("client builds")
}

#[tokio::test]
async fn returns_third_attempt_after_two_timeouts() {
    let server = MockServer::start().await;
    // First two attempts stall past the per-attempt timeout.
    Mock::given(method("GET"))
        .and(path("/api/accounts/status"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(Value::Array(vec![]))
                .set_delay(Duration::from_secs(5)),
        )
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/accounts/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {"account": "main", "authorized": true}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let result: Vec<Value> = transport(&server)
        .get_json(
            "/api/accounts/status",
            &[],
            Duration::from_millis(300),
            3,
        )
        .await
        .expect("third attempt succeeds");
    assert_eq!(result.len(), 1);
}

#[tokio::test]
async fn timeout_on_final_attempt_propagates() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/logs"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(Value::Array(vec![]))
                .set_delay(Duration::from_secs(5)),
        )
        .expect(2)
        .mount(&server)
        .await;

    let err = transport(&server)
        .get_json::<Vec<Value>>("/api/logs", &[], Duration::from_millis(200), 2)
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Timeout { .. }), "got {err:?}");
}

#[tokio::test]
async fn rate_limit_short_circuits_the_retry_loop() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/accounts/status"))
        .respond_with(ResponseTemplate::new(429))
        .expect(1)
        .mount(&server)
        .await;

    let err = transport(&server)
        .get_json::<Vec<Value>>("/api/accounts/status", &[], Duration::from_secs(2), 3)
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::RateLimited), "got {err:?}");

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1, "429 must not be retried");
}

#[tokio::test]
async fn other_failures_exhaust_the_budget_then_surface() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/accounts/status"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(3)
        .mount(&server)
        .await;

    let err = transport(&server)
        .get_json::<Vec<Value>>("/api/accounts/status", &[], Duration::from_secs(2), 3)
        .await
        .unwrap_err();
    match err {
        ClientError::Api { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message, "boom");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn status_codes_map_onto_the_taxonomy() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/unauthorized"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/not-logged-in"))
        .respond_with(
            ResponseTemplate::new(403)
                .set_body_json(serde_json::json!({"detail": "session_not_authorized"})),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/forbidden-other"))
        .respond_with(ResponseTemplate::new(403).set_body_json(serde_json::json!({"detail": "nope"})))
        .mount(&server)
        .await;

    let transport = transport(&server);
    let timeout = Duration::from_secs(2);

    let err = transport
        .get_json::<Value>("/unauthorized", &[], timeout, 1)
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Auth), "got {err:?}");

    let err = transport
        .get_json::<Value>("/not-logged-in", &[], timeout, 1)
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Permission), "got {err:?}");

    let err = transport
        .get_json::<Value>("/forbidden-other", &[], timeout, 1)
        .await
        .unwrap_err();
    assert!(
        matches!(err, ClientError::Api { status: 403, .. }),
        "undocumented 403 reasons stay generic, got {err:?}"
    );
}

#[tokio::test]
async fn admin_token_rides_on_every_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/accounts/status"))
        .and(wiremock::matchers::header("X-Admin-Token", "secret-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(Value::Array(vec![])))
        .expect(1)
        .mount(&server)
        .await;

    transport(&server)
        .get_json::<Vec<Value>>("/api/accounts/status", &[], Duration::from_secs(2), 1)
        .await
        .expect("matched only with the token header");
}
