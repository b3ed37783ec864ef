use std::sync::Arc;

use broadcast_client::{
    GroupCache, GroupDirectory, GroupScope, MemoryStore, ScopedListKey, SessionContext, Transport,
};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn sample_groups() -> serde_json::Value {
    serde_json::json!([
        {"id": 100, "title": "supergroup", "username": "sg", "is_megagroup": true, "is_channel": true, "member_count": 250},
        {"id": 200, "title": "plain channel", "username": null, "is_megagroup": false, "is_channel": true, "member_count": null}
    ])
}

struct Fixture {
    directory: GroupDirectory,
    session: SessionContext,
    store: Arc<MemoryStore>,
}

fn fixture(server: &MockServer) -> Fixture {
    let store = Arc::new(MemoryStore::new());
    let transport = Arc::new(Transport::new(server.uri(), "secret-token").unwrap());
    let directory = GroupDirectory::new(transport, GroupCache::new(store.clone()));
    let mut session = SessionContext::load(store.clone());
    session.set_account("main");
    Fixture {
        directory,
        session,
        store,
    }
}

#[tokio::test]
async fn nonempty_narrow_result_is_cached_without_widening() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/groups"))
        .and(query_param("only_groups", "true"))
        .and(query_param("account", "main"))
        .and(query_param("refresh", "false"))
        .respond_with(ResponseTemplate::new(200).set_body_json(sample_groups()))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/groups"))
        .and(query_param("only_groups", "false"))
        .respond_with(ResponseTemplate::new(200).set_body_json(sample_groups()))
        .expect(0)
        .mount(&server)
        .await;

    let mut fx = fixture(&server);
    let groups = fx.directory.fetch(&mut fx.session, false).await.unwrap();
    assert_eq!(groups.len(), 2);
    assert!(groups[0].sendable());
    assert!(!groups[1].sendable());
    assert_eq!(fx.session.scope(), GroupScope::GroupsOnly);

    let cached = fx
        .directory
        .cached(&ScopedListKey::new("main", GroupScope::GroupsOnly))
        .expect("written through");
    assert_eq!(cached.len(), 2);
}

#[tokio::test]
async fn empty_narrow_widens_exactly_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/groups"))
        .and(query_param("only_groups", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/groups"))
        .and(query_param("only_groups", "false"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let mut fx = fixture(&server);
    let groups = fx.directory.fetch(&mut fx.session, false).await.unwrap();
    assert!(groups.is_empty(), "empty wide result is returned as-is");

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2, "one narrow fetch, one wide fetch, nothing more");
}

#[tokio::test]
async fn widened_result_replaces_empty_narrow_and_persists_preference() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/groups"))
        .and(query_param("only_groups", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/groups"))
        .and(query_param("only_groups", "false"))
        .respond_with(ResponseTemplate::new(200).set_body_json(sample_groups()))
        .expect(1)
        .mount(&server)
        .await;

    let mut fx = fixture(&server);
    let groups = fx.directory.fetch(&mut fx.session, false).await.unwrap();
    assert_eq!(groups.len(), 2);
    assert_eq!(fx.session.scope(), GroupScope::All);

    // The preference survives a session reload.
    let restored = SessionContext::load(fx.store.clone());
    assert_eq!(restored.scope(), GroupScope::All);

    // Both fetches wrote through: the wide key holds the listing, the narrow
    // key mirrors the authoritative empty response.
    assert_eq!(
        fx.directory
            .cached(&ScopedListKey::new("main", GroupScope::All))
            .map(|g| g.len()),
        Some(2)
    );
    assert_eq!(
        fx.directory
            .cached(&ScopedListKey::new("main", GroupScope::GroupsOnly))
            .map(|g| g.len()),
        Some(0)
    );
}

#[tokio::test]
async fn empty_success_supersedes_cached_listing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/groups"))
        .and(query_param("only_groups", "false"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let mut fx = fixture(&server);
    fx.session.set_scope(GroupScope::All);
    let key = fx.session.list_key();

    // A previous session cached a non-empty listing under this key.
    let groups: Vec<broadcast_client::GroupInfo> =
        serde_json::from_value(sample_groups()).unwrap();
    GroupCache::new(fx.store.clone()).write(&key, &groups);
    assert_eq!(fx.directory.cached(&key).map(|g| g.len()), Some(2));

    let live = fx.directory.fetch(&mut fx.session, false).await.unwrap();
    assert!(live.is_empty());
    assert_eq!(
        fx.directory.cached(&key).map(|g| g.len()),
        Some(0),
        "the authoritative empty listing replaces the stale cached one"
    );
}

#[tokio::test]
async fn failed_widening_falls_back_to_empty_narrow_result() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/groups"))
        .and(query_param("only_groups", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/groups"))
        .and(query_param("only_groups", "false"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let mut fx = fixture(&server);
    let groups = fx.directory.fetch(&mut fx.session, false).await.unwrap();
    assert!(groups.is_empty());
    assert_eq!(
        fx.session.scope(),
        GroupScope::GroupsOnly,
        "preference is only learned from a successful wide fetch"
    );
}

#[tokio::test]
async fn refresh_flag_is_forwarded_to_the_server() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/groups"))
        .and(query_param("refresh", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(sample_groups()))
        .expect(1)
        .mount(&server)
        .await;

    let mut fx = fixture(&server);
    fx.directory.fetch(&mut fx.session, true).await.unwrap();
}

#[tokio::test]
async fn bad_token_surfaces_auth_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/groups"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let mut fx = fixture(&server);
    let err = fx.directory.fetch(&mut fx.session, false).await.unwrap_err();
    assert!(matches!(err, broadcast_client::ClientError::Auth), "got {err:?}");
}

#[tokio::test]
async fn account_and_log_endpoints_parse() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/accounts/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {"account": "main", "authorized": true},
            {"account": "backup", "authorized": false}
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/account-status"))
        .and(query_param("account", "backup"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"authorized": false})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/logs"))
        .and(query_param("limit", "50"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {"id": 1, "group_id": 100, "group_title": "supergroup", "message_preview": "hi",
             "status": "success", "error": null, "message_id": 7, "parse_mode": "plain",
             "created_at": "2026-08-30 12:00:00"}
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/groups/cache/clear"))
        .and(query_param("account", "main"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
        .expect(1)
        .mount(&server)
        .await;

    let fx = fixture(&server);

    let accounts = fx.directory.accounts().await.unwrap();
    assert_eq!(accounts.len(), 2);
    assert!(accounts[0].authorized);

    let auth = fx.directory.auth_status("backup").await.unwrap();
    assert!(!auth.authorized);

    let logs = fx.directory.recent_logs(50).await.unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].message_id, Some(7));

    fx.directory.clear_server_cache(Some("main")).await.unwrap();
}
