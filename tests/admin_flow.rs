//! End-to-end landing and admin flows against a stub backend

mod support;

use std::sync::Arc;
use std::time::Duration;
use support::{StubServer, ADMIN_PASSWORD, TOKEN};
use waitlist::api::DEFAULT_TIMEOUT;
use waitlist::{
    AdminDashboard, ApiClient, BaseUrl, DashboardConfig, FileTokenStore, LandingPage,
    LandingState, SessionState, TokenStore, WaitlistApi,
};

fn api_for(server: &StubServer) -> Arc<dyn WaitlistApi> {
    let base = BaseUrl::parse(&server.base_url()).unwrap();
    Arc::new(ApiClient::new(base, DEFAULT_TIMEOUT).unwrap())
}

fn dashboard(api: Arc<dyn WaitlistApi>, dir: &std::path::Path) -> AdminDashboard {
    AdminDashboard::new(
        api,
        Arc::new(FileTokenStore::new(dir)),
        DashboardConfig::default(),
    )
}

#[tokio::test]
async fn test_landing_signup() {
    let server = StubServer::start().await;
    let mut page = LandingPage::new(api_for(&server));

    page.refresh_count().await.unwrap();
    page.submit("ada@example.com").await.unwrap();

    assert_eq!(page.state(), LandingState::Submitted);
    assert_eq!(page.count(), Some(1));
    assert_eq!(server.emails(), vec!["ada@example.com"]);

    page.close();
    let result = page.submit("ada@example.com").await;
    assert!(result.is_err());
    assert_eq!(page.error(), Some("Email already registered for waitlist"));
    assert_eq!(page.state(), LandingState::Idle);
}

#[tokio::test]
async fn test_login_list_delete_logout() {
    let server = StubServer::start().await;
    server.seed(&["a@example.com", "b@example.com", "c@example.com"]);
    let dir = tempfile::tempdir().unwrap();
    let api = api_for(&server);

    let admin = dashboard(api.clone(), dir.path());
    admin.login(ADMIN_PASSWORD).await.unwrap();
    admin.unmount();

    let store = FileTokenStore::new(dir.path());
    assert_eq!(store.load().unwrap().unwrap().as_str(), TOKEN);

    let snapshot = admin.snapshot().await;
    assert_eq!(snapshot.session, SessionState::Authenticated);
    assert_eq!(snapshot.stats.total, 3);
    assert_eq!(snapshot.stats.today, 3);
    let ids: Vec<i64> = snapshot.signups.iter().map(|s| s.id).collect();
    assert_eq!(ids, vec![3, 2, 1]);

    admin.delete(2).await.unwrap();
    let ids: Vec<i64> = admin.signups().await.iter().map(|s| s.id).collect();
    assert_eq!(ids, vec![3, 1]);

    // A new process picks up the stored session
    let restored = dashboard(api.clone(), dir.path());
    assert_eq!(restored.mount().await, SessionState::Authenticated);
    assert_eq!(restored.signups().await.len(), 2);

    restored.logout().await.unwrap();
    assert!(!store.path().exists());
    assert!(!restored.is_polling());

    let fresh = dashboard(api, dir.path());
    assert_eq!(fresh.mount().await, SessionState::Unauthenticated);
}

#[tokio::test]
async fn test_expired_stored_token_is_dropped() {
    let server = StubServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let store = FileTokenStore::new(dir.path());
    store.save(&waitlist::SessionToken::new(TOKEN)).unwrap();

    let admin = dashboard(api_for(&server), dir.path());
    assert_eq!(admin.mount().await, SessionState::Unauthenticated);
    assert!(store.load().unwrap().is_none());

    let notices = admin.drain_notices().await;
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].message, "Session expired. Please login again.");
}

#[tokio::test]
async fn test_polling_picks_up_new_signups() {
    let server = StubServer::start().await;
    server.seed(&["a@example.com"]);
    let dir = tempfile::tempdir().unwrap();
    let admin = AdminDashboard::new(
        api_for(&server),
        Arc::new(FileTokenStore::new(dir.path())),
        DashboardConfig {
            poll_interval: Duration::from_millis(100),
        },
    );

    admin.login(ADMIN_PASSWORD).await.unwrap();
    assert_eq!(admin.signups().await.len(), 1);

    server.seed(&["b@example.com"]);
    tokio::time::sleep(Duration::from_millis(500)).await;
    assert_eq!(admin.signups().await.len(), 2);

    server.expire_tokens();
    tokio::time::sleep(Duration::from_millis(500)).await;
    assert_eq!(admin.session().await, SessionState::Unauthenticated);
    assert!(!admin.is_polling());

    let polls = server
        .requests()
        .iter()
        .filter(|r| *r == "GET /api/waitlist/list")
        .count();
    tokio::time::sleep(Duration::from_millis(300)).await;
    let after = server
        .requests()
        .iter()
        .filter(|r| *r == "GET /api/waitlist/list")
        .count();
    assert_eq!(polls, after);
}
