//! End-to-end tests: a `Gatehouse` wired to a directory that speaks the
//! backend's JSON envelope.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use gatehouse::prelude::*;

// =========================================================================
// JSON-speaking directory
// =========================================================================

/// Serves raw response bodies, like an HTTP client would hand them over.
#[derive(Default)]
struct Backend {
    current_user_body: Mutex<String>,
    logout_body: Mutex<String>,
    fetches: AtomicUsize,
}

#[derive(Clone, Default)]
struct Directory(Arc<Backend>);

impl Directory {
    fn serving(current_user_body: &str) -> Self {
        let directory = Self::default();
        directory.set_current_user(current_user_body);
        directory.set_logout(r#"{"code":0,"data":true}"#);
        directory
    }

    fn set_current_user(&self, body: &str) {
        *self.0.current_user_body.lock().unwrap() = body.to_string();
    }

    fn set_logout(&self, body: &str) {
        *self.0.logout_body.lock().unwrap() = body.to_string();
    }

    fn fetches(&self) -> usize {
        self.0.fetches.load(Ordering::SeqCst)
    }
}

impl UserDirectory for Directory {
    async fn current_user(&self) -> Result<DirectoryReply<Identity>, DirectoryError> {
        self.0.fetches.fetch_add(1, Ordering::SeqCst);
        let body = self.0.current_user_body.lock().unwrap().clone();
        Ok(decode_reply(&JsonCodec, body.as_bytes())?)
    }

    async fn logout(&self) -> Result<DirectoryReply<()>, DirectoryError> {
        let body = self.0.logout_body.lock().unwrap().clone();
        Ok(decode_ack(&JsonCodec, body.as_bytes())?)
    }
}

const ALICE: &str = r#"{"code":0,"data":{"id":1,"userName":"alice","userRole":"user"}}"#;
const ROOT: &str = r#"{"code":0,"data":{"displayName":"root","role":"ADMIN"}}"#;
const NOT_LOGGED_IN: &str = r#"{"code":40100,"data":null,"message":"未登录"}"#;

fn routes() -> Vec<RouteRecord> {
    vec![
        RouteRecord::new("/", "HomePage").named("home"),
        RouteRecord::new("/user/login", "UserLoginPage").hidden(),
        RouteRecord::new("/noAuth", "NoAuthPage").hidden(),
        RouteRecord::new("/question/:id", "QuestionPage").requires(Role::User),
        RouteRecord::new("/admin/user", "UserManagePage").requires(Role::Admin),
    ]
}

fn app(directory: &Directory) -> Gatehouse<Directory> {
    GatehouseBuilder::new()
        .routes(routes())
        .build(directory.clone())
        .expect("app should build")
}

// =========================================================================
// Building
// =========================================================================

#[test]
fn test_build_without_routes_fails() {
    let result = GatehouseBuilder::new().build(Directory::default());
    assert!(matches!(
        result.err(),
        Some(GatehouseError::Router(gatehouse::router::RouterError::EmptyCatalog))
    ));
}

#[test]
fn test_build_without_forbidden_route_fails() {
    let result = GatehouseBuilder::new()
        .route(RouteRecord::new("/", "Home"))
        .route(RouteRecord::new("/user/login", "Login"))
        .build(Directory::default());
    assert!(matches!(
        result.err(),
        Some(GatehouseError::Router(gatehouse::router::RouterError::InvalidCatalog(_)))
    ));
}

#[test]
fn test_build_does_not_fetch() {
    let directory = Directory::serving(ALICE);
    let app = app(&directory);

    assert_eq!(app.store().status(), SessionStatus::Uninitialized);
    assert_eq!(directory.fetches(), 0);
}

// =========================================================================
// Startup
// =========================================================================

#[tokio::test]
async fn test_start_authenticated_user_makes_one_fetch() {
    let directory = Directory::serving(ALICE);
    let mut app = app(&directory);

    let outcome = app.start().await;

    assert!(outcome.is_allowed());
    assert_eq!(app.store().current_role(), Role::User);
    assert_eq!(app.store().display_name(), "alice");
    assert_eq!(app.store().identity().and_then(|identity| identity.id), Some(1));
    assert_eq!(directory.fetches(), 1);
}

#[tokio::test]
async fn test_start_not_logged_in_is_anonymous() {
    let directory = Directory::serving(NOT_LOGGED_IN);
    let mut app = app(&directory);

    app.start().await;

    assert_eq!(app.store().status(), SessionStatus::Anonymous);
    assert_eq!(app.store().current_role(), Role::NotLogin);
    assert_eq!(app.store().display_name(), "Not logged in");
}

#[tokio::test]
async fn test_start_on_restricted_initial_path_redirects_to_login() {
    let directory = Directory::serving(NOT_LOGGED_IN);
    let config = GatehouseConfig::from_json_str(r#"{"initial_path":"/admin/user"}"#).unwrap();
    let mut app = GatehouseBuilder::new()
        .config(config)
        .routes(routes())
        .build(directory.clone())
        .unwrap();

    let outcome = app.start().await;

    assert_eq!(outcome.decision(), Decision::DenyUnauthenticated);
    assert_eq!(
        app.router().current().unwrap().to_hash(),
        "#/user/login?redirect=%2Fadmin%2Fuser"
    );
}

#[tokio::test]
async fn test_start_with_malformed_payload_evaluates_as_not_logged_in() {
    let directory = Directory::serving(r#"{"code":0,"data":{"displayName":"x","role":"root"}}"#);
    let mut app = app(&directory);

    let outcome = app.start().await;

    assert!(outcome.is_allowed());
    assert_eq!(app.store().status(), SessionStatus::Uninitialized);
    assert!(matches!(
        app.refresh().await,
        Err(GatehouseError::Session(SessionError::Fetch(DirectoryError::Malformed(_))))
    ));
}

// =========================================================================
// Login / logout round trip
// =========================================================================

#[tokio::test]
async fn test_complete_login_follows_redirect() {
    let directory = Directory::serving(NOT_LOGGED_IN);
    let mut app = app(&directory);
    app.start().await;
    app.navigate("/admin/user").await;
    assert_eq!(app.router().current().unwrap().path, "/user/login");

    directory.set_current_user(ROOT);
    let outcome = app.complete_login().await.unwrap();

    assert!(outcome.is_allowed());
    assert_eq!(app.router().current().unwrap().path, "/admin/user");
    assert_eq!(app.router().history_len(), 2);
}

#[tokio::test]
async fn test_complete_login_without_redirect_goes_to_initial_path() {
    let directory = Directory::serving(NOT_LOGGED_IN);
    let mut app = app(&directory);
    app.start().await;
    app.navigate("/user/login").await;

    directory.set_current_user(ALICE);
    app.complete_login().await.unwrap();

    assert_eq!(app.router().current().unwrap().path, "/");
}

#[tokio::test]
async fn test_complete_login_with_low_role_lands_on_forbidden() {
    let directory = Directory::serving(NOT_LOGGED_IN);
    let mut app = app(&directory);
    app.start().await;
    app.navigate("/admin/user").await;

    directory.set_current_user(ALICE);
    let outcome = app.complete_login().await.unwrap();

    assert_eq!(outcome.decision(), Decision::DenyInsufficientRole);
    assert_eq!(app.router().current().unwrap().path, "/noAuth");
}

#[tokio::test]
async fn test_logout_on_restricted_page_moves_to_login() {
    let directory = Directory::serving(ALICE);
    let mut app = app(&directory);
    app.start().await;
    app.navigate("/question/3").await;

    let outcome = app.logout().await.unwrap().expect("there is a current page");

    assert_eq!(app.store().status(), SessionStatus::Anonymous);
    assert_eq!(outcome.decision(), Decision::DenyUnauthenticated);
    assert_eq!(
        app.router().current().unwrap().redirect_target(),
        Some(Location::parse("/question/3"))
    );
}

#[tokio::test]
async fn test_logout_rejected_keeps_session_and_page() {
    let directory = Directory::serving(ALICE);
    directory.set_logout(r#"{"code":50000,"message":"system error"}"#);
    let mut app = app(&directory);
    app.start().await;
    app.navigate("/question/3").await;

    let err = app.logout().await.unwrap_err();

    assert!(matches!(
        err,
        GatehouseError::Session(SessionError::LogoutRejected { code: 50000, .. })
    ));
    assert_eq!(app.store().status(), SessionStatus::Authenticated);
    assert_eq!(app.router().current().unwrap().path, "/question/3");
}

#[tokio::test]
async fn test_observer_sees_whole_lifecycle() {
    let directory = Directory::serving(ALICE);
    let mut app = app(&directory);
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let _sub = app
        .store()
        .subscribe(move |state| sink.lock().unwrap().push(state.status()));

    app.start().await;
    app.logout().await.unwrap();

    assert_eq!(
        *seen.lock().unwrap(),
        vec![
            SessionStatus::Loading,
            SessionStatus::Authenticated,
            SessionStatus::Anonymous
        ]
    );
}

// =========================================================================
// Menus
// =========================================================================

#[tokio::test]
async fn test_menu_tracks_role() {
    let directory = Directory::serving(ROOT);
    let mut app = app(&directory);
    let paths = |app: &Gatehouse<Directory>| {
        app.menu()
            .into_iter()
            .map(|record| record.path.clone())
            .collect::<Vec<_>>()
    };
    assert_eq!(paths(&app), vec!["/"]);

    app.start().await;

    assert_eq!(paths(&app), vec!["/", "/question/:id", "/admin/user"]);
}
