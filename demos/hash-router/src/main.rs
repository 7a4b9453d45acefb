use std::sync::{Arc, Mutex};
use std::time::Duration;

use gatehouse::prelude::*;

// ---------------------------------------------------------------------------
// In-memory user directory
// ---------------------------------------------------------------------------

/// Stands in for the backend's `/api/user` endpoints.
///
/// Replies are encoded to JSON bodies and decoded again, so the demo goes
/// through the same envelope validation a real HTTP client would.
#[derive(Clone, Default)]
struct MemoryDirectory {
    logged_in: Arc<Mutex<Option<Identity>>>,
    latency: Duration,
}

impl MemoryDirectory {
    fn with_latency(latency: Duration) -> Self {
        Self {
            latency,
            ..Self::default()
        }
    }

    /// What the host application's login form would do on success.
    fn log_in(&self, identity: Identity) {
        *self.logged_in.lock().unwrap_or_else(|e| e.into_inner()) = Some(identity);
    }

    fn body<T: serde::Serialize>(reply: &BaseResponse<T>) -> Result<Vec<u8>, DirectoryError> {
        Ok(JsonCodec.encode(reply)?)
    }
}

impl UserDirectory for MemoryDirectory {
    async fn current_user(&self) -> Result<DirectoryReply<Identity>, DirectoryError> {
        tokio::time::sleep(self.latency).await;
        let current = self.logged_in.lock().unwrap_or_else(|e| e.into_inner()).clone();
        let body = match current {
            Some(identity) => Self::body(&BaseResponse::ok(identity))?,
            None => Self::body(&BaseResponse::<Identity>::rejected(40100, "not logged in"))?,
        };
        Ok(decode_reply(&JsonCodec, &body)?)
    }

    async fn logout(&self) -> Result<DirectoryReply<()>, DirectoryError> {
        tokio::time::sleep(self.latency).await;
        self.logged_in.lock().unwrap_or_else(|e| e.into_inner()).take();
        let body = Self::body(&BaseResponse::ok(true))?;
        Ok(decode_ack(&JsonCodec, &body)?)
    }
}

// ---------------------------------------------------------------------------
// Routes
// ---------------------------------------------------------------------------

fn routes() -> Vec<RouteRecord> {
    vec![
        RouteRecord::new("/", "HomePage").named("home"),
        RouteRecord::new("/user/login", "UserLoginPage").named("login").hidden(),
        RouteRecord::new("/user/register", "UserRegisterPage").hidden(),
        RouteRecord::new("/noAuth", "NoAuthPage").hidden(),
        RouteRecord::new("/question/:id", "QuestionPage").requires(Role::User),
        RouteRecord::new("/admin/user", "UserManagePage").requires(Role::Admin),
        RouteRecord::new("/*", "NotFoundPage").hidden(),
    ]
}

fn show<D: UserDirectory>(app: &Gatehouse<D>, outcome: &NavigationOutcome) {
    let location = outcome.location().to_hash();
    let menu: Vec<&str> = app.menu().into_iter().map(|record| record.path.as_str()).collect();
    match outcome {
        NavigationOutcome::Allowed { .. } => {
            println!("  -> {location}  [{}]  menu: {menu:?}", app.store().display_name())
        }
        NavigationOutcome::Redirected { from, decision, .. } => println!(
            "  {from} {decision} -> {location}  [{}]  menu: {menu:?}",
            app.store().display_name()
        ),
    }
}

// ---------------------------------------------------------------------------
// Walkthrough
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<(), GatehouseError> {
    gatehouse::init_tracing();

    let directory = MemoryDirectory::with_latency(Duration::from_millis(30));
    let config = GatehouseConfig::from_json_str(r#"{"session":{"anonymous_display_name":"未登录"}}"#)?;
    let mut app = GatehouseBuilder::new()
        .config(config)
        .routes(routes())
        .build(directory.clone())?;

    let _log = app.store().subscribe(|state| tracing::info!(%state, "session changed"));

    println!("start");
    let outcome = app.start().await;
    show(&app, &outcome);

    println!("visit the admin page while logged out");
    let outcome = app.navigate("#/admin/user").await;
    show(&app, &outcome);

    println!("log in as a regular user");
    directory.log_in(Identity::new("alice", Role::User).with_id(1));
    let outcome = app.complete_login().await?;
    show(&app, &outcome);

    println!("open a question");
    let outcome = app.navigate("#/question/7?tab=answers").await;
    show(&app, &outcome);

    println!("log out");
    if let Some(outcome) = app.logout().await? {
        show(&app, &outcome);
    }

    println!("log in as an admin and follow the redirect");
    directory.log_in(Identity::new("root", Role::Admin).with_id(2));
    let outcome = app.complete_login().await?;
    show(&app, &outcome);

    println!("go back");
    if let Some(outcome) = app.back().await {
        show(&app, &outcome);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app(directory: &MemoryDirectory) -> Gatehouse<MemoryDirectory> {
        GatehouseBuilder::new()
            .routes(routes())
            .build(directory.clone())
            .unwrap()
    }

    #[tokio::test]
    async fn test_memory_directory_round_trips_identity() {
        let directory = MemoryDirectory::default();
        directory.log_in(Identity::new("alice", Role::User).with_id(1));

        let reply = directory.current_user().await.unwrap();

        assert_eq!(reply, DirectoryReply::Ok(Identity::new("alice", Role::User).with_id(1)));
    }

    #[tokio::test]
    async fn test_memory_directory_logged_out_is_rejected() {
        let reply = MemoryDirectory::default().current_user().await.unwrap();
        assert!(matches!(reply, DirectoryReply::Rejected { code: 40100, .. }));
    }

    #[tokio::test]
    async fn test_walkthrough_admin_lands_on_intended_page() {
        let directory = MemoryDirectory::default();
        let mut app = app(&directory);
        app.start().await;
        app.navigate("#/admin/user").await;

        directory.log_in(Identity::new("root", Role::Admin));
        let outcome = app.complete_login().await.unwrap();

        assert!(outcome.is_allowed());
        assert_eq!(app.router().current().unwrap().to_hash(), "#/admin/user");
    }

    #[tokio::test]
    async fn test_unknown_page_is_not_found() {
        let directory = MemoryDirectory::default();
        let mut app = app(&directory);

        app.navigate("#/nowhere").await;

        assert_eq!(
            app.router().current_route().unwrap().record.component,
            "NotFoundPage"
        );
    }
}
