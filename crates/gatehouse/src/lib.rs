//! # Gatehouse
//!
//! Client-side session and route access management.
//!
//! Gatehouse keeps one source of truth for "who is logged in, and as
//! what", synchronised with a backend user directory, and checks every
//! navigation against the role each route requires. The application
//! implements a single [`UserDirectory`](gatehouse_session::UserDirectory)
//! trait and declares its routes; Gatehouse handles the session lifecycle,
//! request coalescing, redirects, and history.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use gatehouse::prelude::*;
//!
//! /// Your backend client. Real code would call `/api/user/get/login`
//! /// and `/api/user/logout` and decode the bodies with `decode_reply`.
//! struct Backend;
//!
//! impl UserDirectory for Backend {
//!     async fn current_user(&self) -> Result<DirectoryReply<Identity>, DirectoryError> {
//!         Ok(DirectoryReply::Ok(Identity::new("alice", Role::User)))
//!     }
//!
//!     async fn logout(&self) -> Result<DirectoryReply<()>, DirectoryError> {
//!         Ok(DirectoryReply::Ok(()))
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), GatehouseError> {
//!     gatehouse::init_tracing();
//!
//!     let mut app = GatehouseBuilder::new()
//!         .routes([
//!             RouteRecord::new("/", "HomePage"),
//!             RouteRecord::new("/user/login", "UserLoginPage").hidden(),
//!             RouteRecord::new("/noAuth", "NoAuthPage").hidden(),
//!             RouteRecord::new("/admin/user", "UserManagePage").requires(Role::Admin),
//!         ])
//!         .build(Backend)?;
//!
//!     let outcome = app.start().await;
//!     println!("landed on {}", outcome.location());
//!
//!     let outcome = app.navigate("#/admin/user").await;
//!     println!("{:?}", outcome.decision());
//!     Ok(())
//! }
//! ```

mod app;
mod config;
mod error;

pub use app::{Gatehouse, GatehouseBuilder};
pub use config::GatehouseConfig;
pub use error::GatehouseError;

pub use gatehouse_access as access;
pub use gatehouse_protocol as protocol;
pub use gatehouse_router as router;
pub use gatehouse_session as session;

/// Installs a `tracing` subscriber that prints to stderr.
///
/// The filter comes from `RUST_LOG`, falling back to `info`. Calling this
/// more than once (or after another subscriber was installed) is a no-op.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Everything an application needs, in one import.
pub mod prelude {
    pub use crate::{Gatehouse, GatehouseBuilder, GatehouseConfig, GatehouseError};

    pub use gatehouse_access::{check_access, evaluate, Decision};
    pub use gatehouse_protocol::{
        decode_ack, decode_reply, BaseResponse, Codec, DirectoryReply, Identity, JsonCodec, Role,
    };
    pub use gatehouse_router::{
        GuardConfig, GuardPhase, Location, NavigationGuard, NavigationOutcome, RouteCatalog,
        RouteRecord, Router,
    };
    pub use gatehouse_session::{
        DirectoryError, SessionConfig, SessionError, SessionState, SessionStatus, SessionStore,
        Subscription, UserDirectory,
    };
}
