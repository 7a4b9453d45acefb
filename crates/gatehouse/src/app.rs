//! `Gatehouse` builder and application handle.
//!
//! This is the entry point for wiring Gatehouse into an application. It
//! ties the layers together: directory → session store → guard → router.

use gatehouse_router::{
    Location, NavigationGuard, NavigationOutcome, RouteCatalog, RouteRecord, Router,
};
use gatehouse_session::{SessionState, SessionStore, UserDirectory};

use crate::{GatehouseConfig, GatehouseError};

/// Builder for configuring a [`Gatehouse`].
///
/// # Example
///
/// ```rust,ignore
/// use gatehouse::prelude::*;
///
/// let mut app = GatehouseBuilder::new()
///     .routes([
///         RouteRecord::new("/", "HomePage"),
///         RouteRecord::new("/user/login", "UserLoginPage").hidden(),
///         RouteRecord::new("/noAuth", "NoAuthPage").hidden(),
///         RouteRecord::new("/admin/user", "UserManagePage").requires(Role::Admin),
///     ])
///     .build(my_directory)?;
/// app.start().await;
/// ```
#[derive(Debug, Default)]
pub struct GatehouseBuilder {
    config: GatehouseConfig,
    routes: Vec<RouteRecord>,
}

impl GatehouseBuilder {
    /// Creates a builder with default settings and no routes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the configuration.
    pub fn config(mut self, config: GatehouseConfig) -> Self {
        self.config = config;
        self
    }

    /// Appends routes to the catalog, in order.
    pub fn routes(mut self, routes: impl IntoIterator<Item = RouteRecord>) -> Self {
        self.routes.extend(routes);
        self
    }

    /// Appends one route.
    pub fn route(mut self, route: RouteRecord) -> Self {
        self.routes.push(route);
        self
    }

    /// Validates the catalog and wires everything to `directory`.
    ///
    /// Nothing is fetched yet; see [`Gatehouse::start`].
    ///
    /// # Errors
    /// [`GatehouseError::Router`] if the catalog is invalid or can't back
    /// the guard's redirects.
    pub fn build<D: UserDirectory>(self, directory: D) -> Result<Gatehouse<D>, GatehouseError> {
        let catalog = RouteCatalog::new(self.routes)?;
        let store = SessionStore::new(directory, self.config.session.clone());
        let guard = NavigationGuard::new(catalog, store.clone(), self.config.guard.clone())?;
        let router = Router::new(guard, self.config.initial_path.as_str());

        tracing::info!(
            routes = router.guard().catalog().len(),
            initial = %self.config.initial_path,
            "gatehouse built"
        );
        Ok(Gatehouse {
            store,
            router,
            config: self.config,
        })
    }
}

/// A wired-up application: one session store, one router.
pub struct Gatehouse<D: UserDirectory> {
    store: SessionStore<D>,
    router: Router<D>,
    config: GatehouseConfig,
}

impl<D: UserDirectory> Gatehouse<D> {
    /// Starts the application: asks the directory who is logged in, then
    /// navigates to the initial location.
    ///
    /// The first navigation waits for that answer, so it is evaluated
    /// against the real role. A failed fetch is logged by the guard and
    /// the navigation is evaluated as not logged in.
    pub async fn start(&mut self) -> NavigationOutcome {
        tracing::info!("gatehouse starting");
        // The refresh runs on its own task; the guard joins it rather than
        // issuing a second request, so this handle isn't needed.
        drop(self.store.refresh_session());
        self.router.start().await
    }

    /// Navigates to `target` through the guard.
    pub async fn navigate(&mut self, target: impl Into<Location>) -> NavigationOutcome {
        self.router.push(target).await
    }

    /// Goes back one history entry, re-checking access.
    pub async fn back(&mut self) -> Option<NavigationOutcome> {
        self.router.back().await
    }

    /// Re-fetches the session.
    pub async fn refresh(&self) -> Result<SessionState, GatehouseError> {
        Ok(self.store.refresh_session().await?)
    }

    /// To be called once the host application's login form succeeded.
    ///
    /// Refreshes the session, then replaces the login page with the
    /// location it was redirected from (or the initial location).
    ///
    /// # Errors
    /// [`GatehouseError::Session`] if the refresh fails. The router is not
    /// touched in that case.
    pub async fn complete_login(&mut self) -> Result<NavigationOutcome, GatehouseError> {
        self.store.refresh_session().await?;
        let target = self
            .router
            .current()
            .and_then(Location::redirect_target)
            .unwrap_or_else(|| Location::parse(&self.config.initial_path));
        Ok(self.router.replace(target).await)
    }

    /// Logs out, then re-checks the current location: a page that needed
    /// a login is replaced by the login page.
    ///
    /// # Errors
    /// [`GatehouseError::Session`] if the directory refuses or can't be
    /// reached. Session and router are unchanged in that case.
    pub async fn logout(&mut self) -> Result<Option<NavigationOutcome>, GatehouseError> {
        self.store.logout().await?;
        Ok(self.router.revalidate().await)
    }

    /// Menu entries for the current role.
    pub fn menu(&self) -> Vec<&RouteRecord> {
        self.router
            .guard()
            .catalog()
            .menu_for(self.store.current_role())
    }

    pub fn store(&self) -> &SessionStore<D> {
        &self.store
    }

    pub fn router(&self) -> &Router<D> {
        &self.router
    }

    pub fn config(&self) -> &GatehouseConfig {
        &self.config
    }
}
