//! Screen routing
//!
//! The navigator holds the current [`Route`] and lets any part of the
//! client move to another screen. Frontends watch it and render whatever
//! route is current. Route guarding mirrors the session state: without a
//! token only the login/register and public pages are reachable, and with a
//! token the login/register pages bounce to the card list.

use std::fmt;
use std::sync::Arc;

use tokio::sync::watch;
use tracing::debug;

use crate::models::CardId;

/// A screen of the client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    Register,
    /// Card list (due and all)
    Cards,
    NewCard,
    EditCard(CardId),
    Review(CardId),
    Statistics,
    Settings,
    Terms,
    Privacy,
}

impl Route {
    /// Pages reachable without a session that also stay reachable with one
    pub fn is_public(self) -> bool {
        matches!(self, Route::Terms | Route::Privacy)
    }

    /// Login and registration
    pub fn is_auth_page(self) -> bool {
        matches!(self, Route::Login | Route::Register)
    }

    /// Where a request for `self` actually lands
    pub fn guard(self, authenticated: bool) -> Route {
        if self.is_public() {
            self
        } else if !authenticated && !self.is_auth_page() {
            Route::Login
        } else if authenticated && self.is_auth_page() {
            Route::Cards
        } else {
            self
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::Login => f.write_str("/login"),
            Route::Register => f.write_str("/register"),
            Route::Cards => f.write_str("/cards"),
            Route::NewCard => f.write_str("/cards/new"),
            Route::EditCard(id) => write!(f, "/cards/{}/edit", id),
            Route::Review(id) => write!(f, "/cards/{}/review", id),
            Route::Statistics => f.write_str("/statistics"),
            Route::Settings => f.write_str("/settings"),
            Route::Terms => f.write_str("/terms"),
            Route::Privacy => f.write_str("/privacy"),
        }
    }
}

/// Shared handle to the current route
#[derive(Debug, Clone)]
pub struct Navigator {
    tx: Arc<watch::Sender<Route>>,
}

impl Navigator {
    pub fn new(initial: Route) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx: Arc::new(tx) }
    }

    /// Move to `route` unconditionally
    pub fn navigate(&self, route: Route) {
        debug!("navigate -> {}", route);
        self.tx.send_replace(route);
    }

    /// Move to `route`, applying the session guard; returns where we landed
    pub fn navigate_guarded(&self, route: Route, authenticated: bool) -> Route {
        let target = route.guard(authenticated);
        self.navigate(target);
        target
    }

    pub fn current(&self) -> Route {
        *self.tx.borrow()
    }

    /// Watch for route changes
    pub fn subscribe(&self) -> watch::Receiver<Route> {
        self.tx.subscribe()
    }
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new(Route::Login)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guard_without_session() {
        assert_eq!(Route::Cards.guard(false), Route::Login);
        assert_eq!(Route::Review(3).guard(false), Route::Login);
        assert_eq!(Route::Register.guard(false), Route::Register);
        assert_eq!(Route::Terms.guard(false), Route::Terms);
    }

    #[test]
    fn test_guard_with_session() {
        assert_eq!(Route::Login.guard(true), Route::Cards);
        assert_eq!(Route::Register.guard(true), Route::Cards);
        assert_eq!(Route::Statistics.guard(true), Route::Statistics);
        assert_eq!(Route::Privacy.guard(true), Route::Privacy);
    }

    #[test]
    fn test_navigator_broadcasts() {
        let nav = Navigator::new(Route::Cards);
        let mut rx = nav.subscribe();
        nav.navigate(Route::Review(5));
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), Route::Review(5));
        assert_eq!(nav.current(), Route::Review(5));
    }

    #[test]
    fn test_route_paths() {
        assert_eq!(Route::Review(12).to_string(), "/cards/12/review");
        assert_eq!(Route::EditCard(4).to_string(), "/cards/4/edit");
        assert_eq!(Route::Login.to_string(), "/login");
    }
}
