//! Session bootstrap and top-level routing.
//!
//! `RouteGuard` tracks whether the user is signed in and moves between
//! states only through the transitions below:
//!
//! ```text
//! Unknown --bootstrap(token)--> Authenticated
//! Unknown --bootstrap(none/err)--> Anonymous
//! Anonymous --login/register(token)--> Authenticated
//! Authenticated --logout--> Anonymous
//! ```
//!
//! There is no refresh state. A stale token stays `Authenticated` until a
//! request fails with `ApiError::Unauthorized` and the caller logs out.

use std::fmt;
use std::sync::Arc;

use reqwest::StatusCode;
use tracing::{info, warn};

use crate::api::{ApiClient, ApiError};
use crate::models::{Credentials, Registration};

use super::store::{SessionStore, SessionStoreError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Session store not read yet
    Unknown,
    Authenticated,
    Anonymous,
}

/// Top-level area a resolved route lands in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    Main,
    Login,
}

impl Route {
    pub fn destination(&self) -> Option<Destination> {
        match self {
            Route::Unknown => None,
            Route::Authenticated => Some(Destination::Main),
            Route::Anonymous => Some(Destination::Login),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Route::Authenticated)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::Unknown => write!(f, "unknown"),
            Route::Authenticated => write!(f, "authenticated"),
            Route::Anonymous => write!(f, "anonymous"),
        }
    }
}

/// Result of a registration attempt that the server accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegisterOutcome {
    /// A token was issued and stored
    LoggedIn,
    /// Account created, but the user must log in separately
    LoginRequired { message: Option<String> },
}

pub struct RouteGuard {
    store: Arc<dyn SessionStore>,
    route: Route,
}

impl RouteGuard {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self {
            store,
            route: Route::Unknown,
        }
    }

    pub fn route(&self) -> Route {
        self.route
    }

    /// Decide the landing route from the stored token. A failed read counts
    /// as signed out.
    pub async fn bootstrap(&mut self) -> Route {
        self.route = match self.store.get().await {
            Ok(Some(_)) => Route::Authenticated,
            Ok(None) => Route::Anonymous,
            Err(e) => {
                warn!(error = %e, "Failed to read session token, treating as signed out");
                Route::Anonymous
            }
        };
        info!(route = %self.route, "Session bootstrap complete");
        self.route
    }

    async fn store_token(&mut self, token: &str) -> Result<(), ApiError> {
        self.store
            .set(token)
            .await
            .map_err(|e| ApiError::Local(format!("Could not save session token: {}", e)))?;
        self.route = Route::Authenticated;
        Ok(())
    }

    /// Log in and persist the issued token.
    pub async fn login(&mut self, api: &ApiClient, credentials: &Credentials) -> Result<Route, ApiError> {
        let response = api.login(credentials).await?;
        let token = response
            .token()
            .ok_or_else(|| ApiError::invalid_response(StatusCode::OK, "Invalid credentials"))?;
        self.store_token(token).await?;
        info!(email = %credentials.email, "Login successful");
        Ok(self.route)
    }

    /// Register, persisting the token when the server issues one.
    pub async fn register(
        &mut self,
        api: &ApiClient,
        registration: &Registration,
    ) -> Result<RegisterOutcome, ApiError> {
        let response = api.register(registration).await?;
        match response.token() {
            Some(token) => {
                self.store_token(token).await?;
                info!(email = %registration.email, "Registration successful, signed in");
                Ok(RegisterOutcome::LoggedIn)
            }
            None => {
                info!(email = %registration.email, "Registration successful, login required");
                Ok(RegisterOutcome::LoginRequired {
                    message: response.message.clone(),
                })
            }
        }
    }

    /// Forget the stored token. The route is unchanged if clearing fails.
    pub async fn logout(&mut self) -> Result<Route, SessionStoreError> {
        self.store.clear().await?;
        self.route = Route::Anonymous;
        info!("Logged out");
        Ok(self.route)
    }
}
