//! Authentication module for managing the session credential.
//!
//! This module provides:
//! - `SessionStore`: single-slot, durable storage for the bearer token
//! - `KeyringSessionStore` / `FileSessionStore` / `MemorySessionStore`: its backends
//! - `RouteGuard`: decides whether the user lands in the main area or at login
//! - input validation applied before credentials are sent
//!
//! Tokens never expire client-side. An expired token is only noticed when
//! the server rejects a call with `ApiError::Unauthorized`.

pub mod credentials;
pub mod route;
pub mod session;
pub mod store;
pub mod validation;

pub use credentials::KeyringSessionStore;
pub use route::{Destination, RegisterOutcome, Route, RouteGuard};
pub use session::FileSessionStore;
pub use store::{open_store, MemorySessionStore, SessionStore, SessionStoreError, TOKEN_KEY};
pub use validation::ValidationError;
