//! Core library for roomgen.
//!
//! Provides the pieces shared by every roomgen front-end:
//!
//! - `api`: the request pipeline (`ApiClient`) and its error classification
//! - `auth`: the single-slot session store, input validation and the route guard
//! - `models`: typed request and response records
//! - `config`: persisted configuration and environment overrides

pub mod api;
pub mod auth;
pub mod config;
pub mod models;
pub mod utils;

pub use api::{ApiClient, ApiError, ErrorKind};
pub use auth::{Destination, Route, RouteGuard, SessionStore};
pub use config::Config;
