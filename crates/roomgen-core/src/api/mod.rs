//! REST API client module for the roomgen backend.
//!
//! This module provides the `ApiClient` request pipeline. Every call:
//!
//! 1. reads the session store and attaches `Authorization: Bearer <token>`
//!    when a token is present,
//! 2. is sent with a fixed 30 second timeout,
//! 3. returns only the decoded body on success, or an `ApiError` classified
//!    as server-responded, no-response or local.
//!
//! Failures are logged and returned unchanged. Nothing is retried.

pub mod client;
pub mod error;

pub use client::{ApiClient, RequestBody, RequestDescriptor, DEFAULT_BASE_URL};
pub use error::{ApiError, ErrorKind};
