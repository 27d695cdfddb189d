//! Typed request and response records for the roomgen API.
//!
//! This module contains all the data structures exchanged with the backend:
//!
//! - `Credentials`, `Registration`, `AuthResponse`: login and sign-up
//! - `ProfileRecord`, `ProfileUpdate`: the signed-in user's profile
//! - `DesignRecord`, `NewDesign`, `DesignUpdate`: saved interior designs
//! - `GenerationJob`, `GeneratedImage`, `DesignStyle`: AI image generation
//!
//! Wire names are camelCase. Build with the `ts` feature to export
//! TypeScript bindings for the records.

pub mod auth;
pub mod design;
pub mod profile;

pub use auth::{AuthResponse, Credentials, MessageResponse, Registration};
pub use design::{
    DesignRecord, DesignStyle, DesignUpdate, GenerateResponse, GeneratedImage, GenerationJob,
    NewDesign,
};
pub use profile::{ProfileRecord, ProfileUpdate};
