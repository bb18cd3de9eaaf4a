//! Shared types for the Ramais directory
//!
//! Directory models, authentication DTOs, entity kinds and the
//! click-to-contact link builders used by every client.

pub mod client;
pub mod contact;
pub mod entity;
pub mod models;

// Re-exports
pub use client::{LoginRequest, LoginResponse, UserInfo};
pub use entity::{EntityKind, UnknownEntityKind};
pub use serde::{Deserialize, Serialize};
