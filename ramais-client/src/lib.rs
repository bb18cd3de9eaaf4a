//! Ramais Client - directory client for the Sistema de Ramais REST API
//!
//! Cookie session with CSRF header, per-entity services, and the
//! controllers a front-end drives: session, directory data and the
//! edit form.

pub mod app;
pub mod config;
pub mod directory;
pub mod error;
pub mod http;
pub mod modal;
pub mod notice;
pub mod outcome;
pub mod service;
pub mod session;

#[cfg(test)]
pub(crate) mod testing;

pub use app::RamaisApp;
pub use config::ClientConfig;
pub use directory::{Collections, DirectoryController, Filters, FormData};
pub use error::{ClientError, ClientResult};
pub use http::{ApiRequest, HttpClient, NetworkHttpClient, RawResponse};
pub use modal::{Confirm, ModalCoordinator, ModalState};
pub use notice::{Notice, NoticeBoard, NoticeLevel};
pub use outcome::Outcome;
pub use service::{EntityService, Resource};
pub use session::{SessionController, SessionState};

// Re-export shared types for convenience
pub use shared::client::{LoginRequest, LoginResponse, UserInfo};
pub use shared::EntityKind;
