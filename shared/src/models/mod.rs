//! Data models
//!
//! Directory records as exchanged with the REST API.
//! All IDs are server-assigned `i64`; the client never generates them.

pub mod departamento;
pub mod funcao;
pub mod funcionario;
pub mod unidade;

// Re-exports
pub use departamento::*;
pub use funcao::*;
pub use funcionario::*;
pub use unidade::*;

use serde::{Deserialize, Serialize};

/// Department badge coloring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DepartmentBadge {
    Chiaperini,
    Techto,
    #[default]
    Default,
}

impl DepartmentBadge {
    /// Map a department display label to its badge
    pub fn from_label(label: Option<&str>) -> Self {
        match label.map(|l| l.trim().to_lowercase()).as_deref() {
            Some("chiaperini") => Self::Chiaperini,
            Some("techto") => Self::Techto,
            _ => Self::Default,
        }
    }

    /// CSS-style class suffix
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Chiaperini => "chiaperini",
            Self::Techto => "techto",
            Self::Default => "default",
        }
    }
}
