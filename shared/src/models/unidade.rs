//! Unidade Model

use serde::{Deserialize, Serialize};

/// Unit record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unidade {
    pub id: i64,
    pub nome: String,
    #[serde(default)]
    pub ativo: Option<bool>,
    /// Active employees referencing this record (server computed)
    #[serde(default)]
    pub funcionarios_count: Option<u32>,
}

/// Create/update Unit payload
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UnidadePayload {
    pub nome: String,
}
