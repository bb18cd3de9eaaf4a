//! Funcao Model

use serde::{Deserialize, Serialize};

/// Role record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Funcao {
    pub id: i64,
    pub nome: String,
    #[serde(default)]
    pub ativo: Option<bool>,
    /// Active employees referencing this record (server computed)
    #[serde(default)]
    pub funcionarios_count: Option<u32>,
}

/// Create/update Role payload
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FuncaoPayload {
    pub nome: String,
}
