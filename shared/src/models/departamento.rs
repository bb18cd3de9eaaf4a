//! Departamento Model

use serde::{Deserialize, Serialize};

/// Department record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Departamento {
    pub id: i64,
    pub nome: String,
    #[serde(default)]
    pub ativo: Option<bool>,
    /// Active employees referencing this record (server computed)
    #[serde(default)]
    pub funcionarios_count: Option<u32>,
}

/// Create/update Department payload
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DepartamentoPayload {
    pub nome: String,
}
