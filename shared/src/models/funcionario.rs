//! Funcionario Model

use serde::{Deserialize, Serialize};

use super::DepartmentBadge;

/// Employee record as returned by the list endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Funcionario {
    pub id: i64,
    pub nome: String,
    /// Phone extension (digits, may be empty)
    #[serde(default)]
    pub ramal: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    /// Free-form phone number, normalized to digits when linked
    #[serde(default)]
    pub whatsapp: Option<String>,
    /// Teams handle or e-mail
    #[serde(default)]
    pub teams: Option<String>,
    #[serde(default)]
    pub ativo: Option<bool>,
    /// Department reference (ID)
    #[serde(default)]
    pub departamento: Option<i64>,
    #[serde(default)]
    pub departamento_nome: Option<String>,
    /// Role reference (ID)
    #[serde(default)]
    pub funcao: Option<i64>,
    #[serde(default)]
    pub funcao_nome: Option<String>,
    /// Unit reference (ID)
    #[serde(default)]
    pub unidade: Option<i64>,
    #[serde(default)]
    pub unidade_nome: Option<String>,
}

impl Funcionario {
    /// Badge variant derived from the denormalized department label
    pub fn badge(&self) -> DepartmentBadge {
        DepartmentBadge::from_label(self.departamento_nome.as_deref())
    }
}

/// Create/update employee payload.
///
/// Foreign keys are always sent under their bare names; the `_id`
/// aliases are folded in before this type is built.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FuncionarioPayload {
    pub nome: String,
    pub email: String,
    pub ramal: String,
    pub whatsapp: String,
    pub teams: String,
    pub departamento: Option<i64>,
    pub funcao: Option<i64>,
    pub unidade: Option<i64>,
}
