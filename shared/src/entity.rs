//! Entity kinds
//!
//! The four record types managed by the directory, with their REST
//! collection paths and display labels.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One of the four directory record types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Funcionario,
    Departamento,
    Funcao,
    Unidade,
}

/// Unrecognized entity tag
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Tipo de registro desconhecido: {0}")]
pub struct UnknownEntityKind(pub String);

impl EntityKind {
    pub const ALL: [EntityKind; 4] = [
        EntityKind::Funcionario,
        EntityKind::Departamento,
        EntityKind::Funcao,
        EntityKind::Unidade,
    ];

    /// REST collection segment, e.g. `funcionarios`
    pub fn path(&self) -> &'static str {
        match self {
            Self::Funcionario => "funcionarios",
            Self::Departamento => "departamentos",
            Self::Funcao => "funcoes",
            Self::Unidade => "unidades",
        }
    }

    /// Wire tag
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Funcionario => "funcionario",
            Self::Departamento => "departamento",
            Self::Funcao => "funcao",
            Self::Unidade => "unidade",
        }
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            Self::Funcionario => "Funcionário",
            Self::Departamento => "Departamento",
            Self::Funcao => "Função",
            Self::Unidade => "Unidade",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = UnknownEntityKind;

    /// Accepts the wire tag or the collection path
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == tag || k.path() == tag)
            .ok_or_else(|| UnknownEntityKind(s.to_string()))
    }
}
