//! Terminal results of user-triggered actions
//!
//! Every action ends in exactly one [`Outcome`]; errors never escape to the
//! caller. The helpers here reduce API error bodies to one display string.

use serde_json::Value;

pub const MSG_LOGIN_OK: &str = "Login realizado com sucesso!";
pub const MSG_LOGOUT_OK: &str = "Logout realizado com sucesso!";
pub const MSG_LOGIN_FAILED: &str = "Erro no login";
pub const MSG_LOGOUT_FAILED: &str = "Erro no logout";
pub const MSG_CONNECTION: &str = "Erro de conexão";
pub const MSG_SAVE_FAILED: &str = "Erro ao salvar";
pub const MSG_UPDATE_FAILED: &str = "Erro ao atualizar";
pub const MSG_DELETE_FAILED: &str = "Erro ao excluir";
pub const MSG_PERMISSION_DENIED: &str = "Você não tem permissão para editar registros";
pub const MSG_DELETE_CANCELLED: &str = "Exclusão cancelada";
pub const MSG_NO_FORM: &str = "Nenhum formulário aberto";
pub const MSG_CONFIRM_DELETE: &str = "Tem certeza que deseja excluir?";

/// Success or failure signal with an optional display message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Success(Option<String>),
    Failure(String),
}

impl Outcome {
    pub fn success() -> Self {
        Self::Success(None)
    }

    pub fn success_with(message: impl Into<String>) -> Self {
        Self::Success(Some(message.into()))
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self::Failure(message.into())
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Attach a message to a success, leaving failures untouched
    pub fn map_success(self, message: impl FnOnce() -> String) -> Self {
        match self {
            Self::Success(_) => Self::Success(Some(message())),
            failure => failure,
        }
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Success(message) => message.as_deref(),
            Self::Failure(message) => Some(message),
        }
    }
}

fn push_value(out: &mut Vec<String>, value: &Value) {
    match value {
        Value::Null => {}
        Value::String(s) => out.push(s.clone()),
        Value::Array(items) => items.iter().for_each(|item| push_value(out, item)),
        Value::Object(map) => map.values().for_each(|item| push_value(out, item)),
        other => out.push(other.to_string()),
    }
}

/// Flatten every field-level validation message into one comma-joined string
///
/// `{"email": ["Invalid"], "ramal": ["Required"]}` becomes `"Invalid, Required"`.
pub fn flatten_field_errors(body: &Value) -> Option<String> {
    let mut messages = Vec::new();
    push_value(&mut messages, body);
    messages.retain(|m| !m.trim().is_empty());
    if messages.is_empty() {
        None
    } else {
        Some(messages.join(", "))
    }
}

fn first_message(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Array(items) => first_message(items.first()),
        _ => None,
    }
}

/// First usable login error: `detail`, then the username, password and
/// non-field validation arrays
pub fn login_error_message(body: &Value) -> Option<String> {
    ["detail", "username", "password", "non_field_errors"]
        .into_iter()
        .find_map(|field| first_message(body.get(field)))
}

/// Delete error: `detail` if present, otherwise the flattened field errors
pub fn delete_error_message(body: &Value) -> Option<String> {
    first_message(body.get("detail")).or_else(|| flatten_field_errors(body))
}
