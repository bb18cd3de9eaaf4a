//! Directory data controller
//!
//! Holds the four entity collections and the search/filter tuple, reloads
//! everything after a mutation and, through
//! [`DirectoryController::spawn_filter_watcher`], whenever the filters settle
//! on a new value.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use serde_json::{Map, Value};
use shared::EntityKind;
use shared::models::{
    Departamento, DepartamentoPayload, Funcao, FuncaoPayload, Funcionario, FuncionarioPayload,
    Unidade, UnidadePayload,
};
use tokio::sync::{RwLock, watch};
use tokio::task::JoinHandle;

use crate::ClientResult;
use crate::http::{HttpClient, RawResponse};
use crate::outcome::{
    MSG_CONNECTION, MSG_DELETE_FAILED, MSG_SAVE_FAILED, MSG_UPDATE_FAILED, Outcome,
    delete_error_message, flatten_field_errors,
};
use crate::service::EntityService;

/// Loosely-typed form data as collected from an edit form
pub type FormData = Map<String, Value>;

/// Search term plus the three foreign-key filters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filters {
    pub busca: String,
    pub departamento_id: Option<i64>,
    pub funcao_id: Option<i64>,
    pub unidade_id: Option<i64>,
}

impl Filters {
    /// Query parameters for the employee list, omitting empty members
    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut query = Vec::new();
        let busca = self.busca.trim();
        if !busca.is_empty() {
            query.push(("busca".to_string(), busca.to_string()));
        }
        let ids = [
            ("departamento_id", self.departamento_id),
            ("funcao_id", self.funcao_id),
            ("unidade_id", self.unidade_id),
        ];
        for (name, id) in ids {
            if let Some(id) = id {
                query.push((name.to_string(), id.to_string()));
            }
        }
        query
    }

    pub fn is_empty(&self) -> bool {
        self.to_query().is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Collections {
    pub funcionarios: Vec<Funcionario>,
    pub departamentos: Vec<Departamento>,
    pub funcoes: Vec<Funcao>,
    pub unidades: Vec<Unidade>,
}

#[derive(Debug, Default)]
struct Snapshot {
    generation: u64,
    collections: Collections,
}

enum Mutation {
    Create,
    Update,
    Delete,
}

impl Mutation {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }

    fn failure_message(&self, body: &Value) -> String {
        let (message, fallback) = match self {
            Self::Create => (flatten_field_errors(body), MSG_SAVE_FAILED),
            Self::Update => (flatten_field_errors(body), MSG_UPDATE_FAILED),
            Self::Delete => (delete_error_message(body), MSG_DELETE_FAILED),
        };
        message.unwrap_or_else(|| fallback.to_string())
    }
}

pub struct DirectoryController {
    funcionarios: EntityService<Funcionario>,
    departamentos: EntityService<Departamento>,
    funcoes: EntityService<Funcao>,
    unidades: EntityService<Unidade>,
    snapshot: RwLock<Snapshot>,
    next_generation: AtomicU64,
    filters: watch::Sender<Filters>,
}

impl DirectoryController {
    pub fn new(http: Arc<dyn HttpClient>) -> Self {
        let (filters, _) = watch::channel(Filters::default());
        Self {
            funcionarios: EntityService::new(http.clone()),
            departamentos: EntityService::new(http.clone()),
            funcoes: EntityService::new(http.clone()),
            unidades: EntityService::new(http),
            snapshot: RwLock::new(Snapshot::default()),
            next_generation: AtomicU64::new(0),
            filters,
        }
    }

    pub fn filters(&self) -> Filters {
        self.filters.borrow().clone()
    }

    /// Returns `true` if the term actually changed
    pub fn set_search(&self, busca: impl Into<String>) -> bool {
        let busca = busca.into();
        self.filters.send_if_modified(|f| {
            if f.busca == busca {
                return false;
            }
            f.busca = busca;
            true
        })
    }

    /// Replace the whole filter tuple; returns `true` if anything changed
    pub fn set_filters(&self, filters: Filters) -> bool {
        self.filters.send_if_modified(|f| {
            if *f == filters {
                return false;
            }
            *f = filters;
            true
        })
    }

    pub fn clear_filters(&self) -> bool {
        self.set_filters(Filters::default())
    }

    pub async fn collections(&self) -> Collections {
        self.snapshot.read().await.collections.clone()
    }

    /// Drop every collection, e.g. after logout
    pub async fn clear(&self) {
        let generation = self.next_generation.fetch_add(1, Ordering::SeqCst) + 1;
        let mut snapshot = self.snapshot.write().await;
        snapshot.generation = generation;
        snapshot.collections = Collections::default();
    }

    /// Fetch all four collections concurrently and swap them in together
    ///
    /// Only the employee list is filtered. If a newer reload was applied
    /// while this one was in flight, the results are discarded and `false`
    /// is returned.
    pub async fn reload_all(&self) -> ClientResult<bool> {
        let generation = self.next_generation.fetch_add(1, Ordering::SeqCst) + 1;
        let query = self.filters().to_query();

        let (funcionarios, departamentos, funcoes, unidades) = tokio::try_join!(
            self.funcionarios.list(&query),
            self.departamentos.list(&[]),
            self.funcoes.list(&[]),
            self.unidades.list(&[]),
        )?;

        let mut snapshot = self.snapshot.write().await;
        if generation < snapshot.generation {
            tracing::debug!(generation, applied = snapshot.generation, "Discarding stale reload");
            return Ok(false);
        }

        tracing::debug!(
            generation,
            funcionarios = funcionarios.len(),
            departamentos = departamentos.len(),
            funcoes = funcoes.len(),
            unidades = unidades.len(),
            "Directory reloaded"
        );
        snapshot.generation = generation;
        snapshot.collections = Collections {
            funcionarios,
            departamentos,
            funcoes,
            unidades,
        };
        Ok(true)
    }

    pub async fn create(&self, kind: EntityKind, data: &FormData) -> Outcome {
        let body = request_body(kind, data);
        let result = match kind {
            EntityKind::Funcionario => self.funcionarios.create(body).await,
            EntityKind::Departamento => self.departamentos.create(body).await,
            EntityKind::Funcao => self.funcoes.create(body).await,
            EntityKind::Unidade => self.unidades.create(body).await,
        };
        self.finish(kind, None, Mutation::Create, result).await
    }

    pub async fn update(&self, kind: EntityKind, id: i64, data: &FormData) -> Outcome {
        let body = request_body(kind, data);
        let result = match kind {
            EntityKind::Funcionario => self.funcionarios.update(id, body).await,
            EntityKind::Departamento => self.departamentos.update(id, body).await,
            EntityKind::Funcao => self.funcoes.update(id, body).await,
            EntityKind::Unidade => self.unidades.update(id, body).await,
        };
        self.finish(kind, Some(id), Mutation::Update, result).await
    }

    pub async fn delete(&self, kind: EntityKind, id: i64) -> Outcome {
        let result = match kind {
            EntityKind::Funcionario => self.funcionarios.delete(id).await,
            EntityKind::Departamento => self.departamentos.delete(id).await,
            EntityKind::Funcao => self.funcoes.delete(id).await,
            EntityKind::Unidade => self.unidades.delete(id).await,
        };
        self.finish(kind, Some(id), Mutation::Delete, result).await
    }

    async fn finish(
        &self,
        kind: EntityKind,
        id: Option<i64>,
        mutation: Mutation,
        result: ClientResult<RawResponse>,
    ) -> Outcome {
        let action = mutation.as_str();
        match result {
            Ok(resp) if resp.is_ok() => {
                tracing::info!(kind = %kind, id, action, "Mutation accepted");
                // The mutation stands even if the refresh fails
                if let Err(e) = self.reload_all().await {
                    tracing::warn!(error = %e, "Reload after mutation failed");
                }
                Outcome::success()
            }
            Ok(resp) => {
                let message = mutation.failure_message(&resp.body);
                tracing::warn!(
                    kind = %kind,
                    id,
                    action,
                    status = resp.status.as_u16(),
                    %message,
                    "Mutation rejected"
                );
                Outcome::failure(message)
            }
            Err(e) => {
                tracing::error!(kind = %kind, id, action, error = %e, "Mutation request failed");
                Outcome::failure(MSG_CONNECTION)
            }
        }
    }

    /// Reload once each time the filters stop changing for `settle`
    ///
    /// The task holds only a weak reference and ends when the controller
    /// is dropped.
    pub fn spawn_filter_watcher(self: &Arc<Self>, settle: Duration) -> JoinHandle<()> {
        let mut rx = self.filters.subscribe();
        let weak = Arc::downgrade(self);
        tokio::spawn(async move {
            while rx.changed().await.is_ok() {
                if !settled(&mut rx, settle).await {
                    break;
                }
                if !reload_from(&weak).await {
                    break;
                }
            }
            tracing::debug!("Filter watcher stopped");
        })
    }
}

/// Wait until no change arrives for `settle`; `false` once the sender is gone
async fn settled(rx: &mut watch::Receiver<Filters>, settle: Duration) -> bool {
    loop {
        tokio::select! {
            changed = rx.changed() => {
                if changed.is_err() {
                    return false;
                }
            }
            _ = tokio::time::sleep(settle) => return true,
        }
    }
}

async fn reload_from(weak: &Weak<DirectoryController>) -> bool {
    let Some(directory) = weak.upgrade() else {
        return false;
    };
    tracing::debug!(filters = ?directory.filters(), "Filters settled");
    if let Err(e) = directory.reload_all().await {
        tracing::error!(error = %e, "Reload after filter change failed");
    }
    true
}

fn request_body(kind: EntityKind, data: &FormData) -> Value {
    let nome = text(data, "nome");
    let payload = match kind {
        EntityKind::Funcionario => serde_json::to_value(normalize_funcionario(data)),
        EntityKind::Departamento => serde_json::to_value(DepartamentoPayload { nome }),
        EntityKind::Funcao => serde_json::to_value(FuncaoPayload { nome }),
        EntityKind::Unidade => serde_json::to_value(UnidadePayload { nome }),
    };
    // Plain structs of strings and integers always serialize
    payload.unwrap_or(Value::Null)
}

/// Build the employee payload, folding `x_id` aliases into `x`
pub fn normalize_funcionario(data: &FormData) -> FuncionarioPayload {
    FuncionarioPayload {
        nome: text(data, "nome"),
        email: text(data, "email"),
        ramal: text(data, "ramal"),
        whatsapp: text(data, "whatsapp"),
        teams: text(data, "teams"),
        departamento: reference(data, "departamento"),
        funcao: reference(data, "funcao"),
        unidade: reference(data, "unidade"),
    }
}

fn text(data: &FormData, key: &str) -> String {
    match data.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

/// Foreign-key fields of the employee form; each may also arrive as `x_id`
const REFERENCE_FIELDS: [&str; 3] = ["departamento", "funcao", "unidade"];

/// The payload field a form key writes to (`departamento_id` -> `departamento`)
pub(crate) fn canonical_field(field: &str) -> &str {
    field
        .strip_suffix("_id")
        .filter(|base| REFERENCE_FIELDS.contains(base))
        .unwrap_or(field)
}

/// Move usable `x_id` aliases onto `x` so a draft has one key per reference
pub(crate) fn fold_aliases(draft: &mut FormData) {
    for field in REFERENCE_FIELDS {
        let Some(alias) = draft.remove(&format!("{}_id", field)) else {
            continue;
        };
        if id_value(Some(&alias)).is_some() || !draft.contains_key(field) {
            draft.insert(field.to_string(), alias);
        }
    }
}

/// The `x_id` alias wins over `x` when both hold a usable id
fn reference(data: &FormData, key: &str) -> Option<i64> {
    id_value(data.get(&format!("{}_id", key))).or_else(|| id_value(data.get(key)))
}

/// A usable foreign key: a non-zero integer or numeric string
fn id_value(value: Option<&Value>) -> Option<i64> {
    let id = match value? {
        Value::Number(n) => n.as_i64()?,
        Value::String(s) => s.trim().parse().ok()?,
        _ => return None,
    };
    (id != 0).then_some(id)
}
