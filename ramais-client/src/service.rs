//! Entity services
//!
//! Thin per-entity request builders (list/create/update/delete) over the
//! [`HttpClient`]. They never judge success: list degrades to an empty
//! sequence on a non-2xx answer and mutations hand back the raw response.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;
use shared::EntityKind;
use shared::models::{Departamento, Funcao, Funcionario, Unidade};

use crate::ClientResult;
use crate::http::{ApiRequest, HttpClient, RawResponse};

/// A record type served by one REST collection
pub trait Resource: DeserializeOwned + Send + Sync + 'static {
    const KIND: EntityKind;
}

impl Resource for Funcionario {
    const KIND: EntityKind = EntityKind::Funcionario;
}

impl Resource for Departamento {
    const KIND: EntityKind = EntityKind::Departamento;
}

impl Resource for Funcao {
    const KIND: EntityKind = EntityKind::Funcao;
}

impl Resource for Unidade {
    const KIND: EntityKind = EntityKind::Unidade;
}

/// Collection path for a kind, e.g. `funcionarios/`
pub fn collection_path(kind: EntityKind) -> String {
    format!("{}/", kind.path())
}

/// Item path for a kind, e.g. `funcionarios/42/`
pub fn item_path(kind: EntityKind, id: i64) -> String {
    format!("{}/{}/", kind.path(), id)
}

/// Request builder for one entity kind
pub struct EntityService<E> {
    http: Arc<dyn HttpClient>,
    _marker: PhantomData<fn() -> E>,
}

impl<E> Clone for EntityService<E> {
    fn clone(&self) -> Self {
        Self {
            http: self.http.clone(),
            _marker: PhantomData,
        }
    }
}

impl<E: Resource> fmt::Debug for EntityService<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityService").field("kind", &E::KIND).finish()
    }
}

impl<E: Resource> EntityService<E> {
    pub fn new(http: Arc<dyn HttpClient>) -> Self {
        Self {
            http,
            _marker: PhantomData,
        }
    }

    /// Fetch the collection
    ///
    /// Accepts a bare array or a `{"results": [...]}` envelope. Any non-2xx
    /// status yields an empty list; only transport failures are `Err`.
    pub async fn list(&self, params: &[(String, String)]) -> ClientResult<Vec<E>> {
        let request = ApiRequest::get(collection_path(E::KIND)).with_query(params.to_vec());
        let response = self.http.send(request).await?;
        Ok(parse_list(E::KIND, response))
    }

    pub async fn create(&self, data: Value) -> ClientResult<RawResponse> {
        self.http
            .send(ApiRequest::post(collection_path(E::KIND), data))
            .await
    }

    pub async fn update(&self, id: i64, data: Value) -> ClientResult<RawResponse> {
        self.http
            .send(ApiRequest::put(item_path(E::KIND, id), data))
            .await
    }

    pub async fn delete(&self, id: i64) -> ClientResult<RawResponse> {
        self.http.send(ApiRequest::delete(item_path(E::KIND, id))).await
    }
}

/// Normalize a list response to a plain sequence
pub(crate) fn parse_list<E: DeserializeOwned>(kind: EntityKind, response: RawResponse) -> Vec<E> {
    if !response.is_ok() {
        tracing::warn!(kind = %kind, status = response.status.as_u16(), "List request failed");
        return Vec::new();
    }

    let items = match response.body {
        Value::Array(items) => items,
        Value::Object(mut envelope) => match envelope.remove("results") {
            Some(Value::Array(items)) => items,
            _ => {
                tracing::warn!(kind = %kind, "List response has no results array");
                return Vec::new();
            }
        },
        _ => return Vec::new(),
    };

    items
        .into_iter()
        .filter_map(|item| match serde_json::from_value(item) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!(kind = %kind, error = %e, "Skipping malformed record");
                None
            }
        })
        .collect()
}
