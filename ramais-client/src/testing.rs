//! In-memory fake of the directory API for unit tests

use std::sync::Mutex;

use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use serde_json::{Value, json};

use crate::http::{ApiRequest, HttpClient, RawResponse};
use crate::{ClientError, ClientResult};

type Responder = Box<dyn Fn(&ApiRequest) -> ClientResult<RawResponse> + Send + Sync>;

/// Records every request and answers through a closure
pub struct FakeApi {
    responder: Responder,
    requests: Mutex<Vec<ApiRequest>>,
}

impl FakeApi {
    pub fn new(
        responder: impl Fn(&ApiRequest) -> ClientResult<RawResponse> + Send + Sync + 'static,
    ) -> Self {
        Self {
            responder: Box::new(responder),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Answers list endpoints with small fixtures and everything else with 200 `{}`
    pub fn directory() -> Self {
        Self::new(directory_fixture)
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn count(&self, method: Method, path: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.method == method && r.path == path)
            .count()
    }

    /// Number of complete reload cycles observed (one employee list per cycle)
    pub fn reloads(&self) -> usize {
        self.count(Method::GET, "funcionarios/")
    }

    pub fn last(&self) -> Option<ApiRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl HttpClient for FakeApi {
    async fn send(&self, request: ApiRequest) -> ClientResult<RawResponse> {
        self.requests.lock().unwrap().push(request.clone());
        (self.responder)(&request)
    }
}

pub fn ok(body: Value) -> ClientResult<RawResponse> {
    Ok(RawResponse::new(StatusCode::OK, body))
}

pub fn status(code: u16, body: Value) -> ClientResult<RawResponse> {
    Ok(RawResponse::new(StatusCode::from_u16(code).unwrap(), body))
}

/// A genuine reqwest error, produced without touching the network
pub fn transport_error() -> ClientError {
    let err = reqwest::Client::new().get("not a url").build().unwrap_err();
    ClientError::Http(err)
}

pub fn directory_fixture(req: &ApiRequest) -> ClientResult<RawResponse> {
    match (req.method.clone(), req.path.as_str()) {
        (Method::GET, "funcionarios/") => ok(json!({
            "count": 1,
            "results": [{"id": 42, "nome": "Ana", "ramal": "2040", "departamento": 1}]
        })),
        (Method::GET, "departamentos/") => ok(json!([{"id": 1, "nome": "Chiaperini"}])),
        (Method::GET, "funcoes/") => ok(json!([{"id": 3, "nome": "Analista"}])),
        (Method::GET, "unidades/") => ok(json!([{"id": 5, "nome": "Matriz"}])),
        (Method::DELETE, _) => status(204, json!({})),
        (Method::POST, _) => status(201, json!({"id": 99})),
        _ => ok(json!({})),
    }
}
