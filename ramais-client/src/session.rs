//! Session controller
//!
//! Owns the current-user state: `Initializing → {Authenticated, Anonymous}`.

use std::sync::Arc;

use serde_json::json;
use shared::client::{LoginRequest, LoginResponse, UserInfo};
use tokio::sync::RwLock;

use crate::http::{ApiRequest, HttpClient};
use crate::outcome::{
    MSG_CONNECTION, MSG_LOGIN_FAILED, MSG_LOGIN_OK, MSG_LOGOUT_FAILED, MSG_LOGOUT_OK, Outcome,
    login_error_message,
};

const PATH_ROOT: &str = "";
const PATH_ME: &str = "auth/me/";
const PATH_LOGIN: &str = "auth/login/";
const PATH_LOGOUT: &str = "auth/logout/";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Initializing,
    Authenticated(UserInfo),
    Anonymous,
}

pub struct SessionController {
    http: Arc<dyn HttpClient>,
    state: RwLock<SessionState>,
}

impl SessionController {
    pub fn new(http: Arc<dyn HttpClient>) -> Self {
        Self {
            http,
            state: RwLock::new(SessionState::Initializing),
        }
    }

    pub async fn state(&self) -> SessionState {
        self.state.read().await.clone()
    }

    pub async fn user(&self) -> Option<UserInfo> {
        match &*self.state.read().await {
            SessionState::Authenticated(user) => Some(user.clone()),
            _ => None,
        }
    }

    pub async fn is_authenticated(&self) -> bool {
        matches!(*self.state.read().await, SessionState::Authenticated(_))
    }

    /// Whether the current user may mutate records
    pub async fn can_edit(&self) -> bool {
        match &*self.state.read().await {
            SessionState::Authenticated(user) => user.can_edit_records(),
            _ => false,
        }
    }

    /// Provoke the CSRF cookie, then restore an existing session if the
    /// server still recognizes it
    pub async fn initialize(&self) -> SessionState {
        if let Err(e) = self.http.send(ApiRequest::get(PATH_ROOT)).await {
            tracing::warn!(error = %e, "Failed to fetch CSRF cookie");
        }

        let next = match self.http.send(ApiRequest::get(PATH_ME)).await {
            Ok(resp) if resp.is_ok() => match resp.parse::<UserInfo>() {
                Ok(user) => {
                    tracing::info!(username = %user.username, "Session restored");
                    SessionState::Authenticated(user)
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Malformed current-user response");
                    SessionState::Anonymous
                }
            },
            Ok(resp) => {
                tracing::debug!(status = resp.status.as_u16(), "No active session");
                SessionState::Anonymous
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to check session");
                SessionState::Anonymous
            }
        };

        *self.state.write().await = next.clone();
        next
    }

    pub async fn login(&self, username: &str, password: &str) -> Outcome {
        let request = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        let body = json!(request);

        let resp = match self.http.send(ApiRequest::post(PATH_LOGIN, body)).await {
            Ok(resp) => resp,
            Err(e) => {
                tracing::error!(error = %e, "Login request failed");
                return Outcome::failure(MSG_CONNECTION);
            }
        };

        if !resp.is_ok() {
            tracing::info!(username = %username, status = resp.status.as_u16(), "Login rejected");
            let message = login_error_message(&resp.body)
                .unwrap_or_else(|| MSG_LOGIN_FAILED.to_string());
            return Outcome::failure(message);
        }

        match resp.parse::<LoginResponse>() {
            Ok(LoginResponse { user }) => {
                tracing::info!(username = %user.username, is_admin = user.is_admin, "Logged in");
                *self.state.write().await = SessionState::Authenticated(user);
                Outcome::success_with(MSG_LOGIN_OK)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Login response without user");
                Outcome::failure(MSG_LOGIN_FAILED)
            }
        }
    }

    /// Always ends anonymous, whatever the server answers
    pub async fn logout(&self) -> Outcome {
        let result = self.http.send(ApiRequest::post_empty(PATH_LOGOUT)).await;
        *self.state.write().await = SessionState::Anonymous;

        match result {
            Ok(resp) => {
                if !resp.is_ok() {
                    tracing::warn!(status = resp.status.as_u16(), "Logout not acknowledged");
                }
                Outcome::success_with(MSG_LOGOUT_OK)
            }
            Err(e) => {
                tracing::error!(error = %e, "Logout request failed");
                Outcome::failure(MSG_LOGOUT_FAILED)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeApi, ok, status, transport_error};
    use reqwest::Method;

    #[tokio::test]
    async fn test_initialize_authenticated() {
        let api = Arc::new(FakeApi::new(|req| match req.path.as_str() {
            "auth/me/" => ok(json!({"id": 1, "username": "admin", "is_admin": true})),
            _ => ok(json!({})),
        }));
        let session = SessionController::new(api.clone());
        assert_eq!(session.state().await, SessionState::Initializing);

        let state = session.initialize().await;
        assert!(matches!(state, SessionState::Authenticated(ref u) if u.username == "admin"));
        assert!(session.can_edit().await);

        // CSRF warm-up comes first
        let paths: Vec<String> = api.requests().into_iter().map(|r| r.path).collect();
        assert_eq!(paths, vec!["".to_string(), "auth/me/".to_string()]);
    }

    #[tokio::test]
    async fn test_initialize_anonymous_on_403_or_network_error() {
        let api = Arc::new(FakeApi::new(|req| match req.path.as_str() {
            "auth/me/" => status(403, json!({"detail": "Not authenticated"})),
            _ => ok(json!({})),
        }));
        let session = SessionController::new(api);
        assert_eq!(session.initialize().await, SessionState::Anonymous);

        let api = Arc::new(FakeApi::new(|_| Err(transport_error())));
        let session = SessionController::new(api);
        assert_eq!(session.initialize().await, SessionState::Anonymous);
        assert!(!session.can_edit().await);
    }

    #[tokio::test]
    async fn test_login_success() {
        let api = Arc::new(FakeApi::new(|_| {
            ok(json!({"message": "ok", "user": {"username": "admin", "is_admin": true}}))
        }));
        let session = SessionController::new(api.clone());

        let outcome = session.login("admin", "admin123").await;
        assert_eq!(outcome, Outcome::success_with(MSG_LOGIN_OK));
        assert_eq!(session.user().await.unwrap().username, "admin");

        let req = api.last().unwrap();
        assert_eq!(req.method, Method::POST);
        assert_eq!(req.path, "auth/login/");
        assert_eq!(req.body, Some(json!({"username": "admin", "password": "admin123"})));
    }

    #[tokio::test]
    async fn test_login_failure_messages() {
        let api = Arc::new(FakeApi::new(|_| {
            status(400, json!({"password": ["Este campo é obrigatório."]}))
        }));
        let session = SessionController::new(api);
        assert_eq!(
            session.login("admin", "").await,
            Outcome::failure("Este campo é obrigatório.")
        );
        assert!(!session.is_authenticated().await);

        let api = Arc::new(FakeApi::new(|_| status(500, json!({}))));
        let session = SessionController::new(api);
        assert_eq!(session.login("a", "b").await, Outcome::failure(MSG_LOGIN_FAILED));

        let api = Arc::new(FakeApi::new(|_| Err(transport_error())));
        let session = SessionController::new(api);
        assert_eq!(session.login("a", "b").await, Outcome::failure(MSG_CONNECTION));
    }

    #[tokio::test]
    async fn test_logout_always_ends_anonymous() {
        let api = Arc::new(FakeApi::new(|req| match req.path.as_str() {
            "auth/login/" => ok(json!({"user": {"username": "ana", "can_edit": true}})),
            _ => status(500, json!({})),
        }));
        let session = SessionController::new(api);
        session.login("ana", "x").await;
        assert!(session.can_edit().await);

        assert_eq!(session.logout().await, Outcome::success_with(MSG_LOGOUT_OK));
        assert_eq!(session.state().await, SessionState::Anonymous);
    }

    #[tokio::test]
    async fn test_logout_network_failure() {
        let api = Arc::new(FakeApi::new(|_| Err(transport_error())));
        let session = SessionController::new(api);
        assert_eq!(session.logout().await, Outcome::failure(MSG_LOGOUT_FAILED));
        assert_eq!(session.state().await, SessionState::Anonymous);
    }
}
