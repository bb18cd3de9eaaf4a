//! Application state
//!
//! [`RamaisApp`] owns one controller per concern and wires them to a single
//! [`HttpClient`]. Front-ends talk to the controllers through it.

use std::sync::{Arc, Mutex};

use tokio::task::JoinHandle;

use crate::ClientResult;
use crate::config::ClientConfig;
use crate::directory::DirectoryController;
use crate::http::{HttpClient, NetworkHttpClient};
use crate::modal::ModalCoordinator;
use crate::notice::NoticeBoard;
use crate::outcome::Outcome;
use crate::session::{SessionController, SessionState};

pub struct RamaisApp {
    config: ClientConfig,
    session: Arc<SessionController>,
    directory: Arc<DirectoryController>,
    modal: ModalCoordinator,
    notices: Arc<NoticeBoard>,
    watcher: Mutex<Option<JoinHandle<()>>>,
}

impl RamaisApp {
    /// Build the app over a real network client
    pub fn new(config: ClientConfig) -> ClientResult<Self> {
        let http = Arc::new(NetworkHttpClient::new(&config)?);
        Ok(Self::with_http(config, http))
    }

    pub fn with_http(config: ClientConfig, http: Arc<dyn HttpClient>) -> Self {
        let session = Arc::new(SessionController::new(http.clone()));
        let directory = Arc::new(DirectoryController::new(http));
        let notices = Arc::new(NoticeBoard::new(config.notice_ttl));
        let modal = ModalCoordinator::new(session.clone(), directory.clone(), notices.clone());
        Self {
            config,
            session,
            directory,
            modal,
            notices,
            watcher: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn session(&self) -> &SessionController {
        &self.session
    }

    pub fn directory(&self) -> &Arc<DirectoryController> {
        &self.directory
    }

    pub fn modal(&self) -> &ModalCoordinator {
        &self.modal
    }

    pub fn notices(&self) -> &NoticeBoard {
        &self.notices
    }

    /// Restore the session, start reloading on filter changes and, if
    /// authenticated, load the directory
    pub async fn start(&self) -> SessionState {
        self.watch_filters();
        let state = self.session.initialize().await;
        if matches!(state, SessionState::Authenticated(_)) {
            self.refresh().await;
        }
        state
    }

    pub async fn login(&self, username: &str, password: &str) -> Outcome {
        let outcome = self.session.login(username, password).await;
        self.notices.report(&outcome);
        if outcome.is_success() {
            self.refresh().await;
        }
        outcome
    }

    /// End the session and forget everything loaded under it
    pub async fn logout(&self) -> Outcome {
        let outcome = self.session.logout().await;
        self.modal.close_modal().await;
        self.directory.clear().await;
        self.notices.report(&outcome);
        outcome
    }

    async fn refresh(&self) {
        if let Err(e) = self.directory.reload_all().await {
            tracing::error!(error = %e, "Failed to load directory");
        }
    }

    /// Reload automatically whenever the filters settle; idempotent
    pub fn watch_filters(&self) {
        let mut slot = self.watcher.lock().unwrap_or_else(|e| e.into_inner());
        if slot.as_ref().is_some_and(|handle| !handle.is_finished()) {
            return;
        }
        *slot = Some(self.directory.spawn_filter_watcher(self.config.filter_settle));
    }
}

impl Drop for RamaisApp {
    fn drop(&mut self) {
        let slot = self.watcher.get_mut().unwrap_or_else(|e| e.into_inner());
        if let Some(handle) = slot.take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeApi, directory_fixture, ok, status};
    use reqwest::Method;
    use serde_json::json;
    use std::time::Duration;

    fn api(logged_in: bool) -> Arc<FakeApi> {
        Arc::new(FakeApi::new(move |req| match req.path.as_str() {
            "auth/me/" if logged_in => ok(json!({"username": "admin", "is_admin": true})),
            "auth/me/" => status(403, json!({"detail": "Credenciais não fornecidas."})),
            "auth/login/" => ok(json!({
                "message": "ok",
                "user": {"username": "admin", "is_admin": true}
            })),
            "auth/logout/" => ok(json!({"message": "ok"})),
            _ => directory_fixture(req),
        }))
    }

    #[tokio::test]
    async fn test_start_with_existing_session_loads_directory() {
        let api = api(true);
        let app = RamaisApp::with_http(ClientConfig::default(), api.clone());

        assert!(matches!(app.start().await, SessionState::Authenticated(_)));
        assert_eq!(api.reloads(), 1);
        assert_eq!(app.directory().collections().await.funcionarios.len(), 1);
    }

    #[tokio::test]
    async fn test_start_anonymous_loads_nothing() {
        let api = api(false);
        let app = RamaisApp::with_http(ClientConfig::default(), api.clone());

        assert_eq!(app.start().await, SessionState::Anonymous);
        assert_eq!(api.reloads(), 0);
    }

    #[tokio::test]
    async fn test_login_triggers_initial_reload() {
        let api = api(false);
        let app = RamaisApp::with_http(ClientConfig::default(), api.clone());
        app.start().await;

        let outcome = app.login("admin", "admin123").await;
        assert!(outcome.is_success());
        assert!(app.session().is_authenticated().await);
        assert_eq!(api.reloads(), 1);
        assert_eq!(app.notices().current().unwrap().text, "Login realizado com sucesso!");
    }

    #[tokio::test]
    async fn test_logout_clears_directory() {
        let api = api(true);
        let app = RamaisApp::with_http(ClientConfig::default(), api.clone());
        app.start().await;

        assert!(app.logout().await.is_success());
        assert_eq!(api.count(Method::POST, "auth/logout/"), 1);
        assert_eq!(app.session().state().await, SessionState::Anonymous);
        assert!(app.directory().collections().await.funcionarios.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_watch_filters_uses_configured_settle() {
        let api = api(true);
        let config = ClientConfig::default().with_filter_settle(Duration::from_millis(100));
        let app = RamaisApp::with_http(config, api.clone());
        app.watch_filters();
        app.watch_filters();

        app.directory().set_search("ana");
        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(api.reloads(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_started_app_reloads_on_filter_change() {
        let api = api(true);
        let app = RamaisApp::with_http(ClientConfig::default(), api.clone());
        app.start().await;
        assert_eq!(api.reloads(), 1);

        app.directory().set_search("ana");
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(api.reloads(), 2);

        let last = api
            .requests()
            .into_iter()
            .filter(|r| r.path == "funcionarios/")
            .last()
            .unwrap();
        assert_eq!(last.query, vec![("busca".to_string(), "ana".to_string())]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_watch_after_start_keeps_single_watcher() {
        let api = api(true);
        let app = RamaisApp::with_http(ClientConfig::default(), api.clone());
        app.start().await;
        app.watch_filters();

        app.directory().set_search("bia");
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(api.reloads(), 2);
    }
}
