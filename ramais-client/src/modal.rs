//! Form/modal coordinator
//!
//! One edit form at a time, shared by all four entity kinds. Every action
//! passes the session's edit-capability gate, ends in an [`Outcome`] and
//! posts that outcome to the [`NoticeBoard`].

use std::sync::Arc;

use serde_json::Value;
use shared::EntityKind;
use tokio::sync::RwLock;

use crate::directory::{DirectoryController, FormData, canonical_field, fold_aliases};
use crate::notice::{NoticeBoard, NoticeLevel};
use crate::outcome::{
    MSG_CONFIRM_DELETE, MSG_DELETE_CANCELLED, MSG_NO_FORM, MSG_PERMISSION_DENIED,
    MSG_UPDATE_FAILED, Outcome,
};
use crate::session::SessionController;

/// Asks the user to confirm a destructive action
pub trait Confirm {
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F> Confirm for F
where
    F: Fn(&str) -> bool,
{
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModalState {
    pub is_open: bool,
    pub kind: Option<EntityKind>,
    /// Record being edited; `None` while creating
    pub editing: Option<FormData>,
    pub draft: FormData,
}

impl ModalState {
    pub fn title(&self) -> Option<String> {
        let kind = self.kind.filter(|_| self.is_open)?;
        let verb = if self.editing.is_some() { "Editar" } else { "Adicionar" };
        Some(format!("{} {}", verb, kind.label()))
    }

    pub fn editing_id(&self) -> Option<i64> {
        match self.editing.as_ref()?.get("id")? {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.parse().ok(),
            _ => None,
        }
    }
}

enum Done {
    Created,
    Updated,
    Deleted,
}

/// `"Função criada com sucesso!"`, `"Funcionário excluído com sucesso!"`
fn success_message(kind: EntityKind, done: Done) -> String {
    let feminine = matches!(kind, EntityKind::Funcao | EntityKind::Unidade);
    let participle = match (done, feminine) {
        (Done::Created, false) => "criado",
        (Done::Created, true) => "criada",
        (Done::Updated, false) => "atualizado",
        (Done::Updated, true) => "atualizada",
        (Done::Deleted, false) => "excluído",
        (Done::Deleted, true) => "excluída",
    };
    format!("{} {} com sucesso!", kind.label(), participle)
}

pub struct ModalCoordinator {
    session: Arc<SessionController>,
    directory: Arc<DirectoryController>,
    notices: Arc<NoticeBoard>,
    state: RwLock<ModalState>,
}

impl ModalCoordinator {
    pub fn new(
        session: Arc<SessionController>,
        directory: Arc<DirectoryController>,
        notices: Arc<NoticeBoard>,
    ) -> Self {
        Self {
            session,
            directory,
            notices,
            state: RwLock::new(ModalState::default()),
        }
    }

    pub async fn state(&self) -> ModalState {
        self.state.read().await.clone()
    }

    fn conclude(&self, outcome: Outcome) -> Outcome {
        self.notices.report(&outcome);
        outcome
    }

    async fn permitted(&self) -> bool {
        if self.session.can_edit().await {
            return true;
        }
        tracing::info!("Edit attempt without permission");
        false
    }

    /// Open the form, seeded from `record` when editing
    pub async fn open_modal(&self, kind: EntityKind, record: Option<FormData>) -> Outcome {
        if !self.permitted().await {
            return self.conclude(Outcome::failure(MSG_PERMISSION_DENIED));
        }

        let mut draft = record.clone().unwrap_or_default();
        fold_aliases(&mut draft);
        *self.state.write().await = ModalState {
            is_open: true,
            kind: Some(kind),
            editing: record,
            draft,
        };
        tracing::debug!(kind = %kind, "Modal opened");
        Outcome::success()
    }

    /// Same as [`open_modal`](Self::open_modal) for a kind given by its tag
    pub async fn open_modal_tagged(&self, tag: &str, record: Option<FormData>) -> Outcome {
        match tag.parse::<EntityKind>() {
            Ok(kind) => self.open_modal(kind, record).await,
            Err(e) => {
                tracing::warn!(tag, "Unknown entity kind");
                self.conclude(Outcome::failure(e.to_string()))
            }
        }
    }

    /// Discard the form and its draft
    pub async fn close_modal(&self) {
        *self.state.write().await = ModalState::default();
    }

    /// Set one draft field; ignored while the form is closed
    ///
    /// `departamento_id` and friends write to `departamento`.
    pub async fn update_draft(&self, field: impl Into<String>, value: Value) {
        let field = field.into();
        let mut state = self.state.write().await;
        if !state.is_open {
            return;
        }
        let canonical = canonical_field(&field);
        if canonical != field {
            state.draft.remove(&field);
        }
        state.draft.insert(canonical.to_string(), value);
    }

    pub async fn set_draft(&self, mut draft: FormData) {
        let mut state = self.state.write().await;
        if state.is_open {
            fold_aliases(&mut draft);
            state.draft = draft;
        }
    }

    /// Submit the draft: update when editing, create otherwise
    pub async fn save(&self) -> Outcome {
        let state = self.state().await;
        let Some(kind) = state.kind.filter(|_| state.is_open) else {
            return self.conclude(Outcome::failure(MSG_NO_FORM));
        };
        if !self.permitted().await {
            return self.conclude(Outcome::failure(MSG_PERMISSION_DENIED));
        }

        let outcome = match (&state.editing, state.editing_id()) {
            (None, _) => self
                .directory
                .create(kind, &state.draft)
                .await
                .map_success(|| success_message(kind, Done::Created)),
            (Some(_), Some(id)) => self
                .directory
                .update(kind, id, &state.draft)
                .await
                .map_success(|| success_message(kind, Done::Updated)),
            (Some(_), None) => {
                tracing::warn!(kind = %kind, "Edited record has no id");
                Outcome::failure(MSG_UPDATE_FAILED)
            }
        };

        if outcome.is_success() {
            self.close_modal().await;
        }
        self.conclude(outcome)
    }

    /// Delete after the user confirms
    pub async fn delete_item(&self, kind: EntityKind, id: i64, confirm: &impl Confirm) -> Outcome {
        if !self.permitted().await {
            return self.conclude(Outcome::failure(MSG_PERMISSION_DENIED));
        }
        if !confirm.confirm(MSG_CONFIRM_DELETE) {
            tracing::debug!(kind = %kind, id, "Delete declined");
            self.notices.show(NoticeLevel::Info, MSG_DELETE_CANCELLED);
            return Outcome::failure(MSG_DELETE_CANCELLED);
        }

        let outcome = self
            .directory
            .delete(kind, id)
            .await
            .map_success(|| success_message(kind, Done::Deleted));
        self.conclude(outcome)
    }

    pub async fn delete_item_tagged(&self, tag: &str, id: i64, confirm: &impl Confirm) -> Outcome {
        match tag.parse::<EntityKind>() {
            Ok(kind) => self.delete_item(kind, id, confirm).await,
            Err(e) => {
                tracing::warn!(tag, id, "Unknown entity kind");
                self.conclude(Outcome::failure(e.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::HttpClient;
    use crate::testing::{FakeApi, directory_fixture, ok, status};
    use reqwest::Method;
    use serde_json::json;
    use std::time::Duration;

    struct Harness {
        api: Arc<FakeApi>,
        notices: Arc<NoticeBoard>,
        modal: ModalCoordinator,
    }

    /// Logged-in coordinator whose user has the given flags
    async fn harness(is_admin: bool, can_edit: bool) -> Harness {
        let api = Arc::new(FakeApi::new(move |req| match req.path.as_str() {
            "auth/login/" => ok(json!({
                "user": {"username": "u", "is_admin": is_admin, "can_edit": can_edit}
            })),
            "funcionarios/7/" if req.method == Method::PUT => {
                status(400, json!({"ramal": ["Ramal já cadastrado"]}))
            }
            _ => directory_fixture(req),
        }));
        let http: Arc<dyn HttpClient> = api.clone();
        let session = Arc::new(SessionController::new(http.clone()));
        session.login("u", "p").await;
        let directory = Arc::new(DirectoryController::new(http));
        let notices = Arc::new(NoticeBoard::new(Duration::from_secs(5)));
        let modal = ModalCoordinator::new(session, directory, notices.clone());
        Harness { api, notices, modal }
    }

    fn record(value: Value) -> FormData {
        match value {
            Value::Object(map) => map,
            _ => panic!("record must be an object"),
        }
    }

    #[tokio::test]
    async fn test_viewer_cannot_open_modal() {
        let h = harness(false, false).await;
        let outcome = h.modal.open_modal(EntityKind::Funcionario, None).await;

        assert_eq!(outcome, Outcome::failure(MSG_PERMISSION_DENIED));
        assert!(!h.modal.state().await.is_open);
        assert_eq!(h.notices.current().unwrap().text, MSG_PERMISSION_DENIED);
    }

    #[tokio::test]
    async fn test_can_edit_flag_is_enough() {
        let h = harness(false, true).await;
        assert!(h.modal.open_modal(EntityKind::Unidade, None).await.is_success());
        let state = h.modal.state().await;
        assert!(state.is_open);
        assert_eq!(state.title().as_deref(), Some("Adicionar Unidade"));
        assert!(state.draft.is_empty());
    }

    #[tokio::test]
    async fn test_edit_seeds_draft() {
        let h = harness(true, false).await;
        let rec = record(json!({"id": 3, "nome": "Analista"}));
        h.modal.open_modal(EntityKind::Funcao, Some(rec.clone())).await;

        let state = h.modal.state().await;
        assert_eq!(state.draft, rec);
        assert_eq!(state.editing_id(), Some(3));
        assert_eq!(state.title().as_deref(), Some("Editar Função"));
    }

    #[tokio::test]
    async fn test_save_without_record_creates() {
        let h = harness(true, false).await;
        h.modal.open_modal(EntityKind::Departamento, None).await;
        h.modal.update_draft("nome", json!("Techto")).await;

        let outcome = h.modal.save().await;
        assert_eq!(outcome, Outcome::success_with("Departamento criado com sucesso!"));
        assert_eq!(h.api.count(Method::POST, "departamentos/"), 1);
        assert_eq!(h.api.reloads(), 1);
        assert_eq!(h.modal.state().await, ModalState::default());
    }

    #[tokio::test]
    async fn test_alias_edit_reaches_update_payload() {
        let h = harness(true, false).await;
        h.modal
            .open_modal(
                EntityKind::Funcionario,
                Some(record(json!({"id": 42, "nome": "Ana", "departamento": 1}))),
            )
            .await;
        h.modal.update_draft("departamento_id", json!("5")).await;
        assert_eq!(h.modal.state().await.draft["departamento"], json!("5"));
        assert!(!h.modal.state().await.draft.contains_key("departamento_id"));

        assert!(h.modal.save().await.is_success());
        let put = h
            .api
            .requests()
            .into_iter()
            .find(|r| r.method == Method::PUT)
            .unwrap();
        assert_eq!(put.path, "funcionarios/42/");
        assert_eq!(put.body.unwrap()["departamento"], json!(5));
    }

    #[tokio::test]
    async fn test_set_draft_folds_aliases() {
        let h = harness(true, false).await;
        h.modal.open_modal(EntityKind::Funcionario, None).await;
        h.modal.set_draft(record(json!({"nome": "Bia", "unidade_id": "5"}))).await;

        let draft = h.modal.state().await.draft;
        assert_eq!(draft, record(json!({"nome": "Bia", "unidade": "5"})));
    }

    #[tokio::test]
    async fn test_save_with_record_updates_by_id() {
        let h = harness(true, false).await;
        h.modal
            .open_modal(EntityKind::Unidade, Some(record(json!({"id": 5, "nome": "Matriz"}))))
            .await;
        h.modal.update_draft("nome", json!("Filial")).await;

        let outcome = h.modal.save().await;
        assert_eq!(outcome, Outcome::success_with("Unidade atualizada com sucesso!"));
        assert_eq!(h.api.count(Method::PUT, "unidades/5/"), 1);
        assert_eq!(h.api.count(Method::POST, "unidades/"), 0);
    }

    #[tokio::test]
    async fn test_failed_save_keeps_modal_open() {
        let h = harness(true, false).await;
        h.modal
            .open_modal(EntityKind::Funcionario, Some(record(json!({"id": 7, "nome": "Ana"}))))
            .await;

        let outcome = h.modal.save().await;
        assert_eq!(outcome, Outcome::failure("Ramal já cadastrado"));
        assert!(h.modal.state().await.is_open);
        assert_eq!(h.api.reloads(), 0);
    }

    #[tokio::test]
    async fn test_save_without_open_form() {
        let h = harness(true, false).await;
        assert_eq!(h.modal.save().await, Outcome::failure(MSG_NO_FORM));
    }

    #[tokio::test]
    async fn test_close_discards_draft() {
        let h = harness(true, false).await;
        h.modal.open_modal(EntityKind::Funcionario, None).await;
        h.modal.update_draft("nome", json!("Rascunho")).await;
        h.modal.close_modal().await;

        assert_eq!(h.modal.state().await, ModalState::default());
        h.modal.update_draft("nome", json!("ignored")).await;
        assert!(h.modal.state().await.draft.is_empty());
    }

    #[tokio::test]
    async fn test_delete_confirmed() {
        let h = harness(true, false).await;
        let outcome = h.modal.delete_item(EntityKind::Funcionario, 42, &|_: &str| true).await;

        assert_eq!(outcome, Outcome::success_with("Funcionário excluído com sucesso!"));
        assert!(outcome.message().unwrap().contains("excluído"));
        assert_eq!(h.api.count(Method::DELETE, "funcionarios/42/"), 1);
        assert_eq!(h.api.reloads(), 1);
    }

    #[tokio::test]
    async fn test_delete_declined_sends_nothing() {
        let h = harness(true, false).await;
        let before = h.api.requests().len();
        let outcome = h
            .modal
            .delete_item(EntityKind::Funcao, 3, &|prompt: &str| {
                assert_eq!(prompt, MSG_CONFIRM_DELETE);
                false
            })
            .await;

        assert_eq!(outcome, Outcome::failure(MSG_DELETE_CANCELLED));
        assert_eq!(h.api.requests().len(), before);
        assert_eq!(h.notices.current().unwrap().level, NoticeLevel::Info);
    }

    #[tokio::test]
    async fn test_viewer_cannot_delete() {
        let h = harness(false, false).await;
        let outcome = h.modal.delete_item(EntityKind::Funcionario, 42, &|_: &str| true).await;
        assert_eq!(outcome, Outcome::failure(MSG_PERMISSION_DENIED));
        assert_eq!(h.api.count(Method::DELETE, "funcionarios/42/"), 0);
    }

    #[tokio::test]
    async fn test_unknown_tag_is_reported() {
        let h = harness(true, false).await;
        let outcome = h.modal.open_modal_tagged("cargo", None).await;
        assert_eq!(outcome, Outcome::failure("Tipo de registro desconhecido: cargo"));
        assert!(!h.modal.state().await.is_open);

        let outcome = h.modal.delete_item_tagged("cargo", 1, &|_: &str| true).await;
        assert!(!outcome.is_success());
        assert!(h.modal.open_modal_tagged("unidades", None).await.is_success());
    }

    #[test]
    fn test_success_messages_agree_in_gender() {
        assert_eq!(
            success_message(EntityKind::Funcao, Done::Deleted),
            "Função excluída com sucesso!"
        );
        assert_eq!(
            success_message(EntityKind::Departamento, Done::Updated),
            "Departamento atualizado com sucesso!"
        );
    }
}
