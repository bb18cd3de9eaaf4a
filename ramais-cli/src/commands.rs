//! Command implementations

use std::io::{self, BufRead, Write};

use anyhow::{Context, bail};
use ramais_client::{EntityKind, Filters, FormData, Outcome, RamaisApp, UserInfo};
use serde_json::Value;
use shared::contact::{dial_uri, mailto_uri, teams_chat_links, whatsapp_link};
use shared::models::Funcionario;

/// Parse a `key=value` field argument
pub fn parse_field(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got `{}`", raw))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty field name in `{}`", raw));
    }
    Ok((key.to_string(), value.to_string()))
}

fn finish(outcome: Outcome) -> anyhow::Result<()> {
    match outcome {
        Outcome::Success(message) => {
            if let Some(message) = message {
                println!("{}", message);
            }
            Ok(())
        }
        Outcome::Failure(message) => bail!(message),
    }
}

pub async fn login(
    app: &RamaisApp,
    user: Option<&str>,
    password: Option<&str>,
) -> anyhow::Result<()> {
    let (Some(user), Some(password)) = (user, password) else {
        bail!("Sessão não autenticada: informe --user e --password");
    };
    match app.login(user, password).await {
        Outcome::Success(_) => {
            tracing::info!(username = user, "Logged in");
            Ok(())
        }
        Outcome::Failure(message) => bail!(message),
    }
}

pub async fn list(app: &RamaisApp, kind: &str, json: bool) -> anyhow::Result<()> {
    let kind: EntityKind = kind.parse()?;
    let collections = app.directory().collections().await;

    if json {
        let value = match kind {
            EntityKind::Funcionario => serde_json::to_value(&collections.funcionarios)?,
            EntityKind::Departamento => serde_json::to_value(&collections.departamentos)?,
            EntityKind::Funcao => serde_json::to_value(&collections.funcoes)?,
            EntityKind::Unidade => serde_json::to_value(&collections.unidades)?,
        };
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    let lines: Vec<String> = match kind {
        EntityKind::Funcionario => collections.funcionarios.iter().map(employee_line).collect(),
        EntityKind::Departamento => collections
            .departamentos
            .iter()
            .map(|d| named_line(d.id, &d.nome, d.funcionarios_count))
            .collect(),
        EntityKind::Funcao => collections
            .funcoes
            .iter()
            .map(|f| named_line(f.id, &f.nome, f.funcionarios_count))
            .collect(),
        EntityKind::Unidade => collections
            .unidades
            .iter()
            .map(|u| named_line(u.id, &u.nome, u.funcionarios_count))
            .collect(),
    };
    if lines.is_empty() {
        println!("Nenhum registro encontrado");
    }
    for line in lines {
        println!("{}", line);
    }
    Ok(())
}

pub async fn search(
    app: &RamaisApp,
    term: String,
    departamento: Option<i64>,
    funcao: Option<i64>,
    unidade: Option<i64>,
    json: bool,
) -> anyhow::Result<()> {
    let filters = Filters {
        busca: term,
        departamento_id: departamento,
        funcao_id: funcao,
        unidade_id: unidade,
    };
    if app.directory().set_filters(filters) {
        app.directory()
            .reload_all()
            .await
            .context("Erro ao carregar dados")?;
    }
    list(app, EntityKind::Funcionario.as_str(), json).await
}

pub async fn create(
    app: &RamaisApp,
    kind: &str,
    fields: Vec<(String, String)>,
) -> anyhow::Result<()> {
    let modal = app.modal();
    finish(modal.open_modal_tagged(kind, None).await)?;
    modal.set_draft(form(fields)).await;
    finish(modal.save().await)
}

pub async fn update(
    app: &RamaisApp,
    kind: &str,
    id: i64,
    fields: Vec<(String, String)>,
) -> anyhow::Result<()> {
    let kind: EntityKind = kind.parse()?;
    let record = current_record(app, kind, id).await.unwrap_or_else(|| {
        tracing::debug!(kind = %kind, id, "Record not loaded, sending given fields only");
        let mut record = FormData::new();
        record.insert("id".to_string(), Value::from(id));
        record
    });

    let modal = app.modal();
    finish(modal.open_modal(kind, Some(record)).await)?;
    for (key, value) in fields {
        modal.update_draft(key, Value::String(value)).await;
    }
    finish(modal.save().await)
}

pub async fn delete(app: &RamaisApp, kind: &str, id: i64, yes: bool) -> anyhow::Result<()> {
    let confirm = |prompt: &str| yes || ask(prompt);
    finish(app.modal().delete_item_tagged(kind, id, &confirm).await)
}

pub async fn contact(app: &RamaisApp, id: i64) -> anyhow::Result<()> {
    let collections = app.directory().collections().await;
    let funcionario = collections
        .funcionarios
        .iter()
        .find(|f| f.id == id)
        .with_context(|| format!("Funcionário {} não encontrado", id))?;

    println!("{}", funcionario.nome);
    for line in contact_lines(funcionario) {
        println!("  {}", line);
    }
    Ok(())
}

pub async fn whoami(app: &RamaisApp, json: bool) -> anyhow::Result<()> {
    let user = app
        .session()
        .user()
        .await
        .context("Sessão não autenticada")?;
    if json {
        println!("{}", serde_json::to_string_pretty(&user)?);
    } else {
        println!("{} ({})", user.username, role(&user));
    }
    Ok(())
}

fn ask(prompt: &str) -> bool {
    eprint!("{} [s/N] ", prompt);
    let _ = io::stderr().flush();
    let mut answer = String::new();
    if io::stdin().lock().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim().to_lowercase().as_str(), "s" | "sim" | "y" | "yes")
}

fn form(fields: Vec<(String, String)>) -> FormData {
    fields
        .into_iter()
        .map(|(key, value)| (key, Value::String(value)))
        .collect()
}

/// The loaded record as form data, if it is in the current collections
async fn current_record(app: &RamaisApp, kind: EntityKind, id: i64) -> Option<FormData> {
    let collections = app.directory().collections().await;
    let value = match kind {
        EntityKind::Funcionario => {
            serde_json::to_value(collections.funcionarios.iter().find(|r| r.id == id)?)
        }
        EntityKind::Departamento => {
            serde_json::to_value(collections.departamentos.iter().find(|r| r.id == id)?)
        }
        EntityKind::Funcao => {
            serde_json::to_value(collections.funcoes.iter().find(|r| r.id == id)?)
        }
        EntityKind::Unidade => {
            serde_json::to_value(collections.unidades.iter().find(|r| r.id == id)?)
        }
    };
    match value.ok()? {
        Value::Object(map) => Some(map),
        _ => None,
    }
}

fn role(user: &UserInfo) -> &'static str {
    if user.is_admin {
        "administrador"
    } else if user.can_edit {
        "editor"
    } else {
        "leitura"
    }
}

fn employee_line(f: &Funcionario) -> String {
    let departamento = f.departamento_nome.as_deref().unwrap_or("-");
    format!(
        "{:>5}  {:<30} {:<8} {:<32} {} [{}]",
        f.id,
        f.nome,
        f.ramal.as_deref().unwrap_or("-"),
        f.email.as_deref().unwrap_or("-"),
        departamento,
        f.badge().as_str(),
    )
}

fn named_line(id: i64, nome: &str, count: Option<u32>) -> String {
    match count {
        Some(count) => format!("{:>5}  {} ({} funcionários)", id, nome, count),
        None => format!("{:>5}  {}", id, nome),
    }
}

fn contact_lines(f: &Funcionario) -> Vec<String> {
    let mut lines = Vec::new();
    if let Some(uri) = f.ramal.as_deref().and_then(dial_uri) {
        lines.push(format!("Ramal:    {}", uri));
    }
    if let Some(uri) = f.email.as_deref().and_then(|e| mailto_uri(e, None, None)) {
        lines.push(format!("E-mail:   {}", uri));
    }
    let handle = f.teams.as_deref().or(f.email.as_deref());
    if let Some(links) = handle.and_then(teams_chat_links) {
        lines.push(format!("Teams:    {}", links.app));
        lines.push(format!("          {}", links.web));
    }
    if let Some(link) = f.whatsapp.as_deref().and_then(whatsapp_link) {
        lines.push(format!("WhatsApp: {}", link));
    }
    lines
}
