//! ramais - terminal front-end for the Sistema de Ramais directory
//!
//! Restores (or opens) a cookie session, loads the directory and runs one
//! command against it.

mod commands;
mod logger;

use clap::{Parser, Subcommand};
use ramais_client::{ClientConfig, RamaisApp, SessionState};

#[derive(Parser)]
#[command(name = "ramais")]
#[command(version)]
#[command(about = "Employee extension directory client")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// API base URL
    #[arg(long, global = true, env = "RAMAIS_API_BASE")]
    api_base: Option<String>,

    /// Username used when no session can be restored
    #[arg(long, short, global = true, env = "RAMAIS_USER")]
    user: Option<String>,

    /// Password for --user
    #[arg(long, short, global = true, env = "RAMAIS_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Print records as JSON
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List one collection (employees by default)
    List {
        /// funcionarios, departamentos, funcoes or unidades
        #[arg(default_value = "funcionarios")]
        kind: String,
    },

    /// Search employees by free text and filters
    Search {
        /// Matches name, extension, e-mail, WhatsApp and labels
        #[arg(default_value = "")]
        term: String,

        #[arg(long)]
        departamento: Option<i64>,

        #[arg(long)]
        funcao: Option<i64>,

        #[arg(long)]
        unidade: Option<i64>,
    },

    /// Create a record from key=value fields
    Create {
        kind: String,

        /// e.g. -f nome="Ana Souza" -f ramal=2040 -f departamento_id=1
        #[arg(short, long = "field", value_parser = commands::parse_field)]
        fields: Vec<(String, String)>,
    },

    /// Update a record, keeping fields that are not given
    Update {
        kind: String,
        id: i64,

        #[arg(short, long = "field", value_parser = commands::parse_field)]
        fields: Vec<(String, String)>,
    },

    /// Delete a record after confirmation
    Delete {
        kind: String,
        id: i64,

        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },

    /// Show dial, e-mail, Teams and WhatsApp links for an employee
    Contact { id: i64 },

    /// Show the current user
    Whoami,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    logger::init_logger(logger::json_from_env());

    let mut config = ClientConfig::from_env();
    if let Some(base) = cli.api_base.clone() {
        config = config.with_base_url(base);
    }
    tracing::debug!(base_url = %config.base_url, "Starting ramais");

    let app = RamaisApp::new(config)?;
    if !matches!(app.start().await, SessionState::Authenticated(_)) {
        commands::login(&app, cli.user.as_deref(), cli.password.as_deref()).await?;
    }

    match cli.command {
        Commands::List { kind } => commands::list(&app, &kind, cli.json).await,
        Commands::Search {
            term,
            departamento,
            funcao,
            unidade,
        } => commands::search(&app, term, departamento, funcao, unidade, cli.json).await,
        Commands::Create { kind, fields } => commands::create(&app, &kind, fields).await,
        Commands::Update { kind, id, fields } => commands::update(&app, &kind, id, fields).await,
        Commands::Delete { kind, id, yes } => commands::delete(&app, &kind, id, yes).await,
        Commands::Contact { id } => commands::contact(&app, id).await,
        Commands::Whoami => commands::whoami(&app, cli.json).await,
    }
}
