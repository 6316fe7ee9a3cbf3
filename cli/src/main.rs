mod output;

use std::{process::ExitCode, sync::Arc};

use api::{
    Config, HttpMethod, KeyValues, MemoryStore, Orchestrator, OrchestratorError, PulseApi,
    RequestDraft,
};
use clap::{Args, Parser, Subcommand};
use log::debug;
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(name = "pulse", version, about = "Send HTTP requests, keep a history, ask an AI to review them")]
struct Cli {
    /// SQLite file holding history and the stored AI key
    #[arg(long, env = "PULSE_DB", default_value = "pulse.sqlite")]
    db: String,

    /// Keep everything in memory for this run only
    #[arg(long)]
    ephemeral: bool,

    /// Model used for analysis
    #[arg(long, env = "PULSE_MODEL", default_value = api::analysis::DEFAULT_MODEL)]
    model: String,

    #[arg(long, env = "PULSE_AI_BASE_URL", default_value = api::analysis::DEFAULT_AI_BASE_URL)]
    ai_base_url: String,

    /// AI key for this run; not written to the database
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Execute a request and show the response
    Send(SendArgs),
    /// List past requests
    History {
        /// Case-insensitive match against url or method
        #[arg(long)]
        filter: Option<String>,
        #[command(subcommand)]
        action: Option<HistoryAction>,
    },
    /// Manage the stored AI key
    Key {
        #[command(subcommand)]
        action: KeyAction,
    },
}

#[derive(Args, Debug)]
struct SendArgs {
    method: String,
    url: String,
    /// Header as `key:value`, repeatable
    #[arg(short = 'H', long = "header")]
    headers: Vec<String>,
    /// Query parameter as `key=value`, repeatable
    #[arg(short = 'q', long = "param")]
    params: Vec<String>,
    /// Request body
    #[arg(short = 'd', long = "data", default_value = "")]
    body: String,
    /// Ask for an AI review of the result
    #[arg(long)]
    analyze: bool,
}

#[derive(Subcommand, Debug)]
enum HistoryAction {
    /// Show one entry as a result
    Show {
        id: Uuid,
        #[arg(long)]
        analyze: bool,
    },
    /// Remove every entry
    Clear,
}

#[derive(Subcommand, Debug)]
enum KeyAction {
    Set { key: String },
    Status,
}

fn split_rows(rows: &[String], separator: char) -> KeyValues {
    rows.iter()
        .map(|row| match row.split_once(separator) {
            Some((key, value)) => (key.trim().to_string(), value.trim().to_string()),
            None => (row.trim().to_string(), String::new()),
        })
        .collect()
}

async fn open(cli: &Cli) -> anyhow::Result<Orchestrator> {
    let config = Config {
        db_path: cli.db.clone(),
        default_method: HttpMethod::GET,
        model: cli.model.clone(),
        ai_base_url: cli.ai_base_url.clone(),
        ..Config::default()
    };
    debug!("{:?}", config);
    let app = if cli.ephemeral {
        PulseApi::with_persistence(&config, Arc::new(MemoryStore::new())).await
    } else {
        PulseApi::open(&config).await?
    };
    if let Some(key) = &cli.api_key {
        app.credentials().set_transient(key.clone()).await;
    }
    Ok(app)
}

async fn analyze(app: &Orchestrator) -> anyhow::Result<()> {
    match app.analyze().await {
        Ok(suggestion) => {
            output::print_suggestion(&suggestion);
            Ok(())
        }
        Err(OrchestratorError::MissingCredential(_)) => {
            eprintln!("No AI key configured. Run `pulse key set <KEY>` or set GEMINI_API_KEY.");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let app = open(&cli).await?;
    match cli.command {
        Command::Send(args) => {
            let mut draft: RequestDraft = app.start().await?;
            draft.method = args.method;
            draft.url = args.url;
            draft.headers = split_rows(&args.headers, ':');
            draft.params = split_rows(&args.params, '=');
            draft.body = args.body;
            let response = app.submit(draft).await?;
            if let Some(request) = app.current().await.request {
                output::print_request(&request);
            }
            output::print_response(&response);
            if args.analyze {
                analyze(&app).await?;
            }
        }
        Command::History { filter, action } => match action {
            None => {
                let view = app.open_history(filter.as_deref()).await?;
                output::print_history(&view);
            }
            Some(HistoryAction::Show { id, analyze: wants_analysis }) => {
                app.open_history(None).await?;
                let (request, response) = app.select_history(id).await?;
                output::print_request(&request);
                output::print_response(&response);
                if wants_analysis {
                    analyze(&app).await?;
                }
            }
            Some(HistoryAction::Clear) => {
                app.open_history(None).await?;
                let removed = app.history().len().await;
                app.clear_history().await?;
                println!("Removed {} history entries.", removed);
            }
        },
        Command::Key { action } => match action {
            KeyAction::Set { key } => {
                app.provide_credential(key).await?;
                println!("AI key saved.");
            }
            KeyAction::Status => {
                if app.has_credential().await {
                    println!("AI key configured.");
                } else {
                    println!("No AI key configured.");
                }
            }
        },
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
