use anyhow::{Context, Result};
use clap::{ArgGroup, Args, Parser, Subcommand};
use review_assistant::api::client::HttpReviewClient;
use review_assistant::api::contact::{ContactSender, DisabledContactSender, EmailJsSender};
use review_assistant::app::editor;
use review_assistant::app::{self, AppConfig};
use review_assistant::config;
use review_assistant::domain::Language;
use review_assistant::storage::{FileStorage, NAME_KEY, Session, Storage, TOKEN_KEY, USER_ID_KEY};
use review_assistant::telemetry;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Terminal client for submitting code to an AI review service.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Review service base URL. Overrides `api.base_url` from the config file.
    #[arg(long, value_name = "URL")]
    api_url: Option<String>,

    /// Preload the code buffer from a file.
    #[arg(long, value_name = "PATH")]
    file: Option<PathBuf>,

    /// Initial language (java, javascript, python, cpp). Inferred from `--file` when omitted.
    #[arg(long, value_name = "LANG")]
    language: Option<Language>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Inspect or edit review-assistant configuration.
    Config(ConfigCommand),
    /// Inspect, store, or clear the signed-in session.
    Session(SessionCommand),
}

#[derive(Debug, Args)]
#[command(group(
    ArgGroup::new("config_action")
        .required(true)
        .multiple(false)
        .args(["edit", "path"])
))]
struct ConfigCommand {
    /// Open the config file in $VISUAL/$EDITOR/nvim/vim/vi.
    #[arg(long)]
    edit: bool,

    /// Print the config file path.
    #[arg(long)]
    path: bool,
}

#[derive(Debug, Args)]
#[command(group(
    ArgGroup::new("session_action")
        .required(true)
        .multiple(false)
        .args(["path", "status", "clear", "token"])
))]
struct SessionCommand {
    /// Print the session file path.
    #[arg(long)]
    path: bool,

    /// Show who is signed in.
    #[arg(long)]
    status: bool,

    /// Remove the stored token, user id, and name.
    #[arg(long)]
    clear: bool,

    /// Store an auth token issued by the review service.
    #[arg(long, requires = "user_id")]
    token: Option<String>,

    /// User id that owns the token.
    #[arg(long, requires = "token")]
    user_id: Option<String>,

    /// Display name used in the greeting.
    #[arg(long, requires = "token")]
    name: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Command::Config(command)) => return handle_config_command(command),
        Some(Command::Session(command)) => return handle_session_command(command),
        None => {}
    }

    let log_path = config::log_path()?;
    if let Err(error) = telemetry::init_tracing(&log_path) {
        eprintln!("warning: logging disabled: {error:#}");
    }

    let config = config::load_or_create()?;
    let storage: Arc<dyn Storage> = Arc::new(open_session_storage()?);

    let initial_code = cli.file.as_deref().map(read_code_file).transpose()?;
    let language = cli
        .language
        .or_else(|| cli.file.as_deref().and_then(language_for_path));

    let base_url = cli.api_url.unwrap_or(config.api_base_url);
    let api = HttpReviewClient::new(&base_url, config.request_timeout)
        .context("failed to create review API client")?;
    tracing::info!(url = api.submit_url(), "review service configured");

    let contact: Arc<dyn ContactSender> = match config.contact {
        Some(settings) => Arc::new(
            EmailJsSender::new(settings, config.request_timeout)
                .context("failed to create contact client")?,
        ),
        None => {
            tracing::info!("contact form has no email credentials; sending is disabled");
            Arc::new(DisabledContactSender)
        }
    };

    app::run(
        AppConfig {
            default_theme: config.default_theme.resolve(),
            feedback_focus_delay: config.feedback_focus_delay,
            notification_duration: config.notification_duration,
            initial_code,
            language,
        },
        storage,
        Arc::new(api),
        contact,
    )
    .await
}

fn handle_config_command(command: ConfigCommand) -> Result<()> {
    let path = config::ensure_config_file()?;

    if command.path {
        println!("{}", path.display());
        return Ok(());
    }

    if command.edit {
        editor::edit_file_with_system_editor(path.as_path())?;
        return Ok(());
    }

    Ok(())
}

fn handle_session_command(command: SessionCommand) -> Result<()> {
    if command.path {
        println!("{}", config::session_path()?.display());
        return Ok(());
    }

    let storage = open_session_storage()?;

    if command.status {
        let session = Session::load(&storage).context("failed to read session")?;
        if session.is_signed_in() {
            println!(
                "Signed in as {} (user id: {})",
                session.display_name(),
                session.credentials.user_id.as_deref().unwrap_or("missing")
            );
        } else {
            println!("Not signed in.");
        }
        return Ok(());
    }

    if command.clear {
        for key in [TOKEN_KEY, USER_ID_KEY, NAME_KEY] {
            storage
                .remove(key)
                .with_context(|| format!("failed to remove `{key}` from session"))?;
        }
        println!("Session cleared.");
        return Ok(());
    }

    if let (Some(token), Some(user_id)) = (command.token, command.user_id) {
        storage
            .set(TOKEN_KEY, token.trim())
            .context("failed to store token")?;
        storage
            .set(USER_ID_KEY, user_id.trim())
            .context("failed to store user id")?;
        if let Some(name) = command.name {
            storage
                .set(NAME_KEY, name.trim())
                .context("failed to store name")?;
        }
        println!("Session saved to {}.", storage.path().display());
    }

    Ok(())
}

fn open_session_storage() -> Result<FileStorage> {
    let path = config::session_path()?;
    FileStorage::open(&path)
        .with_context(|| format!("failed to open session file {}", path.display()))
}

fn read_code_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn language_for_path(path: &Path) -> Option<Language> {
    let extension = path.extension()?.to_str()?.to_ascii_lowercase();
    match extension.as_str() {
        "cc" | "cxx" | "hpp" | "h" => Some(Language::Cpp),
        "mjs" | "cjs" | "jsx" => Some(Language::JavaScript),
        other => Language::ALL
            .into_iter()
            .find(|language| language.extension() == other),
    }
}
