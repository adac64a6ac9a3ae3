use std::fmt;
use std::sync::Arc;

use services::{AppServices, HttpCoachClient, LearningPathApi, LineInput, drive};
use tokio::io::BufReader;
use tutor_core::model::PathId;

mod narrator;
mod render;

use narrator::CommandNarrator;
use render::render_frame;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    MissingPath,
    InvalidPathId { raw: String },
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::MissingPath => write!(f, "no learning path given (use --path or TUTOR_PATH_ID)"),
            ArgsError::InvalidPathId { raw } => write!(f, "invalid --path value: {raw:?}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  tutor chat  --path <learning_path_id> [--db <sqlite_url>] [--say-cmd <command>]");
    eprintln!("  tutor paths");
    eprintln!();
    eprintln!("In a chat, type an answer and press enter. Commands:");
    eprintln!("  :next / :n   next question");
    eprintln!("  :prev / :p   previous question");
    eprintln!("  :quit / :q   leave the session");
    eprintln!();
    eprintln!("Defaults for chat:");
    eprintln!("  --db sqlite://tutor.sqlite3");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  TUTOR_DB_URL, TUTOR_PATH_ID, TUTOR_SAY_CMD");
    eprintln!("  TUTOR_BASE_URL, TUTOR_MAX_WINDOW, TUTOR_PROGRESS_POLICY, TUTOR_TOTAL_QUESTIONS,");
    eprintln!("  TUTOR_COUNT_SIMULATED, TUTOR_FALLBACK_SCORE, TUTOR_SEED_TURNS");
    eprintln!("  RUST_LOG (default info, logs go to stderr)");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Chat,
    Paths,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "chat" => Some(Self::Chat),
            "paths" => Some(Self::Paths),
            _ => None,
        }
    }
}

#[derive(Debug)]
struct ChatArgs {
    db_url: String,
    path_id: PathId,
    say_cmd: Option<String>,
}

impl ChatArgs {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut db_url = std::env::var("TUTOR_DB_URL")
            .ok()
            .map_or_else(|| "sqlite://tutor.sqlite3".into(), normalize_sqlite_url);
        let mut path_id = std::env::var("TUTOR_PATH_ID").ok();
        let mut say_cmd = std::env::var("TUTOR_SAY_CMD").ok();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--path" => path_id = Some(require_value(args, "--path")?),
                "--say-cmd" => say_cmd = Some(require_value(args, "--say-cmd")?),
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        let raw = path_id.ok_or(ArgsError::MissingPath)?;
        let path_id = raw
            .parse::<PathId>()
            .map_err(|_| ArgsError::InvalidPathId { raw: raw.clone() })?;

        Ok(Self {
            db_url,
            path_id,
            say_cmd: say_cmd.filter(|cmd| !cmd.trim().is_empty()),
        })
    }
}

fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| std::path::PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

async fn list_paths() -> Result<(), Box<dyn std::error::Error>> {
    let settings = services::config::settings_from_env()?;
    let client = HttpCoachClient::new(settings.base_url().as_str());
    let paths = client.list_paths().await?;
    if paths.is_empty() {
        println!("no learning paths available");
    }
    for path in paths {
        match path.description.as_deref().map(str::trim) {
            Some(description) if !description.is_empty() => {
                println!("{}\t{}\t{description}", path.id, path.title);
            }
            _ => println!("{}\t{}", path.id, path.title),
        }
    }
    Ok(())
}

async fn chat(args: ChatArgs) -> Result<(), Box<dyn std::error::Error>> {
    // Open + migrate SQLite at startup. Keep this in the binary glue so core/services stay pure.
    prepare_sqlite_file(&args.db_url)?;
    let mut app = AppServices::from_env(&args.db_url).await?;
    if let Some(narrator) = args.say_cmd.as_deref().and_then(CommandNarrator::parse) {
        app = app.with_narrator(Arc::new(narrator));
    }

    let session = app.session_loop().open(&args.path_id).await?;
    tracing::info!(path = %args.path_id, title = %session.learning_path().title, "session opened");

    let mut input = LineInput::new(BufReader::new(tokio::io::stdin()));
    let mut stdout = std::io::stdout();
    drive(&session, &mut input, |view, outcome| {
        if let Err(err) = render_frame(&mut stdout, view, outcome) {
            tracing::warn!(error = %err, "failed to write to stdout");
        }
    })
    .await?;
    Ok(())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv: Vec<String> = std::env::args().skip(1).collect();

    // Default behavior: chatting when no subcommand is provided.
    let cmd = match argv.first().map(String::as_str) {
        None => Command::Chat,
        Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) if first.starts_with("--") => Command::Chat,
        Some(first) => Command::from_arg(first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };

    if !argv.is_empty() && !argv[0].starts_with("--") {
        argv.remove(0);
    }

    init_logging();

    match cmd {
        Command::Paths => {
            if let Some(extra) = argv.into_iter().next() {
                print_usage();
                return Err(ArgsError::UnknownArg(extra).into());
            }
            list_paths().await
        }
        Command::Chat => {
            let mut iter = argv.into_iter();
            let parsed = ChatArgs::parse(&mut iter).map_err(|e| {
                eprintln!("{e}");
                print_usage();
                e
            })?;
            chat(parsed).await
        }
    }
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<ChatArgs, ArgsError> {
        let mut iter = args.iter().map(|s| (*s).to_string());
        ChatArgs::parse(&mut iter)
    }

    #[test]
    fn chat_args_take_flags() {
        let args = parse(&["--path", "sd", "--db", "sqlite::memory:", "--say-cmd", "say"]).unwrap();
        assert_eq!(args.path_id.as_str(), "sd");
        assert_eq!(args.db_url, "sqlite::memory:");
        assert_eq!(args.say_cmd.as_deref(), Some("say"));
    }

    #[test]
    fn chat_args_reject_unknown_and_missing_values() {
        assert!(matches!(
            parse(&["--path"]),
            Err(ArgsError::MissingValue { flag: "--path" })
        ));
        assert!(matches!(
            parse(&["--path", "sd", "--verbose"]),
            Err(ArgsError::UnknownArg(arg)) if arg == "--verbose"
        ));
    }

    #[test]
    fn relative_db_paths_become_absolute_urls() {
        let url = normalize_sqlite_url("sqlite:data/tutor.sqlite3".into());
        assert!(url.starts_with("sqlite:///"));
        assert!(url.ends_with("data/tutor.sqlite3"));
        assert_eq!(
            normalize_sqlite_url("sqlite::memory:".into()),
            "sqlite::memory:"
        );
    }
}
