use std::fmt;
use std::sync::Arc;

use dioxus::LaunchBuilder;
use dioxus::desktop::{Config as DesktopConfig, WindowBuilder};
use course_core::model::SectionItemId;
use services::{ConfigError, CourseConfig, CourseSession, Fetcher, FragmentState, Section};
use storage::{ProgressStore, Storage};
use tracing_subscriber::EnvFilter;
use ui::{App, UiApp, build_app_context};

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidDbUrl { raw: String },
    InvalidContent { raw: String, source: ConfigError },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidContent { raw, source } => {
                write!(f, "invalid --content value {raw}: {source}")
            }
        }
    }
}

impl std::error::Error for ArgsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ArgsError::InvalidContent { source, .. } => Some(source),
            _ => None,
        }
    }
}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

struct DesktopApp {
    config: CourseConfig,
    fetcher: Arc<dyn Fetcher>,
    store: Arc<dyn ProgressStore>,
}

impl UiApp for DesktopApp {
    fn course_config(&self) -> CourseConfig {
        self.config.clone()
    }

    fn fetcher(&self) -> Arc<dyn Fetcher> {
        Arc::clone(&self.fetcher)
    }

    fn progress_store(&self) -> Arc<dyn ProgressStore> {
        Arc::clone(&self.store)
    }
}

struct Args {
    db_url: String,
    course: CourseConfig,
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- ui     [--content <dir|url>] [--document <name>] [--key <key>] [--db <sqlite_url>]");
    eprintln!("  cargo run -p app -- status [--content <dir|url>] [--document <name>] [--key <key>] [--db <sqlite_url>]");
    eprintln!("  cargo run -p app -- check  [--content <dir|url>] [--document <name>]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --content .   --document data.json   --key course-progress   --db sqlite:course.sqlite3");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  COURSE_CONTENT, COURSE_DOCUMENT, COURSE_PROGRESS_KEY, COURSE_HTTP_TIMEOUT_SECS,");
    eprintln!("  COURSE_DB_URL, RUST_LOG");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Ui,
    Status,
    Check,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "ui" => Some(Self::Ui),
            "status" => Some(Self::Status),
            "check" => Some(Self::Check),
            _ => None,
        }
    }
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, Box<dyn std::error::Error>> {
        let mut db_url = std::env::var("COURSE_DB_URL")
            .ok()
            .map_or_else(|| normalize_sqlite_url("sqlite:course.sqlite3".into()), normalize_sqlite_url);
        let mut course = CourseConfig::from_env()?;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value }.into());
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--content" => {
                    let value = require_value(args, "--content")?;
                    course = apply_content_arg(course, value)?;
                }
                "--document" => {
                    let value = require_value(args, "--document")?;
                    course = course.with_document(value);
                }
                "--key" => {
                    let value = require_value(args, "--key")?;
                    course = course.with_progress_key(value);
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg).into()),
            }
        }

        Ok(Self { db_url, course })
    }
}

fn apply_content_arg(course: CourseConfig, value: String) -> Result<CourseConfig, ArgsError> {
    course
        .with_content_arg(&value)
        .map_err(|source| ArgsError::InvalidContent { raw: value, source })
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

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let mut argv: Vec<String> = std::env::args().skip(1).collect();

    // No subcommand launches the UI.
    let cmd = match argv.first().map(String::as_str) {
        None => Command::Ui,
        Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) if first.starts_with("--") => Command::Ui,
        Some(first) => Command::from_arg(first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };

    if !argv.is_empty() && !argv[0].starts_with("--") {
        argv.remove(0);
    }

    let mut iter = argv.into_iter();
    let parsed = Args::parse(&mut iter).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    tracing::info!(
        command = ?cmd,
        content = ?parsed.course.content,
        document = %parsed.course.document,
        "starting"
    );
    let fetcher = parsed.course.build_fetcher()?;

    // `check` never writes progress, so it does not need the database.
    let storage = match cmd {
        Command::Check => Storage::in_memory(),
        Command::Ui | Command::Status => {
            prepare_sqlite_file(&parsed.db_url)?;
            Storage::sqlite(&parsed.db_url).await?
        }
    };

    match cmd {
        Command::Ui => {
            let app: Arc<dyn UiApp> = Arc::new(DesktopApp {
                config: parsed.course,
                fetcher,
                store: storage.progress,
            });
            let context = build_app_context(&app);

            let desktop_cfg = DesktopConfig::new().with_window(
                WindowBuilder::new()
                    .with_title("Course")
                    .with_always_on_top(false),
            );

            LaunchBuilder::desktop()
                .with_cfg(desktop_cfg)
                .with_context(context)
                .launch(App);
            Ok(())
        }
        Command::Status => status(fetcher, storage.progress, &parsed.course).await,
        Command::Check => check(fetcher, storage.progress, &parsed.course).await,
    }
}

/// Print stored progress without touching it.
///
/// Starting a session shows the first flashcard, which marks it visited, so
/// the count is taken from a session backed by a copy of the stored blob.
async fn status(
    fetcher: Arc<dyn Fetcher>,
    store: Arc<dyn ProgressStore>,
    config: &CourseConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let snapshot = Storage::in_memory();
    if let Some(raw) = store.get(&config.progress_key).await? {
        snapshot.progress.set(&config.progress_key, &raw).await?;
    }
    let session = CourseSession::start(fetcher, Arc::clone(&snapshot.progress), config).await?;
    let state = session.tracker().state();
    let content = session.content();
    let progress = session.tracker().compute_progress();

    println!("{} milestones completed ({}%)", progress.ratio_label(), progress.percent);
    println!(
        "  lectures   {} / {}",
        state.completed_lectures().len(),
        content.lectures().len()
    );
    println!(
        "  activities {} / {}",
        state.completed_activities().len(),
        content.activities().len()
    );
    println!(
        "  flashcards {} / {}",
        state.visited_flashcards().len(),
        content.flashcards().len()
    );
    println!(
        "  quiz       {} / {}",
        state.correct_questions().len(),
        content.quiz().len()
    );
    Ok(())
}

/// Fetch every section body and report the ones that fail.
async fn check(
    fetcher: Arc<dyn Fetcher>,
    store: Arc<dyn ProgressStore>,
    config: &CourseConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = CourseSession::start(fetcher, store, config).await?;
    session.prefetch_fragments().await;

    let mut failures = report_failures(session.lectures().sections());
    failures += report_failures(session.activities().sections());

    if failures > 0 {
        return Err(format!("{failures} section(s) failed to load").into());
    }
    println!(
        "all {} sections loaded",
        session.lectures().sections().len() + session.activities().sections().len()
    );
    Ok(())
}

fn report_failures<I: SectionItemId>(sections: &[Section<I>]) -> usize {
    let mut failures = 0;
    for section in sections {
        if let FragmentState::Failed(message) = section.fragment() {
            failures += 1;
            println!(
                "{} {} ({}): {message}",
                I::KIND,
                section.id(),
                section.content_ref()
            );
        }
    }
    failures
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

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        tracing::error!(error = %err, "course app failed");
        eprintln!("{err}");
        std::process::exit(2);
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error as _;
    use std::path::PathBuf;

    use services::ContentLocation;

    use super::*;

    fn base() -> CourseConfig {
        CourseConfig::new(ContentLocation::Directory(PathBuf::from(".")))
    }

    #[test]
    fn invalid_content_keeps_the_parse_error() {
        let err = apply_content_arg(base(), "https://[broken".to_string()).unwrap_err();
        assert!(matches!(
            err,
            ArgsError::InvalidContent {
                source: ConfigError::InvalidUrl { .. },
                ..
            }
        ));
        assert!(err.source().is_some());
        assert!(err.to_string().starts_with("invalid --content value https://[broken: "));
    }

    #[test]
    fn content_arg_splits_document_path() {
        let course = apply_content_arg(base(), "course/data-2.json".to_string()).unwrap();
        assert_eq!(course.content, ContentLocation::Directory(PathBuf::from("course")));
        assert_eq!(course.document, "data-2.json");
    }
}
