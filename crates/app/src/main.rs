mod logging;

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use dioxus::LaunchBuilder;
use dioxus::desktop::{Config as DesktopConfig, WindowBuilder};
use services::{
    CatalogSource, Clock, DEFAULT_CATALOG_FILE, ExamLoopService, resolve_catalog_url,
};
use storage::repository::Storage;
use ui::{App, UiApp, build_app_context};
use url::Url;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidCatalog { raw: String },
    InvalidPage { raw: String },
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidCatalog { raw } => write!(f, "invalid --catalog value: {raw}"),
            ArgsError::InvalidPage { raw } => write!(f, "invalid --page value: {raw}"),
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

struct DesktopApp {
    exam_loop: Arc<ExamLoopService>,
    catalog: CatalogSource,
    export_dir: PathBuf,
}

impl UiApp for DesktopApp {
    fn exam_loop(&self) -> Arc<ExamLoopService> {
        Arc::clone(&self.exam_loop)
    }

    fn catalog_source(&self) -> CatalogSource {
        self.catalog.clone()
    }

    fn export_dir(&self) -> PathBuf {
        self.export_dir.clone()
    }
}

#[derive(Debug)]
enum Parsed {
    Run(Args),
    Help,
}

#[derive(Debug)]
struct Args {
    catalog: CatalogSource,
    db_url: String,
    export_dir: PathBuf,
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!(
        "  cargo run -p app -- [--catalog <path|url>] [--page <url>] [--db <sqlite_url>] [--export-dir <dir>]"
    );
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --catalog {DEFAULT_CATALOG_FILE}");
    eprintln!("  --db sqlite://exam.sqlite3");
    eprintln!("  --export-dir .");
    eprintln!();
    eprintln!("--page loads {DEFAULT_CATALOG_FILE} from the same folder as the given page URL.");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  EXAM_CATALOG, EXAM_DB_URL, EXAM_EXPORT_DIR, EXAM_LOG (or RUST_LOG)");
}

fn parse_catalog(raw: String) -> Result<CatalogSource, ArgsError> {
    if raw.trim().is_empty() {
        return Err(ArgsError::InvalidCatalog { raw });
    }
    CatalogSource::parse(&raw).map_err(|_| ArgsError::InvalidCatalog { raw })
}

fn parse_page(raw: String) -> Result<CatalogSource, ArgsError> {
    let page = Url::parse(raw.trim()).map_err(|_| ArgsError::InvalidPage { raw: raw.clone() })?;
    let url = resolve_catalog_url(&page, DEFAULT_CATALOG_FILE)
        .map_err(|_| ArgsError::InvalidPage { raw })?;
    Ok(CatalogSource::Url(url))
}

impl Args {
    fn parse(
        args: &mut impl Iterator<Item = String>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Parsed, ArgsError> {
        let mut catalog = match env("EXAM_CATALOG") {
            Some(raw) => parse_catalog(raw)?,
            None => CatalogSource::File(PathBuf::from(DEFAULT_CATALOG_FILE)),
        };
        let mut db_url = env("EXAM_DB_URL")
            .map_or_else(|| "sqlite://exam.sqlite3".into(), normalize_sqlite_url);
        let mut export_dir = env("EXAM_EXPORT_DIR").map_or_else(|| PathBuf::from("."), PathBuf::from);

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--catalog" => {
                    catalog = parse_catalog(require_value(args, "--catalog")?)?;
                }
                "--page" => {
                    catalog = parse_page(require_value(args, "--page")?)?;
                }
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--export-dir" => {
                    export_dir = PathBuf::from(require_value(args, "--export-dir")?);
                }
                "--help" | "-h" => return Ok(Parsed::Help),
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Parsed::Run(Self {
            catalog,
            db_url,
            export_dir,
        }))
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
            .unwrap_or_else(|_| PathBuf::from("."))
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

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv = std::env::args().skip(1);
    let parsed = match Args::parse(&mut argv, |key| std::env::var(key).ok()) {
        Ok(Parsed::Run(args)) => args,
        Ok(Parsed::Help) => {
            print_usage();
            return Ok(());
        }
        Err(err) => {
            eprintln!("{err}");
            print_usage();
            return Err(err.into());
        }
    };

    logging::init_logging();
    tracing::info!(
        catalog = %parsed.catalog,
        db = %parsed.db_url,
        export_dir = %parsed.export_dir.display(),
        "starting exam"
    );

    // Open + migrate SQLite at startup so services only see the repository trait.
    prepare_sqlite_file(&parsed.db_url)?;
    let storage = Storage::sqlite(&parsed.db_url).await?;

    let exam_loop = Arc::new(ExamLoopService::new(
        Clock::default(),
        Arc::clone(&storage.progress),
    ));
    let app: Arc<dyn UiApp> = Arc::new(DesktopApp {
        exam_loop,
        catalog: parsed.catalog,
        export_dir: parsed.export_dir,
    });
    let context = build_app_context(&app);

    // Some dev setups default to an always-on-top window.
    let desktop_cfg = DesktopConfig::new().with_window(
        WindowBuilder::new()
            .with_title("Exam")
            .with_always_on_top(false),
    );

    LaunchBuilder::desktop()
        .with_cfg(desktop_cfg)
        .with_context(context)
        .launch(App);
    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        tracing::error!(error = %err, "exam exited with an error");
        eprintln!("{err}");
        std::process::exit(2);
    }
}
