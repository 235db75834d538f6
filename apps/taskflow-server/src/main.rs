use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use runtime::{AppConfig, AppConfigProvider, CliArgs, ConfigProvider, DatabaseConfig};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection};
use std::net::{SocketAddr, ToSocketAddrs};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

use modkit::{ModuleEntry, ModuleRegistry, RunOptions, ShutdownOptions};

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const MEMORY_DSN: &str = "sqlite::memory:";

// Adapter to make AppConfigProvider implement modkit::ConfigProvider
struct ModkitConfigAdapter(Arc<AppConfigProvider>);

impl modkit::ConfigProvider for ModkitConfigAdapter {
    fn get_module_config(&self, module_name: &str) -> Option<&serde_json::Value> {
        self.0.get_module_config(module_name)
    }
}

/// Expand a sqlite DSN into an absolute-path DSN using a base directory.
/// - Keeps "sqlite::memory:" as-is.
/// - Adds `mode=rwc` when no query is given so the file is created.
/// - Normalizes backslashes into forward slashes (important on Windows).
fn absolutize_sqlite_dsn(dsn: &str, base_dir: &Path, create_dirs: bool) -> Result<String> {
    if dsn.eq_ignore_ascii_case(MEMORY_DSN) || dsn.eq_ignore_ascii_case("sqlite://:memory:") {
        return Ok(MEMORY_DSN.to_string());
    }
    let db_path = dsn
        .strip_prefix("sqlite://")
        .ok_or_else(|| anyhow!("DSN must start with sqlite:// (got: {})", dsn))?;

    let (path_str, query) = match db_path.split_once('?') {
        Some((p, q)) => (p, q),
        None => (db_path, "mode=rwc"),
    };

    let mut p = PathBuf::from(path_str);
    if p.as_os_str().is_empty() {
        return Err(anyhow!("Empty SQLite path in DSN"));
    }
    if p.is_relative() {
        p = base_dir.join(p);
    }

    if let Some(dir) = p.parent() {
        if create_dirs {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("cannot create database dir {}", dir.display()))?;
        }
    }

    let mut out = String::from("sqlite://");
    out.push_str(&p.to_string_lossy().replace('\\', "/"));
    if !query.is_empty() {
        out.push('?');
        out.push_str(query);
    }
    Ok(out)
}

/// Detect DB backend from URL scheme.
fn detect_from_dsn(cfg: &DatabaseConfig) -> Result<&'static str> {
    let raw = cfg.url.trim();
    if raw.is_empty() {
        return Err(anyhow!("Database URL not configured"));
    }
    if raw.eq_ignore_ascii_case(MEMORY_DSN) {
        return Ok("sqlite");
    }

    let url = Url::parse(raw).map_err(|e| anyhow!("Invalid database DSN '{}': {}", raw, e))?;
    match url.scheme() {
        "sqlite" | "sqlite3" => Ok("sqlite"),
        "postgres" | "postgresql" => Ok("postgres"),
        other => Err(anyhow!("Unsupported database type: {}", other)),
    }
}

fn bind_addr(config: &AppConfig) -> Result<SocketAddr> {
    let host = config.server.host.trim();
    (host, config.server.port)
        .to_socket_addrs()
        .with_context(|| format!("invalid bind address {}:{}", host, config.server.port))?
        .next()
        .ok_or_else(|| anyhow!("bind address {host} resolved to nothing"))
}

fn request_timeout(config: &AppConfig) -> Duration {
    match config.server.timeout_sec {
        0 => DEFAULT_REQUEST_TIMEOUT,
        secs => Duration::from_secs(secs),
    }
}

/// TaskFlow Server - personal task tracking API
#[derive(Parser)]
#[command(name = "taskflow-server")]
#[command(about = "TaskFlow Server - personal task tracking API")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port for HTTP server (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Print effective configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Use an in-memory SQLite database
    #[arg(long)]
    mock: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    Run,
    /// Check configuration
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let args = CliArgs {
        config: cli.config.as_ref().map(|p| p.to_string_lossy().to_string()),
        port: cli.port,
        print_config: cli.print_config,
        verbose: cli.verbose,
        mock: cli.mock,
    };

    // Load configuration (normalized home_dir is applied inside)
    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;
    config.apply_cli_overrides(&args);

    let logging_config = config.logging.clone().unwrap_or_default();
    runtime::logging::init_logging_from_config(&logging_config, Path::new(&config.server.home_dir));
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "TaskFlow Server starting");

    if cli.print_config {
        println!("{}", config.to_yaml()?);
        return Ok(());
    }

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_server(config, args).await,
        Commands::Check => check_config(config, args),
    }
}

async fn connect_db(db_config: &DatabaseConfig, args: &CliArgs, base_dir: &Path) -> Result<DatabaseConnection> {
    let dsn = if args.mock {
        MEMORY_DSN.to_string()
    } else {
        detect_from_dsn(db_config)?;
        let raw = db_config.url.trim();
        if raw.starts_with("sqlite") {
            absolutize_sqlite_dsn(raw, base_dir, true)?
        } else {
            raw.to_string()
        }
    };

    let mut opts = ConnectOptions::new(dsn.clone());
    opts.acquire_timeout(Duration::from_secs(5))
        .sqlx_logging(false);
    if dsn == MEMORY_DSN {
        // Every pooled connection would get its own empty in-memory database.
        opts.max_connections(1);
    } else if let Some(max) = db_config.max_conns {
        opts.max_connections(max);
    }
    if let Some(ms) = db_config.busy_timeout_ms {
        let busy = Duration::from_millis(u64::from(ms));
        opts.map_sqlx_sqlite_opts(move |o| o.busy_timeout(busy));
    }

    tracing::info!("Connecting to database: {}", dsn);
    let db = Database::connect(opts)
        .await
        .with_context(|| format!("failed to connect to {dsn}"))?;
    tracing::info!(backend = ?db.get_database_backend(), "Connected to database");
    Ok(db)
}

fn build_registry(config: &AppConfig) -> Result<ModuleRegistry> {
    let ingress = Arc::new(api_ingress::ApiIngress::new(
        bind_addr(config)?,
        request_timeout(config),
    ));
    let auth = Arc::new(auth::Auth::default());
    let tasks = Arc::new(tasks::Tasks::default());

    let registry = ModuleRegistry::builder()
        .register(
            ModuleEntry::new("api_ingress", ingress.clone())
                .rest_host(ingress.clone())
                .stateful(ingress),
        )
        .register(
            ModuleEntry::new(auth::module::MODULE_NAME, auth.clone())
                .db(auth.clone())
                .rest(auth),
        )
        .register(
            ModuleEntry::new(tasks::module::MODULE_NAME, tasks.clone())
                .deps(&[auth::module::MODULE_NAME])
                .db(tasks.clone())
                .rest(tasks),
        )
        .build()?;
    Ok(registry)
}

async fn run_server(config: AppConfig, args: CliArgs) -> Result<()> {
    tracing::info!("Initializing modules...");

    let base_dir = PathBuf::from(&config.server.home_dir);
    let db = match (&config.database, args.mock) {
        (Some(db_config), _) => Some(connect_db(db_config, &args, &base_dir).await?),
        (None, true) => {
            let mock = DatabaseConfig {
                url: MEMORY_DSN.to_string(),
                max_conns: None,
                busy_timeout_ms: None,
            };
            Some(connect_db(&mock, &args, &base_dir).await?)
        }
        (None, false) => {
            tracing::warn!("No database configuration found, running without database");
            None
        }
    };

    let registry = build_registry(&config)?;
    tracing::debug!(modules = ?registry.names(), "Module registry built");

    let config_provider = Arc::new(ModkitConfigAdapter(Arc::new(AppConfigProvider::new(config))));

    modkit::run(RunOptions {
        registry,
        modules_cfg: config_provider,
        db,
        shutdown: ShutdownOptions::Signals,
    })
    .await
}

/// Validates everything `run` would read without opening sockets or the database.
fn check_config(config: AppConfig, args: CliArgs) -> Result<()> {
    tracing::info!("Checking configuration...");

    if !args.mock {
        let db = config
            .database
            .as_ref()
            .ok_or_else(|| anyhow!("database section is missing (use --mock for in-memory)"))?;
        let backend = detect_from_dsn(db)?;
        tracing::info!(backend, "Database URL is valid");
    }

    bind_addr(&config)?;
    check_module_section::<api_ingress::ApiIngressConfig>(&config, "api_ingress")?;
    let auth_cfg: auth::config::AuthConfig = check_module_section(&config, auth::module::MODULE_NAME)?;
    auth::domain::service::ServiceConfig::new(&auth_cfg.email_pattern)?;
    let tasks_cfg: tasks::config::TasksConfig = check_module_section(&config, tasks::module::MODULE_NAME)?;
    tasks_cfg.validate()?;

    tracing::info!("Configuration is valid");
    println!("Configuration check passed");
    println!("{}", config.to_yaml()?);
    Ok(())
}

fn check_module_section<T>(config: &AppConfig, name: &str) -> Result<T>
where
    T: serde::de::DeserializeOwned + Default,
{
    match config.modules.get(name) {
        Some(raw) => serde_json::from_value(raw.clone())
            .with_context(|| format!("invalid config for module '{name}'")),
        None => Ok(T::default()),
    }
}
