use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::bail;
use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use tasktrack::auth::{ADMIN_GROUP, TokenGenerator, generate_password};
use tasktrack::config::ServerConfig;
use tasktrack::notify::{LogMailer, Mailer, OutboxMailer};
use tasktrack::server::{AppState, create_router};
use tasktrack::server::validation::{validate_email, validate_username};
use tasktrack::store::{SqliteStore, Store};
use tasktrack::types::{Account, GroupSet};

#[derive(Parser)]
#[command(name = "tasktrack")]
#[command(about = "A task tracker with group-gated workflow transitions", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Administrative commands
    Admin {
        #[command(subcommand)]
        command: AdminCommands,
    },

    /// Start the server
    Serve {
        /// TOML config file. Flags below override its values.
        #[arg(long, short)]
        config: Option<PathBuf>,

        /// Host to bind to
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to
        #[arg(long, short)]
        port: Option<u16>,

        /// Data directory for the database
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum AdminCommands {
    /// Create the database and the first admin account
    Init {
        /// Data directory for the database
        #[arg(long, default_value = "./data")]
        data_dir: PathBuf,

        #[arg(long, default_value = ADMIN_GROUP)]
        username: String,

        #[arg(long, default_value = "admin@localhost")]
        email: String,

        /// Generated and printed when omitted
        #[arg(long)]
        password: Option<String>,
    },
}

fn run_init(
    data_dir: PathBuf,
    username: String,
    email: String,
    password: Option<String>,
) -> anyhow::Result<()> {
    validate_username(&username)?;
    validate_email(&email)?;

    fs::create_dir_all(&data_dir)?;

    let config = ServerConfig {
        data_dir,
        ..ServerConfig::default()
    };
    let store = SqliteStore::new(config.db_path())?;
    store.initialize()?;

    if store.has_accounts()? {
        bail!(
            "Server already initialized. Accounts exist in {}",
            config.db_path().display()
        );
    }

    let generated = password.is_none();
    let password = password.unwrap_or_else(generate_password);
    let password_hash = TokenGenerator::new().hash_password(&password)?;

    let now = Utc::now();
    let account = Account {
        username,
        email,
        password_hash,
        active: true,
        groups: [ADMIN_GROUP].into_iter().collect::<GroupSet>(),
        created_at: now,
        updated_at: now,
    };
    store.create_account(&account)?;

    println!();
    println!("========================================");
    println!("Created admin account '{}'", account.username);
    if generated {
        println!("Password (save this, it won't be shown again):");
        println!();
        println!("  {password}");
    }
    println!("========================================");
    println!();

    Ok(())
}

fn build_mailer(config: &ServerConfig) -> anyhow::Result<Arc<dyn Mailer>> {
    let mailer: Arc<dyn Mailer> = match &config.mail.outbox_dir {
        Some(dir) => {
            info!("Spooling review mail to {}", dir.display());
            Arc::new(OutboxMailer::new(&config.mail.from, dir)?)
        }
        None => Arc::new(LogMailer::new(&config.mail.from)),
    };
    Ok(mailer)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("tasktrack=info".parse()?))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Admin { command } => match command {
            AdminCommands::Init {
                data_dir,
                username,
                email,
                password,
            } => {
                run_init(data_dir, username, email, password)?;
            }
        },
        Commands::Serve {
            config,
            host,
            port,
            data_dir,
        } => {
            let mut config = match config {
                Some(path) => ServerConfig::load(&path)?,
                None => ServerConfig::default(),
            };
            if let Some(host) = host {
                config.host = host;
            }
            if let Some(port) = port {
                config.port = port;
            }
            if let Some(data_dir) = data_dir {
                config.data_dir = data_dir;
            }

            let store = SqliteStore::new(config.db_path())?;
            store.initialize()?;
            if !store.has_accounts()? {
                bail!(
                    "Server not initialized. Run 'tasktrack admin init' first to create the database and an admin account."
                );
            }

            let mailer = build_mailer(&config)?;
            let addr = config.socket_addr()?;
            let state = Arc::new(AppState::new(Arc::new(store), mailer, config));

            let app = create_router(state);

            info!("Starting server on {}", addr);

            let listener = tokio::net::TcpListener::bind(addr).await?;
            axum::serve(listener, app).await?;
        }
    }

    Ok(())
}
