use chrono::Utc;
use clap::Parser;
use sd_core::{DashboardStore, DigestNotifier, LogNotifier, Result};
use sd_web::auth::AuthConfig;
use sd_web::AppState;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Storage backend to use: memory or sqlite
    #[arg(long, default_value = "memory")]
    storage: String,
    /// Backend connection string (the database path for sqlite)
    #[arg(long)]
    backend_url: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Run the dashboard HTTP API
    Serve {
        #[arg(long, default_value_t = 8000)]
        port: u16,
    },
    /// Compute and persist today's sentiment snapshot
    Aggregate,
    /// Compute the news summary and notify every registered user
    Digest,
}

async fn check_storage(storage: &Arc<dyn DashboardStore>, storage_type: &str) -> Result<()> {
    // A cheap read is enough to prove the backend is reachable
    let articles = storage.all_articles().await?;
    info!(
        "💾 Storage initialized successfully (using {}, {} articles)",
        storage_type,
        articles.len()
    );
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    let storage = sd_storage::create_storage(cli.storage.as_str(), cli.backend_url.as_deref())
        .await?;
    check_storage(&storage, cli.storage.as_str()).await?;

    match cli.command {
        Commands::Serve { port } => {
            let state = AppState {
                store: storage,
                notifier: Arc::new(LogNotifier),
                auth: AuthConfig::from_env(),
            };
            let app = sd_web::create_app(state).await;
            let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
            info!("⚙️ Server is running on port {}", port);
            axum::serve(listener, app).await?;
        }
        Commands::Aggregate => {
            let snapshot =
                sd_analytics::persist_daily_snapshot(&*storage, &*storage, Utc::now()).await?;
            info!(
                "📊 Snapshot for {} persisted with {} tonality entries",
                snapshot.date.date_naive(),
                snapshot.tonality.len()
            );
        }
        Commands::Digest => match sd_analytics::digest_summary(&*storage).await {
            Ok(summary) => {
                let notifier = LogNotifier;
                let users = storage.all_users().await?;
                for user in &users {
                    notifier.send_digest(user, &summary).await?;
                }
                info!("📧 Digest prepared for {} recipients", users.len());
            }
            Err(sd_core::Error::Computation(reason)) => {
                warn!("No digest sent: {}", reason);
            }
            Err(err) => return Err(err),
        },
    }

    Ok(())
}
