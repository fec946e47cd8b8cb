use std::net::SocketAddr;

use chrono::{Duration, Utc};
use migration::{Migrator, MigratorTrait};
use settings::Database;

mod settings;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let settings = settings::Settings::new()?;
    let mut tasks = tokio::task::JoinSet::new();

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "hakogane={level},server={level},engine={level},report={level}",
            level = settings.app.level
        ))
        .init();

    let timezone = settings.app.timezone()?;

    if let Some(server) = settings.server {
        tasks.spawn(async move {
            tracing::info!("Found server settings...");
            let db = match parse_database(&server.database).await {
                Ok(db) => db,
                Err(err) => {
                    tracing::error!("failed to initialize database: {err}");
                    return;
                }
            };

            let engine = engine::Engine::builder().database(db).build();
            match engine.purge_expired_sessions(Utc::now()).await {
                Ok(purged) => tracing::info!("purged {purged} expired sessions"),
                Err(err) => tracing::warn!("failed to purge expired sessions: {err}"),
            }

            let bind = server.bind.unwrap_or_else(|| "127.0.0.1".to_string());
            let addr: SocketAddr = match format!("{}:{}", bind, server.port).parse() {
                Ok(addr) => addr,
                Err(err) => {
                    tracing::error!("invalid server address {bind}: {err}");
                    return;
                }
            };
            let state = server::ServerState::new(
                engine,
                timezone,
                Duration::hours(server.session_ttl_hours),
            );
            server::run(state, addr).await;
        });
    } else {
        tracing::warn!("no [server] section in settings, nothing to run");
    }

    while tasks.join_next().await.is_some() {
        tasks.shutdown().await;
    }

    Ok(())
}

async fn parse_database(
    config: &settings::Database,
) -> Result<sea_orm::DatabaseConnection, Box<dyn std::error::Error + Send + Sync>> {
    let url = match config {
        Database::Memory => String::from("sqlite::memory:"),
        Database::Sqlite(path) => format!("sqlite:{}?mode=rwc", path),
    };

    let database = sea_orm::Database::connect(url).await?;
    Migrator::up(&database, None).await?;
    Ok(database)
}
