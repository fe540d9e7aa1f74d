use pushbridge_common::config::AppConfig;
use pushbridge_common::db;
use pushbridge_gateway::FcmClient;
use pushbridge_listener::listener::NotificationListener;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pushbridge_listener=info,pushbridge_engine=info".into()),
        )
        .json()
        .init();

    tracing::info!("PushBridge listener starting...");

    // Load configuration
    let config = AppConfig::from_env()?;

    // Connect to database
    let pool = db::create_pool(&config.database_url, config.db_max_connections).await?;

    // Run migrations
    sqlx::migrate!("../../migrations").run(&pool).await?;
    tracing::info!("Database migrations applied");

    // Build the push-gateway client from the service-account key
    let gateway = FcmClient::from_key_file(config.require_fcm_credentials()?)?;
    tracing::info!(project_id = gateway.project_id(), "Push gateway client ready");

    let listener = NotificationListener::new(pool, gateway);

    // Run with graceful shutdown on Ctrl+C
    tokio::select! {
        result = listener.run() => {
            if let Err(e) = result {
                tracing::error!(error = %e, "Listener exited with error");
                return Err(e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Received shutdown signal, stopping gracefully...");
        }
    }

    tracing::info!("PushBridge listener stopped.");
    Ok(())
}
