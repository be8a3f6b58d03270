use merkbot::api::twilio::{MessageSender, TwilioClient};
use merkbot::nlp::{GermanTimeParser, TimeExtractor};
use merkbot::service::MessageProcessor;
use mimalloc::MiMalloc;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::str::FromStr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cfg = merkbot::config::Config::from_env()?;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cfg.loglevel.clone()));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_level(true)
                .with_target(false),
        )
        .init();

    info!(
        database_url = %cfg.database_url,
        bind_addr = %cfg.bind_addr,
        loglevel = %cfg.loglevel,
        from_number = %cfg.twilio_from_number
    );

    let connect_opts =
        SqliteConnectOptions::from_str(cfg.database_url.as_str())?.create_if_missing(true);
    let pool = SqlitePoolOptions::new().connect_with(connect_opts).await?;
    let storage = merkbot::db::Storage::new(pool);
    storage.init_schema().await?;

    let sender: Arc<dyn MessageSender> = Arc::new(TwilioClient::new(cfg.twilio()));
    let extractor: Arc<dyn TimeExtractor> = Arc::new(GermanTimeParser::new());
    let processor = MessageProcessor::new(storage.clone(), sender.clone(), extractor);
    let jobs = merkbot::service::worker::spawn(
        processor,
        cfg.worker_queue_depth,
        cfg.worker_concurrency,
    );

    // Build axum router and serve
    let state = merkbot::router::BotState::new(storage, sender, jobs);
    let app = merkbot::router::merkbot_router(state);

    let listener = TcpListener::bind(&cfg.bind_addr).await?;
    info!("HTTP server listening on {}", cfg.bind_addr);
    axum::serve(listener, app).await?;
    Ok(())
}
