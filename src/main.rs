use std::env;
use std::sync::Arc;

use people360::api::{AppState, Stores, create_router};
use people360::config::ConfigLoader;
use people360::services::{ChannelNotifier, LogMailer, run_delivery};
use people360::store::PgStore;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_CONFIG_DIR: &str = "./config/people360";
const DEFAULT_BIND: &str = "0.0.0.0:3000";

#[tokio::main]
async fn main() {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,people360=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config_dir = env::var("PEOPLE360_CONFIG_DIR").unwrap_or_else(|_| DEFAULT_CONFIG_DIR.to_string());
    tracing::info!(config_dir = %config_dir, "Loading configuration");
    let config = ConfigLoader::load(&config_dir).expect("Failed to load configuration");

    // Notifications are delivered off the request path
    let (notifier, receiver) = ChannelNotifier::channel();
    tokio::spawn(run_delivery(
        receiver,
        config.notifications().clone(),
        Arc::new(LogMailer),
    ));

    let stores = match env::var("DATABASE_URL") {
        Ok(database_url) => {
            let store = PgStore::connect(&database_url)
                .await
                .expect("Failed to connect to database");
            tracing::info!("Using Postgres stores");
            Stores::postgres(&store)
        }
        Err(_) => {
            tracing::warn!("DATABASE_URL not set; records are kept in memory and lost on exit");
            Stores::in_memory()
        }
    };

    let state = AppState::new(&config, stores, Arc::new(notifier));
    let app = create_router(state);

    let bind = env::var("PEOPLE360_BIND").unwrap_or_else(|_| DEFAULT_BIND.to_string());
    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .expect("Failed to bind listener");

    tracing::info!(
        "Server listening on {}",
        listener.local_addr().expect("Listener has no local address")
    );

    axum::serve(listener, app).await.expect("Server error");
}
