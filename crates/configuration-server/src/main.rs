use anyhow::Result;
use application::BusListener;
use clap::Parser;
use domain::EventPublisher;
use infrastructure::{BusConnection, MqttEventPublisher, ServerConfig};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use configuration_server::{api, setup_app_state, state::Stores};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory holding default.toml and per RUN_MODE overrides
    #[arg(long, default_value = "config")]
    config_dir: String,

    /// API Port, overrides http.port
    #[arg(long)]
    api_port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,configuration_server=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenv::dotenv().ok();
    let args = Args::parse();
    info!("🏢 Configuration Server Starting...");

    // 0. Load configuration
    let mut config = ServerConfig::load(&args.config_dir)?;
    if let Some(port) = args.api_port {
        config.http.port = port;
    }

    // 1. Storage
    let stores = match &config.database.url {
        Some(url) => {
            info!("Connecting to database...");
            Stores::connect(url).await?
        }
        None => {
            info!("No database configured, keeping state in memory");
            Stores::in_memory()
        }
    };

    // 2. Message bus
    let connection = if config.mqtt.enabled {
        info!(
            host = %config.mqtt.host,
            port = %config.mqtt.port,
            client_id = %config.mqtt.client_id,
            "Connecting to MQTT..."
        );
        Some(BusConnection::connect(&config.mqtt))
    } else {
        None
    };
    let bus = connection.as_ref().map(|(connection, _)| {
        Arc::new(MqttEventPublisher::new(Arc::new(connection.clone()))) as Arc<dyn EventPublisher>
    });

    // 3. Services and read models
    let state = setup_app_state(&config, stores, bus).await?;
    info!("✅ Services initialized");

    // 4. Bus listener
    if let Some((connection, messages)) = connection {
        let listener = BusListener::new(connection, messages, state.router.clone());
        tokio::spawn(listener.start());
        info!("✅ Bus listener started");
    }

    // 5. Start API Server
    let app = api::create_router(state);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], config.http.port));
    info!("🚀 API Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
