pub mod api;
pub mod protocols;
pub mod state;

use anyhow::Result;
use domain::EventPublisher;
use infrastructure::ServerConfig;
use state::{AppState, Stores};
use std::sync::Arc;

pub async fn setup_app_state(
    config: &ServerConfig,
    stores: Stores,
    bus: Option<Arc<dyn EventPublisher>>,
) -> Result<Arc<AppState>> {
    Ok(Arc::new(AppState::new(config, stores, bus).await?))
}
