//! HTTP server for the storefront order service.
//!
//! Endpoints: health, catalog, cart, orders. Configuration comes from the environment;
//! see [`storefront_orders::config`].

use std::sync::Arc;

use log::info;
use storefront_orders::api::{self, AppState};
use storefront_orders::{
    Gateway, HttpGateway, OrderManager, OrderService, ServiceConfig, StaticCatalog, StdoutAuditSink,
};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = env_logger::try_init();
    let config = ServiceConfig::from_env();

    let gateway = match &config.remote {
        Some(remote) => {
            info!(
                "mirroring orders to {} timeout={:?} retries={}",
                remote.base_url, remote.timeout, remote.retries
            );
            Gateway::Http(HttpGateway::new(remote.clone())?)
        }
        None => Gateway::default(),
    };
    let service = OrderService::new(
        OrderManager::with_policy(config.policy),
        gateway,
        Arc::new(StdoutAuditSink),
    );
    let catalog = StaticCatalog::bundled()?;
    let app = api::create_router(AppState::new(service, Arc::new(catalog)));

    let addr = config.listen_addr();
    let listener = TcpListener::bind(&addr).await?;
    info!("listening on http://{} policy={:?}", addr, config.policy);
    axum::serve(listener, app.into_make_service()).await?;
    Ok(())
}
