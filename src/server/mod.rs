pub mod api;

use crate::agent::Delegate;
use std::error::Error;
use std::net::SocketAddr;
use std::sync::Arc;
use log::info;

pub use api::{ router, AppState };

pub struct Server {
    addr: String,
    delegate: Arc<dyn Delegate>,
    service_name: String,
}

impl Server {
    pub fn new(addr: String, delegate: Arc<dyn Delegate>, service_name: String) -> Self {
        Self {
            addr,
            delegate,
            service_name,
        }
    }

    pub async fn run(&self) -> Result<(), Box<dyn Error + Send + Sync>> {
        let addr = self.addr.parse::<SocketAddr>()?;
        let app = router(AppState {
            delegate: self.delegate.clone(),
            service_name: self.service_name.clone(),
        });

        let listener = tokio::net::TcpListener::bind(addr).await.map_err(|e| {
            format!("Failed to bind HTTP server to {}: {}. Try a different port.", addr, e)
        })?;
        info!("Relay listening on: http://{}", addr);
        axum::serve(listener, app.into_make_service()).await?;

        Ok(())
    }
}
