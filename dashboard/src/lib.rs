//! Server-rendered dashboard for the tutoring backend.
//!
//! Pages talk to the backend through `api::Api`, which pairs the sans-IO
//! `tutor_core::ApiClient` with a pluggable `Transport`. Every backend call
//! yields an envelope; pages render the data branch or the failure message,
//! and mutations surface their outcome as a toast.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod form;
pub mod routes;
pub mod session;
pub mod toast;
pub mod transport;
pub mod view;

use std::sync::Arc;

use tokio::net::TcpListener;

use crate::api::Api;
use crate::cache::PageCache;
use crate::error::DashboardError;
use crate::transport::Transport;
use crate::view::Renderer;

pub use routes::router;

#[derive(Clone)]
pub struct DashboardState {
    pub api: Api,
    pub renderer: Arc<Renderer>,
}

impl DashboardState {
    pub fn new(backend_url: &str, transport: Arc<dyn Transport>) -> Result<Self, DashboardError> {
        Ok(Self {
            api: Api::new(backend_url, transport, PageCache::new()),
            renderer: Arc::new(Renderer::new()?),
        })
    }
}

pub async fn run(listener: TcpListener, state: DashboardState) -> Result<(), DashboardError> {
    axum::serve(listener, router(state)).await?;
    Ok(())
}
