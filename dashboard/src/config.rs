//! Command-line and environment configuration for the dashboard binary.

use std::sync::Arc;

use clap::Parser;

use crate::error::DashboardError;
use crate::transport::ReqwestTransport;
use crate::DashboardState;

#[derive(Debug, Clone, Parser)]
#[command(
    name = "tutor-dashboard",
    about = "Server-rendered dashboard for the tutoring backend",
    version
)]
pub struct DashboardConfig {
    /// Port to listen on (127.0.0.1).
    #[arg(long, env = "PORT", default_value_t = 3000)]
    pub port: u16,
    /// Base URL of the backend resource API.
    #[arg(long, env = "BACKEND_URL", default_value = "http://127.0.0.1:4000")]
    pub backend_url: String,
}

impl DashboardConfig {
    pub fn into_state(self) -> Result<DashboardState, DashboardError> {
        DashboardState::new(&self.backend_url, Arc::new(ReqwestTransport::new()))
    }
}
