//! Command-line and environment configuration for the backend binary.

use clap::Parser;

use crate::store::Store;
use crate::{AdminAccount, AppState};

#[derive(Debug, Clone, Parser)]
#[command(
    name = "tutor-backend",
    about = "In-memory resource API for the tutoring dashboard",
    version
)]
pub struct BackendConfig {
    /// Port to listen on (127.0.0.1).
    #[arg(long, env = "PORT", default_value_t = 4000)]
    pub port: u16,
    /// Username accepted by `auth/login`.
    #[arg(long, env = "ADMIN_USER", default_value = "admin")]
    pub admin_user: String,
    /// Password accepted by `auth/login`.
    #[arg(long, env = "ADMIN_PASSWORD")]
    pub admin_password: String,
    /// Start with an empty store instead of the demo data set.
    #[arg(long, env = "NO_SEED")]
    pub no_seed: bool,
}

impl BackendConfig {
    pub fn into_state(self) -> AppState {
        let store = if self.no_seed {
            Store::new()
        } else {
            Store::seeded()
        };
        AppState::new(
            store,
            AdminAccount {
                username: self.admin_user,
                password: self.admin_password,
            },
        )
    }
}
