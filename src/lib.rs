//! Library desk
//!
//! Catalog, cart and borrowing core of a desktop library application. State
//! lives in flat CSV tables under a data directory; the GUI shell talks to
//! the services exposed by [`Library`].

use std::sync::Arc;

pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

use repository::Repository;
use services::{
    clock::{Clock, SystemClock},
    Services,
};

/// Application context handed to every screen
#[derive(Clone)]
pub struct Library {
    pub config: Arc<AppConfig>,
    pub services: Arc<Services>,
}

impl Library {
    /// Open the data directory named in `config`, creating missing tables
    pub fn open(config: AppConfig) -> AppResult<Self> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: AppConfig, clock: Arc<dyn Clock>) -> AppResult<Self> {
        let repository = Repository::open(&config.data.dir)?;
        let services = Services::new(repository, &config, clock);
        Ok(Self {
            config: Arc::new(config),
            services: Arc::new(services),
        })
    }
}
