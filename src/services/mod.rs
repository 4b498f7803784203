//! Business logic services

pub mod auth;
pub mod cart;
pub mod catalog;
pub mod clock;
pub mod loans;
pub mod members;
pub mod stats;

use std::sync::Arc;

use crate::{config::AppConfig, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub auth: auth::AuthService,
    pub catalog: catalog::CatalogService,
    pub cart: cart::CartService,
    pub loans: loans::LoansService,
    pub members: members::MembersService,
    pub stats: stats::StatsService,
}

impl Services {
    /// Create all services over the given repository
    pub fn new(repository: Repository, config: &AppConfig, clock: Arc<dyn clock::Clock>) -> Self {
        Self {
            auth: auth::AuthService::new(repository.clone(), config.auth.clone()),
            catalog: catalog::CatalogService::new(repository.clone()),
            cart: cart::CartService::new(repository.clone()),
            loans: loans::LoansService::new(repository.clone(), config.loans.clone(), clock),
            members: members::MembersService::new(repository.clone()),
            stats: stats::StatsService::new(repository),
        }
    }
}
