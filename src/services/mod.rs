//! Business logic services

pub mod fines;
pub mod inventory;
pub mod limits;
pub mod reservations;
pub mod return_gate;

use crate::{config::AppConfig, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub inventory: inventory::InventoryService,
    pub reservations: reservations::ReservationsService,
    repository: Repository,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, config: &AppConfig) -> Self {
        let gate = return_gate::ReturnAuthorizationGate::new(config.returns.verification_token.clone());
        Self {
            inventory: inventory::InventoryService::new(repository.clone()),
            reservations: reservations::ReservationsService::new(
                repository.clone(),
                &config.loans,
                gate,
            ),
            repository,
        }
    }

    /// Storage reachability, for the readiness probe
    pub async fn ping_storage(&self) -> crate::error::AppResult<()> {
        self.repository.store.ping().await
    }
}
