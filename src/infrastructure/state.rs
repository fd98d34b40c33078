//! Application state containing repositories and shared resources

use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::domain::{AddressRepository, DossierRepository, LineItemRepository};
use crate::infrastructure::{
    SeaOrmAddressRepository, SeaOrmDossierRepository, SeaOrmLineItemRepository,
};

/// Application state shared by every service call
#[derive(Clone)]
pub struct AppState {
    db: DatabaseConnection,
    pub dossier_repo: Arc<dyn DossierRepository>,
    pub line_item_repo: Arc<dyn LineItemRepository>,
    pub address_repo: Arc<dyn AddressRepository>,
}

impl AppState {
    /// Create a new AppState with all repositories initialized
    pub fn new(db: DatabaseConnection) -> Self {
        let dossier_repo = Arc::new(SeaOrmDossierRepository::new(db.clone()));
        let line_item_repo = Arc::new(SeaOrmLineItemRepository::new(db.clone()));
        let address_repo = Arc::new(SeaOrmAddressRepository::new(db.clone()));

        Self {
            db,
            dossier_repo,
            line_item_repo,
            address_repo,
        }
    }

    /// Raw connection, for maintenance work that spans every table
    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }
}

impl AsRef<DatabaseConnection> for AppState {
    fn as_ref(&self) -> &DatabaseConnection {
        &self.db
    }
}
