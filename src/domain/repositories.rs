//! Repository trait definitions
//!
//! These traits define the contract for data access.
//! Implementations live in the infrastructure layer.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::DomainError;
use super::pricing::Quantity;

/// Dossier data as the rest of the application sees it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dossier {
    pub id: i32,
    pub numero_dossier: String,
    pub adresse_chantier: String,
    pub libelle_travaux: String,
    pub adresse_facturation: String,
    pub moyen_paiement: String,
    pub garantie_decennale: bool,
    pub description: String,
    pub devis_signe: bool,
    pub facture_payee: bool,
    pub devis_generated: bool,
    pub facture_generated: bool,
}

/// Operator-editable fields of a dossier. Generation flags are only ever set
/// by a successful export.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DossierInput {
    pub numero_dossier: String,
    pub adresse_chantier: String,
    pub libelle_travaux: String,
    pub adresse_facturation: String,
    pub moyen_paiement: String,
    pub garantie_decennale: bool,
    pub description: String,
    pub devis_signe: bool,
    pub facture_payee: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LineItemKind {
    Product,
    Option,
}

/// A product or option row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineItem {
    pub id: i32,
    pub dossier_id: i32,
    pub kind: LineItemKind,
    pub designation: String,
    pub quantite: String,
    pub prix: f64,
    pub remise: f64,
    pub unite: Option<String>,
}

impl LineItem {
    pub fn quantity(&self) -> Quantity {
        Quantity::interpret(&self.quantite)
    }

    pub fn is_option(&self) -> bool {
        self.kind == LineItemKind::Option
    }
}

/// Input for one line of a replace-all write
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItemInput {
    pub designation: String,
    pub quantite: String,
    pub prix: f64,
    pub remise: f64,
    pub unite: Option<String>,
}

/// Entry of the deduplicated address pool
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Address {
    pub id: i32,
    pub address: String,
}

/// Which generation flag a successful export sets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Quote,
    Invoice,
}

/// Repository trait for Dossier entity
#[async_trait]
pub trait DossierRepository: Send + Sync {
    /// Full scan, store order
    async fn find_all(&self) -> Result<Vec<Dossier>, DomainError>;

    async fn find_by_id(&self, id: i32) -> Result<Option<Dossier>, DomainError>;

    /// First dossier carrying this number (numbers are not unique)
    async fn find_by_numero(&self, numero: &str) -> Result<Option<Dossier>, DomainError>;

    async fn create(&self, input: DossierInput) -> Result<Dossier, DomainError>;

    /// Full-row replace of the editable fields
    async fn update(&self, id: i32, input: DossierInput) -> Result<Dossier, DomainError>;

    /// Create (`id` of `None`) or update the dossier and replace its products
    /// and options, all in one transaction
    async fn save_with_line_items(
        &self,
        id: Option<i32>,
        input: DossierInput,
        products: Vec<LineItemInput>,
        options: Vec<LineItemInput>,
    ) -> Result<Dossier, DomainError>;

    /// Delete options, products and the dossier row in one transaction
    async fn delete(&self, id: i32) -> Result<(), DomainError>;

    async fn set_generated(
        &self,
        id: i32,
        kind: DocumentKind,
        generated: bool,
    ) -> Result<(), DomainError>;
}

/// Repository trait for products and options
#[async_trait]
pub trait LineItemRepository: Send + Sync {
    async fn find_by_dossier(
        &self,
        dossier_id: i32,
        kind: LineItemKind,
    ) -> Result<Vec<LineItem>, DomainError>;

    /// Delete every product and option of the dossier, then insert the given
    /// sets, all in one transaction.
    async fn replace_for_dossier(
        &self,
        dossier_id: i32,
        products: Vec<LineItemInput>,
        options: Vec<LineItemInput>,
    ) -> Result<(), DomainError>;
}

/// Repository trait for the address pool
#[async_trait]
pub trait AddressRepository: Send + Sync {
    async fn find_all(&self) -> Result<Vec<Address>, DomainError>;

    /// Fails with `Conflict` when the text is already present
    async fn create(&self, address: String) -> Result<Address, DomainError>;

    async fn rename(&self, old: &str, new: String) -> Result<Address, DomainError>;

    async fn delete(&self, address: &str) -> Result<(), DomainError>;
}
