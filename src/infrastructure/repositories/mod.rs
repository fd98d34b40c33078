//! Repository implementations using SeaORM

pub mod address_repository;
pub mod dossier_repository;
pub mod line_item_repository;

pub use address_repository::SeaOrmAddressRepository;
pub use dossier_repository::SeaOrmDossierRepository;
pub use line_item_repository::SeaOrmLineItemRepository;
