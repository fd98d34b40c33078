//! Services Layer
//!
//! Business operations composed from the repositories. Front ends call these
//! directly; none of them holds state between calls.

pub mod address_service;
pub mod document_service;
pub mod dossier_service;
pub mod listing_service;

// Re-export for convenience
pub use dossier_service::DossierDetail;
