//! Domain layer - Pure business abstractions
//!
//! This layer contains NO framework dependencies beyond the error conversion
//! from SeaORM. Repository traits, pricing and numbering rules live here.

pub mod errors;
pub mod numbering;
pub mod pricing;
pub mod repositories;

pub use errors::DomainError;
pub use numbering::{DossierNumber, next_dossier_number};
pub use pricing::{DossierTotals, LineAmounts, PricingFormula, PricingPolicy, Quantity};
pub use repositories::*;
