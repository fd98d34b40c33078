pub mod address;
pub mod dossier;
pub mod dossier_option;
pub mod product;
