pub mod documents;
pub mod domain;
pub mod infrastructure;
pub mod models;
pub mod presentation;
pub mod services;

pub use infrastructure::config;
pub use infrastructure::db;
pub use infrastructure::seed;
