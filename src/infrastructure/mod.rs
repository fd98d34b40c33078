//! Infrastructure layer - Framework implementations
//!
//! This layer contains:
//! - Database connection and migrations (db)
//! - Configuration loading (config)
//! - Repository implementations (repositories)
//! - Application state (state)
//! - Backup, restore and schema checks (maintenance)
//! - Single-instance rendezvous (instance)
//! - Update check (update)

pub mod config;
pub mod db;
pub mod instance;
pub mod maintenance;
pub mod repositories;
pub mod seed;
pub mod state;
pub mod update;

pub use repositories::*;
pub use state::AppState;
