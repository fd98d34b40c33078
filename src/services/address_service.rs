//! Address Service - the deduplicated pool behind the address comboboxes

use crate::domain::{Address, DomainError};
use crate::infrastructure::AppState;

fn non_blank(address: &str) -> Result<String, DomainError> {
    let trimmed = address.trim();
    if trimmed.is_empty() {
        return Err(DomainError::validation("Veuillez saisir une adresse"));
    }
    Ok(trimmed.to_string())
}

pub async fn list_addresses(state: &AppState) -> Result<Vec<Address>, DomainError> {
    state.address_repo.find_all().await
}

/// Add to the pool. A duplicate is a `Conflict` and leaves the pool as is.
pub async fn add_address(state: &AppState, address: &str) -> Result<Address, DomainError> {
    let address = non_blank(address)?;
    let created = state.address_repo.create(address).await?;
    tracing::info!("Added address {}", created.id);
    Ok(created)
}

pub async fn rename_address(
    state: &AppState,
    old: &str,
    new: &str,
) -> Result<Address, DomainError> {
    let new = non_blank(new)?;
    state.address_repo.rename(old, new).await
}

pub async fn delete_address(state: &AppState, address: &str) -> Result<(), DomainError> {
    state.address_repo.delete(address).await
}
