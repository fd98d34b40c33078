//! Dossier Service - save, delete and numbering on top of the repositories

use chrono::{Datelike, Local};
use serde::Serialize;

use crate::domain::{
    Dossier, DossierNumber, DomainError, LineItem, LineItemKind, next_dossier_number,
};
use crate::infrastructure::AppState;
use crate::presentation::{DossierForm, DossierListEntry, EditSession, views};

/// A dossier with its products and options
#[derive(Debug, Clone, Serialize)]
pub struct DossierDetail {
    pub dossier: Dossier,
    pub products: Vec<LineItem>,
    pub options: Vec<LineItem>,
}

pub async fn load_detail(state: &AppState, dossier_id: i32) -> Result<DossierDetail, DomainError> {
    let dossier = state
        .dossier_repo
        .find_by_id(dossier_id)
        .await?
        .ok_or(DomainError::NotFound)?;
    let products = state
        .line_item_repo
        .find_by_dossier(dossier_id, LineItemKind::Product)
        .await?;
    let options = state
        .line_item_repo
        .find_by_dossier(dossier_id, LineItemKind::Option)
        .await?;

    Ok(DossierDetail {
        dossier,
        products,
        options,
    })
}

pub async fn find_by_numero(state: &AppState, numero: &str) -> Result<Dossier, DomainError> {
    state
        .dossier_repo
        .find_by_numero(numero.trim())
        .await?
        .ok_or(DomainError::NotFound)
}

/// Sidebar entries, most recent first
pub async fn list_entries(state: &AppState) -> Result<Vec<DossierListEntry>, DomainError> {
    let dossiers = state.dossier_repo.find_all().await?;
    Ok(views::dossier_list(&dossiers))
}

/// Save the form of the session's dossier.
///
/// A session without a current dossier creates one. The dossier row and its
/// line items are written in one transaction. On success the session returns to view mode on the saved
/// dossier; on failure it stays in edit mode with the operator's input.
pub async fn save_dossier(
    state: &AppState,
    session: &mut EditSession,
    form: &DossierForm,
) -> Result<Dossier, DomainError> {
    if !session.is_editing() {
        return Err(DomainError::validation(
            "Le dossier n'est pas en cours de modification",
        ));
    }

    let validated = form.validate()?;

    let dossier = state
        .dossier_repo
        .save_with_line_items(
            session.current_dossier(),
            validated.dossier,
            validated.products,
            validated.options,
        )
        .await?;

    session.saved(dossier.id);
    tracing::info!("Saved dossier {} ({})", dossier.id, dossier.numero_dossier);
    Ok(dossier)
}

pub async fn delete_dossier(
    state: &AppState,
    session: &mut EditSession,
    dossier_id: i32,
) -> Result<(), DomainError> {
    state.dossier_repo.delete(dossier_id).await?;
    session.deleted(dossier_id);
    Ok(())
}

/// Number offered for a new dossier of the current year
pub async fn suggest_next_number(state: &AppState) -> Result<DossierNumber, DomainError> {
    next_number_for_year(state, Local::now().year()).await
}

pub async fn next_number_for_year(
    state: &AppState,
    year: i32,
) -> Result<DossierNumber, DomainError> {
    let dossiers = state.dossier_repo.find_all().await?;
    Ok(next_dossier_number(
        dossiers.iter().map(|d| d.numero_dossier.as_str()),
        year,
    ))
}
