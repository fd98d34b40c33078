//! Listing Service - rows of the quote and invoice screens

use crate::domain::{DomainError, LineItemKind, PricingPolicy};
use crate::infrastructure::AppState;
use crate::presentation::{InvoiceRow, QuoteRow};

/// One row per dossier, in store order
pub async fn quote_rows(
    state: &AppState,
    pricing: &PricingPolicy,
) -> Result<Vec<QuoteRow>, DomainError> {
    let dossiers = state.dossier_repo.find_all().await?;

    let mut rows = Vec::with_capacity(dossiers.len());
    for dossier in &dossiers {
        let products = state
            .line_item_repo
            .find_by_dossier(dossier.id, LineItemKind::Product)
            .await?;
        rows.push(QuoteRow::new(dossier, &products, pricing)?);
    }

    Ok(rows)
}

/// Dossiers for which an invoice has been generated
pub async fn invoice_rows(
    state: &AppState,
    pricing: &PricingPolicy,
) -> Result<Vec<InvoiceRow>, DomainError> {
    let dossiers = state.dossier_repo.find_all().await?;

    let mut rows = Vec::new();
    for dossier in dossiers.iter().filter(|d| d.facture_generated) {
        let products = state
            .line_item_repo
            .find_by_dossier(dossier.id, LineItemKind::Product)
            .await?;
        rows.extend(InvoiceRow::new(dossier, &products, pricing)?);
    }

    Ok(rows)
}
