//! Document Service - quote and invoice export
//!
//! Every call re-reads the dossier. The document is rendered in memory before
//! the operator is asked for a location, so a cancelled or failed export
//! never leaves a file behind. The generation flag is set only after the
//! file is written.

use crate::documents::save::write_document;
use crate::documents::{
    DossierSnapshot, ExportOutcome, InvoiceKind, RenderContext, SaveLocationPrompt, build_invoice,
    build_quote, quote_file_name, render_docx,
};
use crate::domain::{DocumentKind, DomainError};
use crate::infrastructure::AppState;
use crate::services::dossier_service::load_detail;

pub async fn generate_quote(
    state: &AppState,
    ctx: &RenderContext<'_>,
    dossier_id: i32,
    prompt: &mut dyn SaveLocationPrompt,
) -> Result<ExportOutcome, DomainError> {
    let detail = load_detail(state, dossier_id).await?;
    let snapshot = DossierSnapshot {
        dossier: &detail.dossier,
        products: &detail.products,
        options: &detail.options,
    };

    let bytes = render_docx(&build_quote(&snapshot, ctx)?)?;
    let name = quote_file_name(&detail.dossier.numero_dossier);

    export(state, dossier_id, DocumentKind::Quote, &name, &bytes, prompt).await
}

pub async fn generate_invoice(
    state: &AppState,
    ctx: &RenderContext<'_>,
    dossier_id: i32,
    kind: InvoiceKind,
    prompt: &mut dyn SaveLocationPrompt,
) -> Result<ExportOutcome, DomainError> {
    let detail = load_detail(state, dossier_id).await?;
    let snapshot = DossierSnapshot {
        dossier: &detail.dossier,
        products: &detail.products,
        options: &detail.options,
    };

    let bytes = render_docx(&build_invoice(&snapshot, kind, ctx)?)?;
    let name = kind.file_name(&detail.dossier.numero_dossier);

    export(state, dossier_id, DocumentKind::Invoice, &name, &bytes, prompt).await
}

async fn export(
    state: &AppState,
    dossier_id: i32,
    kind: DocumentKind,
    suggested_name: &str,
    bytes: &[u8],
    prompt: &mut dyn SaveLocationPrompt,
) -> Result<ExportOutcome, DomainError> {
    let Some(path) = prompt.choose(suggested_name) else {
        tracing::info!("Export of {} cancelled", suggested_name);
        return Ok(ExportOutcome::Cancelled);
    };

    write_document(&path, bytes).await?;
    state.dossier_repo.set_generated(dossier_id, kind, true).await?;

    tracing::info!("Generated {}", path.display());
    Ok(ExportOutcome::Saved(path))
}
