//! Quote (devis) builder

use super::layout::{self, DossierSnapshot, RenderContext};
use crate::domain::DomainError;
use super::model::Document;

pub const QUOTE_TITLE: &str = "DEVIS";

/// `devis_2025-3.docx` for dossier `2025/3`
pub fn quote_file_name(numero: &str) -> String {
    format!("devis_{}.docx", numero.replace('/', "-"))
}

pub fn build_quote(
    snapshot: &DossierSnapshot<'_>,
    ctx: &RenderContext<'_>,
) -> Result<Document, DomainError> {
    let mut doc = Document::default();

    layout::header(&mut doc, ctx.company, QUOTE_TITLE);
    layout::dossier_info(&mut doc, snapshot.dossier, "N° DEVIS :", ctx.date);
    layout::payment_terms(&mut doc, snapshot.dossier, ctx.pricing);
    layout::description(&mut doc, snapshot.dossier);
    layout::line_items(&mut doc, snapshot, ctx.pricing)?;

    let totals = ctx.pricing.totals(snapshot.products, snapshot.options)?;
    let mut lines = vec![(false, totals.products)];
    if let Some(with_options) = totals.with_options()? {
        lines.push((true, with_options));
    }

    for (with_options, amounts) in lines {
        doc.push_paragraph(layout::total_line("SOUS TOTAL", with_options, amounts.gross));
        doc.push_paragraph(layout::total_line("TOTAL A PAYER", with_options, amounts.net));
        doc.push_paragraph(layout::total_line(
            "ACOMPTE A VERSER",
            with_options,
            ctx.pricing.deposit(amounts.net)?,
        ));
    }

    layout::vat_mention(&mut doc);
    layout::closing(
        &mut doc,
        ctx.company,
        "Ce présent ",
        "devis",
        " est valable pendant 1 mois à compter de la date d'émission, si acceptation après, \
         le montant sera révisé.\nPour le valider, renvoyez-le à l'adresse suivante avec la \
         mention\n« BON POUR ACCORD » suivi de votre signature",
    );
    layout::page_numbers(&mut doc);

    Ok(doc)
}
