//! Invoice (facture) builder and its four variants

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::layout::{self, DossierSnapshot, RenderContext};
use super::model::Document;
use crate::domain::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceKind {
    #[default]
    Standard,
    /// Already settled
    Settled,
    /// Deposit only
    Deposit,
    Final,
}

impl InvoiceKind {
    pub const ALL: [InvoiceKind; 4] = [
        InvoiceKind::Standard,
        InvoiceKind::Settled,
        InvoiceKind::Deposit,
        InvoiceKind::Final,
    ];

    pub fn title(self) -> &'static str {
        match self {
            InvoiceKind::Standard => "FACTURE",
            InvoiceKind::Settled => "FACTURE AQUITTÉE",
            InvoiceKind::Deposit => "FACTURE D'ACOMPTE",
            InvoiceKind::Final => "FACTURE DÉFINITIVE",
        }
    }

    /// Label shown in the type picker
    pub fn label(self) -> &'static str {
        match self {
            InvoiceKind::Standard => "Facture classique",
            InvoiceKind::Settled => "Facture aquittée",
            InvoiceKind::Deposit => "Facture d'acompte",
            InvoiceKind::Final => "Facture définitive",
        }
    }

    pub fn file_prefix(self) -> &'static str {
        match self {
            InvoiceKind::Standard => "facture_",
            InvoiceKind::Settled => "facture_aquitte_",
            InvoiceKind::Deposit => "facture_acompte_",
            InvoiceKind::Final => "facture_definitive_",
        }
    }

    pub fn file_name(self, numero: &str) -> String {
        format!("{}{}.docx", self.file_prefix(), numero.replace('/', "-"))
    }
}

impl fmt::Display for InvoiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for InvoiceKind {
    type Err = DomainError;

    /// Accepts the picker labels as well as short CLI names
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(kind) = Self::ALL.into_iter().find(|k| k.label() == s) {
            return Ok(kind);
        }
        match s.to_lowercase().as_str() {
            "standard" | "classique" => Ok(InvoiceKind::Standard),
            "settled" | "aquittee" | "acquittee" => Ok(InvoiceKind::Settled),
            "deposit" | "acompte" => Ok(InvoiceKind::Deposit),
            "final" | "definitive" => Ok(InvoiceKind::Final),
            _ => Err(DomainError::validation(format!(
                "Type de facture inconnu : {}",
                s
            ))),
        }
    }
}

pub fn build_invoice(
    snapshot: &DossierSnapshot<'_>,
    kind: InvoiceKind,
    ctx: &RenderContext<'_>,
) -> Result<Document, DomainError> {
    let mut doc = Document::default();

    layout::header(&mut doc, ctx.company, kind.title());
    layout::dossier_info(&mut doc, snapshot.dossier, "N° FACTURE :", ctx.date);
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
        if kind == InvoiceKind::Deposit {
            doc.push_paragraph(layout::total_line(
                "ACOMPTE A REGLER",
                with_options,
                ctx.pricing.deposit(amounts.net)?,
            ));
        }
    }

    layout::vat_mention(&mut doc);
    layout::closing(
        &mut doc,
        ctx.company,
        "Cette ",
        "facture",
        &format!(
            " est payable à sa date d'émission soit au plus tard le {}. En cas de retard de \
             paiement,\nune pénalité fixée à 15% du montant net de la facture, par mois de retard \
             entamé, est exigible sans rappel le jour suivant la date\nlimite de règlement. \
             Aucun escompte pour paiement anticipé.",
            layout::format_date(ctx.date)
        ),
    );
    layout::page_numbers(&mut doc);

    Ok(doc)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_names_follow_the_variant() {
        assert_eq!(InvoiceKind::Standard.file_name("2025/3"), "facture_2025-3.docx");
        assert_eq!(InvoiceKind::Settled.file_name("2025/3"), "facture_aquitte_2025-3.docx");
        assert_eq!(InvoiceKind::Deposit.file_name("2025/3"), "facture_acompte_2025-3.docx");
        assert_eq!(
            InvoiceKind::Final.file_name("2025/3"),
            "facture_definitive_2025-3.docx"
        );
    }

    #[test]
    fn parses_labels_and_short_names() {
        assert_eq!(
            "Facture d'acompte".parse::<InvoiceKind>().unwrap(),
            InvoiceKind::Deposit
        );
        assert_eq!("final".parse::<InvoiceKind>().unwrap(), InvoiceKind::Final);
        assert_eq!("Settled".parse::<InvoiceKind>().unwrap(), InvoiceKind::Settled);
        assert!("avoir".parse::<InvoiceKind>().is_err());
    }
}
