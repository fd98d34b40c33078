//! View-models for the dossier list, the quote and invoice lists, the line
//! item grids and the address pool

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::Serialize;

use super::session::EditSession;
use crate::documents::format::{format_euros, format_quantity};
use crate::domain::pricing::money;
use crate::domain::{Address, Dossier, DossierNumber, DomainError, LineItem, PricingPolicy};

fn matches(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}

/// Entry of the sidebar list: `"{numero} - {libelle}"`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DossierListEntry {
    pub id: i32,
    pub numero: String,
    pub label: String,
}

/// Most recent first. Dossiers whose number is not `YEAR/SEQ` are left out.
pub fn dossier_list(dossiers: &[Dossier]) -> Vec<DossierListEntry> {
    let mut numbered: Vec<(DossierNumber, &Dossier)> = dossiers
        .iter()
        .filter_map(|d| {
            d.numero_dossier
                .parse::<DossierNumber>()
                .ok()
                .map(|n| (n, d))
        })
        .collect();
    numbered.sort_by_key(|(n, _)| n.recent_first());

    numbered
        .into_iter()
        .map(|(_, d)| DossierListEntry {
            id: d.id,
            numero: d.numero_dossier.clone(),
            label: format!("{} - {}", d.numero_dossier, d.libelle_travaux),
        })
        .collect()
}

pub fn filter_dossier_list<'a>(
    entries: &'a [DossierListEntry],
    query: &str,
) -> Vec<&'a DossierListEntry> {
    let needle = query.trim().to_lowercase();
    entries.iter().filter(|e| matches(&e.label, &needle)).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum QuoteStatusFilter {
    #[default]
    All,
    Signed,
    Unsigned,
}

impl QuoteStatusFilter {
    pub fn label(self) -> &'static str {
        match self {
            QuoteStatusFilter::All => "Tous",
            QuoteStatusFilter::Signed => "Signé",
            QuoteStatusFilter::Unsigned => "Non signé",
        }
    }

    fn accepts(self, signed: bool) -> bool {
        match self {
            QuoteStatusFilter::All => true,
            QuoteStatusFilter::Signed => signed,
            QuoteStatusFilter::Unsigned => !signed,
        }
    }
}

impl FromStr for QuoteStatusFilter {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "tous" | "all" => Ok(QuoteStatusFilter::All),
            "signé" | "signe" | "signed" => Ok(QuoteStatusFilter::Signed),
            "non signé" | "non signe" | "unsigned" => Ok(QuoteStatusFilter::Unsigned),
            other => Err(DomainError::validation(format!("Statut inconnu : {}", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum InvoiceStatusFilter {
    #[default]
    All,
    Paid,
    Unpaid,
}

impl InvoiceStatusFilter {
    pub fn label(self) -> &'static str {
        match self {
            InvoiceStatusFilter::All => "Tous",
            InvoiceStatusFilter::Paid => "Payé",
            InvoiceStatusFilter::Unpaid => "Non payé",
        }
    }

    fn accepts(self, paid: bool) -> bool {
        match self {
            InvoiceStatusFilter::All => true,
            InvoiceStatusFilter::Paid => paid,
            InvoiceStatusFilter::Unpaid => !paid,
        }
    }
}

impl FromStr for InvoiceStatusFilter {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "tous" | "all" => Ok(InvoiceStatusFilter::All),
            "payé" | "paye" | "paid" => Ok(InvoiceStatusFilter::Paid),
            "non payé" | "non paye" | "unpaid" => Ok(InvoiceStatusFilter::Unpaid),
            other => Err(DomainError::validation(format!("Statut inconnu : {}", other))),
        }
    }
}

/// Row of the quote list
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuoteRow {
    pub dossier_id: i32,
    pub numero: String,
    pub adresse_chantier: String,
    pub adresse_facturation: String,
    pub libelle_travaux: String,
    pub signed: bool,
    /// Discounted total of the products, options excluded
    pub total: Decimal,
}

impl QuoteRow {
    pub fn new(
        dossier: &Dossier,
        products: &[LineItem],
        pricing: &PricingPolicy,
    ) -> Result<Self, DomainError> {
        Ok(Self {
            dossier_id: dossier.id,
            numero: dossier.numero_dossier.clone(),
            adresse_chantier: dossier.adresse_chantier.clone(),
            adresse_facturation: dossier.adresse_facturation.clone(),
            libelle_travaux: dossier.libelle_travaux.clone(),
            signed: dossier.devis_signe,
            total: pricing.totals(products, &[])?.products.net,
        })
    }

    pub fn status(&self) -> &'static str {
        if self.signed { "Signé" } else { "Non signé" }
    }

    pub fn total_display(&self) -> String {
        format_euros(self.total)
    }

    fn text_matches(&self, needle: &str) -> bool {
        [
            &self.numero,
            &self.adresse_chantier,
            &self.adresse_facturation,
            &self.libelle_travaux,
        ]
        .into_iter()
        .any(|field| matches(field, needle))
    }
}

pub fn filter_quote_rows<'a>(
    rows: &'a [QuoteRow],
    query: &str,
    status: QuoteStatusFilter,
) -> Vec<&'a QuoteRow> {
    let needle = query.trim().to_lowercase();
    rows.iter()
        .filter(|r| status.accepts(r.signed) && r.text_matches(&needle))
        .collect()
}

/// Row of the invoice list; only dossiers that had an invoice generated
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvoiceRow {
    pub dossier_id: i32,
    pub numero: String,
    pub adresse_chantier: String,
    pub adresse_facturation: String,
    pub libelle_travaux: String,
    pub paid: bool,
    pub total: Decimal,
}

impl InvoiceRow {
    /// `None` when no invoice was ever generated for the dossier
    pub fn new(
        dossier: &Dossier,
        products: &[LineItem],
        pricing: &PricingPolicy,
    ) -> Result<Option<Self>, DomainError> {
        if !dossier.facture_generated {
            return Ok(None);
        }
        Ok(Some(Self {
            dossier_id: dossier.id,
            numero: dossier.numero_dossier.clone(),
            adresse_chantier: dossier.adresse_chantier.clone(),
            adresse_facturation: dossier.adresse_facturation.clone(),
            libelle_travaux: dossier.libelle_travaux.clone(),
            paid: dossier.facture_payee,
            total: pricing.totals(products, &[])?.products.net,
        }))
    }

    pub fn status(&self) -> &'static str {
        if self.paid { "Payé" } else { "Non payé" }
    }

    pub fn total_display(&self) -> String {
        format_euros(self.total)
    }

    fn text_matches(&self, needle: &str) -> bool {
        [
            &self.numero,
            &self.adresse_chantier,
            &self.adresse_facturation,
            &self.libelle_travaux,
        ]
        .into_iter()
        .any(|field| matches(field, needle))
    }
}

pub fn filter_invoice_rows<'a>(
    rows: &'a [InvoiceRow],
    query: &str,
    status: InvoiceStatusFilter,
) -> Vec<&'a InvoiceRow> {
    let needle = query.trim().to_lowercase();
    rows.iter()
        .filter(|r| status.accepts(r.paid) && r.text_matches(&needle))
        .collect()
}

/// Row of the product or option grid, with its live total
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineItemRow {
    pub designation: String,
    pub prix: String,
    pub quantite: String,
    pub remise: String,
    pub total: String,
    pub is_option: bool,
    pub editable: bool,
}

pub fn line_item_rows(
    items: &[LineItem],
    pricing: &PricingPolicy,
    session: &EditSession,
) -> Result<Vec<LineItemRow>, DomainError> {
    items
        .iter()
        .map(|item| {
            Ok(LineItemRow {
                designation: item.designation.clone(),
                prix: format_euros(money(item.prix)),
                quantite: format_quantity(&item.quantity(), item.unite.as_deref()),
                remise: format_euros(money(item.remise)),
                total: format_euros(pricing.price_item(item)?.net),
                is_option: item.is_option(),
                editable: session.row_editable(),
            })
        })
        .collect()
}

pub fn filter_addresses<'a>(addresses: &'a [Address], query: &str) -> Vec<&'a Address> {
    let needle = query.trim().to_lowercase();
    addresses
        .iter()
        .filter(|a| matches(&a.address, &needle))
        .collect()
}

/// Combobox entries: a blank first entry, then the pool
pub fn address_choices(addresses: &[Address]) -> Vec<String> {
    std::iter::once(String::new())
        .chain(addresses.iter().map(|a| a.address.clone()))
        .collect()
}
