//! Blocks shared by quotes and invoices

use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::format::{format_euros, format_percent, format_quantity};
use super::model::{Align, Cell, Document, Field, Paragraph, Row, Rgb, Run, Table};
use crate::domain::pricing::money;
use crate::domain::{DomainError, Dossier, LineItem, PricingPolicy};
use crate::infrastructure::config::CompanyProfile;

/// A4 portrait
pub const PAGE_WIDTH: u32 = 11_906;
pub const PAGE_HEIGHT: u32 = 16_838;
/// Half an inch on every side
pub const PAGE_MARGIN: u32 = 720;
pub const CONTENT_WIDTH: u32 = PAGE_WIDTH - 2 * PAGE_MARGIN;

const BODY_SIZE: u32 = 10;
const HEADER_ROW_HEIGHT: u32 = 510;
const LINE_ROW_HEIGHT: u32 = 340;

/// Everything a builder needs besides the dossier itself
pub struct RenderContext<'a> {
    pub company: &'a CompanyProfile,
    pub pricing: &'a PricingPolicy,
    pub date: NaiveDate,
}

/// A dossier with its line items, as read from the store
pub struct DossierSnapshot<'a> {
    pub dossier: &'a Dossier,
    pub products: &'a [LineItem],
    pub options: &'a [LineItem],
}

pub fn format_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// Company identity on the left, document title on the right
pub fn header(doc: &mut Document, company: &CompanyProfile, title: &str) {
    let mut left = vec![
        Paragraph::new().run(Run::text(&company.name).bold().size(20).color(Rgb::ACCENT)),
        Paragraph::new().run(Run::text(&company.motto).bold().size(10).color(Rgb::ACCENT)),
    ];
    if !company.email.is_empty() {
        left.push(
            Paragraph::new().run(
                Run::text(&company.email)
                    .bold()
                    .underline()
                    .size(16)
                    .color(Rgb::MAIL),
            ),
        );
    }
    if !company.phone.is_empty() {
        left.push(
            Paragraph::new().run(Run::text(&company.phone).bold().size(16).color(Rgb::BLACK)),
        );
    }

    let right = [
        Run::text(title).bold().size(16).color(Rgb::ACCENT),
        Run::text(&company.slogan).bold().size(10),
        Run::text(&company.activity).bold().size(10),
    ]
    .into_iter()
    .map(|run| Paragraph::new().run(run).align(Align::Right).spacing(0, 10))
    .collect();

    let left_width = CONTENT_WIDTH * 515 / 1000;
    doc.push_table(Table {
        columns: vec![left_width, CONTENT_WIDTH - left_width],
        rows: vec![Row::new(vec![Cell::new(left), Cell::new(right)])],
        border: None,
    });
}

/// Framed block with date, number, site address and work label
pub fn dossier_info(doc: &mut Document, dossier: &Dossier, number_label: &str, date: NaiveDate) {
    doc.push_paragraph(Paragraph::new());

    let lines = [
        ("DATE :", format_date(date)),
        (number_label, dossier.numero_dossier.clone()),
        ("ADRESSE CHANTIER :", dossier.adresse_chantier.clone()),
        ("LIBELLÉ TRAVAUX :", dossier.libelle_travaux.clone()),
    ];
    let last = lines.len() - 1;

    let paragraphs = lines
        .into_iter()
        .enumerate()
        .map(|(idx, (label, value))| {
            let before = if idx == 0 { 12 } else { 0 };
            let after = if idx == last { 12 } else { 0 };
            Paragraph::new()
                .run(Run::text(label).bold().underline().size(BODY_SIZE))
                .run(Run::text(format!(" {}", value)).size(BODY_SIZE))
                .spacing(before, after)
        })
        .collect();

    doc.push_table(Table {
        columns: vec![CONTENT_WIDTH],
        rows: vec![Row::new(vec![Cell::new(paragraphs)])],
        border: Some(Rgb::ACCENT),
    });

    doc.push_paragraph(Paragraph::new());
}

/// Two-row table: labels on a tinted row, values below
pub fn payment_terms(doc: &mut Document, dossier: &Dossier, pricing: &PricingPolicy) {
    let mut fields = vec![(
        "ADRESSE FACTURATION",
        dossier.adresse_facturation.clone(),
    )];
    if dossier.garantie_decennale {
        fields.push(("GARANTIE", "Décennale".to_string()));
    }
    fields.push((
        "ACOMPTE DEMANDÉ",
        format!("{}% à la signature", format_percent(pricing.deposit_percent)),
    ));
    fields.push(("MODALITÉS DE PAIEMENT", "À Réception de la facture".to_string()));
    fields.push(("MOYEN DE PAIEMENT", dossier.moyen_paiement.clone()));

    let count = fields.len() as u32;
    let labels = fields
        .iter()
        .map(|(label, _)| {
            Cell::paragraph(
                Paragraph::new()
                    .run(Run::text(*label).bold().size(BODY_SIZE))
                    .align(Align::Center),
            )
            .fill(Rgb::HEADER_FILL)
        })
        .collect();
    let values = fields
        .into_iter()
        .enumerate()
        .map(|(idx, (_, value))| {
            let align = if idx == 0 { Align::Left } else { Align::Center };
            Cell::paragraph(
                Paragraph::new()
                    .run(Run::text(value).size(BODY_SIZE))
                    .align(align),
            )
        })
        .collect();

    doc.push_table(Table {
        columns: vec![CONTENT_WIDTH / count; count as usize],
        rows: vec![Row::new(labels).height(800), Row::new(values).height(1200)],
        border: Some(Rgb::BLACK),
    });
}

pub fn description(doc: &mut Document, dossier: &Dossier) {
    doc.push_paragraph(
        Paragraph::new()
            .run(Run::text("Description :").bold().underline().size(13))
            .spacing(12, 12),
    );
    doc.push_paragraph(
        Paragraph::new()
            .run(Run::text(&dossier.description).size(BODY_SIZE))
            .spacing(0, 12),
    );
}

/// Products then options. The REMISE column only appears when at least one
/// line carries a nonzero discount.
pub fn line_items(
    doc: &mut Document,
    snapshot: &DossierSnapshot<'_>,
    pricing: &PricingPolicy,
) -> Result<(), DomainError> {
    let show_discount = snapshot
        .products
        .iter()
        .chain(snapshot.options.iter())
        .any(|item| item.remise != 0.0);

    let mut headers = vec!["DÉSIGNATION", "PRIX UNITAIRE", "QUANTITÉ"];
    if show_discount {
        headers.push("REMISE");
    }
    headers.push("TOTAL");

    let first = CONTENT_WIDTH * 45 / 100;
    let rest = (CONTENT_WIDTH - first) / (headers.len() as u32 - 1);
    let mut columns = vec![first];
    columns.extend(std::iter::repeat_n(rest, headers.len() - 1));

    let header_row = Row::new(
        headers
            .iter()
            .map(|h| {
                Cell::paragraph(
                    Paragraph::new()
                        .run(Run::text(*h).bold().size(BODY_SIZE))
                        .align(Align::Center),
                )
                .fill(Rgb::HEADER_FILL)
            })
            .collect(),
    )
    .height(HEADER_ROW_HEIGHT);

    let mut rows = vec![header_row];
    for item in snapshot.products.iter().chain(snapshot.options.iter()) {
        rows.push(line_row(item, pricing, show_discount)?);
    }

    doc.push_table(Table {
        columns,
        rows,
        border: Some(Rgb::BLACK),
    });

    doc.push_paragraph(Paragraph::new());
    Ok(())
}

fn line_row(
    item: &LineItem,
    pricing: &PricingPolicy,
    show_discount: bool,
) -> Result<Row, DomainError> {
    let amounts = pricing.price_item(item)?;
    let color = if item.is_option() {
        Rgb::ACCENT
    } else {
        Rgb::BLACK
    };

    let designation = if item.is_option() {
        format!("{} (option)", item.designation)
    } else {
        item.designation.clone()
    };

    let mut texts = vec![
        (designation, Align::Left),
        (format_euros(money(item.prix)), Align::Center),
        (
            format_quantity(&item.quantity(), item.unite.as_deref()),
            Align::Center,
        ),
    ];
    if show_discount {
        texts.push((
            format_euros(money(item.remise)),
            Align::Center,
        ));
    }
    texts.push((format_euros(amounts.net), Align::Center));

    Ok(Row::new(
        texts
            .into_iter()
            .map(|(text, align)| {
                Cell::paragraph(
                    Paragraph::new()
                        .run(Run::text(text).size(BODY_SIZE).color(color))
                        .align(align),
                )
            })
            .collect(),
    )
    .height(LINE_ROW_HEIGHT))
}

/// Right-aligned bold total line. An `AVEC OPTIONS` suffix is set in red.
pub fn total_line(label: &str, with_options: bool, amount: Decimal) -> Paragraph {
    let mut paragraph = Paragraph::new().align(Align::Right);
    if with_options {
        paragraph = paragraph
            .run(Run::text(format!("{} ", label)).bold())
            .run(Run::text("AVEC OPTIONS").bold().color(Rgb::RED))
            .run(Run::text(format!(" : {}", format_euros(amount))).bold());
    } else {
        paragraph =
            paragraph.run(Run::text(format!("{} : {}", label, format_euros(amount))).bold());
    }
    paragraph
}

pub fn vat_mention(doc: &mut Document) {
    doc.push_paragraph(
        Paragraph::new()
            .run(Run::text("TVA NON APPLICABLE - Art. 293 B du CGI").size(7))
            .spacing(6, 0),
    );
}

/// Closing notice (grey, with the document word in red) followed by the
/// company's legal lines
pub fn closing(doc: &mut Document, company: &CompanyProfile, lead: &str, word: &str, rest: &str) {
    doc.push_paragraph(Paragraph::new());
    doc.push_paragraph(
        Paragraph::new()
            .run(Run::text(lead).size(8).color(Rgb::GREY))
            .run(Run::text(word).size(8).color(Rgb::RED))
            .run(Run::text(rest).size(8).color(Rgb::GREY))
            .align(Align::Center),
    );

    if !company.legal_lines.is_empty() {
        doc.push_paragraph(
            Paragraph::new()
                .run(Run::text(company.legal_lines.join("\n")).size(BODY_SIZE))
                .align(Align::Center),
        );
    }
}

/// "Page X / Y" centred at the bottom of every page
pub fn page_numbers(doc: &mut Document) {
    doc.footer.push(
        Paragraph::new()
            .run(Run::text("Page "))
            .run(Run::field(Field::Page))
            .run(Run::text(" / "))
            .run(Run::field(Field::NumPages))
            .align(Align::Center)
            .spacing(12, 0),
    );
}
