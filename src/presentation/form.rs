//! Save form: what the operator typed, validated into store inputs

use serde::{Deserialize, Deserializer};

use crate::domain::pricing::{Quantity, parse_decimal, to_store, within_bounds};
use crate::domain::{DomainError, DossierInput, LineItemInput};

pub const REQUIRED_FIELDS_MESSAGE: &str = "Veuillez remplir tous les champs obligatoires";
pub const NUMERIC_FIELDS_MESSAGE: &str =
    "Veuillez entrer des valeurs numériques valides pour les champs numériques.";

/// Unit entry meaning "no unit"
pub const NO_UNIT: &str = "aucune";
pub const UNITS: [&str; 3] = ["ml", "m²", "m³"];

/// Accept `12.5`, `"12,5"` or `""` for numeric cells
fn number_or_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Cell {
        Number(f64),
        Text(String),
    }

    Ok(match Option::<Cell>::deserialize(deserializer)? {
        Some(Cell::Number(n)) => n.to_string(),
        Some(Cell::Text(t)) => t,
        None => String::new(),
    })
}

/// One row of the product or option grid, as typed
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LineItemForm {
    pub designation: String,
    #[serde(deserialize_with = "number_or_text")]
    pub quantite: String,
    #[serde(deserialize_with = "number_or_text")]
    pub prix: String,
    #[serde(deserialize_with = "number_or_text")]
    pub remise: String,
    pub unite: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DossierForm {
    pub numero_dossier: String,
    pub adresse_chantier: String,
    pub libelle_travaux: String,
    pub adresse_facturation: String,
    pub moyen_paiement: String,
    pub garantie_decennale: bool,
    pub description: String,
    pub devis_signe: bool,
    pub facture_payee: bool,
    pub products: Vec<LineItemForm>,
    pub options: Vec<LineItemForm>,
}

/// Validated content of a save
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedDossier {
    pub dossier: DossierInput,
    pub products: Vec<LineItemInput>,
    pub options: Vec<LineItemInput>,
}

fn capitalize_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn parse_amount(raw: &str) -> Result<f64, DomainError> {
    if raw.trim().is_empty() {
        return Ok(0.0);
    }
    parse_decimal(raw)
        .filter(within_bounds)
        .map(to_store)
        .ok_or_else(|| DomainError::validation(NUMERIC_FIELDS_MESSAGE))
}

impl LineItemForm {
    /// `None` for an untouched row (no designation, no quantity, zero price)
    pub fn validate(&self) -> Result<Option<LineItemInput>, DomainError> {
        let designation = capitalize_first(self.designation.trim());
        let quantite = self.quantite.trim().to_string();
        let prix = parse_amount(&self.prix)?;
        let remise = parse_amount(&self.remise)?;

        if designation.is_empty() && quantite.is_empty() && prix == 0.0 {
            return Ok(None);
        }

        Quantity::parse(&quantite)?;

        let unit = self.unite.trim();
        let unite = if unit.is_empty() || unit == NO_UNIT {
            None
        } else {
            Some(unit.to_string())
        };

        Ok(Some(LineItemInput {
            designation,
            quantite,
            prix,
            remise,
            unite,
        }))
    }
}

impl DossierForm {
    pub fn validate(&self) -> Result<ValidatedDossier, DomainError> {
        let numero_dossier = self.numero_dossier.trim().to_string();
        let adresse_chantier = self.adresse_chantier.trim().to_string();
        if numero_dossier.is_empty() || adresse_chantier.is_empty() {
            return Err(DomainError::validation(REQUIRED_FIELDS_MESSAGE));
        }

        let products = validate_rows(&self.products)?;
        let options = validate_rows(&self.options)?;

        Ok(ValidatedDossier {
            dossier: DossierInput {
                numero_dossier,
                adresse_chantier,
                libelle_travaux: self.libelle_travaux.trim().to_string(),
                adresse_facturation: self.adresse_facturation.trim().to_string(),
                moyen_paiement: self.moyen_paiement.trim().to_string(),
                garantie_decennale: self.garantie_decennale,
                description: self.description.clone(),
                devis_signe: self.devis_signe,
                facture_payee: self.facture_payee,
            },
            products,
            options,
        })
    }
}

fn validate_rows(rows: &[LineItemForm]) -> Result<Vec<LineItemInput>, DomainError> {
    let mut out = Vec::with_capacity(rows.len());
    for row in rows {
        if let Some(input) = row.validate()? {
            out.push(input);
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(designation: &str, quantite: &str, prix: &str) -> LineItemForm {
        LineItemForm {
            designation: designation.to_string(),
            quantite: quantite.to_string(),
            prix: prix.to_string(),
            remise: String::new(),
            unite: NO_UNIT.to_string(),
        }
    }

    fn form() -> DossierForm {
        DossierForm {
            numero_dossier: "2025/4".to_string(),
            adresse_chantier: "3 rue Neuve".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn required_fields() {
        let mut f = form();
        f.adresse_chantier = "  ".to_string();
        let err = f.validate().unwrap_err();
        assert!(matches!(err, DomainError::Validation(m) if m == REQUIRED_FIELDS_MESSAGE));
    }

    #[test]
    fn rows_are_normalised() {
        let mut f = form();
        f.products = vec![
            LineItemForm {
                designation: "évacuation".to_string(),
                quantite: "2,5".to_string(),
                prix: "10,40".to_string(),
                remise: "1.5".to_string(),
                unite: "m²".to_string(),
            },
            row("", "", "0"),
        ];

        let v = f.validate().unwrap();
        assert_eq!(v.products.len(), 1);
        let p = &v.products[0];
        assert_eq!(p.designation, "Évacuation");
        assert_eq!(p.quantite, "2,5");
        assert_eq!(p.prix, 10.4);
        assert_eq!(p.remise, 1.5);
        assert_eq!(p.unite.as_deref(), Some("m²"));
    }

    #[test]
    fn no_unit_entry_maps_to_none() {
        let mut f = form();
        f.options = vec![row("Portillon", "Forfait", "200")];
        let v = f.validate().unwrap();
        assert_eq!(v.options[0].unite, None);
    }

    #[test]
    fn bad_numbers_are_rejected() {
        let mut f = form();
        f.products = vec![row("Pose", "1", "douze")];
        assert!(matches!(f.validate(), Err(DomainError::Validation(_))));

        f.products = vec![row("Pose", "beaucoup", "12")];
        assert!(matches!(f.validate(), Err(DomainError::Validation(_))));
    }

    #[test]
    fn oversized_amounts_are_rejected() {
        let mut f = form();
        f.products = vec![row("Pose", "79228162514264337593543950335", "2")];
        assert!(matches!(f.validate(), Err(DomainError::Validation(_))));

        f.products = vec![row("Pose", "1", "5000000000")];
        assert!(matches!(f.validate(), Err(DomainError::Validation(_))));

        f.products = vec![row("Pose", "1000", "999999,99")];
        assert!(f.validate().is_ok());
    }

    #[test]
    fn deserialises_numbers_and_text() {
        let json = r#"{
            "numero_dossier": "2025/4",
            "adresse_chantier": "3 rue Neuve",
            "products": [{"designation": "pose", "quantite": 3, "prix": "12,5"}]
        }"#;
        let f: DossierForm = serde_json::from_str(json).unwrap();
        assert_eq!(f.products[0].quantite, "3");
        assert_eq!(f.products[0].prix, "12,5");
        assert_eq!(f.products[0].remise, "");
    }
}
