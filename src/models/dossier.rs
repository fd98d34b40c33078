use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "dossiers")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub numero_dossier: String, // "YEAR/SEQ", not unique
    pub adresse_chantier: String,
    pub libelle_travaux: String,
    pub adresse_facturation: String,
    pub moyen_paiement: String,
    pub garantie_decennale: bool,
    pub description: String,
    pub devis_signe: bool,
    pub facture_payee: bool,
    pub devis_generated: bool,
    pub facture_generated: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::product::Entity")]
    Product,
    #[sea_orm(has_many = "super::dossier_option::Entity")]
    DossierOption,
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

impl Related<super::dossier_option::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DossierOption.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
