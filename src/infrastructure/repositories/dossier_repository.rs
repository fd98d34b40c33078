//! SeaORM implementation of DossierRepository

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};

use crate::domain::{
    Dossier, DossierInput, DossierRepository, DocumentKind, DomainError, LineItemInput,
};
use crate::models::dossier::{ActiveModel, Column, Entity as DossierEntity, Model};
use crate::models::dossier_option::{self, Entity as OptionEntity};
use crate::models::product::{self, Entity as ProductEntity};

use super::line_item_repository::write_line_items;

/// SeaORM-based implementation of DossierRepository
pub struct SeaOrmDossierRepository {
    db: DatabaseConnection,
}

impl SeaOrmDossierRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

impl From<Model> for Dossier {
    fn from(m: Model) -> Self {
        Self {
            id: m.id,
            numero_dossier: m.numero_dossier,
            adresse_chantier: m.adresse_chantier,
            libelle_travaux: m.libelle_travaux,
            adresse_facturation: m.adresse_facturation,
            moyen_paiement: m.moyen_paiement,
            garantie_decennale: m.garantie_decennale,
            description: m.description,
            devis_signe: m.devis_signe,
            facture_payee: m.facture_payee,
            devis_generated: m.devis_generated,
            facture_generated: m.facture_generated,
        }
    }
}

fn apply_input(active: &mut ActiveModel, input: DossierInput) {
    active.numero_dossier = Set(input.numero_dossier);
    active.adresse_chantier = Set(input.adresse_chantier);
    active.libelle_travaux = Set(input.libelle_travaux);
    active.adresse_facturation = Set(input.adresse_facturation);
    active.moyen_paiement = Set(input.moyen_paiement);
    active.garantie_decennale = Set(input.garantie_decennale);
    active.description = Set(input.description);
    active.devis_signe = Set(input.devis_signe);
    active.facture_payee = Set(input.facture_payee);
}

#[async_trait]
impl DossierRepository for SeaOrmDossierRepository {
    async fn find_all(&self) -> Result<Vec<Dossier>, DomainError> {
        let dossiers = DossierEntity::find()
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await?;

        Ok(dossiers.into_iter().map(Dossier::from).collect())
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Dossier>, DomainError> {
        let dossier = DossierEntity::find_by_id(id).one(&self.db).await?;
        Ok(dossier.map(Dossier::from))
    }

    async fn find_by_numero(&self, numero: &str) -> Result<Option<Dossier>, DomainError> {
        let dossier = DossierEntity::find()
            .filter(Column::NumeroDossier.eq(numero))
            .order_by_asc(Column::Id)
            .one(&self.db)
            .await?;
        Ok(dossier.map(Dossier::from))
    }

    async fn create(&self, input: DossierInput) -> Result<Dossier, DomainError> {
        let mut dossier = ActiveModel {
            devis_generated: Set(false),
            facture_generated: Set(false),
            ..Default::default()
        };
        apply_input(&mut dossier, input);

        let result = dossier.insert(&self.db).await?;
        tracing::info!("Created dossier {} ({})", result.id, result.numero_dossier);

        Ok(Dossier::from(result))
    }

    async fn update(&self, id: i32, input: DossierInput) -> Result<Dossier, DomainError> {
        let existing = DossierEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(DomainError::NotFound)?;

        let mut active: ActiveModel = existing.into();
        apply_input(&mut active, input);

        let result = active.update(&self.db).await?;
        Ok(Dossier::from(result))
    }

    async fn save_with_line_items(
        &self,
        id: Option<i32>,
        input: DossierInput,
        products: Vec<LineItemInput>,
        options: Vec<LineItemInput>,
    ) -> Result<Dossier, DomainError> {
        let txn = self.db.begin().await?;

        let saved = match id {
            Some(id) => {
                let existing = DossierEntity::find_by_id(id)
                    .one(&txn)
                    .await?
                    .ok_or(DomainError::NotFound)?;
                let mut active: ActiveModel = existing.into();
                apply_input(&mut active, input);
                active.update(&txn).await?
            }
            None => {
                let mut dossier = ActiveModel {
                    devis_generated: Set(false),
                    facture_generated: Set(false),
                    ..Default::default()
                };
                apply_input(&mut dossier, input);
                dossier.insert(&txn).await?
            }
        };

        // Dropping the transaction on an early return rolls it back
        write_line_items(&txn, saved.id, products, options).await?;
        txn.commit().await?;

        Ok(Dossier::from(saved))
    }

    async fn delete(&self, id: i32) -> Result<(), DomainError> {
        let txn = self.db.begin().await?;

        OptionEntity::delete_many()
            .filter(dossier_option::Column::DossierId.eq(id))
            .exec(&txn)
            .await?;
        ProductEntity::delete_many()
            .filter(product::Column::DossierId.eq(id))
            .exec(&txn)
            .await?;
        let result = DossierEntity::delete_by_id(id).exec(&txn).await?;

        if result.rows_affected == 0 {
            // Nothing to cascade from; leave the store untouched
            txn.rollback().await?;
            return Err(DomainError::NotFound);
        }

        txn.commit().await?;
        tracing::info!("Deleted dossier {} with its line items", id);
        Ok(())
    }

    async fn set_generated(
        &self,
        id: i32,
        kind: DocumentKind,
        generated: bool,
    ) -> Result<(), DomainError> {
        let existing = DossierEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(DomainError::NotFound)?;

        let mut active: ActiveModel = existing.into();
        match kind {
            DocumentKind::Quote => active.devis_generated = Set(generated),
            DocumentKind::Invoice => active.facture_generated = Set(generated),
        }
        active.update(&self.db).await?;

        Ok(())
    }
}
