//! SeaORM implementation of LineItemRepository
//!
//! Products (`produits`) and options (`options`) share one shape; each kind
//! is routed to its own entity.

use async_trait::async_trait;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};

use crate::domain::{DomainError, LineItem, LineItemInput, LineItemKind, LineItemRepository};
use crate::models::dossier_option::{self, Entity as OptionEntity};
use crate::models::product::{self, Entity as ProductEntity};

/// SeaORM-based implementation of LineItemRepository
pub struct SeaOrmLineItemRepository {
    db: DatabaseConnection,
}

impl SeaOrmLineItemRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

impl From<product::Model> for LineItem {
    fn from(p: product::Model) -> Self {
        Self {
            id: p.id,
            dossier_id: p.dossier_id,
            kind: LineItemKind::Product,
            designation: p.designation,
            quantite: p.quantite,
            prix: p.prix,
            remise: p.remise,
            unite: p.unite,
        }
    }
}

impl From<dossier_option::Model> for LineItem {
    fn from(o: dossier_option::Model) -> Self {
        Self {
            id: o.id,
            dossier_id: o.dossier_id,
            kind: LineItemKind::Option,
            designation: o.designation,
            quantite: o.quantite,
            prix: o.prix,
            remise: o.remise,
            unite: o.unite,
        }
    }
}

/// Delete every product and option of the dossier, then insert the given sets
/// on `conn`. Callers own the surrounding transaction.
pub(crate) async fn write_line_items<C: ConnectionTrait>(
    conn: &C,
    dossier_id: i32,
    products: Vec<LineItemInput>,
    options: Vec<LineItemInput>,
) -> Result<(), DomainError> {
    ProductEntity::delete_many()
        .filter(product::Column::DossierId.eq(dossier_id))
        .exec(conn)
        .await?;
    OptionEntity::delete_many()
        .filter(dossier_option::Column::DossierId.eq(dossier_id))
        .exec(conn)
        .await?;

    // insert_many with an empty set is an error in SeaORM, so insert row by row
    for input in products {
        let row = product::ActiveModel {
            dossier_id: Set(dossier_id),
            designation: Set(input.designation),
            quantite: Set(input.quantite),
            prix: Set(input.prix),
            remise: Set(input.remise),
            unite: Set(input.unite),
            ..Default::default()
        };
        ProductEntity::insert(row).exec(conn).await?;
    }

    for input in options {
        let row = dossier_option::ActiveModel {
            dossier_id: Set(dossier_id),
            designation: Set(input.designation),
            quantite: Set(input.quantite),
            prix: Set(input.prix),
            remise: Set(input.remise),
            unite: Set(input.unite),
            ..Default::default()
        };
        OptionEntity::insert(row).exec(conn).await?;
    }

    Ok(())
}

#[async_trait]
impl LineItemRepository for SeaOrmLineItemRepository {
    async fn find_by_dossier(
        &self,
        dossier_id: i32,
        kind: LineItemKind,
    ) -> Result<Vec<LineItem>, DomainError> {
        let items: Vec<LineItem> = match kind {
            LineItemKind::Product => ProductEntity::find()
                .filter(product::Column::DossierId.eq(dossier_id))
                .order_by_asc(product::Column::Id)
                .all(&self.db)
                .await?
                .into_iter()
                .map(LineItem::from)
                .collect(),
            LineItemKind::Option => OptionEntity::find()
                .filter(dossier_option::Column::DossierId.eq(dossier_id))
                .order_by_asc(dossier_option::Column::Id)
                .all(&self.db)
                .await?
                .into_iter()
                .map(LineItem::from)
                .collect(),
        };

        Ok(items)
    }

    async fn replace_for_dossier(
        &self,
        dossier_id: i32,
        products: Vec<LineItemInput>,
        options: Vec<LineItemInput>,
    ) -> Result<(), DomainError> {
        let product_count = products.len();
        let option_count = options.len();

        let txn = self.db.begin().await?;
        write_line_items(&txn, dossier_id, products, options).await?;
        txn.commit().await?;

        tracing::debug!(
            "Replaced line items of dossier {}: {} products, {} options",
            dossier_id,
            product_count,
            option_count
        );
        Ok(())
    }
}
