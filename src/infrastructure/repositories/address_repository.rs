//! SeaORM implementation of AddressRepository

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

use crate::domain::{Address, AddressRepository, DomainError};
use crate::models::address::{ActiveModel, Column, Entity as AddressEntity, Model};

/// SeaORM-based implementation of AddressRepository
pub struct SeaOrmAddressRepository {
    db: DatabaseConnection,
}

impl SeaOrmAddressRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn find_exact(&self, address: &str) -> Result<Option<Model>, DomainError> {
        Ok(AddressEntity::find()
            .filter(Column::Address.eq(address))
            .one(&self.db)
            .await?)
    }
}

impl From<Model> for Address {
    fn from(m: Model) -> Self {
        Self {
            id: m.id,
            address: m.address,
        }
    }
}

fn duplicate(address: &str) -> DomainError {
    DomainError::Conflict(format!(
        "Cette adresse existe déjà dans la base de données : {}",
        address
    ))
}

#[async_trait]
impl AddressRepository for SeaOrmAddressRepository {
    async fn find_all(&self) -> Result<Vec<Address>, DomainError> {
        let addresses = AddressEntity::find()
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await?;

        Ok(addresses.into_iter().map(Address::from).collect())
    }

    async fn create(&self, address: String) -> Result<Address, DomainError> {
        if self.find_exact(&address).await?.is_some() {
            return Err(duplicate(&address));
        }

        let new_address = ActiveModel {
            address: Set(address),
            ..Default::default()
        };

        // The UNIQUE constraint still guards against a concurrent writer
        let result = new_address.insert(&self.db).await?;
        Ok(Address::from(result))
    }

    async fn rename(&self, old: &str, new: String) -> Result<Address, DomainError> {
        let existing = self.find_exact(old).await?.ok_or(DomainError::NotFound)?;

        if new != old && self.find_exact(&new).await?.is_some() {
            return Err(duplicate(&new));
        }

        let mut active: ActiveModel = existing.into();
        active.address = Set(new);

        let result = active.update(&self.db).await?;
        Ok(Address::from(result))
    }

    async fn delete(&self, address: &str) -> Result<(), DomainError> {
        let result = AddressEntity::delete_many()
            .filter(Column::Address.eq(address))
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(DomainError::NotFound);
        }

        Ok(())
    }
}
