//! Store maintenance: schema check, reinitialisation, backup and restore
//!
//! Backups are plain copies of the SQLite file. Restore reads the backup
//! through its own read-only connection and transfers rows one by one, so a
//! backup taken before a schema change still loads.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, TimeZone};
use sea_orm::{
    ConnectionTrait, Database, DatabaseConnection, DbErr, EntityTrait, QueryResult, Set,
    Statement, TransactionTrait, Value,
};
use serde::Serialize;

use crate::domain::DomainError;
use crate::infrastructure::db::missing_schema_items;
use crate::models::{address, dossier, dossier_option, product};

/// Outcome of a schema check on the store file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum StoreStatus {
    /// No store file yet
    Missing,
    /// Tables or columns absent, listed as `table` or `table.column`
    Incomplete(Vec<String>),
    Ready,
}

/// Rows transferred by [`restore`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RestoreReport {
    pub dossiers: usize,
    pub products: usize,
    pub options: usize,
    pub addresses: usize,
    /// Children pointing at a missing dossier and duplicate addresses
    pub skipped: usize,
}

pub async fn verify_store(path: &Path) -> Result<StoreStatus, DomainError> {
    if !path.exists() {
        return Ok(StoreStatus::Missing);
    }

    let db = open_read_only(path).await?;
    let missing = missing_schema_items(&db).await?;
    db.close().await?;

    if missing.is_empty() {
        Ok(StoreStatus::Ready)
    } else {
        tracing::warn!("Store {} is missing {:?}", path.display(), missing);
        Ok(StoreStatus::Incomplete(missing))
    }
}

/// Delete every file of the data directory. The connection to the store must
/// be closed first. A file that cannot be removed is retried once after
/// 500 ms (Windows keeps handles open for a short while).
pub async fn reinitialize(data_dir: &Path) -> Result<Vec<PathBuf>, DomainError> {
    let mut removed = Vec::new();

    if !data_dir.exists() {
        return Ok(removed);
    }

    for entry in std::fs::read_dir(data_dir)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }

        if let Err(first) = tokio::fs::remove_file(&path).await {
            tracing::warn!("Could not delete {}: {}, retrying", path.display(), first);
            tokio::time::sleep(Duration::from_millis(500)).await;
            tokio::fs::remove_file(&path).await.map_err(|e| {
                DomainError::Io(format!("Impossible de supprimer {} : {}", path.display(), e))
            })?;
        }

        tracing::info!("Deleted {}", path.display());
        removed.push(path);
    }

    Ok(removed)
}

/// Default file name offered for a backup, e.g. `Sauvegarde_05-03-2025_14h07.db`
pub fn default_backup_name<Tz: TimeZone>(now: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    now.format("Sauvegarde_%d-%m-%Y_%Hh%M.db").to_string()
}

/// Copy the store file to `dest`. Pending WAL pages are folded into the main
/// file first so the copy is self-contained.
pub async fn backup(
    db: &DatabaseConnection,
    store_path: &Path,
    dest: &Path,
) -> Result<u64, DomainError> {
    db.execute(Statement::from_string(
        db.get_database_backend(),
        "PRAGMA wal_checkpoint(TRUNCATE)".to_owned(),
    ))
    .await?;

    if let Some(parent) = dest.parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent).await?;
    }

    let bytes = tokio::fs::copy(store_path, dest).await?;
    tracing::info!("Backed up {} to {} ({} bytes)", store_path.display(), dest.display(), bytes);
    Ok(bytes)
}

/// Replace the content of `db` with the rows of the backup at `backup_path`.
///
/// Everything happens in one transaction: the current rows are deleted and
/// the backup rows inserted with their original ids. Generation flags absent
/// from older backups are loaded as 0.
pub async fn restore(
    backup_path: &Path,
    db: &DatabaseConnection,
) -> Result<RestoreReport, DomainError> {
    if !backup_path.is_file() {
        return Err(DomainError::validation(format!(
            "Fichier de sauvegarde introuvable : {}",
            backup_path.display()
        )));
    }

    let source = open_read_only(backup_path).await?;
    let Some(dossiers) = fetch_table(&source, "dossiers").await? else {
        source.close().await?;
        return Err(DomainError::validation(
            "Ce fichier n'est pas une sauvegarde valide (table dossiers absente)",
        ));
    };
    let products = fetch_table(&source, "produits").await?.unwrap_or_default();
    let options = fetch_table(&source, "options").await?.unwrap_or_default();
    let addresses = fetch_table(&source, "addresses").await?.unwrap_or_default();
    source.close().await?;

    let mut report = RestoreReport::default();
    let txn = db.begin().await?;

    dossier_option::Entity::delete_many().exec(&txn).await?;
    product::Entity::delete_many().exec(&txn).await?;
    dossier::Entity::delete_many().exec(&txn).await?;
    address::Entity::delete_many().exec(&txn).await?;

    let mut dossier_ids = HashSet::new();
    for row in &dossiers {
        let id = int(row, "id");
        let model = dossier::ActiveModel {
            id: Set(id),
            numero_dossier: Set(text(row, "numero_dossier")),
            adresse_chantier: Set(text(row, "adresse_chantier")),
            libelle_travaux: Set(text(row, "libelle_travaux")),
            adresse_facturation: Set(text(row, "adresse_facturation")),
            moyen_paiement: Set(text(row, "moyen_paiement")),
            garantie_decennale: Set(flag(row, "garantie_decennale")),
            description: Set(text(row, "description")),
            devis_signe: Set(flag(row, "devis_signe")),
            facture_payee: Set(flag(row, "facture_payee")),
            devis_generated: Set(flag(row, "devis_generated")),
            facture_generated: Set(flag(row, "facture_generated")),
        };
        dossier::Entity::insert(model).exec(&txn).await?;
        dossier_ids.insert(id);
        report.dossiers += 1;
    }

    for row in &products {
        let dossier_id = int(row, "dossier_id");
        if !dossier_ids.contains(&dossier_id) {
            report.skipped += 1;
            continue;
        }
        let model = product::ActiveModel {
            id: Set(int(row, "id")),
            dossier_id: Set(dossier_id),
            designation: Set(text(row, "designation")),
            quantite: Set(text(row, "quantite")),
            prix: Set(real(row, "prix")),
            remise: Set(real(row, "remise")),
            unite: Set(optional_text(row, "unite")),
        };
        product::Entity::insert(model).exec(&txn).await?;
        report.products += 1;
    }

    for row in &options {
        let dossier_id = int(row, "dossier_id");
        if !dossier_ids.contains(&dossier_id) {
            report.skipped += 1;
            continue;
        }
        let model = dossier_option::ActiveModel {
            id: Set(int(row, "id")),
            dossier_id: Set(dossier_id),
            designation: Set(text(row, "designation")),
            quantite: Set(text(row, "quantite")),
            prix: Set(real(row, "prix")),
            remise: Set(real(row, "remise")),
            unite: Set(optional_text(row, "unite")),
        };
        dossier_option::Entity::insert(model).exec(&txn).await?;
        report.options += 1;
    }

    let mut seen = HashSet::new();
    for row in &addresses {
        let value = text(row, "address");
        if value.trim().is_empty() || !seen.insert(value.clone()) {
            report.skipped += 1;
            continue;
        }
        let model = address::ActiveModel {
            id: Set(int(row, "id")),
            address: Set(value),
        };
        address::Entity::insert(model).exec(&txn).await?;
        report.addresses += 1;
    }

    txn.commit().await?;

    tracing::info!(
        "Restored {} dossiers, {} products, {} options, {} addresses ({} skipped) from {}",
        report.dossiers,
        report.products,
        report.options,
        report.addresses,
        report.skipped,
        backup_path.display()
    );
    Ok(report)
}

async fn open_read_only(path: &Path) -> Result<DatabaseConnection, DbErr> {
    Database::connect(format!("sqlite://{}?mode=ro", path.display())).await
}

/// `None` when the table does not exist in the source file
async fn fetch_table(
    source: &DatabaseConnection,
    table: &str,
) -> Result<Option<Vec<QueryResult>>, DbErr> {
    let backend = source.get_database_backend();
    let exists = source
        .query_one(Statement::from_sql_and_values(
            backend,
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?",
            [Value::from(table)],
        ))
        .await?
        .is_some();

    if !exists {
        return Ok(None);
    }

    let rows = source
        .query_all(Statement::from_string(
            backend,
            format!("SELECT * FROM {} ORDER BY id", table),
        ))
        .await?;
    Ok(Some(rows))
}

fn int(row: &QueryResult, column: &str) -> i32 {
    row.try_get::<Option<i64>>("", column)
        .ok()
        .flatten()
        .and_then(|v| i32::try_from(v).ok())
        .unwrap_or_default()
}

fn flag(row: &QueryResult, column: &str) -> bool {
    row.try_get::<Option<i64>>("", column)
        .ok()
        .flatten()
        .is_some_and(|v| v != 0)
}

fn real(row: &QueryResult, column: &str) -> f64 {
    match row.try_get::<Option<f64>>("", column) {
        Ok(v) => v.unwrap_or_default(),
        // Values typed in as whole numbers may come back as INTEGER
        Err(_) => row
            .try_get::<Option<i64>>("", column)
            .ok()
            .flatten()
            .map(|v| v as f64)
            .unwrap_or_default(),
    }
}

fn text(row: &QueryResult, column: &str) -> String {
    optional_text(row, column).unwrap_or_default()
}

fn optional_text(row: &QueryResult, column: &str) -> Option<String> {
    row.try_get::<Option<String>>("", column).ok().flatten()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};

    #[test]
    fn backup_name_uses_day_first_and_hour_marker() {
        let at = NaiveDate::from_ymd_opt(2025, 3, 5)
            .and_then(|d| d.and_hms_opt(14, 7, 0))
            .map(|dt| Utc.from_utc_datetime(&dt))
            .unwrap();
        assert_eq!(default_backup_name(&at), "Sauvegarde_05-03-2025_14h07.db");
    }
}
