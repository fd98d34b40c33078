use std::path::Path;

use facturation::config::sqlite_url;
use facturation::db;
use facturation::domain::{DomainError, DossierInput, LineItemInput, LineItemKind};
use facturation::infrastructure::AppState;
use facturation::infrastructure::maintenance::{self, RestoreReport, StoreStatus};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};

async fn file_state(path: &Path) -> AppState {
    let db = db::init_db(&sqlite_url(path))
        .await
        .expect("Failed to init DB");
    AppState::new(db)
}

async fn raw(db: &DatabaseConnection, sql: &str) {
    db.execute(Statement::from_string(db.get_database_backend(), sql.to_owned()))
        .await
        .expect("raw statement");
}

/// Store file laid out like a release that predates the generation flags
async fn write_legacy_store(path: &Path) {
    let db = Database::connect(sqlite_url(path)).await.unwrap();
    raw(
        &db,
        "CREATE TABLE dossiers (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            numero_dossier TEXT,
            adresse_chantier TEXT,
            libelle_travaux TEXT,
            adresse_facturation TEXT,
            moyen_paiement TEXT,
            garantie_decennale INTEGER,
            description TEXT,
            devis_signe INTEGER,
            facture_payee INTEGER
        )",
    )
    .await;
    raw(
        &db,
        "CREATE TABLE produits (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            dossier_id INTEGER,
            designation TEXT,
            quantite TEXT,
            prix REAL,
            unite TEXT
        )",
    )
    .await;
    raw(
        &db,
        "CREATE TABLE addresses (id INTEGER PRIMARY KEY AUTOINCREMENT, address TEXT)",
    )
    .await;

    raw(
        &db,
        "INSERT INTO dossiers (id, numero_dossier, adresse_chantier, libelle_travaux, devis_signe)
         VALUES (7, '2023/4', '3 chemin Vert', 'Toiture', 1)",
    )
    .await;
    raw(
        &db,
        "INSERT INTO produits (id, dossier_id, designation, quantite, prix)
         VALUES (1, 7, 'Tuiles', '40', 12), (2, 99, 'Orpheline', '1', 5.5)",
    )
    .await;
    raw(
        &db,
        "INSERT INTO addresses (id, address)
         VALUES (1, '3 chemin Vert'), (2, '3 chemin Vert'), (3, '')",
    )
    .await;
    db.close().await.unwrap();
}

#[tokio::test]
async fn test_verify_store_states() {
    let dir = tempfile::tempdir().unwrap();

    let missing = maintenance::verify_store(&dir.path().join("absent.db"))
        .await
        .unwrap();
    assert_eq!(missing, StoreStatus::Missing);

    let legacy = dir.path().join("legacy.db");
    write_legacy_store(&legacy).await;
    let StoreStatus::Incomplete(items) = maintenance::verify_store(&legacy).await.unwrap() else {
        panic!("legacy store reported complete");
    };
    assert!(items.contains(&"dossiers.devis_generated".to_string()));
    assert!(items.contains(&"produits.remise".to_string()));
    assert!(items.contains(&"options".to_string()));

    let current = dir.path().join("facturation.db");
    let state = file_state(&current).await;
    state.db().clone().close().await.unwrap();
    assert_eq!(
        maintenance::verify_store(&current).await.unwrap(),
        StoreStatus::Ready
    );
}

#[tokio::test]
async fn test_restore_from_legacy_backup() {
    let dir = tempfile::tempdir().unwrap();
    let legacy = dir.path().join("Sauvegarde_01-02-2024_09h30.db");
    write_legacy_store(&legacy).await;

    let db = db::init_db("sqlite::memory:").await.unwrap();
    let state = AppState::new(db);
    state
        .dossier_repo
        .create(DossierInput {
            numero_dossier: "2025/1".to_string(),
            adresse_chantier: "remplacé".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();

    let report = maintenance::restore(&legacy, state.db()).await.unwrap();
    assert_eq!(
        report,
        RestoreReport {
            dossiers: 1,
            products: 1,
            options: 0,
            addresses: 1,
            skipped: 3,
        }
    );

    let dossiers = state.dossier_repo.find_all().await.unwrap();
    assert_eq!(dossiers.len(), 1);
    let restored = &dossiers[0];
    assert_eq!(restored.id, 7);
    assert_eq!(restored.numero_dossier, "2023/4");
    assert!(restored.devis_signe);
    assert!(!restored.devis_generated);
    assert!(!restored.facture_generated);

    let products = state
        .line_item_repo
        .find_by_dossier(7, LineItemKind::Product)
        .await
        .unwrap();
    assert_eq!(products.len(), 1);
    assert_eq!(products[0].prix, 12.0);
    assert_eq!(products[0].remise, 0.0);
}

#[tokio::test]
async fn test_backup_then_restore_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let store = dir.path().join("facturation.db");
    let state = file_state(&store).await;

    let dossier = state
        .dossier_repo
        .create(DossierInput {
            numero_dossier: "2025/1".to_string(),
            adresse_chantier: "12 rue des Lilas".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();
    state
        .line_item_repo
        .replace_for_dossier(
            dossier.id,
            vec![LineItemInput {
                designation: "Peinture".to_string(),
                quantite: "2".to_string(),
                prix: 500.0,
                remise: 25.0,
                unite: Some("m²".to_string()),
            }],
            vec![],
        )
        .await
        .unwrap();

    let dest = dir.path().join("sauvegardes").join("copie.db");
    let bytes = maintenance::backup(state.db(), &store, &dest).await.unwrap();
    assert!(bytes > 0);
    assert_eq!(
        maintenance::verify_store(&dest).await.unwrap(),
        StoreStatus::Ready
    );

    // Lose the data, then bring it back
    state.dossier_repo.delete(dossier.id).await.unwrap();
    assert!(state.dossier_repo.find_all().await.unwrap().is_empty());

    let report = maintenance::restore(&dest, state.db()).await.unwrap();
    assert_eq!(report.dossiers, 1);
    assert_eq!(report.products, 1);

    let products = state
        .line_item_repo
        .find_by_dossier(dossier.id, LineItemKind::Product)
        .await
        .unwrap();
    assert_eq!(products[0].remise, 25.0);
    assert_eq!(products[0].unite.as_deref(), Some("m²"));
}

#[tokio::test]
async fn test_restore_rejects_foreign_files() {
    let dir = tempfile::tempdir().unwrap();
    let db = db::init_db("sqlite::memory:").await.unwrap();

    let absent = maintenance::restore(&dir.path().join("absent.db"), &db).await;
    assert!(matches!(absent, Err(DomainError::Validation(_))));

    let other = dir.path().join("autre.db");
    let source = Database::connect(sqlite_url(&other)).await.unwrap();
    raw(&source, "CREATE TABLE notes (id INTEGER PRIMARY KEY, body TEXT)").await;
    source.close().await.unwrap();

    let result = maintenance::restore(&other, &db).await;
    assert!(matches!(result, Err(DomainError::Validation(_))));
}

#[tokio::test]
async fn test_reinitialize_empties_data_dir() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("facturation.db"), b"db").unwrap();
    std::fs::write(dir.path().join("facturation.db-wal"), b"wal").unwrap();

    let removed = maintenance::reinitialize(dir.path()).await.unwrap();
    assert_eq!(removed.len(), 2);
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);

    let none = maintenance::reinitialize(&dir.path().join("absent"))
        .await
        .unwrap();
    assert!(none.is_empty());
}
