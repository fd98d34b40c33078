use sea_orm::{ConnectionTrait, Database, DatabaseConnection, DbErr, Statement};

/// Columns every table must expose for the current schema
pub const EXPECTED_SCHEMA: &[(&str, &[&str])] = &[
    (
        "dossiers",
        &[
            "id",
            "numero_dossier",
            "adresse_chantier",
            "libelle_travaux",
            "adresse_facturation",
            "moyen_paiement",
            "garantie_decennale",
            "description",
            "devis_signe",
            "facture_payee",
            "devis_generated",
            "facture_generated",
        ],
    ),
    (
        "produits",
        &["id", "dossier_id", "designation", "quantite", "prix", "remise", "unite"],
    ),
    (
        "options",
        &["id", "dossier_id", "designation", "quantite", "prix", "remise", "unite"],
    ),
    ("addresses", &["id", "address"]),
];

pub async fn init_db(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    let db = Database::connect(database_url).await?;

    // Run migrations manually (simple SQL)
    run_migrations(&db).await?;

    Ok(db)
}

pub async fn run_migrations(db: &DatabaseConnection) -> Result<(), DbErr> {
    db.execute(Statement::from_string(
        db.get_database_backend(),
        r#"
        CREATE TABLE IF NOT EXISTS dossiers (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            numero_dossier TEXT NOT NULL DEFAULT '',
            adresse_chantier TEXT NOT NULL DEFAULT '',
            libelle_travaux TEXT NOT NULL DEFAULT '',
            adresse_facturation TEXT NOT NULL DEFAULT '',
            moyen_paiement TEXT NOT NULL DEFAULT '',
            garantie_decennale INTEGER NOT NULL DEFAULT 0,
            description TEXT NOT NULL DEFAULT '',
            devis_signe INTEGER NOT NULL DEFAULT 0,
            facture_payee INTEGER NOT NULL DEFAULT 0,
            devis_generated INTEGER NOT NULL DEFAULT 0,
            facture_generated INTEGER NOT NULL DEFAULT 0
        )
        "#
        .to_owned(),
    ))
    .await?;

    // Generation flags arrived after the first release.
    // SQLite has no ADD COLUMN IF NOT EXISTS, so errors are ignored.
    let _ = db
        .execute(Statement::from_string(
            db.get_database_backend(),
            "ALTER TABLE dossiers ADD COLUMN devis_generated INTEGER NOT NULL DEFAULT 0"
                .to_owned(),
        ))
        .await;
    let _ = db
        .execute(Statement::from_string(
            db.get_database_backend(),
            "ALTER TABLE dossiers ADD COLUMN facture_generated INTEGER NOT NULL DEFAULT 0"
                .to_owned(),
        ))
        .await;

    db.execute(Statement::from_string(
        db.get_database_backend(),
        r#"
        CREATE TABLE IF NOT EXISTS produits (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            dossier_id INTEGER NOT NULL,
            designation TEXT NOT NULL DEFAULT '',
            quantite TEXT NOT NULL DEFAULT '',
            prix REAL NOT NULL DEFAULT 0,
            remise REAL NOT NULL DEFAULT 0,
            unite TEXT,
            FOREIGN KEY (dossier_id) REFERENCES dossiers(id)
        )
        "#
        .to_owned(),
    ))
    .await?;

    db.execute(Statement::from_string(
        db.get_database_backend(),
        r#"
        CREATE TABLE IF NOT EXISTS options (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            dossier_id INTEGER NOT NULL,
            designation TEXT NOT NULL DEFAULT '',
            quantite TEXT NOT NULL DEFAULT '',
            prix REAL NOT NULL DEFAULT 0,
            remise REAL NOT NULL DEFAULT 0,
            unite TEXT,
            FOREIGN KEY (dossier_id) REFERENCES dossiers(id)
        )
        "#
        .to_owned(),
    ))
    .await?;

    db.execute(Statement::from_string(
        db.get_database_backend(),
        r#"
        CREATE TABLE IF NOT EXISTS addresses (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            address TEXT NOT NULL UNIQUE
        )
        "#
        .to_owned(),
    ))
    .await?;

    tracing::debug!("Schema is up to date");
    Ok(())
}

/// Missing tables and columns, compared with [`EXPECTED_SCHEMA`]
pub async fn missing_schema_items(db: &DatabaseConnection) -> Result<Vec<String>, DbErr> {
    let mut missing = Vec::new();

    for (table, columns) in EXPECTED_SCHEMA {
        let rows = db
            .query_all(Statement::from_string(
                db.get_database_backend(),
                format!("PRAGMA table_info({})", table),
            ))
            .await?;

        if rows.is_empty() {
            missing.push(table.to_string());
            continue;
        }

        let existing: Vec<String> = rows
            .iter()
            .filter_map(|row| row.try_get::<String>("", "name").ok())
            .collect();

        for column in columns.iter() {
            if !existing.iter().any(|c| c == column) {
                missing.push(format!("{}.{}", table, column));
            }
        }
    }

    Ok(missing)
}
