use crate::models::{address, dossier, dossier_option, product};
use sea_orm::*;

/// Populate an empty store with a few demo dossiers. Does nothing when the
/// store already holds dossiers.
pub async fn seed_demo_data(db: &DatabaseConnection) -> Result<(), DbErr> {
    if dossier::Entity::find().count(db).await? > 0 {
        tracing::info!("Store is not empty, skipping demo data");
        return Ok(());
    }

    let txn = db.begin().await?;

    // 1. Address pool
    let addresses = vec![
        "12 rue des Lilas, 33000 Bordeaux",
        "4 impasse du Moulin, 33600 Pessac",
        "27 avenue Thiers, 33100 Bordeaux",
    ];

    for text in &addresses {
        let row = address::ActiveModel {
            address: Set(text.to_string()),
            ..Default::default()
        };
        address::Entity::insert(row)
            .on_conflict(
                sea_orm::sea_query::OnConflict::column(address::Column::Address)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&txn)
            .await?;
    }

    // 2. Dossiers: (numero, site, label, signed, paid)
    let dossiers = vec![
        ("2024/1", addresses[0], "Rénovation salle de bain", true, true),
        ("2024/2", addresses[1], "Pose de clôture", true, false),
        ("2025/1", addresses[2], "Peinture intérieure", false, false),
    ];

    for (numero, site, label, signed, paid) in dossiers {
        let row = dossier::ActiveModel {
            numero_dossier: Set(numero.to_owned()),
            adresse_chantier: Set(site.to_owned()),
            libelle_travaux: Set(label.to_owned()),
            adresse_facturation: Set(site.to_owned()),
            moyen_paiement: Set("Virement bancaire".to_owned()),
            garantie_decennale: Set(false),
            description: Set(String::new()),
            devis_signe: Set(signed),
            facture_payee: Set(paid),
            devis_generated: Set(false),
            facture_generated: Set(false),
            ..Default::default()
        };
        let dossier_id = dossier::Entity::insert(row).exec(&txn).await?.last_insert_id;

        // 3. Line items: (designation, quantity, price, discount, unit)
        let products = vec![
            ("Dépose de l'existant", "Forfait", 350.0, 0.0, None),
            ("Fourniture et pose", "12,5", 42.0, 25.0, Some("m²")),
        ];
        for (designation, quantite, prix, remise, unite) in products {
            let row = product::ActiveModel {
                dossier_id: Set(dossier_id),
                designation: Set(designation.to_owned()),
                quantite: Set(quantite.to_owned()),
                prix: Set(prix),
                remise: Set(remise),
                unite: Set(unite.map(str::to_owned)),
                ..Default::default()
            };
            product::Entity::insert(row).exec(&txn).await?;
        }

        if !signed {
            let row = dossier_option::ActiveModel {
                dossier_id: Set(dossier_id),
                designation: Set("Évacuation des gravats".to_owned()),
                quantite: Set("Ensemble".to_owned()),
                prix: Set(120.0),
                remise: Set(0.0),
                unite: Set(None),
                ..Default::default()
            };
            dossier_option::Entity::insert(row).exec(&txn).await?;
        }
    }

    txn.commit().await?;
    Ok(())
}
