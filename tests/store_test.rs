use facturation::db;
use facturation::domain::{
    DocumentKind, DomainError, DossierInput, LineItemInput, LineItemKind,
};
use facturation::infrastructure::AppState;
use facturation::models::{dossier_option, product};
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};

// Helper to create a test database
async fn setup_test_state() -> AppState {
    // In-memory SQLite for testing
    let db = db::init_db("sqlite::memory:")
        .await
        .expect("Failed to init DB");
    AppState::new(db)
}

fn dossier_input(numero: &str) -> DossierInput {
    DossierInput {
        numero_dossier: numero.to_string(),
        adresse_chantier: "12 rue des Lilas".to_string(),
        libelle_travaux: "Peinture".to_string(),
        ..Default::default()
    }
}

fn line(designation: &str, quantite: &str, prix: f64) -> LineItemInput {
    LineItemInput {
        designation: designation.to_string(),
        quantite: quantite.to_string(),
        prix,
        remise: 0.0,
        unite: None,
    }
}

#[tokio::test]
async fn test_dossier_crud() {
    let state = setup_test_state().await;

    // 1. Create
    let created = state
        .dossier_repo
        .create(dossier_input("2025/1"))
        .await
        .expect("Failed to create dossier");
    assert_eq!(created.numero_dossier, "2025/1");
    assert!(!created.devis_generated);
    assert!(!created.facture_generated);

    // 2. Read back
    let found = state
        .dossier_repo
        .find_by_numero("2025/1")
        .await
        .unwrap()
        .expect("Dossier not found");
    assert_eq!(found, created);

    // 3. Update replaces every editable field
    let mut input = dossier_input("2025/1");
    input.libelle_travaux = "Carrelage".to_string();
    input.devis_signe = true;
    let updated = state.dossier_repo.update(created.id, input).await.unwrap();
    assert_eq!(updated.libelle_travaux, "Carrelage");
    assert!(updated.devis_signe);
    assert_eq!(state.dossier_repo.find_all().await.unwrap().len(), 1);

    // 4. Delete
    state.dossier_repo.delete(created.id).await.unwrap();
    assert!(state.dossier_repo.find_by_id(created.id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_update_and_delete_unknown_dossier() {
    let state = setup_test_state().await;

    let update = state.dossier_repo.update(42, dossier_input("2025/1")).await;
    assert!(matches!(update, Err(DomainError::NotFound)));

    let delete = state.dossier_repo.delete(42).await;
    assert!(matches!(delete, Err(DomainError::NotFound)));
}

#[tokio::test]
async fn test_generation_flags_are_independent() {
    let state = setup_test_state().await;
    let dossier = state.dossier_repo.create(dossier_input("2025/1")).await.unwrap();

    state
        .dossier_repo
        .set_generated(dossier.id, DocumentKind::Quote, true)
        .await
        .unwrap();

    let reloaded = state.dossier_repo.find_by_id(dossier.id).await.unwrap().unwrap();
    assert!(reloaded.devis_generated);
    assert!(!reloaded.facture_generated);

    // A later save keeps the flag
    state
        .dossier_repo
        .update(dossier.id, dossier_input("2025/1"))
        .await
        .unwrap();
    let reloaded = state.dossier_repo.find_by_id(dossier.id).await.unwrap().unwrap();
    assert!(reloaded.devis_generated);
}

#[tokio::test]
async fn test_replace_line_items() {
    let state = setup_test_state().await;
    let dossier = state.dossier_repo.create(dossier_input("2025/1")).await.unwrap();

    state
        .line_item_repo
        .replace_for_dossier(
            dossier.id,
            vec![line("Peinture", "2", 500.0), line("Forfait", "forfait", 80.0)],
            vec![line("Vernis", "1", 120.0)],
        )
        .await
        .unwrap();

    let products = state
        .line_item_repo
        .find_by_dossier(dossier.id, LineItemKind::Product)
        .await
        .unwrap();
    assert_eq!(products.len(), 2);
    assert_eq!(products[0].designation, "Peinture");
    assert_eq!(products[1].quantite, "forfait");
    assert!(products.iter().all(|p| p.kind == LineItemKind::Product));

    let options = state
        .line_item_repo
        .find_by_dossier(dossier.id, LineItemKind::Option)
        .await
        .unwrap();
    assert_eq!(options.len(), 1);
    assert!(options[0].is_option());

    // Second replace drops the previous rows
    state
        .line_item_repo
        .replace_for_dossier(dossier.id, vec![line("Enduit", "3", 10.0)], vec![])
        .await
        .unwrap();

    let products = state
        .line_item_repo
        .find_by_dossier(dossier.id, LineItemKind::Product)
        .await
        .unwrap();
    assert_eq!(products.len(), 1);
    assert_eq!(products[0].designation, "Enduit");
    assert!(
        state
            .line_item_repo
            .find_by_dossier(dossier.id, LineItemKind::Option)
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn test_replace_with_empty_sets_only_touches_one_dossier() {
    let state = setup_test_state().await;
    let first = state.dossier_repo.create(dossier_input("2025/1")).await.unwrap();
    let second = state.dossier_repo.create(dossier_input("2025/2")).await.unwrap();

    for id in [first.id, second.id] {
        state
            .line_item_repo
            .replace_for_dossier(id, vec![line("Peinture", "1", 100.0)], vec![line("Vernis", "1", 10.0)])
            .await
            .unwrap();
    }

    state
        .line_item_repo
        .replace_for_dossier(first.id, vec![], vec![])
        .await
        .unwrap();

    let first_products = state
        .line_item_repo
        .find_by_dossier(first.id, LineItemKind::Product)
        .await
        .unwrap();
    assert!(first_products.is_empty());

    let second_products = state
        .line_item_repo
        .find_by_dossier(second.id, LineItemKind::Product)
        .await
        .unwrap();
    let second_options = state
        .line_item_repo
        .find_by_dossier(second.id, LineItemKind::Option)
        .await
        .unwrap();
    assert_eq!(second_products.len(), 1);
    assert_eq!(second_options.len(), 1);
}

async fn count_children(state: &AppState, dossier_id: i32) -> (u64, u64) {
    let products = product::Entity::find()
        .filter(product::Column::DossierId.eq(dossier_id))
        .count(state.db())
        .await
        .unwrap();
    let options = dossier_option::Entity::find()
        .filter(dossier_option::Column::DossierId.eq(dossier_id))
        .count(state.db())
        .await
        .unwrap();
    (products, options)
}

#[tokio::test]
async fn test_delete_removes_only_its_children() {
    let state = setup_test_state().await;
    let doomed = state.dossier_repo.create(dossier_input("2025/1")).await.unwrap();
    let neighbour = state.dossier_repo.create(dossier_input("2025/2")).await.unwrap();

    for id in [doomed.id, neighbour.id] {
        state
            .line_item_repo
            .replace_for_dossier(
                id,
                vec![line("Peinture", "1", 100.0), line("Enduit", "2", 15.0)],
                vec![line("Vernis", "1", 10.0)],
            )
            .await
            .unwrap();
    }

    state.dossier_repo.delete(doomed.id).await.unwrap();

    assert_eq!(count_children(&state, doomed.id).await, (0, 0));
    assert_eq!(count_children(&state, neighbour.id).await, (2, 1));
    assert!(
        state
            .dossier_repo
            .find_by_id(neighbour.id)
            .await
            .unwrap()
            .is_some()
    );
}

#[tokio::test]
async fn test_schema_is_complete_after_init() {
    let state = setup_test_state().await;
    let missing = db::missing_schema_items(state.db()).await.unwrap();
    assert!(missing.is_empty(), "missing: {:?}", missing);
}

#[tokio::test]
async fn test_seed_runs_once() {
    let state = setup_test_state().await;

    facturation::seed::seed_demo_data(state.db()).await.unwrap();
    let seeded = state.dossier_repo.find_all().await.unwrap();
    assert_eq!(seeded.len(), 3);
    assert_eq!(state.address_repo.find_all().await.unwrap().len(), 3);

    facturation::seed::seed_demo_data(state.db()).await.unwrap();
    assert_eq!(state.dossier_repo.find_all().await.unwrap().len(), 3);
}
