use facturation::db;
use facturation::domain::{DomainError, DossierInput, PricingPolicy};
use facturation::infrastructure::AppState;
use facturation::presentation::form::NO_UNIT;
use facturation::presentation::{DossierForm, EditSession, LineItemForm, Mode, Transition};
use facturation::services::{dossier_service, listing_service};
use sea_orm::{ConnectionTrait, Statement};

async fn setup_test_state() -> AppState {
    let db = db::init_db("sqlite::memory:")
        .await
        .expect("Failed to init DB");
    AppState::new(db)
}

fn row(designation: &str, quantite: &str, prix: &str) -> LineItemForm {
    LineItemForm {
        designation: designation.to_string(),
        quantite: quantite.to_string(),
        prix: prix.to_string(),
        remise: String::new(),
        unite: NO_UNIT.to_string(),
    }
}

fn form(numero: &str) -> DossierForm {
    DossierForm {
        numero_dossier: numero.to_string(),
        adresse_chantier: "12 rue des Lilas".to_string(),
        libelle_travaux: "Peinture".to_string(),
        products: vec![row("peinture murale", "2", "500"), row("", "", "")],
        options: vec![row("vernis", "1", "120,5")],
        ..Default::default()
    }
}

#[tokio::test]
async fn test_save_new_dossier() {
    let state = setup_test_state().await;
    let mut session = EditSession::new();
    assert_eq!(session.start_new(false), Transition::Done);
    session.mark_dirty();

    let saved = dossier_service::save_dossier(&state, &mut session, &form("2025/1"))
        .await
        .unwrap();

    assert_eq!(session.mode(), Mode::View);
    assert_eq!(session.current_dossier(), Some(saved.id));
    assert!(!session.has_unsaved_changes());

    let detail = dossier_service::load_detail(&state, saved.id).await.unwrap();
    // Untouched rows are dropped, designations capitalised
    assert_eq!(detail.products.len(), 1);
    assert_eq!(detail.products[0].designation, "Peinture murale");
    assert_eq!(detail.products[0].unite, None);
    assert_eq!(detail.options.len(), 1);
    assert_eq!(detail.options[0].prix, 120.5);
}

#[tokio::test]
async fn test_save_existing_dossier_updates_in_place() {
    let state = setup_test_state().await;
    let mut session = EditSession::new();
    session.start_new(false);
    let saved = dossier_service::save_dossier(&state, &mut session, &form("2025/1"))
        .await
        .unwrap();

    session.begin_edit().unwrap();
    let mut edited = form("2025/1");
    edited.libelle_travaux = "Carrelage".to_string();
    edited.options.clear();
    let updated = dossier_service::save_dossier(&state, &mut session, &edited)
        .await
        .unwrap();

    assert_eq!(updated.id, saved.id);
    let detail = dossier_service::load_detail(&state, saved.id).await.unwrap();
    assert_eq!(detail.dossier.libelle_travaux, "Carrelage");
    assert!(detail.options.is_empty());
    assert_eq!(state.dossier_repo.find_all().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_invalid_form_writes_nothing() {
    let state = setup_test_state().await;
    let mut session = EditSession::new();
    session.start_new(false);

    let mut missing = form("2025/1");
    missing.adresse_chantier = "  ".to_string();
    let result = dossier_service::save_dossier(&state, &mut session, &missing).await;
    assert!(matches!(result, Err(DomainError::Validation(_))));

    let mut bad_quantity = form("2025/1");
    bad_quantity.products = vec![row("Peinture", "deux", "500")];
    let result = dossier_service::save_dossier(&state, &mut session, &bad_quantity).await;
    assert!(matches!(result, Err(DomainError::Validation(_))));

    // Still editing, nothing stored
    assert!(session.is_editing());
    assert!(state.dossier_repo.find_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_failed_line_item_write_leaves_no_dossier() {
    let state = setup_test_state().await;
    let backend = state.db().get_database_backend();
    state
        .db()
        .execute(Statement::from_string(
            backend,
            "CREATE TRIGGER reject_products BEFORE INSERT ON produits \
             BEGIN SELECT RAISE(ABORT, 'disk full'); END"
                .to_string(),
        ))
        .await
        .unwrap();

    let mut session = EditSession::new();
    session.start_new(false);
    let result = dossier_service::save_dossier(&state, &mut session, &form("2025/1")).await;
    assert!(matches!(result, Err(DomainError::Database(_))));

    // Rolled back as a whole, session still on a new dossier
    assert!(state.dossier_repo.find_all().await.unwrap().is_empty());
    assert!(session.is_editing());
    assert_eq!(session.current_dossier(), None);

    state
        .db()
        .execute(Statement::from_string(
            backend,
            "DROP TRIGGER reject_products".to_string(),
        ))
        .await
        .unwrap();

    let saved = dossier_service::save_dossier(&state, &mut session, &form("2025/1"))
        .await
        .unwrap();
    assert_eq!(state.dossier_repo.find_all().await.unwrap().len(), 1);
    assert_eq!(session.current_dossier(), Some(saved.id));
}

#[tokio::test]
async fn test_oversized_quantity_is_refused_before_listing() {
    let state = setup_test_state().await;
    let mut session = EditSession::new();
    session.start_new(false);

    let mut huge = form("2025/1");
    huge.products = vec![row("Peinture", "79228162514264337593543950335", "2")];
    let result = dossier_service::save_dossier(&state, &mut session, &huge).await;
    assert!(matches!(result, Err(DomainError::Validation(_))));

    let rows = listing_service::quote_rows(&state, &PricingPolicy::default())
        .await
        .unwrap();
    assert!(rows.is_empty());
}

#[tokio::test]
async fn test_save_requires_edit_mode() {
    let state = setup_test_state().await;
    let mut session = EditSession::new();

    let result = dossier_service::save_dossier(&state, &mut session, &form("2025/1")).await;
    assert!(matches!(result, Err(DomainError::Validation(_))));
}

#[tokio::test]
async fn test_delete_clears_session_selection() {
    let state = setup_test_state().await;
    let mut session = EditSession::new();
    session.start_new(false);
    let saved = dossier_service::save_dossier(&state, &mut session, &form("2025/1"))
        .await
        .unwrap();

    dossier_service::delete_dossier(&state, &mut session, saved.id)
        .await
        .unwrap();

    assert_eq!(session.current_dossier(), None);
    assert!(matches!(
        dossier_service::load_detail(&state, saved.id).await,
        Err(DomainError::NotFound)
    ));
}

#[tokio::test]
async fn test_next_number_fills_the_year() {
    let state = setup_test_state().await;

    for numero in ["2024/7", "2025/1", "2025/2", "2025/4", "notes"] {
        state
            .dossier_repo
            .create(DossierInput {
                numero_dossier: numero.to_string(),
                adresse_chantier: "12 rue des Lilas".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();
    }

    let next = dossier_service::next_number_for_year(&state, 2025)
        .await
        .unwrap();
    assert_eq!(next.to_string(), "2025/3");

    let fresh = dossier_service::next_number_for_year(&state, 2026)
        .await
        .unwrap();
    assert_eq!(fresh.to_string(), "2026/1");
}

#[tokio::test]
async fn test_list_entries_most_recent_first() {
    let state = setup_test_state().await;

    for numero in ["2024/7", "2025/2", "2025/10"] {
        state
            .dossier_repo
            .create(DossierInput {
                numero_dossier: numero.to_string(),
                adresse_chantier: "12 rue des Lilas".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();
    }

    let entries = dossier_service::list_entries(&state).await.unwrap();
    let numbers: Vec<&str> = entries.iter().map(|e| e.numero.as_str()).collect();
    assert_eq!(numbers, vec!["2025/10", "2025/2", "2024/7"]);
}
