use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use chrono::Local;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use facturation::documents::{
    DirectoryPrompt, ExportOutcome, FixedPath, InvoiceKind, RenderContext, SaveLocationPrompt,
};
use facturation::infrastructure::instance::{self, InstanceRole};
use facturation::infrastructure::maintenance::{self, StoreStatus};
use facturation::infrastructure::{AppState, update};
use facturation::presentation::views::{self, filter_dossier_list};
use facturation::presentation::{DossierForm, EditSession, InvoiceStatusFilter, QuoteStatusFilter};
use facturation::services::{
    address_service, document_service, dossier_service, listing_service,
};
use facturation::{config, db, seed};

#[derive(Parser)]
#[command(name = "facturation")]
#[command(about = "Dossiers, devis et factures", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the store (and fill it with demo data when SEED_DEMO is set)
    Init,
    /// Check that the store exposes the expected tables and columns
    Verify,
    /// Delete every file of the data directory
    Reinit {
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },
    /// List dossiers, most recent first
    List {
        #[arg(short, long, default_value = "")]
        query: String,
    },
    /// List quotes with their discounted total
    Quotes {
        #[arg(short, long, default_value = "")]
        query: String,
        /// Tous, Signé or Non signé
        #[arg(short, long, default_value = "Tous")]
        status: QuoteStatusFilter,
    },
    /// List generated invoices
    Invoices {
        #[arg(short, long, default_value = "")]
        query: String,
        /// Tous, Payé or Non payé
        #[arg(short, long, default_value = "Tous")]
        status: InvoiceStatusFilter,
    },
    /// Print a dossier with its products and options as JSON
    Show { numero: String },
    /// Print the number offered for a new dossier this year
    NextNumber,
    /// Save a dossier form read from a JSON file
    Save {
        /// JSON form: dossier fields plus `products` and `options` rows
        file: PathBuf,
        /// Update this dossier instead of creating a new one
        #[arg(long)]
        id: Option<i32>,
    },
    /// Delete a dossier with its products and options
    Delete {
        numero: String,
        #[arg(long)]
        yes: bool,
    },
    /// Generate the quote of a dossier
    Quote {
        numero: String,
        /// Output file or directory (defaults to the current directory)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Generate an invoice of a dossier
    Invoice {
        numero: String,
        /// standard, acquittee, acompte or definitive
        #[arg(short, long, default_value = "standard")]
        kind: InvoiceKind,
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Manage the address pool
    Address {
        #[command(subcommand)]
        action: AddressAction,
    },
    /// Copy the store file
    Backup {
        /// Destination file or directory (defaults to the current directory)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Replace the store content with a backup
    Restore {
        file: PathBuf,
        #[arg(long)]
        yes: bool,
    },
    /// Ask the update server for a newer version
    CheckUpdate {
        /// Start the updater when a newer version exists
        #[arg(long)]
        install: bool,
    },
}

#[derive(Subcommand)]
enum AddressAction {
    List {
        #[arg(short, long, default_value = "")]
        query: String,
    },
    Add { address: String },
    Rename { old: String, new: String },
    Delete { address: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "facturation=info,sea_orm=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::from_env();
    let cli = Cli::parse();

    // Commands that never open the store
    match &cli.command {
        Commands::Verify => return verify(&config).await,
        Commands::CheckUpdate { install } => return check_update(&config, *install).await,
        _ => {}
    }

    let _guard = match instance::acquire(config.instance_port).await? {
        InstanceRole::Primary(guard) => guard,
        InstanceRole::Secondary => {
            tracing::info!("Another instance is running and has been asked to come forward");
            return Ok(());
        }
    };

    if let Commands::Reinit { yes } = &cli.command {
        return reinit(&config, *yes).await;
    }

    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    // Initialize database
    let db = db::init_db(&config.database_url)
        .await
        .context("Failed to initialize database")?;

    // Check for seed flag
    if std::env::var("SEED_DEMO").is_ok() {
        tracing::info!("Seeding demo data...");
        if let Err(e) = seed::seed_demo_data(&db).await {
            tracing::error!("Failed to seed data: {}", e);
        } else {
            tracing::info!("Demo data seeded successfully.");
        }
    }

    let state = AppState::new(db);
    run(&state, &config, cli.command).await?;
    state.db().clone().close().await?;
    Ok(())
}

async fn run(state: &AppState, config: &config::Config, command: Commands) -> anyhow::Result<()> {
    let ctx = RenderContext {
        company: &config.company,
        pricing: &config.pricing,
        date: Local::now().date_naive(),
    };

    match command {
        Commands::Init => {
            println!("Base prête : {}", config.database_path.display());
        }
        Commands::List { query } => {
            let entries = dossier_service::list_entries(state).await?;
            for entry in filter_dossier_list(&entries, &query) {
                println!("{}", entry.label);
            }
        }
        Commands::Quotes { query, status } => {
            let rows = listing_service::quote_rows(state, &config.pricing).await?;
            for row in views::filter_quote_rows(&rows, &query, status) {
                println!(
                    "{}\t{}\t{}\t{}\t{}",
                    row.numero,
                    row.adresse_chantier,
                    row.libelle_travaux,
                    row.status(),
                    row.total_display()
                );
            }
        }
        Commands::Invoices { query, status } => {
            let rows = listing_service::invoice_rows(state, &config.pricing).await?;
            for row in views::filter_invoice_rows(&rows, &query, status) {
                println!(
                    "{}\t{}\t{}\t{}\t{}",
                    row.numero,
                    row.adresse_chantier,
                    row.libelle_travaux,
                    row.status(),
                    row.total_display()
                );
            }
        }
        Commands::Show { numero } => {
            let dossier = dossier_service::find_by_numero(state, &numero).await?;
            let detail = dossier_service::load_detail(state, dossier.id).await?;
            println!("{}", serde_json::to_string_pretty(&detail)?);
        }
        Commands::NextNumber => {
            println!("{}", dossier_service::suggest_next_number(state).await?);
        }
        Commands::Save { file, id } => {
            let raw = tokio::fs::read_to_string(&file)
                .await
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let form: DossierForm = serde_json::from_str(&raw)
                .with_context(|| format!("Invalid form in {}", file.display()))?;

            let mut session = EditSession::new();
            match id {
                Some(id) => {
                    session.select(id, true);
                    session.begin_edit()?;
                }
                None => {
                    session.start_new(true);
                }
            }
            session.mark_dirty();

            let dossier = dossier_service::save_dossier(state, &mut session, &form).await?;
            println!("Dossier {} enregistré (id {})", dossier.numero_dossier, dossier.id);
        }
        Commands::Delete { numero, yes } => {
            if !yes {
                bail!("Supprimer le dossier {} ? Relancez avec --yes pour confirmer", numero);
            }
            let dossier = dossier_service::find_by_numero(state, &numero).await?;
            let mut session = EditSession::new();
            session.select(dossier.id, true);
            dossier_service::delete_dossier(state, &mut session, dossier.id).await?;
            println!("Dossier {} supprimé", numero);
        }
        Commands::Quote { numero, out } => {
            let dossier = dossier_service::find_by_numero(state, &numero).await?;
            let mut prompt = prompt_for(out)?;
            let outcome =
                document_service::generate_quote(state, &ctx, dossier.id, prompt.as_mut()).await?;
            report(outcome);
        }
        Commands::Invoice { numero, kind, out } => {
            let dossier = dossier_service::find_by_numero(state, &numero).await?;
            let mut prompt = prompt_for(out)?;
            let outcome = document_service::generate_invoice(
                state,
                &ctx,
                dossier.id,
                kind,
                prompt.as_mut(),
            )
            .await?;
            report(outcome);
        }
        Commands::Address { action } => address(state, action).await?,
        Commands::Backup { out } => {
            let name = maintenance::default_backup_name(&Local::now());
            let dest = match out {
                Some(path) if path.is_dir() => path.join(name),
                Some(path) => path,
                None => PathBuf::from(name),
            };
            let bytes = maintenance::backup(state.db(), &config.database_path, &dest).await?;
            println!("Sauvegarde créée : {} ({} octets)", dest.display(), bytes);
        }
        Commands::Restore { file, yes } => {
            if !yes {
                bail!("Le contenu actuel sera remplacé. Relancez avec --yes pour confirmer");
            }
            let report = maintenance::restore(&file, state.db()).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        // Handled in main before the store is opened
        Commands::Verify | Commands::Reinit { .. } | Commands::CheckUpdate { .. } => {}
    }

    Ok(())
}

async fn address(state: &AppState, action: AddressAction) -> anyhow::Result<()> {
    match action {
        AddressAction::List { query } => {
            let addresses = address_service::list_addresses(state).await?;
            for address in views::filter_addresses(&addresses, &query) {
                println!("{}", address.address);
            }
        }
        AddressAction::Add { address } => {
            let created = address_service::add_address(state, &address).await?;
            println!("Adresse ajoutée : {}", created.address);
        }
        AddressAction::Rename { old, new } => {
            let renamed = address_service::rename_address(state, &old, &new).await?;
            println!("Adresse modifiée : {}", renamed.address);
        }
        AddressAction::Delete { address } => {
            address_service::delete_address(state, &address).await?;
            println!("Adresse supprimée : {}", address.trim());
        }
    }
    Ok(())
}

fn prompt_for(out: Option<PathBuf>) -> anyhow::Result<Box<dyn SaveLocationPrompt>> {
    Ok(match out {
        Some(path) if path.is_dir() => Box::new(DirectoryPrompt { dir: path }),
        Some(path) => Box::new(FixedPath { path }),
        None => Box::new(DirectoryPrompt {
            dir: std::env::current_dir().context("No current directory")?,
        }),
    })
}

fn report(outcome: ExportOutcome) {
    match outcome {
        ExportOutcome::Saved(path) => println!("Document enregistré : {}", path.display()),
        ExportOutcome::Cancelled => println!("Export annulé"),
    }
}

async fn verify(config: &config::Config) -> anyhow::Result<()> {
    match maintenance::verify_store(&config.database_path).await? {
        StoreStatus::Ready => println!("Base conforme : {}", config.database_path.display()),
        StoreStatus::Missing => {
            bail!("Base introuvable : {}", config.database_path.display())
        }
        StoreStatus::Incomplete(missing) => {
            bail!("Base incomplète, éléments manquants : {}", missing.join(", "))
        }
    }
    Ok(())
}

async fn reinit(config: &config::Config, yes: bool) -> anyhow::Result<()> {
    if !yes {
        bail!("Toutes les données seront supprimées. Relancez avec --yes pour confirmer");
    }
    let data_dir = data_dir(&config.database_path);
    let removed = maintenance::reinitialize(data_dir).await?;
    println!("{} fichier(s) supprimé(s)", removed.len());
    Ok(())
}

fn data_dir(database_path: &Path) -> &Path {
    database_path.parent().unwrap_or(Path::new("."))
}

async fn check_update(config: &config::Config, install: bool) -> anyhow::Result<()> {
    let Some(base_url) = config.update_url.as_deref() else {
        bail!("UPDATE_URL is not set");
    };

    let client = reqwest::Client::new();
    match update::check_for_update(&client, base_url, &config.app_version).await? {
        None => println!("Version {} à jour", config.app_version),
        Some(version) => {
            println!("Nouvelle version disponible : {}", version);
            if install {
                let Some(updater) = config.updater_path.as_deref() else {
                    bail!("UPDATER_PATH is not set");
                };
                update::launch_updater(updater, &version)?;
            }
        }
    }
    Ok(())
}
