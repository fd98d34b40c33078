use std::env;
use std::path::{Path, PathBuf};

use rust_decimal::Decimal;

use crate::domain::pricing::{PricingFormula, PricingPolicy, parse_decimal};

const APP_DIR: &str = "NMGFacturation";
const DB_FILE: &str = "facturation.db";

/// Letterhead printed on every generated document
#[derive(Clone, Debug)]
pub struct CompanyProfile {
    pub name: String,
    pub motto: String,
    pub email: String,
    pub phone: String,
    pub slogan: String,
    pub activity: String,
    /// Legal lines of the footer (address, SIRET, bank details), one per line
    pub legal_lines: Vec<String>,
}

impl Default for CompanyProfile {
    fn default() -> Self {
        Self {
            name: "NMG&CO EI".to_string(),
            motto: "QUALITE - RAPIDITE - EFFICACITE".to_string(),
            email: String::new(),
            phone: String::new(),
            slogan: "Besoin d'un service... c'est simple... NMG&CO est là".to_string(),
            activity: "TRAVAUX DIVERS - MAISON - JARDIN".to_string(),
            legal_lines: Vec::new(),
        }
    }
}

impl CompanyProfile {
    fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            name: env::var("COMPANY_NAME").unwrap_or(defaults.name),
            motto: env::var("COMPANY_MOTTO").unwrap_or(defaults.motto),
            email: env::var("COMPANY_EMAIL").unwrap_or(defaults.email),
            phone: env::var("COMPANY_PHONE").unwrap_or(defaults.phone),
            slogan: env::var("COMPANY_SLOGAN").unwrap_or(defaults.slogan),
            activity: env::var("COMPANY_ACTIVITY").unwrap_or(defaults.activity),
            legal_lines: env::var("COMPANY_LEGAL")
                .ok()
                .map(|s| s.split('|').map(|l| l.trim().to_string()).collect())
                .unwrap_or(defaults.legal_lines),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub database_path: PathBuf,
    pub database_url: String,
    pub update_url: Option<String>,
    pub updater_path: Option<PathBuf>,
    pub app_version: String,
    pub instance_port: u16,
    pub pricing: PricingPolicy,
    pub company: CompanyProfile,
}

impl Config {
    pub fn from_env() -> Self {
        let database_path = env::var("DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_data_dir())
            .join(DB_FILE);

        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| sqlite_url(&database_path));

        let formula = match env::var("PRICING_FORMULA") {
            Ok(raw) => raw.parse().unwrap_or_else(|e| {
                tracing::warn!("{}, falling back to discount on line", e);
                PricingFormula::DiscountOnLine
            }),
            Err(_) => PricingFormula::DiscountOnLine,
        };

        let deposit_percent = env::var("DEPOSIT_PERCENT")
            .ok()
            .and_then(|p| parse_decimal(&p))
            .unwrap_or_else(|| Decimal::from(50));

        Self {
            database_path,
            database_url,
            update_url: env::var("UPDATE_URL").ok(),
            updater_path: env::var("UPDATER_PATH").ok().map(PathBuf::from),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            instance_port: env::var("INSTANCE_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(47_613),
            pricing: PricingPolicy {
                formula,
                deposit_percent,
            },
            company: CompanyProfile::from_env(),
        }
    }
}

/// `sqlite://` URL creating the file on first use
pub fn sqlite_url(path: &Path) -> String {
    format!("sqlite://{}?mode=rwc", path.display())
}

/// Per-user application data directory holding the store file
pub fn default_data_dir() -> PathBuf {
    // On Windows: %LOCALAPPDATA%\NMGFacturation\data
    // On macOS: ~/Library/Application Support/NMGFacturation/data
    // On Linux: ~/.local/share/nmgfacturation/data

    #[cfg(target_os = "windows")]
    {
        let appdata = env::var("LOCALAPPDATA").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(appdata).join(APP_DIR).join("data")
    }

    #[cfg(target_os = "macos")]
    {
        let home = env::var("HOME").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home)
            .join("Library")
            .join("Application Support")
            .join(APP_DIR)
            .join("data")
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        let base = env::var("XDG_DATA_HOME")
            .map(PathBuf::from)
            .or_else(|_| env::var("HOME").map(|h| PathBuf::from(h).join(".local").join("share")))
            .unwrap_or_else(|_| PathBuf::from("."));
        base.join(APP_DIR.to_lowercase()).join("data")
    }
}
