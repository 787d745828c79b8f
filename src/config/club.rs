//! Club configuration loading from `club.toml`.
//!
//! The file holds the tunable parts of the association: gala eligibility
//! thresholds, ranking sizes, photo storage, the notification function endpoint
//! and the reference data (cotisation types, sanction types, notification
//! templates) seeded into the database at start-up. Every section is optional.

use crate::{
    core::{cotisation, eligibilite::Thresholds, notification, sanction},
    entities::sanction_type::ContexteSanction,
    errors::{Error, Result},
};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Configuration structure representing the entire `club.toml` file
#[derive(Debug, Deserialize, Default, Clone)]
pub struct ClubConfig {
    /// Gala eligibility thresholds
    #[serde(default)]
    pub eligibilite: Thresholds,
    /// Ranking sizes for dashboards
    #[serde(default)]
    pub classement: ClassementConfig,
    /// Member photo storage
    #[serde(default)]
    pub stockage: StorageConfig,
    /// Notification function settings
    #[serde(default)]
    pub notifications: NotificationConfig,
    /// Cotisation types to seed
    #[serde(default)]
    pub cotisation_types: Vec<CotisationTypeConfig>,
    /// Sanction types to seed
    #[serde(default)]
    pub sanction_types: Vec<SanctionTypeConfig>,
    /// Notification templates to seed
    #[serde(default)]
    pub notification_templates: Vec<TemplateConfig>,
}

/// Ranking sizes
#[derive(Debug, Deserialize, Clone)]
pub struct ClassementConfig {
    /// Default number of entries in top-N rankings
    #[serde(default = "default_top")]
    pub top: usize,
}

impl Default for ClassementConfig {
    fn default() -> Self {
        Self { top: default_top() }
    }
}

const fn default_top() -> usize {
    10
}

/// Local object storage for member photos
#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// Directory holding the buckets
    #[serde(default = "default_storage_root")]
    pub racine: PathBuf,
    /// Base URL the directory is served from
    #[serde(default = "default_public_url")]
    pub url_publique: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            racine: default_storage_root(),
            url_publique: default_public_url(),
        }
    }
}

fn default_storage_root() -> PathBuf {
    PathBuf::from("data/storage")
}

fn default_public_url() -> String {
    "http://localhost:8080/storage".to_string()
}

/// Notification function settings
#[derive(Debug, Deserialize, Clone)]
pub struct NotificationConfig {
    /// Base URL of the server-side functions; notifications are only logged when absent
    pub function_base_url: Option<String>,
    /// Template sent after a cotisation is recorded
    #[serde(default = "default_payment_template")]
    pub template_confirmation_paiement: String,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            function_base_url: None,
            template_confirmation_paiement: default_payment_template(),
        }
    }
}

fn default_payment_template() -> String {
    notification::PAYMENT_CONFIRMATION_CODE.to_string()
}

/// Seed entry for a cotisation type
#[derive(Debug, Deserialize, Clone)]
pub struct CotisationTypeConfig {
    /// Unique name
    pub nom: String,
    /// Default amount
    pub montant_defaut: f64,
    /// Expected from every active member
    #[serde(default)]
    pub obligatoire: bool,
    /// Free-form description
    #[serde(default)]
    pub description: Option<String>,
}

/// Seed entry for a sanction type
#[derive(Debug, Deserialize, Clone)]
pub struct SanctionTypeConfig {
    /// Unique name
    pub nom: String,
    /// Default amount
    pub montant_defaut: f64,
    /// Meeting or sport
    pub contexte: ContexteSanction,
}

/// Seed entry for a notification template
#[derive(Debug, Deserialize, Clone)]
pub struct TemplateConfig {
    /// Unique code
    pub code: String,
    /// Display name
    pub nom: String,
    /// Subject with placeholders
    pub sujet: String,
    /// Body with placeholders
    pub contenu: String,
    /// Declared variable names
    #[serde(default)]
    pub variables: Vec<String>,
}

/// Loads the club configuration from a TOML file
///
/// # Errors
/// Returns an error if the file cannot be read or the TOML is invalid.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<ClubConfig> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read {}: {e}", path.as_ref().display()),
    })?;

    parse_config(&contents)
}

/// Parses a club configuration from TOML text
pub fn parse_config(contents: &str) -> Result<ClubConfig> {
    toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse club.toml: {e}"),
    })
}

/// Loads the configuration named by `CLUB_CONFIG` (default `./club.toml`).
///
/// A missing file is not an error: built-in defaults are used and a warning is logged.
pub fn load_default_config() -> Result<ClubConfig> {
    let path = std::env::var("CLUB_CONFIG").unwrap_or_else(|_| "club.toml".to_string());
    if !Path::new(&path).exists() {
        warn!("{path} not found, using default club configuration");
        return Ok(ClubConfig::default());
    }
    info!("Loading club configuration from {path}");
    load_config(path)
}

/// Inserts the reference data declared in the configuration when missing.
///
/// Existing rows are left untouched, so operators may edit them afterwards.
pub async fn seed_reference_data(db: &DatabaseConnection, config: &ClubConfig) -> Result<()> {
    for t in &config.cotisation_types {
        if cotisation::get_type_by_name(db, &t.nom).await?.is_none() {
            cotisation::create_type(
                db,
                t.nom.clone(),
                t.montant_defaut,
                t.obligatoire,
                t.description.clone(),
            )
            .await?;
            info!("Seeded cotisation type {}", t.nom);
        }
    }

    for t in &config.sanction_types {
        if sanction::get_type_by_name(db, &t.nom).await?.is_none() {
            sanction::create_type(db, t.nom.clone(), t.montant_defaut, t.contexte).await?;
            info!("Seeded sanction type {}", t.nom);
        }
    }

    for t in &config.notification_templates {
        if notification::get_template_by_code(db, &t.code).await?.is_none() {
            notification::create_template(
                db,
                notification::NewTemplate {
                    code: t.code.clone(),
                    nom: t.nom.clone(),
                    sujet: t.sujet.clone(),
                    contenu: t.contenu.clone(),
                    variables: t.variables.clone(),
                },
            )
            .await?;
            info!("Seeded notification template {}", t.code);
        }
    }

    Ok(())
}
