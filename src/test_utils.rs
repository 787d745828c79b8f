//! Shared test utilities for `TontineBuddy`.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults.

use crate::{
    core::{cotisation, membre, sanction},
    entities::{self, cotisation::StatutCotisation, sanction_type::ContexteSanction},
    errors::Result,
};
use chrono::NaiveDate;
use sea_orm::DatabaseConnection;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Shorthand for a calendar date; panics on an invalid date.
#[allow(clippy::unwrap_used)]
pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Member input with sensible defaults.
///
/// # Defaults
/// * no email or phone
/// * member of neither sports sub-club
/// * joined on 2023-01-01
pub fn new_membre_input(nom: &str, prenom: &str) -> membre::NewMembre {
    membre::NewMembre {
        nom: nom.to_string(),
        prenom: prenom.to_string(),
        email: None,
        telephone: None,
        est_membre_e2d: false,
        est_adherent_phoenix: false,
        date_inscription: date(2023, 1, 1),
    }
}

/// Creates an active test member with the defaults of [`new_membre_input`].
pub async fn create_test_membre(
    db: &DatabaseConnection,
    nom: &str,
    prenom: &str,
) -> Result<entities::membre::Model> {
    membre::create_membre(db, new_membre_input(nom, prenom)).await
}

/// Records a paid cotisation.
pub async fn create_test_cotisation(
    db: &DatabaseConnection,
    membre_id: i64,
    type_cotisation_id: i64,
    montant: f64,
    date_paiement: NaiveDate,
) -> Result<entities::cotisation::Model> {
    cotisation::record_cotisation(
        db,
        cotisation::NewCotisation {
            membre_id,
            type_cotisation_id,
            montant: Some(montant),
            date_paiement,
            statut: StatutCotisation::Paye,
            notes: None,
        },
    )
    .await
}

/// Assesses an unpaid meeting sanction, creating the "Retard réunion" type on first use.
pub async fn create_test_sanction(
    db: &DatabaseConnection,
    membre_id: i64,
    montant: f64,
    date_sanction: NaiveDate,
) -> Result<entities::sanction::Model> {
    const TYPE_NAME: &str = "Retard réunion";
    let sanction_type = match sanction::get_type_by_name(db, TYPE_NAME).await? {
        Some(t) => t,
        None => {
            sanction::create_type(db, TYPE_NAME.to_string(), 500.0, ContexteSanction::Reunion)
                .await?
        }
    };
    sanction::assess_sanction(
        db,
        sanction::NewSanction {
            membre_id,
            type_sanction_id: sanction_type.id,
            montant: Some(montant),
            date_sanction,
            motif: None,
        },
    )
    .await
}

/// Sets up a test database with one member.
/// Returns (db, membre) for common test scenarios.
pub async fn setup_with_membre() -> Result<(DatabaseConnection, entities::membre::Model)> {
    let db = setup_test_db().await?;
    let membre = create_test_membre(&db, "Mbarga", "Alice").await?;
    Ok((db, membre))
}

/// Sets up a test database with one member and a 5 000 monthly cotisation type.
/// Returns (db, membre, cotisation type) for cotisation-related tests.
pub async fn setup_with_membre_and_type() -> Result<(
    DatabaseConnection,
    entities::membre::Model,
    entities::cotisation_type::Model,
)> {
    let (db, membre) = setup_with_membre().await?;
    let cotisation_type = cotisation::create_type(
        &db,
        "Cotisation mensuelle".to_string(),
        5_000.0,
        true,
        None,
    )
    .await?;
    Ok((db, membre, cotisation_type))
}
