//! Database configuration module for `TontineBuddy`.
//!
//! This module handles `SQLite` database connection and table creation using `SeaORM`.
//! Tables are generated with `Schema::create_table_from_entity` so that the database
//! schema always matches the entity definitions without hand-written SQL.

use crate::entities::{
    self, Cotisation, CotisationType, Epargne, FondCaisseCloture, FondCaisseOperation, MatchStatistic,
    Membre, NotificationTemplate, Presence, Pret, Reunion, Sanction, SanctionType, SportMatch,
    TontineAttribution,
};
use crate::errors::Result;
use sea_orm::{
    ConnectionTrait, Database, DatabaseConnection, EntityTrait, Schema, sea_query::Index,
};
use std::path::Path;
use tracing::{debug, info};

const DEFAULT_DATABASE_URL: &str = "sqlite://data/tontine_buddy.sqlite?mode=rwc";

/// Gets the database URL from the `DATABASE_URL` environment variable, or the default
/// local `SQLite` file.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
}

/// File path of a `sqlite://` URL, without its query string.
fn sqlite_file(url: &str) -> Option<&Path> {
    let rest = url.strip_prefix("sqlite://")?;
    rest.split('?').next().map(Path::new)
}

/// Establishes a connection to the database named by [`get_database_url`].
pub async fn create_connection() -> Result<DatabaseConnection> {
    let database_url = get_database_url();
    if let Some(parent) = sqlite_file(&database_url).and_then(Path::parent)
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent).await?;
    }
    info!("Connecting to database at {database_url}");
    Database::connect(&database_url).await.map_err(Into::into)
}

async fn create_table<E>(db: &DatabaseConnection, schema: &Schema, entity: E) -> Result<()>
where
    E: EntityTrait,
{
    let builder = db.get_database_backend();
    debug!("Creating table {}", entity.table_name());
    let mut statement = schema.create_table_from_entity(entity);
    statement.if_not_exists();
    db.execute(builder.build(&statement)).await?;
    Ok(())
}

async fn create_unique_index<E>(
    db: &DatabaseConnection,
    entity: E,
    name: &str,
    columns: [E::Column; 2],
) -> Result<()>
where
    E: EntityTrait,
{
    let builder = db.get_database_backend();
    debug!("Creating unique index {name}");
    let [first, second] = columns;
    let statement = Index::create()
        .name(name)
        .table(entity)
        .col(first)
        .col(second)
        .unique()
        .if_not_exists()
        .to_owned();
    db.execute(builder.build(&statement)).await?;
    Ok(())
}

/// Creates every table of the association's schema if it does not exist yet.
///
/// Parent tables are created before the tables referencing them. One
/// attendance row per member and meeting, one statistics line per player
/// and match.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let schema = Schema::new(db.get_database_backend());

    create_table(db, &schema, Membre).await?;
    create_table(db, &schema, CotisationType).await?;
    create_table(db, &schema, Cotisation).await?;
    create_table(db, &schema, Epargne).await?;
    create_table(db, &schema, Pret).await?;
    create_table(db, &schema, SanctionType).await?;
    create_table(db, &schema, Sanction).await?;
    create_table(db, &schema, Reunion).await?;
    create_table(db, &schema, Presence).await?;
    create_table(db, &schema, FondCaisseOperation).await?;
    create_table(db, &schema, FondCaisseCloture).await?;
    create_table(db, &schema, TontineAttribution).await?;
    create_table(db, &schema, SportMatch).await?;
    create_table(db, &schema, MatchStatistic).await?;
    create_table(db, &schema, NotificationTemplate).await?;

    create_unique_index(
        db,
        Presence,
        "idx_presences_reunion_membre",
        [
            entities::presence::Column::ReunionId,
            entities::presence::Column::MembreId,
        ],
    )
    .await?;
    create_unique_index(
        db,
        MatchStatistic,
        "idx_match_statistics_match_membre",
        [
            entities::match_statistic::Column::MatchId,
            entities::match_statistic::Column::MembreId,
        ],
    )
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{MembreModel, NotificationTemplateModel, TontineAttributionModel};
    use sea_orm::QuerySelect;

    #[tokio::test]
    async fn test_create_tables() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;

        // Test that tables exist by querying them
        let _: Vec<MembreModel> = Membre::find().limit(1).all(&db).await?;
        let _: Vec<TontineAttributionModel> = TontineAttribution::find().limit(1).all(&db).await?;
        let _: Vec<NotificationTemplateModel> =
            NotificationTemplate::find().limit(1).all(&db).await?;

        Ok(())
    }

    #[test]
    fn test_sqlite_file_strips_query() {
        assert_eq!(
            sqlite_file("sqlite://data/tontine.sqlite?mode=rwc"),
            Some(Path::new("data/tontine.sqlite"))
        );
        assert_eq!(sqlite_file("sqlite::memory:"), None);
    }

    #[tokio::test]
    async fn test_create_tables_is_idempotent() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;
        create_tables(&db).await?;
        Ok(())
    }
}
