//! Meeting business logic - Meetings and member attendance.

use crate::{
    core::{aggregation, membre::require_membre, period::DateRange},
    entities::{
        Presence, Reunion, presence, reunion,
        reunion::StatutReunion,
    },
    errors::{Error, Result},
};
use chrono::NaiveDate;
use sea_orm::{QueryOrder, Set, prelude::*, sea_query::OnConflict};
use std::collections::HashSet;

/// Schedules a meeting.
pub async fn create_reunion(
    db: &DatabaseConnection,
    date_reunion: NaiveDate,
    lieu: Option<String>,
    ordre_du_jour: Option<String>,
) -> Result<reunion::Model> {
    let model = reunion::ActiveModel {
        date_reunion: Set(date_reunion),
        lieu: Set(lieu),
        ordre_du_jour: Set(ordre_du_jour),
        statut: Set(StatutReunion::Planifiee),
        ..Default::default()
    };
    Ok(model.insert(db).await?)
}

async fn require_reunion(db: &DatabaseConnection, id: i64) -> Result<reunion::Model> {
    Reunion::find_by_id(id).one(db).await?.ok_or(Error::NotFound {
        entity: "Réunion",
        id,
    })
}

/// Marks a meeting as held.
pub async fn close_reunion(db: &DatabaseConnection, id: i64) -> Result<reunion::Model> {
    let existing = require_reunion(db, id).await?;
    let mut active: reunion::ActiveModel = existing.into();
    active.statut = Set(StatutReunion::Terminee);
    Ok(active.update(db).await?)
}

/// Lists meetings inside `range`, oldest first.
pub async fn list_in_range(
    db: &DatabaseConnection,
    range: DateRange,
) -> Result<Vec<reunion::Model>> {
    Reunion::find()
        .filter(reunion::Column::DateReunion.gte(range.start))
        .filter(reunion::Column::DateReunion.lte(range.end))
        .order_by_asc(reunion::Column::DateReunion)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Most recent meeting on or before `date`.
pub async fn latest_reunion(
    db: &DatabaseConnection,
    date: NaiveDate,
) -> Result<Option<reunion::Model>> {
    Reunion::find()
        .filter(reunion::Column::DateReunion.lte(date))
        .order_by_desc(reunion::Column::DateReunion)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Records whether a member attended; a second call for the same pair overwrites.
///
/// A single `INSERT .. ON CONFLICT` against the unique (meeting, member) index,
/// so concurrent calls never produce two rows.
pub async fn record_presence(
    db: &DatabaseConnection,
    reunion_id: i64,
    membre_id: i64,
    present: bool,
) -> Result<presence::Model> {
    require_reunion(db, reunion_id).await?;
    require_membre(db, membre_id).await?;

    let model = presence::ActiveModel {
        reunion_id: Set(reunion_id),
        membre_id: Set(membre_id),
        present: Set(present),
        ..Default::default()
    };
    Presence::insert(model)
        .on_conflict(
            OnConflict::columns([presence::Column::ReunionId, presence::Column::MembreId])
                .update_column(presence::Column::Present)
                .to_owned(),
        )
        .exec_without_returning(db)
        .await?;

    Presence::find()
        .filter(presence::Column::ReunionId.eq(reunion_id))
        .filter(presence::Column::MembreId.eq(membre_id))
        .one(db)
        .await?
        .ok_or(Error::NotFound {
            entity: "Présence",
            id: reunion_id,
        })
}

/// Attendance rows of a meeting.
pub async fn list_presences(
    db: &DatabaseConnection,
    reunion_id: i64,
) -> Result<Vec<presence::Model>> {
    Presence::find()
        .filter(presence::Column::ReunionId.eq(reunion_id))
        .all(db)
        .await
        .map_err(Into::into)
}

/// Percentage of recorded meetings in `range` the member attended.
///
/// Returns 0 when no attendance was recorded for the member in the range.
pub async fn attendance_rate(
    db: &DatabaseConnection,
    membre_id: i64,
    range: DateRange,
) -> Result<f64> {
    let reunion_ids: HashSet<i64> = list_in_range(db, range)
        .await?
        .into_iter()
        .map(|r| r.id)
        .collect();

    let rows: Vec<presence::Model> = Presence::find()
        .filter(presence::Column::MembreId.eq(membre_id))
        .all(db)
        .await?
        .into_iter()
        .filter(|p| reunion_ids.contains(&p.reunion_id))
        .collect();

    #[allow(clippy::cast_precision_loss)] // attendance counts are small
    let (presents, recorded) = (
        rows.iter().filter(|p| p.present).count() as f64,
        rows.len() as f64,
    );
    Ok(aggregation::percentage(presents, recorded))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_record_presence_upserts() -> Result<()> {
        let (db, membre) = setup_with_membre().await?;
        let r = create_reunion(&db, date(2024, 1, 7), None, None).await?;

        record_presence(&db, r.id, membre.id, false).await?;
        record_presence(&db, r.id, membre.id, true).await?;

        let rows = list_presences(&db, r.id).await?;
        assert_eq!(rows.len(), 1);
        assert!(rows[0].present);
        Ok(())
    }

    #[tokio::test]
    async fn test_concurrent_presence_keeps_one_row() -> Result<()> {
        let (db, membre) = setup_with_membre().await?;
        let r = create_reunion(&db, date(2024, 1, 7), None, None).await?;

        let (first, second) = tokio::join!(
            record_presence(&db, r.id, membre.id, true),
            record_presence(&db, r.id, membre.id, false),
        );
        first?;
        second?;

        assert_eq!(list_presences(&db, r.id).await?.len(), 1);
        let rate = attendance_rate(&db, membre.id, DateRange::month(2024, 1)?).await?;
        assert!(rate == 0.0 || rate == 100.0);
        Ok(())
    }

    #[tokio::test]
    async fn test_attendance_rate() -> Result<()> {
        let (db, membre) = setup_with_membre().await?;
        let dates = [date(2024, 1, 7), date(2024, 2, 4), date(2024, 3, 3), date(2024, 4, 7)];
        for (i, d) in dates.iter().enumerate() {
            let r = create_reunion(&db, *d, Some("Siège".into()), None).await?;
            record_presence(&db, r.id, membre.id, i != 1).await?;
        }

        let q1 = DateRange::new(date(2024, 1, 1), date(2024, 3, 31))?;
        let rate = attendance_rate(&db, membre.id, q1).await?;
        assert!((rate - 200.0 / 3.0).abs() < 1e-9);

        let empty = DateRange::month(2023, 1)?;
        assert_eq!(attendance_rate(&db, membre.id, empty).await?, 0.0);
        Ok(())
    }

    #[tokio::test]
    async fn test_close_and_latest() -> Result<()> {
        let db = setup_test_db().await?;
        create_reunion(&db, date(2024, 1, 7), None, None).await?;
        let r2 = create_reunion(&db, date(2024, 2, 4), None, Some("Bilan".into())).await?;

        let latest = latest_reunion(&db, date(2024, 3, 1)).await?;
        assert_eq!(latest.map(|r| r.id), Some(r2.id));

        let closed = close_reunion(&db, r2.id).await?;
        assert_eq!(closed.statut, StatutReunion::Terminee);
        assert!(matches!(close_reunion(&db, 999).await, Err(Error::NotFound { .. })));
        Ok(())
    }
}
