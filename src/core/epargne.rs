//! Savings business logic - Deposits and withdrawals of member savings.

use crate::{
    core::{membre::require_membre, period::DateRange},
    entities::{Epargne, epargne, epargne::StatutEpargne},
    errors::{Error, Result, ensure_positive_amount},
};
use chrono::NaiveDate;
use sea_orm::{QueryOrder, Set, prelude::*};
use tracing::info;

/// Records a savings deposit for an existing member.
pub async fn deposit(
    db: &DatabaseConnection,
    membre_id: i64,
    montant: f64,
    date_depot: NaiveDate,
    notes: Option<String>,
) -> Result<epargne::Model> {
    ensure_positive_amount(montant)?;
    let membre = require_membre(db, membre_id).await?;

    let model = epargne::ActiveModel {
        membre_id: Set(membre.id),
        montant: Set(montant),
        date_depot: Set(date_depot),
        statut: Set(StatutEpargne::Actif),
        notes: Set(notes),
        ..Default::default()
    };
    let created = model.insert(db).await?;
    info!("Savings deposit of {montant:.2} for {}", membre.nom_complet());
    Ok(created)
}

/// Marks a deposit as returned to the member.
pub async fn withdraw(db: &DatabaseConnection, id: i64) -> Result<epargne::Model> {
    let existing = Epargne::find_by_id(id).one(db).await?.ok_or(Error::NotFound {
        entity: "Épargne",
        id,
    })?;
    if existing.statut == StatutEpargne::Retire {
        return Err(Error::validation(format!("L'épargne {id} est déjà retirée")));
    }
    let mut active: epargne::ActiveModel = existing.into();
    active.statut = Set(StatutEpargne::Retire);
    Ok(active.update(db).await?)
}

/// Deletes a deposit.
pub async fn delete_epargne(db: &DatabaseConnection, id: i64) -> Result<()> {
    let result = Epargne::delete_by_id(id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(Error::NotFound {
            entity: "Épargne",
            id,
        });
    }
    Ok(())
}

/// Lists deposits dated inside `range`, newest first.
pub async fn list_in_range(db: &DatabaseConnection, range: DateRange) -> Result<Vec<epargne::Model>> {
    Epargne::find()
        .filter(epargne::Column::DateDepot.gte(range.start))
        .filter(epargne::Column::DateDepot.lte(range.end))
        .order_by_desc(epargne::Column::DateDepot)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Lists a member's deposits, newest first.
pub async fn list_for_membre(db: &DatabaseConnection, membre_id: i64) -> Result<Vec<epargne::Model>> {
    Epargne::find()
        .filter(epargne::Column::MembreId.eq(membre_id))
        .order_by_desc(epargne::Column::DateDepot)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Sum of a member's savings still held by the association.
pub async fn membre_balance(db: &DatabaseConnection, membre_id: i64) -> Result<f64> {
    Ok(list_for_membre(db, membre_id)
        .await?
        .iter()
        .filter(|e| e.statut == StatutEpargne::Actif)
        .map(|e| e.montant)
        .sum())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_deposit_and_balance() -> Result<()> {
        let (db, membre) = setup_with_membre().await?;
        deposit(&db, membre.id, 3000.0, date(2024, 3, 5), None).await?;
        let second = deposit(&db, membre.id, 2000.0, date(2024, 4, 5), None).await?;
        assert_eq!(membre_balance(&db, membre.id).await?, 5000.0);

        withdraw(&db, second.id).await?;
        assert_eq!(membre_balance(&db, membre.id).await?, 3000.0);
        assert!(matches!(
            withdraw(&db, second.id).await,
            Err(Error::Validation { .. })
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_deposit_rejects_invalid_amount_and_member() -> Result<()> {
        let (db, membre) = setup_with_membre().await?;
        assert!(matches!(
            deposit(&db, membre.id, 0.0, date(2024, 1, 1), None).await,
            Err(Error::InvalidAmount { .. })
        ));
        assert!(matches!(
            deposit(&db, 404, 10.0, date(2024, 1, 1), None).await,
            Err(Error::MemberNotFound { .. })
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_list_in_range() -> Result<()> {
        let (db, membre) = setup_with_membre().await?;
        deposit(&db, membre.id, 1.0, date(2024, 1, 31), None).await?;
        deposit(&db, membre.id, 2.0, date(2024, 2, 1), None).await?;
        let feb = DateRange::month(2024, 2)?;
        let rows = list_in_range(&db, feb).await?;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].montant, 2.0);

        delete_epargne(&db, rows[0].id).await?;
        assert!(list_in_range(&db, feb).await?.is_empty());
        Ok(())
    }
}
