//! Sanction business logic - Penalty catalogue, assessment and payment.
//!
//! A sanction copies its context (meeting or sport) from its type and moves
//! from `impaye` to `partiel` to `paye` as payments arrive.

use crate::{
    core::{membre::require_membre, period::DateRange},
    entities::{
        Sanction, SanctionType, sanction,
        sanction::StatutSanction,
        sanction_type::{self, ContexteSanction},
    },
    errors::{Error, Result, ensure_positive_amount},
};
use chrono::NaiveDate;
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use serde::Serialize;
use tracing::info;

const EPSILON: f64 = 0.005;

/// Creates a sanction type with a unique name.
pub async fn create_type(
    db: &DatabaseConnection,
    nom: String,
    montant_defaut: f64,
    contexte: ContexteSanction,
) -> Result<sanction_type::Model> {
    if nom.trim().is_empty() {
        return Err(Error::validation("Le nom du type de sanction est obligatoire"));
    }
    ensure_positive_amount(montant_defaut)?;
    if get_type_by_name(db, nom.trim()).await?.is_some() {
        return Err(Error::validation(format!(
            "Le type de sanction « {} » existe déjà",
            nom.trim()
        )));
    }
    let model = sanction_type::ActiveModel {
        nom: Set(nom.trim().to_string()),
        montant_defaut: Set(montant_defaut),
        contexte: Set(contexte),
        ..Default::default()
    };
    Ok(model.insert(db).await?)
}

/// Lists sanction types ordered by name.
pub async fn list_types(db: &DatabaseConnection) -> Result<Vec<sanction_type::Model>> {
    SanctionType::find()
        .order_by_asc(sanction_type::Column::Nom)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds a sanction type by exact name.
pub async fn get_type_by_name(
    db: &DatabaseConnection,
    nom: &str,
) -> Result<Option<sanction_type::Model>> {
    SanctionType::find()
        .filter(sanction_type::Column::Nom.eq(nom))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Input for [`assess_sanction`]
#[derive(Debug, Clone)]
pub struct NewSanction {
    /// Sanctioned member
    pub membre_id: i64,
    /// Sanction type
    pub type_sanction_id: i64,
    /// Amount; the type's default when `None`
    pub montant: Option<f64>,
    /// Assessment date
    pub date_sanction: NaiveDate,
    /// Reason
    pub motif: Option<String>,
}

/// Assesses a sanction against a member.
pub async fn assess_sanction(
    db: &DatabaseConnection,
    input: NewSanction,
) -> Result<sanction::Model> {
    if let Some(montant) = input.montant {
        ensure_positive_amount(montant)?;
    }
    let membre = require_membre(db, input.membre_id).await?;
    let type_sanction = SanctionType::find_by_id(input.type_sanction_id)
        .one(db)
        .await?
        .ok_or(Error::NotFound {
            entity: "Type de sanction",
            id: input.type_sanction_id,
        })?;

    let model = sanction::ActiveModel {
        membre_id: Set(membre.id),
        type_sanction_id: Set(type_sanction.id),
        montant: Set(input.montant.unwrap_or(type_sanction.montant_defaut)),
        montant_paye: Set(0.0),
        statut: Set(StatutSanction::Impaye),
        contexte: Set(type_sanction.contexte),
        date_sanction: Set(input.date_sanction),
        motif: Set(input.motif),
        ..Default::default()
    };
    let created = model.insert(db).await?;
    info!(
        "Sanction {} ({}) of {:.2} assessed to {}",
        created.id,
        type_sanction.nom,
        created.montant,
        membre.nom_complet()
    );
    Ok(created)
}

/// Records a payment against a sanction.
pub async fn pay_sanction(
    db: &DatabaseConnection,
    sanction_id: i64,
    montant: f64,
) -> Result<sanction::Model> {
    ensure_positive_amount(montant)?;

    let txn = db.begin().await?;
    let existing = Sanction::find_by_id(sanction_id)
        .one(&txn)
        .await?
        .ok_or(Error::NotFound {
            entity: "Sanction",
            id: sanction_id,
        })?;

    let reste = existing.reste_a_payer();
    if existing.statut == StatutSanction::Paye || reste <= EPSILON {
        return Err(Error::validation(format!(
            "La sanction {sanction_id} est déjà payée"
        )));
    }
    if montant > reste + EPSILON {
        return Err(Error::validation(format!(
            "Paiement de {montant:.2} supérieur au reste dû ({reste:.2})"
        )));
    }

    let paye = existing.montant_paye + montant;
    let statut = if existing.montant - paye <= EPSILON {
        StatutSanction::Paye
    } else {
        StatutSanction::Partiel
    };
    let mut active: sanction::ActiveModel = existing.into();
    active.montant_paye = Set(paye);
    active.statut = Set(statut);
    let updated = active.update(&txn).await?;
    txn.commit().await?;
    Ok(updated)
}

/// Deletes a sanction.
pub async fn delete_sanction(db: &DatabaseConnection, id: i64) -> Result<()> {
    let result = Sanction::delete_by_id(id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(Error::NotFound {
            entity: "Sanction",
            id,
        });
    }
    Ok(())
}

/// Lists sanctions dated inside `range`, newest first.
pub async fn list_in_range(
    db: &DatabaseConnection,
    range: DateRange,
) -> Result<Vec<sanction::Model>> {
    Sanction::find()
        .filter(sanction::Column::DateSanction.gte(range.start))
        .filter(sanction::Column::DateSanction.lte(range.end))
        .order_by_desc(sanction::Column::DateSanction)
        .all(db)
        .await
        .map_err(Into::into)
}

/// A member's sanctions that are not fully paid, oldest first.
pub async fn list_unpaid_for_membre<C>(db: &C, membre_id: i64) -> Result<Vec<sanction::Model>>
where
    C: ConnectionTrait,
{
    Sanction::find()
        .filter(sanction::Column::MembreId.eq(membre_id))
        .filter(sanction::Column::Statut.ne(StatutSanction::Paye))
        .order_by_asc(sanction::Column::DateSanction)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Number of sanctions the member has not fully paid.
pub async fn unpaid_count(db: &DatabaseConnection, membre_id: i64) -> Result<usize> {
    Ok(list_unpaid_for_membre(db, membre_id).await?.len())
}

/// Remaining balance across a member's unpaid sanctions.
pub async fn unpaid_balance<C>(db: &C, membre_id: i64) -> Result<f64>
where
    C: ConnectionTrait,
{
    Ok(list_unpaid_for_membre(db, membre_id)
        .await?
        .iter()
        .map(sanction::Model::reste_a_payer)
        .sum())
}

/// Sanction totals for a period, split by context and payment
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SanctionTotals {
    /// Amount assessed in meetings
    pub reunion: f64,
    /// Amount assessed in sport
    pub sport: f64,
    /// Amount collected
    pub paye: f64,
    /// Amount still owed
    pub reste: f64,
    /// Number of sanctions
    pub nombre: usize,
}

/// Computes [`SanctionTotals`] over `range`.
pub async fn totals_in_range(db: &DatabaseConnection, range: DateRange) -> Result<SanctionTotals> {
    let rows = list_in_range(db, range).await?;
    let mut totals = SanctionTotals {
        nombre: rows.len(),
        ..SanctionTotals::default()
    };
    for s in &rows {
        match s.contexte {
            ContexteSanction::Reunion => totals.reunion += s.montant,
            ContexteSanction::Sport => totals.sport += s.montant,
        }
        totals.paye += s.montant_paye;
        totals.reste += s.reste_a_payer();
    }
    Ok(totals)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_assess_uses_type_defaults() -> Result<()> {
        let (db, membre) = setup_with_membre().await?;
        let t = create_type(&db, "Carton rouge".into(), 2000.0, ContexteSanction::Sport).await?;

        let s = assess_sanction(
            &db,
            NewSanction {
                membre_id: membre.id,
                type_sanction_id: t.id,
                montant: None,
                date_sanction: date(2024, 5, 1),
                motif: None,
            },
        )
        .await?;

        assert_eq!(s.montant, 2000.0);
        assert_eq!(s.contexte, ContexteSanction::Sport);
        assert_eq!(s.statut, StatutSanction::Impaye);
        Ok(())
    }

    #[tokio::test]
    async fn test_partial_then_full_payment() -> Result<()> {
        let (db, membre) = setup_with_membre().await?;
        let s = create_test_sanction(&db, membre.id, 1000.0, date(2024, 5, 1)).await?;

        let s = pay_sanction(&db, s.id, 400.0).await?;
        assert_eq!(s.statut, StatutSanction::Partiel);
        assert_eq!(unpaid_balance(&db, membre.id).await?, 600.0);
        assert_eq!(unpaid_count(&db, membre.id).await?, 1);

        assert!(matches!(
            pay_sanction(&db, s.id, 700.0).await,
            Err(Error::Validation { .. })
        ));

        let s = pay_sanction(&db, s.id, 600.0).await?;
        assert_eq!(s.statut, StatutSanction::Paye);
        assert_eq!(unpaid_count(&db, membre.id).await?, 0);
        assert!(matches!(
            pay_sanction(&db, s.id, 1.0).await,
            Err(Error::Validation { .. })
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_sanction_clears_balance() -> Result<()> {
        let (db, membre) = setup_with_membre().await?;
        let s = create_test_sanction(&db, membre.id, 1000.0, date(2024, 5, 1)).await?;
        assert_eq!(unpaid_count(&db, membre.id).await?, 1);

        delete_sanction(&db, s.id).await?;
        assert_eq!(unpaid_count(&db, membre.id).await?, 0);
        assert_eq!(unpaid_balance(&db, membre.id).await?, 0.0);
        assert!(matches!(
            delete_sanction(&db, s.id).await,
            Err(Error::NotFound { .. })
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_totals_in_range() -> Result<()> {
        let (db, membre) = setup_with_membre().await?;
        let sport = create_type(&db, "Carton".into(), 500.0, ContexteSanction::Sport).await?;
        let s1 = create_test_sanction(&db, membre.id, 1000.0, date(2024, 5, 1)).await?;
        assess_sanction(
            &db,
            NewSanction {
                membre_id: membre.id,
                type_sanction_id: sport.id,
                montant: None,
                date_sanction: date(2024, 5, 2),
                motif: Some("Contestation".into()),
            },
        )
        .await?;
        pay_sanction(&db, s1.id, 250.0).await?;

        let totals = totals_in_range(&db, DateRange::month(2024, 5)?).await?;
        assert_eq!(
            totals,
            SanctionTotals {
                reunion: 1000.0,
                sport: 500.0,
                paye: 250.0,
                reste: 1250.0,
                nombre: 2,
            }
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_duplicate_type_rejected() -> Result<()> {
        let db = setup_test_db().await?;
        create_type(&db, "Absence".into(), 1000.0, ContexteSanction::Reunion).await?;
        assert!(matches!(
            create_type(&db, "Absence".into(), 1000.0, ContexteSanction::Reunion).await,
            Err(Error::Validation { .. })
        ));
        assert_eq!(list_types(&db).await?.len(), 1);
        Ok(())
    }
}
