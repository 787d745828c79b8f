//! Cotisation business logic - Dues types and payments.
//!
//! Payments reference a member and a cotisation type. Amounts default to the
//! type's `montant_defaut` when the operator does not give one. Monthly totals
//! computed here feed the tontine attribution rules.

use crate::{
    core::{aggregation, membre::require_membre, period::DateRange},
    entities::{
        Cotisation, CotisationType, cotisation,
        cotisation::StatutCotisation,
        cotisation_type,
    },
    errors::{Error, Result, ensure_positive_amount},
};
use chrono::NaiveDate;
use sea_orm::{QueryOrder, Set, prelude::*};
use std::collections::HashMap;
use tracing::info;

/// Creates a cotisation type with a unique name.
pub async fn create_type(
    db: &DatabaseConnection,
    nom: String,
    montant_defaut: f64,
    obligatoire: bool,
    description: Option<String>,
) -> Result<cotisation_type::Model> {
    if nom.trim().is_empty() {
        return Err(Error::validation("Le nom du type de cotisation est obligatoire"));
    }
    if !montant_defaut.is_finite() || montant_defaut < 0.0 {
        return Err(Error::InvalidAmount {
            amount: montant_defaut,
        });
    }
    if get_type_by_name(db, nom.trim()).await?.is_some() {
        return Err(Error::validation(format!(
            "Le type de cotisation « {} » existe déjà",
            nom.trim()
        )));
    }

    let model = cotisation_type::ActiveModel {
        nom: Set(nom.trim().to_string()),
        montant_defaut: Set(montant_defaut),
        obligatoire: Set(obligatoire),
        description: Set(description),
        ..Default::default()
    };
    Ok(model.insert(db).await?)
}

/// Lists cotisation types ordered by name.
pub async fn list_types(db: &DatabaseConnection) -> Result<Vec<cotisation_type::Model>> {
    CotisationType::find()
        .order_by_asc(cotisation_type::Column::Nom)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds a cotisation type by exact name.
pub async fn get_type_by_name(
    db: &DatabaseConnection,
    nom: &str,
) -> Result<Option<cotisation_type::Model>> {
    CotisationType::find()
        .filter(cotisation_type::Column::Nom.eq(nom))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Input for [`record_cotisation`]
#[derive(Debug, Clone)]
pub struct NewCotisation {
    /// Paying member
    pub membre_id: i64,
    /// Cotisation type
    pub type_cotisation_id: i64,
    /// Amount; the type's default when `None`
    pub montant: Option<f64>,
    /// Payment date
    pub date_paiement: NaiveDate,
    /// Paid or unpaid
    pub statut: StatutCotisation,
    /// Operator notes
    pub notes: Option<String>,
}

/// Records a cotisation for an existing member and type.
pub async fn record_cotisation(
    db: &DatabaseConnection,
    input: NewCotisation,
) -> Result<cotisation::Model> {
    if let Some(montant) = input.montant {
        ensure_positive_amount(montant)?;
    }

    let membre = require_membre(db, input.membre_id).await?;
    let type_cotisation = CotisationType::find_by_id(input.type_cotisation_id)
        .one(db)
        .await?
        .ok_or(Error::NotFound {
            entity: "Type de cotisation",
            id: input.type_cotisation_id,
        })?;

    let montant = input.montant.unwrap_or(type_cotisation.montant_defaut);
    ensure_positive_amount(montant)?;

    let model = cotisation::ActiveModel {
        membre_id: Set(membre.id),
        type_cotisation_id: Set(type_cotisation.id),
        montant: Set(montant),
        date_paiement: Set(input.date_paiement),
        statut: Set(input.statut),
        notes: Set(input.notes),
        ..Default::default()
    };

    let created = model.insert(db).await?;
    info!(
        "Recorded cotisation {} of {:.2} for {} ({})",
        created.id,
        montant,
        membre.nom_complet(),
        type_cotisation.nom
    );
    Ok(created)
}

/// Toggles the paid/unpaid status of a cotisation.
pub async fn set_statut(
    db: &DatabaseConnection,
    id: i64,
    statut: StatutCotisation,
) -> Result<cotisation::Model> {
    let existing = Cotisation::find_by_id(id)
        .one(db)
        .await?
        .ok_or(Error::NotFound {
            entity: "Cotisation",
            id,
        })?;
    let mut active: cotisation::ActiveModel = existing.into();
    active.statut = Set(statut);
    Ok(active.update(db).await?)
}

/// Deletes a cotisation.
pub async fn delete_cotisation(db: &DatabaseConnection, id: i64) -> Result<()> {
    let result = Cotisation::delete_by_id(id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(Error::NotFound {
            entity: "Cotisation",
            id,
        });
    }
    Ok(())
}

/// Lists cotisations dated inside `range`, newest first.
pub async fn list_in_range<C>(db: &C, range: DateRange) -> Result<Vec<cotisation::Model>>
where
    C: ConnectionTrait,
{
    Cotisation::find()
        .filter(cotisation::Column::DatePaiement.gte(range.start))
        .filter(cotisation::Column::DatePaiement.lte(range.end))
        .order_by_desc(cotisation::Column::DatePaiement)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Lists a member's cotisations, newest first.
pub async fn list_for_membre(
    db: &DatabaseConnection,
    membre_id: i64,
) -> Result<Vec<cotisation::Model>> {
    Cotisation::find()
        .filter(cotisation::Column::MembreId.eq(membre_id))
        .order_by_desc(cotisation::Column::DatePaiement)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Sum of paid cotisations dated in the given calendar month.
pub async fn total_paid_for_month<C>(db: &C, annee: i32, mois: u32) -> Result<f64>
where
    C: ConnectionTrait,
{
    let range = DateRange::month(annee, mois)?;
    let rows = list_in_range(db, range).await?;
    Ok(rows
        .iter()
        .filter(|c| c.statut == StatutCotisation::Paye)
        .map(|c| c.montant)
        .sum())
}

/// Paid cotisation totals per member over `range`.
pub async fn paid_totals_by_membre(
    db: &DatabaseConnection,
    range: DateRange,
) -> Result<HashMap<i64, f64>> {
    let mut totals = HashMap::new();
    for c in list_in_range(db, range).await? {
        if c.statut == StatutCotisation::Paye {
            aggregation::accumulate(&mut totals, c.membre_id, c.montant);
        }
    }
    Ok(totals)
}

/// Share of a member's recorded cotisation amount that is paid, in percent.
///
/// Returns 0 when the member has no cotisation in `range`.
pub async fn payment_rate(db: &DatabaseConnection, membre_id: i64, range: DateRange) -> Result<f64> {
    let rows = Cotisation::find()
        .filter(cotisation::Column::MembreId.eq(membre_id))
        .filter(cotisation::Column::DatePaiement.gte(range.start))
        .filter(cotisation::Column::DatePaiement.lte(range.end))
        .all(db)
        .await?;

    let total: f64 = rows.iter().map(|c| c.montant).sum();
    let paid: f64 = rows
        .iter()
        .filter(|c| c.statut == StatutCotisation::Paye)
        .map(|c| c.montant)
        .sum();
    Ok(aggregation::percentage(paid, total))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_record_cotisation_validation() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();

        for montant in [0.0, -10.0, f64::NAN, f64::INFINITY] {
            let result = record_cotisation(
                &db,
                NewCotisation {
                    membre_id: 1,
                    type_cotisation_id: 1,
                    montant: Some(montant),
                    date_paiement: date(2024, 1, 5),
                    statut: StatutCotisation::Paye,
                    notes: None,
                },
            )
            .await;
            assert!(matches!(result, Err(Error::InvalidAmount { .. })));
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_record_cotisation_uses_type_default() -> Result<()> {
        let (db, membre, type_cotisation) = setup_with_membre_and_type().await?;

        let c = record_cotisation(
            &db,
            NewCotisation {
                membre_id: membre.id,
                type_cotisation_id: type_cotisation.id,
                montant: None,
                date_paiement: date(2024, 2, 10),
                statut: StatutCotisation::Paye,
                notes: None,
            },
        )
        .await?;
        assert_eq!(c.montant, type_cotisation.montant_defaut);
        Ok(())
    }

    #[tokio::test]
    async fn test_record_cotisation_unknown_member() -> Result<()> {
        let (db, _membre, type_cotisation) = setup_with_membre_and_type().await?;
        let result = record_cotisation(
            &db,
            NewCotisation {
                membre_id: 999,
                type_cotisation_id: type_cotisation.id,
                montant: Some(100.0),
                date_paiement: date(2024, 2, 10),
                statut: StatutCotisation::Paye,
                notes: None,
            },
        )
        .await;
        assert!(matches!(result, Err(Error::MemberNotFound { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_duplicate_type_rejected() -> Result<()> {
        let db = setup_test_db().await?;
        create_type(&db, "Mensuelle".into(), 5000.0, true, None).await?;
        let result = create_type(&db, "Mensuelle".into(), 1000.0, false, None).await;
        assert!(matches!(result, Err(Error::Validation { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_total_paid_for_month_ignores_unpaid_and_other_months() -> Result<()> {
        let (db, membre, t) = setup_with_membre_and_type().await?;
        create_test_cotisation(&db, membre.id, t.id, 5000.0, date(2024, 3, 1)).await?;
        create_test_cotisation(&db, membre.id, t.id, 7000.0, date(2024, 3, 31)).await?;
        create_test_cotisation(&db, membre.id, t.id, 2000.0, date(2024, 4, 1)).await?;
        let unpaid = create_test_cotisation(&db, membre.id, t.id, 900.0, date(2024, 3, 15)).await?;
        set_statut(&db, unpaid.id, StatutCotisation::Impaye).await?;

        assert_eq!(total_paid_for_month(&db, 2024, 3).await?, 12000.0);
        assert_eq!(total_paid_for_month(&db, 2024, 4).await?, 2000.0);
        assert_eq!(total_paid_for_month(&db, 2024, 5).await?, 0.0);
        Ok(())
    }

    #[tokio::test]
    async fn test_payment_rate_and_totals_by_membre() -> Result<()> {
        let (db, membre, t) = setup_with_membre_and_type().await?;
        let autre = create_test_membre(&db, "Bella", "Marie").await?;
        create_test_cotisation(&db, membre.id, t.id, 3000.0, date(2024, 1, 10)).await?;
        let unpaid = create_test_cotisation(&db, membre.id, t.id, 1000.0, date(2024, 1, 20)).await?;
        set_statut(&db, unpaid.id, StatutCotisation::Impaye).await?;
        create_test_cotisation(&db, autre.id, t.id, 500.0, date(2024, 1, 10)).await?;

        let range = DateRange::new(date(2024, 1, 1), date(2024, 1, 31))?;
        assert_eq!(payment_rate(&db, membre.id, range).await?, 75.0);
        assert_eq!(payment_rate(&db, 999, range).await?, 0.0);

        let totals = paid_totals_by_membre(&db, range).await?;
        assert_eq!(totals.get(&membre.id), Some(&3000.0));
        assert_eq!(totals.get(&autre.id), Some(&500.0));
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_cotisation() -> Result<()> {
        let (db, membre, t) = setup_with_membre_and_type().await?;
        let c = create_test_cotisation(&db, membre.id, t.id, 100.0, date(2024, 1, 1)).await?;
        delete_cotisation(&db, c.id).await?;
        assert!(list_for_membre(&db, membre.id).await?.is_empty());
        assert!(matches!(
            delete_cotisation(&db, c.id).await,
            Err(Error::NotFound { .. })
        ));
        Ok(())
    }
}
