//! Cash-register business logic - Daily operations and day-close reconciliation.
//!
//! The opening balance of a day is the counted balance of the previous close
//! (0 before the first close). The operations taken into account are those dated
//! after the previous close and up to the close date:
//!
//! - `solde_theorique = solde_ouverture + total_entrees - total_sorties`
//! - `ecart = solde_reel - solde_theorique`
//!
//! A business day is closed at most once, and no operation may be recorded on
//! or before the last closed day.

use crate::{
    entities::{
        FondCaisseCloture, FondCaisseOperation, fond_caisse_cloture, fond_caisse_operation,
        fond_caisse_operation::TypeOperation,
    },
    errors::{Error, Result, ensure_positive_amount},
};
use chrono::{NaiveDate, Utc};
use sea_orm::{QueryOrder, QuerySelect, Set, TransactionTrait, prelude::*};
use serde::Serialize;
use tracing::{info, warn};

/// Expected position of the register before it is counted
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CaisseSituation {
    /// Business day being reconciled
    pub date: NaiveDate,
    /// Counted balance of the previous close, or 0
    pub solde_ouverture: f64,
    /// Entries since the previous close
    pub total_entrees: f64,
    /// Exits since the previous close
    pub total_sorties: f64,
    /// `solde_ouverture + total_entrees - total_sorties`
    pub solde_theorique: f64,
    /// Number of operations considered
    pub nombre_operations: usize,
    /// Date of the previous close
    pub derniere_cloture: Option<NaiveDate>,
}

/// Theoretical closing balance
#[must_use]
pub fn solde_theorique(solde_ouverture: f64, total_entrees: f64, total_sorties: f64) -> f64 {
    solde_ouverture + total_entrees - total_sorties
}

/// Variance between counted and theoretical balance
#[must_use]
pub fn ecart(solde_reel: f64, solde_theorique: f64) -> f64 {
    solde_reel - solde_theorique
}

/// Most recent day close.
pub async fn last_cloture<C>(db: &C) -> Result<Option<fond_caisse_cloture::Model>>
where
    C: ConnectionTrait,
{
    FondCaisseCloture::find()
        .order_by_desc(fond_caisse_cloture::Column::DateCloture)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Records a cash entry or exit for `date_operation`.
pub async fn record_operation(
    db: &DatabaseConnection,
    date_operation: NaiveDate,
    type_operation: TypeOperation,
    montant: f64,
    libelle: String,
    operateur: String,
) -> Result<fond_caisse_operation::Model> {
    ensure_positive_amount(montant)?;
    if libelle.trim().is_empty() {
        return Err(Error::validation("Le libellé de l'opération est obligatoire"));
    }
    if let Some(last) = last_cloture(db).await? {
        if date_operation <= last.date_cloture {
            return Err(Error::CashRegister {
                message: format!(
                    "La caisse est clôturée jusqu'au {}, opération du {date_operation} refusée",
                    last.date_cloture
                ),
            });
        }
    }

    let model = fond_caisse_operation::ActiveModel {
        date_operation: Set(date_operation),
        type_operation: Set(type_operation),
        montant: Set(montant),
        libelle: Set(libelle.trim().to_string()),
        operateur: Set(operateur),
        ..Default::default()
    };
    let created = model.insert(db).await?;
    info!(
        "Cash {:?} of {montant:.2} on {date_operation}: {}",
        created.type_operation, created.libelle
    );
    Ok(created)
}

/// Operations after the previous close and up to `date`, oldest first.
pub async fn pending_operations<C>(
    db: &C,
    date: NaiveDate,
) -> Result<Vec<fond_caisse_operation::Model>>
where
    C: ConnectionTrait,
{
    let mut query = FondCaisseOperation::find()
        .filter(fond_caisse_operation::Column::DateOperation.lte(date));
    if let Some(last) = last_cloture(db).await? {
        query = query.filter(fond_caisse_operation::Column::DateOperation.gt(last.date_cloture));
    }
    query
        .order_by_asc(fond_caisse_operation::Column::DateOperation)
        .order_by_asc(fond_caisse_operation::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Computes the expected register position for `date` without closing it.
pub async fn situation<C>(db: &C, date: NaiveDate) -> Result<CaisseSituation>
where
    C: ConnectionTrait,
{
    let last = last_cloture(db).await?;
    let operations = pending_operations(db, date).await?;

    let total_entrees: f64 = operations
        .iter()
        .filter(|o| o.type_operation == TypeOperation::Entree)
        .map(|o| o.montant)
        .sum();
    let total_sorties: f64 = operations
        .iter()
        .filter(|o| o.type_operation == TypeOperation::Sortie)
        .map(|o| o.montant)
        .sum();
    let solde_ouverture = last.as_ref().map_or(0.0, |c| c.solde_reel);

    Ok(CaisseSituation {
        date,
        solde_ouverture,
        total_entrees,
        total_sorties,
        solde_theorique: solde_theorique(solde_ouverture, total_entrees, total_sorties),
        nombre_operations: operations.len(),
        derniere_cloture: last.map(|c| c.date_cloture),
    })
}

/// Closes the business day `date` with the balance counted by the operator.
pub async fn close_day(
    db: &DatabaseConnection,
    date: NaiveDate,
    solde_reel: f64,
    cloture_par: String,
    notes: Option<String>,
) -> Result<fond_caisse_cloture::Model> {
    if !solde_reel.is_finite() || solde_reel < 0.0 {
        return Err(Error::InvalidAmount { amount: solde_reel });
    }

    let txn = db.begin().await?;
    if let Some(last) = last_cloture(&txn).await? {
        if date <= last.date_cloture {
            return Err(Error::CashRegister {
                message: format!(
                    "La journée du {date} ne peut pas être clôturée : dernière clôture le {}",
                    last.date_cloture
                ),
            });
        }
    }

    let s = situation(&txn, date).await?;
    let ecart = ecart(solde_reel, s.solde_theorique);

    let model = fond_caisse_cloture::ActiveModel {
        date_cloture: Set(date),
        solde_ouverture: Set(s.solde_ouverture),
        total_entrees: Set(s.total_entrees),
        total_sorties: Set(s.total_sorties),
        solde_theorique: Set(s.solde_theorique),
        solde_reel: Set(solde_reel),
        ecart: Set(ecart),
        cloture_par: Set(cloture_par),
        notes: Set(notes),
        created_at: Set(Utc::now()),
        ..Default::default()
    };
    let created = model.insert(&txn).await?;
    txn.commit().await?;

    if ecart.abs() > f64::EPSILON {
        warn!("Cash register closed on {date} with a variance of {ecart:.2}");
    } else {
        info!("Cash register closed on {date}, balanced at {solde_reel:.2}");
    }
    Ok(created)
}

/// Most recent closes, newest first.
pub async fn list_clotures(
    db: &DatabaseConnection,
    limit: u64,
) -> Result<Vec<fond_caisse_cloture::Model>> {
    FondCaisseCloture::find()
        .order_by_desc(fond_caisse_cloture::Column::DateCloture)
        .limit(limit)
        .all(db)
        .await
        .map_err(Into::into)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::*;

    async fn op(db: &DatabaseConnection, d: NaiveDate, t: TypeOperation, m: f64) -> Result<()> {
        record_operation(db, d, t, m, "Test".into(), "tresorier".into()).await?;
        Ok(())
    }

    #[test]
    fn test_formulas() {
        assert_eq!(solde_theorique(1000.0, 500.0, 200.0), 1300.0);
        assert_eq!(ecart(1250.0, 1300.0), -50.0);
        assert_eq!(ecart(1300.0, 1300.0), 0.0);
    }

    #[tokio::test]
    async fn test_first_close_opens_at_zero() -> Result<()> {
        let db = setup_test_db().await?;
        op(&db, date(2024, 6, 1), TypeOperation::Entree, 10_000.0).await?;
        op(&db, date(2024, 6, 1), TypeOperation::Sortie, 2_500.0).await?;

        let s = situation(&db, date(2024, 6, 1)).await?;
        assert_eq!(s.solde_ouverture, 0.0);
        assert_eq!(s.solde_theorique, 7_500.0);
        assert_eq!(s.nombre_operations, 2);

        let c = close_day(&db, date(2024, 6, 1), 7_400.0, "tresorier".into(), None).await?;
        assert_eq!(c.solde_theorique, 7_500.0);
        assert_eq!(c.ecart, -100.0);
        Ok(())
    }

    #[tokio::test]
    async fn test_next_day_opens_with_previous_counted_balance() -> Result<()> {
        let db = setup_test_db().await?;
        op(&db, date(2024, 6, 1), TypeOperation::Entree, 10_000.0).await?;
        close_day(&db, date(2024, 6, 1), 9_900.0, "a".into(), None).await?;

        op(&db, date(2024, 6, 2), TypeOperation::Entree, 1_000.0).await?;
        op(&db, date(2024, 6, 3), TypeOperation::Sortie, 400.0).await?;

        let c = close_day(&db, date(2024, 6, 3), 10_500.0, "b".into(), None).await?;
        assert_eq!(c.solde_ouverture, 9_900.0);
        assert_eq!(c.total_entrees, 1_000.0);
        assert_eq!(c.total_sorties, 400.0);
        assert_eq!(c.solde_theorique, 10_500.0);
        assert_eq!(c.ecart, 0.0);
        assert_eq!(list_clotures(&db, 10).await?.len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_closed_day_rules() -> Result<()> {
        let db = setup_test_db().await?;
        close_day(&db, date(2024, 6, 1), 0.0, "a".into(), None).await?;

        assert!(matches!(
            close_day(&db, date(2024, 6, 1), 0.0, "a".into(), None).await,
            Err(Error::CashRegister { .. })
        ));
        assert!(matches!(
            record_operation(
                &db,
                date(2024, 6, 1),
                TypeOperation::Entree,
                10.0,
                "Tardif".into(),
                "a".into()
            )
            .await,
            Err(Error::CashRegister { .. })
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_operations_after_close_date_are_not_counted() -> Result<()> {
        let db = setup_test_db().await?;
        op(&db, date(2024, 6, 1), TypeOperation::Entree, 100.0).await?;
        op(&db, date(2024, 6, 5), TypeOperation::Entree, 900.0).await?;

        let s = situation(&db, date(2024, 6, 2)).await?;
        assert_eq!(s.total_entrees, 100.0);
        assert_eq!(s.derniere_cloture, None);
        Ok(())
    }

    #[tokio::test]
    async fn test_record_operation_validation() -> Result<()> {
        let db = setup_test_db().await?;
        assert!(matches!(
            record_operation(&db, date(2024, 1, 1), TypeOperation::Entree, -1.0, "x".into(), "a".into()).await,
            Err(Error::InvalidAmount { .. })
        ));
        assert!(matches!(
            record_operation(&db, date(2024, 1, 1), TypeOperation::Entree, 1.0, "  ".into(), "a".into()).await,
            Err(Error::Validation { .. })
        ));
        Ok(())
    }
}
