//! Loan business logic - Granting, repaying and tracking member loans.
//!
//! Interest is a flat percentage of the principal: the amount due is
//! `montant * (1 + taux_interet / 100)`. Repayments accumulate in
//! `montant_rembourse`; the loan switches to `rembourse` once nothing remains.

use crate::{
    core::{membre::require_membre, period::DateRange},
    entities::{Pret, pret, pret::StatutPret},
    errors::{Error, Result, ensure_positive_amount},
};
use chrono::NaiveDate;
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use tracing::info;

/// Tolerance below which a remaining balance counts as repaid
const EPSILON: f64 = 0.005;

/// Input for [`grant_pret`]
#[derive(Debug, Clone)]
pub struct NewPret {
    /// Borrower
    pub membre_id: i64,
    /// Principal
    pub montant: f64,
    /// Interest rate in percent
    pub taux_interet: f64,
    /// Grant date
    pub date_pret: NaiveDate,
    /// Due date
    pub echeance: NaiveDate,
    /// Notes
    pub notes: Option<String>,
}

/// Total amount the borrower owes, interest included
#[must_use]
pub fn montant_du(pret: &pret::Model) -> f64 {
    pret.montant + pret.montant * pret.taux_interet / 100.0
}

/// Amount still owed
#[must_use]
pub fn reste_a_payer(pret: &pret::Model) -> f64 {
    (montant_du(pret) - pret.montant_rembourse).max(0.0)
}

/// Whether the loan is past its due date at `date` and not repaid
#[must_use]
pub fn is_overdue(pret: &pret::Model, date: NaiveDate) -> bool {
    pret.statut == StatutPret::EnCours && pret.echeance < date
}

/// Grants a loan after validating amount, rate and dates.
pub async fn grant_pret(db: &DatabaseConnection, input: NewPret) -> Result<pret::Model> {
    ensure_positive_amount(input.montant)?;
    if !input.taux_interet.is_finite() || input.taux_interet < 0.0 {
        return Err(Error::validation(format!(
            "Taux d'intérêt invalide : {}",
            input.taux_interet
        )));
    }
    if input.echeance < input.date_pret {
        return Err(Error::validation(
            "L'échéance doit être postérieure à la date du prêt",
        ));
    }
    let membre = require_membre(db, input.membre_id).await?;

    let model = pret::ActiveModel {
        membre_id: Set(membre.id),
        montant: Set(input.montant),
        montant_rembourse: Set(0.0),
        taux_interet: Set(input.taux_interet),
        date_pret: Set(input.date_pret),
        echeance: Set(input.echeance),
        statut: Set(StatutPret::EnCours),
        notes: Set(input.notes),
        ..Default::default()
    };
    let created = model.insert(db).await?;
    info!(
        "Granted loan {} of {:.2} at {:.1}% to {}",
        created.id,
        created.montant,
        created.taux_interet,
        membre.nom_complet()
    );
    Ok(created)
}

/// Records a repayment; the amount may not exceed what remains.
pub async fn repay(db: &DatabaseConnection, pret_id: i64, montant: f64) -> Result<pret::Model> {
    ensure_positive_amount(montant)?;

    let txn = db.begin().await?;
    let pret = Pret::find_by_id(pret_id).one(&txn).await?.ok_or(Error::NotFound {
        entity: "Prêt",
        id: pret_id,
    })?;

    if pret.statut == StatutPret::Rembourse {
        return Err(Error::validation(format!("Le prêt {pret_id} est déjà remboursé")));
    }
    let reste = reste_a_payer(&pret);
    if montant > reste + EPSILON {
        return Err(Error::validation(format!(
            "Remboursement de {montant:.2} supérieur au reste dû ({reste:.2})"
        )));
    }

    let nouveau_rembourse = pret.montant_rembourse + montant;
    let statut = if montant_du(&pret) - nouveau_rembourse <= EPSILON {
        StatutPret::Rembourse
    } else {
        StatutPret::EnCours
    };

    let mut active: pret::ActiveModel = pret.into();
    active.montant_rembourse = Set(nouveau_rembourse);
    active.statut = Set(statut);
    let updated = active.update(&txn).await?;
    txn.commit().await?;

    info!("Repayment of {montant:.2} on loan {pret_id}, status {statut:?}");
    Ok(updated)
}

/// Lists every loan, most recent first.
pub async fn list_prets(db: &DatabaseConnection) -> Result<Vec<pret::Model>> {
    Pret::find()
        .order_by_desc(pret::Column::DatePret)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Loans granted inside `range`, oldest first.
pub async fn list_in_range(db: &DatabaseConnection, range: DateRange) -> Result<Vec<pret::Model>> {
    Pret::find()
        .filter(pret::Column::DatePret.gte(range.start))
        .filter(pret::Column::DatePret.lte(range.end))
        .order_by_asc(pret::Column::DatePret)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Lists a member's loans that are not repaid.
pub async fn list_open_for_membre<C>(db: &C, membre_id: i64) -> Result<Vec<pret::Model>>
where
    C: ConnectionTrait,
{
    Pret::find()
        .filter(pret::Column::MembreId.eq(membre_id))
        .filter(pret::Column::Statut.eq(StatutPret::EnCours))
        .order_by_asc(pret::Column::Echeance)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Loans past due at `date`.
pub async fn list_overdue(db: &DatabaseConnection, date: NaiveDate) -> Result<Vec<pret::Model>> {
    Pret::find()
        .filter(pret::Column::Statut.eq(StatutPret::EnCours))
        .filter(pret::Column::Echeance.lt(date))
        .order_by_asc(pret::Column::Echeance)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Sum of what remains owed on all open loans.
pub async fn total_outstanding(db: &DatabaseConnection) -> Result<f64> {
    let open = Pret::find()
        .filter(pret::Column::Statut.eq(StatutPret::EnCours))
        .all(db)
        .await?;
    Ok(open.iter().map(reste_a_payer).sum())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::*;

    fn new_pret(membre_id: i64) -> NewPret {
        NewPret {
            membre_id,
            montant: 10_000.0,
            taux_interet: 10.0,
            date_pret: date(2024, 1, 1),
            echeance: date(2024, 6, 30),
            notes: None,
        }
    }

    #[tokio::test]
    async fn test_grant_validation() -> Result<()> {
        let (db, membre) = setup_with_membre().await?;

        let mut input = new_pret(membre.id);
        input.taux_interet = -1.0;
        assert!(matches!(grant_pret(&db, input).await, Err(Error::Validation { .. })));

        let mut input = new_pret(membre.id);
        input.echeance = date(2023, 12, 1);
        assert!(matches!(grant_pret(&db, input).await, Err(Error::Validation { .. })));

        let mut input = new_pret(membre.id);
        input.montant = 0.0;
        assert!(matches!(grant_pret(&db, input).await, Err(Error::InvalidAmount { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_repay_until_fully_repaid() -> Result<()> {
        let (db, membre) = setup_with_membre().await?;
        let pret = grant_pret(&db, new_pret(membre.id)).await?;
        assert_eq!(montant_du(&pret), 11_000.0);

        let pret = repay(&db, pret.id, 6_000.0).await?;
        assert_eq!(pret.statut, StatutPret::EnCours);
        assert_eq!(reste_a_payer(&pret), 5_000.0);

        assert!(matches!(
            repay(&db, pret.id, 5_000.01 + 1.0).await,
            Err(Error::Validation { .. })
        ));

        let pret = repay(&db, pret.id, 5_000.0).await?;
        assert_eq!(pret.statut, StatutPret::Rembourse);
        assert_eq!(reste_a_payer(&pret), 0.0);
        assert!(matches!(repay(&db, pret.id, 1.0).await, Err(Error::Validation { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_overdue_and_outstanding() -> Result<()> {
        let (db, membre) = setup_with_membre().await?;
        let pret = grant_pret(&db, new_pret(membre.id)).await?;

        assert!(list_overdue(&db, date(2024, 6, 30)).await?.is_empty());
        let overdue = list_overdue(&db, date(2024, 7, 1)).await?;
        assert_eq!(overdue.len(), 1);
        assert!(is_overdue(&overdue[0], date(2024, 7, 1)));

        repay(&db, pret.id, 1_000.0).await?;
        assert_eq!(total_outstanding(&db).await?, 10_000.0);
        assert_eq!(list_open_for_membre(&db, membre.id).await?.len(), 1);
        assert_eq!(list_prets(&db).await?.len(), 1);
        Ok(())
    }
}
