//! Tontine business logic - Monthly attribution of the collected cotisations.
//!
//! An attribution set for a month is valid when `0 < total attribué <= total
//! des cotisations payées du mois`. Saving a month replaces every previous row
//! of that month inside a single transaction.

use crate::{
    core::{cotisation, membre::require_membre, period::DateRange, pret, sanction},
    entities::{TontineAttribution, tontine_attribution},
    errors::{Error, Result, ensure_positive_amount},
};
use chrono::{Local, NaiveDate};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use serde::Serialize;
use std::collections::HashSet;
use tracing::{info, warn};

/// Tolerance on amounts, half a cent
const EPSILON: f64 = 0.005;

/// One beneficiary and the amount attributed to them
#[derive(Debug, Clone, PartialEq)]
pub struct Beneficiaire {
    /// Beneficiary member
    pub membre_id: i64,
    /// Attributed amount
    pub montant: f64,
}

/// Month overview for the tontine screen
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TontineSummary {
    /// Month (1-12)
    pub mois: u32,
    /// Year
    pub annee: i32,
    /// Paid cotisations collected in the month
    pub total_cotisations: f64,
    /// Saved attributions for the month
    pub attributions: Vec<tontine_attribution::Model>,
    /// Sum of the saved attributions
    pub total_attribue: f64,
    /// `total_cotisations - total_attribue`
    pub reste: f64,
}

/// Net payout of a beneficiary once their debts are settled
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SoldeNet {
    /// Beneficiary
    pub membre_id: i64,
    /// Amount attributed for the month
    pub montant_attribue: f64,
    /// Remaining balance of unpaid sanctions
    pub sanctions_impayees: f64,
    /// Remaining balance of loans due by the end of the month
    pub prets_echus: f64,
    /// `montant_attribue - deductions`, never below 0
    pub solde_net: f64,
}

/// Checks the attribution invariant against the month's collection.
///
/// # Errors
/// Returns [`Error::InvalidAttribution`] when the total is 0 or exceeds the
/// collected cotisations.
pub fn validate_total(
    mois: u32,
    annee: i32,
    total_attribue: f64,
    total_cotisations: f64,
) -> Result<()> {
    if total_attribue <= 0.0 || total_attribue > total_cotisations + EPSILON {
        return Err(Error::InvalidAttribution {
            mois,
            annee,
            total_attribue,
            total_cotisations,
        });
    }
    Ok(())
}

/// Attributions saved for a month, largest first.
pub async fn list_attributions<C>(
    db: &C,
    mois: u32,
    annee: i32,
) -> Result<Vec<tontine_attribution::Model>>
where
    C: ConnectionTrait,
{
    let mois_i32 = i32::try_from(mois)?;
    TontineAttribution::find()
        .filter(tontine_attribution::Column::Mois.eq(mois_i32))
        .filter(tontine_attribution::Column::Annee.eq(annee))
        .order_by_desc(tontine_attribution::Column::Montant)
        .order_by_asc(tontine_attribution::Column::MembreId)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Collected, attributed and remaining amounts for a month.
pub async fn monthly_summary(
    db: &DatabaseConnection,
    mois: u32,
    annee: i32,
) -> Result<TontineSummary> {
    let total_cotisations = cotisation::total_paid_for_month(db, annee, mois).await?;
    let attributions = list_attributions(db, mois, annee).await?;
    let total_attribue: f64 = attributions.iter().map(|a| a.montant).sum();
    let reste = total_cotisations - total_attribue;
    if reste < -EPSILON {
        warn!(
            "Tontine {mois:02}/{annee}: attributed {total_attribue:.2} exceeds collected {total_cotisations:.2}"
        );
    }

    Ok(TontineSummary {
        mois,
        annee,
        total_cotisations,
        attributions,
        total_attribue,
        reste,
    })
}

/// Replaces the attribution set of a month.
///
/// All rows of the month are deleted and the new set inserted in the same
/// transaction; on any failure the previous set is kept.
pub async fn save_attributions(
    db: &DatabaseConnection,
    mois: u32,
    annee: i32,
    beneficiaires: Vec<Beneficiaire>,
    notes: Option<String>,
) -> Result<Vec<tontine_attribution::Model>> {
    DateRange::month(annee, mois)?;

    let mut seen = HashSet::new();
    for b in &beneficiaires {
        ensure_positive_amount(b.montant)?;
        if !seen.insert(b.membre_id) {
            return Err(Error::validation(format!(
                "Le membre {} apparaît plusieurs fois dans l'attribution",
                b.membre_id
            )));
        }
    }

    let txn = db.begin().await?;

    let total_cotisations = cotisation::total_paid_for_month(&txn, annee, mois).await?;
    let total_attribue: f64 = beneficiaires.iter().map(|b| b.montant).sum();
    validate_total(mois, annee, total_attribue, total_cotisations)?;

    for b in &beneficiaires {
        require_membre(&txn, b.membre_id).await?;
    }

    let mois_i32 = i32::try_from(mois)?;
    let deleted = TontineAttribution::delete_many()
        .filter(tontine_attribution::Column::Mois.eq(mois_i32))
        .filter(tontine_attribution::Column::Annee.eq(annee))
        .exec(&txn)
        .await?;

    let today = Local::now().date_naive();
    let mut saved = Vec::with_capacity(beneficiaires.len());
    for b in beneficiaires {
        let model = tontine_attribution::ActiveModel {
            membre_id: Set(b.membre_id),
            mois: Set(mois_i32),
            annee: Set(annee),
            montant: Set(b.montant),
            date_attribution: Set(today),
            notes: Set(notes.clone()),
            ..Default::default()
        };
        saved.push(model.insert(&txn).await?);
    }

    txn.commit().await?;
    info!(
        "Tontine {mois:02}/{annee}: replaced {} attribution(s) with {} totalling {total_attribue:.2}",
        deleted.rows_affected,
        saved.len()
    );
    Ok(saved)
}

/// Net payout of a beneficiary for a month.
///
/// Unpaid sanctions and the outstanding part of loans whose due date falls
/// on or before the last day of the month are deducted.
pub async fn solde_net_beneficiaire(
    db: &DatabaseConnection,
    membre_id: i64,
    mois: u32,
    annee: i32,
) -> Result<SoldeNet> {
    let fin_du_mois: NaiveDate = DateRange::month(annee, mois)?.end;
    let montant_attribue: f64 = list_attributions(db, mois, annee)
        .await?
        .iter()
        .filter(|a| a.membre_id == membre_id)
        .map(|a| a.montant)
        .sum();

    let sanctions_impayees = sanction::unpaid_balance(db, membre_id).await?;
    let prets_echus: f64 = pret::list_open_for_membre(db, membre_id)
        .await?
        .iter()
        .filter(|p| p.echeance <= fin_du_mois)
        .map(pret::reste_a_payer)
        .sum();

    Ok(SoldeNet {
        membre_id,
        montant_attribue,
        sanctions_impayees,
        prets_echus,
        solde_net: (montant_attribue - sanctions_impayees - prets_echus).max(0.0),
    })
}
