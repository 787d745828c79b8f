//! Dashboard business logic - Monthly evolution, period summaries and rankings.

use crate::{
    core::{
        aggregation::{self, MonthlyBucket},
        cotisation, epargne,
        period::DateRange,
        pret, sanction,
        sanction::SanctionTotals,
    },
    entities::cotisation::StatutCotisation,
    errors::Result,
};
use chrono::{Datelike, Months, NaiveDate};
use sea_orm::DatabaseConnection;
use serde::Serialize;

/// Cotisations and savings collected in one calendar month
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvolutionPoint {
    /// `YYYY-MM` key
    pub month: String,
    /// Paid cotisations
    pub cotisations: f64,
    /// Savings deposits
    pub epargnes: f64,
}

/// Amount and count of one flow over a period
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FlowSummary {
    /// Sum of the amounts
    pub total: f64,
    /// Number of rows
    pub nombre: usize,
    /// Percent change in row count between the two halves of the period
    pub tendance: f64,
}

impl FlowSummary {
    fn from_rows(rows: &[(NaiveDate, f64)], range: DateRange) -> Self {
        let dates: Vec<NaiveDate> = rows.iter().map(|(d, _)| *d).collect();
        Self {
            total: rows.iter().map(|(_, m)| m).sum(),
            nombre: rows.len(),
            tendance: aggregation::trend_percent(&dates, range.midpoint()),
        }
    }
}

/// Headline figures of the dashboard for a period
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodSummary {
    /// Evaluated period
    pub range: DateRange,
    /// Paid cotisations
    pub cotisations: FlowSummary,
    /// Savings deposits
    pub epargnes: FlowSummary,
    /// Loans granted
    pub prets: FlowSummary,
    /// Sanctions assessed
    pub sanctions: SanctionTotals,
}

fn window_range(reference: NaiveDate) -> Result<DateRange> {
    let first = reference
        .with_day(1)
        .and_then(|d| d.checked_sub_months(Months::new(aggregation::MONTHS_IN_WINDOW - 1)))
        .unwrap_or(reference);
    let end = DateRange::month(reference.year(), reference.month())?.end;
    DateRange::new(first, end)
}

async fn paid_cotisation_rows(db: &DatabaseConnection, range: DateRange) -> Result<Vec<(NaiveDate, f64)>> {
    Ok(cotisation::list_in_range(db, range)
        .await?
        .into_iter()
        .filter(|c| c.statut == StatutCotisation::Paye)
        .map(|c| (c.date_paiement, c.montant))
        .collect())
}

async fn epargne_rows(db: &DatabaseConnection, range: DateRange) -> Result<Vec<(NaiveDate, f64)>> {
    Ok(epargne::list_in_range(db, range)
        .await?
        .into_iter()
        .map(|e| (e.date_depot, e.montant))
        .collect())
}

/// Twelve monthly points ending with the month of `reference`, oldest first.
pub async fn evolution_mensuelle(
    db: &DatabaseConnection,
    reference: NaiveDate,
) -> Result<Vec<EvolutionPoint>> {
    let range = window_range(reference)?;
    let cotisations = aggregation::monthly_buckets(&paid_cotisation_rows(db, range).await?, reference);
    let epargnes = aggregation::monthly_buckets(&epargne_rows(db, range).await?, reference);

    Ok(cotisations
        .into_iter()
        .zip(epargnes)
        .map(|(c, e): (MonthlyBucket, MonthlyBucket)| EvolutionPoint {
            month: c.month,
            cotisations: c.total,
            epargnes: e.total,
        })
        .collect())
}

/// Totals and count trends of every flow over `range`.
pub async fn period_summary(db: &DatabaseConnection, range: DateRange) -> Result<PeriodSummary> {
    let prets: Vec<(NaiveDate, f64)> = pret::list_in_range(db, range)
        .await?
        .into_iter()
        .map(|p| (p.date_pret, p.montant))
        .collect();

    Ok(PeriodSummary {
        range,
        cotisations: FlowSummary::from_rows(&paid_cotisation_rows(db, range).await?, range),
        epargnes: FlowSummary::from_rows(&epargne_rows(db, range).await?, range),
        prets: FlowSummary::from_rows(&prets, range),
        sanctions: sanction::totals_in_range(db, range).await?,
    })
}

/// Top-`n` members by paid cotisations over `range`.
pub async fn top_contributors(
    db: &DatabaseConnection,
    range: DateRange,
    n: usize,
) -> Result<Vec<(i64, f64)>> {
    let totals = cotisation::paid_totals_by_membre(db, range).await?;
    Ok(aggregation::top_n(totals, n))
}
