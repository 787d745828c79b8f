//! Gala eligibility - Scores members on dues, attendance and discipline.
//!
//! `score = 0.4 × cotisations% + 0.5 × présence% + 10 − 10 × sanctions impayées`,
//! clamped to `[0, 100]`. A member is eligible when the four thresholds pass,
//! borderline when exactly one fails and ineligible otherwise.

use crate::{
    core::{cotisation, membre, period::DateRange, reunion, sanction},
    errors::Result,
};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Configurable eligibility thresholds
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Thresholds {
    /// Minimum share of dues paid, in percent
    pub cotisations_min: f64,
    /// Minimum meeting attendance, in percent
    pub presence_min: f64,
    /// Maximum number of unpaid sanctions
    pub sanctions_max: usize,
    /// Minimum overall score
    pub score_min: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            cotisations_min: 80.0,
            presence_min: 70.0,
            sanctions_max: 2,
            score_min: 60.0,
        }
    }
}

/// Outcome of an eligibility evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Statut {
    /// Every threshold passes
    Eligible,
    /// Exactly one threshold fails
    Limite,
    /// Two or more thresholds fail
    NonEligible,
}

impl fmt::Display for Statut {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Eligible => write!(f, "Éligible"),
            Self::Limite => write!(f, "Limite"),
            Self::NonEligible => write!(f, "Non éligible"),
        }
    }
}

/// Raw figures of one member over the evaluated period
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Indicateurs {
    /// Share of dues paid, in percent
    pub pct_cotisations: f64,
    /// Meeting attendance, in percent
    pub presence: f64,
    /// Number of sanctions not fully paid
    pub sanctions_impayees: usize,
}

/// Evaluation of one member
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evaluation {
    /// Member id
    pub membre_id: i64,
    /// Display name
    pub nom_complet: String,
    /// Inputs of the score
    pub indicateurs: Indicateurs,
    /// Score in `[0, 100]`
    pub score: f64,
    /// Resulting classification
    pub statut: Statut,
    /// Labels of the failed thresholds
    pub criteres_echoues: Vec<&'static str>,
}

/// Eligibility score clamped to `[0, 100]`
#[must_use]
pub fn score(indicateurs: &Indicateurs) -> f64 {
    #[allow(clippy::cast_precision_loss)] // sanction counts are small
    let penalite = 10.0 * indicateurs.sanctions_impayees as f64;
    (0.4 * indicateurs.pct_cotisations + 0.5 * indicateurs.presence + 10.0 - penalite)
        .clamp(0.0, 100.0)
}

/// Labels of the thresholds `indicateurs` fails
#[must_use]
pub fn failed_criteria(indicateurs: &Indicateurs, score: f64, seuils: &Thresholds) -> Vec<&'static str> {
    let mut failed = Vec::new();
    if indicateurs.pct_cotisations < seuils.cotisations_min {
        failed.push("cotisations");
    }
    if indicateurs.presence < seuils.presence_min {
        failed.push("présence");
    }
    if indicateurs.sanctions_impayees > seuils.sanctions_max {
        failed.push("sanctions");
    }
    if score < seuils.score_min {
        failed.push("score");
    }
    failed
}

/// Classifies from the number of failed thresholds
#[must_use]
pub const fn classify(failed: usize) -> Statut {
    match failed {
        0 => Statut::Eligible,
        1 => Statut::Limite,
        _ => Statut::NonEligible,
    }
}

/// Scores and classifies one set of figures.
#[must_use]
pub fn evaluate(
    membre_id: i64,
    nom_complet: String,
    indicateurs: Indicateurs,
    seuils: &Thresholds,
) -> Evaluation {
    let score = score(&indicateurs);
    let criteres_echoues = failed_criteria(&indicateurs, score, seuils);
    Evaluation {
        membre_id,
        nom_complet,
        indicateurs,
        score,
        statut: classify(criteres_echoues.len()),
        criteres_echoues,
    }
}

/// Evaluates every active member over `range`, best score first.
pub async fn evaluate_membres(
    db: &DatabaseConnection,
    range: DateRange,
    seuils: &Thresholds,
) -> Result<Vec<Evaluation>> {
    let mut evaluations = Vec::new();
    for m in membre::list_active_membres(db).await? {
        let indicateurs = Indicateurs {
            pct_cotisations: cotisation::payment_rate(db, m.id, range).await?,
            presence: reunion::attendance_rate(db, m.id, range).await?,
            sanctions_impayees: sanction::unpaid_count(db, m.id).await?,
        };
        evaluations.push(evaluate(m.id, m.nom_complet(), indicateurs, seuils));
    }
    evaluations.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| a.nom_complet.cmp(&b.nom_complet))
    });
    Ok(evaluations)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::{entities::cotisation::StatutCotisation, test_utils::*};

    fn ind(pct: f64, presence: f64, sanctions: usize) -> Indicateurs {
        Indicateurs {
            pct_cotisations: pct,
            presence,
            sanctions_impayees: sanctions,
        }
    }

    #[test]
    fn test_perfect_member_scores_100() {
        assert_eq!(score(&ind(100.0, 100.0, 0)), 100.0);
    }

    #[test]
    fn test_each_unpaid_sanction_costs_10() {
        assert_eq!(score(&ind(100.0, 100.0, 1)), 90.0);
        assert_eq!(score(&ind(100.0, 100.0, 3)), 70.0);
        assert_eq!(score(&ind(50.0, 40.0, 2)), 30.0);
        assert_eq!(score(&ind(50.0, 40.0, 4)), 10.0);
    }

    #[test]
    fn test_score_is_clamped() {
        assert_eq!(score(&ind(0.0, 0.0, 5)), 0.0);
        assert_eq!(score(&ind(150.0, 100.0, 0)), 100.0);
    }

    #[test]
    fn test_classification() {
        let seuils = Thresholds::default();
        assert_eq!(evaluate(1, "A".into(), ind(100.0, 100.0, 0), &seuils).statut, Statut::Eligible);

        let limite = evaluate(2, "B".into(), ind(100.0, 60.0, 0), &seuils);
        assert_eq!(limite.statut, Statut::Limite);
        assert_eq!(limite.criteres_echoues, vec!["présence"]);

        let non = evaluate(3, "C".into(), ind(10.0, 10.0, 5), &seuils);
        assert_eq!(non.statut, Statut::NonEligible);
        assert_eq!(non.criteres_echoues.len(), 4);
    }

    #[test]
    fn test_thresholds_are_independent() {
        let seuils = Thresholds {
            sanctions_max: 0,
            ..Thresholds::default()
        };
        let e = evaluate(1, "A".into(), ind(100.0, 100.0, 1), &seuils);
        assert_eq!(e.criteres_echoues, vec!["sanctions"]);
        assert_eq!(e.statut, Statut::Limite);
    }

    #[tokio::test]
    async fn test_evaluate_membres() -> Result<()> {
        let (db, alice, cot_type) = setup_with_membre_and_type().await?;
        let bob = create_test_membre(&db, "Ngono", "Bob").await?;

        create_test_cotisation(&db, alice.id, cot_type.id, 5_000.0, date(2024, 1, 5)).await?;
        cotisation::record_cotisation(
            &db,
            cotisation::NewCotisation {
                membre_id: bob.id,
                type_cotisation_id: cot_type.id,
                montant: Some(5_000.0),
                date_paiement: date(2024, 1, 5),
                statut: StatutCotisation::Impaye,
                notes: None,
            },
        )
        .await?;

        let r = reunion::create_reunion(&db, date(2024, 1, 14), None, None).await?;
        reunion::record_presence(&db, r.id, alice.id, true).await?;
        reunion::record_presence(&db, r.id, bob.id, false).await?;
        create_test_sanction(&db, bob.id, 500.0, date(2024, 1, 14)).await?;

        let range = DateRange::month(2024, 1)?;
        let evaluations = evaluate_membres(&db, range, &Thresholds::default()).await?;

        assert_eq!(evaluations.len(), 2);
        assert_eq!(evaluations[0].membre_id, alice.id);
        assert_eq!(evaluations[0].score, 100.0);
        assert_eq!(evaluations[0].statut, Statut::Eligible);
        assert_eq!(evaluations[1].score, 0.0);
        assert_eq!(evaluations[1].statut, Statut::NonEligible);
        Ok(())
    }
}
