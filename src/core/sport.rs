//! Sports business logic - Matches, player statistics and rankings for the
//! E2D and Phoenix sub-clubs.

use crate::{
    core::{aggregation, membre, period::DateRange},
    entities::{
        MatchStatistic, SportMatch, match_statistic,
        sport_match::{self, Equipe},
    },
    errors::{Error, Result},
};
use chrono::NaiveDate;
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*, sea_query::Expr};
use serde::Serialize;
use std::{collections::HashMap, str::FromStr};
use tracing::info;

/// Input for [`create_match`]
#[derive(Debug, Clone)]
pub struct NewMatch {
    /// Sub-club that played
    pub equipe: Equipe,
    /// Match day
    pub date_match: NaiveDate,
    /// Opponent name
    pub adversaire: String,
    /// Goals scored
    pub score_equipe: i32,
    /// Goals conceded
    pub score_adverse: i32,
    /// Venue
    pub lieu: Option<String>,
    /// Competition or friendly
    pub competition: Option<String>,
}

/// One player's line for a match
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayerStats {
    /// Player
    pub membre_id: i64,
    /// Goals
    pub buts: i32,
    /// Assists
    pub passes_decisives: i32,
    /// Yellow cards
    pub cartons_jaunes: i32,
    /// Red cards
    pub cartons_rouges: i32,
    /// Man of the match
    pub homme_du_match: bool,
}

/// Ranking criterion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Critere {
    /// Goals scored
    Buts,
    /// Assists
    Passes,
    /// Man-of-the-match awards
    HommeDuMatch,
}

impl Critere {
    /// Labels accepted by [`Critere::from_str`]
    pub const LABELS: [&'static str; 3] = ["buts", "passes", "homme_du_match"];
}

impl FromStr for Critere {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "buts" => Ok(Self::Buts),
            "passes" => Ok(Self::Passes),
            "homme_du_match" => Ok(Self::HommeDuMatch),
            other => Err(Error::validation(format!("Critère de classement inconnu : {other}"))),
        }
    }
}

/// Win/draw/loss record of a team
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TeamRecord {
    /// Matches played
    pub joues: u32,
    /// Wins
    pub victoires: u32,
    /// Draws
    pub nuls: u32,
    /// Losses
    pub defaites: u32,
    /// Goals scored
    pub buts_pour: i32,
    /// Goals conceded
    pub buts_contre: i32,
}

impl TeamRecord {
    /// `buts_pour - buts_contre`
    #[must_use]
    pub const fn difference(&self) -> i32 {
        self.buts_pour - self.buts_contre
    }
}

fn ensure_non_negative(label: &str, value: i32) -> Result<()> {
    if value < 0 {
        return Err(Error::validation(format!("{label} ne peut pas être négatif : {value}")));
    }
    Ok(())
}

/// Records a played match.
pub async fn create_match(db: &DatabaseConnection, input: NewMatch) -> Result<sport_match::Model> {
    if input.adversaire.trim().is_empty() {
        return Err(Error::validation("L'adversaire est obligatoire"));
    }
    ensure_non_negative("Le score", input.score_equipe)?;
    ensure_non_negative("Le score adverse", input.score_adverse)?;

    let model = sport_match::ActiveModel {
        equipe: Set(input.equipe),
        date_match: Set(input.date_match),
        adversaire: Set(input.adversaire.trim().to_string()),
        score_equipe: Set(input.score_equipe),
        score_adverse: Set(input.score_adverse),
        lieu: Set(input.lieu),
        competition: Set(input.competition),
        ..Default::default()
    };
    let created = model.insert(db).await?;
    info!(
        "{} {}-{} {} on {}",
        created.equipe, created.score_equipe, created.score_adverse, created.adversaire, created.date_match
    );
    Ok(created)
}

/// Fetches a match or fails with [`Error::NotFound`].
pub async fn require_match<C>(db: &C, id: i64) -> Result<sport_match::Model>
where
    C: ConnectionTrait,
{
    SportMatch::find_by_id(id).one(db).await?.ok_or(Error::NotFound {
        entity: "Match",
        id,
    })
}

/// Lists a team's matches in `range`, most recent first.
pub async fn list_matches(
    db: &DatabaseConnection,
    equipe: Equipe,
    range: DateRange,
) -> Result<Vec<sport_match::Model>> {
    SportMatch::find()
        .filter(sport_match::Column::Equipe.eq(equipe))
        .filter(sport_match::Column::DateMatch.gte(range.start))
        .filter(sport_match::Column::DateMatch.lte(range.end))
        .order_by_desc(sport_match::Column::DateMatch)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Records a player's statistics for a match, replacing any previous line.
///
/// The player must belong to the sub-club that played the match. A match has
/// at most one man of the match: flagging a player clears the flag elsewhere.
pub async fn record_stats(
    db: &DatabaseConnection,
    match_id: i64,
    stats: PlayerStats,
) -> Result<match_statistic::Model> {
    for (label, value) in [
        ("Le nombre de buts", stats.buts),
        ("Le nombre de passes", stats.passes_decisives),
        ("Le nombre de cartons jaunes", stats.cartons_jaunes),
        ("Le nombre de cartons rouges", stats.cartons_rouges),
    ] {
        ensure_non_negative(label, value)?;
    }

    let txn = db.begin().await?;
    let game = require_match(&txn, match_id).await?;
    let joueur = membre::require_membre(&txn, stats.membre_id).await?;
    if !membre::is_in_team(&joueur, game.equipe) {
        return Err(Error::validation(format!(
            "{} ne fait pas partie de l'équipe {}",
            joueur.nom_complet(),
            game.equipe
        )));
    }

    MatchStatistic::delete_many()
        .filter(match_statistic::Column::MatchId.eq(match_id))
        .filter(match_statistic::Column::MembreId.eq(stats.membre_id))
        .exec(&txn)
        .await?;

    if stats.homme_du_match {
        MatchStatistic::update_many()
            .col_expr(match_statistic::Column::HommeDuMatch, Expr::value(false))
            .filter(match_statistic::Column::MatchId.eq(match_id))
            .exec(&txn)
            .await?;
    }

    let model = match_statistic::ActiveModel {
        match_id: Set(match_id),
        membre_id: Set(stats.membre_id),
        buts: Set(stats.buts),
        passes_decisives: Set(stats.passes_decisives),
        cartons_jaunes: Set(stats.cartons_jaunes),
        cartons_rouges: Set(stats.cartons_rouges),
        homme_du_match: Set(stats.homme_du_match),
        ..Default::default()
    };
    let created = model.insert(&txn).await?;
    txn.commit().await?;
    Ok(created)
}

/// Statistic lines of a match.
pub async fn list_stats(
    db: &DatabaseConnection,
    match_id: i64,
) -> Result<Vec<match_statistic::Model>> {
    MatchStatistic::find()
        .filter(match_statistic::Column::MatchId.eq(match_id))
        .all(db)
        .await
        .map_err(Into::into)
}

/// Folds match scores into a team record
#[must_use]
pub fn team_record(matches: &[sport_match::Model]) -> TeamRecord {
    matches.iter().fold(TeamRecord::default(), |mut acc, m| {
        acc.joues += 1;
        acc.buts_pour += m.score_equipe;
        acc.buts_contre += m.score_adverse;
        match m.score_equipe.cmp(&m.score_adverse) {
            std::cmp::Ordering::Greater => acc.victoires += 1,
            std::cmp::Ordering::Equal => acc.nuls += 1,
            std::cmp::Ordering::Less => acc.defaites += 1,
        }
        acc
    })
}

/// Team record over `range`.
pub async fn team_record_in_range(
    db: &DatabaseConnection,
    equipe: Equipe,
    range: DateRange,
) -> Result<TeamRecord> {
    Ok(team_record(&list_matches(db, equipe, range).await?))
}

/// Top-`n` players of a team over `range` by `critere`.
///
/// Players with a zero total are left out.
pub async fn player_ranking(
    db: &DatabaseConnection,
    equipe: Equipe,
    range: DateRange,
    critere: Critere,
    n: usize,
) -> Result<Vec<(i64, f64)>> {
    let match_ids: Vec<i64> = list_matches(db, equipe, range)
        .await?
        .into_iter()
        .map(|m| m.id)
        .collect();
    if match_ids.is_empty() {
        return Ok(Vec::new());
    }

    let lines = MatchStatistic::find()
        .filter(match_statistic::Column::MatchId.is_in(match_ids))
        .all(db)
        .await?;

    let mut totals: HashMap<i64, f64> = HashMap::new();
    for line in lines {
        let value = match critere {
            Critere::Buts => f64::from(line.buts),
            Critere::Passes => f64::from(line.passes_decisives),
            Critere::HommeDuMatch => f64::from(u8::from(line.homme_du_match)),
        };
        if value > 0.0 {
            aggregation::accumulate(&mut totals, line.membre_id, value);
        }
    }
    Ok(aggregation::top_n(totals, n))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::*;

    fn new_match(equipe: Equipe, d: NaiveDate, pour: i32, contre: i32) -> NewMatch {
        NewMatch {
            equipe,
            date_match: d,
            adversaire: "FC Voisins".into(),
            score_equipe: pour,
            score_adverse: contre,
            lieu: None,
            competition: None,
        }
    }

    async fn joueur_e2d(db: &DatabaseConnection, nom: &str, prenom: &str) -> Result<i64> {
        let m = create_test_membre(db, nom, prenom).await?;
        Ok(membre::set_teams(db, m.id, true, false).await?.id)
    }

    fn buts(membre_id: i64, buts: i32) -> PlayerStats {
        PlayerStats {
            membre_id,
            buts,
            ..PlayerStats::default()
        }
    }

    #[tokio::test]
    async fn test_team_record() -> Result<()> {
        let db = setup_test_db().await?;
        create_match(&db, new_match(Equipe::E2d, date(2024, 5, 1), 3, 1)).await?;
        create_match(&db, new_match(Equipe::E2d, date(2024, 5, 8), 2, 2)).await?;
        create_match(&db, new_match(Equipe::E2d, date(2024, 5, 15), 0, 1)).await?;
        create_match(&db, new_match(Equipe::Phoenix, date(2024, 5, 15), 9, 0)).await?;

        let record = team_record_in_range(&db, Equipe::E2d, DateRange::month(2024, 5)?).await?;
        assert_eq!(
            record,
            TeamRecord {
                joues: 3,
                victoires: 1,
                nuls: 1,
                defaites: 1,
                buts_pour: 5,
                buts_contre: 4,
            }
        );
        assert_eq!(record.difference(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_record_stats_replaces_line() -> Result<()> {
        let db = setup_test_db().await?;
        let joueur = joueur_e2d(&db, "Eto", "Samuel").await?;
        let game = create_match(&db, new_match(Equipe::E2d, date(2024, 5, 1), 3, 1)).await?;

        record_stats(&db, game.id, buts(joueur, 1)).await?;
        record_stats(&db, game.id, buts(joueur, 2)).await?;

        let lines = list_stats(&db, game.id).await?;
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].buts, 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_single_homme_du_match_per_match() -> Result<()> {
        let db = setup_test_db().await?;
        let alice = joueur_e2d(&db, "Mbarga", "Alice").await?;
        let bob = joueur_e2d(&db, "Ngono", "Bob").await?;
        let game = create_match(&db, new_match(Equipe::E2d, date(2024, 5, 1), 3, 1)).await?;
        let mvp = |membre_id| PlayerStats {
            homme_du_match: true,
            ..buts(membre_id, 1)
        };

        record_stats(&db, game.id, mvp(alice)).await?;
        record_stats(&db, game.id, mvp(bob)).await?;
        record_stats(&db, game.id, buts(alice, 2)).await?;

        let flagged: Vec<i64> = list_stats(&db, game.id)
            .await?
            .into_iter()
            .filter(|l| l.homme_du_match)
            .map(|l| l.membre_id)
            .collect();
        assert_eq!(flagged, vec![bob]);
        Ok(())
    }

    #[tokio::test]
    async fn test_record_stats_requires_team_membership() -> Result<()> {
        let (db, joueur) = setup_with_membre().await?;
        let game = create_match(&db, new_match(Equipe::Phoenix, date(2024, 5, 1), 1, 0)).await?;

        let result = record_stats(&db, game.id, buts(joueur.id, 1)).await;
        assert!(matches!(result, Err(Error::Validation { .. })));
        assert!(list_stats(&db, game.id).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_player_ranking() -> Result<()> {
        let db = setup_test_db().await?;
        let alice = joueur_e2d(&db, "Mbarga", "Alice").await?;
        let bob = joueur_e2d(&db, "Ngono", "Bob").await?;
        let g1 = create_match(&db, new_match(Equipe::E2d, date(2024, 5, 1), 3, 1)).await?;
        let g2 = create_match(&db, new_match(Equipe::E2d, date(2024, 5, 8), 2, 0)).await?;

        record_stats(&db, g1.id, buts(alice, 1)).await?;
        record_stats(
            &db,
            g1.id,
            PlayerStats {
                homme_du_match: true,
                ..buts(bob, 2)
            },
        )
        .await?;
        record_stats(&db, g2.id, buts(alice, 2)).await?;

        let range = DateRange::month(2024, 5)?;
        let top = player_ranking(&db, Equipe::E2d, range, Critere::Buts, 10).await?;
        assert_eq!(top, vec![(alice, 3.0), (bob, 2.0)]);

        let mvp = player_ranking(&db, Equipe::E2d, range, Critere::HommeDuMatch, 10).await?;
        assert_eq!(mvp, vec![(bob, 1.0)]);

        let none = player_ranking(&db, Equipe::Phoenix, range, Critere::Buts, 10).await?;
        assert!(none.is_empty());
        Ok(())
    }

    #[test]
    fn test_critere_from_str() {
        assert_eq!("Buts".parse::<Critere>().unwrap(), Critere::Buts);
        assert_eq!("homme_du_match".parse::<Critere>().unwrap(), Critere::HommeDuMatch);
        assert!("cartons".parse::<Critere>().is_err());
    }

    #[tokio::test]
    async fn test_create_match_validation() -> Result<()> {
        let db = setup_test_db().await?;
        let mut input = new_match(Equipe::E2d, date(2024, 5, 1), -1, 0);
        assert!(create_match(&db, input.clone()).await.is_err());
        input.score_equipe = 1;
        input.adversaire = " ".into();
        assert!(create_match(&db, input).await.is_err());
        Ok(())
    }
}
