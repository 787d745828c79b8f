//! Sports Discord commands - matches, player statistics and rankings.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{
            BotData,
            handlers::{autocomplete, params},
        },
        core::{
            changes::{ChangeKind, Table},
            membre,
            sport::{self, Critere, NewMatch, PlayerStats},
        },
        errors::{Error, Result},
    };
    use std::fmt::Write;

    /// Records a played match.
    #[poise::command(slash_command, prefix_command)]
    pub async fn match_ajouter(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Équipe : e2d ou phoenix"]
        #[autocomplete = "autocomplete::autocomplete_equipe"]
        equipe: String,
        #[description = "Adversaire"] adversaire: String,
        #[description = "Buts marqués"] score: i32,
        #[description = "Buts encaissés"] score_adverse: i32,
        #[description = "Date (AAAA-MM-JJ)"] date: Option<String>,
        #[description = "Lieu"] lieu: Option<String>,
        #[description = "Compétition"] competition: Option<String>,
    ) -> Result<()> {
        let data = ctx.data();
        let m = sport::create_match(
            &data.database,
            NewMatch {
                equipe: params::parse_equipe(&equipe)?,
                date_match: params::parse_date(date.as_deref())?,
                adversaire,
                score_equipe: score,
                score_adverse,
                lieu,
                competition,
            },
        )
        .await?;
        data.publish(Table::Sport, ChangeKind::Insert);

        ctx.say(format!(
            "⚽ Match n° {} : {} {}-{} {}",
            m.id, m.equipe, m.score_equipe, m.score_adverse, m.adversaire
        ))
        .await?;
        Ok(())
    }

    /// Records a player's statistics for a match.
    #[poise::command(slash_command, prefix_command)]
    pub async fn match_stats(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Numéro du match"] match_id: i64,
        #[description = "Joueur"]
        #[autocomplete = "autocomplete::autocomplete_membre"]
        joueur: String,
        #[description = "Buts"] buts: Option<i32>,
        #[description = "Passes décisives"] passes: Option<i32>,
        #[description = "Cartons jaunes"] jaunes: Option<i32>,
        #[description = "Cartons rouges"] rouges: Option<i32>,
        #[description = "Homme du match ?"] homme_du_match: Option<bool>,
    ) -> Result<()> {
        let data = ctx.data();
        let db = &data.database;
        let m = membre::find_membre_by_display_name(db, &joueur).await?;
        let line = sport::record_stats(
            db,
            match_id,
            PlayerStats {
                membre_id: m.id,
                buts: buts.unwrap_or(0),
                passes_decisives: passes.unwrap_or(0),
                cartons_jaunes: jaunes.unwrap_or(0),
                cartons_rouges: rouges.unwrap_or(0),
                homme_du_match: homme_du_match.unwrap_or(false),
            },
        )
        .await?;
        data.publish(Table::Sport, ChangeKind::Update);

        ctx.say(format!(
            "✅ {} : {} but(s), {} passe(s){}",
            m.nom_complet(),
            line.buts,
            line.passes_decisives,
            if line.homme_du_match { " ⭐" } else { "" }
        ))
        .await?;
        Ok(())
    }

    /// Shows a team's record over a period.
    #[poise::command(slash_command, prefix_command)]
    pub async fn bilan_equipe(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Équipe : e2d ou phoenix"]
        #[autocomplete = "autocomplete::autocomplete_equipe"]
        equipe: String,
        #[description = "Période : mois, trimestre, semestre, annee (défaut : annee)"]
        #[autocomplete = "autocomplete::autocomplete_period"]
        periode: Option<String>,
    ) -> Result<()> {
        let equipe = params::parse_equipe(&equipe)?;
        let (range, label) =
            params::parse_period(Some(periode.as_deref().unwrap_or("annee")), params::today())?;
        let r = sport::team_record_in_range(&ctx.data().database, equipe, range).await?;

        if r.joues == 0 {
            ctx.say(format!("⚽ Aucun match pour {equipe} ({label}).")).await?;
            return Ok(());
        }
        let mut response = format!("⚽ **Bilan {equipe}** ({label})\n\n");
        writeln!(&mut response, "Matchs joués : {}", r.joues)?;
        writeln!(&mut response, "🟢 {} V / 🟡 {} N / 🔴 {} D", r.victoires, r.nuls, r.defaites)?;
        writeln!(
            &mut response,
            "Buts : {} pour, {} contre ({:+})",
            r.buts_pour,
            r.buts_contre,
            r.difference()
        )?;
        ctx.say(response).await?;
        Ok(())
    }

    /// Ranks a team's players by goals, assists or man-of-the-match awards.
    #[poise::command(slash_command, prefix_command)]
    pub async fn classement(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Équipe : e2d ou phoenix"]
        #[autocomplete = "autocomplete::autocomplete_equipe"]
        equipe: String,
        #[description = "Critère : buts, passes, homme_du_match"]
        #[autocomplete = "autocomplete::autocomplete_critere"]
        critere: Option<String>,
        #[description = "Période : mois, trimestre, semestre, annee (défaut : annee)"]
        #[autocomplete = "autocomplete::autocomplete_period"]
        periode: Option<String>,
    ) -> Result<()> {
        let data = ctx.data();
        let db = &data.database;
        let equipe = params::parse_equipe(&equipe)?;
        let critere: Critere = critere.as_deref().unwrap_or("buts").parse()?;
        let (range, label) =
            params::parse_period(Some(periode.as_deref().unwrap_or("annee")), params::today())?;

        let ranking =
            sport::player_ranking(db, equipe, range, critere, data.config.classement.top).await?;
        if ranking.is_empty() {
            ctx.say(format!("🏆 Aucune statistique pour {equipe} ({label}).")).await?;
            return Ok(());
        }

        let mut response = format!("🏆 **Classement {equipe}** ({label})\n\n");
        for (rank, (membre_id, total)) in ranking.iter().enumerate() {
            let nom = membre::require_membre(db, *membre_id).await?.nom_complet();
            writeln!(&mut response, "{}. {nom} : {total:.0}", rank + 1)?;
        }
        ctx.say(response).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
