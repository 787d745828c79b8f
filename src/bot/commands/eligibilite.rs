//! Gala eligibility Discord command.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{
            BotData,
            handlers::{autocomplete, params},
        },
        core::eligibilite::{self, Statut},
        errors::{Error, Result},
    };
    use std::fmt::Write;

    /// Ranks active members for gala eligibility over a period.
    #[poise::command(slash_command, prefix_command)]
    pub async fn eligibilite(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Période : mois, trimestre, semestre, annee (défaut : annee)"]
        #[autocomplete = "autocomplete::autocomplete_period"]
        periode: Option<String>,
    ) -> Result<()> {
        let data = ctx.data();
        let (range, label) =
            params::parse_period(Some(periode.as_deref().unwrap_or("annee")), params::today())?;
        let seuils = &data.config.eligibilite;
        let evaluations = eligibilite::evaluate_membres(&data.database, range, seuils).await?;

        if evaluations.is_empty() {
            ctx.say("🎖️ Aucun membre actif à évaluer.").await?;
            return Ok(());
        }

        let mut response = format!("🎖️ **Éligibilité au gala** ({label})\n");
        writeln!(
            &mut response,
            "Seuils : cotisations ≥ {:.0}%, présence ≥ {:.0}%, sanctions ≤ {}, score ≥ {:.0}\n",
            seuils.cotisations_min, seuils.presence_min, seuils.sanctions_max, seuils.score_min
        )?;
        for e in &evaluations {
            let emoji = match e.statut {
                Statut::Eligible => "🟢",
                Statut::Limite => "🟡",
                Statut::NonEligible => "🔴",
            };
            write!(
                &mut response,
                "{emoji} **{}** : {:.0} pts ({}) : cot. {:.0}%, prés. {:.0}%, sanctions {}",
                e.nom_complet,
                e.score,
                e.statut,
                e.indicateurs.pct_cotisations,
                e.indicateurs.presence,
                e.indicateurs.sanctions_impayees
            )?;
            if !e.criteres_echoues.is_empty() {
                write!(&mut response, " ⚠️ {}", e.criteres_echoues.join(", "))?;
            }
            writeln!(&mut response)?;
        }

        ctx.say(response).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
