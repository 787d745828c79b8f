//! Dashboard Discord commands - headline figures, evolution and top contributors.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{
            BotData,
            handlers::{autocomplete, params},
        },
        cache::SnapshotKey,
        core::{dashboard::FlowSummary, membre},
        errors::{Error, Result},
    };
    use poise::serenity_prelude as serenity;
    use std::fmt::Write;

    fn flow_field(flow: &FlowSummary) -> String {
        let arrow = if flow.tendance > 0.0 {
            "📈"
        } else if flow.tendance < 0.0 {
            "📉"
        } else {
            "➡️"
        };
        format!(
            "{:.2}\n{} opération(s) {arrow} {:+.0}%",
            flow.total, flow.nombre, flow.tendance
        )
    }

    /// Shows the association dashboard for a period.
    #[poise::command(slash_command, prefix_command)]
    pub async fn tableau_de_bord(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Période : mois, trimestre, semestre, annee"]
        #[autocomplete = "autocomplete::autocomplete_period"]
        periode: Option<String>,
        #[description = "Début personnalisé (AAAA-MM-JJ)"] debut: Option<String>,
        #[description = "Fin personnalisée (AAAA-MM-JJ)"] fin: Option<String>,
    ) -> Result<()> {
        let data = ctx.data();
        let db = &data.database;
        let today = params::today();
        let (preset, label) = params::parse_period(periode.as_deref(), today)?;
        let range = params::parse_range(debut.as_deref(), fin.as_deref(), preset)?;
        let label = if range == preset { label } else { "Période personnalisée" };

        let snapshot = data
            .cache
            .get_or_refresh(
                db,
                SnapshotKey {
                    range,
                    reference: today,
                    top: data.config.classement.top,
                },
            )
            .await?;
        let summary = &snapshot.summary;

        let mut top = String::new();
        for (rank, (membre_id, total)) in snapshot.top_contributors.iter().enumerate() {
            let nom = membre::require_membre(db, *membre_id).await?.nom_complet();
            writeln!(&mut top, "{}. {nom} : {total:.2}", rank + 1)?;
        }
        if top.is_empty() {
            top.push_str("Aucune cotisation");
        }

        let s = &summary.sanctions;
        let embed = serenity::CreateEmbed::default()
            .title("📊 Tableau de bord")
            .description(format!(
                "{label} : du {} au {}",
                range.start.format("%d/%m/%Y"),
                range.end.format("%d/%m/%Y")
            ))
            .color(0x0034_98DB)
            .field("💰 Cotisations", flow_field(&summary.cotisations), true)
            .field("🐷 Épargnes", flow_field(&summary.epargnes), true)
            .field("🏦 Prêts", flow_field(&summary.prets), true)
            .field(
                "⚠️ Sanctions",
                format!(
                    "{} sanction(s)\nRéunion {:.2} / sport {:.2}\nPayé {:.2}, reste {:.2}",
                    s.nombre, s.reunion, s.sport, s.paye, s.reste
                ),
                false,
            )
            .field("🏅 Meilleurs cotisants", top, false);

        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }

    /// Shows the 12-month evolution of cotisations and savings.
    #[poise::command(slash_command, prefix_command)]
    pub async fn evolution(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let data = ctx.data();
        let today = params::today();
        let (range, _) = params::parse_period(None, today)?;
        let snapshot = data
            .cache
            .get_or_refresh(
                &data.database,
                SnapshotKey {
                    range,
                    reference: today,
                    top: data.config.classement.top,
                },
            )
            .await?;

        let mut response = String::from("📈 **Évolution sur 12 mois**\n```\n");
        writeln!(&mut response, "{:<8} {:>12} {:>12}", "Mois", "Cotisations", "Épargnes")?;
        for p in &snapshot.evolution {
            writeln!(&mut response, "{:<8} {:>12.2} {:>12.2}", p.month, p.cotisations, p.epargnes)?;
        }
        response.push_str("```");
        ctx.say(response).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
