//! Meeting Discord commands - scheduling, attendance and closing.

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
            membre, reunion,
        },
        entities::reunion::StatutReunion,
        errors::{Error, Result},
    };
    use std::fmt::Write;

    /// Schedules a meeting.
    #[poise::command(slash_command, prefix_command)]
    pub async fn reunion_creer(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Date (AAAA-MM-JJ)"] date: String,
        #[description = "Lieu"] lieu: Option<String>,
        #[description = "Ordre du jour"] ordre_du_jour: Option<String>,
    ) -> Result<()> {
        let data = ctx.data();
        let r = reunion::create_reunion(
            &data.database,
            params::parse_date(Some(&date))?,
            lieu,
            ordre_du_jour,
        )
        .await?;
        data.publish(Table::Reunions, ChangeKind::Insert);
        ctx.say(format!(
            "📅 Réunion n° {} planifiée le {}",
            r.id,
            r.date_reunion.format("%d/%m/%Y")
        ))
        .await?;
        Ok(())
    }

    /// Records attendance of members at the latest meeting (or a given one).
    ///
    /// Absent members are written `Prénom Nom; Prénom Nom`; every other active
    /// member is marked present.
    #[poise::command(slash_command, prefix_command)]
    pub async fn presence(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Absents : Prénom Nom; Prénom Nom"] absents: Option<String>,
        #[description = "Numéro de la réunion (défaut : la plus récente)"] reunion_id: Option<i64>,
    ) -> Result<()> {
        let data = ctx.data();
        let db = &data.database;

        let reunion_id = match reunion_id {
            Some(id) => id,
            None => {
                let Some(r) = reunion::latest_reunion(db, params::today()).await? else {
                    ctx.say("❌ Aucune réunion passée. Créez-en une avec `/reunion_creer`.")
                        .await?;
                    return Ok(());
                };
                r.id
            }
        };

        let mut absent_ids = Vec::new();
        for nom in absents.as_deref().unwrap_or("").split(';').map(str::trim) {
            if !nom.is_empty() {
                absent_ids.push(membre::find_membre_by_display_name(db, nom).await?.id);
            }
        }

        let (mut presents, mut nb_absents) = (0, 0);
        for m in membre::list_active_membres(db).await? {
            let present = !absent_ids.contains(&m.id);
            reunion::record_presence(db, reunion_id, m.id, present).await?;
            if present {
                presents += 1;
            } else {
                nb_absents += 1;
            }
        }
        data.publish(Table::Reunions, ChangeKind::Update);

        ctx.say(format!(
            "✅ Présences de la réunion n° {reunion_id} : {presents} présent(s), {nb_absents} absent(s)"
        ))
        .await?;
        Ok(())
    }

    /// Marks a meeting as held.
    #[poise::command(slash_command, prefix_command)]
    pub async fn reunion_cloturer(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Numéro de la réunion"] reunion_id: i64,
    ) -> Result<()> {
        let data = ctx.data();
        let r = reunion::close_reunion(&data.database, reunion_id).await?;
        data.publish(Table::Reunions, ChangeKind::Update);
        ctx.say(format!("✅ Réunion du {} terminée", r.date_reunion.format("%d/%m/%Y")))
            .await?;
        Ok(())
    }

    /// Lists the meetings of a period with their attendance.
    #[poise::command(slash_command, prefix_command)]
    pub async fn reunions(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Période : mois, trimestre, semestre, annee"]
        #[autocomplete = "autocomplete::autocomplete_period"]
        periode: Option<String>,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let (range, label) = params::parse_period(periode.as_deref(), params::today())?;
        let reunions = reunion::list_in_range(db, range).await?;
        if reunions.is_empty() {
            ctx.say(format!("📅 Aucune réunion ({label}).")).await?;
            return Ok(());
        }

        let mut response = format!("📅 **Réunions** ({label})\n\n");
        for r in &reunions {
            let presences = reunion::list_presences(db, r.id).await?;
            let presents = presences.iter().filter(|p| p.present).count();
            let statut = match r.statut {
                StatutReunion::Planifiee => "🕒",
                StatutReunion::Terminee => "✅",
            };
            writeln!(
                &mut response,
                "{statut} n° {} le {}{} : {presents}/{} présent(s)",
                r.id,
                r.date_reunion.format("%d/%m/%Y"),
                r.lieu.as_deref().map(|l| format!(" à {l}")).unwrap_or_default(),
                presences.len()
            )?;
        }
        ctx.say(response).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
