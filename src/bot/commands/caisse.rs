//! Cash-register Discord commands - operations, situation and day close.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, handlers::params, operator_name},
        core::{
            caisse,
            changes::{ChangeKind, Table},
        },
        entities::fond_caisse_operation::TypeOperation,
        errors::{Error, Result},
    };
    use std::fmt::Write;

    /// Records a cash entry or exit.
    #[poise::command(slash_command, prefix_command)]
    pub async fn caisse_operation(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Sortie de caisse ? (défaut : entrée)"] sortie: bool,
        #[description = "Montant"] montant: f64,
        #[description = "Libellé"] libelle: String,
        #[description = "Date (AAAA-MM-JJ, défaut : aujourd'hui)"] date: Option<String>,
    ) -> Result<()> {
        let data = ctx.data();
        let type_operation = if sortie {
            TypeOperation::Sortie
        } else {
            TypeOperation::Entree
        };
        let op = caisse::record_operation(
            &data.database,
            params::parse_date(date.as_deref())?,
            type_operation,
            montant,
            libelle,
            operator_name(ctx),
        )
        .await?;
        data.publish(Table::FondCaisse, ChangeKind::Insert);

        let emoji = if sortie { "📤" } else { "📥" };
        ctx.say(format!(
            "{emoji} {} de {:.2} enregistrée : {}",
            if sortie { "Sortie" } else { "Entrée" },
            op.montant,
            op.libelle
        ))
        .await?;
        Ok(())
    }

    /// Shows the expected register position for a day.
    #[poise::command(slash_command, prefix_command)]
    pub async fn caisse_situation(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Date (AAAA-MM-JJ, défaut : aujourd'hui)"] date: Option<String>,
    ) -> Result<()> {
        let s = caisse::situation(&ctx.data().database, params::parse_date(date.as_deref())?)
            .await?;

        let mut response = format!("💵 **Fond de caisse au {}**\n\n", s.date.format("%d/%m/%Y"));
        match s.derniere_cloture {
            Some(d) => writeln!(&mut response, "🔒 Dernière clôture : {}", d.format("%d/%m/%Y"))?,
            None => writeln!(&mut response, "🔒 Aucune clôture")?,
        }
        writeln!(&mut response, "Solde d'ouverture : {:.2}", s.solde_ouverture)?;
        writeln!(&mut response, "📥 Entrées : {:.2}", s.total_entrees)?;
        writeln!(&mut response, "📤 Sorties : {:.2}", s.total_sorties)?;
        writeln!(&mut response, "**Solde théorique : {:.2}**", s.solde_theorique)?;
        writeln!(&mut response, "({} opération(s))", s.nombre_operations)?;

        ctx.say(response).await?;
        Ok(())
    }

    /// Closes the day with the counted balance.
    #[poise::command(slash_command, prefix_command)]
    pub async fn caisse_cloture(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Solde compté en caisse"] solde_reel: f64,
        #[description = "Date (AAAA-MM-JJ, défaut : aujourd'hui)"] date: Option<String>,
        #[description = "Notes"] notes: Option<String>,
    ) -> Result<()> {
        let data = ctx.data();
        let c = caisse::close_day(
            &data.database,
            params::parse_date(date.as_deref())?,
            solde_reel,
            operator_name(ctx),
            notes,
        )
        .await?;
        data.publish(Table::FondCaisse, ChangeKind::Insert);

        let status = if c.ecart.abs() < 0.005 {
            "🟢 Caisse équilibrée".to_string()
        } else if c.ecart > 0.0 {
            format!("🟡 Excédent de {:.2}", c.ecart)
        } else {
            format!("🔴 Manque de {:.2}", -c.ecart)
        };

        ctx.say(format!(
            "🔒 Journée du {} clôturée par {}\nThéorique {:.2} / réel {:.2}\n{status}",
            c.date_cloture.format("%d/%m/%Y"),
            c.cloture_par,
            c.solde_theorique,
            c.solde_reel
        ))
        .await?;
        Ok(())
    }

    /// Lists the most recent day closes.
    #[poise::command(slash_command, prefix_command)]
    pub async fn caisse_historique(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Nombre de clôtures (défaut : 10)"] nombre: Option<u64>,
    ) -> Result<()> {
        let clotures = caisse::list_clotures(&ctx.data().database, nombre.unwrap_or(10)).await?;
        if clotures.is_empty() {
            ctx.say("🔒 Aucune clôture enregistrée.").await?;
            return Ok(());
        }

        let mut response = String::from("🔒 **Historique des clôtures**\n\n");
        for c in &clotures {
            writeln!(
                &mut response,
                "• {} : théorique {:.2}, réel {:.2}, écart {:+.2} ({})",
                c.date_cloture.format("%d/%m/%Y"),
                c.solde_theorique,
                c.solde_reel,
                c.ecart,
                c.cloture_par
            )?;
        }
        ctx.say(response).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
