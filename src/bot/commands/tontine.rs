//! Tontine Discord commands - monthly summary, attribution and net payout.

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
            tontine::{self, Beneficiaire},
        },
        errors::{Error, Result},
    };
    use chrono::Datelike;
    use std::fmt::Write;

    fn month_or_current(mois: Option<u32>, annee: Option<i32>) -> (u32, i32) {
        let today = params::today();
        (mois.unwrap_or_else(|| today.month()), annee.unwrap_or_else(|| today.year()))
    }

    /// Shows the collected and attributed amounts of a month.
    #[poise::command(slash_command, prefix_command)]
    pub async fn tontine(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Mois (1-12, défaut : mois courant)"] mois: Option<u32>,
        #[description = "Année (défaut : année courante)"] annee: Option<i32>,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let (mois, annee) = month_or_current(mois, annee);
        let summary = tontine::monthly_summary(db, mois, annee).await?;

        let mut response = format!("🔄 **Tontine {mois:02}/{annee}**\n\n");
        writeln!(&mut response, "💰 Cotisations collectées : {:.2}", summary.total_cotisations)?;
        writeln!(&mut response, "🎁 Total attribué : {:.2}", summary.total_attribue)?;
        writeln!(&mut response, "📦 Reste : {:.2}\n", summary.reste)?;

        if summary.attributions.is_empty() {
            writeln!(&mut response, "Aucun bénéficiaire pour ce mois.")?;
        } else {
            writeln!(&mut response, "**Bénéficiaires**")?;
            for a in &summary.attributions {
                let nom = membre::require_membre(db, a.membre_id).await?.nom_complet();
                writeln!(&mut response, "• {nom} : {:.2}", a.montant)?;
            }
        }

        ctx.say(response).await?;
        Ok(())
    }

    /// Replaces the beneficiaries of a month.
    ///
    /// Beneficiaries are written `Prénom Nom=montant; Prénom Nom=montant`.
    #[poise::command(slash_command, prefix_command)]
    pub async fn tontine_attribuer(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Bénéficiaires : Prénom Nom=montant; ..."] beneficiaires: String,
        #[description = "Mois (1-12, défaut : mois courant)"] mois: Option<u32>,
        #[description = "Année (défaut : année courante)"] annee: Option<i32>,
        #[description = "Notes"] notes: Option<String>,
    ) -> Result<()> {
        let data = ctx.data();
        let db = &data.database;
        let (mois, annee) = month_or_current(mois, annee);

        let mut set = Vec::new();
        for (nom, montant) in params::parse_amounts(&beneficiaires)? {
            let m = membre::find_membre_by_display_name(db, &nom).await?;
            set.push(Beneficiaire {
                membre_id: m.id,
                montant,
            });
        }
        if set.is_empty() {
            ctx.say("❌ Indiquez au moins un bénéficiaire.").await?;
            return Ok(());
        }

        let saved = tontine::save_attributions(db, mois, annee, set, notes).await?;
        data.publish(Table::Tontine, ChangeKind::Update);

        let total: f64 = saved.iter().map(|a| a.montant).sum();
        ctx.say(format!(
            "✅ Attribution {mois:02}/{annee} enregistrée : {} bénéficiaire(s), {total:.2} au total",
            saved.len()
        ))
        .await?;
        Ok(())
    }

    /// Shows what a beneficiary actually receives after debts.
    #[poise::command(slash_command, prefix_command)]
    pub async fn tontine_solde(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Bénéficiaire"]
        #[autocomplete = "autocomplete::autocomplete_membre"]
        membre: String,
        #[description = "Mois (1-12, défaut : mois courant)"] mois: Option<u32>,
        #[description = "Année (défaut : année courante)"] annee: Option<i32>,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let (mois, annee) = month_or_current(mois, annee);
        let m = membre::find_membre_by_display_name(db, &membre).await?;
        let solde = tontine::solde_net_beneficiaire(db, m.id, mois, annee).await?;

        let mut response = format!("🧾 **{}** : tontine {mois:02}/{annee}\n\n", m.nom_complet());
        writeln!(&mut response, "🎁 Montant attribué : {:.2}", solde.montant_attribue)?;
        writeln!(&mut response, "⚠️ Sanctions impayées : -{:.2}", solde.sanctions_impayees)?;
        writeln!(&mut response, "🏦 Prêts échus : -{:.2}", solde.prets_echus)?;
        writeln!(&mut response, "**Solde net : {:.2}**", solde.solde_net)?;

        ctx.say(response).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
