//! Finance Discord commands - cotisations, savings, loans and sanctions.
//!
//! Every write publishes on the change feed so the dashboard cache is refreshed.

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
            cotisation, epargne, membre, notification, pret, sanction,
        },
        entities::{
            cotisation::StatutCotisation, pret::StatutPret, sanction_type::ContexteSanction,
        },
        errors::{Error, Result},
    };
    use std::fmt::Write;

    /// Records a cotisation and sends the payment confirmation.
    #[poise::command(slash_command, prefix_command)]
    pub async fn cotisation(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Membre"]
        #[autocomplete = "autocomplete::autocomplete_membre"]
        membre: String,
        #[description = "Type de cotisation"]
        #[autocomplete = "autocomplete::autocomplete_cotisation_type"]
        type_cotisation: String,
        #[description = "Montant (défaut : montant du type)"] montant: Option<f64>,
        #[description = "Date de paiement (AAAA-MM-JJ)"] date: Option<String>,
        #[description = "Payée ? (défaut : oui)"] payee: Option<bool>,
        #[description = "Notes"] notes: Option<String>,
    ) -> Result<()> {
        let data = ctx.data();
        let db = &data.database;

        let m = membre::find_membre_by_display_name(db, &membre).await?;
        let Some(t) = cotisation::get_type_by_name(db, &type_cotisation).await? else {
            ctx.say(format!(
                "❌ Type de cotisation '{type_cotisation}' introuvable. Utilisez `/cotisation_types`."
            ))
            .await?;
            return Ok(());
        };

        let statut = if payee.unwrap_or(true) {
            StatutCotisation::Paye
        } else {
            StatutCotisation::Impaye
        };
        let created = cotisation::record_cotisation(
            db,
            cotisation::NewCotisation {
                membre_id: m.id,
                type_cotisation_id: t.id,
                montant,
                date_paiement: params::parse_date(date.as_deref())?,
                statut,
                notes,
            },
        )
        .await?;
        data.publish(Table::Cotisations, ChangeKind::Insert);

        let mut response = format!(
            "✅ Cotisation **{}** de {:.2} enregistrée pour {}",
            t.nom,
            created.montant,
            m.nom_complet()
        );
        if created.statut == StatutCotisation::Paye {
            let sent = notification::confirm_payment(
                db,
                data.notifier.as_ref(),
                &data.config.notifications.template_confirmation_paiement,
                &m,
                &created,
            )
            .await;
            if sent {
                write!(&mut response, "\n📧 Confirmation envoyée")?;
            }
        }

        ctx.say(response).await?;
        Ok(())
    }

    /// Marks a cotisation as paid or unpaid.
    #[poise::command(slash_command, prefix_command)]
    pub async fn cotisation_statut(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Numéro de la cotisation"] id: i64,
        #[description = "Payée ?"] payee: bool,
    ) -> Result<()> {
        let data = ctx.data();
        let statut = if payee {
            StatutCotisation::Paye
        } else {
            StatutCotisation::Impaye
        };
        let c = cotisation::set_statut(&data.database, id, statut).await?;
        data.publish(Table::Cotisations, ChangeKind::Update);
        ctx.say(format!(
            "✅ Cotisation n° {} de {:.2} marquée {}",
            c.id,
            c.montant,
            if payee { "payée" } else { "impayée" }
        ))
        .await?;
        Ok(())
    }

    /// Deletes a cotisation recorded by mistake.
    #[poise::command(slash_command, prefix_command)]
    pub async fn cotisation_supprimer(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Numéro de la cotisation"] id: i64,
    ) -> Result<()> {
        let data = ctx.data();
        cotisation::delete_cotisation(&data.database, id).await?;
        data.publish(Table::Cotisations, ChangeKind::Delete);
        ctx.say(format!("🗑️ Cotisation n° {id} supprimée")).await?;
        Ok(())
    }

    /// Lists cotisation types.
    #[poise::command(slash_command, prefix_command)]
    pub async fn cotisation_types(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let types = cotisation::list_types(&ctx.data().database).await?;
        if types.is_empty() {
            ctx.say("📂 Aucun type de cotisation. Créez-en un avec `/cotisation_type_ajouter`.")
                .await?;
            return Ok(());
        }
        let mut response = String::from("📂 **Types de cotisation**\n\n");
        for t in &types {
            writeln!(
                &mut response,
                "• **{}** : {:.2}{}",
                t.nom,
                t.montant_defaut,
                if t.obligatoire { " (obligatoire)" } else { "" }
            )?;
        }
        ctx.say(response).await?;
        Ok(())
    }

    /// Creates a cotisation type.
    #[poise::command(slash_command, prefix_command)]
    pub async fn cotisation_type_ajouter(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Nom"] nom: String,
        #[description = "Montant par défaut"] montant: f64,
        #[description = "Obligatoire ?"] obligatoire: Option<bool>,
        #[description = "Description"] description: Option<String>,
    ) -> Result<()> {
        let data = ctx.data();
        let t = cotisation::create_type(
            &data.database,
            nom,
            montant,
            obligatoire.unwrap_or(false),
            description,
        )
        .await?;
        data.publish(Table::Cotisations, ChangeKind::Insert);
        ctx.say(format!("✅ Type **{}** créé ({:.2})", t.nom, t.montant_defaut))
            .await?;
        Ok(())
    }

    /// Records a savings deposit.
    #[poise::command(slash_command, prefix_command)]
    pub async fn epargne(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Membre"]
        #[autocomplete = "autocomplete::autocomplete_membre"]
        membre: String,
        #[description = "Montant déposé"] montant: f64,
        #[description = "Date du dépôt (AAAA-MM-JJ)"] date: Option<String>,
        #[description = "Notes"] notes: Option<String>,
    ) -> Result<()> {
        let data = ctx.data();
        let db = &data.database;
        let m = membre::find_membre_by_display_name(db, &membre).await?;
        epargne::deposit(db, m.id, montant, params::parse_date(date.as_deref())?, notes).await?;
        data.publish(Table::Epargnes, ChangeKind::Insert);

        let solde = epargne::membre_balance(db, m.id).await?;
        ctx.say(format!(
            "✅ Dépôt de {montant:.2} pour {} : épargne totale {solde:.2}",
            m.nom_complet()
        ))
        .await?;
        Ok(())
    }

    /// Marks a savings deposit as withdrawn.
    #[poise::command(slash_command, prefix_command)]
    pub async fn epargne_retrait(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Numéro du dépôt"] id: i64,
    ) -> Result<()> {
        let data = ctx.data();
        let e = epargne::withdraw(&data.database, id).await?;
        data.publish(Table::Epargnes, ChangeKind::Update);
        ctx.say(format!("✅ Dépôt n° {} de {:.2} retiré", e.id, e.montant))
            .await?;
        Ok(())
    }

    /// Deletes a savings deposit recorded by mistake.
    #[poise::command(slash_command, prefix_command)]
    pub async fn epargne_supprimer(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Numéro du dépôt"] id: i64,
    ) -> Result<()> {
        let data = ctx.data();
        epargne::delete_epargne(&data.database, id).await?;
        data.publish(Table::Epargnes, ChangeKind::Delete);
        ctx.say(format!("🗑️ Dépôt n° {id} supprimé")).await?;
        Ok(())
    }

    /// Grants a loan.
    #[poise::command(slash_command, prefix_command)]
    pub async fn pret(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Membre"]
        #[autocomplete = "autocomplete::autocomplete_membre"]
        membre: String,
        #[description = "Montant prêté"] montant: f64,
        #[description = "Échéance (AAAA-MM-JJ)"] echeance: String,
        #[description = "Taux d'intérêt en % (défaut : 0)"] taux: Option<f64>,
        #[description = "Date du prêt (AAAA-MM-JJ)"] date: Option<String>,
        #[description = "Notes"] notes: Option<String>,
    ) -> Result<()> {
        let data = ctx.data();
        let db = &data.database;
        let m = membre::find_membre_by_display_name(db, &membre).await?;
        let p = pret::grant_pret(
            db,
            pret::NewPret {
                membre_id: m.id,
                montant,
                taux_interet: taux.unwrap_or(0.0),
                date_pret: params::parse_date(date.as_deref())?,
                echeance: params::parse_date(Some(&echeance))?,
                notes,
            },
        )
        .await?;
        data.publish(Table::Prets, ChangeKind::Insert);

        ctx.say(format!(
            "✅ Prêt n° {} de {:.2} accordé à {} : {:.2} dus le {}",
            p.id,
            p.montant,
            m.nom_complet(),
            pret::montant_du(&p),
            p.echeance.format("%d/%m/%Y")
        ))
        .await?;
        Ok(())
    }

    /// Records a loan repayment.
    #[poise::command(slash_command, prefix_command)]
    pub async fn remboursement(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Numéro du prêt"] pret_id: i64,
        #[description = "Montant remboursé"] montant: f64,
    ) -> Result<()> {
        let data = ctx.data();
        let p = pret::repay(&data.database, pret_id, montant).await?;
        data.publish(Table::Prets, ChangeKind::Update);

        let message = if p.statut == StatutPret::Rembourse {
            format!("✅ Prêt n° {} entièrement remboursé 🎉", p.id)
        } else {
            format!(
                "✅ Remboursement de {montant:.2} enregistré : reste {:.2}",
                pret::reste_a_payer(&p)
            )
        };
        ctx.say(message).await?;
        Ok(())
    }

    /// Lists open loans, flagging overdue ones.
    #[poise::command(slash_command, prefix_command)]
    pub async fn prets(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let db = &ctx.data().database;
        let today = params::today();
        let ouverts: Vec<_> = pret::list_prets(db)
            .await?
            .into_iter()
            .filter(|p| p.statut == StatutPret::EnCours)
            .collect();

        if ouverts.is_empty() {
            ctx.say("🏦 Aucun prêt en cours.").await?;
            return Ok(());
        }

        let mut response = String::from("🏦 **Prêts en cours**\n\n");
        for p in &ouverts {
            let nom = membre::require_membre(db, p.membre_id).await?.nom_complet();
            let flag = if pret::is_overdue(p, today) { "🔴" } else { "🟢" };
            writeln!(
                &mut response,
                "{flag} n° {} {nom}, reste {:.2} (échéance {})",
                p.id,
                pret::reste_a_payer(p),
                p.echeance.format("%d/%m/%Y")
            )?;
        }
        writeln!(
            &mut response,
            "\n**Total dû :** {:.2}",
            pret::total_outstanding(db).await?
        )?;
        ctx.say(response).await?;
        Ok(())
    }

    /// Assesses a sanction.
    #[poise::command(slash_command, prefix_command)]
    pub async fn sanction(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Membre"]
        #[autocomplete = "autocomplete::autocomplete_membre"]
        membre: String,
        #[description = "Type de sanction"]
        #[autocomplete = "autocomplete::autocomplete_sanction_type"]
        type_sanction: String,
        #[description = "Montant (défaut : montant du type)"] montant: Option<f64>,
        #[description = "Date (AAAA-MM-JJ)"] date: Option<String>,
        #[description = "Motif"] motif: Option<String>,
    ) -> Result<()> {
        let data = ctx.data();
        let db = &data.database;
        let m = membre::find_membre_by_display_name(db, &membre).await?;
        let Some(t) = sanction::get_type_by_name(db, &type_sanction).await? else {
            ctx.say(format!("❌ Type de sanction '{type_sanction}' introuvable."))
                .await?;
            return Ok(());
        };

        let s = sanction::assess_sanction(
            db,
            sanction::NewSanction {
                membre_id: m.id,
                type_sanction_id: t.id,
                montant,
                date_sanction: params::parse_date(date.as_deref())?,
                motif,
            },
        )
        .await?;
        data.publish(Table::Sanctions, ChangeKind::Insert);

        ctx.say(format!(
            "⚠️ Sanction n° {} **{}** de {:.2} pour {}",
            s.id,
            t.nom,
            s.montant,
            m.nom_complet()
        ))
        .await?;
        Ok(())
    }

    /// Records a payment against a sanction.
    #[poise::command(slash_command, prefix_command)]
    pub async fn sanction_paiement(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Numéro de la sanction"] sanction_id: i64,
        #[description = "Montant payé"] montant: f64,
    ) -> Result<()> {
        let data = ctx.data();
        let s = sanction::pay_sanction(&data.database, sanction_id, montant).await?;
        data.publish(Table::Sanctions, ChangeKind::Update);
        ctx.say(format!(
            "✅ Paiement enregistré : reste {:.2} sur la sanction n° {}",
            s.reste_a_payer(),
            s.id
        ))
        .await?;
        Ok(())
    }

    /// Cancels a sanction.
    #[poise::command(slash_command, prefix_command)]
    pub async fn sanction_supprimer(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Numéro de la sanction"] sanction_id: i64,
    ) -> Result<()> {
        let data = ctx.data();
        sanction::delete_sanction(&data.database, sanction_id).await?;
        data.publish(Table::Sanctions, ChangeKind::Delete);
        ctx.say(format!("🗑️ Sanction n° {sanction_id} annulée")).await?;
        Ok(())
    }

    /// Creates a sanction type.
    #[poise::command(slash_command, prefix_command)]
    pub async fn sanction_type_ajouter(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Nom"] nom: String,
        #[description = "Montant par défaut"] montant: f64,
        #[description = "Sanction sportive ? (défaut : réunion)"] sport: Option<bool>,
    ) -> Result<()> {
        let data = ctx.data();
        let contexte = if sport.unwrap_or(false) {
            ContexteSanction::Sport
        } else {
            ContexteSanction::Reunion
        };
        let t = sanction::create_type(&data.database, nom, montant, contexte).await?;
        data.publish(Table::Sanctions, ChangeKind::Insert);
        ctx.say(format!("✅ Type de sanction **{}** créé ({:.2})", t.nom, t.montant_defaut))
            .await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
