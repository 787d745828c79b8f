//! Member Discord commands - registration, listing and profile updates.

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
            epargne, membre, pret, sanction,
        },
        entities::membre::StatutMembre,
        errors::{Error, Result},
    };
    use std::fmt::Write;

    /// Registers a new member.
    #[poise::command(slash_command, prefix_command)]
    pub async fn membre_ajouter(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Nom de famille"] nom: String,
        #[description = "Prénom"] prenom: String,
        #[description = "Adresse email"] email: Option<String>,
        #[description = "Téléphone"] telephone: Option<String>,
        #[description = "Membre de l'équipe E2D ?"] e2d: Option<bool>,
        #[description = "Adhérent Phoenix ?"] phoenix: Option<bool>,
        #[description = "Date d'inscription (AAAA-MM-JJ, défaut : aujourd'hui)"] date: Option<
            String,
        >,
    ) -> Result<()> {
        let data = ctx.data();
        let created = membre::create_membre(
            &data.database,
            membre::NewMembre {
                nom,
                prenom,
                email,
                telephone,
                est_membre_e2d: e2d.unwrap_or(false),
                est_adherent_phoenix: phoenix.unwrap_or(false),
                date_inscription: params::parse_date(date.as_deref())?,
            },
        )
        .await?;
        data.publish(Table::Membres, ChangeKind::Insert);

        ctx.say(format!(
            "✅ Membre **{}** enregistré (n° {})",
            created.nom_complet(),
            created.id
        ))
        .await?;
        Ok(())
    }

    /// Lists members, optionally filtered by a search term.
    #[poise::command(slash_command, prefix_command)]
    pub async fn membres(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Recherche sur le nom"] recherche: Option<String>,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let membres = match recherche.as_deref() {
            Some(q) => membre::search_membres(db, q).await?,
            None => membre::list_membres(db).await?,
        };

        if membres.is_empty() {
            ctx.say("👥 Aucun membre trouvé.").await?;
            return Ok(());
        }

        let mut response = format!("👥 **Membres** ({})\n\n", membres.len());
        for m in &membres {
            let statut = match m.statut {
                StatutMembre::Actif => "🟢",
                StatutMembre::Inactif => "⚪",
            };
            let mut equipes = Vec::new();
            if m.est_membre_e2d {
                equipes.push("E2D");
            }
            if m.est_adherent_phoenix {
                equipes.push("Phoenix");
            }
            write!(&mut response, "{statut} **{}**", m.nom_complet())?;
            if !equipes.is_empty() {
                write!(&mut response, " ⚽ {}", equipes.join(", "))?;
            }
            writeln!(&mut response)?;
        }

        ctx.say(response).await?;
        Ok(())
    }

    /// Shows a member's profile and financial position.
    #[poise::command(slash_command, prefix_command)]
    pub async fn membre_info(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Membre"]
        #[autocomplete = "autocomplete::autocomplete_membre"]
        membre: String,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let m = membre::find_membre_by_display_name(db, &membre).await?;

        let epargne = epargne::membre_balance(db, m.id).await?;
        let sanctions = sanction::unpaid_balance(db, m.id).await?;
        let prets = pret::list_open_for_membre(db, m.id).await?;
        let du: f64 = prets.iter().map(pret::reste_a_payer).sum();

        let mut response = format!("📋 **{}**\n\n", m.nom_complet());
        writeln!(&mut response, "📧 Email : {}", m.email.as_deref().unwrap_or("-"))?;
        writeln!(&mut response, "📞 Téléphone : {}", m.telephone.as_deref().unwrap_or("-"))?;
        writeln!(&mut response, "📅 Inscrit le : {}", m.date_inscription.format("%d/%m/%Y"))?;
        writeln!(&mut response)?;
        writeln!(&mut response, "💰 Épargne : {epargne:.2}")?;
        writeln!(&mut response, "🏦 Prêts en cours : {} (reste dû {du:.2})", prets.len())?;
        writeln!(&mut response, "⚠️ Sanctions impayées : {sanctions:.2}")?;
        if let Some(url) = &m.photo_url {
            writeln!(&mut response, "🖼️ Photo : {url}")?;
        }

        ctx.say(response).await?;
        Ok(())
    }

    /// Activates or deactivates a member.
    #[poise::command(slash_command, prefix_command)]
    pub async fn membre_statut(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Membre"]
        #[autocomplete = "autocomplete::autocomplete_membre"]
        membre: String,
        #[description = "Actif ?"] actif: bool,
    ) -> Result<()> {
        let data = ctx.data();
        let m = membre::find_membre_by_display_name(&data.database, &membre).await?;
        let statut = if actif {
            StatutMembre::Actif
        } else {
            StatutMembre::Inactif
        };
        membre::set_statut(&data.database, m.id, statut).await?;
        data.publish(Table::Membres, ChangeKind::Update);

        ctx.say(format!(
            "✅ {} est maintenant {}",
            m.nom_complet(),
            if actif { "actif" } else { "inactif" }
        ))
        .await?;
        Ok(())
    }

    /// Updates a member's email, phone and sports teams.
    #[poise::command(slash_command, prefix_command)]
    pub async fn membre_modifier(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Membre"]
        #[autocomplete = "autocomplete::autocomplete_membre"]
        membre: String,
        #[description = "Nouvelle adresse email"] email: Option<String>,
        #[description = "Nouveau téléphone"] telephone: Option<String>,
        #[description = "Membre de l'équipe E2D ?"] e2d: Option<bool>,
        #[description = "Adhérent Phoenix ?"] phoenix: Option<bool>,
    ) -> Result<()> {
        let data = ctx.data();
        let db = &data.database;
        let m = membre::find_membre_by_display_name(db, &membre).await?;

        let mut updated = membre::update_contact(db, m.id, email, telephone).await?;
        if e2d.is_some() || phoenix.is_some() {
            updated = membre::set_teams(
                db,
                m.id,
                e2d.unwrap_or(updated.est_membre_e2d),
                phoenix.unwrap_or(updated.est_adherent_phoenix),
            )
            .await?;
        }
        data.publish(Table::Membres, ChangeKind::Update);

        ctx.say(format!("✅ Fiche de **{}** mise à jour", updated.nom_complet()))
            .await?;
        Ok(())
    }

    /// Permanently deletes a member.
    #[poise::command(slash_command, prefix_command)]
    pub async fn membre_supprimer(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Membre"]
        #[autocomplete = "autocomplete::autocomplete_membre"]
        membre: String,
    ) -> Result<()> {
        let data = ctx.data();
        let m = membre::find_membre_by_display_name(&data.database, &membre).await?;
        membre::delete_membre(&data.database, m.id).await?;
        data.publish(Table::Membres, ChangeKind::Delete);

        ctx.say(format!("🗑️ Membre **{}** supprimé", m.nom_complet()))
            .await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
