//! Notification Discord commands - template management, preview and sending.

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
            notification::{self, Variables},
        },
        errors::{Error, Result},
    };
    use std::fmt::Write;

    fn variables(raw: Option<&str>) -> Result<Variables> {
        Ok(raw
            .map(params::parse_pairs)
            .transpose()?
            .unwrap_or_default()
            .into_iter()
            .collect())
    }

    /// Lists the notification templates.
    #[poise::command(slash_command, prefix_command)]
    pub async fn modeles(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let templates = notification::list_templates(&ctx.data().database).await?;
        if templates.is_empty() {
            ctx.say("✉️ Aucun modèle de notification.").await?;
            return Ok(());
        }

        let mut response = String::from("✉️ **Modèles de notification**\n\n");
        for t in &templates {
            writeln!(
                &mut response,
                "{} `{}` {} : variables {}",
                if t.actif { "🟢" } else { "⚪" },
                t.code,
                t.nom,
                t.variable_names().join(", ")
            )?;
        }
        ctx.say(response).await?;
        Ok(())
    }

    /// Enables or disables a template.
    #[poise::command(slash_command, prefix_command)]
    pub async fn modele_activer(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Code du modèle"]
        #[autocomplete = "autocomplete::autocomplete_template"]
        code: String,
        #[description = "Actif ?"] actif: bool,
    ) -> Result<()> {
        let data = ctx.data();
        let t = notification::set_actif(&data.database, &code, actif).await?;
        data.publish(Table::Notifications, ChangeKind::Update);
        ctx.say(format!(
            "✅ Modèle `{}` {}",
            t.code,
            if t.actif { "activé" } else { "désactivé" }
        ))
        .await?;
        Ok(())
    }

    /// Rewrites the subject and body of a template.
    #[poise::command(slash_command, prefix_command)]
    pub async fn modele_modifier(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Code du modèle"]
        #[autocomplete = "autocomplete::autocomplete_template"]
        code: String,
        #[description = "Sujet, avec {{variables}}"] sujet: String,
        #[description = "Contenu, avec {{variables}}"] contenu: String,
    ) -> Result<()> {
        let data = ctx.data();
        let t = notification::update_template(&data.database, &code, sujet, contenu).await?;
        data.publish(Table::Notifications, ChangeKind::Update);
        ctx.say(format!("✅ Modèle `{}` mis à jour", t.code)).await?;
        Ok(())
    }

    /// Deletes a template.
    #[poise::command(slash_command, prefix_command)]
    pub async fn modele_supprimer(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Code du modèle"]
        #[autocomplete = "autocomplete::autocomplete_template"]
        code: String,
    ) -> Result<()> {
        let data = ctx.data();
        notification::delete_template(&data.database, &code).await?;
        data.publish(Table::Notifications, ChangeKind::Delete);
        ctx.say(format!("🗑️ Modèle `{code}` supprimé")).await?;
        Ok(())
    }

    /// Renders a template with sample variables without sending it.
    #[poise::command(slash_command, prefix_command)]
    pub async fn modele_apercu(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Code du modèle"]
        #[autocomplete = "autocomplete::autocomplete_template"]
        code: String,
        #[description = "Variables : prenom=Alice; montant=5000"] variables_brutes: Option<String>,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let template = notification::get_template_by_code(db, &code)
            .await?
            .ok_or_else(|| Error::Notification {
                message: format!("Modèle inconnu : {code}"),
            })?;
        let rendered = notification::render(&template, &variables(variables_brutes.as_deref())?);

        let mut response = format!("✉️ **{}**\n\n{}\n", rendered.sujet, rendered.contenu);
        if !rendered.manquantes.is_empty() {
            writeln!(&mut response, "\n⚠️ Variables manquantes : {}", rendered.manquantes.join(", "))?;
        }
        ctx.say(response).await?;
        Ok(())
    }

    /// Sends a template to a member's email.
    #[poise::command(slash_command, prefix_command)]
    pub async fn notifier(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Code du modèle"]
        #[autocomplete = "autocomplete::autocomplete_template"]
        code: String,
        #[description = "Destinataire"]
        #[autocomplete = "autocomplete::autocomplete_membre"]
        membre: String,
        #[description = "Variables supplémentaires : cle=valeur; cle=valeur"]
        variables_brutes: Option<String>,
    ) -> Result<()> {
        let data = ctx.data();
        let db = &data.database;
        let m = membre::find_membre_by_display_name(db, &membre).await?;
        let Some(email) = m.email.as_deref() else {
            ctx.say(format!("❌ {} n'a pas d'adresse email.", m.nom_complet())).await?;
            return Ok(());
        };

        let mut vars = Variables::from([
            ("prenom".to_string(), m.prenom.clone()),
            ("nom".to_string(), m.nom.clone()),
        ]);
        vars.extend(variables(variables_brutes.as_deref())?);

        let rendered =
            notification::send_template(db, data.notifier.as_ref(), &code, email, vars).await?;
        ctx.say(format!("📨 « {} » envoyé à {email}", rendered.sujet)).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
