//! Utility commands: a liveness check and the French command reference.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::BotData,
        errors::{Error, Result},
    };

    /// Liveness check.
    #[poise::command(slash_command, prefix_command)]
    pub async fn ping(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        ctx.say("Pong!").await?;
        Ok(())
    }

    /// Lists every dashboard command, grouped by screen.
    #[poise::command(slash_command, prefix_command)]
    pub async fn help(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "**TontineBuddy : aide**\n\n\
        **Membres**\n\
        • `/membre_ajouter`, `/membres [recherche]`, `/membre_info`, `/membre_modifier`\n\
        • `/membre_statut`, `/membre_supprimer`, `/photo`, `/photo_supprimer`\n\n\
        **Finances**\n\
        • `/cotisation`, `/cotisation_types`, `/cotisation_type_ajouter`\n\
        • `/cotisation_statut`, `/cotisation_supprimer`\n\
        • `/epargne`, `/epargne_retrait`, `/epargne_supprimer`, `/pret`, `/remboursement`, `/prets`\n\
        • `/sanction`, `/sanction_paiement`, `/sanction_supprimer`, `/sanction_type_ajouter`\n\n\
        **Fond de caisse**\n\
        • `/caisse_operation`, `/caisse_situation`, `/caisse_cloture`, `/caisse_historique`\n\n\
        **Tontine**\n\
        • `/tontine [mois] [annee]`, `/tontine_attribuer`, `/tontine_solde`\n\n\
        **Réunions et gala**\n\
        • `/reunion_creer`, `/presence`, `/reunion_cloturer`, `/reunions`, `/eligibilite`\n\n\
        **Sport**\n\
        • `/match_ajouter`, `/match_stats`, `/bilan_equipe`, `/classement`\n\n\
        **Tableau de bord**\n\
        • `/tableau_de_bord [periode]`, `/evolution`, `/export`\n\n\
        **Notifications**\n\
        • `/modeles`, `/modele_activer`, `/modele_modifier`, `/modele_supprimer`\n\
        • `/modele_apercu`, `/notifier`\n\n\
        **Utilitaires**\n\
        • `/ping` : vérifie que le bot répond\n\
        • `/help` : affiche ce message";

        ctx.say(help_text).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
