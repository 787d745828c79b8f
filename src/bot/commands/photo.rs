//! Member photo Discord commands.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, handlers::autocomplete},
        core::{
            changes::{ChangeKind, Table},
            membre, storage,
        },
        errors::{Error, Result},
    };
    use poise::serenity_prelude as serenity;

    /// Replaces a member's photo with the attached image.
    #[poise::command(slash_command, prefix_command)]
    pub async fn photo(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Membre"]
        #[autocomplete = "autocomplete::autocomplete_membre"]
        membre: String,
        #[description = "Image (jpg, png, webp ; 5 Mo maximum)"] image: serenity::Attachment,
    ) -> Result<()> {
        let data = ctx.data();
        let db = &data.database;
        let m = membre::find_membre_by_display_name(db, &membre).await?;
        // Reject by declared size before downloading
        storage::validate_photo(&image.filename, usize::try_from(image.size)?)?;
        let bytes = image.download().await?;

        let updated =
            storage::upload_member_photo(db, &data.storage, m.id, &image.filename, &bytes).await?;
        data.publish(Table::Membres, ChangeKind::Update);
        ctx.say(format!(
            "📷 Photo de {} mise à jour : {}",
            updated.nom_complet(),
            updated.photo_url.unwrap_or_default()
        ))
        .await?;
        Ok(())
    }

    /// Removes a member's photo.
    #[poise::command(slash_command, prefix_command)]
    pub async fn photo_supprimer(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Membre"]
        #[autocomplete = "autocomplete::autocomplete_membre"]
        membre: String,
    ) -> Result<()> {
        let data = ctx.data();
        let m = membre::find_membre_by_display_name(&data.database, &membre).await?;
        let updated = storage::remove_member_photo(&data.database, &data.storage, m.id).await?;
        data.publish(Table::Membres, ChangeKind::Update);
        ctx.say(format!("🗑️ Photo de {} supprimée", updated.nom_complet())).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
