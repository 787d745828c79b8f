//! Autocomplete handlers for Discord slash command parameters.
//!
//! This module provides autocomplete functionality for command parameters like
//! member names and reference types, suggesting valid options as the user types.

use crate::{
    bot::{BotData, handlers::params},
    core::{cotisation, membre, notification, sanction, sport::Critere},
    errors::Error,
};

/// Discord autocomplete limit
const MAX_SUGGESTIONS: usize = 25;

fn matching<I>(names: I, partial: &str) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let partial_lower = partial.to_lowercase();
    let mut matching: Vec<String> = names
        .into_iter()
        .filter(|name| name.to_lowercase().contains(&partial_lower))
        .take(MAX_SUGGESTIONS)
        .collect();
    matching.sort();
    matching
}

fn choices(labels: &[&str], partial: &str) -> Vec<String> {
    matching(labels.iter().map(|l| (*l).to_string()), partial)
}

/// Provides autocomplete suggestions for member display names ("Prénom Nom").
///
/// Only active members are suggested.
pub async fn autocomplete_membre(
    ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    let db = &ctx.data().database;
    let Ok(membres) = membre::list_active_membres(db).await else {
        return Vec::new();
    };
    matching(membres.iter().map(|m| m.nom_complet()), partial)
}

/// Provides autocomplete suggestions for cotisation type names.
pub async fn autocomplete_cotisation_type(
    ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    let db = &ctx.data().database;
    let Ok(types) = cotisation::list_types(db).await else {
        return Vec::new();
    };
    matching(types.into_iter().map(|t| t.nom), partial)
}

/// Provides autocomplete suggestions for sanction type names.
pub async fn autocomplete_sanction_type(
    ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    let db = &ctx.data().database;
    let Ok(types) = sanction::list_types(db).await else {
        return Vec::new();
    };
    matching(types.into_iter().map(|t| t.nom), partial)
}

/// Provides autocomplete suggestions for notification template codes.
pub async fn autocomplete_template(
    ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    let db = &ctx.data().database;
    let Ok(templates) = notification::list_templates(db).await else {
        return Vec::new();
    };
    matching(templates.into_iter().map(|t| t.code), partial)
}

/// Provides the period presets accepted by [`params::parse_period`].
#[allow(clippy::unused_async)] // poise awaits every autocomplete callback
pub async fn autocomplete_period(_ctx: poise::Context<'_, BotData, Error>, partial: &str) -> Vec<String> {
    choices(&params::PERIOD_LABELS, partial)
}

/// Provides the two sports sub-clubs.
#[allow(clippy::unused_async)] // poise awaits every autocomplete callback
pub async fn autocomplete_equipe(_ctx: poise::Context<'_, BotData, Error>, partial: &str) -> Vec<String> {
    choices(&params::EQUIPE_LABELS, partial)
}

/// Provides the player ranking criteria.
#[allow(clippy::unused_async)] // poise awaits every autocomplete callback
pub async fn autocomplete_critere(_ctx: poise::Context<'_, BotData, Error>, partial: &str) -> Vec<String> {
    choices(&Critere::LABELS, partial)
}

/// Provides the exportable datasets.
#[allow(clippy::unused_async)] // poise awaits every autocomplete callback
pub async fn autocomplete_export(_ctx: poise::Context<'_, BotData, Error>, partial: &str) -> Vec<String> {
    choices(&params::EXPORT_LABELS, partial)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matching_is_case_insensitive_and_sorted() {
        let names = vec!["Paul Abega".to_string(), "awa Diallo".into(), "Moussa Diallo".into()];
        assert_eq!(matching(names.clone(), "DIALLO"), vec!["Moussa Diallo", "awa Diallo"]);
        assert_eq!(matching(names, "").len(), 3);
    }

    #[test]
    fn test_static_choices() {
        assert_eq!(choices(&params::EQUIPE_LABELS, "pho"), vec!["phoenix"]);
        assert_eq!(choices(&params::EXPORT_LABELS, "").len(), params::EXPORT_LABELS.len());
        assert!(choices(&Critere::LABELS, "zzz").is_empty());
    }

    #[test]
    fn test_matching_respects_discord_limit() {
        let names = (0..40).map(|i| format!("Membre {i:02}"));
        assert_eq!(matching(names, "membre").len(), MAX_SUGGESTIONS);
    }
}
