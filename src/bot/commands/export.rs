//! Export Discord command - sends a dataset as a spreadsheet or printable file.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{
            BotData,
            handlers::{autocomplete, params},
        },
        core::{
            cotisation, epargne,
            export::{self, ExportColumn, ExportSpec, Row},
            membre, sanction,
        },
        errors::{Error, Result},
    };
    use poise::serenity_prelude as serenity;
    use serde_json::Value;
    use std::collections::HashMap;

    /// Adds the member's display name under `membre` to every row.
    fn with_member_names(mut rows: Vec<Row>, names: &HashMap<i64, String>) -> Vec<Row> {
        for row in &mut rows {
            let name = row
                .get("membre_id")
                .and_then(Value::as_i64)
                .and_then(|id| names.get(&id))
                .cloned()
                .unwrap_or_default();
            row.insert("membre".to_string(), Value::String(name));
        }
        rows
    }

    fn columns(pairs: &[(&str, &str)]) -> Vec<ExportColumn> {
        pairs.iter().map(|(h, k)| ExportColumn::new(*h, *k)).collect()
    }

    /// Exports cotisations, savings, members or sanctions as CSV or printable text.
    #[poise::command(slash_command, prefix_command)]
    pub async fn export(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Données : cotisations, epargnes, membres, sanctions"]
        #[autocomplete = "autocomplete::autocomplete_export"]
        donnees: String,
        #[description = "Période : mois, trimestre, semestre, annee"]
        #[autocomplete = "autocomplete::autocomplete_period"]
        periode: Option<String>,
        #[description = "Format texte imprimable au lieu du CSV"] texte: Option<bool>,
    ) -> Result<()> {
        let data = ctx.data();
        let db = &data.database;
        let today = params::today();
        let (range, label) = params::parse_period(periode.as_deref(), today)?;
        let membres = membre::list_membres(db).await?;
        let names: HashMap<i64, String> = membres.iter().map(|m| (m.id, m.nom_complet())).collect();
        let suffix = today.format("%Y-%m-%d");

        let spec = match donnees.trim().to_lowercase().as_str() {
            "cotisations" => ExportSpec {
                title: format!("Cotisations ({label})"),
                file_name: format!("cotisations_{suffix}"),
                columns: columns(&[
                    ("Date", "date_paiement"),
                    ("Membre", "membre"),
                    ("Montant", "montant"),
                    ("Statut", "statut"),
                    ("Notes", "notes"),
                ]),
                rows: with_member_names(
                    export::rows_from(&cotisation::list_in_range(db, range).await?)?,
                    &names,
                ),
            },
            "epargnes" => ExportSpec {
                title: format!("Épargnes ({label})"),
                file_name: format!("epargnes_{suffix}"),
                columns: columns(&[
                    ("Date", "date_depot"),
                    ("Membre", "membre"),
                    ("Montant", "montant"),
                    ("Statut", "statut"),
                ]),
                rows: with_member_names(
                    export::rows_from(&epargne::list_in_range(db, range).await?)?,
                    &names,
                ),
            },
            "sanctions" => ExportSpec {
                title: format!("Sanctions ({label})"),
                file_name: format!("sanctions_{suffix}"),
                columns: columns(&[
                    ("Date", "date_sanction"),
                    ("Membre", "membre"),
                    ("Contexte", "contexte"),
                    ("Montant", "montant"),
                    ("Payé", "montant_paye"),
                    ("Statut", "statut"),
                    ("Motif", "motif"),
                ]),
                rows: with_member_names(
                    export::rows_from(&sanction::list_in_range(db, range).await?)?,
                    &names,
                ),
            },
            "membres" => ExportSpec {
                title: "Membres".to_string(),
                file_name: format!("membres_{suffix}"),
                columns: columns(&[
                    ("Nom", "nom"),
                    ("Prénom", "prenom"),
                    ("Email", "email"),
                    ("Téléphone", "telephone"),
                    ("Statut", "statut"),
                    ("E2D", "est_membre_e2d"),
                    ("Phoenix", "est_adherent_phoenix"),
                    ("Inscription", "date_inscription"),
                ]),
                rows: export::rows_from(&membres)?,
            },
            other => {
                return Err(Error::validation(format!(
                    "Données inconnues : {other} (attendu : {})",
                    params::EXPORT_LABELS.join(", ")
                )));
            }
        };

        let (content, file_name) = if texte.unwrap_or(false) {
            (spec.to_text()?, spec.file_name_with("txt"))
        } else {
            (spec.to_csv()?, spec.file_name_with("csv"))
        };

        ctx.send(
            poise::CreateReply::default()
                .content(format!("📄 {} : {} ligne(s)", spec.title, spec.rows.len()))
                .attachment(serenity::CreateAttachment::bytes(content.into_bytes(), file_name)),
        )
        .await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
