//! Notification business logic - Email templates and delivery through the
//! `send-notification` server function.
//!
//! Templates hold `{{variable}}` placeholders. Rendering substitutes them from
//! a flat map; placeholders without a value are reported and left as-is.

use crate::{
    entities::{CotisationModel, MembreModel, NotificationTemplate, notification_template},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};
use serde::Serialize;
use std::{collections::BTreeMap, sync::Arc, time::Duration};
use tracing::{info, warn};

/// Code of the template sent after a cotisation is recorded
pub const PAYMENT_CONFIRMATION_CODE: &str = "confirmation_paiement";

/// Name of the remote function invoked for delivery
pub const SEND_FUNCTION: &str = "send-notification";

const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Variable mapping passed to templates
pub type Variables = BTreeMap<String, String>;

/// Input for [`create_template`]
#[derive(Debug, Clone)]
pub struct NewTemplate {
    /// Unique code
    pub code: String,
    /// Display name
    pub nom: String,
    /// Subject with placeholders
    pub sujet: String,
    /// Body with placeholders
    pub contenu: String,
    /// Declared variable names
    pub variables: Vec<String>,
}

/// Result of rendering a template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    /// Subject after substitution
    pub sujet: String,
    /// Body after substitution
    pub contenu: String,
    /// Placeholders that had no value, in order of first appearance
    pub manquantes: Vec<String>,
}

/// Payload posted to the `send-notification` function
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationRequest {
    /// Template code
    pub template_code: String,
    /// Recipient email address
    pub destinataire: String,
    /// Template variables
    pub variables: Variables,
}

/// Delivery backend for notifications.
#[async_trait::async_trait]
pub trait NotificationSender: Send + Sync {
    /// Delivers one notification.
    ///
    /// # Errors
    /// Returns an error if the backend rejects or cannot reach the request.
    async fn send(&self, request: &NotificationRequest) -> Result<()>;
}

/// Posts requests to `{base_url}/send-notification` with a bearer key.
pub struct HttpNotifier {
    http: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl HttpNotifier {
    /// Builds a notifier for the given functions base URL.
    pub fn new(base_url: &str, api_key: Option<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            http,
            endpoint: format!("{}/{SEND_FUNCTION}", base_url.trim_end_matches('/')),
            api_key,
        })
    }

    /// Full URL requests are posted to
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait::async_trait]
impl NotificationSender for HttpNotifier {
    async fn send(&self, request: &NotificationRequest) -> Result<()> {
        let mut builder = self.http.post(&self.endpoint).json(request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }
        let response = builder.send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Notification {
                message: format!("{SEND_FUNCTION} a répondu {status} : {body}"),
            });
        }
        Ok(())
    }
}

/// Logs notifications instead of sending them, used when no function URL is configured.
pub struct LogNotifier;

#[async_trait::async_trait]
impl NotificationSender for LogNotifier {
    async fn send(&self, request: &NotificationRequest) -> Result<()> {
        info!(
            "Notification {} for {} (not sent, no function configured)",
            request.template_code, request.destinataire
        );
        Ok(())
    }
}

/// Picks the HTTP notifier when a base URL is configured, the log notifier otherwise.
///
/// The bearer key is read from `NOTIFICATION_API_KEY`.
pub fn sender_from_config(function_base_url: Option<&str>) -> Result<Arc<dyn NotificationSender>> {
    match function_base_url {
        Some(url) => {
            let api_key = std::env::var("NOTIFICATION_API_KEY").ok();
            if api_key.is_none() {
                warn!("NOTIFICATION_API_KEY not set, calling {SEND_FUNCTION} without authorization");
            }
            Ok(Arc::new(HttpNotifier::new(url, api_key)?))
        }
        None => Ok(Arc::new(LogNotifier)),
    }
}

/// Substitutes `{{name}}` placeholders in `text`.
///
/// Returns the rendered text and the names that had no value.
#[must_use]
pub fn render_text(text: &str, variables: &Variables) -> (String, Vec<String>) {
    let mut out = String::with_capacity(text.len());
    let mut missing = Vec::new();
    let mut rest = text;

    while let Some(open) = rest.find("{{") {
        out.push_str(&rest[..open]);
        let after = &rest[open + 2..];
        let Some(close) = after.find("}}") else {
            out.push_str(&rest[open..]);
            return (out, missing);
        };
        let name = after[..close].trim();
        match variables.get(name) {
            Some(value) => out.push_str(value),
            None => {
                out.push_str(&rest[open..open + 2 + close + 2]);
                if !missing.iter().any(|m| m == name) {
                    missing.push(name.to_string());
                }
            }
        }
        rest = &after[close + 2..];
    }
    out.push_str(rest);
    (out, missing)
}

/// Renders the subject and body of a template.
#[must_use]
pub fn render(template: &notification_template::Model, variables: &Variables) -> Rendered {
    let (sujet, mut manquantes) = render_text(&template.sujet, variables);
    let (contenu, missing_body) = render_text(&template.contenu, variables);
    for name in missing_body {
        if !manquantes.contains(&name) {
            manquantes.push(name);
        }
    }
    Rendered {
        sujet,
        contenu,
        manquantes,
    }
}

/// Creates a template with a unique code.
pub async fn create_template(
    db: &DatabaseConnection,
    input: NewTemplate,
) -> Result<notification_template::Model> {
    let code = input.code.trim().to_string();
    if code.is_empty() {
        return Err(Error::validation("Le code du modèle est obligatoire"));
    }
    if get_template_by_code(db, &code).await?.is_some() {
        return Err(Error::validation(format!("Le modèle « {code} » existe déjà")));
    }
    let model = notification_template::ActiveModel {
        code: Set(code),
        nom: Set(input.nom),
        sujet: Set(input.sujet),
        contenu: Set(input.contenu),
        variables: Set(input.variables.join(",")),
        actif: Set(true),
        ..Default::default()
    };
    Ok(model.insert(db).await?)
}

/// Lists templates ordered by code.
pub async fn list_templates(db: &DatabaseConnection) -> Result<Vec<notification_template::Model>> {
    NotificationTemplate::find()
        .order_by_asc(notification_template::Column::Code)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds a template by code.
pub async fn get_template_by_code(
    db: &DatabaseConnection,
    code: &str,
) -> Result<Option<notification_template::Model>> {
    NotificationTemplate::find()
        .filter(notification_template::Column::Code.eq(code.trim()))
        .one(db)
        .await
        .map_err(Into::into)
}

async fn require_template(
    db: &DatabaseConnection,
    code: &str,
) -> Result<notification_template::Model> {
    get_template_by_code(db, code)
        .await?
        .ok_or_else(|| Error::Notification {
            message: format!("Modèle « {code} » introuvable"),
        })
}

/// Replaces the subject and body of a template.
pub async fn update_template(
    db: &DatabaseConnection,
    code: &str,
    sujet: String,
    contenu: String,
) -> Result<notification_template::Model> {
    let existing = require_template(db, code).await?;
    let mut active: notification_template::ActiveModel = existing.into();
    active.sujet = Set(sujet);
    active.contenu = Set(contenu);
    Ok(active.update(db).await?)
}

/// Enables or disables a template.
pub async fn set_actif(
    db: &DatabaseConnection,
    code: &str,
    actif: bool,
) -> Result<notification_template::Model> {
    let existing = require_template(db, code).await?;
    let mut active: notification_template::ActiveModel = existing.into();
    active.actif = Set(actif);
    Ok(active.update(db).await?)
}

/// Deletes a template.
pub async fn delete_template(db: &DatabaseConnection, code: &str) -> Result<()> {
    let existing = require_template(db, code).await?;
    NotificationTemplate::delete_by_id(existing.id).exec(db).await?;
    Ok(())
}

/// Renders an active template and hands it to `sender`.
pub async fn send_template(
    db: &DatabaseConnection,
    sender: &dyn NotificationSender,
    code: &str,
    destinataire: &str,
    variables: Variables,
) -> Result<Rendered> {
    let template = require_template(db, code).await?;
    if !template.actif {
        return Err(Error::Notification {
            message: format!("Le modèle « {code} » est désactivé"),
        });
    }
    let rendered = render(&template, &variables);
    if !rendered.manquantes.is_empty() {
        warn!(
            "Template {code} sent with missing variables: {}",
            rendered.manquantes.join(", ")
        );
    }

    sender
        .send(&NotificationRequest {
            template_code: template.code,
            destinataire: destinataire.to_string(),
            variables,
        })
        .await?;
    info!("Notification {code} sent to {destinataire}");
    Ok(rendered)
}

/// Variables of a payment confirmation
#[must_use]
pub fn payment_variables(membre: &MembreModel, cotisation: &CotisationModel) -> Variables {
    Variables::from([
        ("prenom".to_string(), membre.prenom.clone()),
        ("nom".to_string(), membre.nom.clone()),
        ("montant".to_string(), format!("{:.2}", cotisation.montant)),
        ("date".to_string(), cotisation.date_paiement.format("%d/%m/%Y").to_string()),
    ])
}

/// Sends a payment confirmation when the member has an email.
///
/// Failures are logged and never propagated; returns whether a notification went out.
pub async fn confirm_payment(
    db: &DatabaseConnection,
    sender: &dyn NotificationSender,
    code: &str,
    membre: &MembreModel,
    cotisation: &CotisationModel,
) -> bool {
    let Some(email) = membre.email.as_deref() else {
        return false;
    };
    match send_template(db, sender, code, email, payment_variables(membre, cotisation)).await {
        Ok(_) => true,
        Err(e) => {
            warn!("Payment confirmation for {} failed: {e}", membre.nom_complet());
            false
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::{core::membre, test_utils::*};
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingNotifier {
        sent: Mutex<Vec<NotificationRequest>>,
        fail: bool,
    }

    #[async_trait::async_trait]
    impl NotificationSender for RecordingNotifier {
        async fn send(&self, request: &NotificationRequest) -> Result<()> {
            if self.fail {
                return Err(Error::Notification {
                    message: "indisponible".into(),
                });
            }
            self.sent.lock().unwrap().push(request.clone());
            Ok(())
        }
    }

    fn vars(pairs: &[(&str, &str)]) -> Variables {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    async fn payment_template(db: &DatabaseConnection) -> Result<notification_template::Model> {
        create_template(
            db,
            NewTemplate {
                code: PAYMENT_CONFIRMATION_CODE.into(),
                nom: "Confirmation".into(),
                sujet: "Paiement de {{montant}}".into(),
                contenu: "Bonjour {{prenom}}, merci pour votre paiement du {{date}}.".into(),
                variables: vec!["prenom".into(), "montant".into(), "date".into()],
            },
        )
        .await
    }

    #[test]
    fn test_render_text_substitutes() {
        let (out, missing) = render_text("Bonjour {{ prenom }} !", &vars(&[("prenom", "Alice")]));
        assert_eq!(out, "Bonjour Alice !");
        assert!(missing.is_empty());
    }

    #[test]
    fn test_render_text_reports_missing() {
        let (out, missing) = render_text("{{a}} et {{b}} et {{b}}", &vars(&[("a", "1")]));
        assert_eq!(out, "1 et {{b}} et {{b}}");
        assert_eq!(missing, vec!["b".to_string()]);
    }

    #[test]
    fn test_render_text_unclosed_placeholder() {
        let (out, missing) = render_text("Total {{montant", &Variables::new());
        assert_eq!(out, "Total {{montant");
        assert!(missing.is_empty());
    }

    #[tokio::test]
    async fn test_template_crud() -> Result<()> {
        let db = setup_test_db().await?;
        let t = payment_template(&db).await?;
        assert_eq!(t.variable_names(), vec!["prenom", "montant", "date"]);
        assert!(payment_template(&db).await.is_err());

        let t = set_actif(&db, PAYMENT_CONFIRMATION_CODE, false).await?;
        assert!(!t.actif);
        let t = update_template(&db, PAYMENT_CONFIRMATION_CODE, "S".into(), "C".into()).await?;
        assert_eq!(t.contenu, "C");

        delete_template(&db, PAYMENT_CONFIRMATION_CODE).await?;
        assert!(list_templates(&db).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_send_template_rejects_inactive() -> Result<()> {
        let db = setup_test_db().await?;
        payment_template(&db).await?;
        set_actif(&db, PAYMENT_CONFIRMATION_CODE, false).await?;

        let sender = RecordingNotifier::default();
        let result =
            send_template(&db, &sender, PAYMENT_CONFIRMATION_CODE, "a@b.cm", Variables::new()).await;
        assert!(matches!(result, Err(Error::Notification { .. })));
        assert!(sender.sent.lock().unwrap().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_confirm_payment() -> Result<()> {
        let (db, alice, cot_type) = setup_with_membre_and_type().await?;
        payment_template(&db).await?;
        let cotisation =
            create_test_cotisation(&db, alice.id, cot_type.id, 5_000.0, date(2024, 3, 2)).await?;

        let sender = RecordingNotifier::default();
        assert!(!confirm_payment(&db, &sender, PAYMENT_CONFIRMATION_CODE, &alice, &cotisation).await);

        let alice = membre::update_contact(&db, alice.id, Some("alice@club.cm".into()), None).await?;
        assert!(confirm_payment(&db, &sender, PAYMENT_CONFIRMATION_CODE, &alice, &cotisation).await);

        let sent = sender.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].destinataire, "alice@club.cm");
        assert_eq!(sent[0].variables["montant"], "5000.00");
        assert_eq!(sent[0].variables["date"], "02/03/2024");
        Ok(())
    }

    #[tokio::test]
    async fn test_confirm_payment_failure_is_swallowed() -> Result<()> {
        let (db, alice, cot_type) = setup_with_membre_and_type().await?;
        payment_template(&db).await?;
        let alice = membre::update_contact(&db, alice.id, Some("alice@club.cm".into()), None).await?;
        let cotisation =
            create_test_cotisation(&db, alice.id, cot_type.id, 5_000.0, date(2024, 3, 2)).await?;

        let sender = RecordingNotifier {
            fail: true,
            ..RecordingNotifier::default()
        };
        assert!(!confirm_payment(&db, &sender, PAYMENT_CONFIRMATION_CODE, &alice, &cotisation).await);
        Ok(())
    }

    #[test]
    fn test_http_notifier_endpoint() {
        let n = HttpNotifier::new("https://fn.example.org/v1/", None).unwrap();
        assert_eq!(n.endpoint(), "https://fn.example.org/v1/send-notification");
    }
}
