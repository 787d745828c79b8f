//! Unified error types and result handling for `TontineBuddy`.
//!
//! Every fallible operation in `core`, `config` and `bot` returns [`Result`].
//! Validation failures are raised before any database round-trip; database,
//! I/O and HTTP failures carry the underlying error text so the bot layer can
//! surface it to the operator.

use thiserror::Error;

/// Application-wide error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration could not be read, parsed or is inconsistent
    #[error("Erreur de configuration : {message}")]
    Config {
        /// Human-readable description
        message: String,
    },

    /// Any error raised by the ORM or the underlying driver
    #[error("Erreur de base de données : {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Amount is zero, negative, NaN or infinite where a positive amount is required
    #[error("Montant invalide : {amount}")]
    InvalidAmount {
        /// The rejected amount
        amount: f64,
    },

    /// Input failed a business validation rule
    #[error("Validation : {message}")]
    Validation {
        /// Description of the failed rule
        message: String,
    },

    /// No member matches the given name or id
    #[error("Membre introuvable : {name}")]
    MemberNotFound {
        /// Name or id used for the lookup
        name: String,
    },

    /// Generic not-found for the other tables
    #[error("{entity} introuvable (id {id})")]
    NotFound {
        /// Entity label, e.g. "Prêt"
        entity: &'static str,
        /// Primary key used for the lookup
        id: i64,
    },

    /// A tontine attribution set violates `0 < attribué <= collecté`
    #[error(
        "Attribution invalide pour {mois:02}/{annee} : attribué {total_attribue:.2}, collecté {total_cotisations:.2}"
    )]
    InvalidAttribution {
        /// Month (1-12)
        mois: u32,
        /// Year
        annee: i32,
        /// Sum of the proposed attributions
        total_attribue: f64,
        /// Paid cotisations collected for that month
        total_cotisations: f64,
    },

    /// Cash-register rule violated (double close, operation on a closed day)
    #[error("Fond de caisse : {message}")]
    CashRegister {
        /// Description of the violated rule
        message: String,
    },

    /// Photo storage failure or rejected upload
    #[error("Stockage : {message}")]
    Storage {
        /// Description of the failure
        message: String,
    },

    /// Notification template or delivery failure
    #[error("Notification : {message}")]
    Notification {
        /// Description of the failure
        message: String,
    },

    /// Export rendering failure
    #[error("Export : {message}")]
    Export {
        /// Description of the failure
        message: String,
    },

    /// Filesystem error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Missing or malformed environment variable
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    /// Formatting into a `String` failed
    #[error("Formatting error: {0}")]
    Fmt(#[from] std::fmt::Error),

    /// Integer conversion overflow
    #[error("Integer conversion error: {0}")]
    IntConversion(#[from] std::num::TryFromIntError),

    /// HTTP client failure while calling the notification function
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serenity/Poise framework error
    #[error("Serenity/Poise framework error: {0}")]
    Framework(Box<poise::serenity_prelude::Error>),
}

impl From<poise::serenity_prelude::Error> for Error {
    fn from(value: poise::serenity_prelude::Error) -> Self {
        Self::Framework(Box::new(value))
    }
}

impl Error {
    /// Shorthand for a [`Error::Validation`] with the given message.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;

/// Rejects amounts that are not strictly positive finite numbers.
///
/// # Errors
/// Returns [`Error::InvalidAmount`] for zero, negative, NaN or infinite values.
pub fn ensure_positive_amount(amount: f64) -> Result<()> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(Error::InvalidAmount { amount });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_positive_amount() {
        assert!(ensure_positive_amount(1.0).is_ok());
        assert!(matches!(
            ensure_positive_amount(0.0),
            Err(Error::InvalidAmount { .. })
        ));
        assert!(ensure_positive_amount(-5.0).is_err());
        assert!(ensure_positive_amount(f64::NAN).is_err());
        assert!(ensure_positive_amount(f64::INFINITY).is_err());
    }

    #[test]
    fn test_invalid_attribution_message() {
        let err = Error::InvalidAttribution {
            mois: 3,
            annee: 2024,
            total_attribue: 15_000.0,
            total_cotisations: 12_000.0,
        };
        assert_eq!(
            err.to_string(),
            "Attribution invalide pour 03/2024 : attribué 15000.00, collecté 12000.00"
        );
    }
}
