//! Discord command implementations organized by dashboard screen.

#![allow(clippy::too_long_first_doc_paragraph)]

use crate::{bot::BotData, errors::Error};

/// Fond de caisse commands
pub mod caisse;

/// Dashboard and evolution commands
pub mod dashboard;

/// Gala eligibility command
pub mod eligibilite;

/// Export command
pub mod export;

/// Cotisation, savings, loan and sanction commands
pub mod finances;

/// General utility commands
pub mod general;

/// Member management commands
pub mod membres;

/// Notification template commands
pub mod notifications;

/// Member photo commands
pub mod photo;

/// Meeting and attendance commands
pub mod reunions;

/// Match, statistics and ranking commands
pub mod sport;

/// Tontine attribution commands
pub mod tontine;

// Export commands
pub use caisse::*;
pub use dashboard::*;
pub use eligibilite::*;
pub use export::*;
pub use finances::*;
pub use general::*;
pub use membres::*;
pub use notifications::*;
pub use photo::*;
pub use reunions::*;
pub use sport::*;
pub use tontine::*;

/// Every command registered with the framework.
#[must_use]
pub fn all() -> Vec<poise::Command<BotData, Error>> {
    vec![
        ping(),
        help(),
        membre_ajouter(),
        membres(),
        membre_info(),
        membre_statut(),
        membre_modifier(),
        membre_supprimer(),
        photo(),
        photo_supprimer(),
        cotisation(),
        cotisation_types(),
        cotisation_type_ajouter(),
        cotisation_statut(),
        cotisation_supprimer(),
        epargne(),
        epargne_retrait(),
        epargne_supprimer(),
        pret(),
        remboursement(),
        prets(),
        sanction(),
        sanction_paiement(),
        sanction_supprimer(),
        sanction_type_ajouter(),
        caisse_operation(),
        caisse_situation(),
        caisse_cloture(),
        caisse_historique(),
        tontine(),
        tontine_attribuer(),
        tontine_solde(),
        reunion_creer(),
        presence(),
        reunion_cloturer(),
        reunions(),
        eligibilite(),
        match_ajouter(),
        match_stats(),
        bilan_equipe(),
        classement(),
        tableau_de_bord(),
        evolution(),
        export(),
        modeles(),
        modele_activer(),
        modele_modifier(),
        modele_supprimer(),
        modele_apercu(),
        notifier(),
    ]
}
