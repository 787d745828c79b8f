//! Membre entity - A member of the association.
//!
//! Members carry an activity status, membership flags for the two sports
//! sub-clubs (E2D and Phoenix), contact information and a profile photo URL.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Activity status of a member
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum StatutMembre {
    /// Active member, counted in dashboards and eligibility
    #[sea_orm(string_value = "actif")]
    Actif,
    /// Inactive member, kept for history
    #[sea_orm(string_value = "inactif")]
    Inactif,
}

/// Membre database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "membres")]
pub struct Model {
    /// Unique identifier for the member
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Family name
    pub nom: String,
    /// Given name
    pub prenom: String,
    /// Email address used for notifications
    pub email: Option<String>,
    /// Phone number
    pub telephone: Option<String>,
    /// Active or inactive
    pub statut: StatutMembre,
    /// Member of the E2D sports sub-club
    pub est_membre_e2d: bool,
    /// Member of the Phoenix sports sub-club
    pub est_adherent_phoenix: bool,
    /// Public URL of the profile photo
    pub photo_url: Option<String>,
    /// Date the member joined
    pub date_inscription: Date,
}

impl Model {
    /// "Prénom Nom" display name
    #[must_use]
    pub fn nom_complet(&self) -> String {
        format!("{} {}", self.prenom, self.nom)
    }
}

/// Defines relationships between Membre and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One member has many cotisations
    #[sea_orm(has_many = "super::cotisation::Entity")]
    Cotisations,
    /// One member has many savings deposits
    #[sea_orm(has_many = "super::epargne::Entity")]
    Epargnes,
    /// One member has many loans
    #[sea_orm(has_many = "super::pret::Entity")]
    Prets,
    /// One member has many sanctions
    #[sea_orm(has_many = "super::sanction::Entity")]
    Sanctions,
}

impl Related<super::cotisation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Cotisations.def()
    }
}

impl Related<super::epargne::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Epargnes.def()
    }
}

impl Related<super::pret::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Prets.def()
    }
}

impl Related<super::sanction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Sanctions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
