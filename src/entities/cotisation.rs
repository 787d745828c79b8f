//! Cotisation entity - A dues payment by a member.
//!
//! Each cotisation references a member and a cotisation type, and carries a
//! payment date and a paid/unpaid status.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Payment status of a cotisation
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum StatutCotisation {
    /// Paid
    #[sea_orm(string_value = "paye")]
    Paye,
    /// Recorded but not yet paid
    #[sea_orm(string_value = "impaye")]
    Impaye,
}

/// Cotisation database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "cotisations")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Paying member
    pub membre_id: i64,
    /// Kind of cotisation
    pub type_cotisation_id: i64,
    /// Amount in the association's currency
    pub montant: f64,
    /// Payment date
    pub date_paiement: Date,
    /// Paid or unpaid
    pub statut: StatutCotisation,
    /// Optional operator notes
    pub notes: Option<String>,
}

/// Defines relationships between Cotisation and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each cotisation belongs to one member
    #[sea_orm(
        belongs_to = "super::membre::Entity",
        from = "Column::MembreId",
        to = "super::membre::Column::Id",
        on_delete = "Cascade"
    )]
    Membre,
    /// Each cotisation has one type
    #[sea_orm(
        belongs_to = "super::cotisation_type::Entity",
        from = "Column::TypeCotisationId",
        to = "super::cotisation_type::Column::Id"
    )]
    CotisationType,
}

impl Related<super::membre::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Membre.def()
    }
}

impl Related<super::cotisation_type::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CotisationType.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
