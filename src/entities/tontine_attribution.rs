//! Tontine attribution entity - Monthly payout to a beneficiary.
//!
//! The set of rows for a given (mois, annee) is always replaced as a whole.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Tontine attribution database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "tontine_attributions")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Beneficiary
    pub membre_id: i64,
    /// Month (1-12)
    pub mois: i32,
    /// Year
    pub annee: i32,
    /// Attributed amount
    pub montant: f64,
    /// Date the attribution was saved
    pub date_attribution: Date,
    /// Optional notes
    pub notes: Option<String>,
}

/// Defines relationships between `TontineAttribution` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each attribution belongs to one member
    #[sea_orm(
        belongs_to = "super::membre::Entity",
        from = "Column::MembreId",
        to = "super::membre::Column::Id",
        on_delete = "Cascade"
    )]
    Membre,
}

impl Related<super::membre::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Membre.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
