//! Pret entity - A loan granted to a member.
//!
//! The amount due is the principal increased by `taux_interet` percent;
//! `montant_rembourse` accumulates repayments until the loan is repaid.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Lifecycle status of a loan
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum StatutPret {
    /// Repayments outstanding
    #[sea_orm(string_value = "en_cours")]
    EnCours,
    /// Fully repaid
    #[sea_orm(string_value = "rembourse")]
    Rembourse,
}

/// Pret database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "prets")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Borrowing member
    pub membre_id: i64,
    /// Principal
    pub montant: f64,
    /// Sum of repayments so far
    pub montant_rembourse: f64,
    /// Interest rate in percent, applied once on the principal
    pub taux_interet: f64,
    /// Date the loan was granted
    pub date_pret: Date,
    /// Due date
    pub echeance: Date,
    /// Outstanding or repaid
    pub statut: StatutPret,
    /// Optional operator notes
    pub notes: Option<String>,
}

/// Defines relationships between Pret and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each loan belongs to one member
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
