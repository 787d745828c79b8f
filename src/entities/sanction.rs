//! Sanction entity - A monetary penalty assessed to a member.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

pub use super::sanction_type::ContexteSanction;

/// Payment status of a sanction
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum StatutSanction {
    /// Nothing paid yet
    #[sea_orm(string_value = "impaye")]
    Impaye,
    /// Partially paid
    #[sea_orm(string_value = "partiel")]
    Partiel,
    /// Fully paid
    #[sea_orm(string_value = "paye")]
    Paye,
}

/// Sanction database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "sanctions")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Sanctioned member
    pub membre_id: i64,
    /// Kind of sanction
    pub type_sanction_id: i64,
    /// Amount owed
    pub montant: f64,
    /// Amount paid so far
    pub montant_paye: f64,
    /// Unpaid, partial or paid
    pub statut: StatutSanction,
    /// Meeting or sport, copied from the type
    pub contexte: ContexteSanction,
    /// Date the sanction was assessed
    pub date_sanction: Date,
    /// Reason given by the assessor
    pub motif: Option<String>,
}

impl Model {
    /// Amount still owed
    #[must_use]
    pub fn reste_a_payer(&self) -> f64 {
        (self.montant - self.montant_paye).max(0.0)
    }
}

/// Defines relationships between Sanction and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each sanction belongs to one member
    #[sea_orm(
        belongs_to = "super::membre::Entity",
        from = "Column::MembreId",
        to = "super::membre::Column::Id",
        on_delete = "Cascade"
    )]
    Membre,
    /// Each sanction has one type
    #[sea_orm(
        belongs_to = "super::sanction_type::Entity",
        from = "Column::TypeSanctionId",
        to = "super::sanction_type::Column::Id"
    )]
    SanctionType,
}

impl Related<super::membre::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Membre.def()
    }
}

impl Related<super::sanction_type::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SanctionType.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
