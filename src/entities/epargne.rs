//! Epargne entity - A savings deposit made by a member.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Status of a savings deposit
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum StatutEpargne {
    /// Held by the association
    #[sea_orm(string_value = "actif")]
    Actif,
    /// Returned to the member
    #[sea_orm(string_value = "retire")]
    Retire,
}

/// Epargne database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "epargnes")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Depositing member
    pub membre_id: i64,
    /// Deposited amount
    pub montant: f64,
    /// Deposit date
    pub date_depot: Date,
    /// Active or withdrawn
    pub statut: StatutEpargne,
    /// Optional operator notes
    pub notes: Option<String>,
}

/// Defines relationships between Epargne and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each deposit belongs to one member
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
