//! Sanction type entity - Catalogue of penalties with their default amount and context.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Where a sanction applies
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum ContexteSanction {
    /// Meeting discipline (lateness, absence...)
    #[sea_orm(string_value = "reunion")]
    Reunion,
    /// Sports discipline (cards, missed training...)
    #[sea_orm(string_value = "sport")]
    Sport,
}

/// Sanction type database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "sanction_types")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Unique label (e.g. "Retard réunion")
    #[sea_orm(unique)]
    pub nom: String,
    /// Amount applied when none is given at assessment time
    pub montant_defaut: f64,
    /// Meeting or sport
    pub contexte: ContexteSanction,
}

/// `SanctionType` relationships
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One type has many sanctions
    #[sea_orm(has_many = "super::sanction::Entity")]
    Sanctions,
}

impl Related<super::sanction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Sanctions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
