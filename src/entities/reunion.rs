//! Reunion entity - A meeting of the association.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Meeting status
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum StatutReunion {
    /// Scheduled, attendance may still change
    #[sea_orm(string_value = "planifiee")]
    Planifiee,
    /// Held and closed
    #[sea_orm(string_value = "terminee")]
    Terminee,
}

/// Reunion database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "reunions")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Meeting date
    pub date_reunion: Date,
    /// Venue
    pub lieu: Option<String>,
    /// Agenda
    pub ordre_du_jour: Option<String>,
    /// Scheduled or finished
    pub statut: StatutReunion,
}

/// Defines relationships between Reunion and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One meeting has many attendance rows
    #[sea_orm(has_many = "super::presence::Entity")]
    Presences,
}

impl Related<super::presence::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Presences.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
