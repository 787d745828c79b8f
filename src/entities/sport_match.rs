//! Match entity - A game played by one of the two sports sub-clubs.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Sports sub-club
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum Equipe {
    /// E2D team
    #[sea_orm(string_value = "e2d")]
    E2d,
    /// Phoenix team
    #[sea_orm(string_value = "phoenix")]
    Phoenix,
}

impl std::fmt::Display for Equipe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::E2d => write!(f, "E2D"),
            Self::Phoenix => write!(f, "Phoenix"),
        }
    }
}

/// Match database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "sport_matches")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Which sub-club played
    pub equipe: Equipe,
    /// Match date
    pub date_match: Date,
    /// Opponent name
    pub adversaire: String,
    /// Goals scored by our team
    pub score_equipe: i32,
    /// Goals conceded
    pub score_adverse: i32,
    /// Venue
    pub lieu: Option<String>,
    /// Competition or "amical"
    pub competition: Option<String>,
}

/// Defines relationships between Match and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One match has many player statistics rows
    #[sea_orm(has_many = "super::match_statistic::Entity")]
    Statistics,
}

impl Related<super::match_statistic::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Statistics.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
