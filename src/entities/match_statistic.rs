//! Match statistics entity - Per-player per-match figures.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Match statistics database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "match_statistics")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Match
    pub match_id: i64,
    /// Player
    pub membre_id: i64,
    /// Goals
    pub buts: i32,
    /// Assists
    pub passes_decisives: i32,
    /// Yellow cards
    pub cartons_jaunes: i32,
    /// Red cards
    pub cartons_rouges: i32,
    /// Man of the match
    pub homme_du_match: bool,
}

/// Defines relationships between `MatchStatistic` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each row belongs to one match
    #[sea_orm(
        belongs_to = "super::sport_match::Entity",
        from = "Column::MatchId",
        to = "super::sport_match::Column::Id",
        on_delete = "Cascade"
    )]
    Match,
    /// Each row belongs to one player
    #[sea_orm(
        belongs_to = "super::membre::Entity",
        from = "Column::MembreId",
        to = "super::membre::Column::Id",
        on_delete = "Cascade"
    )]
    Membre,
}

impl Related<super::sport_match::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Match.def()
    }
}

impl Related<super::membre::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Membre.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
