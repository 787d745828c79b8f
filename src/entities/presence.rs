//! Presence entity - Attendance of one member at one meeting.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Presence database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "presences")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Meeting
    pub reunion_id: i64,
    /// Member
    pub membre_id: i64,
    /// Whether the member attended
    pub present: bool,
}

/// Defines relationships between Presence and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each row belongs to one meeting
    #[sea_orm(
        belongs_to = "super::reunion::Entity",
        from = "Column::ReunionId",
        to = "super::reunion::Column::Id",
        on_delete = "Cascade"
    )]
    Reunion,
    /// Each row belongs to one member
    #[sea_orm(
        belongs_to = "super::membre::Entity",
        from = "Column::MembreId",
        to = "super::membre::Column::Id",
        on_delete = "Cascade"
    )]
    Membre,
}

impl Related<super::reunion::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Reunion.def()
    }
}

impl Related<super::membre::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Membre.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
