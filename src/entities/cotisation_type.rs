//! Cotisation type entity - Kinds of dues (monthly dues, tontine share, gala fund...).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Cotisation type database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "cotisation_types")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Unique label (e.g. "Cotisation mensuelle")
    #[sea_orm(unique)]
    pub nom: String,
    /// Amount suggested when recording a payment of this type
    pub montant_defaut: f64,
    /// Whether every active member is expected to pay it
    pub obligatoire: bool,
    /// Free-form description
    pub description: Option<String>,
}

/// Defines relationships between `CotisationType` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One type has many cotisations
    #[sea_orm(has_many = "super::cotisation::Entity")]
    Cotisations,
}

impl Related<super::cotisation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Cotisations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
