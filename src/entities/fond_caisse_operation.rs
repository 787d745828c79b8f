//! Fond de caisse operation entity - A cash entry or exit in the physical register.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Direction of a cash movement
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum TypeOperation {
    /// Cash in
    #[sea_orm(string_value = "entree")]
    Entree,
    /// Cash out
    #[sea_orm(string_value = "sortie")]
    Sortie,
}

/// Cash operation database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "fond_caisse_operations")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Business day of the movement
    pub date_operation: Date,
    /// Entry or exit
    pub type_operation: TypeOperation,
    /// Always positive; the direction is carried by `type_operation`
    pub montant: f64,
    /// What the movement is for
    pub libelle: String,
    /// Operator who recorded it
    pub operateur: String,
}

/// Cash operations have no relationships
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
