//! Fond de caisse cloture entity - End-of-day reconciliation of the cash register.
//!
//! `solde_theorique = solde_ouverture + total_entrees - total_sorties` and
//! `ecart = solde_reel - solde_theorique`, where `solde_reel` is counted by an operator.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Day-close database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "fond_caisse_clotures")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Closed business day
    #[sea_orm(unique)]
    pub date_cloture: Date,
    /// Actual balance of the previous close, or 0
    pub solde_ouverture: f64,
    /// Sum of entries since the previous close
    pub total_entrees: f64,
    /// Sum of exits since the previous close
    pub total_sorties: f64,
    /// Expected balance
    pub solde_theorique: f64,
    /// Counted balance
    pub solde_reel: f64,
    /// Counted minus expected
    pub ecart: f64,
    /// Operator who closed the day
    pub cloture_par: String,
    /// Optional explanation of the variance
    pub notes: Option<String>,
    /// When the close was recorded
    pub created_at: DateTimeUtc,
}

/// Day closes have no relationships
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
