//! Notification template entity - Parametrized email subject and body.
//!
//! Placeholders are written `{{variable}}`; `variables` lists the expected
//! names, comma separated.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Notification template database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "notification_templates")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Stable code used by the `send-notification` function
    #[sea_orm(unique)]
    pub code: String,
    /// Display name
    pub nom: String,
    /// Email subject with placeholders
    pub sujet: String,
    /// Email body with placeholders
    pub contenu: String,
    /// Comma separated variable names
    pub variables: String,
    /// Disabled templates are never sent
    pub actif: bool,
}

impl Model {
    /// Declared variable names, trimmed, empty entries dropped
    #[must_use]
    pub fn variable_names(&self) -> Vec<&str> {
        self.variables
            .split(',')
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .collect()
    }
}

/// Templates have no relationships
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
