//! Core business logic - Database operations and calculations behind every
//! dashboard screen, independent of the Discord surface.

pub mod aggregation;
pub mod caisse;
pub mod changes;
pub mod cotisation;
pub mod dashboard;
pub mod eligibilite;
pub mod epargne;
pub mod export;
pub mod membre;
pub mod notification;
pub mod period;
pub mod pret;
pub mod reunion;
pub mod sanction;
pub mod sport;
pub mod storage;
pub mod tontine;
