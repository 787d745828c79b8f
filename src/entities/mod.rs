//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the association's tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod cotisation;
pub mod cotisation_type;
pub mod epargne;
pub mod fond_caisse_cloture;
pub mod fond_caisse_operation;
pub mod match_statistic;
pub mod membre;
pub mod notification_template;
pub mod presence;
pub mod pret;
pub mod reunion;
pub mod sanction;
pub mod sanction_type;
pub mod sport_match;
pub mod tontine_attribution;

// Re-export specific types to avoid conflicts
pub use cotisation::{Entity as Cotisation, Model as CotisationModel};
pub use cotisation_type::{Entity as CotisationType, Model as CotisationTypeModel};
pub use epargne::{Entity as Epargne, Model as EpargneModel};
pub use fond_caisse_cloture::{Entity as FondCaisseCloture, Model as FondCaisseClotureModel};
pub use fond_caisse_operation::{
    Entity as FondCaisseOperation, Model as FondCaisseOperationModel,
};
pub use match_statistic::{Entity as MatchStatistic, Model as MatchStatisticModel};
pub use membre::{Entity as Membre, Model as MembreModel};
pub use notification_template::{
    Entity as NotificationTemplate, Model as NotificationTemplateModel,
};
pub use presence::{Entity as Presence, Model as PresenceModel};
pub use pret::{Entity as Pret, Model as PretModel};
pub use reunion::{Entity as Reunion, Model as ReunionModel};
pub use sanction::{Entity as Sanction, Model as SanctionModel};
pub use sanction_type::{Entity as SanctionType, Model as SanctionTypeModel};
pub use sport_match::{Entity as SportMatch, Model as SportMatchModel};
pub use tontine_attribution::{
    Entity as TontineAttribution, Model as TontineAttributionModel,
};
