//! Member business logic - Handles all member-related operations.
//!
//! Provides functions for creating, retrieving, updating and deleting members,
//! plus the lookups used by autocomplete and the sports sub-clubs.

use crate::{
    entities::{
        Membre, membre,
        membre::StatutMembre,
        sport_match::Equipe,
    },
    errors::{Error, Result},
};
use chrono::NaiveDate;
use sea_orm::{QueryOrder, Set, prelude::*};
use tracing::info;

/// Input for [`create_membre`]
#[derive(Debug, Clone)]
pub struct NewMembre {
    /// Family name
    pub nom: String,
    /// Given name
    pub prenom: String,
    /// Optional email
    pub email: Option<String>,
    /// Optional phone
    pub telephone: Option<String>,
    /// E2D membership
    pub est_membre_e2d: bool,
    /// Phoenix membership
    pub est_adherent_phoenix: bool,
    /// Joining date
    pub date_inscription: NaiveDate,
}

fn validate_email(email: Option<&str>) -> Result<()> {
    if let Some(email) = email {
        let email = email.trim();
        let valid = email
            .split_once('@')
            .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
        if !valid {
            return Err(Error::validation(format!("Adresse email invalide : {email}")));
        }
    }
    Ok(())
}

/// Creates a new active member after validating names and email.
pub async fn create_membre(db: &DatabaseConnection, input: NewMembre) -> Result<membre::Model> {
    if input.nom.trim().is_empty() || input.prenom.trim().is_empty() {
        return Err(Error::validation("Le nom et le prénom sont obligatoires"));
    }
    validate_email(input.email.as_deref())?;

    let model = membre::ActiveModel {
        nom: Set(input.nom.trim().to_string()),
        prenom: Set(input.prenom.trim().to_string()),
        email: Set(input.email.map(|e| e.trim().to_lowercase())),
        telephone: Set(input.telephone),
        statut: Set(StatutMembre::Actif),
        est_membre_e2d: Set(input.est_membre_e2d),
        est_adherent_phoenix: Set(input.est_adherent_phoenix),
        photo_url: Set(None),
        date_inscription: Set(input.date_inscription),
        ..Default::default()
    };

    let created = model.insert(db).await?;
    info!("Created member {} (id {})", created.nom_complet(), created.id);
    Ok(created)
}

/// Finds a member by primary key.
pub async fn get_membre_by_id(db: &DatabaseConnection, id: i64) -> Result<Option<membre::Model>> {
    Membre::find_by_id(id).one(db).await.map_err(Into::into)
}

/// Finds a member by primary key or fails with [`Error::MemberNotFound`].
pub async fn require_membre<C>(db: &C, id: i64) -> Result<membre::Model>
where
    C: ConnectionTrait,
{
    Membre::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| Error::MemberNotFound {
            name: id.to_string(),
        })
}

/// Lists every member ordered by name.
pub async fn list_membres(db: &DatabaseConnection) -> Result<Vec<membre::Model>> {
    Membre::find()
        .order_by_asc(membre::Column::Nom)
        .order_by_asc(membre::Column::Prenom)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Lists active members ordered by name.
pub async fn list_active_membres(db: &DatabaseConnection) -> Result<Vec<membre::Model>> {
    Membre::find()
        .filter(membre::Column::Statut.eq(StatutMembre::Actif))
        .order_by_asc(membre::Column::Nom)
        .order_by_asc(membre::Column::Prenom)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Lists active members of a sports sub-club.
pub async fn list_team_membres(
    db: &DatabaseConnection,
    equipe: Equipe,
) -> Result<Vec<membre::Model>> {
    let flag = match equipe {
        Equipe::E2d => membre::Column::EstMembreE2d,
        Equipe::Phoenix => membre::Column::EstAdherentPhoenix,
    };
    Membre::find()
        .filter(membre::Column::Statut.eq(StatutMembre::Actif))
        .filter(flag.eq(true))
        .order_by_asc(membre::Column::Nom)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Whether the member belongs to the given sub-club
#[must_use]
pub const fn is_in_team(membre: &membre::Model, equipe: Equipe) -> bool {
    match equipe {
        Equipe::E2d => membre.est_membre_e2d,
        Equipe::Phoenix => membre.est_adherent_phoenix,
    }
}

/// Case-insensitive search on "Prénom Nom" and "Nom Prénom".
pub async fn search_membres(db: &DatabaseConnection, query: &str) -> Result<Vec<membre::Model>> {
    let needle = query.trim().to_lowercase();
    let membres = list_membres(db).await?;
    Ok(membres
        .into_iter()
        .filter(|m| {
            let forward = m.nom_complet().to_lowercase();
            let backward = format!("{} {}", m.nom, m.prenom).to_lowercase();
            forward.contains(&needle) || backward.contains(&needle)
        })
        .collect())
}

/// Resolves a display name typed by an operator to exactly one member.
///
/// An exact "Prénom Nom" match wins; otherwise the search must be unambiguous.
pub async fn find_membre_by_display_name(
    db: &DatabaseConnection,
    name: &str,
) -> Result<membre::Model> {
    let mut matches = search_membres(db, name).await?;
    if let Some(pos) = matches
        .iter()
        .position(|m| m.nom_complet().eq_ignore_ascii_case(name.trim()))
    {
        return Ok(matches.swap_remove(pos));
    }
    match matches.len() {
        1 => Ok(matches.swap_remove(0)),
        0 => Err(Error::MemberNotFound {
            name: name.to_string(),
        }),
        n => Err(Error::validation(format!(
            "« {name} » correspond à {n} membres, précisez le nom"
        ))),
    }
}

/// Changes a member's activity status.
pub async fn set_statut(
    db: &DatabaseConnection,
    id: i64,
    statut: StatutMembre,
) -> Result<membre::Model> {
    let membre = require_membre(db, id).await?;
    let mut active: membre::ActiveModel = membre.into();
    active.statut = Set(statut);
    Ok(active.update(db).await?)
}

/// Updates contact details; `None` leaves a field unchanged.
pub async fn update_contact(
    db: &DatabaseConnection,
    id: i64,
    email: Option<String>,
    telephone: Option<String>,
) -> Result<membre::Model> {
    validate_email(email.as_deref())?;
    let membre = require_membre(db, id).await?;
    let mut active: membre::ActiveModel = membre.into();
    if let Some(email) = email {
        active.email = Set(Some(email.trim().to_lowercase()));
    }
    if let Some(telephone) = telephone {
        active.telephone = Set(Some(telephone));
    }
    Ok(active.update(db).await?)
}

/// Updates sports sub-club memberships.
pub async fn set_teams(
    db: &DatabaseConnection,
    id: i64,
    e2d: bool,
    phoenix: bool,
) -> Result<membre::Model> {
    let membre = require_membre(db, id).await?;
    let mut active: membre::ActiveModel = membre.into();
    active.est_membre_e2d = Set(e2d);
    active.est_adherent_phoenix = Set(phoenix);
    Ok(active.update(db).await?)
}

/// Stores the public URL of the member's photo.
pub async fn set_photo_url(
    db: &DatabaseConnection,
    id: i64,
    url: Option<String>,
) -> Result<membre::Model> {
    let membre = require_membre(db, id).await?;
    let mut active: membre::ActiveModel = membre.into();
    active.photo_url = Set(url);
    Ok(active.update(db).await?)
}

/// Hard-deletes a member.
pub async fn delete_membre(db: &DatabaseConnection, id: i64) -> Result<()> {
    let result = Membre::delete_by_id(id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(Error::MemberNotFound {
            name: id.to_string(),
        });
    }
    info!("Deleted member {id}");
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_create_membre_validation() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();

        let mut input = new_membre_input("", "Awa");
        let result = create_membre(&db, input.clone()).await;
        assert!(matches!(result, Err(Error::Validation { .. })));

        input.nom = "Diallo".into();
        input.email = Some("pas-une-adresse".into());
        let result = create_membre(&db, input).await;
        assert!(matches!(result, Err(Error::Validation { .. })));

        Ok(())
    }

    #[tokio::test]
    async fn test_create_membre_integration() -> Result<()> {
        let db = setup_test_db().await?;
        let mut input = new_membre_input(" Diallo ", "Awa");
        input.email = Some("Awa.Diallo@Example.org".into());

        let membre = create_membre(&db, input).await?;
        assert_eq!(membre.nom, "Diallo");
        assert_eq!(membre.statut, StatutMembre::Actif);
        assert_eq!(membre.email.as_deref(), Some("awa.diallo@example.org"));
        assert_eq!(membre.nom_complet(), "Awa Diallo");
        Ok(())
    }

    #[tokio::test]
    async fn test_list_active_excludes_inactive() -> Result<()> {
        let db = setup_test_db().await?;
        let a = create_test_membre(&db, "Abega", "Paul").await?;
        let b = create_test_membre(&db, "Bella", "Marie").await?;
        set_statut(&db, b.id, StatutMembre::Inactif).await?;

        let actifs = list_active_membres(&db).await?;
        assert_eq!(actifs.len(), 1);
        assert_eq!(actifs[0].id, a.id);
        assert_eq!(list_membres(&db).await?.len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_team_membership() -> Result<()> {
        let db = setup_test_db().await?;
        let joueur = create_test_membre(&db, "Eto", "Samuel").await?;
        create_test_membre(&db, "Nkoulou", "Nicolas").await?;
        set_teams(&db, joueur.id, true, false).await?;

        let e2d = list_team_membres(&db, Equipe::E2d).await?;
        assert_eq!(e2d.len(), 1);
        assert!(is_in_team(&e2d[0], Equipe::E2d));
        assert!(!is_in_team(&e2d[0], Equipe::Phoenix));
        assert!(list_team_membres(&db, Equipe::Phoenix).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_find_membre_by_display_name() -> Result<()> {
        let db = setup_test_db().await?;
        let awa = create_test_membre(&db, "Diallo", "Awa").await?;
        create_test_membre(&db, "Diallo", "Moussa").await?;

        assert_eq!(find_membre_by_display_name(&db, "Awa Diallo").await?.id, awa.id);
        assert_eq!(find_membre_by_display_name(&db, "diallo awa").await?.id, awa.id);
        assert!(matches!(
            find_membre_by_display_name(&db, "Diallo").await,
            Err(Error::Validation { .. })
        ));
        assert!(matches!(
            find_membre_by_display_name(&db, "Inconnu").await,
            Err(Error::MemberNotFound { .. })
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_membre() -> Result<()> {
        let db = setup_test_db().await?;
        let m = create_test_membre(&db, "Abega", "Paul").await?;
        delete_membre(&db, m.id).await?;
        assert!(get_membre_by_id(&db, m.id).await?.is_none());
        assert!(matches!(
            delete_membre(&db, m.id).await,
            Err(Error::MemberNotFound { .. })
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_membre_cascades_to_cotisations() -> Result<()> {
        let (db, m, t) = setup_with_membre_and_type().await?;
        create_test_cotisation(&db, m.id, t.id, 5000.0, date(2024, 3, 5)).await?;

        delete_membre(&db, m.id).await?;
        let remaining = crate::entities::Cotisation::find().all(&db).await?;
        assert!(remaining.is_empty());
        Ok(())
    }
}
