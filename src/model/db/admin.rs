use std::collections::HashSet;
use std::ops::{Deref, DerefMut};

use mongodb::bson::{to_bson, Bson};
use mongodb::error::Error as DbError;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::model::{common::Scope, mongodb::Coll, mongodb::Id};

pub const DEFAULT_ADMIN_USERNAME: &str = "admin";
const DEFAULT_ADMIN_PASSWORD: &str = "smartvote-setup";

/// Privilege level of an administrative account.
/// Superadmins manage the admin roster; they do NOT bypass department
/// scoping when opening or closing phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AdminRole {
    Admin,
    SuperAdmin,
}

impl From<AdminRole> for Bson {
    fn from(role: AdminRole) -> Self {
        to_bson(&role).expect("Serialisation is infallible")
    }
}

/// Core admin user data.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminCore {
    pub username: String,
    pub password_hash: String,
    /// Comma-delimited department codes, e.g. `"CCS, CTE"`.
    pub departments: String,
    pub role: AdminRole,
}

impl AdminCore {
    /// Check whether the given password is correct.
    pub fn verify_password<T: AsRef<[u8]>>(&self, password: T) -> bool {
        argon2::verify_encoded(&self.password_hash, password.as_ref()).unwrap_or(false)
    }

    /// The scopes this admin's departments alias onto.
    /// Unknown department codes are silently skipped.
    pub fn permitted_scopes(&self) -> HashSet<Scope> {
        self.departments
            .split(',')
            .filter_map(Scope::from_department)
            .collect()
    }

    /// May this admin open or close phases for the given scope?
    pub fn permits(&self, scope: Scope) -> bool {
        self.permitted_scopes().contains(&scope)
    }

    /// The superadmin created on first launch, holding every scope.
    fn bootstrap() -> Self {
        let mut salt = [0_u8; 16];
        rand::thread_rng().fill(&mut salt);
        let password_hash = argon2::hash_encoded(
            DEFAULT_ADMIN_PASSWORD.as_bytes(),
            &salt,
            &argon2::Config::default(),
        )
        .unwrap(); // Safe because the default `Config` is valid.
        Self {
            username: DEFAULT_ADMIN_USERNAME.to_string(),
            password_hash,
            departments: Scope::ALL.map(Scope::name).join(", "),
            role: AdminRole::SuperAdmin,
        }
    }
}

/// An admin without an ID.
pub type NewAdmin = AdminCore;

/// An admin user from the database, with its unique ID.
#[derive(Debug, Serialize, Deserialize)]
pub struct Admin {
    #[serde(rename = "_id")]
    pub id: Id,
    #[serde(flatten)]
    pub admin: AdminCore,
}

impl Deref for Admin {
    type Target = AdminCore;

    fn deref(&self) -> &Self::Target {
        &self.admin
    }
}

impl DerefMut for Admin {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.admin
    }
}

/// Create the bootstrap superadmin if the collection is empty, so the system
/// is never launched without a way in.
pub async fn ensure_admin_exists(admins: &Coll<NewAdmin>) -> Result<(), DbError> {
    let count = admins.count_documents(None, None).await?;
    if count == 0 {
        admins.insert_one(NewAdmin::bootstrap(), None).await?;
        warn!(
            "No admin accounts found; created superadmin '{DEFAULT_ADMIN_USERNAME}' \
with the default password. Change it before going live."
        );
    }
    Ok(())
}

/// Example data for tests.
#[cfg(test)]
mod examples {
    use super::*;

    impl AdminCore {
        pub fn example() -> Self {
            Self {
                username: "ccs-coordinator".to_string(),
                password_hash: "unused".to_string(),
                departments: "CCS".to_string(),
                role: AdminRole::Admin,
            }
        }

        pub fn example_multi_department() -> Self {
            Self {
                username: "joint-coordinator".to_string(),
                password_hash: "unused".to_string(),
                departments: "CCS, CTE".to_string(),
                role: AdminRole::Admin,
            }
        }

        pub fn example_ssg() -> Self {
            Self {
                username: "ssg-adviser".to_string(),
                password_hash: "unused".to_string(),
                departments: "SSG".to_string(),
                role: AdminRole::Admin,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn departments_alias_onto_scopes() {
        let admin = AdminCore::example_multi_department();
        let scopes = admin.permitted_scopes();
        assert_eq!(scopes, HashSet::from([Scope::Bsit, Scope::Beed]));
        assert!(admin.permits(Scope::Bsit));
        assert!(admin.permits(Scope::Beed));
        assert!(!admin.permits(Scope::Bsa));
        assert!(!admin.permits(Scope::Ssg));
    }

    #[test]
    fn single_department_admin() {
        let admin = AdminCore {
            departments: "BSA".to_string(),
            ..AdminCore::example()
        };
        assert!(admin.permits(Scope::Bsa));
        assert!(!admin.permits(Scope::Bsit));
    }

    #[test]
    fn unknown_departments_grant_nothing() {
        let admin = AdminCore {
            departments: "REGISTRAR, , CCS".to_string(),
            ..AdminCore::example()
        };
        assert_eq!(admin.permitted_scopes(), HashSet::from([Scope::Bsit]));
    }

    #[test]
    fn bootstrap_admin_holds_every_scope() {
        let admin = AdminCore::bootstrap();
        assert_eq!(admin.role, AdminRole::SuperAdmin);
        assert_eq!(
            admin.permitted_scopes(),
            HashSet::from_iter(Scope::ALL.into_iter())
        );
        assert!(admin.verify_password(DEFAULT_ADMIN_PASSWORD));
        assert!(!admin.verify_password("wrong"));
    }
}
