use argon2::Config;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::model::db::admin::{Admin, AdminRole, NewAdmin};

use super::MIN_PASSWORD_LENGTH;

/// Raw admin login credentials, received from a user. These are never stored
/// directly, since the password is in plaintext.
#[derive(Clone, Deserialize, Serialize)]
pub struct AdminCredentials {
    pub username: String,
    pub password: String,
}

/// A request to add an admin to the roster.
#[derive(Clone, Deserialize, Serialize)]
pub struct NewAdminRequest {
    pub username: String,
    pub password: String,
    /// Comma-delimited department codes, e.g. `"CCS, CTE"`.
    pub departments: String,
    pub role: AdminRole,
}

impl TryFrom<NewAdminRequest> for NewAdmin {
    type Error = Error;

    /// Convert a [`NewAdminRequest`] to a new [`Admin`] by hashing the
    /// password. Enforces a non-empty username and minimum password length.
    fn try_from(request: NewAdminRequest) -> Result<Self, Self::Error> {
        if request.username.trim().is_empty() {
            return Err(Error::InvalidInput("username must not be empty".to_string()));
        }
        if request.password.len() < MIN_PASSWORD_LENGTH {
            return Err(Error::InvalidInput(format!(
                "password must be at least {MIN_PASSWORD_LENGTH} characters"
            )));
        }

        // 16 bytes of salt is the recommendation for argon2.
        let mut salt = [0_u8; 16];
        rand::thread_rng().fill(&mut salt);
        let password_hash =
            argon2::hash_encoded(request.password.as_bytes(), &salt, &Config::default()).unwrap(); // Safe because the default `Config` is valid.
        Ok(Self {
            username: request.username,
            password_hash,
            departments: request.departments,
            role: request.role,
        })
    }
}

/// Roster view of an admin; never exposes the password hash.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminView {
    pub username: String,
    pub departments: String,
    pub role: AdminRole,
}

impl From<Admin> for AdminView {
    fn from(admin: Admin) -> Self {
        Self {
            username: admin.admin.username,
            departments: admin.admin.departments,
            role: admin.admin.role,
        }
    }
}

/// Example data for tests.
#[cfg(test)]
mod examples {
    use super::*;

    impl NewAdminRequest {
        pub fn example() -> Self {
            Self {
                username: "cte-coordinator".into(),
                password: "a-decent-password".into(),
                departments: "CTE".into(),
                role: AdminRole::Admin,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashing_round_trips() {
        let request = NewAdminRequest::example();
        let admin: NewAdmin = request.clone().try_into().unwrap();
        assert_eq!(admin.username, request.username);
        assert_eq!(admin.departments, request.departments);
        assert_eq!(admin.role, AdminRole::Admin);
        assert!(admin.verify_password(&request.password));
        assert!(!admin.verify_password("not-the-password"));
    }

    #[test]
    fn empty_username_rejected() {
        let request = NewAdminRequest {
            username: "  ".into(),
            ..NewAdminRequest::example()
        };
        let err = NewAdmin::try_from(request).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn short_password_rejected() {
        let request = NewAdminRequest {
            password: "short".into(),
            ..NewAdminRequest::example()
        };
        let err = NewAdmin::try_from(request).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }
}
