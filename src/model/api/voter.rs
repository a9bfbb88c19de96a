use argon2::Config;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::model::{common::Scope, db::voter::NewVoter};

use super::MIN_PASSWORD_LENGTH;

/// Raw voter login credentials.
#[derive(Clone, Deserialize, Serialize)]
pub struct VoterCredentials {
    pub student_id: String,
    pub password: String,
}

/// A voter registration request.
#[derive(Clone, Deserialize, Serialize)]
pub struct VoterRegistration {
    pub student_id: String,
    pub full_name: String,
    pub email: String,
    /// Any accepted department spelling; stored canonically.
    pub department: String,
    pub password: String,
}

impl TryFrom<VoterRegistration> for NewVoter {
    type Error = Error;

    /// Validate a registration and hash its password. The department is
    /// folded through the alias table here, once, so every later eligibility
    /// check and statistic works on the canonical spelling.
    fn try_from(registration: VoterRegistration) -> Result<Self, Self::Error> {
        if registration.student_id.trim().is_empty() {
            return Err(Error::InvalidInput(
                "student number must not be empty".to_string(),
            ));
        }
        if registration.full_name.trim().is_empty() {
            return Err(Error::InvalidInput("full name must not be empty".to_string()));
        }
        if registration.email.trim().is_empty() {
            return Err(Error::InvalidInput("email must not be empty".to_string()));
        }
        let scope = Scope::from_department(&registration.department).ok_or_else(|| {
            Error::InvalidInput(format!(
                "unknown department '{}'",
                registration.department
            ))
        })?;
        if scope.is_global() {
            // SSG is a race, not a home department.
            return Err(Error::InvalidInput(
                "SSG is not a department; register with your home department".to_string(),
            ));
        }
        if registration.password.len() < MIN_PASSWORD_LENGTH {
            return Err(Error::InvalidInput(format!(
                "password must be at least {MIN_PASSWORD_LENGTH} characters"
            )));
        }

        let mut salt = [0_u8; 16];
        rand::thread_rng().fill(&mut salt);
        let password_hash = argon2::hash_encoded(
            registration.password.as_bytes(),
            &salt,
            &Config::default(),
        )
        .unwrap(); // Safe because the default `Config` is valid.
        Ok(Self {
            student_id: registration.student_id.trim().to_string(),
            full_name: registration.full_name.trim().to_string(),
            email: registration.email.trim().to_string(),
            department: scope.name().to_string(),
            password_hash,
        })
    }
}

/// Example data for tests.
#[cfg(test)]
mod examples {
    use super::*;

    impl VoterRegistration {
        pub fn example() -> Self {
            Self {
                student_id: "2021-00412".into(),
                full_name: "Maria Santos".into(),
                email: "maria.santos@example.edu".into(),
                department: "ccs".into(),
                password: "a-decent-password".into(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registration_normalises_department() {
        let voter: NewVoter = VoterRegistration::example().try_into().unwrap();
        assert_eq!(voter.department, "BSIT");
        assert_eq!(voter.home_scope(), Some(Scope::Bsit));
        assert!(voter.verify_password("a-decent-password"));
    }

    #[test]
    fn unknown_department_rejected() {
        let registration = VoterRegistration {
            department: "NURSING".into(),
            ..VoterRegistration::example()
        };
        let err = NewVoter::try_from(registration).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn ssg_is_not_a_home_department() {
        let registration = VoterRegistration {
            department: "SSG".into(),
            ..VoterRegistration::example()
        };
        let err = NewVoter::try_from(registration).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn blank_fields_rejected() {
        for field in ["student_id", "full_name", "email"] {
            let mut registration = VoterRegistration::example();
            match field {
                "student_id" => registration.student_id = " ".into(),
                "full_name" => registration.full_name = String::new(),
                _ => registration.email = String::new(),
            }
            let err = NewVoter::try_from(registration).unwrap_err();
            assert!(matches!(err, Error::InvalidInput(_)), "{field}");
        }
    }
}
