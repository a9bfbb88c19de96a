use std::ops::{Deref, DerefMut};

use serde::{Deserialize, Serialize};

use crate::model::{common::Scope, mongodb::Id};

/// Core voter user data, as stored in the database.
/// `department` always holds the canonical scope spelling; raw input is
/// folded through the alias table at registration time.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoterCore {
    pub student_id: String,
    pub full_name: String,
    pub email: String,
    pub department: String,
    pub password_hash: String,
}

impl VoterCore {
    /// Check whether the given password is correct.
    pub fn verify_password<T: AsRef<[u8]>>(&self, password: T) -> bool {
        argon2::verify_encoded(&self.password_hash, password.as_ref()).unwrap_or(false)
    }

    /// The scope this voter's home department belongs to.
    pub fn home_scope(&self) -> Option<Scope> {
        Scope::from_department(&self.department)
    }

    /// May this voter participate (file or vote) in the given scope?
    pub fn eligible_for(&self, scope: Scope) -> bool {
        scope.admits_department(&self.department)
    }
}

/// A voter without an ID.
pub type NewVoter = VoterCore;

/// A voter user from the database, with its unique ID.
#[derive(Debug, Serialize, Deserialize)]
pub struct Voter {
    #[serde(rename = "_id")]
    pub id: Id,
    #[serde(flatten)]
    pub voter: VoterCore,
}

impl Deref for Voter {
    type Target = VoterCore;

    fn deref(&self) -> &Self::Target {
        &self.voter
    }
}

impl DerefMut for Voter {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.voter
    }
}

/// Example data for tests.
#[cfg(test)]
mod examples {
    use super::*;

    impl VoterCore {
        pub fn example() -> Self {
            Self {
                student_id: "2021-00412".to_string(),
                full_name: "Maria Santos".to_string(),
                email: "maria.santos@example.edu".to_string(),
                department: "BSIT".to_string(),
                password_hash: "unused".to_string(),
            }
        }

        pub fn example2() -> Self {
            Self {
                student_id: "2020-01177".to_string(),
                full_name: "Jose Ramirez".to_string(),
                email: "jose.ramirez@example.edu".to_string(),
                department: "BEED".to_string(),
                password_hash: "unused".to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eligibility_follows_home_department() {
        let voter = VoterCore::example();
        assert_eq!(voter.home_scope(), Some(Scope::Bsit));
        assert!(voter.eligible_for(Scope::Bsit));
        assert!(voter.eligible_for(Scope::Ssg));
        assert!(!voter.eligible_for(Scope::Beed));
    }
}
