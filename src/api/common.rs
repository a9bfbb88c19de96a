use crate::error::{Error, Result};
use crate::model::{
    api::auth::AuthToken,
    db::{admin::Admin, voter::Voter},
    mongodb::Coll,
};

/// Load the full voter record behind an auth token.
pub async fn voter_by_token(token: &AuthToken<Voter>, voters: &Coll<Voter>) -> Result<Voter> {
    voters
        .find_one(token.id.as_doc(), None)
        .await?
        .ok_or_else(|| Error::NotFound(format!("No voter found with ID {}", token.id)))
}

/// Load the full admin record behind an auth token, needed for department
/// scoping and role checks.
pub async fn admin_by_token(token: &AuthToken<Admin>, admins: &Coll<Admin>) -> Result<Admin> {
    admins
        .find_one(token.id.as_doc(), None)
        .await?
        .ok_or_else(|| Error::NotFound(format!("No admin found with ID {}", token.id)))
}
