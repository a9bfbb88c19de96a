pub mod admin;
pub mod auth;
pub mod ballot;
pub mod candidacy;
pub mod phase;
pub mod receipt;
pub mod results;
pub mod voter;

/// Minimum password length for both admins and voters.
pub const MIN_PASSWORD_LENGTH: usize = 8;
