pub mod admin;
pub mod ballot;
pub mod candidate;
pub mod phase;
pub mod voter;
