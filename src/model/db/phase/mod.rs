mod closer;
mod record;

pub use closer::{PhaseCloserFairing, PhaseClosers};
pub use record::{validate_open, PhaseRecord};
