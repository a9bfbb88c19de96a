mod candidacy;
mod phase;
mod position;
mod scope;

pub use candidacy::CandidacyStatus;
pub use phase::{PhaseKind, PhaseStatus};
pub use position::Position;
pub use scope::Scope;
