use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use mongodb::bson::{to_bson, Bson};
use rocket::request::FromParam;
use serde::{Deserialize, Serialize};

/// The two sub-processes a scope runs through, in order.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub enum PhaseKind {
    /// Candidacy filing.
    Candidacy,
    /// Ballot casting.
    Election,
}

impl Display for PhaseKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PhaseKind::Candidacy => "candidacy",
            PhaseKind::Election => "election",
        })
    }
}

impl FromStr for PhaseKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "candidacy" => Ok(PhaseKind::Candidacy),
            "election" => Ok(PhaseKind::Election),
            _ => Err(()),
        }
    }
}

impl<'a> FromParam<'a> for PhaseKind {
    type Error = &'a str;

    fn from_param(param: &'a str) -> Result<Self, Self::Error> {
        param.parse().map_err(|_| param)
    }
}

impl From<PhaseKind> for Bson {
    fn from(kind: PhaseKind) -> Self {
        to_bson(&kind).expect("Serialisation is infallible")
    }
}

/// Status of a scheduled phase. The absence of any record is a third,
/// distinct situation ("not scheduled") and is deliberately not a variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PhaseStatus {
    Open,
    Closed,
}

impl From<PhaseStatus> for Bson {
    fn from(status: PhaseStatus) -> Self {
        to_bson(&status).expect("Serialisation is infallible")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_parses_from_route_segment() {
        assert_eq!("candidacy".parse(), Ok(PhaseKind::Candidacy));
        assert_eq!("Election".parse(), Ok(PhaseKind::Election));
        assert_eq!("ballots".parse::<PhaseKind>(), Err(()));
    }
}
