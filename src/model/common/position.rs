use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

use super::scope::Scope;

/// An elected position. Declaration order is the canonical display order for
/// ballot forms and result listings; `Ord` follows it.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Position {
    President,
    VicePresident,
    Secretary,
    Treasurer,
    Auditor,
    Mmo,
    Representative,
}

impl Position {
    pub const ALL: [Position; 7] = [
        Position::President,
        Position::VicePresident,
        Position::Secretary,
        Position::Treasurer,
        Position::Auditor,
        Position::Mmo,
        Position::Representative,
    ];

    /// Whether this position is contested in the given scope.
    /// Department races run without an auditor.
    pub fn contested_in(self, scope: Scope) -> bool {
        self != Position::Auditor || scope.is_global()
    }

    /// Human-readable title, as shown on ballots.
    pub fn title(self) -> &'static str {
        match self {
            Position::President => "President",
            Position::VicePresident => "Vice President",
            Position::Secretary => "Secretary",
            Position::Treasurer => "Treasurer",
            Position::Auditor => "Auditor",
            Position::Mmo => "MMO",
            Position::Representative => "Representatives",
        }
    }
}

impl Display for Position {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_order_follows_declaration() {
        let mut shuffled = vec![
            Position::Mmo,
            Position::President,
            Position::Auditor,
            Position::Secretary,
        ];
        shuffled.sort();
        assert_eq!(
            shuffled,
            vec![
                Position::President,
                Position::Secretary,
                Position::Auditor,
                Position::Mmo,
            ]
        );
    }

    #[test]
    fn auditor_only_runs_school_wide() {
        assert!(Position::Auditor.contested_in(Scope::Ssg));
        assert!(!Position::Auditor.contested_in(Scope::Bsit));
        assert!(Position::President.contested_in(Scope::Bsa));
    }

    #[test]
    fn serde_names_are_snake_case() {
        use rocket::serde::json::serde_json;

        let json = serde_json::to_string(&Position::VicePresident).unwrap();
        assert_eq!(json, "\"vice_president\"");
        let back: Position = serde_json::from_str("\"mmo\"").unwrap();
        assert_eq!(back, Position::Mmo);
    }
}
