use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use mongodb::bson::{to_bson, Bson};
use rocket::request::FromParam;
use serde::{Deserialize, Serialize};

/// A votable/fileable unit: the school-wide SSG race or one department race.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Scope {
    /// Supreme Student Government; every registered student is eligible.
    Ssg,
    Bsit,
    Bsa,
    Beed,
    Criminology,
    Psych,
}

impl Scope {
    pub const ALL: [Scope; 6] = [
        Scope::Ssg,
        Scope::Bsit,
        Scope::Bsa,
        Scope::Beed,
        Scope::Criminology,
        Scope::Psych,
    ];

    /// Canonical alias table: every department code spelling the rest of the
    /// system accepts, folded onto its scope. This is the single place the
    /// mapping lives; nothing else may carry its own copy.
    pub fn from_department(code: &str) -> Option<Scope> {
        match code.trim().to_uppercase().as_str() {
            "SSG" => Some(Scope::Ssg),
            "BSIT" | "CCS" => Some(Scope::Bsit),
            "BSA" | "CBA" => Some(Scope::Bsa),
            "BEED" | "CTE" => Some(Scope::Beed),
            "CRIMINOLOGY" | "CJE" | "CRIM" => Some(Scope::Criminology),
            "PSYCH" | "PSYCHOLOGY" => Some(Scope::Psych),
            _ => None,
        }
    }

    /// The canonical spelling, as stored and displayed.
    pub fn name(self) -> &'static str {
        match self {
            Scope::Ssg => "SSG",
            Scope::Bsit => "BSIT",
            Scope::Bsa => "BSA",
            Scope::Beed => "BEED",
            Scope::Criminology => "CRIMINOLOGY",
            Scope::Psych => "PSYCH",
        }
    }

    /// Is this the school-wide race, open to students of every department?
    pub fn is_global(self) -> bool {
        self == Scope::Ssg
    }

    /// Whether a student whose home department is `department` may file or
    /// vote in this scope.
    pub fn admits_department(self, department: &str) -> bool {
        self.is_global() || Scope::from_department(department) == Some(self)
    }
}

impl Display for Scope {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Scope {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Scope::from_department(s).ok_or(())
    }
}

impl<'a> FromParam<'a> for Scope {
    type Error = &'a str;

    fn from_param(param: &'a str) -> Result<Self, Self::Error> {
        param.parse().map_err(|_| param)
    }
}

impl From<Scope> for Bson {
    fn from(scope: Scope) -> Self {
        to_bson(&scope).expect("Serialisation is infallible")
    }
}
