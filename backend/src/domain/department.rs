//! Department catalogue.
//!
//! Departments form a closed set. Wire names are the upper-case codes used by
//! clients and stored in the database; each code carries a human label.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Error returned when a department code is not part of the catalogue.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown department code: {code}")]
pub struct UnknownDepartment {
    /// The rejected input.
    pub code: String,
}

macro_rules! departments {
    ($($variant:ident => ($code:literal, $label:literal)),* $(,)?) => {
        /// Campus department owning tickets and coordinators.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum Department {
            $(
                #[doc = $label]
                #[serde(rename = $code)]
                $variant,
            )*
        }

        impl Department {
            /// Every department in catalogue order.
            pub const ALL: &'static [Department] = &[$(Department::$variant),*];

            /// Wire code, e.g. `CSE`.
            pub const fn code(self) -> &'static str {
                match self {
                    $(Department::$variant => $code,)*
                }
            }

            /// Human readable label.
            pub const fn label(self) -> &'static str {
                match self {
                    $(Department::$variant => $label,)*
                }
            }
        }

        impl FromStr for Department {
            type Err = UnknownDepartment;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($code => Ok(Department::$variant),)*
                    other => Err(UnknownDepartment { code: other.to_owned() }),
                }
            }
        }
    };
}

departments! {
    Ise => ("ISE", "Information Science and Engineering"),
    Cse => ("CSE", "Computer Science and Engineering"),
    Aiml => ("AIML", "Artificial Intelligence and Machine Learning"),
    Bt => ("BT", "Biotechnology"),
    Cv => ("CV", "Civil"),
    Me => ("ME", "Mechanical Engineering"),
    Ete => ("ETE", "Electronics and Telecommunication Engineering"),
    Eie => ("EIE", "Electronics and Instrumentation Engineering"),
    Ece => ("ECE", "Electronics and Communication Engineering"),
    Ase => ("ASE", "Aerospace Engineering"),
    Idrc => ("IDRC", "IDRC"),
    Lib => ("LIB", "Library"),
    Cmt => ("CMT", "Central Maintenance"),
    Mca => ("MCA", "Masters of Computer Applications"),
    AdminBlock => ("ADMIN_BLOCK", "Admin Block"),
    Chem => ("CHEM", "Chemical Engineering"),
    Phy => ("PHY", "Physics Department"),
    Math => ("MATH", "Mathematics Department"),
}

impl fmt::Display for Department {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
