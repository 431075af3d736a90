//! Role domain model.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::HmsError;

/// The closed set of roles a user account can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    HospitalAdmin,
    Staff,
    Doctor,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::HospitalAdmin, Role::Staff, Role::Doctor];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::HospitalAdmin => "HOSPITAL_ADMIN",
            Role::Staff => "STAFF",
            Role::Doctor => "DOCTOR",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = HmsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| HmsError::validation(format!("unknown role: {s}")))
    }
}
