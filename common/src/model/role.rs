use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Account role of the current user, provided by the identity collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The constrained role; holds a limited number of signatures.
    #[default]
    Free,
    Pro,
    Business,
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "free" => Ok(Role::Free),
            "pro" => Ok(Role::Pro),
            "business" => Ok(Role::Business),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Role::Free => "free",
            Role::Pro => "pro",
            Role::Business => "business",
        };
        f.write_str(name)
    }
}

/// Maximum number of signatures a user may hold at the same time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Quota {
    Limited(usize),
    Unlimited,
}

impl Quota {
    /// Maps a role onto its quota. Only the constrained role is limited.
    pub fn for_role(role: Role, constrained_limit: usize) -> Self {
        match role {
            Role::Free => Quota::Limited(constrained_limit),
            Role::Pro | Role::Business => Quota::Unlimited,
        }
    }

    /// Whether one more signature fits when `current` are already stored.
    pub fn allows(&self, current: usize) -> bool {
        match self {
            Quota::Limited(limit) => current < *limit,
            Quota::Unlimited => true,
        }
    }

    pub fn limit(&self) -> Option<usize> {
        match self {
            Quota::Limited(limit) => Some(*limit),
            Quota::Unlimited => None,
        }
    }
}
