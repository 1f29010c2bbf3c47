//! Session capability, resolved once when the session starts.

use crate::error::SessionError;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Role {
    Admin,
    #[default]
    Viewer,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Admin => write!(f, "admin"),
            Role::Viewer => write!(f, "viewer"),
        }
    }
}

impl FromStr for Role {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "viewer" | "user" => Ok(Role::Viewer),
            other => anyhow::bail!("unknown role '{}' (expected admin or viewer)", other),
        }
    }
}

/// What the session's user may do. Reading is always allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Capability {
    edit_charts: bool,
}

impl Capability {
    pub fn for_role(role: Role) -> Self {
        Self {
            edit_charts: role == Role::Admin,
        }
    }

    pub fn can_edit_charts(&self) -> bool {
        self.edit_charts
    }

    /// Gate for create, update and delete of chart configs.
    pub fn require_chart_edit(&self) -> Result<(), SessionError> {
        if self.edit_charts {
            Ok(())
        } else {
            Err(SessionError::Forbidden)
        }
    }
}
