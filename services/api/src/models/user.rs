//! User model and related functionality

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User role within a residential community
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    /// Regular community resident, the store default
    Resident,
    /// Community administrator
    Administrator,
}

impl Role {
    /// Database/text representation of the role
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Resident => "Resident",
            Role::Administrator => "Administrator",
        }
    }

    /// Parse a role from its text representation
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Resident" => Some(Role::Resident),
            "Administrator" => Some(Role::Administrator),
            _ => None,
        }
    }
}

/// User entity
///
/// The `password` field holds the stored credential exactly as submitted;
/// see the `password` module. An `id` of zero marks a user that has not
/// been persisted yet.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub password: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Login credentials submitted by a client
///
/// Transient: constructed per login attempt, never persisted.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}
