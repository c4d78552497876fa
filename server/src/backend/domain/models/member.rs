//! Domain model for a fund member.
use anyhow::anyhow;
use chrono::{DateTime, Utc};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Admin,
    Member,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Member => "member",
        }
    }
}

impl FromStr for Role {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "member" => Ok(Role::Member),
            other => Err(anyhow!("unknown role: {}", other)),
        }
    }
}

/// A person in the member directory.
///
/// Admin accounts never carry a monthly fee.
#[derive(Debug, Clone, PartialEq)]
pub struct Member {
    pub id: String,
    pub name: String,
    pub role: Role,
    pub monthly_fee: i64,
    pub created_at: DateTime<Utc>,
}

impl Member {
    pub fn generate_id() -> String {
        uuid::Uuid::new_v4().to_string()
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// The already-authenticated caller of a command.
#[derive(Debug, Clone, PartialEq)]
pub struct Actor {
    pub member_id: String,
    pub role: Role,
}

impl Actor {
    pub fn new(member_id: impl Into<String>, role: Role) -> Self {
        Self {
            member_id: member_id.into(),
            role,
        }
    }
}
