//! User account record.

use chrono::{DateTime, Utc};
use common::EntityId;
use serde::{Deserialize, Serialize};

/// Role of a marketplace account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Regular customer.
    #[default]
    User,
    /// Seller who lists books.
    Librarian,
    /// Operator with access to the transaction ledger.
    Admin,
}

impl Role {
    /// Returns the role name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Librarian => "librarian",
            Role::Admin => "admin",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A marketplace account, created on first login.
///
/// Email is the unique natural key; the role is mutated only by an admin
/// action. Accounts are never deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: EntityId,
    pub email: String,
    pub name: Option<String>,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Creates a new user with the default role.
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            id: EntityId::new(),
            email: email.into(),
            name: None,
            role: Role::default(),
            created_at: Utc::now(),
        }
    }

    /// Creates a new user with a specific role.
    pub fn with_role(email: impl Into<String>, role: Role) -> Self {
        Self {
            role,
            ..Self::new(email)
        }
    }
}
