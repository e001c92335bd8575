use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::geo::Location;

/// Roles recognized by the authorization rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Customer,
    Restaurant,
    Delivery,
    Admin,
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Customer => write!(f, "customer"),
            Self::Restaurant => write!(f, "restaurant"),
            Self::Delivery => write!(f, "delivery"),
            Self::Admin => write!(f, "admin"),
        }
    }
}

impl std::str::FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "customer" => Ok(Self::Customer),
            "restaurant" => Ok(Self::Restaurant),
            "delivery" => Ok(Self::Delivery),
            "admin" => Ok(Self::Admin),
            _ => Err(format!("Invalid user role: {s}")),
        }
    }
}

/// A user record as consumed from the storage collaborator.
///
/// Credential storage and password hashing live outside this engine; only the
/// fields the dispatch core needs are modeled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub address: Option<String>,
    pub location: Option<Location>,
}

/// The identity and role under which an operation is attempted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Actor {
    pub user_id: Uuid,
    pub role: UserRole,
}

impl Actor {
    pub fn new(user_id: Uuid, role: UserRole) -> Self {
        Self { user_id, role }
    }
}

impl From<&User> for Actor {
    fn from(user: &User) -> Self {
        Self::new(user.user_id, user.role)
    }
}
