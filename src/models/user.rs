use core::fmt;

use serde::{Deserialize, Serialize};
use sqlx::{prelude::Type, FromRow};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "user_role")] // Matches the Postgres enum name
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Customer,
    Admin,
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            UserRole::Customer => "customer",
            UserRole::Admin => "admin",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, FromRow, Serialize, Deserialize, Clone)]
pub struct User {
    pub id: uuid::Uuid,
    pub email: String,
    pub name: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: UserRole,
    pub created_at: time::OffsetDateTime,
}

/// What auth responses and /profile expose. The password hash never leaves
/// the repository layer through this type.
#[derive(Debug, Deserialize, Serialize, Clone, FromRow)]
pub struct PublicUser {
    pub id: uuid::Uuid,
    pub email: String,
    pub name: String,
    pub role: UserRole,
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        PublicUser {
            id: user.id,
            email: user.email.clone(),
            name: user.name.clone(),
            role: user.role,
        }
    }
}
