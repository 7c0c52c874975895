use serde::{Deserialize, Serialize};

pub type UserId = u64;

/// Role carried by every account. Wire codes follow the storefront API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "client")]
    Client,
    #[serde(rename = "employe")]
    Employee,
    #[serde(rename = "admin")]
    Admin,
}

impl Role {
    /// Employees and admins run the fulfillment side of the shop.
    pub fn is_staff(self) -> bool {
        matches!(self, Role::Employee | Role::Admin)
    }
}

/// Represents a registered account in the system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    #[serde(rename = "nom")]
    pub last_name: String,
    #[serde(rename = "prenom")]
    pub first_name: String,
    pub email: String,
    pub role: Role,
    #[serde(rename = "telephone")]
    pub phone: Option<String>,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Payload for creating a new user.
#[derive(Debug, Clone)]
pub struct UserCreate {
    pub last_name: String,
    pub first_name: String,
    pub email: String,
    pub role: Role,
    pub phone: Option<String>,
}

impl UserCreate {
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>, email: impl Into<String>, role: Role) -> Self {
        Self {
            last_name: last_name.into(),
            first_name: first_name.into(),
            email: email.into(),
            role,
            phone: None,
        }
    }
}

/// Identity block embedded in staff-facing order views.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.full_name(),
            email: user.email.clone(),
            role: user.role,
        }
    }
}
