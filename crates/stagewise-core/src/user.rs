use crate::error::{Result, StagewiseError};
use crate::types::Role;
use serde::{Deserialize, Serialize};

/// A stored account. Passwords are kept as given so the data file stays
/// readable by existing deployments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub name: String,
}

impl User {
    pub fn public(&self) -> PublicUser {
        PublicUser {
            id: self.id,
            username: self.username.clone(),
            role: self.role,
            name: self.name.clone(),
        }
    }

    pub fn matches(&self, username: &str, password: &str) -> bool {
        self.username == username && self.password == password
    }
}

/// A user as returned to clients: never carries the password.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicUser {
    pub id: u64,
    pub username: String,
    pub role: Role,
    pub name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub name: Option<String>,
}

/// Partial user update. Empty strings count as absent, so a blank password
/// leaves the current one in place.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserPatch {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub name: Option<String>,
}

impl UserPatch {
    pub fn apply(&self, user: &mut User) {
        if let Some(username) = non_blank(&self.username) {
            user.username = username.to_string();
        }
        if let Some(password) = non_blank(&self.password) {
            user.password = password.to_string();
        }
        if let Some(role) = self.role {
            user.role = role;
        }
        if let Some(name) = non_blank(&self.name) {
            user.name = name.to_string();
        }
    }

    pub fn new_username(&self) -> Option<&str> {
        non_blank(&self.username)
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.trim().is_empty())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

pub fn validate_new_user(user: &NewUser) -> Result<()> {
    if user.username.trim().is_empty() {
        return Err(StagewiseError::validation("username is required"));
    }
    if user.password.is_empty() {
        return Err(StagewiseError::validation("password is required"));
    }
    Ok(())
}

/// Accounts written to a data file that has none.
pub fn default_users() -> Vec<User> {
    vec![
        User {
            id: 1,
            username: "admin".to_string(),
            password: "admin123".to_string(),
            role: Role::Admin,
            name: "Administrator".to_string(),
        },
        User {
            id: 2,
            username: "viewer".to_string(),
            password: "viewer123".to_string(),
            role: Role::Viewer,
            name: "View User".to_string(),
        },
    ]
}
