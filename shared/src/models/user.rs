//! User roles and login input

use std::fmt;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::validation::{required, InputError};

/// Access role carried in the session token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Staff,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Staff => "staff",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "admin" => Some(Role::Admin),
            "staff" => Some(Role::Staff),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body of `POST /auth/login`
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginInput {
    #[validate(required(message = "Username and password required"))]
    pub username: Option<String>,
    #[validate(required(message = "Username and password required"))]
    pub password: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl LoginInput {
    pub fn parse(self) -> Result<Credentials, InputError> {
        self.validate()?;
        Ok(Credentials {
            username: required(self.username, "username")?,
            password: required(self.password, "password")?,
        })
    }
}
