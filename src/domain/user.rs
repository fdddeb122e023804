//! User identities and remote user records

use super::ids::{RoleId, UserId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Moodle authentication plugin for an account
///
/// Only `manual` accounts are given a generated password on creation; any
/// other plugin (e.g. `oauth2`, `saml2`) must not receive one or Moodle will
/// try to email it to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AuthMethod {
    Manual,
    Other(String),
}

impl AuthMethod {
    pub fn is_manual(&self) -> bool {
        matches!(self, AuthMethod::Manual)
    }

    pub fn as_str(&self) -> &str {
        match self {
            AuthMethod::Manual => "manual",
            AuthMethod::Other(name) => name,
        }
    }
}

impl From<String> for AuthMethod {
    fn from(value: String) -> Self {
        if value == "manual" {
            AuthMethod::Manual
        } else {
            AuthMethod::Other(value)
        }
    }
}

impl From<&str> for AuthMethod {
    fn from(value: &str) -> Self {
        AuthMethod::from(value.to_string())
    }
}

impl From<AuthMethod> for String {
    fn from(value: AuthMethod) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for AuthMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of a person to look up or create remotely
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserIdentity {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub auth: AuthMethod,
}

impl UserIdentity {
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: impl Into<String>,
        auth: impl Into<AuthMethod>,
    ) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            email: email.into(),
            auth: auth.into(),
        }
    }

    /// Email as used for remote lookups and as the username
    pub fn normalized_email(&self) -> String {
        normalize_email(&self.email)
    }
}

/// Lower-cases an email for remote lookups
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// A user record returned by the web service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoodleUser {
    pub id: UserId,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub firstname: Option<String>,
    #[serde(default)]
    pub lastname: Option<String>,
    #[serde(default)]
    pub auth: Option<String>,
}

/// A role definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Role {
    pub id: RoleId,
    #[serde(default)]
    pub shortname: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}
