use std::collections::BTreeSet;

use auth::Principal;
use serde::Serialize;

/// Authenticated principal.
///
/// `username` is the sole identity key: two identities with the same username
/// are the same entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub username: String,
    pub roles: BTreeSet<String>,
    pub active: bool,
}

impl Identity {
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.contains(role)
    }
}

impl Principal for Identity {
    fn name(&self) -> &str {
        &self.username
    }
}

/// Directory entry as persisted.
///
/// `password` always holds an encoded hash. `email` is a secondary lookup key
/// that the store does not guarantee to be unique.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialRecord {
    pub username: String,
    pub password: String,
    pub email: String,
    pub active: bool,
    pub roles: BTreeSet<String>,
}

impl CredentialRecord {
    /// Identity this record authenticates as.
    pub fn identity(&self) -> Identity {
        Identity {
            username: self.username.clone(),
            roles: self.roles.clone(),
            active: self.active,
        }
    }
}

/// Criterion for the username/email existence check.
///
/// Username takes precedence when both are supplied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExistenceQuery {
    Username(String),
    Email(String),
}

impl ExistenceQuery {
    /// Pick the criterion from optional request parameters.
    ///
    /// # Returns
    /// None when neither parameter was supplied
    pub fn from_params(username: Option<String>, email: Option<String>) -> Option<Self> {
        username
            .map(ExistenceQuery::Username)
            .or_else(|| email.map(ExistenceQuery::Email))
    }
}

/// Public view of the caller's session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionView {
    pub username: String,
    pub roles: BTreeSet<String>,
}

impl From<&Identity> for SessionView {
    fn from(identity: &Identity) -> Self {
        Self {
            username: identity.username.clone(),
            roles: identity.roles.clone(),
        }
    }
}
