//! User document

use serde::{Deserialize, Serialize};

use crate::document::{AuditFields, Auditable, Document, SoftDeletable};
use crate::ids::UserId;

/// A registered user as stored in the `users` collection
///
/// Credentials are owned by the identity provider and are not part of this
/// document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: UserId,
    pub username: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Names of the roles granted to this user
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(flatten)]
    pub audit: AuditFields,
}

impl User {
    /// A new, unsaved user with a fresh id and no roles
    pub fn new(username: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: UserId::new(),
            username: username.into(),
            email: email.into(),
            display_name: None,
            roles: Vec::new(),
            audit: AuditFields::new(),
        }
    }

    /// Whether the user holds the role called `name`
    pub fn has_role(&self, name: &str) -> bool {
        self.roles.iter().any(|role| role == name)
    }

    /// Grant a role; returns `false` if it was already held
    pub fn grant(&mut self, name: &str) -> bool {
        if self.has_role(name) {
            return false;
        }
        self.roles.push(name.to_string());
        true
    }

    /// Revoke a role; returns `false` if it was not held
    pub fn revoke(&mut self, name: &str) -> bool {
        let before = self.roles.len();
        self.roles.retain(|role| role != name);
        self.roles.len() != before
    }
}

impl Auditable for User {
    fn audit(&self) -> &AuditFields {
        &self.audit
    }

    fn audit_mut(&mut self) -> &mut AuditFields {
        &mut self.audit
    }
}

impl SoftDeletable for User {}

impl Document for User {
    type Key = UserId;
    const ENTITY: &'static str = "User";

    fn id(&self) -> &UserId {
        &self.id
    }
}

/// Registration input
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDraft {
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grant_and_revoke() {
        let mut user = User::new("ada", "ada@example.com");

        assert!(user.grant("cook"));
        assert!(!user.grant("cook"));
        assert!(user.has_role("cook"));

        assert!(user.revoke("cook"));
        assert!(!user.revoke("cook"));
        assert!(user.roles.is_empty());
    }

    #[test]
    fn test_user_field_names() {
        let mut user = User::new("ada", "ada@example.com");
        user.display_name = Some("Ada".to_string());

        let value = serde_json::to_value(&user).unwrap();
        assert_eq!(value["displayName"], "Ada");
        assert!(value["_id"].as_str().unwrap().starts_with("usr_"));
        assert_eq!(value["roles"], serde_json::json!([]));
    }
}
