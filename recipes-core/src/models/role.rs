//! Role document

use serde::{Deserialize, Serialize};

use crate::document::{AuditFields, Auditable, Document, SoftDeletable};
use crate::ids::RoleId;

/// A named role as stored in the `roles` collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    #[serde(rename = "_id")]
    pub id: RoleId,
    /// Unique role name, e.g. `admin`
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(flatten)]
    pub audit: AuditFields,
}

impl Role {
    /// A new, unsaved role with a fresh id
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: RoleId::new(),
            name: name.into(),
            description: None,
            audit: AuditFields::new(),
        }
    }
}

impl Auditable for Role {
    fn audit(&self) -> &AuditFields {
        &self.audit
    }

    fn audit_mut(&mut self) -> &mut AuditFields {
        &mut self.audit
    }
}

impl SoftDeletable for Role {}

impl Document for Role {
    type Key = RoleId;
    const ENTITY: &'static str = "Role";

    fn id(&self) -> &RoleId {
        &self.id
    }
}
