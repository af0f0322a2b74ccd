//! Recipe document

use serde::{Deserialize, Serialize};

use crate::document::{AuditFields, Auditable, Document, SoftDeletable};
use crate::ids::{RecipeId, UserId};

/// A recipe as stored in the `recipes` collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    /// Primary key
    #[serde(rename = "_id")]
    pub id: RecipeId,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub instructions: Vec<String>,
    /// Reference to the stored image, if one was uploaded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_id: Option<UserId>,
    #[serde(flatten)]
    pub audit: AuditFields,
}

impl Recipe {
    /// A new, unsaved recipe with a fresh id
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: RecipeId::new(),
            title: title.into(),
            description: description.into(),
            ingredients: Vec::new(),
            instructions: Vec::new(),
            image: None,
            author_id: None,
            audit: AuditFields::new(),
        }
    }

    /// A new recipe built from client input
    pub fn from_draft(draft: RecipeDraft) -> Self {
        let mut recipe = Self::new(String::new(), String::new());
        recipe.apply(draft);
        recipe
    }

    /// Overwrite the editable fields with `draft`
    pub fn apply(&mut self, draft: RecipeDraft) {
        self.title = draft.title;
        self.description = draft.description;
        self.ingredients = draft.ingredients;
        self.instructions = draft.instructions;
        self.image = draft.image;
        self.author_id = draft.author_id;
    }
}

impl Auditable for Recipe {
    fn audit(&self) -> &AuditFields {
        &self.audit
    }

    fn audit_mut(&mut self) -> &mut AuditFields {
        &mut self.audit
    }
}

impl SoftDeletable for Recipe {}

impl Document for Recipe {
    type Key = RecipeId;
    const ENTITY: &'static str = "Recipe";

    fn id(&self) -> &RecipeId {
        &self.id
    }
}

/// Client-supplied recipe fields for create and update
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeDraft {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub instructions: Vec<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub author_id: Option<UserId>,
}

impl RecipeDraft {
    /// A draft with just a title
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::fields;

    #[test]
    fn test_recipe_persisted_shape() {
        let mut recipe = Recipe::new("Ice cream", "Churned");
        recipe.ingredients = vec!["cream".to_string(), "sugar".to_string()];

        let value = serde_json::to_value(&recipe).unwrap();
        assert_eq!(value[fields::ID], recipe.id.as_str());
        assert_eq!(value["title"], "Ice cream");
        assert_eq!(value["ingredients"][1], "sugar");
        assert_eq!(value[fields::IS_DELETED], false);
        assert!(value.get("image").is_none());
        assert!(value.get("authorId").is_none());
    }

    #[test]
    fn test_recipe_round_trips_through_json() {
        let recipe = Recipe::new("Bread", "Knead and bake");
        let back: Recipe = serde_json::from_value(serde_json::to_value(&recipe).unwrap()).unwrap();
        assert_eq!(back, recipe);
    }

    #[test]
    fn test_apply_draft_keeps_identity_and_audit() {
        let mut recipe = Recipe::new("Old", "old");
        let id = recipe.id.clone();
        let created_on = recipe.created_on();

        recipe.apply(RecipeDraft {
            title: "New".to_string(),
            image: Some("images/new.png".to_string()),
            ..RecipeDraft::default()
        });

        assert_eq!(recipe.id, id);
        assert_eq!(recipe.created_on(), created_on);
        assert_eq!(recipe.title, "New");
        assert_eq!(recipe.image.as_deref(), Some("images/new.png"));
    }
}
