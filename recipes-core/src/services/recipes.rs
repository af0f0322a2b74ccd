//! Recipe CRUD on top of the generic repository

use futures::future::try_join;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::problem::{settle, ProblemDetails};
use super::{parse_id, require};
use crate::document::fields;
use crate::ids::{RecipeId, RecipeKind};
use crate::models::{Recipe, RecipeDraft};
use crate::outcome::{DataOutcome, Outcome};
use crate::repository::{FilterCondition, OrderDirection, Pagination, Repository};

/// Paging and search parameters for [`RecipeService::list`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RecipeListQuery {
    /// 1-indexed page number
    pub page: u64,
    /// Recipes per page; must be greater than zero
    pub page_size: u64,
    /// Case-insensitive substring of the title, matched literally
    pub title: Option<String>,
    /// Also list soft-deleted recipes
    pub include_deleted: bool,
}

impl Default for RecipeListQuery {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: 20,
            title: None,
            include_deleted: false,
        }
    }
}

/// One page of recipes plus the total number of matches
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipePage {
    /// Recipes on this page, newest first
    pub items: Vec<Recipe>,
    /// Matches across all pages
    pub total: u64,
    /// 1-indexed page number that was served
    pub page: u64,
    /// Requested page size
    pub page_size: u64,
}

/// Recipe use cases
///
/// # Example
///
/// ```rust,ignore
/// use recipes_core::models::RecipeDraft;
/// use recipes_core::repository::{DocumentRepository, MemoryCollection};
/// use recipes_core::services::RecipeService;
///
/// let service = RecipeService::new(DocumentRepository::new(MemoryCollection::new("recipes")));
/// let created = service.create(RecipeDraft::titled("Ice cream")).await;
/// let id = created.data().map(|r| r.id.to_string()).unwrap_or_default();
/// assert!(service.get(&id).await.succeeded());
/// ```
#[derive(Debug, Clone)]
pub struct RecipeService<R> {
    recipes: R,
}

impl<R: Repository<Recipe>> RecipeService<R> {
    pub fn new(recipes: R) -> Self {
        Self { recipes }
    }

    /// The underlying repository
    pub fn repository(&self) -> &R {
        &self.recipes
    }

    /// Store a new recipe
    pub async fn create(&self, draft: RecipeDraft) -> DataOutcome<Recipe, ProblemDetails> {
        if let Some(problem) = require(&draft.title, "title") {
            return DataOutcome::fail(problem);
        }

        let created = settle(self.recipes.add(Recipe::from_draft(draft)).await);
        if let Some(recipe) = created.data() {
            info!(recipe_id = %recipe.id, title = %recipe.title, "Recipe created");
        }
        created
    }

    /// A live recipe by id
    pub async fn get(&self, id: &str) -> DataOutcome<Recipe, ProblemDetails> {
        parse_id::<RecipeKind>(id)
            .bind_async(|id| self.find_live(id))
            .await
    }

    /// A page of recipes, newest first
    pub async fn list(&self, query: RecipeListQuery) -> DataOutcome<RecipePage, ProblemDetails> {
        if query.page_size == 0 {
            return DataOutcome::fail(ProblemDetails::bad_request(
                "pageSize must be greater than zero",
            ));
        }

        let mut recipes = self.recipes.all(query.include_deleted);
        if let Some(term) = query.title.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            recipes = recipes.filter(FilterCondition::contains("title", term));
        }
        let recipes = recipes
            .order_by(fields::CREATED_ON, OrderDirection::Descending)
            .paginate(Pagination::page(query.page, query.page_size));

        let fetched = try_join(recipes.fetch(), recipes.count()).await;
        settle(fetched.map(|(items, total)| {
            DataOutcome::ok(RecipePage {
                items,
                total,
                page: query.page.max(1),
                page_size: query.page_size,
            })
        }))
    }

    /// Replace the editable fields of a live recipe
    pub async fn update(&self, id: &str, draft: RecipeDraft) -> DataOutcome<Recipe, ProblemDetails> {
        if let Some(problem) = require(&draft.title, "title") {
            return DataOutcome::fail(problem);
        }

        parse_id::<RecipeKind>(id)
            .bind_async(|id| self.find_live(id))
            .await
            .bind_async(|mut recipe| async move {
                recipe.apply(draft);
                let id = recipe.id.clone();
                settle(self.recipes.update(&id, recipe).await)
                    .bind_async(|_| self.find_live(id))
                    .await
            })
            .await
    }

    /// Soft delete a live recipe
    pub async fn delete(&self, id: &str) -> Outcome<ProblemDetails> {
        parse_id::<RecipeKind>(id)
            .bind_async(|id| self.find_live(id))
            .await
            .bind_async(|recipe| async move { settle(self.recipes.delete(&recipe.id).await) })
            .await
            .without_data()
    }

    /// Bring back a soft-deleted recipe
    pub async fn restore(&self, id: &str) -> DataOutcome<Recipe, ProblemDetails> {
        parse_id::<RecipeKind>(id)
            .bind_async(|id| async move { settle(self.recipes.undelete(&id).await) })
            .await
    }

    /// Permanently remove a recipe, live or deleted
    pub async fn purge(&self, id: &str) -> Outcome<ProblemDetails> {
        parse_id::<RecipeKind>(id)
            .bind_async(|id| async move {
                settle(self.recipes.hard_delete(&id).await).bind(|removed| {
                    if removed.deleted_count == 0 {
                        DataOutcome::fail(ProblemDetails::not_found(format!(
                            "Recipe '{}' was not found",
                            id
                        )))
                    } else {
                        DataOutcome::ok(())
                    }
                })
            })
            .await
            .without_data()
    }

    async fn find_live(&self, id: RecipeId) -> DataOutcome<Recipe, ProblemDetails> {
        settle(self.recipes.find(&id, false).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_query_defaults() {
        let query: RecipeListQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(query, RecipeListQuery::default());
        assert_eq!(query.page, 1);
        assert_eq!(query.page_size, 20);
    }

    #[test]
    fn test_list_query_field_names() {
        let query: RecipeListQuery =
            serde_json::from_str(r#"{"pageSize": 5, "includeDeleted": true}"#).unwrap();
        assert_eq!(query.page_size, 5);
        assert!(query.include_deleted);
    }
}
