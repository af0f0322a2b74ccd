//! Integration tests for the generic document repository.
//!
//! Runs every operation against in-memory collections: the add/find/delete
//! walkthrough, the soft-delete round trip, guard fail-fast (zero storage calls),
//! the update id-mismatch no-op, batch inserts, paging and storage faults.

mod common;

use common::{CountingCollection, FailingCollection, Note};
use recipes_core::document::{Auditable, SoftDeletable};
use recipes_core::error::{StorageErrorKind, StorageOperation};
use recipes_core::ids::RecipeId;
use recipes_core::models::Recipe;
use recipes_core::repository::{
    DocumentRepository, FilterCondition, MemoryCollection, OrderDirection, Pagination, Repository,
    RepositoryErrorKind, RepositoryOperation,
};

fn recipes() -> DocumentRepository<Recipe, MemoryCollection<Recipe>> {
    DocumentRepository::new(MemoryCollection::new("recipes"))
}

fn notes() -> (DocumentRepository<Note, CountingCollection<Note>>, CountingCollection<Note>) {
    let collection = CountingCollection::new("notes");
    (DocumentRepository::new(collection.clone()), collection)
}

#[tokio::test]
async fn test_add_then_find_then_delete_then_hard_delete() {
    let repo = recipes();

    let added = repo.add(Recipe::new("Ice cream", "Churned")).await.unwrap();
    let ice_cream = added.into_data().unwrap();

    let found = repo.find(&ice_cream.id, false).await.unwrap();
    assert_eq!(found.data().map(|r| r.title.as_str()), Some("Ice cream"));

    let sorbet = repo
        .add(Recipe::new("Sorbet", "Frozen"))
        .await
        .unwrap()
        .into_data()
        .unwrap();

    let mut titles: Vec<String> = repo
        .all(false)
        .fetch()
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.title)
        .collect();
    titles.sort();
    assert_eq!(titles, vec!["Ice cream", "Sorbet"]);

    assert!(repo.delete(&ice_cream.id).await.unwrap().succeeded());
    let live = repo.all(false).fetch().await.unwrap();
    assert_eq!(live.len(), 1);
    assert_eq!(live[0].id, sorbet.id);

    let removed = repo.hard_delete(&sorbet.id).await.unwrap();
    assert_eq!(removed.data().map(|r| r.deleted_count), Some(1));

    // The soft-deleted recipe is still stored
    let everything = repo.all(true).fetch().await.unwrap();
    assert_eq!(everything.len(), 1);
    assert_eq!(everything[0].id, ice_cream.id);

    repo.hard_delete(&ice_cream.id).await.unwrap();
    assert!(repo.all(true).fetch().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_add_stamps_created_on() {
    let repo = recipes();
    let before = chrono::Utc::now();

    let recipe = repo
        .add(Recipe::new("Bread", "Knead"))
        .await
        .unwrap()
        .into_data()
        .unwrap();

    assert!(recipe.created_on() >= before);
    assert!(recipe.modified_on().is_none());
    assert!(!recipe.is_deleted());
}

#[tokio::test]
async fn test_soft_delete_round_trip() {
    let repo = recipes();
    let recipe = repo
        .add(Recipe::new("Pancakes", "Flip"))
        .await
        .unwrap()
        .into_data()
        .unwrap();

    repo.delete(&recipe.id).await.unwrap();

    let hidden = repo.find(&recipe.id, false).await.unwrap();
    let failure = hidden.failure().unwrap();
    assert_eq!(failure.kind, RepositoryErrorKind::NotFound);
    assert_eq!(failure.operation, RepositoryOperation::Find);

    let deleted = repo.find(&recipe.id, true).await.unwrap().into_data().unwrap();
    assert!(deleted.is_deleted());
    assert!(deleted.deleted_on().is_some());

    let restored = repo.undelete(&recipe.id).await.unwrap().into_data().unwrap();
    assert!(!restored.is_deleted());
    assert!(restored.deleted_on().is_none());

    let visible = repo.find(&recipe.id, false).await.unwrap().into_data().unwrap();
    assert!(!visible.is_deleted());
    assert!(visible.deleted_on().is_none());
}

#[tokio::test]
async fn test_delete_is_a_partial_update() {
    let repo = recipes();
    let mut recipe = Recipe::new("Soup", "Simmer");
    recipe.ingredients = vec!["water".to_string(), "salt".to_string()];
    let recipe = repo.add(recipe).await.unwrap().into_data().unwrap();

    let updated = repo.delete(&recipe.id).await.unwrap().into_data().unwrap();
    assert_eq!(updated.matched_count, 1);
    assert_eq!(updated.modified_count, 1);

    let deleted = repo.find(&recipe.id, true).await.unwrap().into_data().unwrap();
    assert_eq!(deleted.ingredients, recipe.ingredients);
    assert_eq!(deleted.created_on(), recipe.created_on());
}

#[tokio::test]
async fn test_update_replaces_and_stamps_modified_on() {
    let repo = recipes();
    let mut recipe = repo
        .add(Recipe::new("Salad", "Toss"))
        .await
        .unwrap()
        .into_data()
        .unwrap();

    recipe.title = "Green salad".to_string();
    let replaced = repo.update(&recipe.id.clone(), recipe.clone()).await.unwrap();
    assert_eq!(replaced.data().map(|r| r.matched_count), Some(1));

    let stored = repo.find(&recipe.id, false).await.unwrap().into_data().unwrap();
    assert_eq!(stored.title, "Green salad");
    assert!(stored.modified_on().is_some());
}

#[tokio::test]
async fn test_update_with_mismatched_id_is_a_no_op() {
    let repo = recipes();
    let original = repo
        .add(Recipe::new("Curry", "Spice"))
        .await
        .unwrap()
        .into_data()
        .unwrap();

    let mut changed = original.clone();
    changed.title = "Changed".to_string();
    let other_id = RecipeId::new();

    let result = repo.update(&other_id, changed).await.unwrap();
    let effect = result.into_data().unwrap();
    assert_eq!(effect.matched_count, 0);
    assert_eq!(effect.modified_count, 0);

    let stored = repo.find(&original.id, false).await.unwrap().into_data().unwrap();
    assert_eq!(stored, original);
}

#[tokio::test]
async fn test_update_of_unknown_document_matches_nothing() {
    let repo = recipes();
    let ghost = Recipe::new("Ghost", "Never stored");

    let result = repo.update(&ghost.id.clone(), ghost).await.unwrap();
    assert_eq!(result.data().map(|r| r.matched_count), Some(0));
}

#[tokio::test]
async fn test_undelete_unknown_document_is_not_found() {
    let repo = recipes();
    let outcome = repo.undelete(&RecipeId::new()).await.unwrap();

    let failure = outcome.failure().unwrap();
    assert!(failure.is_not_found());
    assert_eq!(failure.operation, RepositoryOperation::Undelete);
    assert_eq!(failure.entity_type.as_deref(), Some("Recipe"));
}

#[tokio::test]
async fn test_hard_delete_of_unknown_document_removes_nothing() {
    let repo = recipes();
    let removed = repo.hard_delete(&RecipeId::new()).await.unwrap();
    assert_eq!(removed.data().map(|r| r.deleted_count), Some(0));
}

#[tokio::test]
async fn test_guards_fail_before_any_storage_call() {
    let (repo, collection) = notes();
    let blank = String::new();

    let added = repo.add(Note::new("", "no id")).await.unwrap();
    assert_eq!(added.failure().map(|f| f.kind), Some(RepositoryErrorKind::MissingArgument));

    let updated = repo.update(&blank, Note::new("", "no id")).await.unwrap();
    assert_eq!(updated.failure().map(|f| f.operation), Some(RepositoryOperation::Update));

    let found = repo.find(&blank, true).await.unwrap();
    assert!(found.failed());

    let deleted = repo.delete(&"   ".to_string()).await.unwrap();
    assert_eq!(deleted.failure().map(|f| f.kind), Some(RepositoryErrorKind::MissingArgument));

    assert!(repo.undelete(&blank).await.unwrap().failed());
    assert!(repo.hard_delete(&blank).await.unwrap().failed());

    let batch = repo
        .add_range(vec![Note::new("n1", "ok"), Note::new("", "bad")])
        .await
        .unwrap();
    assert!(batch.failed());

    assert_eq!(collection.calls(), 0);
}

#[tokio::test]
async fn test_update_with_blank_document_id_is_guarded() {
    let (repo, collection) = notes();

    let outcome = repo.update(&"n1".to_string(), Note::new("", "x")).await.unwrap();
    assert_eq!(outcome.failure().map(|f| f.kind), Some(RepositoryErrorKind::MissingArgument));
    assert_eq!(collection.calls(), 0);
}

#[tokio::test]
async fn test_add_range_empty_batch_is_missing_argument() {
    let (repo, collection) = notes();

    let outcome = repo.add_range(Vec::new()).await.unwrap();
    let failure = outcome.failure().unwrap();
    assert_eq!(failure.kind, RepositoryErrorKind::MissingArgument);
    assert_eq!(failure.operation, RepositoryOperation::AddRange);
    assert_eq!(collection.calls(), 0);
}

#[tokio::test]
async fn test_add_range_inserts_every_document_in_one_call() {
    let (repo, collection) = notes();

    let outcome = repo
        .add_range(vec![
            Note::new("n1", "first"),
            Note::new("n2", "second"),
            Note::new("n3", "third"),
        ])
        .await
        .unwrap();
    assert!(outcome.succeeded());
    assert_eq!(collection.calls(), 1);

    let stored = repo.all(false).fetch().await.unwrap();
    assert_eq!(stored.len(), 3);
    let stamp = stored[0].created_on();
    assert!(stored.iter().all(|note| note.created_on() == stamp));
}

#[tokio::test]
async fn test_duplicate_id_is_a_storage_fault() {
    let (repo, _) = notes();
    repo.add(Note::new("n1", "first")).await.unwrap();

    let fault = repo.add(Note::new("n1", "again")).await.unwrap_err();
    assert_eq!(fault.kind, StorageErrorKind::DuplicateKey);
    assert_eq!(fault.operation, StorageOperation::Insert);

    // A batch containing a duplicate writes nothing
    let fault = repo
        .add_range(vec![Note::new("n2", "new"), Note::new("n1", "dup")])
        .await
        .unwrap_err();
    assert_eq!(fault.kind, StorageErrorKind::DuplicateKey);
    assert_eq!(repo.all(true).count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_storage_faults_propagate_through_the_outer_result() {
    let repo: DocumentRepository<Note, FailingCollection> = DocumentRepository::new(FailingCollection);

    let fault = repo.find(&"n1".to_string(), false).await.unwrap_err();
    assert_eq!(fault.kind, StorageErrorKind::ConnectionFailed);
    assert!(fault.is_retriable());

    assert!(repo.add(Note::new("n1", "x")).await.is_err());
    assert!(repo.delete(&"n1".to_string()).await.is_err());
    assert!(repo.all(false).fetch().await.is_err());

    // Guards still answer without touching storage
    assert!(repo.add(Note::new("", "x")).await.unwrap().failed());
}

#[tokio::test]
async fn test_all_is_lazy_and_refinable() {
    let (repo, collection) = notes();
    repo.add_range(
        (1..=5)
            .map(|n| Note::new(&format!("n{}", n), &format!("note {}", n)))
            .collect(),
    )
    .await
    .unwrap();
    let after_insert = collection.calls();

    let query = repo
        .all(false)
        .filter(FilterCondition::ne("_id", "n3"))
        .order_by("_id", OrderDirection::Descending)
        .paginate(Pagination::page(1, 2));
    assert_eq!(collection.calls(), after_insert);

    let page: Vec<String> = query.fetch().await.unwrap().into_iter().map(|n| n.id).collect();
    assert_eq!(page, vec!["n5", "n4"]);
    assert_eq!(query.count().await.unwrap(), 4);

    let second: Vec<String> = repo
        .all(false)
        .filter(FilterCondition::ne("_id", "n3"))
        .order_by("_id", OrderDirection::Descending)
        .paginate(Pagination::page(2, 2))
        .fetch()
        .await
        .unwrap()
        .into_iter()
        .map(|n| n.id)
        .collect();
    assert_eq!(second, vec!["n2", "n1"]);
}

#[tokio::test]
async fn test_all_with_deleted_includes_soft_deleted() {
    let (repo, _) = notes();
    repo.add(Note::new("n1", "kept")).await.unwrap();
    repo.add(Note::new("n2", "gone")).await.unwrap();
    repo.delete(&"n2".to_string()).await.unwrap();

    assert_eq!(repo.all(false).count().await.unwrap(), 1);
    assert_eq!(repo.all(true).count().await.unwrap(), 2);

    let deleted = repo
        .all(true)
        .filter(FilterCondition::eq("isDeleted", true))
        .fetch()
        .await
        .unwrap();
    assert_eq!(deleted.len(), 1);
    assert_eq!(deleted[0].id, "n2");
}

#[tokio::test]
async fn test_concurrent_adds_share_one_collection() {
    let repo = recipes();

    let handles: Vec<_> = (0..8)
        .map(|n| {
            let repo = repo.clone();
            tokio::spawn(async move { repo.add(Recipe::new(format!("Recipe {}", n), "")).await })
        })
        .collect();
    for handle in handles {
        assert!(handle.await.unwrap().unwrap().succeeded());
    }

    assert_eq!(repo.all(false).count().await.unwrap(), 8);
}
