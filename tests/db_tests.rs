//! Database integration tests
//!
//! These tests verify the Store functionality using in-memory SQLite.

use taskvault::db::Store;
use taskvault::types::{AppError, TaskStatus};

async fn test_store() -> Store {
    Store::new(":memory:", None)
        .await
        .expect("in-memory store should open")
}

#[tokio::test]
async fn create_and_fetch_user() {
    let store = test_store().await;

    let user = store
        .create_user("Ana", "ana@example.com", "$argon2id$fakehash")
        .await
        .expect("should create user");

    let by_email = store
        .get_user_by_email("ana@example.com")
        .await
        .expect("query should succeed")
        .expect("user should exist");
    assert_eq!(by_email.id, user.id);
    assert_eq!(by_email.name, "Ana");

    let by_id = store
        .get_user_by_id(&user.id)
        .await
        .expect("query should succeed")
        .expect("user should exist");
    assert_eq!(by_id.email, "ana@example.com");
}

#[tokio::test]
async fn email_lookup_is_case_insensitive() {
    let store = test_store().await;
    store
        .create_user("Ana", "ana@example.com", "hash")
        .await
        .unwrap();

    let found = store.get_user_by_email("ANA@Example.COM").await.unwrap();
    assert!(found.is_some(), "lookup should normalize the email");
}

#[tokio::test]
async fn duplicate_email_is_a_conflict() {
    let store = test_store().await;
    store
        .create_user("Ana", "ana@example.com", "hash")
        .await
        .unwrap();

    let err = store
        .create_user("Other Ana", "ana@example.com", "hash2")
        .await
        .unwrap_err();

    assert!(
        matches!(err, AppError::Conflict(_)),
        "unique violation should translate to Conflict, got {err:?}"
    );
}

#[tokio::test]
async fn unknown_user_is_none() {
    let store = test_store().await;

    assert!(store
        .get_user_by_email("ghost@example.com")
        .await
        .unwrap()
        .is_none());
    assert!(store.get_user_by_id("no-such-id").await.unwrap().is_none());
}

#[tokio::test]
async fn task_queries_are_owner_scoped() {
    let store = test_store().await;
    let ana = store.create_user("Ana", "a@x.com", "h").await.unwrap();
    let bob = store.create_user("Bob", "b@x.com", "h").await.unwrap();

    let task = store
        .create_task(&ana.id, "Buy milk", "", TaskStatus::Todo)
        .await
        .unwrap();

    // The owner sees the task.
    assert!(store.get_task(&task.id, &ana.id).await.unwrap().is_some());

    // Another identity cannot read, update, or delete it.
    assert!(store.get_task(&task.id, &bob.id).await.unwrap().is_none());
    assert!(store
        .update_task(&task.id, &bob.id, Some("Stolen"), None, None)
        .await
        .unwrap()
        .is_none());
    assert!(!store.delete_task(&task.id, &bob.id).await.unwrap());

    // The failed foreign update left the task untouched.
    let unchanged = store.get_task(&task.id, &ana.id).await.unwrap().unwrap();
    assert_eq!(unchanged.title, "Buy milk");
}

#[tokio::test]
async fn partial_update_only_touches_given_fields() {
    let store = test_store().await;
    let ana = store.create_user("Ana", "a@x.com", "h").await.unwrap();
    let task = store
        .create_task(&ana.id, "Buy milk", "2 liters", TaskStatus::Todo)
        .await
        .unwrap();

    let updated = store
        .update_task(&task.id, &ana.id, None, None, Some(TaskStatus::Done))
        .await
        .unwrap()
        .expect("task should update");

    assert_eq!(updated.status, TaskStatus::Done);
    assert_eq!(updated.title, "Buy milk");
    assert_eq!(updated.description, "2 liters");
}

#[tokio::test]
async fn list_filters_by_status_and_search() {
    let store = test_store().await;
    let ana = store.create_user("Ana", "a@x.com", "h").await.unwrap();

    store
        .create_task(&ana.id, "Buy milk", "", TaskStatus::Todo)
        .await
        .unwrap();
    store
        .create_task(&ana.id, "Buy bread", "", TaskStatus::Done)
        .await
        .unwrap();
    store
        .create_task(&ana.id, "Walk the dog", "", TaskStatus::Todo)
        .await
        .unwrap();

    let todos = store
        .list_tasks(&ana.id, Some(TaskStatus::Todo), None, 50, 0)
        .await
        .unwrap();
    assert_eq!(todos.len(), 2);

    // Case-insensitive substring search on the title.
    let buys = store
        .list_tasks(&ana.id, None, Some("bUy"), 50, 0)
        .await
        .unwrap();
    assert_eq!(buys.len(), 2);

    let count = store
        .count_tasks(&ana.id, Some(TaskStatus::Todo), Some("milk"))
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn search_escapes_like_wildcards() {
    let store = test_store().await;
    let ana = store.create_user("Ana", "a@x.com", "h").await.unwrap();

    store
        .create_task(&ana.id, "100% done", "", TaskStatus::Done)
        .await
        .unwrap();
    store
        .create_task(&ana.id, "100 percent", "", TaskStatus::Done)
        .await
        .unwrap();

    let hits = store
        .list_tasks(&ana.id, None, Some("100%"), 50, 0)
        .await
        .unwrap();
    assert_eq!(hits.len(), 1, "% must match literally, not as a wildcard");
}

#[tokio::test]
async fn pagination_skips_and_limits() {
    let store = test_store().await;
    let ana = store.create_user("Ana", "a@x.com", "h").await.unwrap();

    for i in 0..15 {
        store
            .create_task(&ana.id, &format!("Task {i}"), "", TaskStatus::Todo)
            .await
            .unwrap();
    }

    let page1 = store.list_tasks(&ana.id, None, None, 10, 0).await.unwrap();
    let page2 = store.list_tasks(&ana.id, None, None, 10, 10).await.unwrap();

    assert_eq!(page1.len(), 10);
    assert_eq!(page2.len(), 5);
    assert_eq!(store.count_tasks(&ana.id, None, None).await.unwrap(), 15);
}
