//! Integration tests for the SQLite post store
//!
//! These exercise the store through its public API against a real database
//! file in a temp directory.

use chatboard::board::{BoardStore, PostForm, TIMESTAMP_FORMAT};
use chatboard::error::{error_kind, ChatboardError};
use chrono::NaiveDateTime;

mod common;

#[test]
fn test_create_update_delete_scenario() {
    let (store, _tmp) = common::create_temp_store();

    let created = store
        .create_post(&PostForm::new("Hello", "World", "Sam"))
        .unwrap();
    let posts = store.list_posts().unwrap();
    assert_eq!(posts.len(), 1);
    assert_eq!(
        posts[0].label(),
        format!("Hello - Sam ({})", created.created_at)
    );

    store
        .update_post(created.id, &PostForm::new("Hello2", "World", "Sam"))
        .unwrap();
    let posts = store.list_posts().unwrap();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].id, created.id);
    assert_eq!(posts[0].created_at, created.created_at);
    assert_eq!(
        posts[0].label(),
        format!("Hello2 - Sam ({})", created.created_at)
    );

    assert!(store.delete_post(created.id).unwrap());
    assert!(store.list_posts().unwrap().is_empty());
}

#[test]
fn test_timestamp_uses_second_precision_format() {
    let (store, _tmp) = common::create_temp_store();
    let post = store.create_post(&PostForm::new("t", "c", "a")).unwrap();
    assert!(NaiveDateTime::parse_from_str(&post.created_at, TIMESTAMP_FORMAT).is_ok());
    assert_eq!(post.created_at.len(), "2024-01-01 00:00:00".len());
}

#[test]
fn test_list_reflects_net_effect_of_operations() {
    let (store, _tmp) = common::create_temp_store();

    let a = store.create_post(&PostForm::new("a", "1", "x")).unwrap();
    let b = store.create_post(&PostForm::new("b", "2", "y")).unwrap();
    let c = store.create_post(&PostForm::new("c", "3", "z")).unwrap();

    store
        .update_post(a.id, &PostForm::new("a2", "1b", "x2"))
        .unwrap();
    store.delete_post(b.id).unwrap();

    let posts = store.list_posts().unwrap();
    let ids: Vec<i64> = posts.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![c.id, a.id]);

    let updated = posts.iter().find(|p| p.id == a.id).unwrap();
    assert_eq!(updated.title, "a2");
    assert_eq!(updated.content, "1b");
    assert_eq!(updated.author, "x2");
    assert_eq!(updated.created_at, a.created_at);

    // Strictly newest first
    for pair in posts.windows(2) {
        assert!(
            (pair[0].created_at.as_str(), pair[0].id) > (pair[1].created_at.as_str(), pair[1].id)
        );
    }
}

#[test]
fn test_empty_field_leaves_count_unchanged() {
    let (store, _tmp) = common::create_temp_store();
    store.create_post(&PostForm::new("t", "c", "a")).unwrap();

    for form in [
        PostForm::new("", "c", "a"),
        PostForm::new("t", "", "a"),
        PostForm::new("t", "c", ""),
        PostForm::new("  ", "c", "a"),
    ] {
        let err = store.create_post(&form).unwrap_err();
        assert!(matches!(
            error_kind(&err),
            Some(ChatboardError::Validation(_))
        ));
        assert_eq!(store.count_posts().unwrap(), 1);
    }
}

#[test]
fn test_duplicate_labels_stay_distinct_by_id() {
    let (store, _tmp) = common::create_temp_store();
    let first = store.create_post(&PostForm::new("same", "one", "Sam")).unwrap();
    let second = store.create_post(&PostForm::new("same", "two", "Sam")).unwrap();

    store.delete_post(second.id).unwrap();

    let remaining = store.list_posts().unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, first.id);
    assert_eq!(remaining[0].content, "one");
}

#[test]
fn test_posts_survive_reopen() {
    let tmp = tempfile::TempDir::new().unwrap();
    let path = tmp.path().join("nested").join("board.db");

    let id = {
        let store = BoardStore::new_with_path(&path).unwrap();
        store.create_post(&PostForm::new("kept", "body", "me")).unwrap().id
    };

    let store = BoardStore::new_with_path(&path).unwrap();
    let post = store.get_post(id).unwrap().unwrap();
    assert_eq!(post.title, "kept");
}

#[test]
fn test_concurrent_writers_share_one_store() {
    let (store, _tmp) = common::create_shared_store();

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let store = store.clone();
            std::thread::spawn(move || {
                store
                    .create_post(&PostForm::new(format!("t{}", i), "c", "a"))
                    .unwrap();
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    assert_eq!(store.count_posts().unwrap(), 8);
}
