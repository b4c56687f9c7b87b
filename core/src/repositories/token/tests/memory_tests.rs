//! Unit tests for the in-memory token store

use chrono::{Duration, Utc};
use std::sync::Arc;
use std::time::Duration as StdDuration;

use crate::domain::entities::token::{NewTokenRecord, TokenInfo, TokenKind};
use crate::domain::value_objects::Lookup;
use crate::repositories::token::{MemoryTokenStore, TokenStore};

fn code_grant(code: &str) -> TokenInfo {
    TokenInfo::new("client", "user")
        .with_scope("read")
        .with_code(code, Utc::now(), StdDuration::from_secs(600))
}

fn access_grant(access: &str, refresh: &str) -> TokenInfo {
    TokenInfo::new("client", "user")
        .with_access(access, Utc::now(), StdDuration::from_secs(3600))
        .with_refresh(refresh, Utc::now(), StdDuration::from_secs(86400))
}

#[tokio::test]
async fn test_create_then_get_by_code() {
    let store = MemoryTokenStore::new();
    let info = code_grant("C1");

    store.create(&info).await.unwrap();

    let found = store.get_by_code("C1").await.unwrap();
    assert_eq!(found, Lookup::Found(info));
}

#[tokio::test]
async fn test_get_unknown_key_is_not_found() {
    let store = MemoryTokenStore::new();
    store.create(&code_grant("C1")).await.unwrap();

    assert!(store.get_by_code("C2").await.unwrap().is_not_found());
    assert!(store.get_by_access("C1").await.unwrap().is_not_found());
}

#[tokio::test]
async fn test_empty_key_is_skipped() {
    let store = MemoryTokenStore::new();
    // Records with empty access/refresh keys must not match an empty lookup
    store.create(&code_grant("C1")).await.unwrap();

    assert!(store.get_by_code("").await.unwrap().is_skipped());
    assert!(store.get_by_access("").await.unwrap().is_skipped());
    assert!(store.get_by_refresh("").await.unwrap().is_skipped());
}

#[tokio::test]
async fn test_empty_key_skips_storage_even_when_closed() {
    let store = MemoryTokenStore::new();
    store.close().await;

    assert!(store.get_by_access("").await.unwrap().is_skipped());
    assert!(store.remove_by_access("").await.is_ok());
    assert!(store.get_by_access("A1").await.unwrap_err().is_storage());
}

#[tokio::test]
async fn test_duplicate_access_token_conflicts() {
    let store = MemoryTokenStore::new();
    store.create(&access_grant("A1", "R1")).await.unwrap();

    let err = store.create(&access_grant("A1", "R2")).await.unwrap_err();
    assert!(err.is_conflict());
    assert_eq!(err, crate::errors::StoreError::conflict("access"));

    // The rejected create left nothing behind
    assert!(store.get_by_refresh("R2").await.unwrap().is_not_found());
    assert_eq!(store.len().await, 1);
}

#[tokio::test]
async fn test_duplicate_refresh_token_conflicts() {
    let store = MemoryTokenStore::new();
    store.create(&access_grant("A1", "R1")).await.unwrap();

    let err = store.create(&access_grant("A2", "R1")).await.unwrap_err();
    assert_eq!(err, crate::errors::StoreError::conflict("refresh"));
}

#[tokio::test]
async fn test_records_without_refresh_do_not_collide() {
    let store = MemoryTokenStore::new();
    store.create(&code_grant("C1")).await.unwrap();
    store.create(&code_grant("C2")).await.unwrap();
    store.create(&access_grant("A1", "")).await.unwrap();
    store.create(&access_grant("A2", "")).await.unwrap();

    assert_eq!(store.len().await, 4);
}

#[tokio::test]
async fn test_refresh_only_create_is_rejected() {
    let store = MemoryTokenStore::new();
    let info = TokenInfo::new("client", "user").with_refresh("R1", Utc::now(), StdDuration::from_secs(60));

    let err = store.create(&info).await.unwrap_err();
    assert!(err.is_validation());
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn test_remove_by_each_kind_keeps_other_keys() {
    for removed in TokenKind::ALL {
        let store = MemoryTokenStore::new();
        let info = TokenInfo::new("client", "user")
            .with_code("C1", Utc::now(), StdDuration::from_secs(600))
            .with_access("A1", Utc::now(), StdDuration::from_secs(3600))
            .with_refresh("R1", Utc::now(), StdDuration::from_secs(86400));
        store.create(&info).await.unwrap();

        store.remove_by(removed, info.token(removed)).await.unwrap();

        for kind in TokenKind::ALL {
            let lookup = store.get_by(kind, info.token(kind)).await.unwrap();
            if kind == removed {
                assert!(lookup.is_not_found(), "{} should be gone", kind);
            } else {
                assert_eq!(lookup, Lookup::Found(info.clone()), "{} should survive", kind);
            }
        }
    }
}

#[tokio::test]
async fn test_remove_unknown_key_is_noop() {
    let store = MemoryTokenStore::new();
    store.create(&code_grant("C1")).await.unwrap();

    store.remove_by_code("nope").await.unwrap();
    store.remove_by_refresh("nope").await.unwrap();

    assert!(store.get_by_code("C1").await.unwrap().is_found());
}

#[tokio::test]
async fn test_remove_is_idempotent() {
    let store = MemoryTokenStore::new();
    store.create(&code_grant("C1")).await.unwrap();

    store.remove_by_code("C1").await.unwrap();
    store.remove_by_code("C1").await.unwrap();

    assert!(store.get_by_code("C1").await.unwrap().is_not_found());
    // Clearing keys never deletes the row
    assert_eq!(store.len().await, 1);
}

#[tokio::test]
async fn test_removed_key_can_be_reissued() {
    let store = MemoryTokenStore::new();
    store.create(&code_grant("C1")).await.unwrap();
    store.remove_by_code("C1").await.unwrap();

    store.create(&code_grant("C1")).await.unwrap();
    assert!(store.get_by_code("C1").await.unwrap().is_found());
}

#[tokio::test]
async fn test_access_and_refresh_share_a_record() {
    let store = MemoryTokenStore::new();
    let info = access_grant("A1", "R1");
    store.create(&info).await.unwrap();

    let by_access = store.get_by_access("A1").await.unwrap();
    let by_refresh = store.get_by_refresh("R1").await.unwrap();
    assert_eq!(by_access, Lookup::Found(info.clone()));
    assert_eq!(by_access, by_refresh);

    store.remove_by_access("A1").await.unwrap();
    assert!(store.get_by_access("A1").await.unwrap().is_not_found());
    assert_eq!(store.get_by_refresh("R1").await.unwrap(), Lookup::Found(info));
}

#[tokio::test]
async fn test_expired_record_is_still_returned() {
    let store = MemoryTokenStore::new();
    let issued = Utc::now() - Duration::hours(2);
    let info = TokenInfo::new("client", "user").with_access("A1", issued, StdDuration::from_secs(60));
    store.create(&info).await.unwrap();

    assert!(store.get_by_access("A1").await.unwrap().is_found());
}

#[tokio::test]
async fn test_reclaimable_counts_expired_and_dead_rows() {
    let store = MemoryTokenStore::new();
    let now = Utc::now();

    let expired = TokenInfo::new("client", "user").with_access("A-old", now - Duration::hours(2), StdDuration::from_secs(60));
    store.create(&expired).await.unwrap();
    store.create(&code_grant("C-dead")).await.unwrap();
    store.remove_by_code("C-dead").await.unwrap();
    store.create(&access_grant("A-live", "R-live")).await.unwrap();

    assert_eq!(store.count_reclaimable(now).await.unwrap(), 2);
    assert_eq!(store.delete_reclaimable(now).await.unwrap(), 2);
    assert_eq!(store.count_reclaimable(now).await.unwrap(), 0);
    assert_eq!(store.len().await, 1);

    assert!(store.get_by_access("A-old").await.unwrap().is_not_found());
    assert!(store.get_by_access("A-live").await.unwrap().is_found());
}

#[tokio::test]
async fn test_deleted_keys_can_be_reused() {
    let store = MemoryTokenStore::new();
    let now = Utc::now();
    let old = TokenInfo::new("client", "user").with_access("A1", now - Duration::hours(2), StdDuration::from_secs(60));
    store.create(&old).await.unwrap();
    store.delete_reclaimable(now).await.unwrap();

    store.create(&access_grant("A1", "R1")).await.unwrap();
    assert!(store.get_by_access("A1").await.unwrap().is_found());
}

#[tokio::test]
async fn test_ids_are_never_reused() {
    let store = MemoryTokenStore::new();
    let now = Utc::now();

    let first = NewTokenRecord::from_info(&code_grant("C1"), now).unwrap();
    store.insert(first).await.unwrap();
    store.remove_by_code("C1").await.unwrap();
    store.delete_reclaimable(now).await.unwrap();

    let second = NewTokenRecord::from_info(&code_grant("C2"), now).unwrap();
    store.insert(second).await.unwrap();

    assert!(store.record(1).await.is_none());
    assert_eq!(store.record(2).await.unwrap().code, "C2");
}

#[tokio::test]
async fn test_closed_store_fails_every_call() {
    let store = MemoryTokenStore::new();
    store.create(&code_grant("C1")).await.unwrap();
    store.close().await;

    assert!(store.create(&code_grant("C2")).await.unwrap_err().is_storage());
    assert!(store.get_by_code("C1").await.unwrap_err().is_storage());
    assert!(store.remove_by_code("C1").await.unwrap_err().is_storage());
    assert!(store.count_reclaimable(Utc::now()).await.unwrap_err().is_storage());
    assert!(store.delete_reclaimable(Utc::now()).await.unwrap_err().is_storage());
}

#[tokio::test]
async fn test_keys_match_exactly() {
    let store = MemoryTokenStore::new();
    store.create(&access_grant("A1", "")).await.unwrap();

    assert!(store.get_by_access("A1 ").await.unwrap().is_not_found());
    assert!(store.get_by_access("a1").await.unwrap().is_not_found());
    store.create(&access_grant("A1 ", "")).await.unwrap();
    assert_eq!(store.len().await, 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_creates_of_one_key_have_one_winner() {
    let store = Arc::new(MemoryTokenStore::new());

    let tasks: Vec<_> = (0..32)
        .map(|i| {
            let store = Arc::clone(&store);
            tokio::spawn(async move { store.create(&access_grant("A1", &format!("R{}", i))).await })
        })
        .collect();

    let mut created = 0;
    let mut conflicts = 0;
    for task in tasks {
        match task.await.unwrap() {
            Ok(()) => created += 1,
            Err(err) => {
                assert_eq!(err, crate::errors::StoreError::conflict("access"));
                conflicts += 1;
            }
        }
    }

    assert_eq!(created, 1);
    assert_eq!(conflicts, 31);
    assert_eq!(store.len().await, 1);
}
