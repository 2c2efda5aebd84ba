//! # Session Registry Tests
//!
//! Concurrent access to the process-wide session registry.

use seo_audit::{
    session::{SessionKey, SessionRegistry},
    state::StateStore,
};
use std::sync::Arc;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_get_or_create_yields_one_session() {
    let registry = SessionRegistry::new();
    let key = SessionKey::for_user("racer");

    let handles: Vec<_> = (0..16)
        .map(|i| {
            let registry = registry.clone();
            let key = key.clone();
            tokio::spawn(async move {
                registry
                    .get_or_create(&key, move || {
                        StateStore::for_target(&format!("https://site{i}.example"))
                    })
                    .await
            })
        })
        .collect();

    let sessions: Vec<_> = futures::future::join_all(handles)
        .await
        .into_iter()
        .map(|joined| joined.unwrap())
        .collect();

    assert_eq!(registry.len().await, 1);
    assert!(sessions.iter().all(|s| Arc::ptr_eq(s, &sessions[0])));
}

#[tokio::test]
async fn test_distinct_users_are_isolated() {
    let registry = SessionRegistry::new();
    let alice = registry
        .get_or_create(&SessionKey::for_user("alice"), || {
            StateStore::for_target("https://alice.example")
        })
        .await;
    let bob = registry
        .get_or_create(&SessionKey::for_user("bob"), || {
            StateStore::for_target("https://bob.example")
        })
        .await;

    assert!(!Arc::ptr_eq(&alice, &bob));
    alice
        .lock()
        .await
        .state
        .put("page_audit", &"alice's audit")
        .unwrap();
    assert!(!bob.lock().await.state.contains("page_audit"));
    assert!(registry.get(&SessionKey::new("carol", "other")).await.is_none());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_session_lock_serializes_runs() {
    let registry = SessionRegistry::new();
    let key = SessionKey::for_user("serial");
    let session = registry
        .get_or_create(&key, || StateStore::for_target("https://serial.example"))
        .await;

    let tasks: Vec<_> = (0..8)
        .map(|_| {
            let session = session.clone();
            tokio::spawn(async move {
                let mut guard = session.lock().await;
                let seen = guard.runs;
                tokio::task::yield_now().await;
                guard.runs = seen + 1;
            })
        })
        .collect();
    for task in tasks {
        task.await.unwrap();
    }

    assert_eq!(session.lock().await.runs, 8);
}
