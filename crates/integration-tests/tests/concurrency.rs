//! Concurrent access to the queue service

mod common;

use std::collections::HashSet;
use std::sync::Arc;

use common::{memory_service, sqlite_file_service, sqlite_service};
use tempfile::TempDir;
use waitline_core::application::QueueService;
use waitline_core::ErrorKind;

async fn enqueue_many(service: &Arc<QueueService>, store_id: &str, count: usize) {
    let mut handles = Vec::new();
    for i in 0..count {
        let service = service.clone();
        let store_id = store_id.to_string();
        handles.push(tokio::spawn(async move {
            service
                .add_consumer(&store_id, &format!("consumer-{}", i), &format!("phone-{}", i), "waiting")
                .await
        }));
    }

    for handle in handles {
        handle.await.unwrap().unwrap();
    }
}

/// Every concurrent add lands exactly once, and positions agree with the list
async fn concurrent_adds_keep_one_order(service: Arc<QueueService>) {
    let store = service.create("Outback").await.unwrap();
    enqueue_many(&service, &store.id, 50).await;

    let line = service.get_all_consumers(&store.id).await.unwrap();
    assert_eq!(line.len(), 50);

    let phones: HashSet<&str> = line.iter().map(|c| c.phone.as_str()).collect();
    assert_eq!(phones.len(), 50, "no consumer lost or duplicated");

    for (index, consumer) in line.iter().enumerate() {
        let (position, _) = service
            .get_consumer(&store.id, &consumer.phone)
            .await
            .unwrap();
        assert_eq!(position, index);
    }
}

/// Lines of different stores fill independently
async fn stores_fill_in_parallel(service: Arc<QueueService>) {
    let mut ids = Vec::new();
    for name in ["Outback", "Madero", "Coco Bambu", "Fogo de Chao"] {
        ids.push(service.create(name).await.unwrap().id);
    }

    let mut handles = Vec::new();
    for id in ids.clone() {
        let service = service.clone();
        handles.push(tokio::spawn(async move {
            enqueue_many(&service, &id, 20).await;
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    for id in &ids {
        assert_eq!(service.get_all_consumers(id).await.unwrap().len(), 20);
    }
}

/// Concurrent creates of one name: exactly one wins, the rest see AlreadyExists
async fn create_race_has_one_winner(service: Arc<QueueService>) {
    let mut handles = Vec::new();
    for _ in 0..16 {
        let service = service.clone();
        handles.push(tokio::spawn(async move { service.create("Outback").await }));
    }

    let mut created = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => created += 1,
            Err(e) => assert_eq!(e.kind(), ErrorKind::AlreadyExists, "{}", e),
        }
    }
    assert_eq!(created, 1);
    assert_eq!(service.get_all_stores().await.unwrap(), vec!["Outback".to_string()]);
}

/// Adds racing a store removal either land before it or see NotFound
async fn adds_racing_removal(service: Arc<QueueService>) {
    let store = service.create("Outback").await.unwrap();

    let mut handles = Vec::new();
    for i in 0..20 {
        let service = service.clone();
        let store_id = store.id.clone();
        handles.push(tokio::spawn(async move {
            service
                .add_consumer(&store_id, "Fulano", &format!("phone-{}", i), "waiting")
                .await
        }));
    }
    service.remove_store(&store.id).await.unwrap();

    for handle in handles {
        if let Err(e) = handle.await.unwrap() {
            assert_eq!(e.kind(), ErrorKind::NotFound, "{}", e);
        }
    }

    let err = service.get_all_consumers(&store.id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert!(service.get_all_stores().await.unwrap().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_memory_concurrent_adds_keep_one_order() {
    concurrent_adds_keep_one_order(Arc::new(memory_service())).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_sqlite_concurrent_adds_keep_one_order() {
    concurrent_adds_keep_one_order(Arc::new(sqlite_service().await)).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_memory_stores_fill_in_parallel() {
    stores_fill_in_parallel(Arc::new(memory_service())).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_sqlite_stores_fill_in_parallel() {
    stores_fill_in_parallel(Arc::new(sqlite_service().await)).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_memory_adds_racing_removal() {
    adds_racing_removal(Arc::new(memory_service())).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_sqlite_adds_racing_removal() {
    adds_racing_removal(Arc::new(sqlite_service().await)).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_memory_create_race_has_one_winner() {
    create_race_has_one_winner(Arc::new(memory_service())).await;
}

// File-backed pools run statements on several connections at once

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_sqlite_file_create_race_has_one_winner() {
    let dir = TempDir::new().unwrap();
    create_race_has_one_winner(Arc::new(sqlite_file_service(&dir).await)).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_sqlite_file_concurrent_adds_keep_one_order() {
    let dir = TempDir::new().unwrap();
    concurrent_adds_keep_one_order(Arc::new(sqlite_file_service(&dir).await)).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_sqlite_file_adds_racing_removal() {
    let dir = TempDir::new().unwrap();
    adds_racing_removal(Arc::new(sqlite_file_service(&dir).await)).await;
}
