//! Concurrent creates against one store.

mod common;

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use common::{new_user, service};
use users_info::domain::error::DomainError;

const WRITERS: usize = 32;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn racing_creates_with_one_email_have_exactly_one_winner() {
    let svc = service();

    let tasks: Vec<_> = (0..WRITERS)
        .map(|i| {
            let svc = svc.clone();
            tokio::spawn(async move {
                svc.create_user(new_user(&format!("Racer{i}"), "Doe", "same@x.com"))
                    .await
            })
        })
        .collect();

    let mut winners = 0;
    let mut conflicts = 0;
    for t in tasks {
        match t.await.unwrap() {
            Ok(_) => winners += 1,
            Err(DomainError::EmailAlreadyExists { .. }) => conflicts += 1,
            Err(other) => panic!("unexpected error: {other:?}"),
        }
    }

    assert_eq!(winners, 1);
    assert_eq!(conflicts, WRITERS - 1);
    assert_eq!(svc.list_users().await.unwrap().len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn racing_creates_with_distinct_emails_all_land() {
    let svc = service();
    let done = Arc::new(AtomicBool::new(false));

    let list_reader = {
        let svc = svc.clone();
        let done = done.clone();
        tokio::spawn(async move {
            let mut snapshots = 0usize;
            while !done.load(Ordering::Acquire) {
                let users = svc.list_users().await.unwrap();
                assert!(users.len() <= WRITERS);
                let ids: HashSet<_> = users.iter().map(|u| u.id).collect();
                assert_eq!(ids.len(), users.len(), "duplicate id in a snapshot");
                snapshots += 1;
                tokio::task::yield_now().await;
            }
            snapshots
        })
    };

    let email_reader = {
        let svc = svc.clone();
        let done = done.clone();
        tokio::spawn(async move {
            let mut i = 0;
            while !done.load(Ordering::Acquire) {
                let email = format!("user{}@x.com", i % WRITERS);
                match svc.get_user_by_email(&email).await {
                    Ok(u) => assert_eq!(u.email, email),
                    Err(DomainError::UserNotFoundByEmail { .. }) => {}
                    Err(other) => panic!("unexpected error: {other:?}"),
                }
                i += 1;
                tokio::task::yield_now().await;
            }
        })
    };

    let tasks: Vec<_> = (0..WRITERS)
        .map(|i| {
            let svc = svc.clone();
            tokio::spawn(async move {
                svc.create_user(new_user("John", "Doe", &format!("user{i}@x.com")))
                    .await
            })
        })
        .collect();

    let mut created = Vec::with_capacity(WRITERS);
    for t in tasks {
        let user = t.await.unwrap().unwrap();
        created.push((user.id, user.email));
    }
    done.store(true, Ordering::Release);
    assert!(list_reader.await.unwrap() > 0);
    email_reader.await.unwrap();

    let ids: HashSet<_> = created.iter().map(|(id, _)| *id).collect();
    assert_eq!(ids.len(), WRITERS);
    assert_eq!(svc.list_users().await.unwrap().len(), WRITERS);
    for (id, email) in &created {
        assert_eq!(&svc.get_user(*id).await.unwrap().email, email);
        assert_eq!(svc.get_user_by_email(email).await.unwrap().id, *id);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn readers_never_observe_a_half_written_record() {
    let svc = service();
    let id = svc
        .create_user(new_user("Name0", "Last0", "seed@x.com"))
        .await
        .unwrap()
        .id;

    let writer = {
        let svc = svc.clone();
        tokio::spawn(async move {
            for i in 1..50 {
                let replacement = new_user(&format!("Name{i}"), &format!("Last{i}"), "seed@x.com");
                svc.update_user(id, replacement).await.unwrap();
            }
        })
    };

    let reader = {
        let svc = svc.clone();
        tokio::spawn(async move {
            for _ in 0..200 {
                let u = svc.get_user(id).await.unwrap();
                // first and last name are always written together
                assert_eq!(
                    u.first_name.trim_start_matches("Name"),
                    u.last_name.trim_start_matches("Last")
                );
                tokio::task::yield_now().await;
            }
        })
    };

    writer.await.unwrap();
    reader.await.unwrap();
}
