//! PostgreSQL store against a throwaway container
//!
//! Needs Docker: `cargo test -p auth --features postgres-tests`

#![cfg(feature = "postgres-tests")]

use std::panic::AssertUnwindSafe;

use auth::AuthError;
use auth::domain::entity::user::NewUser;
use auth::domain::repository::{RepositoryScope, UnitOfWork, UserRepository};
use auth::domain::value_object::{email::Email, user_name::UserName, user_role::UserRole};
use auth::infra::postgres::PgUnitOfWork;
use futures::FutureExt;
use platform::password::{ClearTextPassword, HashCost, PasswordHasher};
use sqlx::postgres::PgPoolOptions;
use testcontainers_modules::postgres::Postgres;
use testcontainers_modules::testcontainers::runners::AsyncRunner;
use testcontainers_modules::testcontainers::{ContainerAsync, ImageExt};

struct TestDb {
    uow: PgUnitOfWork,
    // Dropping the handle stops the container
    _container: ContainerAsync<Postgres>,
}

async fn setup() -> TestDb {
    let container = Postgres::default().with_tag("16-alpine").start().await.unwrap();
    let host = container.get_host().await.unwrap();
    let port = container.get_host_port_ipv4(5432).await.unwrap();
    let url = format!("postgres://postgres:postgres@{host}:{port}/postgres");

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&url)
        .await
        .unwrap();
    sqlx::migrate!("../../../database/migrations")
        .run(&pool)
        .await
        .unwrap();

    TestDb {
        uow: PgUnitOfWork::new(pool),
        _container: container,
    }
}

fn new_user(username: &str, email: &str) -> NewUser {
    let hasher = PasswordHasher::new(HashCost::light()).unwrap();
    let password = ClearTextPassword::new("secret1".to_string()).unwrap();
    NewUser {
        username: UserName::new(username).unwrap(),
        email: Email::new(email).unwrap(),
        password_hash: hasher.hash(&password).unwrap(),
        role: UserRole::User,
    }
}

#[tokio::test]
async fn test_create_and_lookup() {
    let db = setup().await;
    let users = db.uow.user_repository();

    let created = users.create(&new_user("alice", "alice@x.io")).await.unwrap();
    assert_eq!(created.role, UserRole::User);
    assert!(created.deleted_at.is_none());

    assert_eq!(users.find_by_username("alice").await.unwrap().user_id, created.user_id);
    assert_eq!(users.find_by_email(" Alice@X.io ").await.unwrap().user_id, created.user_id);
    assert_eq!(users.find_by_id(&created.user_id).await.unwrap().email.as_str(), "alice@x.io");
    assert!(matches!(
        users.find_by_username("Alice").await,
        Err(AuthError::UserNotFound)
    ));
}

#[tokio::test]
async fn test_create_maps_unique_constraints() {
    let db = setup().await;
    let users = db.uow.user_repository();
    users.create(&new_user("alice", "alice@x.io")).await.unwrap();

    assert!(matches!(
        users.create(&new_user("alice", "other@x.io")).await,
        Err(AuthError::UsernameTaken)
    ));
    assert!(matches!(
        users.create(&new_user("carol", "alice@x.io")).await,
        Err(AuthError::EmailTaken)
    ));
    assert!(matches!(
        users.find_by_username("carol").await,
        Err(AuthError::UserNotFound)
    ));
}

#[tokio::test]
async fn test_update_maps_unique_constraints() {
    let db = setup().await;
    let users = db.uow.user_repository();
    users.create(&new_user("alice", "alice@x.io")).await.unwrap();
    let bob = users.create(&new_user("bob", "bob@x.io")).await.unwrap();

    let mut renamed = bob.clone();
    renamed.username = UserName::new("alice").unwrap();
    assert!(matches!(users.update(&renamed).await, Err(AuthError::UsernameTaken)));

    let mut readdressed = bob.clone();
    readdressed.email = Email::new("alice@x.io").unwrap();
    assert!(matches!(users.update(&readdressed).await, Err(AuthError::EmailTaken)));

    let mut promoted = bob.clone();
    promoted.role = UserRole::Admin;
    let updated = users.update(&promoted).await.unwrap();
    assert_eq!(updated.role, UserRole::Admin);
    assert!(updated.updated_at >= bob.updated_at);
}

#[tokio::test]
async fn test_error_rolls_back_partial_writes() {
    let db = setup().await;
    let alice = new_user("alice", "alice@x.io");

    let result: Result<(), AuthError> = db
        .uow
        .run(move |tx| {
            Box::pin(async move {
                tx.user_repository().create(&alice).await?;
                Err(AuthError::Internal("abort".into()))
            })
        })
        .await;

    assert!(matches!(result, Err(AuthError::Internal(_))));
    assert!(matches!(
        db.uow.user_repository().find_by_username("alice").await,
        Err(AuthError::UserNotFound)
    ));
}

#[tokio::test]
async fn test_conflict_rolls_back_earlier_writes() {
    let db = setup().await;
    db.uow
        .user_repository()
        .create(&new_user("bob", "bob@x.io"))
        .await
        .unwrap();

    let (fresh, duplicate) = (new_user("alice", "alice@x.io"), new_user("bob", "bob2@x.io"));
    let result = db
        .uow
        .run(move |tx| {
            Box::pin(async move {
                tx.user_repository().create(&fresh).await?;
                tx.user_repository().create(&duplicate).await
            })
        })
        .await;

    assert!(matches!(result, Err(AuthError::UsernameTaken)));
    assert!(matches!(
        db.uow.user_repository().find_by_username("alice").await,
        Err(AuthError::UserNotFound)
    ));
}

#[tokio::test]
async fn test_panic_rolls_back_and_propagates() {
    let db = setup().await;
    let alice = new_user("alice", "alice@x.io");

    let outcome = AssertUnwindSafe(db.uow.run::<(), _>(move |tx| {
        Box::pin(async move {
            tx.user_repository().create(&alice).await?;
            if true {
                panic!("handler bug");
            }
            Ok(())
        })
    }))
    .catch_unwind()
    .await;
    assert!(outcome.is_err());

    assert!(matches!(
        db.uow.user_repository().find_by_username("alice").await,
        Err(AuthError::UserNotFound)
    ));

    let carol = new_user("carol", "carol@x.io");
    db.uow
        .run(move |tx| Box::pin(async move { tx.user_repository().create(&carol).await }))
        .await
        .unwrap();
    assert!(db.uow.user_repository().find_by_username("carol").await.is_ok());
}

#[tokio::test]
async fn test_transaction_sees_its_own_writes() {
    let db = setup().await;
    let alice = new_user("alice", "alice@x.io");

    let found = db
        .uow
        .run(move |tx| {
            Box::pin(async move {
                let users = tx.user_repository();
                users.create(&alice).await?;
                users.find_by_email("alice@x.io").await
            })
        })
        .await
        .unwrap();

    assert_eq!(found.username.as_str(), "alice");
}

#[tokio::test]
async fn test_soft_delete_hides_row_but_keeps_it_reserved() {
    let db = setup().await;
    let users = db.uow.user_repository();
    let alice = users.create(&new_user("alice", "alice@x.io")).await.unwrap();

    users.delete(&alice.user_id).await.unwrap();

    assert!(matches!(users.find_by_id(&alice.user_id).await, Err(AuthError::UserNotFound)));
    assert!(matches!(users.find_by_username("alice").await, Err(AuthError::UserNotFound)));
    assert!(matches!(users.find_by_email("alice@x.io").await, Err(AuthError::UserNotFound)));
    assert!(matches!(users.update(&alice).await, Err(AuthError::UserNotFound)));
    assert!(matches!(users.delete(&alice.user_id).await, Err(AuthError::UserNotFound)));
    assert!(matches!(
        users.create(&new_user("alice", "fresh@x.io")).await,
        Err(AuthError::UsernameTaken)
    ));
    assert!(matches!(
        users.create(&new_user("carol", "alice@x.io")).await,
        Err(AuthError::EmailTaken)
    ));
}
