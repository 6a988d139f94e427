//! User service integration tests: sign-in upsert and self-service operations.

mod common;

use std::sync::Arc;

use common::{caller, MemoryStore};
use pool_governance::domain::{AdminAccess, AuthenticatedCaller, SignInProfile, UserRole};
use pool_governance::errors::AppError;
use pool_governance::services::{UserManager, UserService};

const WALLET: &str = "0x71C7656EC7ab88b098defB751B7401B5f6d8976F";

fn service(store: &Arc<MemoryStore>) -> UserManager<MemoryStore> {
    UserManager::new(store.clone())
}

fn profile(email: &str) -> SignInProfile {
    SignInProfile {
        email: email.to_string(),
        name: Some("Jane".to_string()),
        image: None,
        wallet_address: None,
    }
}

#[tokio::test]
async fn sync_is_idempotent_per_subject() {
    let store = MemoryStore::new();
    let users = service(&store);
    let subject = AuthenticatedCaller::new("idp|123");

    let first = users.sync_user(&subject, profile("jane@example.com")).await.unwrap();
    let second = users.sync_user(&subject, profile("jane@example.com")).await.unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(first.role, UserRole::User);
    assert_eq!(store.user_count(), 1);
}

#[tokio::test]
async fn sync_relinks_a_known_email_to_a_new_subject() {
    let store = MemoryStore::new();
    let users = service(&store);

    let original = users
        .sync_user(&AuthenticatedCaller::new("idp|old"), profile("jane@example.com"))
        .await
        .unwrap();
    let relinked = users
        .sync_user(&AuthenticatedCaller::new("idp|new"), profile("jane@example.com"))
        .await
        .unwrap();

    assert_eq!(relinked.id, original.id);
    assert_eq!(relinked.subject, "idp|new");
    assert_eq!(store.user_count(), 1);
    assert_eq!(store.user(original.id).unwrap().subject, "idp|new");
}

#[tokio::test]
async fn sync_rejects_a_malformed_wallet() {
    let store = MemoryStore::new();
    let users = service(&store);

    let mut signup = profile("jane@example.com");
    signup.wallet_address = Some("0x123".into());

    let result = users.sync_user(&AuthenticatedCaller::new("idp|1"), signup).await;
    assert!(matches!(result, Err(AppError::Validation(_))));
    assert_eq!(store.user_count(), 0);
}

#[tokio::test]
async fn wallet_cannot_be_shared_between_accounts() {
    let store = MemoryStore::new();
    let alice = store.seed_user("alice", UserRole::User);
    let bob = store.seed_user("bob", UserRole::User);
    let users = service(&store);

    users
        .update_wallet(&caller(&alice), WALLET.to_string())
        .await
        .unwrap();
    let result = users.update_wallet(&caller(&bob), WALLET.to_string()).await;

    match result {
        Err(AppError::Conflict(message)) => {
            assert_eq!(message, "Wallet address already linked to another account")
        }
        other => panic!("expected conflict, got {:?}", other),
    }
    assert_eq!(store.user(bob.id).unwrap().wallet_address, None);

    // Re-linking the same wallet to its holder is fine
    users
        .update_wallet(&caller(&alice), WALLET.to_string())
        .await
        .unwrap();

    users.remove_wallet(&caller(&alice)).await.unwrap();
    assert_eq!(store.user(alice.id).unwrap().wallet_address, None);
}

#[tokio::test]
async fn profile_updates_touch_only_the_caller() {
    let store = MemoryStore::new();
    let alice = store.seed_user("alice", UserRole::User);
    let users = service(&store);

    let id = users
        .update_profile(
            &caller(&alice),
            Some("Alice Liddell".into()),
            Some("https://cdn.example.com/a.png".into()),
        )
        .await
        .unwrap();

    assert_eq!(id, alice.id);
    let stored = store.user(alice.id).unwrap();
    assert_eq!(stored.name.as_deref(), Some("Alice Liddell"));
    assert_eq!(stored.image.as_deref(), Some("https://cdn.example.com/a.png"));
}

#[tokio::test]
async fn unknown_subjects_are_not_found_for_self_service() {
    let store = MemoryStore::new();
    let users = service(&store);
    let ghost = AuthenticatedCaller::new("ghost");

    assert!(matches!(
        users.current_user(&ghost).await,
        Err(AppError::NotFound(_))
    ));
    assert!(matches!(
        users.delete_account(&ghost).await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn delete_account_removes_the_row() {
    let store = MemoryStore::new();
    let alice = store.seed_user("alice", UserRole::User);
    let users = service(&store);

    users.delete_account(&caller(&alice)).await.unwrap();

    assert!(store.user(alice.id).is_none());
    assert!(matches!(
        users.current_user(&caller(&alice)).await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn admin_access_reflects_the_role() {
    let store = MemoryStore::new();
    let root = store.seed_user("root", UserRole::SuperAdmin);
    let alice = store.seed_user("alice", UserRole::User);
    let users = service(&store);

    let access = users.check_admin_access(&caller(&root)).await.unwrap();
    assert!(access.is_admin);
    assert!(access.is_super_admin);
    assert_eq!(access.role, UserRole::SuperAdmin);

    let access = users.check_admin_access(&caller(&alice)).await.unwrap();
    assert!(!access.is_admin);

    let access = users
        .check_admin_access(&AuthenticatedCaller::new("ghost"))
        .await
        .unwrap();
    assert_eq!(access, AdminAccess::none());
}
