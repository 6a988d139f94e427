//! User service - sign-in upsert and self-service account operations.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use super::access::{resolve_actor, require_user};
use crate::domain::{
    is_wallet_address, AdminAccess, AuthenticatedCaller, SignInProfile, User, UserChanges,
};
use crate::errors::{AppError, AppResult};
use crate::infra::UnitOfWork;

/// User service trait for dependency injection.
#[async_trait]
pub trait UserService: Send + Sync {
    /// Upsert the caller's account on sign-in.
    ///
    /// A known subject returns the existing account unchanged; a known email
    /// with a new subject re-links that account; otherwise a USER is created.
    async fn sync_user(&self, caller: &AuthenticatedCaller, profile: SignInProfile) -> AppResult<User>;

    async fn current_user(&self, caller: &AuthenticatedCaller) -> AppResult<User>;

    async fn update_profile(
        &self,
        caller: &AuthenticatedCaller,
        name: Option<String>,
        image: Option<String>,
    ) -> AppResult<Uuid>;

    /// Link a wallet. Fails with `Conflict` if another account holds it.
    async fn update_wallet(&self, caller: &AuthenticatedCaller, wallet_address: String) -> AppResult<Uuid>;

    async fn remove_wallet(&self, caller: &AuthenticatedCaller) -> AppResult<Uuid>;

    /// Permanently delete the caller's account
    async fn delete_account(&self, caller: &AuthenticatedCaller) -> AppResult<()>;

    async fn check_admin_access(&self, caller: &AuthenticatedCaller) -> AppResult<AdminAccess>;
}

/// Concrete implementation of UserService using Unit of Work.
pub struct UserManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> UserManager<U> {
    /// Create new user service instance with Unit of Work
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }

    fn check_wallet(wallet_address: &str) -> AppResult<()> {
        if !is_wallet_address(wallet_address) {
            return Err(AppError::validation(
                "Wallet address must be a 0x-prefixed 40 character hex string",
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl<U: UnitOfWork> UserService for UserManager<U> {
    async fn sync_user(&self, caller: &AuthenticatedCaller, profile: SignInProfile) -> AppResult<User> {
        let users = self.uow.users();

        if let Some(existing) = users.find_by_subject(&caller.subject).await? {
            return Ok(existing);
        }

        if let Some(existing) = users.find_by_email(&profile.email).await? {
            tracing::info!(user_id = %existing.id, "re-linking account to new identity subject");
            let mut relinked = existing.clone();
            relinked.subject = caller.subject.clone();
            relinked.updated_at = Utc::now();
            return users.update(UserChanges::between(&existing, &relinked)).await;
        }

        if let Some(wallet) = &profile.wallet_address {
            Self::check_wallet(wallet)?;
        }

        let user = users
            .insert(User::new(profile.for_subject(caller.subject.clone())))
            .await?;
        tracing::info!(user_id = %user.id, "account created");
        Ok(user)
    }

    async fn current_user(&self, caller: &AuthenticatedCaller) -> AppResult<User> {
        require_user(self.uow.users().as_ref(), caller).await
    }

    async fn update_profile(
        &self,
        caller: &AuthenticatedCaller,
        name: Option<String>,
        image: Option<String>,
    ) -> AppResult<Uuid> {
        let users = self.uow.users();
        let stored = require_user(users.as_ref(), caller).await?;
        let mut user = stored.clone();

        user.name = name;
        user.image = image;
        user.updated_at = Utc::now();

        Ok(users.update(UserChanges::between(&stored, &user)).await?.id)
    }

    async fn update_wallet(&self, caller: &AuthenticatedCaller, wallet_address: String) -> AppResult<Uuid> {
        Self::check_wallet(&wallet_address)?;

        let users = self.uow.users();
        let stored = require_user(users.as_ref(), caller).await?;
        let mut user = stored.clone();

        if let Some(holder) = users.find_by_wallet(&wallet_address).await? {
            if holder.id != user.id {
                return Err(AppError::conflict(
                    "Wallet address already linked to another account",
                ));
            }
        }

        user.wallet_address = Some(wallet_address);
        user.updated_at = Utc::now();

        Ok(users.update(UserChanges::between(&stored, &user)).await?.id)
    }

    async fn remove_wallet(&self, caller: &AuthenticatedCaller) -> AppResult<Uuid> {
        let users = self.uow.users();
        let stored = require_user(users.as_ref(), caller).await?;
        let mut user = stored.clone();

        user.wallet_address = None;
        user.updated_at = Utc::now();

        Ok(users.update(UserChanges::between(&stored, &user)).await?.id)
    }

    async fn delete_account(&self, caller: &AuthenticatedCaller) -> AppResult<()> {
        let users = self.uow.users();
        let user = require_user(users.as_ref(), caller).await?;

        users.delete(user.id).await?;
        tracing::info!(user_id = %user.id, "account deleted");
        Ok(())
    }

    async fn check_admin_access(&self, caller: &AuthenticatedCaller) -> AppResult<AdminAccess> {
        let actor = resolve_actor(self.uow.users().as_ref(), caller).await?;
        Ok(actor.as_ref().map(AdminAccess::from).unwrap_or_else(AdminAccess::none))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::NewUser;
    use crate::infra::{MockUnitOfWork, MockUserRepository, UserRepository};

    fn account(subject: &str, email: &str) -> User {
        User::new(NewUser {
            subject: subject.into(),
            email: email.into(),
            name: None,
            image: None,
            wallet_address: None,
        })
    }

    fn service(users: MockUserRepository) -> UserManager<MockUnitOfWork> {
        let users: Arc<dyn UserRepository> = Arc::new(users);
        let mut uow = MockUnitOfWork::new();
        uow.expect_users().returning(move || users.clone());
        UserManager::new(Arc::new(uow))
    }

    #[tokio::test]
    async fn malformed_wallet_is_rejected_before_lookup() {
        let mut users = MockUserRepository::new();
        users.expect_find_by_subject().never();

        let result = service(users)
            .update_wallet(&AuthenticatedCaller::new("user_1"), "not-a-wallet".into())
            .await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn relinking_by_email_keeps_the_account_id() {
        let existing = account("old_subject", "a@example.com");
        let existing_id = existing.id;
        let relinked = User {
            subject: "new_subject".into(),
            ..existing.clone()
        };

        let mut users = MockUserRepository::new();
        users.expect_find_by_subject().returning(|_| Ok(None));
        users
            .expect_find_by_email()
            .returning(move |_| Ok(Some(existing.clone())));
        users
            .expect_update()
            .withf(|changes| {
                changes.subject.as_deref() == Some("new_subject")
                    && changes.wallet_address.is_none()
                    && changes.role.is_none()
            })
            .returning(move |_| Ok(relinked.clone()));
        users.expect_insert().never();

        let user = service(users)
            .sync_user(
                &AuthenticatedCaller::new("new_subject"),
                SignInProfile {
                    email: "a@example.com".into(),
                    name: None,
                    image: None,
                    wallet_address: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(user.id, existing_id);
        assert_eq!(user.subject, "new_subject");
    }

    #[tokio::test]
    async fn unknown_caller_has_no_admin_access() {
        let mut users = MockUserRepository::new();
        users.expect_find_by_subject().returning(|_| Ok(None));

        let access = service(users)
            .check_admin_access(&AuthenticatedCaller::new("ghost"))
            .await
            .unwrap();
        assert_eq!(access, AdminAccess::none());
    }
}
