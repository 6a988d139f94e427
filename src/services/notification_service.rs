//! Notification service - owner-scoped inbox operations.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use super::access::{resolve_actor, require_user};
use crate::domain::{AuthenticatedCaller, NewNotification, Notification, User};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::UnitOfWork;
use crate::types::PageParams;

/// Notification service trait for dependency injection.
#[async_trait]
pub trait NotificationService: Send + Sync {
    /// The caller's notifications, newest first
    async fn list(&self, caller: &AuthenticatedCaller, page: PageParams) -> AppResult<Vec<Notification>>;

    /// Unread count; zero for callers without an account
    async fn unread_count(&self, caller: &AuthenticatedCaller) -> AppResult<u64>;

    /// Create a notification. Users may address only themselves; admins anyone.
    async fn create(&self, caller: &AuthenticatedCaller, spec: NewNotification) -> AppResult<Uuid>;

    async fn mark_as_read(&self, caller: &AuthenticatedCaller, id: Uuid) -> AppResult<Uuid>;

    /// Mark every unread notification of the caller, returning how many changed
    async fn mark_all_as_read(&self, caller: &AuthenticatedCaller) -> AppResult<u64>;

    async fn delete(&self, caller: &AuthenticatedCaller, id: Uuid) -> AppResult<()>;
}

pub struct NotificationManager<U: UnitOfWork> {
    uow: Arc<U>,
    default_page_limit: u64,
}

impl<U: UnitOfWork> NotificationManager<U> {
    pub fn new(uow: Arc<U>, default_page_limit: u64) -> Self {
        Self {
            uow,
            default_page_limit,
        }
    }

    /// Load a notification and check the caller owns it.
    async fn owned(&self, owner: &User, id: Uuid) -> AppResult<Notification> {
        let notification = self
            .uow
            .notifications()
            .find_by_id(id)
            .await?
            .ok_or_not_found("Notification")?;

        if notification.user_id != owner.id {
            tracing::warn!(user_id = %owner.id, notification_id = %id, "foreign notification access");
            return Err(AppError::unauthorized("Notification belongs to another user"));
        }

        Ok(notification)
    }
}

#[async_trait]
impl<U: UnitOfWork> NotificationService for NotificationManager<U> {
    async fn list(&self, caller: &AuthenticatedCaller, page: PageParams) -> AppResult<Vec<Notification>> {
        let user = require_user(self.uow.users().as_ref(), caller).await?;
        self.uow
            .notifications()
            .list_for_user(user.id, page.offset(), page.limit_or(self.default_page_limit))
            .await
    }

    async fn unread_count(&self, caller: &AuthenticatedCaller) -> AppResult<u64> {
        match resolve_actor(self.uow.users().as_ref(), caller).await? {
            Some(user) => self.uow.notifications().count_unread(user.id).await,
            None => Ok(0),
        }
    }

    async fn create(&self, caller: &AuthenticatedCaller, spec: NewNotification) -> AppResult<Uuid> {
        let users = self.uow.users();
        let sender = require_user(users.as_ref(), caller).await?;

        if spec.user_id != sender.id {
            if !sender.is_admin() {
                return Err(AppError::unauthorized("Admin access required"));
            }
            if users.find_by_id(spec.user_id).await?.is_none() {
                return Err(AppError::not_found("Recipient"));
            }
        }

        let notification = self
            .uow
            .notifications()
            .insert(Notification::new(spec))
            .await?;
        Ok(notification.id)
    }

    async fn mark_as_read(&self, caller: &AuthenticatedCaller, id: Uuid) -> AppResult<Uuid> {
        let user = require_user(self.uow.users().as_ref(), caller).await?;
        self.owned(&user, id).await?;
        self.uow.notifications().mark_read(id).await?;
        Ok(id)
    }

    async fn mark_all_as_read(&self, caller: &AuthenticatedCaller) -> AppResult<u64> {
        let user = require_user(self.uow.users().as_ref(), caller).await?;
        self.uow.notifications().mark_all_read(user.id).await
    }

    async fn delete(&self, caller: &AuthenticatedCaller, id: Uuid) -> AppResult<()> {
        let user = require_user(self.uow.users().as_ref(), caller).await?;
        self.owned(&user, id).await?;
        self.uow.notifications().delete(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{NewUser, NotificationKind};
    use crate::infra::{
        MockNotificationRepository, MockUnitOfWork, MockUserRepository, NotificationRepository,
        UserRepository,
    };

    #[tokio::test]
    async fn foreign_notifications_cannot_be_deleted() {
        let owner = User::new(NewUser {
            subject: "owner".into(),
            email: "owner@example.com".into(),
            name: None,
            image: None,
            wallet_address: None,
        });
        let intruder = User::new(NewUser {
            subject: "intruder".into(),
            email: "intruder@example.com".into(),
            name: None,
            image: None,
            wallet_address: None,
        });
        let notification = Notification::new(NewNotification {
            user_id: owner.id,
            kind: NotificationKind::SystemAnnouncement,
            title: "Maintenance".into(),
            message: "Scheduled downtime".into(),
            metadata: None,
        });

        let mut users = MockUserRepository::new();
        users
            .expect_find_by_subject()
            .returning(move |_| Ok(Some(intruder.clone())));
        let users: Arc<dyn UserRepository> = Arc::new(users);

        let mut notifications = MockNotificationRepository::new();
        notifications
            .expect_find_by_id()
            .returning(move |_| Ok(Some(notification.clone())));
        notifications.expect_delete().never();
        let notifications: Arc<dyn NotificationRepository> = Arc::new(notifications);

        let mut uow = MockUnitOfWork::new();
        uow.expect_users().returning(move || users.clone());
        uow.expect_notifications()
            .returning(move || notifications.clone());

        let service = NotificationManager::new(Arc::new(uow), 50);
        let result = service
            .delete(&AuthenticatedCaller::new("intruder"), Uuid::new_v4())
            .await;
        assert!(matches!(result, Err(AppError::Unauthorized(_))));
    }
}
