//! User repository: the identity and role store.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder,
};
use uuid::Uuid;

use super::base::{conflict_on_unique, into_domain};
use super::entities::user::{self, ActiveModel, Entity as UserEntity};
use crate::config::{ROLE_ADMIN, ROLE_SUPER_ADMIN};
use crate::domain::{User, UserChanges};
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// User repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>>;

    /// Find by external identity provider subject id
    async fn find_by_subject(&self, subject: &str) -> AppResult<Option<User>>;

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;

    async fn find_by_wallet(&self, wallet_address: &str) -> AppResult<Option<User>>;

    /// Batch lookup for joining actor display fields
    async fn find_many(&self, ids: Vec<Uuid>) -> AppResult<Vec<User>>;

    async fn insert(&self, user: User) -> AppResult<User>;

    /// Write only the changed columns of an existing user
    async fn update(&self, changes: UserChanges) -> AppResult<User>;

    /// Permanently delete user from database
    async fn delete(&self, id: Uuid) -> AppResult<()>;

    async fn list(&self) -> AppResult<Vec<User>>;

    /// Users holding ADMIN or SUPER_ADMIN
    async fn list_admins(&self) -> AppResult<Vec<User>>;

    async fn count(&self) -> AppResult<u64>;
}

/// Concrete implementation of UserRepository
pub struct UserStore {
    db: DatabaseConnection,
}

impl UserStore {
    /// Create new repository instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn find_one(&self, column: user::Column, value: &str) -> AppResult<Option<User>> {
        UserEntity::find()
            .filter(column.eq(value))
            .one(&self.db)
            .await?
            .map(User::try_from)
            .transpose()
    }
}

#[async_trait]
impl UserRepository for UserStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        UserEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .map(User::try_from)
            .transpose()
    }

    async fn find_by_subject(&self, subject: &str) -> AppResult<Option<User>> {
        self.find_one(user::Column::Subject, subject).await
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        self.find_one(user::Column::Email, email).await
    }

    async fn find_by_wallet(&self, wallet_address: &str) -> AppResult<Option<User>> {
        self.find_one(user::Column::WalletAddress, wallet_address)
            .await
    }

    async fn find_many(&self, ids: Vec<Uuid>) -> AppResult<Vec<User>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let models = UserEntity::find()
            .filter(user::Column::Id.is_in(ids))
            .all(&self.db)
            .await?;

        into_domain(models)
    }

    async fn insert(&self, user: User) -> AppResult<User> {
        let model = ActiveModel::from(&user)
            .insert(&self.db)
            .await
            .map_err(|e| conflict_on_unique(e, "User already exists"))?;

        User::try_from(model)
    }

    async fn update(&self, changes: UserChanges) -> AppResult<User> {
        let model = ActiveModel::from(&changes)
            .update(&self.db)
            .await
            .map_err(|e| match e {
                sea_orm::DbErr::RecordNotUpdated => AppError::not_found("User"),
                other => conflict_on_unique(other, "Wallet address already linked to another account"),
            })?;

        User::try_from(model)
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = UserEntity::delete_by_id(id).exec(&self.db).await?;

        if result.rows_affected == 0 {
            return Err(AppError::not_found("User"));
        }

        Ok(())
    }

    async fn list(&self) -> AppResult<Vec<User>> {
        let models = UserEntity::find()
            .order_by_desc(user::Column::CreatedAt)
            .all(&self.db)
            .await?;

        into_domain(models)
    }

    async fn list_admins(&self) -> AppResult<Vec<User>> {
        let models = UserEntity::find()
            .filter(user::Column::Role.is_in([ROLE_ADMIN, ROLE_SUPER_ADMIN]))
            .order_by_asc(user::Column::Email)
            .all(&self.db)
            .await?;

        into_domain(models)
    }

    async fn count(&self) -> AppResult<u64> {
        Ok(UserEntity::find().count(&self.db).await?)
    }
}
