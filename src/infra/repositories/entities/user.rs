//! User database entity for SeaORM.

use sea_orm::entity::prelude::*;
use sea_orm::ActiveValue::{Set, Unchanged};

use crate::domain::{User, UserChanges, UserRole};
use crate::errors::AppError;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub subject: String,
    #[sea_orm(unique)]
    pub email: String,
    pub name: Option<String>,
    pub image: Option<String>,
    #[sea_orm(unique)]
    pub wallet_address: Option<String>,
    pub role: String,
    pub permissions: Option<Json>,
    pub is_active: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Convert database model to domain entity
impl TryFrom<Model> for User {
    type Error = AppError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let role: UserRole = model.role.parse().map_err(AppError::internal)?;
        let permissions = model
            .permissions
            .map(serde_json::from_value)
            .transpose()
            .map_err(|e| AppError::internal(format!("Corrupt user permissions: {}", e)))?;

        Ok(User {
            id: model.id,
            subject: model.subject,
            email: model.email,
            name: model.name,
            image: model.image,
            wallet_address: model.wallet_address,
            role,
            permissions,
            is_active: model.is_active,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

/// Full-row active model for inserts
impl From<&User> for ActiveModel {
    fn from(user: &User) -> Self {
        ActiveModel {
            id: Set(user.id),
            subject: Set(user.subject.clone()),
            email: Set(user.email.clone()),
            name: Set(user.name.clone()),
            image: Set(user.image.clone()),
            wallet_address: Set(user.wallet_address.clone()),
            role: Set(user.role.as_str().to_string()),
            permissions: Set(user.permissions.as_ref().map(|p| serde_json::json!(p))),
            is_active: Set(user.is_active),
            created_at: Set(user.created_at),
            updated_at: Set(user.updated_at),
        }
    }
}

/// Partial active model with only the changed columns set
impl From<&UserChanges> for ActiveModel {
    fn from(changes: &UserChanges) -> Self {
        let mut model = ActiveModel {
            id: Unchanged(changes.id),
            updated_at: Set(changes.updated_at),
            ..Default::default()
        };
        if let Some(subject) = &changes.subject {
            model.subject = Set(subject.clone());
        }
        if let Some(name) = &changes.name {
            model.name = Set(name.clone());
        }
        if let Some(image) = &changes.image {
            model.image = Set(image.clone());
        }
        if let Some(wallet) = &changes.wallet_address {
            model.wallet_address = Set(wallet.clone());
        }
        if let Some(role) = changes.role {
            model.role = Set(role.as_str().to_string());
        }
        if let Some(permissions) = &changes.permissions {
            model.permissions = Set(permissions.as_ref().map(|p| serde_json::json!(p)));
        }
        model
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use sea_orm::{DbBackend, QueryTrait};

    use super::*;

    #[test]
    fn role_update_does_not_rewrite_wallet_or_email() {
        let changes = UserChanges {
            id: Uuid::new_v4(),
            subject: None,
            name: None,
            image: None,
            wallet_address: None,
            role: Some(UserRole::Admin),
            permissions: Some(None),
            updated_at: Utc::now(),
        };

        let sql = Entity::update(ActiveModel::from(&changes))
            .build(DbBackend::Postgres)
            .to_string();
        assert!(sql.contains("\"role\""));
        assert!(sql.contains("\"permissions\""));
        assert!(!sql.contains("\"wallet_address\""));
        assert!(!sql.contains("\"email\""));
    }
}
