//! User domain entity and related types.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::{ROLE_ADMIN, ROLE_SUPER_ADMIN, ROLE_USER};

static WALLET_ADDRESS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^0x[0-9a-fA-F]{40}$").expect("wallet address pattern is valid"));

/// Check that a string is a `0x`-prefixed 20-byte hex account address.
pub fn is_wallet_address(candidate: &str) -> bool {
    WALLET_ADDRESS.is_match(candidate)
}

/// User roles, ordered by privilege: `User < Admin < SuperAdmin`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    User,
    Admin,
    SuperAdmin,
}

impl UserRole {
    /// Check if this role has admin privileges
    pub fn is_admin(&self) -> bool {
        *self >= UserRole::Admin
    }

    pub fn is_super_admin(&self) -> bool {
        matches!(self, UserRole::SuperAdmin)
    }

    /// Check if this role satisfies a minimum required role
    pub fn can_access(&self, required: UserRole) -> bool {
        *self >= required
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::User => ROLE_USER,
            UserRole::Admin => ROLE_ADMIN,
            UserRole::SuperAdmin => ROLE_SUPER_ADMIN,
        }
    }
}

impl std::str::FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            ROLE_USER => Ok(UserRole::User),
            ROLE_ADMIN => Ok(UserRole::Admin),
            ROLE_SUPER_ADMIN => Ok(UserRole::SuperAdmin),
            other => Err(format!("Unknown role: {}", other)),
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User domain entity (the acting party behind every call)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    /// Stable subject id issued by the external identity provider
    pub subject: String,
    pub email: String,
    pub name: Option<String>,
    pub image: Option<String>,
    pub wallet_address: Option<String>,
    pub role: UserRole,
    /// Reserved capability strings, stored but not enforced
    pub permissions: Option<Vec<String>>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new user with the default role
    pub fn new(profile: NewUser) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            subject: profile.subject,
            email: profile.email,
            name: profile.name,
            image: profile.image,
            wallet_address: profile.wallet_address,
            role: UserRole::User,
            permissions: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Check if user has admin role
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Update user's role and permissions
    pub fn update_role(&mut self, role: UserRole, permissions: Option<Vec<String>>) {
        self.role = role;
        self.permissions = permissions;
        self.updated_at = Utc::now();
    }

    /// Display fields used when joining actors into listings
    pub fn summary(&self) -> UserSummary {
        UserSummary {
            name: self.name.clone(),
            email: self.email.clone(),
        }
    }
}

/// Columns a write changed on one user; `None` leaves the stored value alone.
#[derive(Debug, Clone, PartialEq)]
pub struct UserChanges {
    pub id: Uuid,
    pub subject: Option<String>,
    pub name: Option<Option<String>>,
    pub image: Option<Option<String>>,
    pub wallet_address: Option<Option<String>>,
    pub role: Option<UserRole>,
    pub permissions: Option<Option<Vec<String>>>,
    pub updated_at: DateTime<Utc>,
}

impl UserChanges {
    pub fn between(before: &User, after: &User) -> Self {
        fn changed<T: PartialEq + Clone>(before: &T, after: &T) -> Option<T> {
            (before != after).then(|| after.clone())
        }

        Self {
            id: after.id,
            subject: changed(&before.subject, &after.subject),
            name: changed(&before.name, &after.name),
            image: changed(&before.image, &after.image),
            wallet_address: changed(&before.wallet_address, &after.wallet_address),
            role: changed(&before.role, &after.role),
            permissions: changed(&before.permissions, &after.permissions),
            updated_at: after.updated_at,
        }
    }

    /// Overlay the changed columns onto a stored user.
    pub fn apply_to(&self, user: &mut User) {
        if let Some(subject) = &self.subject {
            user.subject = subject.clone();
        }
        if let Some(name) = &self.name {
            user.name = name.clone();
        }
        if let Some(image) = &self.image {
            user.image = image.clone();
        }
        if let Some(wallet) = &self.wallet_address {
            user.wallet_address = wallet.clone();
        }
        if let Some(role) = self.role {
            user.role = role;
        }
        if let Some(permissions) = &self.permissions {
            user.permissions = permissions.clone();
        }
        user.updated_at = self.updated_at;
    }
}

/// Data for a first-time account
#[derive(Debug, Clone)]
pub struct NewUser {
    pub subject: String,
    pub email: String,
    pub name: Option<String>,
    pub image: Option<String>,
    pub wallet_address: Option<String>,
}

/// Profile fields the identity provider delivers on sign-in
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignInProfile {
    pub email: String,
    pub name: Option<String>,
    pub image: Option<String>,
    pub wallet_address: Option<String>,
}

impl SignInProfile {
    /// Attach the subject id the profile was delivered for.
    pub fn for_subject(self, subject: impl Into<String>) -> NewUser {
        NewUser {
            subject: subject.into(),
            email: self.email,
            name: self.name,
            image: self.image,
            wallet_address: self.wallet_address,
        }
    }
}

/// Name and email of an actor, joined into admin listings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct UserSummary {
    pub name: Option<String>,
    pub email: String,
}

/// User response (safe to return to client)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub image: Option<String>,
    pub wallet_address: Option<String>,
    pub role: UserRole,
    pub permissions: Vec<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            image: user.image,
            wallet_address: user.wallet_address,
            role: user.role,
            permissions: user.permissions.unwrap_or_default(),
            is_active: user.is_active,
            created_at: user.created_at,
        }
    }
}

/// Result of an admin access check for the calling user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminAccess {
    pub is_admin: bool,
    pub is_super_admin: bool,
    pub role: UserRole,
    pub permissions: Vec<String>,
}

impl AdminAccess {
    /// Access for an unknown caller: plain user, no permissions.
    pub fn none() -> Self {
        Self {
            is_admin: false,
            is_super_admin: false,
            role: UserRole::User,
            permissions: Vec::new(),
        }
    }
}

impl From<&User> for AdminAccess {
    fn from(user: &User) -> Self {
        Self {
            is_admin: user.role.is_admin(),
            is_super_admin: user.role.is_super_admin(),
            role: user.role,
            permissions: user.permissions.clone().unwrap_or_default(),
        }
    }
}
