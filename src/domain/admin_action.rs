//! Append-only audit records of privileged mutations.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;

use super::user::UserSummary;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AdminActionKind {
    PoolApproved,
    PoolRejected,
    UserRoleChanged,
    PoolStatusUpdated,
    EmergencyAction,
    InvestmentConfirmed,
    PoolActivated,
    PoolPaused,
    SystemSettingUpdated,
}

impl AdminActionKind {
    pub const ALL: [AdminActionKind; 9] = [
        AdminActionKind::PoolApproved,
        AdminActionKind::PoolRejected,
        AdminActionKind::UserRoleChanged,
        AdminActionKind::PoolStatusUpdated,
        AdminActionKind::EmergencyAction,
        AdminActionKind::InvestmentConfirmed,
        AdminActionKind::PoolActivated,
        AdminActionKind::PoolPaused,
        AdminActionKind::SystemSettingUpdated,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AdminActionKind::PoolApproved => "POOL_APPROVED",
            AdminActionKind::PoolRejected => "POOL_REJECTED",
            AdminActionKind::UserRoleChanged => "USER_ROLE_CHANGED",
            AdminActionKind::PoolStatusUpdated => "POOL_STATUS_UPDATED",
            AdminActionKind::EmergencyAction => "EMERGENCY_ACTION",
            AdminActionKind::InvestmentConfirmed => "INVESTMENT_CONFIRMED",
            AdminActionKind::PoolActivated => "POOL_ACTIVATED",
            AdminActionKind::PoolPaused => "POOL_PAUSED",
            AdminActionKind::SystemSettingUpdated => "SYSTEM_SETTING_UPDATED",
        }
    }
}

impl FromStr for AdminActionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AdminActionKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| format!("Unknown admin action: {}", s))
    }
}

impl std::fmt::Display for AdminActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of entity an audit record points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TargetType {
    Pool,
    User,
    Transaction,
    SystemSetting,
}

impl TargetType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetType::Pool => "POOL",
            TargetType::User => "USER",
            TargetType::Transaction => "TRANSACTION",
            TargetType::SystemSetting => "SYSTEM_SETTING",
        }
    }
}

impl FromStr for TargetType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "POOL" => Ok(TargetType::Pool),
            "USER" => Ok(TargetType::User),
            "TRANSACTION" => Ok(TargetType::Transaction),
            "SYSTEM_SETTING" => Ok(TargetType::SystemSetting),
            other => Err(format!("Unknown target type: {}", other)),
        }
    }
}

/// Before/after snapshot and context attached to an audit record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActionDetails {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Action-specific payload, shape varies by kind
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub metadata: Option<Value>,
}

impl ActionDetails {
    pub fn reason(reason: impl Into<String>) -> Self {
        Self {
            reason: Some(reason.into()),
            ..Self::default()
        }
    }

    pub fn change(mut self, old: impl Into<String>, new: impl Into<String>) -> Self {
        self.old_value = Some(old.into());
        self.new_value = Some(new.into());
        self
    }

    pub fn metadata(mut self, metadata: Value) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

/// Immutable audit record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminAction {
    pub id: Uuid,
    pub admin_id: Uuid,
    pub action: AdminActionKind,
    pub target_id: String,
    pub target_type: TargetType,
    pub details: ActionDetails,
    pub created_at: DateTime<Utc>,
}

impl AdminAction {
    pub fn new(
        admin_id: Uuid,
        action: AdminActionKind,
        target_type: TargetType,
        target_id: impl Into<String>,
        details: ActionDetails,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            admin_id,
            action,
            target_id: target_id.into(),
            target_type,
            details,
            created_at: Utc::now(),
        }
    }
}

/// Audit record joined with the acting admin's display fields
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminActionView {
    #[serde(flatten)]
    pub action: AdminAction,
    pub admin: Option<UserSummary>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn details_omit_absent_fields() {
        let details = ActionDetails::reason("breach").change("FUNDING", "EMERGENCY");
        let rendered = serde_json::to_value(&details).unwrap();
        assert_eq!(
            rendered,
            json!({"oldValue": "FUNDING", "newValue": "EMERGENCY", "reason": "breach"})
        );
    }

    #[test]
    fn kind_spelling_round_trips() {
        for kind in AdminActionKind::ALL {
            assert_eq!(kind.as_str().parse::<AdminActionKind>(), Ok(kind));
        }
        assert_eq!(
            serde_json::to_string(&AdminActionKind::SystemSettingUpdated).unwrap(),
            "\"SYSTEM_SETTING_UPDATED\""
        );
    }
}
