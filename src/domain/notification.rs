//! User-facing notifications.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationKind {
    PoolApproved,
    PoolRejected,
    InvestmentMatured,
    CouponReceived,
    EmergencyAlert,
    SystemAnnouncement,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::PoolApproved => "POOL_APPROVED",
            NotificationKind::PoolRejected => "POOL_REJECTED",
            NotificationKind::InvestmentMatured => "INVESTMENT_MATURED",
            NotificationKind::CouponReceived => "COUPON_RECEIVED",
            NotificationKind::EmergencyAlert => "EMERGENCY_ALERT",
            NotificationKind::SystemAnnouncement => "SYSTEM_ANNOUNCEMENT",
        }
    }
}

impl FromStr for NotificationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "POOL_APPROVED" => Ok(NotificationKind::PoolApproved),
            "POOL_REJECTED" => Ok(NotificationKind::PoolRejected),
            "INVESTMENT_MATURED" => Ok(NotificationKind::InvestmentMatured),
            "COUPON_RECEIVED" => Ok(NotificationKind::CouponReceived),
            "EMERGENCY_ALERT" => Ok(NotificationKind::EmergencyAlert),
            "SYSTEM_ANNOUNCEMENT" => Ok(NotificationKind::SystemAnnouncement),
            other => Err(format!("Unknown notification type: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub is_read: bool,
    #[schema(value_type = Option<Object>)]
    pub metadata: Option<Value>,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    /// Build an unread notification addressed to `spec.user_id`.
    pub fn new(spec: NewNotification) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: spec.user_id,
            kind: spec.kind,
            title: spec.title,
            message: spec.message,
            is_read: false,
            metadata: spec.metadata,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewNotification {
    pub user_id: Uuid,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    #[schema(value_type = Option<Object>)]
    pub metadata: Option<Value>,
}
