use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;

/// Global platform setting, unique by key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SystemSetting {
    pub id: Uuid,
    pub key: String,
    #[schema(value_type = Object)]
    pub value: Value,
    pub description: Option<String>,
    pub updated_by: Uuid,
    pub updated_at: DateTime<Utc>,
}

impl SystemSetting {
    pub fn new(key: String, value: Value, description: Option<String>, updated_by: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            key,
            value,
            description,
            updated_by,
            updated_at: Utc::now(),
        }
    }

    /// Patch value and description in place. A missing description keeps the old one.
    pub fn patch(&mut self, value: Value, description: Option<String>, updated_by: Uuid) {
        self.value = value;
        if description.is_some() {
            self.description = description;
        }
        self.updated_by = updated_by;
        self.updated_at = Utc::now();
    }
}
