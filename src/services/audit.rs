//! Mutate-and-audit helpers.
//!
//! Every admin mutation builds one [`ChangeSet`] and hands it to
//! [`commit_audited`], so no mutation can skip its audit record.

use serde_json::{Map, Value};

use crate::domain::{ActionDetails, AdminAction, AdminActionKind, TargetType, User};
use crate::errors::AppResult;
use crate::infra::{ChangeSet, EntityWrite, UnitOfWork};

/// Build the audit record for `admin` acting on one target.
pub(crate) fn audit_entry(
    admin: &User,
    action: AdminActionKind,
    target_type: TargetType,
    target_id: impl Into<String>,
    details: ActionDetails,
) -> AdminAction {
    AdminAction::new(admin.id, action, target_type, target_id, details)
}

/// Commit the entity write together with its audit record.
pub(crate) async fn commit_audited<U: UnitOfWork + ?Sized>(
    uow: &U,
    write: EntityWrite,
    audit: AdminAction,
    notification: Option<crate::domain::Notification>,
) -> AppResult<()> {
    let admin_id = audit.admin_id;
    let action = audit.action;
    let target_id = audit.target_id.clone();

    uow.commit(ChangeSet::new(write, audit).notify(notification))
        .await?;

    tracing::info!(%admin_id, %action, %target_id, "admin action recorded");
    Ok(())
}

/// Build a JSON object from string pairs for audit metadata.
pub(crate) fn metadata<const N: usize>(pairs: [(&str, Value); N]) -> Value {
    Value::Object(
        pairs
            .into_iter()
            .map(|(key, value)| (key.to_string(), value))
            .collect::<Map<String, Value>>(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn metadata_builds_a_flat_object() {
        let value = metadata([
            ("actualInvested", json!("950000")),
            ("proofHash", json!("0xProof")),
        ]);
        assert_eq!(value, json!({"actualInvested": "950000", "proofHash": "0xProof"}));
    }
}
