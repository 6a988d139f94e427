//! Admin service integration tests: roles, settings, dashboard and audit log.

mod common;

use std::sync::Arc;

use serde_json::json;

use common::{caller, discounted_pool, MemoryStore};
use pool_governance::domain::{
    ActionDetails, AdminAction, AdminActionKind, PoolStatus, TargetType, TransitionPolicy,
    UserChanges, UserRole,
};
use pool_governance::errors::AppError;
use pool_governance::infra::{ChangeSet, EntityWrite, UnitOfWork};
use pool_governance::services::{
    AdminManager, AdminService, PoolManager, PoolService, UserManager, UserService,
};
use pool_governance::types::PageParams;

fn services(store: &Arc<MemoryStore>) -> (AdminManager<MemoryStore>, PoolManager<MemoryStore>) {
    (
        AdminManager::new(store.clone(), 50),
        PoolManager::new(store.clone(), TransitionPolicy::Permissive),
    )
}

#[tokio::test]
async fn admins_cannot_grant_super_admin() {
    let store = MemoryStore::new();
    let admin = store.seed_user("admin", UserRole::Admin);
    let target = store.seed_user("target", UserRole::User);
    let (admin_service, _) = services(&store);

    let result = admin_service
        .update_role(&caller(&admin), target.id, UserRole::SuperAdmin, None)
        .await;

    assert!(matches!(result, Err(AppError::Unauthorized(_))));
    assert_eq!(store.user(target.id).unwrap().role, UserRole::User);
    assert!(store.actions().is_empty());
}

#[tokio::test]
async fn super_admin_grants_super_admin_with_audit() {
    let store = MemoryStore::new();
    let root = store.seed_user("root", UserRole::SuperAdmin);
    let target = store.seed_user("target", UserRole::User);
    let (admin_service, _) = services(&store);

    admin_service
        .update_role(
            &caller(&root),
            target.id,
            UserRole::SuperAdmin,
            Some(vec!["pools:write".into()]),
        )
        .await
        .unwrap();

    let updated = store.user(target.id).unwrap();
    assert_eq!(updated.role, UserRole::SuperAdmin);
    assert_eq!(updated.permissions, Some(vec!["pools:write".to_string()]));

    let action = store.actions().pop().unwrap();
    assert_eq!(action.action, AdminActionKind::UserRoleChanged);
    assert_eq!(action.target_type, TargetType::User);
    assert_eq!(action.target_id, target.id.to_string());
    assert_eq!(action.details.old_value.as_deref(), Some("USER"));
    assert_eq!(action.details.new_value.as_deref(), Some("SUPER_ADMIN"));
    assert_eq!(
        action.details.reason.as_deref(),
        Some("Role changed from USER to SUPER_ADMIN")
    );
}

#[tokio::test]
async fn admin_may_promote_to_admin() {
    let store = MemoryStore::new();
    let admin = store.seed_user("admin", UserRole::Admin);
    let target = store.seed_user("target", UserRole::User);
    let (admin_service, _) = services(&store);

    admin_service
        .update_role(&caller(&admin), target.id, UserRole::Admin, None)
        .await
        .unwrap();

    assert_eq!(store.user(target.id).unwrap().role, UserRole::Admin);
    assert_eq!(store.actions().len(), 1);
}

#[tokio::test]
async fn role_change_from_a_stale_read_keeps_a_freshly_linked_wallet() {
    let store = MemoryStore::new();
    let admin = store.seed_user("admin", UserRole::Admin);
    let target = store.seed_user("target", UserRole::User);
    let wallet = "0x52908400098527886E0F7030069857D2E4169EE7";

    // The role change is computed from a read taken before the wallet link
    let read = store.user(target.id).unwrap();
    UserManager::new(store.clone())
        .update_wallet(&caller(&target), wallet.into())
        .await
        .unwrap();

    let mut promoted = read.clone();
    promoted.update_role(UserRole::Admin, None);
    let audit = AdminAction::new(
        admin.id,
        AdminActionKind::UserRoleChanged,
        TargetType::User,
        target.id.to_string(),
        ActionDetails::default(),
    );
    let write = EntityWrite::UpdateUser(UserChanges::between(&read, &promoted));
    store.commit(ChangeSet::new(write, audit)).await.unwrap();

    let stored = store.user(target.id).unwrap();
    assert_eq!(stored.role, UserRole::Admin);
    assert_eq!(stored.wallet_address.as_deref(), Some(wallet));
}

#[tokio::test]
async fn role_change_for_missing_user_is_not_found() {
    let store = MemoryStore::new();
    let admin = store.seed_user("admin", UserRole::Admin);
    let (admin_service, _) = services(&store);

    let result = admin_service
        .update_role(&caller(&admin), uuid::Uuid::new_v4(), UserRole::Admin, None)
        .await;

    assert!(matches!(result, Err(AppError::NotFound(_))));
    assert!(store.actions().is_empty());
}

#[tokio::test]
async fn settings_are_upserted_by_key_and_audited() {
    let store = MemoryStore::new();
    let root = store.seed_user("root", UserRole::SuperAdmin);
    let (admin_service, _) = services(&store);

    let first = admin_service
        .update_system_setting(
            &caller(&root),
            "maintenance_mode".into(),
            json!(false),
            Some("Blocks investor actions".into()),
        )
        .await
        .unwrap();
    let second = admin_service
        .update_system_setting(&caller(&root), "maintenance_mode".into(), json!(true), None)
        .await
        .unwrap();

    assert_eq!(first, second);
    let setting = store.setting("maintenance_mode").unwrap();
    assert_eq!(setting.value, json!(true));
    assert_eq!(setting.description.as_deref(), Some("Blocks investor actions"));
    assert_eq!(setting.updated_by, root.id);

    let actions = store.actions();
    assert_eq!(actions.len(), 2);
    assert!(actions
        .iter()
        .all(|a| a.action == AdminActionKind::SystemSettingUpdated
            && a.target_type == TargetType::SystemSetting
            && a.target_id == "maintenance_mode"));
    assert_eq!(actions[1].details.old_value.as_deref(), Some("false"));
    assert_eq!(actions[1].details.new_value.as_deref(), Some("true"));

    let listed = admin_service.get_system_settings(&caller(&root)).await.unwrap();
    assert_eq!(listed.len(), 1);
}

#[tokio::test]
async fn settings_require_super_admin() {
    let store = MemoryStore::new();
    let admin = store.seed_user("admin", UserRole::Admin);
    let (admin_service, _) = services(&store);

    let write = admin_service
        .update_system_setting(&caller(&admin), "fee_bps".into(), json!(25), None)
        .await;
    let read = admin_service.get_system_settings(&caller(&admin)).await;

    assert!(matches!(write, Err(AppError::Unauthorized(_))));
    assert!(matches!(read, Err(AppError::Unauthorized(_))));
    assert!(store.setting("fee_bps").is_none());
}

#[tokio::test]
async fn dashboard_aggregates_pools_and_users() {
    let store = MemoryStore::new();
    let admin = store.seed_user("admin", UserRole::Admin);
    let issuer = store.seed_user("issuer", UserRole::User);
    let (admin_service, pools) = services(&store);

    let funded = pools
        .create_pool(&caller(&admin), discounted_pool("0xA1"))
        .await
        .unwrap();
    pools
        .submit_pool(&caller(&issuer), discounted_pool("0xB2"))
        .await
        .unwrap();
    pools
        .update_pool_status(&caller(&admin), funded, PoolStatus::Invested, None)
        .await
        .unwrap();

    let mut pool = store.pool(funded);
    pool.total_raised = "1250.50".into();
    store.put_pool(pool);

    let stats = admin_service.get_dashboard_stats(&caller(&admin)).await.unwrap();
    assert_eq!(stats.total_pools, 2);
    assert_eq!(stats.active_pools, 1);
    assert_eq!(stats.total_users, 2);
    assert_eq!(stats.pending_approvals, 1);
    assert_eq!(stats.status_counts["INVESTED"], 1);
    assert_eq!(stats.status_counts["FUNDING"], 1);
    assert_eq!(stats.status_counts["EMERGENCY"], 0);
    assert_eq!(stats.total_value_locked, "1250.5");
}

#[tokio::test]
async fn pending_approvals_join_the_creator() {
    let store = MemoryStore::new();
    let admin = store.seed_user("admin", UserRole::Admin);
    let issuer = store.seed_user("issuer", UserRole::User);
    let (admin_service, pools) = services(&store);

    pools
        .create_pool(&caller(&admin), discounted_pool("0xA1"))
        .await
        .unwrap();
    let submitted = pools
        .submit_pool(&caller(&issuer), discounted_pool("0xB2"))
        .await
        .unwrap();

    let pending = admin_service.get_pending_approvals(&caller(&admin)).await.unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].pool.id, submitted);
    assert_eq!(pending[0].creator.as_ref().unwrap().email, issuer.email);
    assert!(pending[0].approver.is_none());

    let all = admin_service.get_all_pools_for_admin(&caller(&admin)).await.unwrap();
    assert_eq!(all.len(), 2);
}

#[tokio::test]
async fn admin_actions_are_paged_newest_first_with_admin_details() {
    let store = MemoryStore::new();
    let admin = store.seed_user("admin", UserRole::Admin);
    let (admin_service, pools) = services(&store);

    let pool_id = pools
        .create_pool(&caller(&admin), discounted_pool("0xA1"))
        .await
        .unwrap();
    for _ in 0..4 {
        pools
            .toggle_pool_active(&caller(&admin), pool_id, None)
            .await
            .unwrap();
    }

    let first = admin_service
        .get_admin_actions(&caller(&admin), PageParams::new(0, 2))
        .await
        .unwrap();
    assert_eq!(first.len(), 2);
    assert_eq!(first[0].action.action, AdminActionKind::PoolActivated);
    assert_eq!(first[1].action.action, AdminActionKind::PoolPaused);
    assert_eq!(first[0].admin.as_ref().unwrap().email, admin.email);

    let rest = admin_service
        .get_admin_actions(&caller(&admin), PageParams::new(4, 2))
        .await
        .unwrap();
    assert_eq!(rest.len(), 1);
    assert_eq!(rest[0].action.action, AdminActionKind::PoolApproved);
}

#[tokio::test]
async fn user_lookups_are_admin_only() {
    let store = MemoryStore::new();
    let admin = store.seed_user("admin", UserRole::Admin);
    let user = store.seed_user("investor", UserRole::User);
    let (admin_service, _) = services(&store);

    let found = admin_service
        .get_user_by_email(&caller(&admin), &user.email)
        .await
        .unwrap();
    assert_eq!(found.id, user.id);

    let missing = admin_service
        .get_user_by_wallet(&caller(&admin), "0x0000000000000000000000000000000000000000")
        .await;
    assert!(matches!(missing, Err(AppError::NotFound(_))));

    let denied = admin_service.list_users(&caller(&user)).await;
    assert!(matches!(denied, Err(AppError::Unauthorized(_))));

    let admins = admin_service.list_admins(&caller(&admin)).await.unwrap();
    assert_eq!(admins.len(), 1);
    assert_eq!(admins[0].id, admin.id);
}

#[tokio::test]
async fn target_history_is_scoped_to_one_entity() {
    let store = MemoryStore::new();
    let admin = store.seed_user("admin", UserRole::Admin);
    let plain = store.seed_user("plain", UserRole::User);
    let (admin_service, pools) = services(&store);

    let first = pools
        .create_pool(&caller(&admin), discounted_pool("0xA1"))
        .await
        .unwrap();
    let second = pools
        .create_pool(&caller(&admin), discounted_pool("0xB2"))
        .await
        .unwrap();
    pools
        .toggle_pool_active(&caller(&admin), first, None)
        .await
        .unwrap();
    pools
        .toggle_pool_active(&caller(&admin), second, None)
        .await
        .unwrap();

    let history = admin_service
        .get_target_history(&caller(&admin), TargetType::Pool, first.to_string())
        .await
        .unwrap();
    assert_eq!(history.len(), 2);
    assert!(history.iter().all(|view| view.action.target_id == first.to_string()));
    assert_eq!(history[0].action.action, AdminActionKind::PoolPaused);
    assert_eq!(history[1].action.action, AdminActionKind::PoolApproved);
    assert_eq!(history[0].admin.as_ref().unwrap().email, admin.email);

    let none = admin_service
        .get_target_history(&caller(&admin), TargetType::User, first.to_string())
        .await
        .unwrap();
    assert!(none.is_empty());

    let denied = admin_service
        .get_target_history(&caller(&plain), TargetType::Pool, first.to_string())
        .await;
    assert!(matches!(denied, Err(AppError::Unauthorized(_))));
}
