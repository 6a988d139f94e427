//! OpenAPI documentation configuration.
//!
//! Provides Swagger UI for API exploration and testing.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::api::handlers::{admin_handler, notification_handler, pool_handler, user_handler};
use crate::domain::{
    ActionDetails, AdminAccess, AdminAction, AdminActionKind, AdminActionView, ApprovalStatus,
    InstrumentType, NewPool, Notification, NotificationKind, Pool, PoolStatus, PoolWithActors,
    RiskLevel, SystemSetting, TargetType, UserResponse, UserRole, UserSummary,
};
use crate::services::DashboardStats;
use crate::types::{CountResponse, IdResponse};

/// OpenAPI documentation for the pool governance service
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Pool Governance API",
        version = "0.1.0",
        description = "Pool lifecycle, admin audit trail and notifications for a tokenized money-market platform",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "http://localhost:3000", description = "Local development server")
    ),
    paths(
        // Account endpoints
        user_handler::sync_user,
        user_handler::get_current_user,
        user_handler::update_profile,
        user_handler::update_wallet,
        user_handler::remove_wallet,
        user_handler::delete_account,
        user_handler::check_admin_access,
        // Pool endpoints
        pool_handler::list_pools,
        pool_handler::get_pool,
        pool_handler::submit_pool,
        // Admin endpoints
        admin_handler::create_pool,
        admin_handler::approve_pool,
        admin_handler::update_pool_status,
        admin_handler::confirm_investment,
        admin_handler::emergency_action,
        admin_handler::toggle_pool_active,
        admin_handler::list_all_pools,
        admin_handler::pending_approvals,
        admin_handler::dashboard_stats,
        admin_handler::admin_actions,
        admin_handler::list_users,
        admin_handler::lookup_user,
        admin_handler::list_admins,
        admin_handler::update_role,
        admin_handler::list_settings,
        admin_handler::update_setting,
        // Notification endpoints
        notification_handler::list_notifications,
        notification_handler::unread_count,
        notification_handler::create_notification,
        notification_handler::mark_as_read,
        notification_handler::mark_all_as_read,
        notification_handler::delete_notification,
    ),
    components(
        schemas(
            // Domain types
            UserRole,
            UserResponse,
            UserSummary,
            AdminAccess,
            Pool,
            PoolStatus,
            ApprovalStatus,
            InstrumentType,
            RiskLevel,
            NewPool,
            PoolWithActors,
            AdminAction,
            AdminActionKind,
            AdminActionView,
            ActionDetails,
            TargetType,
            Notification,
            NotificationKind,
            SystemSetting,
            DashboardStats,
            // Shared response types
            IdResponse,
            CountResponse,
            // Request bodies
            user_handler::SyncUserRequest,
            user_handler::UpdateProfileRequest,
            user_handler::UpdateWalletRequest,
            admin_handler::ApprovalRequest,
            admin_handler::StatusUpdateRequest,
            admin_handler::InvestmentConfirmationRequest,
            admin_handler::EmergencyRequest,
            admin_handler::ToggleActiveRequest,
            admin_handler::RoleUpdateRequest,
            admin_handler::SettingUpdateRequest,
            notification_handler::CreateNotificationRequest,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Account", description = "Sign-in sync and self-service account operations"),
        (name = "Pools", description = "Pool catalogue and submissions"),
        (name = "Admin", description = "Pool governance, roles, settings and audit log"),
        (name = "Notifications", description = "Per-user notification inbox")
    )
)]
pub struct ApiDoc;

/// Security scheme modifier for identity-provider bearer tokens
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Token issued by the identity provider"))
                        .build(),
                ),
            );
        }
    }
}
