//! Pool domain entity, its lifecycle state machine and creation spec.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::user::{User, UserSummary};
use crate::config::MAX_BASIS_POINTS;
use crate::errors::{AppError, AppResult};

/// Return structure of the underlying instrument
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InstrumentType {
    Discounted,
    InterestBearing,
}

impl InstrumentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            InstrumentType::Discounted => "DISCOUNTED",
            InstrumentType::InterestBearing => "INTEREST_BEARING",
        }
    }
}

impl FromStr for InstrumentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DISCOUNTED" => Ok(InstrumentType::Discounted),
            "INTEREST_BEARING" => Ok(InstrumentType::InterestBearing),
            other => Err(format!("Unknown instrument type: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
        }
    }
}

impl FromStr for RiskLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Low" => Ok(RiskLevel::Low),
            "Medium" => Ok(RiskLevel::Medium),
            "High" => Ok(RiskLevel::High),
            other => Err(format!("Unknown risk level: {}", other)),
        }
    }
}

/// Lifecycle status of a pool.
///
/// ```text
/// FUNDING -> PENDING_INVESTMENT -> INVESTED -> MATURED
///    \               \                \          \
///     `---------------`----------------`----------`--> EMERGENCY
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PoolStatus {
    Funding,
    PendingInvestment,
    Invested,
    Matured,
    Emergency,
}

impl PoolStatus {
    pub const ALL: [PoolStatus; 5] = [
        PoolStatus::Funding,
        PoolStatus::PendingInvestment,
        PoolStatus::Invested,
        PoolStatus::Matured,
        PoolStatus::Emergency,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PoolStatus::Funding => "FUNDING",
            PoolStatus::PendingInvestment => "PENDING_INVESTMENT",
            PoolStatus::Invested => "INVESTED",
            PoolStatus::Matured => "MATURED",
            PoolStatus::Emergency => "EMERGENCY",
        }
    }

    /// Statuses reachable from this one along the lifecycle arrows.
    pub fn allowed_next(&self) -> &'static [PoolStatus] {
        match self {
            PoolStatus::Funding => &[PoolStatus::PendingInvestment, PoolStatus::Emergency],
            PoolStatus::PendingInvestment => &[PoolStatus::Invested, PoolStatus::Emergency],
            PoolStatus::Invested => &[PoolStatus::Matured, PoolStatus::Emergency],
            PoolStatus::Matured => &[PoolStatus::Emergency],
            PoolStatus::Emergency => &[],
        }
    }

    pub fn can_transition_to(&self, next: PoolStatus) -> bool {
        self.allowed_next().contains(&next)
    }
}

impl FromStr for PoolStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PoolStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("Unknown pool status: {}", s))
    }
}

impl std::fmt::Display for PoolStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether status changes must follow the lifecycle arrows.
///
/// `Permissive` lets an admin set any status from any status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TransitionPolicy {
    #[default]
    Permissive,
    Strict,
}

impl TransitionPolicy {
    pub fn check(&self, from: PoolStatus, to: PoolStatus) -> AppResult<()> {
        match self {
            TransitionPolicy::Permissive => Ok(()),
            TransitionPolicy::Strict if from.can_transition_to(to) => Ok(()),
            TransitionPolicy::Strict => Err(AppError::InvalidTransition { from, to }),
        }
    }
}

impl FromStr for TransitionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "permissive" => Ok(TransitionPolicy::Permissive),
            "strict" => Ok(TransitionPolicy::Strict),
            other => Err(format!(
                "POOL_TRANSITION_POLICY must be 'permissive' or 'strict', got '{}'",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApprovalStatus {
    Pending,
    Approved,
    Rejected,
}

impl ApprovalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApprovalStatus::Pending => "PENDING",
            ApprovalStatus::Approved => "APPROVED",
            ApprovalStatus::Rejected => "REJECTED",
        }
    }
}

impl FromStr for ApprovalStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(ApprovalStatus::Pending),
            "APPROVED" => Ok(ApprovalStatus::Approved),
            "REJECTED" => Ok(ApprovalStatus::Rejected),
            other => Err(format!("Unknown approval status: {}", other)),
        }
    }
}

/// Parse a decimal-as-string amount. Negative or malformed input yields `None`.
pub fn parse_amount(raw: &str) -> Option<Decimal> {
    Decimal::from_str(raw.trim())
        .ok()
        .filter(|amount| !amount.is_sign_negative())
}

/// Pool domain entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Pool {
    pub id: Uuid,
    pub contract_address: String,
    pub manager_address: String,
    pub escrow_address: String,
    pub name: String,
    pub symbol: Option<String>,
    pub asset: Option<String>,
    pub issuer: Option<String>,
    pub description: Option<String>,
    pub risk_level: Option<RiskLevel>,
    pub instrument_type: InstrumentType,
    pub target_raise: String,
    pub total_raised: String,
    pub actual_invested: Option<String>,
    pub min_investment: Option<String>,
    /// Basis points, DISCOUNTED instruments only
    pub discount_rate: Option<u32>,
    /// Basis points, parallel to `coupon_dates`
    pub coupon_rates: Vec<u32>,
    pub coupon_dates: Vec<DateTime<Utc>>,
    pub epoch_end_time: DateTime<Utc>,
    pub maturity_date: DateTime<Utc>,
    pub status: PoolStatus,
    pub approval_status: ApprovalStatus,
    pub created_by: Uuid,
    pub approved_by: Option<Uuid>,
    pub rejection_reason: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Pool {
    /// Build a pool created directly by an admin: funding, pre-approved, active.
    pub fn created_by_admin(spec: NewPool, admin: &User) -> Self {
        let mut pool = Self::from_spec(spec, admin.id);
        pool.approval_status = ApprovalStatus::Approved;
        pool.approved_by = Some(admin.id);
        pool.is_active = true;
        pool
    }

    /// Build a pool submitted by a user, awaiting admin review.
    pub fn submitted_by(spec: NewPool, user: &User) -> Self {
        Self::from_spec(spec, user.id)
    }

    fn from_spec(spec: NewPool, creator: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            contract_address: spec.contract_address,
            manager_address: spec.manager_address,
            escrow_address: spec.escrow_address,
            name: spec.name,
            symbol: spec.symbol,
            asset: spec.asset,
            issuer: spec.issuer,
            description: spec.description,
            risk_level: spec.risk_level,
            instrument_type: spec.instrument_type,
            target_raise: spec.target_raise,
            total_raised: "0".to_string(),
            actual_invested: None,
            min_investment: spec.min_investment,
            discount_rate: spec.discount_rate,
            coupon_rates: spec.coupon_rates,
            coupon_dates: spec.coupon_dates,
            epoch_end_time: spec.epoch_end_time,
            maturity_date: spec.maturity_date,
            status: PoolStatus::Funding,
            approval_status: ApprovalStatus::Pending,
            created_by: creator,
            approved_by: None,
            rejection_reason: None,
            is_active: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Record an approval decision. The rejection reason is kept only on rejection.
    pub fn decide_approval(&mut self, approved: bool, admin_id: Uuid, reason: Option<String>) {
        if approved {
            self.approval_status = ApprovalStatus::Approved;
            self.rejection_reason = None;
        } else {
            self.approval_status = ApprovalStatus::Rejected;
            self.rejection_reason = reason;
        }
        self.approved_by = Some(admin_id);
        self.touch();
    }

    /// Set a new status, returning the previous one.
    pub fn set_status(&mut self, status: PoolStatus) -> PoolStatus {
        let previous = std::mem::replace(&mut self.status, status);
        self.touch();
        previous
    }

    pub fn confirm_investment(&mut self, actual_invested: String) {
        self.actual_invested = Some(actual_invested);
        self.status = PoolStatus::Invested;
        self.touch();
    }

    /// Flip the activity gate, returning the new value.
    pub fn toggle_active(&mut self) -> bool {
        self.is_active = !self.is_active;
        self.touch();
        self.is_active
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Lifecycle columns one admin mutation changed on a pool.
///
/// `None` means "leave the stored value alone", so concurrent mutations of
/// different columns on the same pool do not overwrite each other.
#[derive(Debug, Clone, PartialEq)]
pub struct PoolChanges {
    pub id: Uuid,
    pub status: Option<PoolStatus>,
    pub approval_status: Option<ApprovalStatus>,
    pub approved_by: Option<Option<Uuid>>,
    pub rejection_reason: Option<Option<String>>,
    pub actual_invested: Option<Option<String>>,
    pub is_active: Option<bool>,
    pub updated_at: DateTime<Utc>,
}

fn changed<T: PartialEq + Clone>(before: &T, after: &T) -> Option<T> {
    (before != after).then(|| after.clone())
}

impl PoolChanges {
    pub fn between(before: &Pool, after: &Pool) -> Self {
        Self {
            id: after.id,
            status: changed(&before.status, &after.status),
            approval_status: changed(&before.approval_status, &after.approval_status),
            approved_by: changed(&before.approved_by, &after.approved_by),
            rejection_reason: changed(&before.rejection_reason, &after.rejection_reason),
            actual_invested: changed(&before.actual_invested, &after.actual_invested),
            is_active: changed(&before.is_active, &after.is_active),
            updated_at: after.updated_at,
        }
    }

    /// Overlay the changed columns onto a stored pool.
    pub fn apply_to(&self, pool: &mut Pool) {
        if let Some(status) = self.status {
            pool.status = status;
        }
        if let Some(approval) = self.approval_status {
            pool.approval_status = approval;
        }
        if let Some(approved_by) = self.approved_by {
            pool.approved_by = approved_by;
        }
        if let Some(reason) = &self.rejection_reason {
            pool.rejection_reason = reason.clone();
        }
        if let Some(invested) = &self.actual_invested {
            pool.actual_invested = invested.clone();
        }
        if let Some(active) = self.is_active {
            pool.is_active = active;
        }
        pool.updated_at = self.updated_at;
    }
}

/// Pool creation spec, shared by the admin and user-submission paths
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewPool {
    pub contract_address: String,
    pub manager_address: String,
    pub escrow_address: String,
    pub name: String,
    pub symbol: Option<String>,
    pub asset: Option<String>,
    pub issuer: Option<String>,
    pub description: Option<String>,
    pub risk_level: Option<RiskLevel>,
    pub instrument_type: InstrumentType,
    pub target_raise: String,
    pub min_investment: Option<String>,
    pub discount_rate: Option<u32>,
    #[serde(default)]
    pub coupon_rates: Vec<u32>,
    #[serde(default)]
    pub coupon_dates: Vec<DateTime<Utc>>,
    pub epoch_end_time: DateTime<Utc>,
    pub maturity_date: DateTime<Utc>,
}

impl NewPool {
    /// Check the structural invariants of a pool before it is stored.
    pub fn ensure_valid(&self) -> AppResult<()> {
        if self.name.trim().is_empty() {
            return Err(AppError::validation("Pool name is required"));
        }
        if self.contract_address.trim().is_empty() {
            return Err(AppError::validation("Contract address is required"));
        }
        if self.maturity_date <= self.epoch_end_time {
            return Err(AppError::validation(
                "Maturity date must be after the epoch end time",
            ));
        }
        if parse_amount(&self.target_raise).is_none() {
            return Err(AppError::validation(
                "Target raise must be a non-negative decimal amount",
            ));
        }
        if let Some(min) = &self.min_investment {
            if parse_amount(min).is_none() {
                return Err(AppError::validation(
                    "Minimum investment must be a non-negative decimal amount",
                ));
            }
        }
        let over_cap = |rate: &u32| *rate > MAX_BASIS_POINTS;
        if self.discount_rate.as_ref().is_some_and(over_cap) || self.coupon_rates.iter().any(over_cap) {
            return Err(AppError::validation(format!(
                "Discount and coupon rates are basis points and may not exceed {}",
                MAX_BASIS_POINTS
            )));
        }
        if self.coupon_rates.len() != self.coupon_dates.len() {
            return Err(AppError::validation(
                "Coupon rates and coupon dates must have the same length",
            ));
        }
        match self.instrument_type {
            InstrumentType::Discounted if self.discount_rate.is_none() => Err(
                AppError::validation("Discounted instruments require a discount rate"),
            ),
            InstrumentType::InterestBearing if self.coupon_rates.is_empty() => Err(
                AppError::validation("Interest-bearing instruments require at least one coupon"),
            ),
            _ => Ok(()),
        }
    }
}

/// Pool joined with the display fields of its creator and approver
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PoolWithActors {
    #[serde(flatten)]
    pub pool: Pool,
    pub creator: Option<UserSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approver: Option<UserSummary>,
}

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::Duration;

    use super::*;

    pub fn discounted_spec(contract: &str) -> NewPool {
        let epoch_end = Utc::now() + Duration::days(30);
        NewPool {
            contract_address: contract.to_string(),
            manager_address: "0x1111111111111111111111111111111111111111".to_string(),
            escrow_address: "0x2222222222222222222222222222222222222222".to_string(),
            name: "3M Treasury Bill".to_string(),
            symbol: Some("TB3M".to_string()),
            asset: Some("USDC".to_string()),
            issuer: Some("US Treasury".to_string()),
            description: None,
            risk_level: Some(RiskLevel::Low),
            instrument_type: InstrumentType::Discounted,
            target_raise: "1000000".to_string(),
            min_investment: Some("100".to_string()),
            discount_rate: Some(450),
            coupon_rates: Vec::new(),
            coupon_dates: Vec::new(),
            epoch_end_time: epoch_end,
            maturity_date: epoch_end + Duration::days(90),
        }
    }
}
