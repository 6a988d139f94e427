//! Pool database entity for SeaORM.

use sea_orm::entity::prelude::*;
use sea_orm::ActiveValue::{Set, Unchanged};

use crate::domain::{Pool, PoolChanges};
use crate::errors::AppError;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "pools")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub contract_address: String,
    pub manager_address: String,
    pub escrow_address: String,
    pub name: String,
    pub symbol: Option<String>,
    pub asset: Option<String>,
    pub issuer: Option<String>,
    pub description: Option<String>,
    pub risk_level: Option<String>,
    pub instrument_type: String,
    pub target_raise: String,
    pub total_raised: String,
    pub actual_invested: Option<String>,
    pub min_investment: Option<String>,
    pub discount_rate: Option<i32>,
    pub coupon_rates: Json,
    pub coupon_dates: Json,
    pub epoch_end_time: DateTimeUtc,
    pub maturity_date: DateTimeUtc,
    pub status: String,
    pub approval_status: String,
    pub created_by: Uuid,
    pub approved_by: Option<Uuid>,
    pub rejection_reason: Option<String>,
    pub is_active: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

fn corrupt(column: &str, err: impl std::fmt::Display) -> AppError {
    AppError::internal(format!("Corrupt pool column {}: {}", column, err))
}

impl TryFrom<Model> for Pool {
    type Error = AppError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Pool {
            id: model.id,
            contract_address: model.contract_address,
            manager_address: model.manager_address,
            escrow_address: model.escrow_address,
            name: model.name,
            symbol: model.symbol,
            asset: model.asset,
            issuer: model.issuer,
            description: model.description,
            risk_level: model
                .risk_level
                .map(|level| level.parse())
                .transpose()
                .map_err(|e| corrupt("risk_level", e))?,
            instrument_type: model
                .instrument_type
                .parse()
                .map_err(|e| corrupt("instrument_type", e))?,
            target_raise: model.target_raise,
            total_raised: model.total_raised,
            actual_invested: model.actual_invested,
            min_investment: model.min_investment,
            discount_rate: model
                .discount_rate
                .map(u32::try_from)
                .transpose()
                .map_err(|e| corrupt("discount_rate", e))?,
            coupon_rates: serde_json::from_value(model.coupon_rates)
                .map_err(|e| corrupt("coupon_rates", e))?,
            coupon_dates: serde_json::from_value(model.coupon_dates)
                .map_err(|e| corrupt("coupon_dates", e))?,
            epoch_end_time: model.epoch_end_time,
            maturity_date: model.maturity_date,
            status: model.status.parse().map_err(|e| corrupt("status", e))?,
            approval_status: model
                .approval_status
                .parse()
                .map_err(|e| corrupt("approval_status", e))?,
            created_by: model.created_by,
            approved_by: model.approved_by,
            rejection_reason: model.rejection_reason,
            is_active: model.is_active,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

/// Full-row active model for inserts
impl TryFrom<&Pool> for ActiveModel {
    type Error = AppError;

    fn try_from(pool: &Pool) -> Result<Self, Self::Error> {
        let discount_rate = pool
            .discount_rate
            .map(i32::try_from)
            .transpose()
            .map_err(|_| AppError::validation("Discount rate out of range"))?;

        Ok(ActiveModel {
            id: Set(pool.id),
            contract_address: Set(pool.contract_address.clone()),
            manager_address: Set(pool.manager_address.clone()),
            escrow_address: Set(pool.escrow_address.clone()),
            name: Set(pool.name.clone()),
            symbol: Set(pool.symbol.clone()),
            asset: Set(pool.asset.clone()),
            issuer: Set(pool.issuer.clone()),
            description: Set(pool.description.clone()),
            risk_level: Set(pool.risk_level.map(|level| level.as_str().to_string())),
            instrument_type: Set(pool.instrument_type.as_str().to_string()),
            target_raise: Set(pool.target_raise.clone()),
            total_raised: Set(pool.total_raised.clone()),
            actual_invested: Set(pool.actual_invested.clone()),
            min_investment: Set(pool.min_investment.clone()),
            discount_rate: Set(discount_rate),
            coupon_rates: Set(serde_json::json!(pool.coupon_rates)),
            coupon_dates: Set(serde_json::json!(pool.coupon_dates)),
            epoch_end_time: Set(pool.epoch_end_time),
            maturity_date: Set(pool.maturity_date),
            status: Set(pool.status.as_str().to_string()),
            approval_status: Set(pool.approval_status.as_str().to_string()),
            created_by: Set(pool.created_by),
            approved_by: Set(pool.approved_by),
            rejection_reason: Set(pool.rejection_reason.clone()),
            is_active: Set(pool.is_active),
            created_at: Set(pool.created_at),
            updated_at: Set(pool.updated_at),
        })
    }
}

/// Partial active model: only changed columns are `Set`, so the UPDATE
/// statement names nothing else.
impl From<&PoolChanges> for ActiveModel {
    fn from(changes: &PoolChanges) -> Self {
        let mut model = ActiveModel {
            id: Unchanged(changes.id),
            updated_at: Set(changes.updated_at),
            ..Default::default()
        };
        if let Some(status) = changes.status {
            model.status = Set(status.as_str().to_string());
        }
        if let Some(approval) = changes.approval_status {
            model.approval_status = Set(approval.as_str().to_string());
        }
        if let Some(approved_by) = changes.approved_by {
            model.approved_by = Set(approved_by);
        }
        if let Some(reason) = &changes.rejection_reason {
            model.rejection_reason = Set(reason.clone());
        }
        if let Some(invested) = &changes.actual_invested {
            model.actual_invested = Set(invested.clone());
        }
        if let Some(active) = changes.is_active {
            model.is_active = Set(active);
        }
        model
    }
}
