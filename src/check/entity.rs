use chrono::{DateTime, NaiveDate, Utc};
use derive_builder::Builder;
use serde::Serialize;

use crate::{checkbook::Numbering, primitives::*};

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Check {
    pub id: CheckId,
    pub checkbook_id: CheckbookId,
    pub account_id: AccountId,
    pub number: CheckNumber,
    pub date: NaiveDate,
    pub beneficiary: String,
    pub amount: Decimal,
    pub concept: String,
    pub status: CheckStatus,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

impl Check {
    /// Moves the check to `status` and reports how the account balance has
    /// to follow.
    pub fn transition_to(&mut self, status: CheckStatus) -> StatusChange {
        let change = StatusChange {
            check_id: self.id,
            previous: self.status,
            current: status,
            adjustment: self.status.balance_adjustment(status, self.amount),
        };
        self.status = status;
        change
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusChange {
    pub check_id: CheckId,
    pub previous: CheckStatus,
    pub current: CheckStatus,
    pub adjustment: Decimal,
}

impl StatusChange {
    pub fn is_noop(&self) -> bool {
        self.previous == self.current
    }
}

/// Caller input for issuing a check against an account.
#[derive(Debug, Clone)]
pub struct CheckRequest {
    pub account_id: AccountId,
    pub date: NaiveDate,
    pub beneficiary: String,
    pub amount: Decimal,
    pub concept: String,
    pub numbering: Numbering,
}

impl CheckRequest {
    pub fn validate(&self) -> Result<(), String> {
        if self.beneficiary.trim().is_empty() {
            return Err("beneficiary is required".to_string());
        }
        if self.amount <= Decimal::ZERO {
            return Err("amount must be greater than zero".to_string());
        }
        validate_amount(self.amount)
    }
}

#[derive(Builder, Clone, Debug)]
pub struct NewCheck {
    #[builder(setter(skip), default = "CheckId::new()")]
    pub(super) id: CheckId,
    pub(super) checkbook_id: CheckbookId,
    pub(super) account_id: AccountId,
    pub(super) number: CheckNumber,
    pub(super) date: NaiveDate,
    #[builder(setter(into))]
    pub(super) beneficiary: String,
    pub(super) amount: Decimal,
    #[builder(setter(into), default)]
    pub(super) concept: String,
}

impl NewCheck {
    pub fn builder() -> NewCheckBuilder {
        NewCheckBuilder::default()
    }
}

#[derive(Debug, Default, Clone)]
pub struct CheckDetailsUpdate {
    pub date: Option<NaiveDate>,
    pub beneficiary: Option<String>,
    pub concept: Option<String>,
}

impl CheckDetailsUpdate {
    pub fn validate(&self) -> Result<(), String> {
        if let Some(beneficiary) = self.beneficiary.as_ref() {
            if beneficiary.trim().is_empty() {
                return Err("beneficiary cannot be empty".to_string());
            }
        }
        Ok(())
    }
}

#[derive(Debug, Default, Clone)]
pub struct CheckFilter {
    pub account_id: Option<AccountId>,
    pub checkbook_id: Option<CheckbookId>,
    pub status: Option<CheckStatus>,
    pub beneficiary: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct IssuedCheck {
    pub check: Check,
    pub balance: Decimal,
}
