use chrono::{DateTime, Utc};
use derive_builder::Builder;
use serde::Serialize;

use super::error::DepositError;
use crate::primitives::*;

pub const DEPOSIT_STATUS_COMPLETED: &str = "completed";

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Deposit {
    pub id: DepositId,
    pub account_id: AccountId,
    pub kind: DepositKind,
    pub amount: Decimal,
    pub description: String,
    pub reference: Option<String>,
    pub status: String,
    pub balance_before: Decimal,
    pub balance_after: Decimal,
    pub created_at: DateTime<Utc>,
}

/// Caller input for crediting an account.
#[derive(Debug, Clone)]
pub struct DepositRequest {
    pub account_id: AccountId,
    pub kind: DepositKind,
    pub amount: Decimal,
    pub description: String,
    pub reference: Option<String>,
}

#[derive(Builder, Clone, Debug)]
#[builder(build_fn(validate = "Self::validate"))]
pub struct NewDeposit {
    #[builder(setter(skip), default = "DepositId::new()")]
    pub(super) id: DepositId,
    pub(super) account_id: AccountId,
    #[builder(default)]
    pub(super) kind: DepositKind,
    pub(super) amount: Decimal,
    #[builder(setter(into), default)]
    pub(super) description: String,
    #[builder(setter(into, strip_option), default)]
    pub(super) reference: Option<String>,
    pub(super) balance_before: Decimal,
}

impl NewDeposit {
    pub fn builder() -> NewDepositBuilder {
        NewDepositBuilder::default()
    }

    pub fn balance_after(&self) -> Result<Decimal, DepositError> {
        self.balance_before
            .checked_add(self.amount)
            .filter(|balance| fits_amount_column(*balance))
            .ok_or(DepositError::BalanceOutOfRange {
                balance: self.balance_before,
                amount: self.amount,
            })
    }
}

impl NewDepositBuilder {
    fn validate(&self) -> Result<(), String> {
        match self.amount {
            Some(amount) if amount <= Decimal::ZERO => {
                Err("deposit amount must be greater than zero".to_string())
            }
            Some(amount) => validate_amount(amount),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn balance_after_includes_amount() {
        let deposit = NewDeposit::builder()
            .account_id(AccountId::new())
            .amount(dec!(2500.50))
            .balance_before(dec!(1000))
            .reference("TRX-991")
            .build()
            .unwrap();
        assert_eq!(deposit.balance_after().unwrap(), dec!(3500.50));
        assert_eq!(deposit.kind, DepositKind::Deposit);
    }

    #[test]
    fn rejects_non_positive_amount() {
        let res = NewDeposit::builder()
            .account_id(AccountId::new())
            .amount(dec!(0))
            .balance_before(dec!(1000))
            .build();
        assert!(res.is_err());
    }

    #[test]
    fn rejects_amounts_the_column_cannot_hold() {
        for amount in [dec!(0.004), Decimal::MAX] {
            let res = NewDeposit::builder()
                .account_id(AccountId::new())
                .amount(amount)
                .balance_before(dec!(100))
                .build();
            assert!(res.is_err());
        }
    }

    #[test]
    fn balance_after_beyond_the_column_is_an_error() {
        let deposit = NewDeposit::builder()
            .account_id(AccountId::new())
            .amount(dec!(9999999999999999))
            .balance_before(dec!(100))
            .build()
            .unwrap();
        assert!(matches!(
            deposit.balance_after(),
            Err(DepositError::BalanceOutOfRange { .. })
        ));
    }
}
