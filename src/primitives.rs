use serde::{Deserialize, Serialize};

use std::fmt;

pub use rust_decimal::Decimal;

crate::entity_id! { AccountId }
crate::entity_id! { CheckbookId }
crate::entity_id! { CheckId }
crate::entity_id! { DepositId }

pub type CheckNumber = i64;

/// Money columns are NUMERIC(18, 2): two decimal places, sixteen integer digits.
pub fn validate_amount(amount: Decimal) -> Result<(), String> {
    if amount.normalize().scale() > 2 {
        return Err(format!("amount {amount} has more than two decimal places"));
    }
    if !fits_amount_column(amount) {
        return Err(format!("amount {amount} is out of range"));
    }
    Ok(())
}

pub fn fits_amount_column(amount: Decimal) -> bool {
    amount.abs() < Decimal::from(10_000_000_000_000_000_i64)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "check_status", rename_all = "snake_case")]
pub enum CheckStatus {
    Pending,
    Issued,
    Cleared,
    Cancelled,
}

impl CheckStatus {
    pub const ALL: [CheckStatus; 4] = [
        CheckStatus::Pending,
        CheckStatus::Issued,
        CheckStatus::Cleared,
        CheckStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Issued => "issued",
            Self::Cleared => "cleared",
            Self::Cancelled => "cancelled",
        }
    }

    /// Statuses whose amount counts against the account when the balance is
    /// recomputed from scratch.
    pub fn is_committed(&self) -> bool {
        matches!(self, Self::Issued | Self::Cleared)
    }

    /// Signed change to the account balance when a check of `amount` moves
    /// from `self` to `to`. The amount is debited once at issuance, so only
    /// crossing the cancelled boundary moves money.
    pub fn balance_adjustment(&self, to: CheckStatus, amount: Decimal) -> Decimal {
        match (*self, to) {
            (from, to) if from == to => Decimal::ZERO,
            (_, Self::Cancelled) => amount,
            (Self::Cancelled, _) => -amount,
            _ => Decimal::ZERO,
        }
    }
}

impl fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for CheckStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "issued" => Ok(Self::Issued),
            "cleared" => Ok(Self::Cleared),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(format!("unknown check status '{other}'")),
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "account_type", rename_all = "snake_case")]
pub enum AccountType {
    #[default]
    Checking,
    Savings,
    Other,
}

#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "deposit_kind", rename_all = "snake_case")]
pub enum DepositKind {
    #[default]
    Deposit,
    Transfer,
    Interest,
    Other,
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn cancelling_refunds_the_amount() {
        for from in [CheckStatus::Pending, CheckStatus::Issued, CheckStatus::Cleared] {
            assert_eq!(
                from.balance_adjustment(CheckStatus::Cancelled, dec!(15000)),
                dec!(15000)
            );
        }
    }

    #[test]
    fn leaving_cancelled_charges_the_amount_again() {
        for to in [CheckStatus::Pending, CheckStatus::Issued, CheckStatus::Cleared] {
            assert_eq!(
                CheckStatus::Cancelled.balance_adjustment(to, dec!(15000)),
                dec!(-15000)
            );
        }
    }

    #[test]
    fn other_transitions_do_not_move_money() {
        for from in CheckStatus::ALL {
            for to in CheckStatus::ALL {
                if from == CheckStatus::Cancelled || to == CheckStatus::Cancelled {
                    continue;
                }
                assert_eq!(from.balance_adjustment(to, dec!(10)), Decimal::ZERO);
            }
        }
        assert_eq!(
            CheckStatus::Cancelled.balance_adjustment(CheckStatus::Cancelled, dec!(10)),
            Decimal::ZERO
        );
    }

    #[test]
    fn amounts_must_fit_the_money_columns() {
        assert!(validate_amount(dec!(15000)).is_ok());
        assert!(validate_amount(dec!(0.01)).is_ok());
        assert!(validate_amount(dec!(12.500)).is_ok());
        assert!(validate_amount(dec!(9999999999999999.99)).is_ok());
        assert!(validate_amount(dec!(0.004)).is_err());
        assert!(validate_amount(dec!(10000000000000000)).is_err());
        assert!(validate_amount(Decimal::MAX).is_err());
    }

    #[test]
    fn parse_status() {
        assert_eq!("Issued".parse::<CheckStatus>(), Ok(CheckStatus::Issued));
        assert!("bounced".parse::<CheckStatus>().is_err());
    }

    #[test]
    fn status_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&CheckStatus::Cancelled).unwrap(),
            "\"cancelled\""
        );
    }
}
