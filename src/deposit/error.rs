use thiserror::Error;

use crate::primitives::*;

#[derive(Error, Debug)]
pub enum DepositError {
    #[error("DepositError - Sqlx: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("DepositError - Depositing {amount} on a balance of {balance} is out of range")]
    BalanceOutOfRange { balance: Decimal, amount: Decimal },
}
