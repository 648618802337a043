use thiserror::Error;

use crate::primitives::*;

#[derive(Error, Debug)]
pub enum AccountError {
    #[error("AccountError - Sqlx: {0}")]
    Sqlx(sqlx::Error),
    #[error("AccountError - Could not find account with id: {0}")]
    AccountNotFound(AccountId),
    #[error("AccountError - Account {0} is not active")]
    AccountInactive(AccountId),
    #[error("AccountError - Insufficient funds: available {available}, requested {requested}")]
    InsufficientFunds {
        available: Decimal,
        requested: Decimal,
    },
    #[error("AccountError - account_number already exists")]
    AccountNumberAlreadyExists,
}

impl From<sqlx::Error> for AccountError {
    fn from(error: sqlx::Error) -> Self {
        if let Some(err) = error.as_database_error() {
            if let Some(constraint) = err.constraint() {
                if constraint.contains("account_number") {
                    return Self::AccountNumberAlreadyExists;
                }
            }
        }
        Self::Sqlx(error)
    }
}
