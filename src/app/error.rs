use thiserror::Error;

use crate::{
    account::error::AccountError, check::error::CheckError, checkbook::error::CheckbookError,
    deposit::error::DepositError, report::error::ReportError,
};

#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("ApplicationError - Validation: {0}")]
    Validation(String),
    #[error("ApplicationError - Sqlx: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("ApplicationError - Server: {0}")]
    Server(#[from] std::io::Error),
    #[error("ApplicationError - Migrate: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
    #[error("{0}")]
    AccountError(#[from] AccountError),
    #[error("{0}")]
    CheckbookError(#[from] CheckbookError),
    #[error("{0}")]
    CheckError(#[from] CheckError),
    #[error("{0}")]
    DepositError(#[from] DepositError),
    #[error("{0}")]
    ReportError(#[from] ReportError),
}
