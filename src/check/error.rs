use thiserror::Error;

use crate::primitives::*;

#[derive(Error, Debug)]
pub enum CheckError {
    #[error("CheckError - Sqlx: {0}")]
    Sqlx(sqlx::Error),
    #[error("CheckError - Could not find check with id: {0}")]
    CheckNotFound(CheckId),
    #[error("CheckError - Check number is already used in this checkbook")]
    NumberAlreadyUsed,
}

impl From<sqlx::Error> for CheckError {
    fn from(error: sqlx::Error) -> Self {
        if let Some(err) = error.as_database_error() {
            if let Some(constraint) = err.constraint() {
                if constraint.contains("checkbook_id_number") {
                    return Self::NumberAlreadyUsed;
                }
            }
        }
        Self::Sqlx(error)
    }
}
