use thiserror::Error;

use crate::primitives::*;

#[derive(Error, Debug)]
pub enum CheckbookError {
    #[error("CheckbookError - Sqlx: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("CheckbookError - Could not find checkbook with id: {0}")]
    CheckbookNotFound(CheckbookId),
    #[error("CheckbookError - Account {0} has no active checkbook")]
    NoActiveCheckbook(AccountId),
    #[error("CheckbookError - Range {start}-{end} overlaps an existing checkbook")]
    OverlappingRange {
        start: CheckNumber,
        end: CheckNumber,
    },
    #[error("CheckbookError - Check number {number} is outside the checkbook range {start}-{end}")]
    NumberOutOfRange {
        number: CheckNumber,
        start: CheckNumber,
        end: CheckNumber,
    },
    #[error("CheckbookError - Check number {0} is already used in this checkbook")]
    NumberAlreadyUsed(CheckNumber),
    #[error("CheckbookError - Checkbook {0} has no numbers left")]
    CheckbookExhausted(CheckbookId),
}
