use chrono::{DateTime, Utc};
use derive_builder::Builder;
use serde::Serialize;

use std::collections::HashSet;

use super::error::CheckbookError;
use crate::primitives::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Numbering {
    Automatic,
    Manual(CheckNumber),
}

impl Numbering {
    pub fn is_automatic(&self) -> bool {
        matches!(self, Self::Automatic)
    }
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Checkbook {
    pub id: CheckbookId,
    pub account_id: AccountId,
    pub start_number: CheckNumber,
    pub end_number: CheckNumber,
    pub next_number: CheckNumber,
    pub check_count: i64,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl Checkbook {
    pub fn contains(&self, number: CheckNumber) -> bool {
        number >= self.start_number && number <= self.end_number
    }

    pub fn remaining(&self) -> i64 {
        (self.end_number - self.next_number + 1).max(0)
    }

    pub fn overlaps(&self, start: CheckNumber, end: CheckNumber) -> bool {
        self.start_number <= end && start <= self.end_number
    }

    /// Picks the number for a new check. `used` holds every number already
    /// taken in this checkbook.
    pub fn assign_number(
        &self,
        numbering: Numbering,
        used: &HashSet<CheckNumber>,
    ) -> Result<CheckNumber, CheckbookError> {
        match numbering {
            Numbering::Manual(number) => self.validate_manual_number(number, used),
            Numbering::Automatic => self.next_automatic_number(used),
        }
    }

    pub fn validate_manual_number(
        &self,
        number: CheckNumber,
        used: &HashSet<CheckNumber>,
    ) -> Result<CheckNumber, CheckbookError> {
        if !self.contains(number) {
            return Err(CheckbookError::NumberOutOfRange {
                number,
                start: self.start_number,
                end: self.end_number,
            });
        }
        if used.contains(&number) {
            return Err(CheckbookError::NumberAlreadyUsed(number));
        }
        Ok(number)
    }

    /// Smallest unused number between the stored pointer and the end of the
    /// range. Numbers taken manually ahead of the pointer are skipped.
    pub fn next_automatic_number(
        &self,
        used: &HashSet<CheckNumber>,
    ) -> Result<CheckNumber, CheckbookError> {
        (self.next_number.max(self.start_number)..=self.end_number)
            .find(|n| !used.contains(n))
            .ok_or(CheckbookError::CheckbookExhausted(self.id))
    }
}

#[derive(Builder, Clone, Debug)]
#[builder(build_fn(validate = "Self::validate"))]
pub struct NewCheckbook {
    #[builder(setter(skip), default = "CheckbookId::new()")]
    pub(super) id: CheckbookId,
    pub(super) account_id: AccountId,
    #[builder(default = "1")]
    pub(super) start_number: CheckNumber,
    pub(super) check_count: i64,
}

impl NewCheckbook {
    pub fn builder() -> NewCheckbookBuilder {
        NewCheckbookBuilder::default()
    }

    pub fn start_number(&self) -> CheckNumber {
        self.start_number
    }

    /// The builder guarantees `start + count` fits, so the pointer can run one
    /// past the end.
    pub fn end_number(&self) -> CheckNumber {
        self.start_number + (self.check_count - 1)
    }
}

impl NewCheckbookBuilder {
    fn validate(&self) -> Result<(), String> {
        let start = self.start_number.unwrap_or(1);
        if start < 1 {
            return Err("starting check number must be at least 1".to_string());
        }
        match self.check_count {
            Some(count) if count < 1 => Err("a checkbook needs at least one check".to_string()),
            Some(count) if start.checked_add(count).is_none() => {
                Err("checkbook range exceeds the highest check number".to_string())
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checkbook(start: CheckNumber, end: CheckNumber, next: CheckNumber) -> Checkbook {
        Checkbook {
            id: CheckbookId::new(),
            account_id: AccountId::new(),
            start_number: start,
            end_number: end,
            next_number: next,
            check_count: end - start + 1,
            active: true,
            created_at: Utc::now(),
        }
    }

    fn used(numbers: &[CheckNumber]) -> HashSet<CheckNumber> {
        numbers.iter().copied().collect()
    }

    #[test]
    fn automatic_number_starts_at_pointer() {
        let book = checkbook(1001, 1050, 1001);
        assert_eq!(book.next_automatic_number(&used(&[])).unwrap(), 1001);

        let book = checkbook(1001, 1050, 1010);
        assert_eq!(book.next_automatic_number(&used(&[1001])).unwrap(), 1010);
    }

    #[test]
    fn automatic_number_skips_manually_used_numbers() {
        let book = checkbook(1, 10, 3);
        assert_eq!(book.next_automatic_number(&used(&[3, 4, 6])).unwrap(), 5);
    }

    #[test]
    fn automatic_number_ignores_gaps_behind_pointer() {
        let book = checkbook(1, 10, 5);
        assert_eq!(book.next_automatic_number(&used(&[5])).unwrap(), 6);
    }

    #[test]
    fn exhausted_checkbook() {
        let book = checkbook(1, 3, 2);
        assert!(matches!(
            book.next_automatic_number(&used(&[2, 3])),
            Err(CheckbookError::CheckbookExhausted(_))
        ));

        let book = checkbook(1, 3, 4);
        assert!(matches!(
            book.next_automatic_number(&used(&[])),
            Err(CheckbookError::CheckbookExhausted(_))
        ));
        assert_eq!(book.remaining(), 0);
    }

    #[test]
    fn manual_number_must_be_in_range() {
        let book = checkbook(100, 149, 100);
        for number in [99, 150, 0, -1] {
            assert!(matches!(
                book.validate_manual_number(number, &used(&[])),
                Err(CheckbookError::NumberOutOfRange { .. })
            ));
        }
        assert_eq!(book.validate_manual_number(100, &used(&[])).unwrap(), 100);
        assert_eq!(book.validate_manual_number(149, &used(&[])).unwrap(), 149);
    }

    #[test]
    fn manual_number_must_be_unused() {
        let book = checkbook(100, 149, 100);
        assert!(matches!(
            book.assign_number(Numbering::Manual(120), &used(&[120])),
            Err(CheckbookError::NumberAlreadyUsed(120))
        ));
    }

    #[test]
    fn overlap() {
        let book = checkbook(100, 149, 100);
        assert!(book.overlaps(149, 200));
        assert!(book.overlaps(50, 100));
        assert!(book.overlaps(110, 120));
        assert!(!book.overlaps(150, 199));
        assert!(!book.overlaps(1, 99));
    }

    #[test]
    fn new_checkbook_range() {
        let new_book = NewCheckbook::builder()
            .account_id(AccountId::new())
            .start_number(1001)
            .check_count(50)
            .build()
            .unwrap();
        assert_eq!(new_book.end_number(), 1050);

        let res = NewCheckbook::builder()
            .account_id(AccountId::new())
            .check_count(0)
            .build();
        assert!(res.is_err());
    }

    #[test]
    fn new_checkbook_range_must_fit_check_numbers() {
        let res = NewCheckbook::builder()
            .account_id(AccountId::new())
            .start_number(2)
            .check_count(i64::MAX)
            .build();
        assert!(res.is_err());

        let res = NewCheckbook::builder()
            .account_id(AccountId::new())
            .start_number(i64::MAX)
            .check_count(1)
            .build();
        assert!(res.is_err());

        let new_book = NewCheckbook::builder()
            .account_id(AccountId::new())
            .start_number(i64::MAX - 10)
            .check_count(10)
            .build()
            .unwrap();
        assert_eq!(new_book.end_number(), i64::MAX - 1);
    }
}
