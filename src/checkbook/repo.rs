use sqlx::{Pool, Postgres, Transaction};
use tracing::instrument;

use std::collections::HashSet;

use super::{entity::*, error::CheckbookError};
use crate::primitives::*;

const CHECKBOOK_COLUMNS: &str =
    "id, account_id, start_number, end_number, next_number, check_count, active, created_at";

#[derive(Clone, Debug)]
pub struct Checkbooks {
    pool: Pool<Postgres>,
}

impl Checkbooks {
    pub fn new(pool: &Pool<Postgres>) -> Self {
        Self { pool: pool.clone() }
    }

    /// Callers hold the owning account row lock so the overlap check and the
    /// insert cannot interleave with another checkbook creation.
    #[instrument(name = "checkbooks.create_in_tx", skip(self, tx))]
    pub async fn create_in_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        new_checkbook: NewCheckbook,
    ) -> Result<Checkbook, CheckbookError> {
        let start = new_checkbook.start_number();
        let end = new_checkbook.end_number();
        let existing = sqlx::query_as::<_, Checkbook>(&format!(
            "SELECT {CHECKBOOK_COLUMNS} FROM cheques_checkbooks WHERE account_id = $1"
        ))
        .bind(new_checkbook.account_id)
        .fetch_all(&mut **tx)
        .await?;
        if existing.iter().any(|book| book.overlaps(start, end)) {
            return Err(CheckbookError::OverlappingRange { start, end });
        }

        let checkbook = sqlx::query_as::<_, Checkbook>(&format!(
            r#"INSERT INTO cheques_checkbooks
                 (id, account_id, start_number, end_number, next_number, check_count)
               VALUES ($1, $2, $3, $4, $3, $5)
               RETURNING {CHECKBOOK_COLUMNS}"#
        ))
        .bind(new_checkbook.id)
        .bind(new_checkbook.account_id)
        .bind(start)
        .bind(end)
        .bind(new_checkbook.check_count)
        .fetch_one(&mut **tx)
        .await?;
        Ok(checkbook)
    }

    #[instrument(name = "checkbooks.find_by_id", skip(self))]
    pub async fn find_by_id(&self, id: CheckbookId) -> Result<Checkbook, CheckbookError> {
        sqlx::query_as::<_, Checkbook>(&format!(
            "SELECT {CHECKBOOK_COLUMNS} FROM cheques_checkbooks WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(CheckbookError::CheckbookNotFound(id))
    }

    /// The most recently created active checkbook of the account, locked for
    /// the numbering scan.
    #[instrument(name = "checkbooks.find_active_for_update", skip(self, tx))]
    pub async fn find_active_for_update(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        account_id: AccountId,
    ) -> Result<Checkbook, CheckbookError> {
        sqlx::query_as::<_, Checkbook>(&format!(
            r#"SELECT {CHECKBOOK_COLUMNS} FROM cheques_checkbooks
               WHERE account_id = $1 AND active
               ORDER BY created_at DESC, start_number DESC
               LIMIT 1
               FOR UPDATE"#
        ))
        .bind(account_id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or(CheckbookError::NoActiveCheckbook(account_id))
    }

    #[instrument(name = "checkbooks.list_for_account", skip(self))]
    pub async fn list_for_account(
        &self,
        account_id: AccountId,
    ) -> Result<Vec<Checkbook>, CheckbookError> {
        let checkbooks = sqlx::query_as::<_, Checkbook>(&format!(
            r#"SELECT {CHECKBOOK_COLUMNS} FROM cheques_checkbooks
               WHERE account_id = $1
               ORDER BY start_number"#
        ))
        .bind(account_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(checkbooks)
    }

    #[instrument(name = "checkbooks.used_numbers_in_tx", skip(self, tx))]
    pub async fn used_numbers_in_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        id: CheckbookId,
    ) -> Result<HashSet<CheckNumber>, CheckbookError> {
        let numbers: Vec<CheckNumber> =
            sqlx::query_scalar("SELECT number FROM cheques_checks WHERE checkbook_id = $1")
                .bind(id)
                .fetch_all(&mut **tx)
                .await?;
        Ok(numbers.into_iter().collect())
    }

    #[instrument(name = "checkbooks.advance_next_number_in_tx", skip(self, tx))]
    pub async fn advance_next_number_in_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        id: CheckbookId,
        next_number: CheckNumber,
    ) -> Result<(), CheckbookError> {
        sqlx::query("UPDATE cheques_checkbooks SET next_number = $2 WHERE id = $1")
            .bind(id)
            .bind(next_number)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }

    #[instrument(name = "checkbooks.deactivate", skip(self))]
    pub async fn deactivate(&self, id: CheckbookId) -> Result<Checkbook, CheckbookError> {
        sqlx::query_as::<_, Checkbook>(&format!(
            r#"UPDATE cheques_checkbooks SET active = FALSE
               WHERE id = $1
               RETURNING {CHECKBOOK_COLUMNS}"#
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(CheckbookError::CheckbookNotFound(id))
    }

    #[instrument(name = "checkbooks.deactivate_for_account_in_tx", skip(self, tx))]
    pub async fn deactivate_for_account_in_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        account_id: AccountId,
    ) -> Result<u64, CheckbookError> {
        let result =
            sqlx::query("UPDATE cheques_checkbooks SET active = FALSE WHERE account_id = $1")
                .bind(account_id)
                .execute(&mut **tx)
                .await?;
        Ok(result.rows_affected())
    }
}
