use sqlx::{Pool, Postgres, QueryBuilder, Transaction};
use tracing::instrument;

use super::{entity::*, error::CheckError};
use crate::primitives::*;

const CHECK_COLUMNS: &str = r#"id, checkbook_id, account_id, number, date, beneficiary, amount,
    concept, status, created_at, modified_at"#;

#[derive(Clone, Debug)]
pub struct Checks {
    pool: Pool<Postgres>,
}

impl Checks {
    pub fn new(pool: &Pool<Postgres>) -> Self {
        Self { pool: pool.clone() }
    }

    #[instrument(name = "checks.create_in_tx", skip(self, tx))]
    pub async fn create_in_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        new_check: NewCheck,
    ) -> Result<Check, CheckError> {
        let check = sqlx::query_as::<_, Check>(&format!(
            r#"INSERT INTO cheques_checks
                 (id, checkbook_id, account_id, number, date, beneficiary, amount, concept, status)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 'pending')
               RETURNING {CHECK_COLUMNS}"#
        ))
        .bind(new_check.id)
        .bind(new_check.checkbook_id)
        .bind(new_check.account_id)
        .bind(new_check.number)
        .bind(new_check.date)
        .bind(new_check.beneficiary)
        .bind(new_check.amount)
        .bind(new_check.concept)
        .fetch_one(&mut **tx)
        .await?;
        Ok(check)
    }

    #[instrument(name = "checks.find_by_id", skip(self))]
    pub async fn find_by_id(&self, id: CheckId) -> Result<Check, CheckError> {
        sqlx::query_as::<_, Check>(&format!(
            "SELECT {CHECK_COLUMNS} FROM cheques_checks WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(CheckError::CheckNotFound(id))
    }

    #[instrument(name = "checks.find_by_id_for_update", skip(self, tx))]
    pub async fn find_by_id_for_update(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        id: CheckId,
    ) -> Result<Check, CheckError> {
        sqlx::query_as::<_, Check>(&format!(
            "SELECT {CHECK_COLUMNS} FROM cheques_checks WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or(CheckError::CheckNotFound(id))
    }

    #[instrument(name = "checks.update_status_in_tx", skip(self, tx))]
    pub async fn update_status_in_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        id: CheckId,
        status: CheckStatus,
    ) -> Result<(), CheckError> {
        sqlx::query("UPDATE cheques_checks SET status = $2, modified_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(status)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }

    #[instrument(name = "checks.update_details", skip(self))]
    pub async fn update_details(
        &self,
        id: CheckId,
        update: CheckDetailsUpdate,
    ) -> Result<Check, CheckError> {
        sqlx::query_as::<_, Check>(&format!(
            r#"UPDATE cheques_checks SET
                 date = COALESCE($2, date),
                 beneficiary = COALESCE($3, beneficiary),
                 concept = COALESCE($4, concept),
                 modified_at = NOW()
               WHERE id = $1
               RETURNING {CHECK_COLUMNS}"#
        ))
        .bind(id)
        .bind(update.date)
        .bind(update.beneficiary)
        .bind(update.concept)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(CheckError::CheckNotFound(id))
    }

    #[instrument(name = "checks.list", skip(self))]
    pub async fn list(&self, filter: CheckFilter) -> Result<Vec<Check>, CheckError> {
        let mut query: QueryBuilder<Postgres> = QueryBuilder::new(format!(
            "SELECT {CHECK_COLUMNS} FROM cheques_checks WHERE TRUE"
        ));
        if let Some(account_id) = filter.account_id {
            query.push(" AND account_id = ").push_bind(account_id);
        }
        if let Some(checkbook_id) = filter.checkbook_id {
            query.push(" AND checkbook_id = ").push_bind(checkbook_id);
        }
        if let Some(status) = filter.status {
            query.push(" AND status = ").push_bind(status);
        }
        if let Some(beneficiary) = filter.beneficiary {
            query
                .push(" AND beneficiary ILIKE ")
                .push_bind(format!("%{}%", escape_like(&beneficiary)));
        }
        query.push(" ORDER BY date DESC, number DESC");

        let checks = query.build_query_as::<Check>().fetch_all(&self.pool).await?;
        Ok(checks)
    }

    #[instrument(name = "checks.list_for_account_in_tx", skip(self, tx))]
    pub async fn list_for_account_in_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        account_id: AccountId,
    ) -> Result<Vec<Check>, CheckError> {
        let checks = sqlx::query_as::<_, Check>(&format!(
            "SELECT {CHECK_COLUMNS} FROM cheques_checks WHERE account_id = $1"
        ))
        .bind(account_id)
        .fetch_all(&mut **tx)
        .await?;
        Ok(checks)
    }
}

fn escape_like(pattern: &str) -> String {
    pattern
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_wildcards_are_escaped() {
        assert_eq!(escape_like("50%_off"), "50\\%\\_off");
        assert_eq!(escape_like("Juan Pérez"), "Juan Pérez");
    }
}
