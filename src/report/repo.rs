use sqlx::{Pool, Postgres};
use tracing::instrument;

use super::{error::ReportError, ReportKind, ReportRow};
use crate::primitives::*;

#[derive(Clone, Debug)]
pub struct Reports {
    pool: Pool<Postgres>,
}

impl Reports {
    pub fn new(pool: &Pool<Postgres>) -> Self {
        Self { pool: pool.clone() }
    }

    /// Cancelled checks are left out of the month and beneficiary totals.
    #[instrument(name = "reports.checks", skip(self))]
    pub async fn checks(
        &self,
        kind: ReportKind,
        account_id: Option<AccountId>,
    ) -> Result<Vec<ReportRow>, ReportError> {
        let query = match kind {
            ReportKind::ByMonth => {
                r#"SELECT to_char(date, 'YYYY-MM') AS key, COUNT(*) AS check_count,
                          COALESCE(SUM(amount), 0) AS total
                   FROM cheques_checks
                   WHERE status <> 'cancelled' AND ($1::uuid IS NULL OR account_id = $1)
                   GROUP BY 1
                   ORDER BY 1"#
            }
            ReportKind::ByBeneficiary => {
                r#"SELECT beneficiary AS key, COUNT(*) AS check_count,
                          COALESCE(SUM(amount), 0) AS total
                   FROM cheques_checks
                   WHERE status <> 'cancelled' AND ($1::uuid IS NULL OR account_id = $1)
                   GROUP BY 1
                   ORDER BY 3 DESC, 1"#
            }
            ReportKind::ByStatus => {
                r#"SELECT status::text AS key, COUNT(*) AS check_count,
                          COALESCE(SUM(amount), 0) AS total
                   FROM cheques_checks
                   WHERE ($1::uuid IS NULL OR account_id = $1)
                   GROUP BY 1
                   ORDER BY 1"#
            }
        };
        let rows = sqlx::query_as::<_, ReportRow>(query)
            .bind(account_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }
}
