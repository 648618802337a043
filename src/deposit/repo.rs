use sqlx::{Pool, Postgres, Transaction};
use tracing::instrument;

use super::{entity::*, error::DepositError};
use crate::primitives::*;

const DEPOSIT_COLUMNS: &str = r#"id, account_id, kind, amount, description, reference, status,
    balance_before, balance_after, created_at"#;

#[derive(Clone, Debug)]
pub struct Deposits {
    pool: Pool<Postgres>,
}

impl Deposits {
    pub fn new(pool: &Pool<Postgres>) -> Self {
        Self { pool: pool.clone() }
    }

    #[instrument(name = "deposits.create_in_tx", skip(self, tx))]
    pub async fn create_in_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        new_deposit: NewDeposit,
    ) -> Result<Deposit, DepositError> {
        let balance_after = new_deposit.balance_after()?;
        let deposit = sqlx::query_as::<_, Deposit>(&format!(
            r#"INSERT INTO cheques_deposits
                 (id, account_id, kind, amount, description, reference, status,
                  balance_before, balance_after)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
               RETURNING {DEPOSIT_COLUMNS}"#
        ))
        .bind(new_deposit.id)
        .bind(new_deposit.account_id)
        .bind(new_deposit.kind)
        .bind(new_deposit.amount)
        .bind(new_deposit.description)
        .bind(new_deposit.reference)
        .bind(DEPOSIT_STATUS_COMPLETED)
        .bind(new_deposit.balance_before)
        .bind(balance_after)
        .fetch_one(&mut **tx)
        .await?;
        Ok(deposit)
    }

    #[instrument(name = "deposits.list_for_account", skip(self))]
    pub async fn list_for_account(
        &self,
        account_id: AccountId,
    ) -> Result<Vec<Deposit>, DepositError> {
        let deposits = sqlx::query_as::<_, Deposit>(&format!(
            r#"SELECT {DEPOSIT_COLUMNS} FROM cheques_deposits
               WHERE account_id = $1
               ORDER BY created_at DESC"#
        ))
        .bind(account_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(deposits)
    }

    #[instrument(name = "deposits.total_for_account_in_tx", skip(self, tx))]
    pub async fn total_for_account_in_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        account_id: AccountId,
    ) -> Result<Decimal, DepositError> {
        let total: Option<Decimal> = sqlx::query_scalar(
            "SELECT SUM(amount) FROM cheques_deposits WHERE account_id = $1",
        )
        .bind(account_id)
        .fetch_one(&mut **tx)
        .await?;
        Ok(total.unwrap_or(Decimal::ZERO))
    }
}
