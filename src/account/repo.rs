use sqlx::{Pool, Postgres, Transaction};
use tracing::instrument;

use super::{entity::*, error::AccountError};
use crate::primitives::*;

const ACCOUNT_COLUMNS: &str = r#"id, name, account_number, bank, currency, account_type, holder,
    initial_balance, current_balance, active, created_at, modified_at"#;

#[derive(Clone, Debug)]
pub struct Accounts {
    pool: Pool<Postgres>,
}

impl Accounts {
    pub fn new(pool: &Pool<Postgres>) -> Self {
        Self { pool: pool.clone() }
    }

    #[instrument(name = "accounts.create_in_tx", skip(self, tx))]
    pub async fn create_in_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        new_account: NewAccount,
    ) -> Result<Account, AccountError> {
        let account = sqlx::query_as::<_, Account>(&format!(
            r#"INSERT INTO cheques_accounts
                 (id, name, account_number, bank, currency, account_type, holder,
                  initial_balance, current_balance)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8)
               RETURNING {ACCOUNT_COLUMNS}"#
        ))
        .bind(new_account.id)
        .bind(new_account.name)
        .bind(new_account.account_number)
        .bind(new_account.bank)
        .bind(new_account.currency)
        .bind(new_account.account_type)
        .bind(new_account.holder)
        .bind(new_account.initial_balance)
        .fetch_one(&mut **tx)
        .await?;
        Ok(account)
    }

    #[instrument(name = "accounts.find_by_id", skip(self))]
    pub async fn find_by_id(&self, id: AccountId) -> Result<Account, AccountError> {
        sqlx::query_as::<_, Account>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM cheques_accounts WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AccountError::AccountNotFound(id))
    }

    /// Locks the account row until `tx` completes. Every balance
    /// read-modify-write goes through here.
    #[instrument(name = "accounts.find_by_id_for_update", skip(self, tx))]
    pub async fn find_by_id_for_update(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        id: AccountId,
    ) -> Result<Account, AccountError> {
        sqlx::query_as::<_, Account>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM cheques_accounts WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or(AccountError::AccountNotFound(id))
    }

    #[instrument(name = "accounts.list", skip(self))]
    pub async fn list(&self, include_inactive: bool) -> Result<Vec<Account>, AccountError> {
        let accounts = sqlx::query_as::<_, Account>(&format!(
            r#"SELECT {ACCOUNT_COLUMNS} FROM cheques_accounts
               WHERE active OR $1
               ORDER BY name, created_at"#
        ))
        .bind(include_inactive)
        .fetch_all(&self.pool)
        .await?;
        Ok(accounts)
    }

    #[instrument(name = "accounts.update_details", skip(self))]
    pub async fn update_details(
        &self,
        id: AccountId,
        update: AccountUpdate,
    ) -> Result<Account, AccountError> {
        sqlx::query_as::<_, Account>(&format!(
            r#"UPDATE cheques_accounts SET
                 name = COALESCE($2, name),
                 bank = COALESCE($3, bank),
                 currency = COALESCE($4, currency),
                 account_type = COALESCE($5, account_type),
                 holder = COALESCE($6, holder),
                 modified_at = NOW()
               WHERE id = $1
               RETURNING {ACCOUNT_COLUMNS}"#
        ))
        .bind(id)
        .bind(update.name)
        .bind(update.bank)
        .bind(update.currency.map(|c| c.trim().to_uppercase()))
        .bind(update.account_type)
        .bind(update.holder)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AccountError::AccountNotFound(id))
    }

    #[instrument(name = "accounts.set_current_balance_in_tx", skip(self, tx))]
    pub async fn set_current_balance_in_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        id: AccountId,
        balance: Decimal,
    ) -> Result<(), AccountError> {
        let result = sqlx::query(
            r#"UPDATE cheques_accounts
               SET current_balance = $2, modified_at = NOW()
               WHERE id = $1"#,
        )
        .bind(id)
        .bind(balance)
        .execute(&mut **tx)
        .await?;
        if result.rows_affected() == 0 {
            return Err(AccountError::AccountNotFound(id));
        }
        Ok(())
    }

    #[instrument(name = "accounts.deactivate_in_tx", skip(self, tx))]
    pub async fn deactivate_in_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        id: AccountId,
    ) -> Result<Account, AccountError> {
        sqlx::query_as::<_, Account>(&format!(
            r#"UPDATE cheques_accounts SET active = FALSE, modified_at = NOW()
               WHERE id = $1
               RETURNING {ACCOUNT_COLUMNS}"#
        ))
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or(AccountError::AccountNotFound(id))
    }
}
