mod config;
pub mod error;

use sqlx::PgPool;
use tracing::instrument;

use crate::{
    account::*,
    check::*,
    checkbook::{error::CheckbookError, *},
    deposit::*,
    primitives::*,
    report::*,
};

pub use config::*;
use error::*;

#[derive(Debug, Clone, serde::Serialize)]
pub struct CreatedAccount {
    pub account: Account,
    pub checkbook: Checkbook,
}

#[derive(Debug, Clone, Copy, serde::Serialize)]
pub struct CheckStatusUpdate {
    pub change: StatusChange,
    pub balance: Decimal,
}

#[derive(Clone)]
pub struct App {
    config: AppConfig,
    pool: PgPool,
    accounts: Accounts,
    checkbooks: Checkbooks,
    checks: Checks,
    deposits: Deposits,
    reports: Reports,
}

impl App {
    pub async fn run(pool: PgPool, config: AppConfig) -> Result<Self, ApplicationError> {
        sqlx::migrate!().run(&pool).await?;
        Ok(Self {
            config,
            accounts: Accounts::new(&pool),
            checkbooks: Checkbooks::new(&pool),
            checks: Checks::new(&pool),
            deposits: Deposits::new(&pool),
            reports: Reports::new(&pool),
            pool,
        })
    }

    #[instrument(name = "app.create_account", skip(self), err)]
    pub async fn create_account(
        &self,
        new_account: NewAccount,
        first_check_number: Option<CheckNumber>,
        check_count: Option<i64>,
    ) -> Result<CreatedAccount, ApplicationError> {
        let mut tx = self.pool.begin().await?;
        let account = self.accounts.create_in_tx(&mut tx, new_account).await?;
        let new_checkbook = NewCheckbook::builder()
            .account_id(account.id)
            .start_number(first_check_number.unwrap_or(self.config.default_first_check_number))
            .check_count(check_count.unwrap_or(self.config.default_checkbook_size))
            .build()
            .map_err(|e| ApplicationError::Validation(e.to_string()))?;
        let checkbook = self.checkbooks.create_in_tx(&mut tx, new_checkbook).await?;
        tx.commit().await?;
        Ok(CreatedAccount { account, checkbook })
    }

    #[instrument(name = "app.list_accounts", skip(self), err)]
    pub async fn list_accounts(
        &self,
        include_inactive: bool,
    ) -> Result<Vec<Account>, ApplicationError> {
        Ok(self.accounts.list(include_inactive).await?)
    }

    #[instrument(name = "app.find_account", skip(self), err)]
    pub async fn find_account(&self, account_id: AccountId) -> Result<Account, ApplicationError> {
        Ok(self.accounts.find_by_id(account_id).await?)
    }

    #[instrument(name = "app.update_account", skip(self), err)]
    pub async fn update_account(
        &self,
        account_id: AccountId,
        update: AccountUpdate,
    ) -> Result<Account, ApplicationError> {
        update.validate().map_err(ApplicationError::Validation)?;
        Ok(self.accounts.update_details(account_id, update).await?)
    }

    /// Soft delete. The account and all of its checkbooks stay on record but
    /// can no longer be used to issue checks or take deposits.
    #[instrument(name = "app.deactivate_account", skip(self), err)]
    pub async fn deactivate_account(
        &self,
        account_id: AccountId,
    ) -> Result<Account, ApplicationError> {
        let mut tx = self.pool.begin().await?;
        self.accounts
            .find_by_id_for_update(&mut tx, account_id)
            .await?;
        let account = self.accounts.deactivate_in_tx(&mut tx, account_id).await?;
        self.checkbooks
            .deactivate_for_account_in_tx(&mut tx, account_id)
            .await?;
        tx.commit().await?;
        Ok(account)
    }

    /// Without an explicit start the new range continues right after the
    /// highest number the account has ever had.
    #[instrument(name = "app.create_checkbook", skip(self), err)]
    pub async fn create_checkbook(
        &self,
        account_id: AccountId,
        start_number: Option<CheckNumber>,
        check_count: Option<i64>,
    ) -> Result<Checkbook, ApplicationError> {
        let mut tx = self.pool.begin().await?;
        let account = self
            .accounts
            .find_by_id_for_update(&mut tx, account_id)
            .await?;
        account.ensure_active()?;
        let start_number = match start_number {
            Some(start) => start,
            None => match self
                .checkbooks
                .list_for_account(account_id)
                .await?
                .iter()
                .map(|book| book.end_number)
                .max()
            {
                Some(end) => end.checked_add(1).ok_or_else(|| {
                    ApplicationError::Validation(
                        "no check numbers left after the existing checkbooks".to_string(),
                    )
                })?,
                None => self.config.default_first_check_number,
            },
        };
        let new_checkbook = NewCheckbook::builder()
            .account_id(account_id)
            .start_number(start_number)
            .check_count(check_count.unwrap_or(self.config.default_checkbook_size))
            .build()
            .map_err(|e| ApplicationError::Validation(e.to_string()))?;
        let checkbook = self.checkbooks.create_in_tx(&mut tx, new_checkbook).await?;
        tx.commit().await?;
        Ok(checkbook)
    }

    #[instrument(name = "app.list_checkbooks", skip(self), err)]
    pub async fn list_checkbooks(
        &self,
        account_id: AccountId,
    ) -> Result<Vec<Checkbook>, ApplicationError> {
        self.accounts.find_by_id(account_id).await?;
        Ok(self.checkbooks.list_for_account(account_id).await?)
    }

    #[instrument(name = "app.find_checkbook", skip(self), err)]
    pub async fn find_checkbook(
        &self,
        checkbook_id: CheckbookId,
    ) -> Result<Checkbook, ApplicationError> {
        Ok(self.checkbooks.find_by_id(checkbook_id).await?)
    }

    #[instrument(name = "app.deactivate_checkbook", skip(self), err)]
    pub async fn deactivate_checkbook(
        &self,
        checkbook_id: CheckbookId,
    ) -> Result<Checkbook, ApplicationError> {
        Ok(self.checkbooks.deactivate(checkbook_id).await?)
    }

    /// Assigns a number in the account's active checkbook, records the check
    /// as pending and debits the account right away, whichever numbering mode
    /// is used. Account and checkbook rows stay locked until commit.
    #[instrument(name = "app.issue_check", skip(self), err)]
    pub async fn issue_check(&self, request: CheckRequest) -> Result<IssuedCheck, ApplicationError> {
        request.validate().map_err(ApplicationError::Validation)?;

        let mut tx = self.pool.begin().await?;
        let account = self
            .accounts
            .find_by_id_for_update(&mut tx, request.account_id)
            .await?;
        account.ensure_active()?;
        account.ensure_sufficient_funds(request.amount)?;

        let checkbook = self
            .checkbooks
            .find_active_for_update(&mut tx, account.id)
            .await?;
        let used = self.checkbooks.used_numbers_in_tx(&mut tx, checkbook.id).await?;
        let number = checkbook.assign_number(request.numbering, &used)?;

        let new_check = NewCheck::builder()
            .checkbook_id(checkbook.id)
            .account_id(account.id)
            .number(number)
            .date(request.date)
            .beneficiary(request.beneficiary.trim())
            .amount(request.amount)
            .concept(request.concept)
            .build()
            .map_err(|e| ApplicationError::Validation(e.to_string()))?;
        let check = self.checks.create_in_tx(&mut tx, new_check).await?;

        if request.numbering.is_automatic() {
            let next_number = number
                .checked_add(1)
                .ok_or(CheckbookError::CheckbookExhausted(checkbook.id))?;
            self.checkbooks
                .advance_next_number_in_tx(&mut tx, checkbook.id, next_number)
                .await?;
        }

        let balance = account.current_balance - check.amount;
        self.accounts
            .set_current_balance_in_tx(&mut tx, account.id, balance)
            .await?;
        tx.commit().await?;

        tracing::info!(
            check_id = %check.id,
            number = check.number,
            %balance,
            "check issued"
        );
        Ok(IssuedCheck { check, balance })
    }

    #[instrument(name = "app.set_check_status", skip(self), err)]
    pub async fn set_check_status(
        &self,
        check_id: CheckId,
        status: CheckStatus,
    ) -> Result<CheckStatusUpdate, ApplicationError> {
        let mut tx = self.pool.begin().await?;
        let mut check = self.checks.find_by_id_for_update(&mut tx, check_id).await?;
        let account = self
            .accounts
            .find_by_id_for_update(&mut tx, check.account_id)
            .await?;

        let change = check.transition_to(status);
        if change.is_noop() {
            return Ok(CheckStatusUpdate {
                change,
                balance: account.current_balance,
            });
        }

        self.checks
            .update_status_in_tx(&mut tx, check.id, change.current)
            .await?;
        let balance = account.current_balance + change.adjustment;
        if !change.adjustment.is_zero() {
            self.accounts
                .set_current_balance_in_tx(&mut tx, account.id, balance)
                .await?;
        }
        tx.commit().await?;

        tracing::info!(
            check_id = %check.id,
            previous = %change.previous,
            current = %change.current,
            adjustment = %change.adjustment,
            "check status changed"
        );
        Ok(CheckStatusUpdate { change, balance })
    }

    #[instrument(name = "app.find_check", skip(self), err)]
    pub async fn find_check(&self, check_id: CheckId) -> Result<Check, ApplicationError> {
        Ok(self.checks.find_by_id(check_id).await?)
    }

    #[instrument(name = "app.list_checks", skip(self), err)]
    pub async fn list_checks(&self, filter: CheckFilter) -> Result<Vec<Check>, ApplicationError> {
        Ok(self.checks.list(filter).await?)
    }

    #[instrument(name = "app.update_check_details", skip(self), err)]
    pub async fn update_check_details(
        &self,
        check_id: CheckId,
        update: CheckDetailsUpdate,
    ) -> Result<Check, ApplicationError> {
        update.validate().map_err(ApplicationError::Validation)?;
        Ok(self.checks.update_details(check_id, update).await?)
    }

    #[instrument(name = "app.create_deposit", skip(self), err)]
    pub async fn create_deposit(&self, request: DepositRequest) -> Result<Deposit, ApplicationError> {
        let mut tx = self.pool.begin().await?;
        let account = self
            .accounts
            .find_by_id_for_update(&mut tx, request.account_id)
            .await?;
        account.ensure_active()?;

        let mut builder = NewDeposit::builder();
        builder
            .account_id(account.id)
            .kind(request.kind)
            .amount(request.amount)
            .description(request.description)
            .balance_before(account.current_balance);
        if let Some(reference) = request.reference {
            builder.reference(reference);
        }
        let new_deposit = builder
            .build()
            .map_err(|e| ApplicationError::Validation(e.to_string()))?;

        let deposit = self.deposits.create_in_tx(&mut tx, new_deposit).await?;
        self.accounts
            .set_current_balance_in_tx(&mut tx, account.id, deposit.balance_after)
            .await?;
        tx.commit().await?;
        Ok(deposit)
    }

    #[instrument(name = "app.list_deposits", skip(self), err)]
    pub async fn list_deposits(
        &self,
        account_id: AccountId,
    ) -> Result<Vec<Deposit>, ApplicationError> {
        self.accounts.find_by_id(account_id).await?;
        Ok(self.deposits.list_for_account(account_id).await?)
    }

    #[instrument(name = "app.recalculate_balance", skip(self), err)]
    pub async fn recalculate_balance(
        &self,
        account_id: AccountId,
    ) -> Result<BalanceRecalculation, ApplicationError> {
        let mut tx = self.pool.begin().await?;
        let account = self
            .accounts
            .find_by_id_for_update(&mut tx, account_id)
            .await?;
        let checks = self
            .checks
            .list_for_account_in_tx(&mut tx, account_id)
            .await?;
        let deposits_total = self
            .deposits
            .total_for_account_in_tx(&mut tx, account_id)
            .await?;
        let recalculated = recalculate_balance(account.initial_balance, &checks, deposits_total);
        let outcome = BalanceRecalculation::new(account.id, account.current_balance, recalculated);
        if outcome.drifted() {
            self.accounts
                .set_current_balance_in_tx(&mut tx, account.id, recalculated)
                .await?;
            tracing::warn!(
                account_id = %account.id,
                previous = %outcome.previous_balance,
                recalculated = %outcome.recalculated_balance,
                "balance drift corrected"
            );
        }
        tx.commit().await?;
        Ok(outcome)
    }

    #[instrument(name = "app.recalculate_all_balances", skip(self), err)]
    pub async fn recalculate_all_balances(
        &self,
    ) -> Result<Vec<BalanceRecalculation>, ApplicationError> {
        let mut outcomes = Vec::new();
        for account in self.accounts.list(true).await? {
            outcomes.push(self.recalculate_balance(account.id).await?);
        }
        Ok(outcomes)
    }

    #[instrument(name = "app.report", skip(self), err)]
    pub async fn report(
        &self,
        kind: ReportKind,
        account_id: Option<AccountId>,
    ) -> Result<Vec<ReportRow>, ApplicationError> {
        Ok(self.reports.checks(kind, account_id).await?)
    }
}
