mod helpers;

use rust_decimal_macros::dec;

use cheques::{
    account::error::AccountError,
    app::error::ApplicationError,
    check::*,
    checkbook::Numbering,
    deposit::*,
    primitives::*,
};

async fn issue(
    app: &cheques::app::App,
    account_id: AccountId,
    amount: Decimal,
) -> anyhow::Result<Check> {
    let issued = app
        .issue_check(CheckRequest {
            account_id,
            date: helpers::today(),
            beneficiary: "Servicios Generales".to_string(),
            amount,
            concept: String::new(),
            numbering: Numbering::Automatic,
        })
        .await?;
    Ok(issued.check)
}

fn deposit(account_id: AccountId, amount: Decimal) -> DepositRequest {
    DepositRequest {
        account_id,
        kind: DepositKind::Transfer,
        amount,
        description: "Pago cliente".to_string(),
        reference: Some("TRX-001".to_string()),
    }
}

#[tokio::test]
async fn deposit_credits_account() -> anyhow::Result<()> {
    let app = helpers::init_app().await?;
    let created = helpers::create_test_account(&app, dec!(1000), 1, 10).await?;
    let account_id = created.account.id;

    let deposit = app.create_deposit(deposit(account_id, dec!(250.50))).await?;
    assert_eq!(deposit.balance_before, dec!(1000));
    assert_eq!(deposit.balance_after, dec!(1250.50));
    assert_eq!(deposit.status, DEPOSIT_STATUS_COMPLETED);
    assert_eq!(
        app.find_account(account_id).await?.current_balance,
        dec!(1250.50)
    );

    let deposits = app.list_deposits(account_id).await?;
    assert_eq!(deposits.len(), 1);
    assert_eq!(deposits[0].reference.as_deref(), Some("TRX-001"));

    Ok(())
}

#[tokio::test]
async fn deposit_requires_positive_amount_and_active_account() -> anyhow::Result<()> {
    let app = helpers::init_app().await?;
    let created = helpers::create_test_account(&app, dec!(1000), 1, 10).await?;
    let account_id = created.account.id;

    let err = app.create_deposit(deposit(account_id, dec!(-5))).await;
    assert!(matches!(err, Err(ApplicationError::Validation(_))));

    app.deactivate_account(account_id).await?;
    let err = app.create_deposit(deposit(account_id, dec!(5))).await;
    assert!(matches!(
        err,
        Err(ApplicationError::AccountError(
            AccountError::AccountInactive(_)
        ))
    ));

    Ok(())
}

#[tokio::test]
async fn recalculation_is_idempotent() -> anyhow::Result<()> {
    let app = helpers::init_app().await?;
    let created = helpers::create_test_account(&app, dec!(100000), 1, 10).await?;
    let account_id = created.account.id;

    let first = issue(&app, account_id, dec!(15000)).await?;
    let second = issue(&app, account_id, dec!(5000)).await?;
    issue(&app, account_id, dec!(2500)).await?;
    app.set_check_status(first.id, CheckStatus::Issued).await?;
    app.set_check_status(second.id, CheckStatus::Cleared).await?;
    app.create_deposit(deposit(account_id, dec!(1000))).await?;

    let outcome = app.recalculate_balance(account_id).await?;
    // Issuing debits pending checks, recalculation only counts issued and cleared ones.
    assert_eq!(outcome.previous_balance, dec!(78500));
    assert_eq!(outcome.recalculated_balance, dec!(81000));

    let again = app.recalculate_balance(account_id).await?;
    assert_eq!(again.previous_balance, dec!(81000));
    assert_eq!(again.recalculated_balance, dec!(81000));
    assert!(!again.drifted());

    Ok(())
}

#[tokio::test]
async fn recalculation_corrects_drift() -> anyhow::Result<()> {
    let pool = helpers::init_pool().await?;
    let app = cheques::app::App::run(pool.clone(), Default::default()).await?;
    let created = helpers::create_test_account(&app, dec!(5000), 1, 10).await?;
    let account_id = created.account.id;
    let check = issue(&app, account_id, dec!(1200)).await?;
    app.set_check_status(check.id, CheckStatus::Cleared).await?;

    sqlx::query("UPDATE cheques_accounts SET current_balance = 1 WHERE id = $1")
        .bind(account_id)
        .execute(&pool)
        .await?;

    let outcome = app.recalculate_balance(account_id).await?;
    assert!(outcome.drifted());
    assert_eq!(outcome.previous_balance, dec!(1));
    assert_eq!(outcome.recalculated_balance, dec!(3800));
    assert_eq!(outcome.difference, dec!(3799));
    assert_eq!(
        app.find_account(account_id).await?.current_balance,
        dec!(3800)
    );

    Ok(())
}

#[tokio::test]
async fn cancelled_checks_do_not_count() -> anyhow::Result<()> {
    let app = helpers::init_app().await?;
    let created = helpers::create_test_account(&app, dec!(2000), 1, 10).await?;
    let account_id = created.account.id;

    let check = issue(&app, account_id, dec!(700)).await?;
    app.set_check_status(check.id, CheckStatus::Issued).await?;
    app.set_check_status(check.id, CheckStatus::Cancelled).await?;

    let outcome = app.recalculate_balance(account_id).await?;
    assert_eq!(outcome.recalculated_balance, dec!(2000));
    assert!(!outcome.drifted());

    Ok(())
}
