#![allow(dead_code)]

use rand::distributions::{Alphanumeric, DistString};
use rust_decimal::Decimal;

use cheques::{account::*, app::*, primitives::*};

pub async fn init_pool() -> anyhow::Result<sqlx::PgPool> {
    let pg_host = std::env::var("PG_HOST").unwrap_or("localhost".to_string());
    let pg_con = format!("postgres://user:password@{pg_host}:5432/pg");
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(20)
        .connect(&pg_con)
        .await?;
    Ok(pool)
}

pub async fn init_app() -> anyhow::Result<App> {
    let pool = init_pool().await?;
    Ok(App::run(pool, AppConfig::default()).await?)
}

pub fn random_account_number() -> String {
    format!(
        "TEST_{}",
        Alphanumeric.sample_string(&mut rand::thread_rng(), 16)
    )
}

pub async fn create_test_account(
    app: &App,
    initial_balance: Decimal,
    first_check_number: CheckNumber,
    check_count: i64,
) -> anyhow::Result<CreatedAccount> {
    let new_account = NewAccount::builder()
        .name("Cuenta corriente")
        .account_number(random_account_number())
        .bank("Banco de Pruebas")
        .holder("Comercial Test Ltda")
        .initial_balance(initial_balance)
        .build()?;
    Ok(app
        .create_account(new_account, Some(first_check_number), Some(check_count))
        .await?)
}

pub fn today() -> chrono::NaiveDate {
    chrono::Utc::now().date_naive()
}
