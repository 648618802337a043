mod api_client;
mod config;
mod db;

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use url::Url;

use crate::{primitives::*, report::ReportKind};
use config::*;

#[derive(Parser)]
#[clap(version, long_about = None)]
struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Runs the api server
    Run {
        /// Sets a custom config file
        #[clap(
            short,
            long,
            env = "CHEQUES_CONFIG",
            default_value = "cheques.yml",
            value_name = "FILE"
        )]
        config: PathBuf,
        /// Connection string for the cheques database
        #[clap(env = "PG_CON", default_value = "")]
        db_con: String,
    },
    /// Recomputes every account balance from its checks and deposits
    RecalculateBalances {
        #[clap(
            short,
            long,
            env = "CHEQUES_CONFIG",
            default_value = "cheques.yml",
            value_name = "FILE"
        )]
        config: PathBuf,
        #[clap(env = "PG_CON", default_value = "")]
        db_con: String,
    },
    /// Talks to a running server
    Client {
        #[clap(subcommand)]
        command: ClientCommand,
        #[clap(short, long, action, value_parser, env = "CHEQUES_API_URL")]
        url: Option<Url>,
    },
}

#[derive(Subcommand)]
enum ClientCommand {
    ListAccounts {
        #[clap(long, action)]
        include_inactive: bool,
    },
    IssueCheck {
        #[clap(short, long, value_parser)]
        account_id: AccountId,
        #[clap(short, long, value_parser)]
        date: NaiveDate,
        #[clap(short, long, value_parser)]
        beneficiary: String,
        #[clap(long, value_parser)]
        amount: Decimal,
        #[clap(short, long, value_parser)]
        concept: Option<String>,
        /// Uses this number instead of the next one in the active checkbook
        #[clap(short, long, value_parser)]
        number: Option<CheckNumber>,
    },
    SetCheckStatus {
        #[clap(short, long, value_parser)]
        check_id: CheckId,
        #[clap(short, long, value_parser)]
        status: CheckStatus,
    },
    Deposit {
        #[clap(short, long, value_parser)]
        account_id: AccountId,
        #[clap(short, long, value_enum, default_value = "deposit")]
        kind: DepositKind,
        #[clap(long, value_parser)]
        amount: Decimal,
        #[clap(short, long, value_parser)]
        description: Option<String>,
        #[clap(short, long, value_parser)]
        reference: Option<String>,
    },
    Report {
        #[clap(value_enum)]
        kind: ReportKind,
        #[clap(short, long, value_parser)]
        account_id: Option<AccountId>,
    },
}

pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Run { config, db_con } => {
            let config = Config::from_path(config, EnvOverride { db_con })?;
            run_cmd(config).await?;
        }
        Command::RecalculateBalances { config, db_con } => {
            let config = Config::from_path(config, EnvOverride { db_con })?;
            recalculate_cmd(config).await?;
        }
        Command::Client { command, url } => {
            let client = api_client::ApiClient::new(
                url.map(|url| api_client::ApiClientConfig { url })
                    .unwrap_or_default(),
            );
            match command {
                ClientCommand::ListAccounts { include_inactive } => {
                    client.list_accounts(include_inactive).await?;
                }
                ClientCommand::IssueCheck {
                    account_id,
                    date,
                    beneficiary,
                    amount,
                    concept,
                    number,
                } => {
                    client
                        .issue_check(account_id, date, beneficiary, amount, concept, number)
                        .await?;
                }
                ClientCommand::SetCheckStatus { check_id, status } => {
                    client.set_check_status(check_id, status).await?;
                }
                ClientCommand::Deposit {
                    account_id,
                    kind,
                    amount,
                    description,
                    reference,
                } => {
                    client
                        .create_deposit(account_id, kind, amount, description, reference)
                        .await?;
                }
                ClientCommand::Report { kind, account_id } => {
                    client.report(kind, account_id).await?;
                }
            }
        }
    }
    Ok(())
}

async fn run_cmd(
    Config {
        db,
        app,
        api,
        tracing,
    }: Config,
) -> anyhow::Result<()> {
    crate::tracing::init_tracer(tracing)?;
    println!("Starting server processes");
    let pool = db::init_pool(&db).await?;
    super::api::run(pool, api, app)
        .await
        .context("Api server error")
}

async fn recalculate_cmd(Config { db, app, .. }: Config) -> anyhow::Result<()> {
    let pool = db::init_pool(&db).await?;
    let app = crate::app::App::run(pool, app).await?;
    for outcome in app.recalculate_all_balances().await? {
        println!(
            "{}: {} -> {} ({})",
            outcome.account_id,
            outcome.previous_balance,
            outcome.recalculated_balance,
            outcome.difference
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn run_takes_config_and_connection_only() {
        let cli = Cli::try_parse_from(["cheques", "run", "--config", "local.yml", "postgres://db"])
            .unwrap();
        match cli.command {
            Command::Run { config, db_con } => {
                assert_eq!(config, PathBuf::from("local.yml"));
                assert_eq!(db_con, "postgres://db");
            }
            _ => panic!("expected run"),
        }
        assert!(Cli::try_parse_from(["cheques", "run", "postgres://db", "true"]).is_err());
    }

    #[test]
    fn report_kind_parses_kebab_case() {
        let cli = Cli::try_parse_from(["cheques", "client", "report", "by-beneficiary"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Client {
                command: ClientCommand::Report {
                    kind: ReportKind::ByBeneficiary,
                    account_id: None
                },
                ..
            }
        ));
    }
}
