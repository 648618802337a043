use anyhow::Context;
use chrono::NaiveDate;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use url::Url;

use crate::{primitives::*, report::ReportKind};

pub struct ApiClientConfig {
    pub url: Url,
}

impl Default for ApiClientConfig {
    fn default() -> Self {
        Self {
            url: Url::parse("http://localhost:2750").expect("static url"),
        }
    }
}

pub struct ApiClient {
    config: ApiClientConfig,
    client: Client,
}

impl ApiClient {
    pub fn new(config: ApiClientConfig) -> Self {
        Self {
            config,
            client: Client::new(),
        }
    }

    fn endpoint(&self, path: &str) -> anyhow::Result<Url> {
        self.config
            .url
            .join(&format!("api/{path}"))
            .context("Couldn't build endpoint url")
    }

    async fn parse<T: DeserializeOwned>(&self, response: Response) -> anyhow::Result<T> {
        let status = response.status();
        let body: serde_json::Value = response.json().await.context("Couldn't parse response")?;
        if !status.is_success() {
            let message = body
                .get("error")
                .and_then(|e| e.as_str())
                .unwrap_or("unknown error");
            anyhow::bail!("{status}: {message}");
        }
        Ok(serde_json::from_value(body)?)
    }

    async fn get(&self, path: &str, query: &[(&str, String)]) -> anyhow::Result<serde_json::Value> {
        let response = self
            .client
            .get(self.endpoint(path)?)
            .query(query)
            .send()
            .await
            .with_context(|| format!("Couldn't connect to server at {}", self.config.url))?;
        self.parse(response).await
    }

    async fn send(
        &self,
        method: reqwest::Method,
        path: &str,
        body: serde_json::Value,
    ) -> anyhow::Result<serde_json::Value> {
        let response = self
            .client
            .request(method, self.endpoint(path)?)
            .json(&body)
            .send()
            .await
            .with_context(|| format!("Couldn't connect to server at {}", self.config.url))?;
        self.parse(response).await
    }

    pub async fn list_accounts(&self, include_inactive: bool) -> anyhow::Result<()> {
        let accounts = self
            .get(
                "accounts",
                &[("include_inactive", include_inactive.to_string())],
            )
            .await?;
        output_json(accounts)
    }

    pub async fn issue_check(
        &self,
        account_id: AccountId,
        date: NaiveDate,
        beneficiary: String,
        amount: Decimal,
        concept: Option<String>,
        number: Option<CheckNumber>,
    ) -> anyhow::Result<()> {
        let issued = self
            .send(
                reqwest::Method::POST,
                "checks",
                serde_json::json!({
                    "account_id": account_id,
                    "date": date,
                    "beneficiary": beneficiary,
                    "amount": amount,
                    "concept": concept,
                    "number": number,
                    "manual_number": number.is_some(),
                }),
            )
            .await?;
        output_json(issued)
    }

    pub async fn set_check_status(
        &self,
        check_id: CheckId,
        status: CheckStatus,
    ) -> anyhow::Result<()> {
        let update = self
            .send(
                reqwest::Method::PUT,
                &format!("checks/{check_id}/status"),
                serde_json::json!({ "status": status }),
            )
            .await?;
        output_json(update)
    }

    pub async fn create_deposit(
        &self,
        account_id: AccountId,
        kind: DepositKind,
        amount: Decimal,
        description: Option<String>,
        reference: Option<String>,
    ) -> anyhow::Result<()> {
        let deposit = self
            .send(
                reqwest::Method::POST,
                "deposits",
                serde_json::json!({
                    "account_id": account_id,
                    "kind": kind,
                    "amount": amount,
                    "description": description,
                    "reference": reference,
                }),
            )
            .await?;
        output_json(deposit)
    }

    pub async fn report(&self, kind: ReportKind, account_id: Option<AccountId>) -> anyhow::Result<()> {
        let path = match kind {
            ReportKind::ByMonth => "reports/by-month",
            ReportKind::ByBeneficiary => "reports/by-beneficiary",
            ReportKind::ByStatus => "reports/by-status",
        };
        let query: Vec<(&str, String)> = account_id
            .map(|id| vec![("account_id", id.to_string())])
            .unwrap_or_default();
        let rows = self.get(path, &query).await?;
        output_json(rows)
    }
}

fn output_json(value: serde_json::Value) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}
