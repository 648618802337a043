use chrono::{DateTime, Utc};
use derive_builder::Builder;
use serde::Serialize;

use super::error::AccountError;
use crate::primitives::*;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Account {
    pub id: AccountId,
    pub name: String,
    pub account_number: String,
    pub bank: String,
    pub currency: String,
    pub account_type: AccountType,
    pub holder: String,
    pub initial_balance: Decimal,
    pub current_balance: Decimal,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

impl Account {
    pub fn ensure_active(&self) -> Result<(), AccountError> {
        if !self.active {
            return Err(AccountError::AccountInactive(self.id));
        }
        Ok(())
    }

    pub fn ensure_sufficient_funds(&self, amount: Decimal) -> Result<(), AccountError> {
        if self.current_balance < amount {
            return Err(AccountError::InsufficientFunds {
                available: self.current_balance,
                requested: amount,
            });
        }
        Ok(())
    }
}

#[derive(Builder, Clone, Debug)]
#[builder(build_fn(validate = "Self::validate"))]
pub struct NewAccount {
    #[builder(setter(skip), default = "AccountId::new()")]
    pub(super) id: AccountId,
    #[builder(setter(into))]
    pub(super) name: String,
    #[builder(setter(into))]
    pub(super) account_number: String,
    #[builder(setter(into), default)]
    pub(super) bank: String,
    #[builder(setter(custom), default = "\"CLP\".to_string()")]
    pub(super) currency: String,
    #[builder(default)]
    pub(super) account_type: AccountType,
    #[builder(setter(into), default)]
    pub(super) holder: String,
    #[builder(default)]
    pub(super) initial_balance: Decimal,
}

impl NewAccount {
    pub fn builder() -> NewAccountBuilder {
        NewAccountBuilder::default()
    }
}

impl NewAccountBuilder {
    pub fn currency(&mut self, currency: impl AsRef<str>) -> &mut Self {
        self.currency = Some(currency.as_ref().trim().to_uppercase());
        self
    }

    fn validate(&self) -> Result<(), String> {
        if self.name.as_ref().map(|n| n.trim().is_empty()).unwrap_or(true) {
            return Err("account name is required".to_string());
        }
        if self
            .account_number
            .as_ref()
            .map(|n| n.trim().is_empty())
            .unwrap_or(true)
        {
            return Err("account number is required".to_string());
        }
        if let Some(currency) = self.currency.as_ref() {
            validate_currency(currency)?;
        }
        if let Some(balance) = self.initial_balance {
            if balance.is_sign_negative() {
                return Err("initial balance cannot be negative".to_string());
            }
            validate_amount(balance)?;
        }
        Ok(())
    }
}

/// Descriptive fields that can be changed after creation. Balances are never
/// edited directly.
#[derive(Debug, Default, Clone)]
pub struct AccountUpdate {
    pub name: Option<String>,
    pub bank: Option<String>,
    pub currency: Option<String>,
    pub account_type: Option<AccountType>,
    pub holder: Option<String>,
}

impl AccountUpdate {
    pub fn validate(&self) -> Result<(), String> {
        if let Some(name) = self.name.as_ref() {
            if name.trim().is_empty() {
                return Err("account name cannot be empty".to_string());
            }
        }
        if let Some(currency) = self.currency.as_ref() {
            validate_currency(currency)?;
        }
        Ok(())
    }
}

fn validate_currency(currency: &str) -> Result<(), String> {
    if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(format!("invalid currency code '{currency}'"));
    }
    Ok(())
}
