use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{
    account::{error::AccountError, *},
    app::{error::ApplicationError, CheckStatusUpdate},
    check::{error::CheckError, *},
    checkbook::{error::CheckbookError, *},
    deposit::{error::DepositError, *},
    primitives::*,
};

#[derive(Debug, Deserialize)]
pub struct CreateAccountRequest {
    pub name: String,
    pub account_number: String,
    #[serde(default)]
    pub bank: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub account_type: Option<AccountType>,
    #[serde(default)]
    pub holder: Option<String>,
    #[serde(default)]
    pub initial_balance: Option<Decimal>,
    #[serde(default)]
    pub first_check_number: Option<CheckNumber>,
    #[serde(default)]
    pub check_count: Option<i64>,
}

impl TryFrom<CreateAccountRequest> for NewAccount {
    type Error = ApplicationError;

    fn try_from(request: CreateAccountRequest) -> Result<Self, Self::Error> {
        let mut builder = NewAccount::builder();
        builder
            .name(request.name.trim())
            .account_number(request.account_number.trim());
        if let Some(bank) = request.bank {
            builder.bank(bank);
        }
        if let Some(currency) = request.currency {
            builder.currency(currency);
        }
        if let Some(account_type) = request.account_type {
            builder.account_type(account_type);
        }
        if let Some(holder) = request.holder {
            builder.holder(holder);
        }
        if let Some(initial_balance) = request.initial_balance {
            builder.initial_balance(initial_balance);
        }
        builder
            .build()
            .map_err(|e| ApplicationError::Validation(e.to_string()))
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateAccountRequest {
    pub name: Option<String>,
    pub bank: Option<String>,
    pub currency: Option<String>,
    pub account_type: Option<AccountType>,
    pub holder: Option<String>,
}

impl From<UpdateAccountRequest> for AccountUpdate {
    fn from(request: UpdateAccountRequest) -> Self {
        Self {
            name: request.name,
            bank: request.bank,
            currency: request.currency,
            account_type: request.account_type,
            holder: request.holder,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ListAccountsQuery {
    #[serde(default)]
    pub include_inactive: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct CreateCheckbookRequest {
    pub start_number: Option<CheckNumber>,
    pub check_count: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct CheckbookResponse {
    #[serde(flatten)]
    pub checkbook: Checkbook,
    pub remaining: i64,
}

impl From<Checkbook> for CheckbookResponse {
    fn from(checkbook: Checkbook) -> Self {
        Self {
            remaining: checkbook.remaining(),
            checkbook,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AccountCreatedResponse {
    pub account: Account,
    pub checkbook: CheckbookResponse,
}

#[derive(Debug, Deserialize)]
pub struct IssueCheckRequest {
    pub account_id: AccountId,
    pub date: NaiveDate,
    pub beneficiary: String,
    pub amount: Decimal,
    #[serde(default)]
    pub concept: Option<String>,
    #[serde(default)]
    pub number: Option<CheckNumber>,
    #[serde(default)]
    pub manual_number: bool,
}

impl TryFrom<IssueCheckRequest> for CheckRequest {
    type Error = ApplicationError;

    fn try_from(request: IssueCheckRequest) -> Result<Self, Self::Error> {
        let numbering = match (request.manual_number, request.number) {
            (true, Some(number)) => Numbering::Manual(number),
            (true, None) => {
                return Err(ApplicationError::Validation(
                    "manual numbering requires a check number".to_string(),
                ))
            }
            (false, _) => Numbering::Automatic,
        };
        Ok(Self {
            account_id: request.account_id,
            date: request.date,
            beneficiary: request.beneficiary,
            amount: request.amount,
            concept: request.concept.unwrap_or_default(),
            numbering,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct IssuedCheckResponse {
    pub check: Check,
    pub number: CheckNumber,
    pub balance: Decimal,
}

impl From<IssuedCheck> for IssuedCheckResponse {
    fn from(issued: IssuedCheck) -> Self {
        Self {
            number: issued.check.number,
            check: issued.check,
            balance: issued.balance,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateCheckRequest {
    pub date: Option<NaiveDate>,
    pub beneficiary: Option<String>,
    pub concept: Option<String>,
}

impl From<UpdateCheckRequest> for CheckDetailsUpdate {
    fn from(request: UpdateCheckRequest) -> Self {
        Self {
            date: request.date,
            beneficiary: request.beneficiary,
            concept: request.concept,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SetCheckStatusRequest {
    pub status: CheckStatus,
}

#[derive(Debug, Serialize)]
pub struct CheckStatusResponse {
    pub check_id: CheckId,
    pub previous_status: CheckStatus,
    pub new_status: CheckStatus,
    pub adjustment: Decimal,
    pub balance: Decimal,
}

impl From<CheckStatusUpdate> for CheckStatusResponse {
    fn from(update: CheckStatusUpdate) -> Self {
        Self {
            check_id: update.change.check_id,
            previous_status: update.change.previous,
            new_status: update.change.current,
            adjustment: update.change.adjustment,
            balance: update.balance,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ListChecksQuery {
    pub account_id: Option<AccountId>,
    pub checkbook_id: Option<CheckbookId>,
    pub status: Option<CheckStatus>,
    pub beneficiary: Option<String>,
}

impl From<ListChecksQuery> for CheckFilter {
    fn from(query: ListChecksQuery) -> Self {
        Self {
            account_id: query.account_id,
            checkbook_id: query.checkbook_id,
            status: query.status,
            beneficiary: query.beneficiary.filter(|b| !b.trim().is_empty()),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateDepositRequest {
    pub account_id: AccountId,
    #[serde(default)]
    pub kind: DepositKind,
    pub amount: Decimal,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub reference: Option<String>,
}

impl From<CreateDepositRequest> for DepositRequest {
    fn from(request: CreateDepositRequest) -> Self {
        Self {
            account_id: request.account_id,
            kind: request.kind,
            amount: request.amount,
            description: request.description.unwrap_or_default(),
            reference: request.reference.filter(|r| !r.trim().is_empty()),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ReportQuery {
    pub account_id: Option<AccountId>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorResponse {
                error: self.message,
            }),
        )
            .into_response()
    }
}

impl From<ApplicationError> for ApiError {
    fn from(err: ApplicationError) -> Self {
        let status = match &err {
            ApplicationError::Validation(_) => StatusCode::BAD_REQUEST,
            ApplicationError::AccountError(e) => match e {
                AccountError::AccountNotFound(_) => StatusCode::NOT_FOUND,
                AccountError::AccountInactive(_) | AccountError::AccountNumberAlreadyExists => {
                    StatusCode::CONFLICT
                }
                AccountError::InsufficientFunds { .. } => StatusCode::UNPROCESSABLE_ENTITY,
                AccountError::Sqlx(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApplicationError::CheckbookError(e) => match e {
                CheckbookError::CheckbookNotFound(_) => StatusCode::NOT_FOUND,
                CheckbookError::NumberOutOfRange { .. } => StatusCode::BAD_REQUEST,
                CheckbookError::NoActiveCheckbook(_)
                | CheckbookError::OverlappingRange { .. }
                | CheckbookError::NumberAlreadyUsed(_)
                | CheckbookError::CheckbookExhausted(_) => StatusCode::CONFLICT,
                CheckbookError::Sqlx(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApplicationError::CheckError(e) => match e {
                CheckError::CheckNotFound(_) => StatusCode::NOT_FOUND,
                CheckError::NumberAlreadyUsed => StatusCode::CONFLICT,
                CheckError::Sqlx(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApplicationError::DepositError(e) => match e {
                DepositError::BalanceOutOfRange { .. } => StatusCode::UNPROCESSABLE_ENTITY,
                DepositError::Sqlx(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApplicationError::ReportError(_)
            | ApplicationError::Sqlx(_)
            | ApplicationError::Server(_)
            | ApplicationError::Migrate(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %err, "request failed");
            return Self::new(status, "internal server error");
        }
        Self::new(status, strip_prefix(&err.to_string()))
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::new(StatusCode::BAD_REQUEST, rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::new(StatusCode::BAD_REQUEST, rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::new(StatusCode::BAD_REQUEST, rejection.body_text())
    }
}

/// Error variants render as `Kind - message`; clients only get the message.
fn strip_prefix(message: &str) -> String {
    match message.split_once(" - ") {
        Some((kind, rest)) if kind.ends_with("Error") => rest.to_string(),
        _ => message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_numbering_needs_a_number() {
        let request: IssueCheckRequest = serde_json::from_value(serde_json::json!({
            "account_id": "1e0f3b8a-7a0e-4bb6-9c53-0d8f1f5c2a11",
            "date": "2024-03-15",
            "beneficiary": "Proveedor",
            "amount": 15000,
            "manual_number": true
        }))
        .unwrap();
        assert!(matches!(
            CheckRequest::try_from(request),
            Err(ApplicationError::Validation(_))
        ));
    }

    #[test]
    fn number_without_manual_flag_is_automatic() {
        let request: IssueCheckRequest = serde_json::from_value(serde_json::json!({
            "account_id": "1e0f3b8a-7a0e-4bb6-9c53-0d8f1f5c2a11",
            "date": "2024-03-15",
            "beneficiary": "Proveedor",
            "amount": "15000.00",
            "number": 7
        }))
        .unwrap();
        let request = CheckRequest::try_from(request).unwrap();
        assert_eq!(request.numbering, Numbering::Automatic);
    }

    #[test]
    fn error_status_mapping() {
        let err = ApiError::from(ApplicationError::from(AccountError::InsufficientFunds {
            available: Decimal::ONE,
            requested: Decimal::TEN,
        }));
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let err = ApiError::from(ApplicationError::from(CheckbookError::NumberOutOfRange {
            number: 10,
            start: 1,
            end: 5,
        }));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            err.message,
            "Check number 10 is outside the checkbook range 1-5"
        );

        let err = ApiError::from(ApplicationError::from(CheckError::CheckNotFound(
            CheckId::new(),
        )));
        assert_eq!(err.status(), StatusCode::NOT_FOUND);

        let err = ApiError::from(ApplicationError::from(DepositError::BalanceOutOfRange {
            balance: Decimal::ONE,
            amount: Decimal::TEN,
        }));
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn backend_errors_are_not_leaked() {
        let err = ApiError::from(ApplicationError::Sqlx(sqlx::Error::PoolTimedOut));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message, "internal server error");
    }
}
