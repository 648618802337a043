mod convert;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::instrument;

use super::config::*;
use crate::{
    account::{Account, BalanceRecalculation},
    app::{error::ApplicationError, *},
    check::Check,
    deposit::Deposit,
    primitives::*,
    report::{ReportKind, ReportRow},
};

pub use convert::*;

type ApiResult<T> = Result<Json<T>, ApiError>;

pub fn router(app: App) -> Router {
    let api = Router::new()
        .route("/health", get(health))
        .route("/accounts", get(list_accounts).post(create_account))
        .route(
            "/accounts/:account_id",
            get(find_account).put(update_account).delete(deactivate_account),
        )
        .route("/accounts/:account_id/recalculate", post(recalculate_balance))
        .route(
            "/accounts/:account_id/checkbooks",
            get(list_checkbooks).post(create_checkbook),
        )
        .route("/accounts/:account_id/deposits", get(list_deposits))
        .route(
            "/checkbooks/:checkbook_id",
            get(find_checkbook).delete(deactivate_checkbook),
        )
        .route("/checks", get(list_checks).post(issue_check))
        .route("/checks/:check_id", get(find_check).put(update_check))
        .route("/checks/:check_id/status", put(set_check_status))
        .route("/deposits", post(create_deposit))
        .route("/reports/by-month", get(report_by_month))
        .route("/reports/by-beneficiary", get(report_by_beneficiary))
        .route("/reports/by-status", get(report_by_status))
        .with_state(app);

    Router::new()
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

pub(crate) async fn start(server_config: ApiConfig, app: App) -> Result<(), ApplicationError> {
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", server_config.listen_port)).await?;
    println!("Starting main server on port {}", server_config.listen_port);
    axum::serve(listener, router(app))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "could not listen for shutdown signal");
    }
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

#[instrument(skip_all, err(Debug))]
async fn list_accounts(
    State(app): State<App>,
    query: Result<Query<ListAccountsQuery>, QueryRejection>,
) -> ApiResult<Vec<Account>> {
    let Query(query) = query?;
    Ok(Json(app.list_accounts(query.include_inactive).await?))
}

#[instrument(skip_all, err(Debug))]
async fn create_account(
    State(app): State<App>,
    payload: Result<Json<CreateAccountRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<AccountCreatedResponse>), ApiError> {
    let Json(request) = payload?;
    let first_check_number = request.first_check_number;
    let check_count = request.check_count;
    let created = app
        .create_account(request.try_into()?, first_check_number, check_count)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(AccountCreatedResponse {
            account: created.account,
            checkbook: created.checkbook.into(),
        }),
    ))
}

#[instrument(skip_all, err(Debug))]
async fn find_account(
    State(app): State<App>,
    account_id: Result<Path<AccountId>, PathRejection>,
) -> ApiResult<Account> {
    let Path(account_id) = account_id?;
    Ok(Json(app.find_account(account_id).await?))
}

#[instrument(skip_all, err(Debug))]
async fn update_account(
    State(app): State<App>,
    account_id: Result<Path<AccountId>, PathRejection>,
    payload: Result<Json<UpdateAccountRequest>, JsonRejection>,
) -> ApiResult<Account> {
    let Path(account_id) = account_id?;
    let Json(request) = payload?;
    Ok(Json(app.update_account(account_id, request.into()).await?))
}

#[instrument(skip_all, err(Debug))]
async fn deactivate_account(
    State(app): State<App>,
    account_id: Result<Path<AccountId>, PathRejection>,
) -> ApiResult<Account> {
    let Path(account_id) = account_id?;
    Ok(Json(app.deactivate_account(account_id).await?))
}

#[instrument(skip_all, err(Debug))]
async fn recalculate_balance(
    State(app): State<App>,
    account_id: Result<Path<AccountId>, PathRejection>,
) -> ApiResult<BalanceRecalculation> {
    let Path(account_id) = account_id?;
    Ok(Json(app.recalculate_balance(account_id).await?))
}

#[instrument(skip_all, err(Debug))]
async fn list_checkbooks(
    State(app): State<App>,
    account_id: Result<Path<AccountId>, PathRejection>,
) -> ApiResult<Vec<CheckbookResponse>> {
    let Path(account_id) = account_id?;
    let checkbooks = app.list_checkbooks(account_id).await?;
    Ok(Json(
        checkbooks.into_iter().map(CheckbookResponse::from).collect(),
    ))
}

#[instrument(skip_all, err(Debug))]
async fn create_checkbook(
    State(app): State<App>,
    account_id: Result<Path<AccountId>, PathRejection>,
    payload: Result<Json<CreateCheckbookRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CheckbookResponse>), ApiError> {
    let Path(account_id) = account_id?;
    let Json(request) = payload?;
    let checkbook = app
        .create_checkbook(account_id, request.start_number, request.check_count)
        .await?;
    Ok((StatusCode::CREATED, Json(checkbook.into())))
}

#[instrument(skip_all, err(Debug))]
async fn find_checkbook(
    State(app): State<App>,
    checkbook_id: Result<Path<CheckbookId>, PathRejection>,
) -> ApiResult<CheckbookResponse> {
    let Path(checkbook_id) = checkbook_id?;
    Ok(Json(app.find_checkbook(checkbook_id).await?.into()))
}

#[instrument(skip_all, err(Debug))]
async fn deactivate_checkbook(
    State(app): State<App>,
    checkbook_id: Result<Path<CheckbookId>, PathRejection>,
) -> ApiResult<CheckbookResponse> {
    let Path(checkbook_id) = checkbook_id?;
    Ok(Json(app.deactivate_checkbook(checkbook_id).await?.into()))
}

#[instrument(skip_all, err(Debug))]
async fn list_checks(
    State(app): State<App>,
    query: Result<Query<ListChecksQuery>, QueryRejection>,
) -> ApiResult<Vec<Check>> {
    let Query(query) = query?;
    Ok(Json(app.list_checks(query.into()).await?))
}

#[instrument(skip_all, err(Debug))]
async fn issue_check(
    State(app): State<App>,
    payload: Result<Json<IssueCheckRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<IssuedCheckResponse>), ApiError> {
    let Json(request) = payload?;
    let issued = app.issue_check(request.try_into()?).await?;
    Ok((StatusCode::CREATED, Json(issued.into())))
}

#[instrument(skip_all, err(Debug))]
async fn find_check(
    State(app): State<App>,
    check_id: Result<Path<CheckId>, PathRejection>,
) -> ApiResult<Check> {
    let Path(check_id) = check_id?;
    Ok(Json(app.find_check(check_id).await?))
}

#[instrument(skip_all, err(Debug))]
async fn update_check(
    State(app): State<App>,
    check_id: Result<Path<CheckId>, PathRejection>,
    payload: Result<Json<UpdateCheckRequest>, JsonRejection>,
) -> ApiResult<Check> {
    let Path(check_id) = check_id?;
    let Json(request) = payload?;
    Ok(Json(
        app.update_check_details(check_id, request.into()).await?,
    ))
}

#[instrument(skip_all, err(Debug))]
async fn set_check_status(
    State(app): State<App>,
    check_id: Result<Path<CheckId>, PathRejection>,
    payload: Result<Json<SetCheckStatusRequest>, JsonRejection>,
) -> ApiResult<CheckStatusResponse> {
    let Path(check_id) = check_id?;
    let Json(request) = payload?;
    Ok(Json(
        app.set_check_status(check_id, request.status).await?.into(),
    ))
}

#[instrument(skip_all, err(Debug))]
async fn list_deposits(
    State(app): State<App>,
    account_id: Result<Path<AccountId>, PathRejection>,
) -> ApiResult<Vec<Deposit>> {
    let Path(account_id) = account_id?;
    Ok(Json(app.list_deposits(account_id).await?))
}

#[instrument(skip_all, err(Debug))]
async fn create_deposit(
    State(app): State<App>,
    payload: Result<Json<CreateDepositRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Deposit>), ApiError> {
    let Json(request) = payload?;
    let deposit = app.create_deposit(request.into()).await?;
    Ok((StatusCode::CREATED, Json(deposit)))
}

async fn report(
    app: App,
    kind: ReportKind,
    query: Result<Query<ReportQuery>, QueryRejection>,
) -> ApiResult<Vec<ReportRow>> {
    let Query(query) = query?;
    Ok(Json(app.report(kind, query.account_id).await?))
}

async fn report_by_month(
    State(app): State<App>,
    query: Result<Query<ReportQuery>, QueryRejection>,
) -> ApiResult<Vec<ReportRow>> {
    report(app, ReportKind::ByMonth, query).await
}

async fn report_by_beneficiary(
    State(app): State<App>,
    query: Result<Query<ReportQuery>, QueryRejection>,
) -> ApiResult<Vec<ReportRow>> {
    report(app, ReportKind::ByBeneficiary, query).await
}

async fn report_by_status(
    State(app): State<App>,
    query: Result<Query<ReportQuery>, QueryRejection>,
) -> ApiResult<Vec<ReportRow>> {
    report(app, ReportKind::ByStatus, query).await
}
