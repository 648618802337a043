mod helpers;

use chrono::NaiveDate;
use rust_decimal_macros::dec;

use cheques::{check::*, checkbook::Numbering, primitives::*, report::*};

#[tokio::test]
async fn reports_group_checks() -> anyhow::Result<()> {
    let app = helpers::init_app().await?;
    let created = helpers::create_test_account(&app, dec!(100000), 1, 10).await?;
    let account_id = created.account.id;

    let entries = [
        (NaiveDate::from_ymd_opt(2024, 1, 10), "Proveedor A", dec!(1000)),
        (NaiveDate::from_ymd_opt(2024, 1, 20), "Proveedor B", dec!(500)),
        (NaiveDate::from_ymd_opt(2024, 2, 5), "Proveedor A", dec!(300)),
        (NaiveDate::from_ymd_opt(2024, 2, 6), "Proveedor C", dec!(50)),
    ];
    let mut ids = Vec::new();
    for (date, beneficiary, amount) in entries {
        let issued = app
            .issue_check(CheckRequest {
                account_id,
                date: date.expect("valid date"),
                beneficiary: beneficiary.to_string(),
                amount,
                concept: String::new(),
                numbering: Numbering::Automatic,
            })
            .await?;
        ids.push(issued.check.id);
    }
    app.set_check_status(ids[0], CheckStatus::Cleared).await?;
    app.set_check_status(ids[3], CheckStatus::Cancelled).await?;

    let by_month = app.report(ReportKind::ByMonth, Some(account_id)).await?;
    assert_eq!(
        by_month,
        vec![
            ReportRow {
                key: "2024-01".to_string(),
                check_count: 2,
                total: dec!(1500),
            },
            ReportRow {
                key: "2024-02".to_string(),
                check_count: 1,
                total: dec!(300),
            },
        ]
    );

    let by_beneficiary = app
        .report(ReportKind::ByBeneficiary, Some(account_id))
        .await?;
    assert_eq!(by_beneficiary.len(), 2);
    assert_eq!(by_beneficiary[0].key, "Proveedor A");
    assert_eq!(by_beneficiary[0].total, dec!(1300));
    assert_eq!(by_beneficiary[1].key, "Proveedor B");

    let by_status = app.report(ReportKind::ByStatus, Some(account_id)).await?;
    let counts: Vec<_> = by_status
        .iter()
        .map(|row| (row.key.as_str(), row.check_count))
        .collect();
    assert_eq!(
        counts,
        vec![("cancelled", 1), ("cleared", 1), ("pending", 2)]
    );

    Ok(())
}

#[tokio::test]
async fn report_for_account_without_checks_is_empty() -> anyhow::Result<()> {
    let app = helpers::init_app().await?;
    let created = helpers::create_test_account(&app, dec!(0), 1, 10).await?;
    let rows = app
        .report(ReportKind::ByMonth, Some(created.account.id))
        .await?;
    assert!(rows.is_empty());
    Ok(())
}
