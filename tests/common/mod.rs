// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use anyhow::Result;
use chrono::{Datelike, NaiveDate};
use smartspend::application::{LedgerService, TransactionDraft};
use smartspend::domain::{Cents, TransactionKind};
use tempfile::TempDir;

/// Helper to create a test service with a temporary database
pub async fn test_service() -> Result<(LedgerService, TempDir)> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("test.db");
    let service = LedgerService::init(db_path.to_str().unwrap()).await?;
    Ok((service, temp_dir))
}

/// Fixed evaluation date so period filters are deterministic
pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
}

/// A day in the same month as [`today`]
pub fn this_month(day: u32) -> NaiveDate {
    today().with_day(day).unwrap()
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// The basic scenario on the default accounts: income 1000, expense 300 and
/// a transfer of 200 from salary to savings, all this month
pub async fn record_scenario(service: &LedgerService) -> Result<()> {
    record(service, TransactionKind::Income, 100000, "salary", None, this_month(1)).await?;
    record(service, TransactionKind::Expense, 30000, "salary", None, this_month(5)).await?;
    record(
        service,
        TransactionKind::Transfer,
        20000,
        "salary",
        Some("savings"),
        this_month(10),
    )
    .await?;
    Ok(())
}

pub async fn record(
    service: &LedgerService,
    kind: TransactionKind,
    amount: Cents,
    account: &str,
    target: Option<&str>,
    on: NaiveDate,
) -> Result<smartspend::domain::Transaction> {
    let mut draft = TransactionDraft::new(kind, amount, account, on);
    if let Some(target) = target {
        draft = draft.with_target(target);
    }
    Ok(service.record_transaction(draft).await?)
}
