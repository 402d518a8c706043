mod common;

use anyhow::Result;
use common::{record, record_scenario, test_service, this_month};
use smartspend::application::{AppError, TransactionDraft};
use smartspend::domain::TransactionKind;

#[tokio::test]
async fn test_init_seeds_default_accounts() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let accounts = service.list_accounts().await?;
    let ids: Vec<&str> = accounts.iter().map(|a| a.id.as_str()).collect();
    assert_eq!(ids, ["salary", "savings", "cash"]);
    assert_eq!(accounts[0].name, "Salary Account");
    assert!(accounts.iter().all(|a| a.is_default));

    Ok(())
}

#[tokio::test]
async fn test_reopening_does_not_duplicate_defaults() -> Result<()> {
    let temp = tempfile::TempDir::new()?;
    let path = temp.path().join("ledger.db");
    let path = path.to_str().unwrap();

    smartspend::application::LedgerService::init(path).await?;
    let service = smartspend::application::LedgerService::init(path).await?;

    assert_eq!(service.list_accounts().await?.len(), 3);
    Ok(())
}

#[tokio::test]
async fn test_create_account_derives_id() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let account = service
        .create_account("Mobile Wallet", Some("📱".into()), None)
        .await?;

    assert_eq!(account.id, "mobile-wallet");
    assert_eq!(account.icon, "📱");
    assert!(!account.is_default);

    let listed = service.list_accounts().await?;
    assert_eq!(listed.last().map(|a| a.id.as_str()), Some("mobile-wallet"));
    Ok(())
}

#[tokio::test]
async fn test_create_account_rejects_duplicates_and_reserved_ids() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let result = service.create_account("Cash", None, None).await;
    assert!(matches!(result, Err(AppError::AccountAlreadyExists(id)) if id == "cash"));

    let result = service.create_account("All", None, None).await;
    assert!(matches!(result, Err(AppError::InvalidAccountName(_))));

    let result = service.create_account("   ", None, None).await;
    assert!(matches!(result, Err(AppError::InvalidAccountName(_))));
    Ok(())
}

#[tokio::test]
async fn test_update_account_keeps_id_and_history() -> Result<()> {
    let (service, _temp) = test_service().await?;
    record(&service, TransactionKind::Income, 2500, "cash", None, this_month(2)).await?;

    let updated = service
        .update_account("cash", Some("  Pocket Money "), Some("👛".into()))
        .await?;

    assert_eq!(updated.id, "cash");
    assert_eq!(updated.label(), "👛 Pocket Money");
    assert!(updated.is_default);
    assert_eq!(service.get_account("cash").await?, updated);

    // Only the glyph this time
    let updated = service.update_account("cash", None, Some("💵".into())).await?;
    assert_eq!(updated.name, "Pocket Money");

    let balances = service.balances();
    let cash = balances.iter().find(|e| e.account_id == "cash").unwrap();
    assert_eq!(cash.balance, 2500);
    assert_eq!(cash.label, "💵 Pocket Money");
    Ok(())
}

#[tokio::test]
async fn test_update_account_validation() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let result = service.update_account("cash", Some("   "), None).await;
    assert!(matches!(result, Err(AppError::InvalidAccountName(_))));
    assert_eq!(service.get_account("cash").await?.name, "Cash");

    let result = service.update_account("nowhere", Some("Somewhere"), None).await;
    assert!(matches!(result, Err(AppError::AccountNotFound(id)) if id == "nowhere"));
    Ok(())
}

#[tokio::test]
async fn test_delete_account_in_use_is_refused() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let on = this_month(2);
    record(&service, TransactionKind::Transfer, 500, "salary", Some("cash"), on).await?;

    let result = service.delete_account("cash").await;
    assert!(matches!(
        result,
        Err(AppError::AccountInUse { transaction_count: 1, .. })
    ));

    service.create_account("Spare", None, None).await?;
    let deleted = service.delete_account("spare").await?;
    assert_eq!(deleted.name, "Spare");

    let result = service.delete_account("spare").await;
    assert!(matches!(result, Err(AppError::AccountNotFound(_))));
    Ok(())
}

#[tokio::test]
async fn test_record_validation() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let negative = TransactionDraft::new(TransactionKind::Expense, -100, "cash", this_month(1));
    assert!(matches!(
        service.record_transaction(negative).await,
        Err(AppError::InvalidAmount(-100))
    ));

    let unknown = TransactionDraft::new(TransactionKind::Income, 100, "nowhere", this_month(1));
    assert!(matches!(
        service.record_transaction(unknown).await,
        Err(AppError::AccountNotFound(_))
    ));

    let no_target = TransactionDraft::new(TransactionKind::Transfer, 100, "cash", this_month(1));
    assert!(matches!(
        service.record_transaction(no_target).await,
        Err(AppError::MissingTransferTarget)
    ));

    let mut bad_date = TransactionDraft::new(TransactionKind::Income, 100, "cash", this_month(1));
    bad_date.date = "someday".to_string();
    assert!(matches!(
        service.record_transaction(bad_date).await,
        Err(AppError::InvalidDate(_))
    ));

    let zero = TransactionDraft::new(TransactionKind::Expense, 0, "cash", this_month(1));
    assert_eq!(service.record_transaction(zero).await?.amount, 0);

    assert_eq!(service.all_transactions().len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_target_dropped_for_non_transfers() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let draft = TransactionDraft::new(TransactionKind::Expense, 700, "cash", this_month(3))
        .with_target("salary")
        .with_category("Food");
    let transaction = service.record_transaction(draft).await?;

    assert_eq!(transaction.target_account_id, None);
    assert_eq!(transaction.category, "Food");
    Ok(())
}

#[tokio::test]
async fn test_edit_replaces_whole_record() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let original =
        record(&service, TransactionKind::Expense, 1200, "cash", None, this_month(4)).await?;

    let replacement =
        TransactionDraft::new(TransactionKind::Transfer, 5000, "salary", this_month(6))
            .with_target("savings")
            .with_description("monthly saving");
    let edited = service.edit_transaction(original.id, replacement).await?;

    assert_eq!(edited.id, original.id);
    let stored = service.get_transaction(original.id).await?;
    assert_eq!(stored, edited);
    assert_eq!(stored.kind, TransactionKind::Transfer);
    assert_eq!(stored.target_account_id.as_deref(), Some("savings"));
    assert_eq!(stored.category, "Transfer");
    assert_eq!(service.all_transactions().len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_edit_unknown_transaction() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let id = uuid::Uuid::new_v4();

    let draft = TransactionDraft::new(TransactionKind::Income, 100, "cash", this_month(1));
    let result = service.edit_transaction(id, draft).await;

    assert!(matches!(result, Err(AppError::TransactionNotFound(missing)) if missing == id));
    Ok(())
}

#[tokio::test]
async fn test_delete_transaction() -> Result<()> {
    let (service, _temp) = test_service().await?;
    record_scenario(&service).await?;
    let victim = service.all_transactions()[0].clone();

    let deleted = service.delete_transaction(victim.id).await?;

    assert_eq!(deleted.id, victim.id);
    assert_eq!(service.all_transactions().len(), 2);
    assert!(matches!(
        service.delete_transaction(victim.id).await,
        Err(AppError::TransactionNotFound(_))
    ));
    Ok(())
}

#[tokio::test]
async fn test_mutations_publish_snapshots() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let mut receiver = service.subscribe();
    let start = service.snapshot().version;

    record(&service, TransactionKind::Income, 1000, "cash", None, this_month(1)).await?;

    receiver.changed().await?;
    let snapshot = receiver.borrow_and_update().clone();
    assert!(snapshot.version > start);
    assert_eq!(snapshot.transactions.len(), 1);
    assert_eq!(snapshot.accounts.len(), 3);
    Ok(())
}

#[tokio::test]
async fn test_reconnect_reads_stored_data() -> Result<()> {
    let temp = tempfile::TempDir::new()?;
    let path = temp.path().join("ledger.db");
    let path = path.to_str().unwrap();

    {
        let service = smartspend::application::LedgerService::init(path).await?;
        record(&service, TransactionKind::Income, 4200, "salary", None, this_month(8)).await?;
    }

    let service = smartspend::application::LedgerService::connect(path).await?;
    let transactions = service.all_transactions();
    assert_eq!(transactions.len(), 1);
    assert_eq!(transactions[0].amount, 4200);
    assert_eq!(transactions[0].raw_date, "2026-10-08");
    Ok(())
}
