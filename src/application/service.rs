use std::sync::Arc;

use chrono::NaiveDate;
use tokio::sync::watch;

use crate::domain::{
    Account, AccountId, Cents, DateSelector, ExpenseReport, ReportPeriod, Transaction,
    TransactionId, TransactionKind, ViewSelection, account_id_from_name, category,
    compute_account_balances, expense_report, filter_by_date, filter_transactions,
    is_valid_amount, parse_transaction_date,
};
use crate::storage::Repository;

use super::{AppError, BalanceEntry, Dashboard, LedgerSnapshot, SnapshotFeed, balance_sheet};

/// Application service providing high-level operations for the expense ledger.
/// This is the primary interface for any client (CLI, API, TUI, etc.).
pub struct LedgerService {
    repo: Repository,
    feed: SnapshotFeed,
}

/// User input for a new or edited transaction, before validation.
#[derive(Debug, Clone)]
pub struct TransactionDraft {
    pub kind: TransactionKind,
    pub amount: Cents,
    pub category: String,
    pub description: String,
    pub date: String,
    pub account_id: AccountId,
    pub target_account_id: Option<AccountId>,
}

impl TransactionDraft {
    pub fn new(
        kind: TransactionKind,
        amount: Cents,
        account_id: impl Into<AccountId>,
        date: NaiveDate,
    ) -> Self {
        Self {
            kind,
            amount,
            category: String::new(),
            description: String::new(),
            date: date.format("%Y-%m-%d").to_string(),
            account_id: account_id.into(),
            target_account_id: None,
        }
    }

    pub fn with_target(mut self, target: impl Into<AccountId>) -> Self {
        self.target_account_id = Some(target.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Monthly salary paid into `account_id`.
    pub fn salary(amount: Cents, account_id: impl Into<AccountId>, date: NaiveDate) -> Self {
        Self::new(TransactionKind::Income, amount, account_id, date)
            .with_category(category::SALARY)
            .with_description("Monthly Salary")
    }

    /// Money received from outside the ledger (gifts, repayments, ...).
    pub fn received(amount: Cents, account_id: impl Into<AccountId>, date: NaiveDate) -> Self {
        Self::new(TransactionKind::Income, amount, account_id, date)
            .with_category(category::OTHER)
            .with_description("Received Money")
    }
}

impl LedgerService {
    /// Create a service over an already migrated repository.
    pub async fn new(repo: Repository) -> Result<Self, AppError> {
        let accounts = repo.list_accounts().await?;
        let transactions = repo.list_transactions().await?;
        Ok(Self {
            repo,
            feed: SnapshotFeed::new(accounts, transactions),
        })
    }

    /// Initialize a database at the given path, creating it if needed.
    pub async fn init(database_path: &str) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}?mode=rwc", database_path);
        let repo = Repository::init(&db_url).await?;
        Self::new(repo).await
    }

    /// Connect to an existing database.
    pub async fn connect(database_path: &str) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}", database_path);
        let repo = Repository::connect(&db_url).await?;
        Self::new(repo).await
    }

    // ========================
    // Snapshot
    // ========================

    /// The most recently published snapshot.
    pub fn snapshot(&self) -> Arc<LedgerSnapshot> {
        self.feed.current()
    }

    /// Receive a new snapshot after every change.
    pub fn subscribe(&self) -> watch::Receiver<Arc<LedgerSnapshot>> {
        self.feed.subscribe()
    }

    /// Reload the store and publish it as a fresh snapshot.
    pub async fn refresh(&self) -> Result<Arc<LedgerSnapshot>, AppError> {
        let accounts = self.repo.list_accounts().await?;
        let transactions = self.repo.list_transactions().await?;
        Ok(self.feed.publish(accounts, transactions))
    }

    // ========================
    // Account operations
    // ========================

    /// Create an account. The id defaults to a slug of the name.
    pub async fn create_account(
        &self,
        name: &str,
        icon: Option<String>,
        id: Option<String>,
    ) -> Result<Account, AppError> {
        let name = name.trim();
        let id = id.unwrap_or_else(|| account_id_from_name(name));
        if name.is_empty() || id.trim().is_empty() || id.eq_ignore_ascii_case("all") {
            return Err(AppError::InvalidAccountName(name.to_string()));
        }

        if self.repo.get_account(&id).await?.is_some() {
            return Err(AppError::AccountAlreadyExists(id));
        }

        let mut account = Account::new(id, name);
        if let Some(icon) = icon {
            account = account.with_icon(icon);
        }

        self.repo.save_account(&account).await?;
        tracing::info!(account = %account.id, "created account");
        self.refresh().await?;
        Ok(account)
    }

    /// Get an account by id.
    pub async fn get_account(&self, id: &str) -> Result<Account, AppError> {
        self.repo
            .get_account(id)
            .await?
            .ok_or_else(|| AppError::AccountNotFound(id.to_string()))
    }

    /// List all accounts.
    pub async fn list_accounts(&self) -> Result<Vec<Account>, AppError> {
        Ok(self.repo.list_accounts().await?)
    }

    /// Rename an account and/or change its glyph. The id never changes, so
    /// existing transactions keep pointing at it.
    pub async fn update_account(
        &self,
        id: &str,
        name: Option<&str>,
        icon: Option<String>,
    ) -> Result<Account, AppError> {
        let mut account = self.get_account(id).await?;

        if let Some(name) = name {
            let name = name.trim();
            if name.is_empty() {
                return Err(AppError::InvalidAccountName(name.to_string()));
            }
            account.name = name.to_string();
        }
        if let Some(icon) = icon {
            account.icon = icon.trim().to_string();
        }

        if !self.repo.update_account(&account).await? {
            return Err(AppError::AccountNotFound(id.to_string()));
        }
        tracing::info!(account = %account.id, name = %account.name, "updated account");
        self.refresh().await?;
        Ok(account)
    }

    /// Delete an account that no transaction refers to.
    pub async fn delete_account(&self, id: &str) -> Result<Account, AppError> {
        let account = self.get_account(id).await?;

        let transaction_count = self.repo.count_transactions_for_account(id).await?;
        if transaction_count > 0 {
            return Err(AppError::AccountInUse {
                account_id: id.to_string(),
                transaction_count,
            });
        }

        self.repo.delete_account(id).await?;
        tracing::info!(account = %id, "deleted account");
        self.refresh().await?;
        Ok(account)
    }

    // ========================
    // Transaction operations
    // ========================

    /// Validate a draft and store it as a new transaction.
    pub async fn record_transaction(
        &self,
        draft: TransactionDraft,
    ) -> Result<Transaction, AppError> {
        let transaction = self.validate(draft, None).await?;

        self.repo.save_transaction(&transaction).await?;
        tracing::info!(
            id = %transaction.id,
            kind = %transaction.kind,
            amount = transaction.amount,
            "recorded transaction"
        );
        self.refresh().await?;
        Ok(transaction)
    }

    /// Replace an existing transaction with a validated draft. The id is kept.
    pub async fn edit_transaction(
        &self,
        id: TransactionId,
        draft: TransactionDraft,
    ) -> Result<Transaction, AppError> {
        self.get_transaction(id).await?;
        let transaction = self.validate(draft, Some(id)).await?;

        if !self.repo.replace_transaction(&transaction).await? {
            return Err(AppError::TransactionNotFound(id));
        }
        tracing::info!(id = %id, "edited transaction");
        self.refresh().await?;
        Ok(transaction)
    }

    /// Delete a transaction and return what was removed.
    pub async fn delete_transaction(&self, id: TransactionId) -> Result<Transaction, AppError> {
        let transaction = self.get_transaction(id).await?;
        self.repo.delete_transaction(id).await?;
        tracing::info!(id = %id, "deleted transaction");
        self.refresh().await?;
        Ok(transaction)
    }

    /// Get a transaction by id.
    pub async fn get_transaction(&self, id: TransactionId) -> Result<Transaction, AppError> {
        self.repo
            .get_transaction(id)
            .await?
            .ok_or(AppError::TransactionNotFound(id))
    }

    /// Every stored transaction, newest first.
    pub fn all_transactions(&self) -> Vec<Transaction> {
        self.snapshot().transactions.clone()
    }

    /// Transactions visible under `selection` on `today`.
    pub fn list_transactions(
        &self,
        selection: &ViewSelection,
        today: NaiveDate,
    ) -> Vec<Transaction> {
        filter_transactions(
            &self.snapshot().transactions,
            selection.period,
            &selection.account,
            today,
        )
    }

    /// Store an imported transaction under its own id. Returns false when
    /// the id is already stored.
    ///
    /// Dates and accounts are not checked so that legacy records survive
    /// unchanged, but the amount must be in range. The snapshot is not
    /// refreshed; call [`LedgerService::refresh`] after a batch.
    pub async fn import_transaction(&self, transaction: &Transaction) -> Result<bool, AppError> {
        if !is_valid_amount(transaction.amount) {
            return Err(AppError::InvalidAmount(transaction.amount));
        }
        if self.repo.get_transaction(transaction.id).await?.is_some() {
            return Ok(false);
        }
        self.repo.save_transaction(transaction).await?;
        Ok(true)
    }

    /// Whether a transaction id is already stored.
    pub async fn contains_transaction(&self, id: TransactionId) -> Result<bool, AppError> {
        Ok(self.repo.get_transaction(id).await?.is_some())
    }

    /// Store an account exactly as given (imports). Existing ids are kept.
    pub async fn import_account(&self, account: &Account) -> Result<bool, AppError> {
        if self.repo.get_account(&account.id).await?.is_some() {
            return Ok(false);
        }
        self.repo.save_account(account).await?;
        Ok(true)
    }

    async fn validate(
        &self,
        draft: TransactionDraft,
        id: Option<TransactionId>,
    ) -> Result<Transaction, AppError> {
        if !is_valid_amount(draft.amount) {
            return Err(AppError::InvalidAmount(draft.amount));
        }
        if parse_transaction_date(&draft.date).is_none() {
            return Err(AppError::InvalidDate(draft.date));
        }

        self.get_account(&draft.account_id).await?;

        let mut transaction = match draft.kind {
            TransactionKind::Income => Transaction::income(draft.amount, draft.account_id),
            TransactionKind::Expense => Transaction::expense(draft.amount, draft.account_id),
            TransactionKind::Transfer => {
                let target = draft
                    .target_account_id
                    .ok_or(AppError::MissingTransferTarget)?;
                self.get_account(&target).await?;
                Transaction::transfer(draft.amount, draft.account_id, target)
            }
        };

        if !draft.category.trim().is_empty() {
            transaction.category = draft.category.trim().to_string();
        }
        transaction.description = draft.description.trim().to_string();
        transaction.raw_date = draft.date.trim().to_string();
        if let Some(id) = id {
            transaction.id = id;
        }

        Ok(transaction)
    }

    // ========================
    // Reporting
    // ========================

    /// Lifetime balance of every account, including ids that are no longer
    /// in the registry.
    pub fn balances(&self) -> Vec<BalanceEntry> {
        let snapshot = self.snapshot();
        let balances = compute_account_balances(&snapshot.transactions);
        balance_sheet(&snapshot.accounts, &balances)
    }

    /// History view: every record dated on the selected day or month.
    pub fn history(&self, selector: &DateSelector) -> Vec<Transaction> {
        filter_by_date(&self.snapshot().transactions, selector)
    }

    /// Daily expense breakdown for `period`, optionally for one category.
    pub fn expense_report(
        &self,
        category: Option<&str>,
        period: ReportPeriod,
        today: NaiveDate,
    ) -> ExpenseReport {
        expense_report(&self.snapshot().transactions, category, period, today)
    }

    /// Summary, day groups and category split for the current selection.
    pub fn dashboard(&self, selection: &ViewSelection, today: NaiveDate) -> Dashboard {
        let snapshot = self.snapshot();
        tracing::debug!(
            version = snapshot.version,
            period = %selection.period,
            account = %selection.account,
            "building dashboard"
        );
        snapshot.dashboard(selection, today)
    }
}
