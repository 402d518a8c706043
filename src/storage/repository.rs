use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::domain::{Account, Transaction, TransactionId, TransactionKind, default_accounts};

use super::MIGRATION_001_INITIAL;

const TRANSACTION_COLUMNS: &str =
    "id, amount_cents, kind, category, description, date, account_id, target_account_id";

/// Local SQLite store for accounts and transactions.
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Create a new repository with the given SQLite connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to a SQLite database URL.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = SqlitePool::connect(database_url)
            .await
            .context("Failed to connect to database")?;
        Ok(Self::new(pool))
    }

    /// Run database migrations.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::raw_sql(MIGRATION_001_INITIAL)
            .execute(&self.pool)
            .await
            .context("Failed to run migration 001")?;
        Ok(())
    }

    /// Initialize a database (connect + migrate + default accounts).
    pub async fn init(database_url: &str) -> Result<Self> {
        let repo = Self::connect(database_url).await?;
        repo.migrate().await?;
        repo.seed_default_accounts().await?;
        Ok(repo)
    }

    /// Insert the default accounts when the ledger has none yet.
    pub async fn seed_default_accounts(&self) -> Result<usize> {
        if !self.list_accounts().await?.is_empty() {
            return Ok(0);
        }
        let defaults = default_accounts();
        for account in &defaults {
            self.save_account(account).await?;
        }
        tracing::debug!(count = defaults.len(), "seeded default accounts");
        Ok(defaults.len())
    }

    // ========================
    // Account operations
    // ========================

    /// Save a new account. New accounts are listed after existing ones.
    pub async fn save_account(&self, account: &Account) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO accounts (id, name, icon, is_default, position)
            VALUES (?, ?, ?, ?, (SELECT COALESCE(MAX(position), -1) + 1 FROM accounts))
            "#,
        )
        .bind(&account.id)
        .bind(&account.name)
        .bind(&account.icon)
        .bind(account.is_default)
        .execute(&self.pool)
        .await
        .context("Failed to save account")?;
        Ok(())
    }

    /// Get an account by id.
    pub async fn get_account(&self, id: &str) -> Result<Option<Account>> {
        let row = sqlx::query("SELECT id, name, icon, is_default FROM accounts WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch account")?;

        Ok(row.as_ref().map(Self::row_to_account))
    }

    /// List all accounts in creation order.
    pub async fn list_accounts(&self) -> Result<Vec<Account>> {
        let rows =
            sqlx::query("SELECT id, name, icon, is_default FROM accounts ORDER BY position, id")
                .fetch_all(&self.pool)
                .await
                .context("Failed to list accounts")?;

        Ok(rows.iter().map(Self::row_to_account).collect())
    }

    /// Rename an account or change its glyph. The id and position are kept.
    /// Returns false when no such account existed.
    pub async fn update_account(&self, account: &Account) -> Result<bool> {
        let result = sqlx::query("UPDATE accounts SET name = ?, icon = ? WHERE id = ?")
            .bind(&account.name)
            .bind(&account.icon)
            .bind(&account.id)
            .execute(&self.pool)
            .await
            .context("Failed to update account")?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete an account. Returns false when no such account existed.
    pub async fn delete_account(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM accounts WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete account")?;
        Ok(result.rows_affected() > 0)
    }

    fn row_to_account(row: &sqlx::sqlite::SqliteRow) -> Account {
        Account {
            id: row.get("id"),
            name: row.get("name"),
            icon: row.get("icon"),
            is_default: row.get::<i32, _>("is_default") != 0,
        }
    }

    // ========================
    // Transaction operations
    // ========================

    /// Insert a new transaction.
    pub async fn save_transaction(&self, transaction: &Transaction) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO transactions (id, amount_cents, kind, category, description, date, account_id, target_account_id, recorded_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(transaction.id.to_string())
        .bind(transaction.amount)
        .bind(transaction.kind.as_str())
        .bind(&transaction.category)
        .bind(&transaction.description)
        .bind(&transaction.raw_date)
        .bind(&transaction.account_id)
        .bind(&transaction.target_account_id)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await
        .context("Failed to save transaction")?;
        Ok(())
    }

    /// Overwrite every field of an existing transaction. Returns false when
    /// the id is unknown.
    pub async fn replace_transaction(&self, transaction: &Transaction) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE transactions
            SET amount_cents = ?, kind = ?, category = ?, description = ?, date = ?,
                account_id = ?, target_account_id = ?
            WHERE id = ?
            "#,
        )
        .bind(transaction.amount)
        .bind(transaction.kind.as_str())
        .bind(&transaction.category)
        .bind(&transaction.description)
        .bind(&transaction.raw_date)
        .bind(&transaction.account_id)
        .bind(&transaction.target_account_id)
        .bind(transaction.id.to_string())
        .execute(&self.pool)
        .await
        .context("Failed to update transaction")?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete a transaction. Returns false when the id is unknown.
    pub async fn delete_transaction(&self, id: TransactionId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM transactions WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .context("Failed to delete transaction")?;
        Ok(result.rows_affected() > 0)
    }

    /// Get a transaction by id.
    pub async fn get_transaction(&self, id: TransactionId) -> Result<Option<Transaction>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM transactions WHERE id = ?",
            TRANSACTION_COLUMNS
        ))
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch transaction")?;

        row.as_ref().map(Self::row_to_transaction).transpose()
    }

    /// List every transaction, newest date first, then newest recorded.
    pub async fn list_transactions(&self) -> Result<Vec<Transaction>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM transactions ORDER BY date DESC, recorded_at DESC",
            TRANSACTION_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .context("Failed to list transactions")?;

        rows.iter().map(Self::row_to_transaction).collect()
    }

    /// Number of transactions that reference an account on either side.
    pub async fn count_transactions_for_account(&self, account_id: &str) -> Result<i64> {
        let row = sqlx::query(
            "SELECT COUNT(*) AS n FROM transactions WHERE account_id = ? OR (kind = 'transfer' AND target_account_id = ?)",
        )
        .bind(account_id)
        .bind(account_id)
        .fetch_one(&self.pool)
        .await
        .context("Failed to count transactions for account")?;
        Ok(row.get("n"))
    }

    fn row_to_transaction(row: &sqlx::sqlite::SqliteRow) -> Result<Transaction> {
        let id_str: String = row.get("id");
        let kind_str: String = row.get("kind");

        Ok(Transaction {
            id: Uuid::parse_str(&id_str).context("Invalid transaction ID")?,
            amount: row.get("amount_cents"),
            kind: kind_str
                .parse::<TransactionKind>()
                .context("Invalid transaction kind")?,
            category: row.get("category"),
            description: row.get("description"),
            raw_date: row.get("date"),
            account_id: row.get("account_id"),
            target_account_id: row.get("target_account_id"),
        })
    }
}
