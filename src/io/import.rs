use anyhow::{Context, Result};
use std::io::Read;

use crate::application::{AppError, LedgerService};
use crate::domain::{
    Transaction, TransactionKind, is_valid_amount, parse_cents, transaction_id_from_legacy,
};

use super::export::LedgerExport;
use super::legacy::LegacyDocument;

/// Result of an import operation
#[derive(Debug, Clone, Default)]
pub struct ImportResult {
    pub imported: usize,
    pub skipped: usize,
    pub errors: Vec<ImportError>,
    /// Records that were imported but need attention (e.g. an unreadable date)
    pub warnings: Vec<ImportError>,
}

/// Error that occurred during import
#[derive(Debug, Clone)]
pub struct ImportError {
    pub line: usize,
    pub field: Option<String>,
    pub error: String,
}

/// Options for import operations
#[derive(Debug, Clone, Default)]
pub struct ImportOptions {
    pub dry_run: bool,
    pub create_missing_accounts: bool,
}

/// Loads ledger data into the store
pub struct Importer<'a> {
    service: &'a LedgerService,
}

impl<'a> Importer<'a> {
    pub fn new(service: &'a LedgerService) -> Self {
        Self { service }
    }

    /// Import transactions from CSV in the export layout.
    ///
    /// A row with an id keeps it, and ids already stored are skipped, so
    /// re-importing an export is harmless. Dates are kept as written; an
    /// unreadable one is imported with a warning, like in a full import.
    /// Bad rows are reported and the rest still imported.
    pub async fn import_transactions_csv<R: Read>(
        &self,
        reader: R,
        options: &ImportOptions,
    ) -> Result<ImportResult> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let mut result = ImportResult::default();

        for (index, record) in csv_reader.records().enumerate() {
            let line = index + 2; // header is line 1

            let record = match record {
                Ok(r) => r,
                Err(e) => {
                    result.errors.push(ImportError {
                        line,
                        field: None,
                        error: format!("CSV parse error: {}", e),
                    });
                    continue;
                }
            };

            let field = |i: usize| record.get(i).unwrap_or("").trim();
            let row = CsvRow {
                id: field(0),
                date: field(1),
                kind: field(2),
                amount: field(3),
                category: field(4),
                description: field(5),
                account: field(6),
                target: field(7),
            };

            let transaction = match parse_row(&row) {
                Ok(transaction) => transaction,
                Err(error) => {
                    result.errors.push(ImportError { line, ..error });
                    continue;
                }
            };

            if let Err(e) = self.check_accounts(&transaction, options).await {
                result.errors.push(ImportError {
                    line,
                    field: Some("account".to_string()),
                    error: e.to_string(),
                });
                continue;
            }

            match self.store(&transaction, options.dry_run).await {
                Ok(true) => result.imported += 1,
                Ok(false) => {
                    result.skipped += 1;
                    continue;
                }
                Err(e) => {
                    result.errors.push(ImportError {
                        line,
                        field: None,
                        error: e.to_string(),
                    });
                    continue;
                }
            }

            if transaction.date().is_none() {
                result.warnings.push(ImportError {
                    line,
                    field: Some("date".to_string()),
                    error: format!(
                        "Unrecognized date '{}': kept as written, excluded from period views",
                        transaction.raw_date
                    ),
                });
            }
        }

        if !options.dry_run {
            self.service.refresh().await?;
        }
        tracing::info!(
            imported = result.imported,
            skipped = result.skipped,
            errors = result.errors.len(),
            "imported transactions from CSV"
        );
        Ok(result)
    }

    /// Import a full JSON export. Records whose id already exists are
    /// skipped, so importing the same file twice is harmless.
    pub async fn import_full_json<R: Read>(
        &self,
        reader: R,
        options: &ImportOptions,
    ) -> Result<ImportResult> {
        let export: LedgerExport =
            serde_json::from_reader(reader).context("Invalid ledger export JSON")?;
        let mut result = ImportResult::default();

        if options.dry_run {
            result.imported = export.transactions.len();
            return Ok(result);
        }

        for account in &export.accounts {
            self.service.import_account(account).await?;
        }

        for (index, transaction) in export.transactions.iter().enumerate() {
            match self.service.import_transaction(transaction).await {
                Ok(true) => result.imported += 1,
                Ok(false) => result.skipped += 1,
                Err(e) => result.errors.push(ImportError {
                    line: index + 1,
                    field: Some("amount".to_string()),
                    error: e.to_string(),
                }),
            }
        }

        self.service.refresh().await?;
        tracing::info!(
            imported = result.imported,
            skipped = result.skipped,
            "imported ledger export"
        );
        Ok(result)
    }

    /// Import data saved by the browser app: a bare array of its
    /// transactions, or `{"accounts": [...], "transactions": [...]}`.
    ///
    /// Amounts in units are converted to cents, records without an account
    /// are booked on the salary account, and record ids are kept (or derived
    /// stably) so a second import skips everything. `line` in errors is the
    /// 1-based position of the record in the array.
    pub async fn import_legacy_json<R: Read>(
        &self,
        reader: R,
        options: &ImportOptions,
    ) -> Result<ImportResult> {
        let document: LegacyDocument =
            serde_json::from_reader(reader).context("Invalid SmartSpend app JSON")?;
        let store = document.into_store();
        let mut result = ImportResult::default();

        if !options.dry_run {
            for account in &store.accounts {
                self.service.import_account(account).await?;
            }
        }

        for (index, legacy) in store.transactions.into_iter().enumerate() {
            let line = index + 1;
            let transaction = match legacy.into_transaction() {
                Ok(transaction) => transaction,
                Err(e) => {
                    result.errors.push(ImportError {
                        line,
                        field: Some("amount".to_string()),
                        error: format!("Invalid amount: {}", e),
                    });
                    continue;
                }
            };

            if options.create_missing_accounts {
                if let Err(e) = self.check_accounts(&transaction, options).await {
                    result.errors.push(ImportError {
                        line,
                        field: Some("account".to_string()),
                        error: e.to_string(),
                    });
                    continue;
                }
            }

            match self.store(&transaction, options.dry_run).await {
                Ok(true) => result.imported += 1,
                Ok(false) => result.skipped += 1,
                Err(e) => result.errors.push(ImportError {
                    line,
                    field: None,
                    error: e.to_string(),
                }),
            }
        }

        if !options.dry_run {
            self.service.refresh().await?;
        }
        tracing::info!(
            imported = result.imported,
            skipped = result.skipped,
            errors = result.errors.len(),
            "imported app data"
        );
        Ok(result)
    }

    /// Save one record, or only check for a duplicate id on a dry run.
    async fn store(&self, transaction: &Transaction, dry_run: bool) -> Result<bool, AppError> {
        if dry_run {
            if !is_valid_amount(transaction.amount) {
                return Err(AppError::InvalidAmount(transaction.amount));
            }
            return Ok(!self.service.contains_transaction(transaction.id).await?);
        }
        self.service.import_transaction(transaction).await
    }

    /// Every account the record books against must exist, or be created
    /// when the options allow it.
    async fn check_accounts(
        &self,
        transaction: &Transaction,
        options: &ImportOptions,
    ) -> Result<(), AppError> {
        let mut wanted = vec![transaction.account_id.as_str()];
        wanted.extend(transaction.destination());

        for account_id in wanted {
            match self.service.get_account(account_id).await {
                Ok(_) => {}
                Err(AppError::AccountNotFound(_)) if options.create_missing_accounts => {
                    if !options.dry_run {
                        self.service
                            .create_account(account_id, None, Some(account_id.to_string()))
                            .await?;
                    }
                }
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }
}

/// One row of the transaction CSV, trimmed.
struct CsvRow<'r> {
    id: &'r str,
    date: &'r str,
    kind: &'r str,
    amount: &'r str,
    category: &'r str,
    description: &'r str,
    account: &'r str,
    target: &'r str,
}

fn parse_row(row: &CsvRow<'_>) -> Result<Transaction, ImportError> {
    let invalid = |field: &str, error: String| ImportError {
        line: 0,
        field: Some(field.to_string()),
        error,
    };

    let kind: TransactionKind = row
        .kind
        .parse()
        .map_err(|e| invalid("type", format!("{}", e)))?;
    let amount = parse_cents(row.amount)
        .map_err(|e| invalid("amount", format!("Invalid amount: {}", e)))?;
    if !is_valid_amount(amount) {
        return Err(invalid("amount", AppError::InvalidAmount(amount).to_string()));
    }
    if row.account.is_empty() {
        return Err(invalid("account", "Missing account".to_string()));
    }

    let mut transaction = match kind {
        TransactionKind::Income => Transaction::income(amount, row.account),
        TransactionKind::Expense => Transaction::expense(amount, row.account),
        TransactionKind::Transfer => {
            if row.target.is_empty() {
                return Err(invalid(
                    "target_account",
                    AppError::MissingTransferTarget.to_string(),
                ));
            }
            Transaction::transfer(amount, row.account, row.target)
        }
    };

    if !row.id.is_empty() {
        transaction.id = transaction_id_from_legacy(row.id);
    }
    if !row.category.is_empty() {
        transaction.category = row.category.to_string();
    }
    transaction.description = row.description.to_string();
    transaction.raw_date = row.date.to_string();
    Ok(transaction)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row<'r>(date: &'r str, kind: &'r str, amount: &'r str, target: &'r str) -> CsvRow<'r> {
        CsvRow {
            id: "",
            date,
            kind,
            amount,
            category: "",
            description: "",
            account: "salary",
            target,
        }
    }

    #[test]
    fn test_parse_row_transfer() {
        let t = parse_row(&row("2026-10-01", "transfer", "200", "savings")).unwrap();
        assert_eq!(t.kind, TransactionKind::Transfer);
        assert_eq!(t.amount, 20000);
        assert_eq!(t.category, "Transfer");
        assert_eq!(t.destination(), Some("savings"));
    }

    #[test]
    fn test_parse_row_ignores_target_for_expense() {
        let t = parse_row(&row("2026-10-01T12:00:00", "expense", "3.50", "cash")).unwrap();
        assert_eq!(t.target_account_id, None);
        assert_eq!(t.raw_date, "2026-10-01T12:00:00");
    }

    #[test]
    fn test_parse_row_keeps_id_and_unreadable_date() {
        let mut csv_row = row("31/10/2026", "income", "10", "");
        csv_row.id = "6f1c1f57-6f5e-4a8b-9d61-1c9f0d5d2a10";

        let t = parse_row(&csv_row).unwrap();

        assert_eq!(t.id.to_string(), "6f1c1f57-6f5e-4a8b-9d61-1c9f0d5d2a10");
        assert_eq!(t.raw_date, "31/10/2026");
        assert_eq!(t.date(), None);
    }

    #[test]
    fn test_parse_row_errors_name_the_field() {
        let err = parse_row(&row("2026-10-01", "gift", "10", "")).unwrap_err();
        assert_eq!(err.field.as_deref(), Some("type"));

        let err = parse_row(&row("2026-10-01", "income", "ten", "")).unwrap_err();
        assert_eq!(err.field.as_deref(), Some("amount"));

        let err = parse_row(&row("2026-10-01", "income", "-10", "")).unwrap_err();
        assert_eq!(err.field.as_deref(), Some("amount"));

        let err = parse_row(&row("2026-10-01", "transfer", "10", "")).unwrap_err();
        assert_eq!(err.field.as_deref(), Some("target_account"));

        let mut no_account = row("2026-10-01", "income", "10", "");
        no_account.account = "";
        let err = parse_row(&no_account).unwrap_err();
        assert_eq!(err.field.as_deref(), Some("account"));
    }
}
