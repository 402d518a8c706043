use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::Write;

use crate::application::LedgerService;
use crate::domain::{Account, Transaction, format_cents};

pub const EXPORT_FORMAT_VERSION: &str = "2";

/// Full ledger backup, also the input format of a full import.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerExport {
    pub version: String,
    pub exported_at: DateTime<Utc>,
    pub accounts: Vec<Account>,
    pub transactions: Vec<Transaction>,
}

/// Header shared by the transaction CSV export and import.
pub const TRANSACTION_CSV_HEADER: [&str; 8] = [
    "id",
    "date",
    "type",
    "amount",
    "category",
    "description",
    "account",
    "target_account",
];

/// Writes ledger data out of the current snapshot.
pub struct Exporter<'a> {
    service: &'a LedgerService,
}

impl<'a> Exporter<'a> {
    pub fn new(service: &'a LedgerService) -> Self {
        Self { service }
    }

    /// Export all transactions as CSV. Amounts are written as decimals.
    pub fn export_transactions_csv<W: Write>(&self, writer: W) -> Result<usize> {
        let snapshot = self.service.snapshot();
        let mut csv_writer = csv::Writer::from_writer(writer);

        csv_writer.write_record(TRANSACTION_CSV_HEADER)?;

        for t in &snapshot.transactions {
            csv_writer.write_record([
                t.id.to_string(),
                t.raw_date.clone(),
                t.kind.as_str().to_string(),
                format_cents(t.amount),
                t.category.clone(),
                t.description.clone(),
                t.account_id.clone(),
                t.destination().unwrap_or_default().to_string(),
            ])?;
        }

        csv_writer.flush()?;
        Ok(snapshot.transactions.len())
    }

    /// Export lifetime balances as CSV.
    pub fn export_balances_csv<W: Write>(&self, writer: W) -> Result<usize> {
        let entries = self.service.balances();
        let mut csv_writer = csv::Writer::from_writer(writer);

        csv_writer.write_record(["account", "name", "balance", "registered"])?;
        for entry in &entries {
            csv_writer.write_record([
                entry.account_id.as_str(),
                entry.label.as_str(),
                format_cents(entry.balance).as_str(),
                if entry.registered { "yes" } else { "no" },
            ])?;
        }

        csv_writer.flush()?;
        Ok(entries.len())
    }

    /// Export accounts and transactions as one pretty-printed JSON document.
    pub fn export_full_json<W: Write>(&self, writer: W) -> Result<LedgerExport> {
        let snapshot = self.service.snapshot();
        let export = LedgerExport {
            version: EXPORT_FORMAT_VERSION.to_string(),
            exported_at: Utc::now(),
            accounts: snapshot.accounts.clone(),
            transactions: snapshot.transactions.clone(),
        };

        serde_json::to_writer_pretty(writer, &export)?;
        Ok(export)
    }
}
