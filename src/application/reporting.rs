use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{
    Account, AccountBalances, CategorySpending, Cents, DayGroup, FinancialSummary, Transaction,
    ViewSelection, build_summary, group_by_day, spending_by_category,
};

use super::LedgerSnapshot;

/// Everything the overview screen shows for one selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dashboard {
    pub title: String,
    pub selection: ViewSelection,
    pub summary: FinancialSummary,
    pub transactions: Vec<Transaction>,
    pub days: Vec<DayGroup>,
    pub categories: Vec<CategorySpending>,
}

impl Dashboard {
    pub fn build(
        transactions: &[Transaction],
        selection: &ViewSelection,
        today: NaiveDate,
    ) -> Self {
        let (filtered, summary) =
            build_summary(transactions, selection.period, &selection.account, today);

        Self {
            title: selection.period.title(today),
            selection: selection.clone(),
            days: group_by_day(&filtered),
            categories: spending_by_category(&filtered),
            summary,
            transactions: filtered,
        }
    }
}

impl LedgerSnapshot {
    pub fn dashboard(&self, selection: &ViewSelection, today: NaiveDate) -> Dashboard {
        Dashboard::build(&self.transactions, selection, today)
    }
}

/// One row of the balance sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceEntry {
    pub account_id: String,
    pub label: String,
    pub balance: Cents,
    /// False for ids that only appear in transactions (e.g. a deleted account)
    pub registered: bool,
}

/// Registry accounts in their own order (zero when untouched), followed by
/// any unregistered ids that still carry a balance, sorted by id.
pub fn balance_sheet(accounts: &[Account], balances: &AccountBalances) -> Vec<BalanceEntry> {
    let mut entries: Vec<BalanceEntry> = accounts
        .iter()
        .map(|account| BalanceEntry {
            account_id: account.id.clone(),
            label: account.label(),
            balance: balances.get(&account.id).copied().unwrap_or(0),
            registered: true,
        })
        .collect();

    let mut orphans: Vec<BalanceEntry> = balances
        .iter()
        .filter(|(id, _)| !accounts.iter().any(|a| &a.id == *id))
        .map(|(id, balance)| BalanceEntry {
            account_id: id.clone(),
            label: id.clone(),
            balance: *balance,
            registered: false,
        })
        .collect();
    orphans.sort_by(|a, b| a.account_id.cmp(&b.account_id));

    entries.extend(orphans);
    entries
}
