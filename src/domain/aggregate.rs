//! Period and account views over a transaction snapshot.
//!
//! Everything here is a pure function of its arguments. The evaluation date
//! is passed in explicitly so the same snapshot always produces the same
//! report.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{
    AccountBalances, AccountFilter, Cents, DateSelector, ReportPeriod, Transaction,
    TransactionKind, compute_account_balances,
};

/// Flow figures for a reporting window plus the lifetime balance sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialSummary {
    pub total_income: Cents,
    pub total_expenses: Cents,
    /// `total_income - total_expenses`
    pub balance: Cents,
    /// Percentage of income kept; 0 when there was no income
    pub savings_rate: f64,
    /// Lifetime balances, never scoped to the period
    pub account_balances: AccountBalances,
}

/// Transactions of a single calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayGroup {
    pub date: NaiveDate,
    pub transactions: Vec<Transaction>,
    pub income: Cents,
    pub expenses: Cents,
}

/// Expense total for one category within a reporting window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySpending {
    pub category: String,
    pub total: Cents,
    pub count: usize,
    /// Share of all expenses in the window, 0-100
    pub percentage: f64,
}

/// Expenses of a reporting window, optionally limited to one category,
/// broken down by day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseReport {
    pub title: String,
    pub category: Option<String>,
    pub total: Cents,
    pub count: usize,
    /// Newest day first
    pub days: Vec<DayGroup>,
}

/// Keep the records dated inside `period` (relative to `today`) that touch
/// the filtered account. A transfer matches from either side. Records with a
/// missing or unparseable date never match. Input order is preserved.
pub fn filter_transactions(
    transactions: &[Transaction],
    period: ReportPeriod,
    account_filter: &AccountFilter,
    today: NaiveDate,
) -> Vec<Transaction> {
    transactions
        .iter()
        .filter(|t| matches_selection(t, period, account_filter, today))
        .cloned()
        .collect()
}

fn matches_selection(
    transaction: &Transaction,
    period: ReportPeriod,
    account_filter: &AccountFilter,
    today: NaiveDate,
) -> bool {
    let Some(date) = transaction.date() else {
        return false;
    };
    if !period.contains(date, today) {
        return false;
    }
    match account_filter.account() {
        None => true,
        Some(account) => transaction.touches(account),
    }
}

/// Income and expense totals for `filtered`.
///
/// With [`AccountFilter::All`] transfers are internal and ignored. With a
/// single account they count as flows: leaving the account is an expense,
/// arriving is income. The account legs are checked here as well, so
/// records that do not touch the account contribute nothing even if the
/// caller did not pre-filter.
pub fn summarize(
    filtered: &[Transaction],
    account_filter: &AccountFilter,
    account_balances: &AccountBalances,
) -> FinancialSummary {
    let (total_income, total_expenses) = match account_filter.account() {
        None => totals_for_all(filtered),
        Some(account) => totals_for_account(filtered, account),
    };

    let balance = total_income.saturating_sub(total_expenses);

    FinancialSummary {
        total_income,
        total_expenses,
        balance,
        savings_rate: savings_rate(total_income, total_expenses),
        account_balances: account_balances.clone(),
    }
}

fn totals_for_all(transactions: &[Transaction]) -> (Cents, Cents) {
    transactions
        .iter()
        .fold((0, 0), |(income, expenses): (Cents, Cents), t| match t.kind {
            TransactionKind::Income => (income.saturating_add(t.amount), expenses),
            TransactionKind::Expense => (income, expenses.saturating_add(t.amount)),
            TransactionKind::Transfer => (income, expenses),
        })
}

fn totals_for_account(transactions: &[Transaction], account: &str) -> (Cents, Cents) {
    let mut income: Cents = 0;
    let mut expenses: Cents = 0;

    for t in transactions {
        // A transfer without a destination moves nothing, as in the balances.
        if t.kind == TransactionKind::Transfer && t.destination().is_none() {
            continue;
        }
        // Source and destination legs are independent; a self-transfer hits both.
        if t.account_id == account {
            match t.kind {
                TransactionKind::Income => income = income.saturating_add(t.amount),
                TransactionKind::Expense | TransactionKind::Transfer => {
                    expenses = expenses.saturating_add(t.amount)
                }
            }
        }
        if t.destination() == Some(account) {
            income = income.saturating_add(t.amount);
        }
    }

    (income, expenses)
}

/// `(income - expenses) / income * 100`, or 0 without income.
pub fn savings_rate(total_income: Cents, total_expenses: Cents) -> f64 {
    if total_income > 0 {
        total_income.saturating_sub(total_expenses) as f64 / total_income as f64 * 100.0
    } else {
        0.0
    }
}

/// Lifetime balances, the filtered window and its summary in one call.
pub fn build_summary(
    transactions: &[Transaction],
    period: ReportPeriod,
    account_filter: &AccountFilter,
    today: NaiveDate,
) -> (Vec<Transaction>, FinancialSummary) {
    let balances = compute_account_balances(transactions);
    let filtered = filter_transactions(transactions, period, account_filter, today);
    let summary = summarize(&filtered, account_filter, &balances);
    (filtered, summary)
}

/// Bucket records by calendar day, newest day first. Records without a
/// valid date are dropped. Order inside a day follows the input.
pub fn group_by_day(transactions: &[Transaction]) -> Vec<DayGroup> {
    let mut groups: Vec<DayGroup> = Vec::new();
    let mut index: HashMap<NaiveDate, usize> = HashMap::new();

    for t in transactions {
        let Some(date) = t.date() else {
            continue;
        };
        let slot = *index.entry(date).or_insert_with(|| {
            groups.push(DayGroup {
                date,
                transactions: Vec::new(),
                income: 0,
                expenses: 0,
            });
            groups.len() - 1
        });

        let group = &mut groups[slot];
        match t.kind {
            TransactionKind::Income => group.income = group.income.saturating_add(t.amount),
            TransactionKind::Expense => {
                group.expenses = group.expenses.saturating_add(t.amount)
            }
            TransactionKind::Transfer => {}
        }
        group.transactions.push(t.clone());
    }

    groups.sort_by(|a, b| b.date.cmp(&a.date));
    groups
}

/// Expense totals per category, largest first (ties by name).
pub fn spending_by_category(transactions: &[Transaction]) -> Vec<CategorySpending> {
    let mut totals: HashMap<&str, (Cents, usize)> = HashMap::new();
    for t in transactions
        .iter()
        .filter(|t| t.kind == TransactionKind::Expense)
    {
        let category = match t.category.trim() {
            "" => UNCATEGORIZED,
            name => name,
        };
        let entry = totals.entry(category).or_insert((0, 0));
        entry.0 = entry.0.saturating_add(t.amount);
        entry.1 += 1;
    }

    let grand_total = totals
        .values()
        .fold(0, |sum: Cents, (total, _)| sum.saturating_add(*total));

    let mut categories: Vec<CategorySpending> = totals
        .into_iter()
        .map(|(category, (total, count))| CategorySpending {
            category: category.to_string(),
            total,
            count,
            percentage: if grand_total > 0 {
                total as f64 / grand_total as f64 * 100.0
            } else {
                0.0
            },
        })
        .collect();

    categories.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.category.cmp(&b.category)));
    categories
}

pub const UNCATEGORIZED: &str = "Uncategorized";

/// Records whose category equals `category`, ignoring case and surrounding
/// whitespace. Input order is preserved.
pub fn filter_by_category(transactions: &[Transaction], category: &str) -> Vec<Transaction> {
    let wanted = category.trim().to_lowercase();
    transactions
        .iter()
        .filter(|t| t.category.trim().to_lowercase() == wanted)
        .cloned()
        .collect()
}

/// Records dated on the selected day or month. Undated records never match.
pub fn filter_by_date(transactions: &[Transaction], selector: &DateSelector) -> Vec<Transaction> {
    transactions
        .iter()
        .filter(|t| t.date().is_some_and(|date| selector.contains(date)))
        .cloned()
        .collect()
}

/// Expenses of `period`, optionally for a single category, with a daily
/// breakdown. Income and transfers never appear.
pub fn expense_report(
    transactions: &[Transaction],
    category: Option<&str>,
    period: ReportPeriod,
    today: NaiveDate,
) -> ExpenseReport {
    let mut expenses: Vec<Transaction> =
        filter_transactions(transactions, period, &AccountFilter::All, today)
            .into_iter()
            .filter(|t| t.kind == TransactionKind::Expense)
            .collect();
    if let Some(category) = category {
        expenses = filter_by_category(&expenses, category);
    }

    let total = expenses
        .iter()
        .fold(0, |sum: Cents, t| sum.saturating_add(t.amount));

    ExpenseReport {
        title: period.title(today),
        category: category.map(str::to_string),
        total,
        count: expenses.len(),
        days: group_by_day(&expenses),
    }
}
