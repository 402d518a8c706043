use std::collections::HashMap;

use super::{AccountId, Cents, Transaction, TransactionKind};

/// Lifetime balances keyed by account id.
pub type AccountBalances = HashMap<AccountId, Cents>;

/// The balance movements a single record causes, as (account, delta) pairs.
///
/// A transfer without a destination cannot be booked on both sides and
/// yields no legs at all, which keeps transfers zero-sum.
fn legs(transaction: &Transaction) -> Vec<(&str, Cents)> {
    let amount = transaction.amount;
    let source = transaction.account_id.as_str();
    match transaction.kind {
        TransactionKind::Income => vec![(source, amount)],
        TransactionKind::Expense => vec![(source, amount.saturating_neg())],
        TransactionKind::Transfer => match transaction.destination() {
            Some(target) => vec![(source, amount.saturating_neg()), (target, amount)],
            None => Vec::new(),
        },
    }
}

/// Compute the lifetime balance of one account.
/// Dates are irrelevant here: malformed records still count.
///
/// Sums saturate at the `i64` bounds instead of wrapping.
pub fn compute_balance(account_id: &str, transactions: &[Transaction]) -> Cents {
    transactions
        .iter()
        .flat_map(legs)
        .filter(|(account, _)| *account == account_id)
        .fold(0, |balance: Cents, (_, delta)| balance.saturating_add(delta))
}

/// Compute lifetime balances for every account referenced by `transactions`.
///
/// Accounts that never appear are absent from the map and implicitly 0. Ids
/// that are not in the account registry still get an entry.
pub fn compute_account_balances(transactions: &[Transaction]) -> AccountBalances {
    let mut balances = AccountBalances::new();

    for transaction in transactions {
        for (account, delta) in legs(transaction) {
            let balance = balances.entry(account.to_string()).or_insert(0);
            *balance = balance.saturating_add(delta);
        }
    }

    balances
}

/// Sum of all balances. Equals total income minus total expenses.
pub fn net_worth(balances: &AccountBalances) -> Cents {
    balances.values().fold(0, |total: Cents, b| total.saturating_add(*b))
}
