use thiserror::Error;

use crate::domain::{Cents, MAX_AMOUNT, TransactionId};

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Account not found: {0}")]
    AccountNotFound(String),

    #[error("Account already exists: {0}")]
    AccountAlreadyExists(String),

    #[error("Account '{account_id}' is used by {transaction_count} transaction(s)")]
    AccountInUse {
        account_id: String,
        transaction_count: i64,
    },

    #[error("Transaction not found: {0}")]
    TransactionNotFound(TransactionId),

    #[error("Invalid amount: {0} cents (must be between 0 and {max})", max = MAX_AMOUNT)]
    InvalidAmount(Cents),

    #[error("Invalid account name: {0:?}")]
    InvalidAccountName(String),

    #[error("A transfer needs a destination account")]
    MissingTransferTarget,

    #[error("Invalid date '{0}' (expected YYYY-MM-DD or an ISO 8601 date-time)")]
    InvalidDate(String),

    #[error("Database error: {0}")]
    Database(#[from] anyhow::Error),
}
