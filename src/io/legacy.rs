use serde::Deserialize;
use uuid::Uuid;

use crate::domain::{
    Account, AccountId, FALLBACK_ACCOUNT_ID, ParseCentsError, Transaction, TransactionKind,
    cents_from_units, transaction_id_from_legacy,
};

/// A transaction as the browser app stored it: camelCase keys, amounts in
/// fractional units, and possibly no account at all (records written before
/// accounts existed).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyTransaction {
    #[serde(default)]
    pub id: String,
    pub amount: f64,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub account_id: Option<AccountId>,
    #[serde(default)]
    pub target_account_id: Option<AccountId>,
}

/// Either the bare transaction array or both stores side by side.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum LegacyDocument {
    Transactions(Vec<LegacyTransaction>),
    Store(LegacyStore),
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LegacyStore {
    #[serde(default)]
    pub accounts: Vec<Account>,
    #[serde(default)]
    pub transactions: Vec<LegacyTransaction>,
}

impl LegacyDocument {
    pub fn into_store(self) -> LegacyStore {
        match self {
            LegacyDocument::Transactions(transactions) => LegacyStore {
                accounts: Vec::new(),
                transactions,
            },
            LegacyDocument::Store(store) => store,
        }
    }
}

impl LegacyTransaction {
    /// Convert to a ledger record. Amounts are rounded to the cent, a
    /// missing account becomes the salary account, and a destination on a
    /// non-transfer is dropped.
    pub fn into_transaction(self) -> Result<Transaction, ParseCentsError> {
        let amount = cents_from_units(self.amount)?;
        let id = if self.id.trim().is_empty() {
            self.fingerprint()
        } else {
            transaction_id_from_legacy(&self.id)
        };
        let account_id = self
            .account_id
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| FALLBACK_ACCOUNT_ID.to_string());
        let target_account_id = match self.kind {
            TransactionKind::Transfer => self.target_account_id.filter(|id| !id.trim().is_empty()),
            _ => None,
        };

        Ok(Transaction {
            id,
            amount,
            kind: self.kind,
            category: self.category,
            description: self.description,
            raw_date: self.date,
            account_id,
            target_account_id,
        })
    }

    /// Stable id for records that never had one, so re-importing the same
    /// file does not duplicate them.
    fn fingerprint(&self) -> Uuid {
        let key = format!(
            "{}|{}|{}|{}|{}|{}",
            self.date,
            self.kind,
            self.amount,
            self.account_id.as_deref().unwrap_or_default(),
            self.category,
            self.description
        );
        Uuid::new_v5(&Uuid::NAMESPACE_OID, key.as_bytes())
    }
}
