use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{AccountId, Cents, category};

pub type TransactionId = Uuid;

/// Map an id from an older store onto a transaction id. UUIDs are kept;
/// anything else gets a stable name-based UUID, so the same source id
/// always maps to the same record.
pub fn transaction_id_from_legacy(id: &str) -> TransactionId {
    let id = id.trim();
    Uuid::parse_str(id).unwrap_or_else(|_| Uuid::new_v5(&Uuid::NAMESPACE_OID, id.as_bytes()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Money arriving in an account from outside the ledger
    Income,
    /// Money leaving an account to outside the ledger
    Expense,
    /// Money moving between two accounts of the ledger
    Transfer,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Income => "income",
            TransactionKind::Expense => "expense",
            TransactionKind::Transfer => "transfer",
        }
    }
}

impl FromStr for TransactionKind {
    type Err = ParseKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "income" => Ok(TransactionKind::Income),
            "expense" => Ok(TransactionKind::Expense),
            "transfer" => Ok(TransactionKind::Transfer),
            other => Err(ParseKindError(other.to_string())),
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseKindError(pub String);

impl fmt::Display for ParseKindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown transaction type '{}' (expected income, expense or transfer)",
            self.0
        )
    }
}

impl std::error::Error for ParseKindError {}

/// A single ledger entry. Records are never mutated in place: an edit
/// replaces the whole record under the same id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: TransactionId,
    /// Amount in cents (never negative; the kind carries the direction)
    pub amount: Cents,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub category: String,
    pub description: String,
    /// Date as recorded. Kept as text because older or imported records may
    /// carry an empty or garbled value; see [`Transaction::date`].
    #[serde(rename = "date")]
    pub raw_date: String,
    /// Source account for every kind
    pub account_id: AccountId,
    /// Destination account, only read when `kind` is `Transfer`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_account_id: Option<AccountId>,
}

impl Transaction {
    fn new(kind: TransactionKind, amount: Cents, account_id: impl Into<AccountId>) -> Self {
        Self {
            id: Uuid::new_v4(),
            amount,
            kind,
            category: String::new(),
            description: String::new(),
            raw_date: String::new(),
            account_id: account_id.into(),
            target_account_id: None,
        }
    }

    pub fn income(amount: Cents, account_id: impl Into<AccountId>) -> Self {
        Self::new(TransactionKind::Income, amount, account_id)
    }

    pub fn expense(amount: Cents, account_id: impl Into<AccountId>) -> Self {
        Self::new(TransactionKind::Expense, amount, account_id)
    }

    pub fn transfer(
        amount: Cents,
        from: impl Into<AccountId>,
        to: impl Into<AccountId>,
    ) -> Self {
        let mut transaction = Self::new(TransactionKind::Transfer, amount, from);
        transaction.target_account_id = Some(to.into());
        transaction.category = category::TRANSFER.to_string();
        transaction
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.raw_date = date.into();
        self
    }

    pub fn on(self, date: NaiveDate) -> Self {
        self.with_date(date.format("%Y-%m-%d").to_string())
    }

    /// Local calendar date of the record, or `None` when the stored date is
    /// missing or unparseable.
    pub fn date(&self) -> Option<NaiveDate> {
        parse_transaction_date(&self.raw_date)
    }

    /// Calendar date of the record as seen from `zone`.
    pub fn date_in<Tz: TimeZone>(&self, zone: &Tz) -> Option<NaiveDate> {
        parse_transaction_date_in(&self.raw_date, zone)
    }

    /// Destination account of a transfer. Always `None` for income and
    /// expense records, whatever `target_account_id` holds.
    pub fn destination(&self) -> Option<&str> {
        match self.kind {
            TransactionKind::Transfer => self.target_account_id.as_deref(),
            _ => None,
        }
    }

    /// True when the record moves money out of or into `account_id`.
    pub fn touches(&self, account_id: &str) -> bool {
        self.account_id == account_id || self.destination() == Some(account_id)
    }
}

/// Parse the date forms the app has written over time, in the local zone.
pub fn parse_transaction_date(raw: &str) -> Option<NaiveDate> {
    parse_transaction_date_in(raw, &Local)
}

/// Parse a stored date as seen from `zone`.
///
/// Instants with an offset ("...Z", "...+06:00") are converted into `zone`
/// before the calendar date is taken. Plain dates and date-times without an
/// offset are wall-clock values and are used as written.
pub fn parse_transaction_date_in<Tz: TimeZone>(raw: &str, zone: &Tz) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(zone).date_naive());
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(dt.date());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};

    #[test]
    fn test_kind_parse() {
        assert_eq!("income".parse(), Ok(TransactionKind::Income));
        assert_eq!("Expense".parse(), Ok(TransactionKind::Expense));
        assert_eq!(" TRANSFER ".parse(), Ok(TransactionKind::Transfer));
        assert!("refund".parse::<TransactionKind>().is_err());
    }

    #[test]
    fn test_transfer_defaults() {
        let t = Transaction::transfer(20000, "salary", "savings");
        assert_eq!(t.kind, TransactionKind::Transfer);
        assert_eq!(t.category, "Transfer");
        assert_eq!(t.destination(), Some("savings"));
        assert!(t.touches("salary"));
        assert!(t.touches("savings"));
        assert!(!t.touches("cash"));
    }

    #[test]
    fn test_target_ignored_for_non_transfers() {
        let mut t = Transaction::expense(500, "cash");
        t.target_account_id = Some("bank".to_string());
        assert_eq!(t.destination(), None);
        assert!(!t.touches("bank"));
    }

    fn dhaka() -> FixedOffset {
        FixedOffset::east_opt(6 * 3600).unwrap()
    }

    #[test]
    fn test_parse_transaction_date_forms() {
        let expected = NaiveDate::from_ymd_opt(2025, 3, 9);
        assert_eq!(parse_transaction_date("2025-03-09"), expected);
        assert_eq!(parse_transaction_date("2025-03-09T14:30"), expected);
        assert_eq!(parse_transaction_date("2025-03-09T14:30:00.123"), expected);
        assert_eq!(parse_transaction_date("2025-03-09 08:00:00"), expected);
        assert_eq!(parse_transaction_date_in("2025-03-09T23:30:00+06:00", &dhaka()), expected);
        assert_eq!(parse_transaction_date_in("2025-03-09T10:00:00Z", &Utc), expected);
    }

    #[test]
    fn test_utc_instant_takes_the_local_calendar_date() {
        // 20:00 UTC on the last of March is already April 1st in Dhaka
        let raw = "2025-03-31T20:00:00.000Z";
        assert_eq!(
            parse_transaction_date_in(raw, &dhaka()),
            NaiveDate::from_ymd_opt(2025, 4, 1)
        );
        assert_eq!(
            parse_transaction_date_in(raw, &Utc),
            NaiveDate::from_ymd_opt(2025, 3, 31)
        );

        let western = FixedOffset::west_opt(5 * 3600).unwrap();
        assert_eq!(
            parse_transaction_date_in("2025-04-01T02:00:00Z", &western),
            NaiveDate::from_ymd_opt(2025, 3, 31)
        );
    }

    #[test]
    fn test_wall_clock_values_ignore_zone() {
        let expected = NaiveDate::from_ymd_opt(2025, 3, 31);
        assert_eq!(parse_transaction_date_in("2025-03-31", &dhaka()), expected);
        assert_eq!(parse_transaction_date_in("2025-03-31T23:59", &dhaka()), expected);

        let t = Transaction::expense(100, "cash").with_date("2025-03-31T20:00:00Z");
        assert_eq!(t.date(), t.date_in(&Local));
        assert_eq!(t.date_in(&dhaka()), NaiveDate::from_ymd_opt(2025, 4, 1));
    }

    #[test]
    fn test_transaction_id_from_legacy() {
        let uuid = "6f1c1f57-6f5e-4a8b-9d61-1c9f0d5d2a10";
        assert_eq!(transaction_id_from_legacy(uuid).to_string(), uuid);

        let first = transaction_id_from_legacy("k3JdP0aQ1x");
        assert_eq!(first, transaction_id_from_legacy("k3JdP0aQ1x"));
        assert_ne!(first, transaction_id_from_legacy("k3JdP0aQ1y"));
    }

    #[test]
    fn test_parse_transaction_date_malformed() {
        assert_eq!(parse_transaction_date(""), None);
        assert_eq!(parse_transaction_date("   "), None);
        assert_eq!(parse_transaction_date("yesterday"), None);
        assert_eq!(parse_transaction_date("2025-13-01"), None);
        assert_eq!(parse_transaction_date("2025-02-30"), None);
    }

    #[test]
    fn test_json_shape() {
        let t = Transaction::income(100000, "salary")
            .with_category("Salary")
            .with_date("2025-01-31");
        let json = serde_json::to_value(&t).unwrap();
        assert_eq!(json["type"], "income");
        assert_eq!(json["date"], "2025-01-31");
        assert_eq!(json["accountId"], "salary");
        assert!(json.get("targetAccountId").is_none());

        let back: Transaction = serde_json::from_value(json).unwrap();
        assert_eq!(back, t);
    }
}
