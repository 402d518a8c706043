use serde::{Deserialize, Serialize};

/// Accounts are keyed by user-chosen strings ("cash", "salary", "bkash", ...).
/// The set is open: anything the user creates is a valid key.
pub type AccountId = String;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: AccountId,
    pub name: String,
    /// Display glyph shown next to the name (usually an emoji)
    #[serde(rename = "emoji", default)]
    pub icon: String,
    #[serde(default)]
    pub is_default: bool,
}

impl Account {
    pub fn new(id: impl Into<AccountId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            icon: DEFAULT_ICON.to_string(),
            is_default: false,
        }
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = icon.into();
        self
    }

    pub fn with_default(mut self, is_default: bool) -> Self {
        self.is_default = is_default;
        self
    }

    /// "🏦 Salary Account" style label for tables.
    pub fn label(&self) -> String {
        if self.icon.is_empty() {
            self.name.clone()
        } else {
            format!("{} {}", self.icon, self.name)
        }
    }
}

pub const DEFAULT_ICON: &str = "💰";

/// Account that records without an account id are booked against.
pub const FALLBACK_ACCOUNT_ID: &str = "salary";

/// The accounts every new ledger starts with.
pub fn default_accounts() -> Vec<Account> {
    vec![
        Account::new(FALLBACK_ACCOUNT_ID, "Salary Account")
            .with_icon("🏦")
            .with_default(true),
        Account::new("savings", "Savings Account")
            .with_icon("🛡️")
            .with_default(true),
        Account::new("cash", "Cash").with_icon("💵").with_default(true),
    ]
}

/// Turn a display name into an account key: "Mobile Wallet" -> "mobile-wallet".
pub fn account_id_from_name(name: &str) -> AccountId {
    let mut id = String::with_capacity(name.len());
    for word in name.split_whitespace() {
        if !id.is_empty() {
            id.push('-');
        }
        id.extend(
            word.chars()
                .filter(|c| c.is_alphanumeric())
                .flat_map(char::to_lowercase),
        );
    }
    id
}
