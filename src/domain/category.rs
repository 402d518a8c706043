//! Category names offered when entering a transaction. Categories are free
//! text on the record; these are only the suggestions the app ships with.

pub const FOOD: &str = "Food & Dining";
pub const BAZAR: &str = "Bazar & Groceries";
pub const TRANSPORT: &str = "Transportation";
pub const UTILITIES: &str = "Utilities";
pub const HOUSING: &str = "Housing";
pub const ENTERTAINMENT: &str = "Entertainment";
pub const SHOPPING: &str = "Shopping";
pub const HEALTH: &str = "Health";
pub const SALARY: &str = "Salary";
pub const INVESTMENT: &str = "Investment";
pub const TRANSFER: &str = "Transfer";
pub const LENDING: &str = "Lending & Debt";
pub const SEND_HOME: &str = "Send Home";
pub const OTHER: &str = "Other";

pub const KNOWN_CATEGORIES: [&str; 14] = [
    FOOD,
    BAZAR,
    TRANSPORT,
    UTILITIES,
    HOUSING,
    ENTERTAINMENT,
    SHOPPING,
    HEALTH,
    SALARY,
    INVESTMENT,
    TRANSFER,
    LENDING,
    SEND_HOME,
    OTHER,
];

/// Resolve user input to a known category: exact names match ignoring
/// case, otherwise the first known name starting with the input ("bazar"
/// -> "Bazar & Groceries"). Unknown input is returned trimmed.
pub fn resolve_category(input: &str) -> String {
    let input = input.trim();
    if input.is_empty() {
        return String::new();
    }
    let lowered = input.to_lowercase();

    KNOWN_CATEGORIES
        .iter()
        .find(|name| name.to_lowercase() == lowered)
        .or_else(|| {
            KNOWN_CATEGORIES
                .iter()
                .find(|name| name.to_lowercase().starts_with(&lowered))
        })
        .map(|name| name.to_string())
        .unwrap_or_else(|| input.to_string())
}
