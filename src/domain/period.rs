use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use super::AccountId;

/// Reporting window, always anchored to the evaluation date ("today").
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportPeriod {
    /// Same calendar month and year as today
    #[default]
    Month,
    /// Same calendar year as today
    Year,
}

impl ReportPeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportPeriod::Month => "month",
            ReportPeriod::Year => "year",
        }
    }

    /// Whether `date` falls in the period that contains `today`.
    pub fn contains(&self, date: NaiveDate, today: NaiveDate) -> bool {
        match self {
            ReportPeriod::Month => date.year() == today.year() && date.month() == today.month(),
            ReportPeriod::Year => date.year() == today.year(),
        }
    }

    /// Human heading: "October 2026" or "2026".
    pub fn title(&self, today: NaiveDate) -> String {
        match self {
            ReportPeriod::Month => today.format("%B %Y").to_string(),
            ReportPeriod::Year => today.format("%Y").to_string(),
        }
    }
}

impl FromStr for ReportPeriod {
    type Err = ParsePeriodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "month" | "monthly" => Ok(ReportPeriod::Month),
            "year" | "yearly" => Ok(ReportPeriod::Year),
            other => Err(ParsePeriodError(other.to_string())),
        }
    }
}

impl fmt::Display for ReportPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsePeriodError(pub String);

impl fmt::Display for ParsePeriodError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown period '{}' (expected month or year)", self.0)
    }
}

impl std::error::Error for ParsePeriodError {}

/// A fixed calendar window picked by the user in the history view, as
/// opposed to [`ReportPeriod`] which moves with today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateSelector {
    Day(NaiveDate),
    Month { year: i32, month: u32 },
}

impl DateSelector {
    pub fn month_of(date: NaiveDate) -> Self {
        DateSelector::Month {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        match *self {
            DateSelector::Day(day) => date == day,
            DateSelector::Month { year, month } => date.year() == year && date.month() == month,
        }
    }
}

/// "YYYY-MM-DD" selects a day, "YYYY-MM" a month.
impl FromStr for DateSelector {
    type Err = ParseDateSelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(day) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
            return Ok(DateSelector::Day(day));
        }
        // Day 1 makes "YYYY-MM" a parseable date and validates the month
        NaiveDate::parse_from_str(&format!("{}-01", s), "%Y-%m-%d")
            .map(DateSelector::month_of)
            .map_err(|_| ParseDateSelectorError(s.to_string()))
    }
}

impl fmt::Display for DateSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateSelector::Day(day) => write!(f, "{}", day.format("%Y-%m-%d")),
            DateSelector::Month { year, month } => write!(f, "{:04}-{:02}", year, month),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseDateSelectorError(pub String);

impl fmt::Display for ParseDateSelectorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid date '{}' (expected YYYY-MM-DD or YYYY-MM)", self.0)
    }
}

impl std::error::Error for ParseDateSelectorError {}

/// Which accounts a report looks at.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountFilter {
    #[default]
    All,
    Account(AccountId),
}

impl AccountFilter {
    pub fn account(&self) -> Option<&str> {
        match self {
            AccountFilter::All => None,
            AccountFilter::Account(id) => Some(id),
        }
    }
}

impl From<Option<AccountId>> for AccountFilter {
    fn from(value: Option<AccountId>) -> Self {
        match value {
            Some(id) => AccountFilter::Account(id),
            None => AccountFilter::All,
        }
    }
}

/// "all" maps to [`AccountFilter::All`]; anything else is an account id.
impl From<&str> for AccountFilter {
    fn from(value: &str) -> Self {
        if value.eq_ignore_ascii_case("all") {
            AccountFilter::All
        } else {
            AccountFilter::Account(value.to_string())
        }
    }
}

impl fmt::Display for AccountFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccountFilter::All => write!(f, "all"),
            AccountFilter::Account(id) => write!(f, "{}", id),
        }
    }
}

/// What the user currently has selected on screen. Owned by the caller and
/// handed to the aggregator as plain parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewSelection {
    pub period: ReportPeriod,
    pub account: AccountFilter,
}

impl ViewSelection {
    pub fn new(period: ReportPeriod, account: impl Into<AccountFilter>) -> Self {
        Self {
            period,
            account: account.into(),
        }
    }
}
