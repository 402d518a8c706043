use std::fmt;

/// Amounts are stored as integer cents so that sums stay exact.
/// 1 unit = 100 cents, so 12.50 = 1250.
pub type Cents = i64;

/// Largest amount a single record may carry (one trillion units).
pub const MAX_AMOUNT: Cents = 100_000_000_000_000;

/// Format cents as a plain decimal string.
/// Example: 125000 -> "1250.00", -30 -> "-0.30"
pub fn format_cents(cents: Cents) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{}{}.{:02}", sign, abs / 100, abs % 100)
}

/// Parse a user-entered amount into cents.
///
/// Accepts whole units ("300"), one or two decimals ("12.5", "12.50") and a
/// leading minus sign. Digits past the second decimal are truncated.
/// Thousands separators (",") are ignored so pasted values like "1,250.00"
/// work.
pub fn parse_cents(input: &str) -> Result<Cents, ParseCentsError> {
    let cleaned: String = input.trim().chars().filter(|c| *c != ',').collect();
    let (negative, digits) = match cleaned.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, cleaned.as_str()),
    };

    let (whole, fraction) = digits.split_once('.').unwrap_or((digits, ""));
    if whole.is_empty() && fraction.is_empty() {
        return Err(ParseCentsError::InvalidFormat);
    }
    if !whole.chars().chain(fraction.chars()).all(|c| c.is_ascii_digit()) {
        return Err(ParseCentsError::InvalidFormat);
    }

    let units: i64 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| ParseCentsError::Overflow)?
    };

    let mut fraction_cents = 0;
    for (i, digit) in fraction.chars().take(2).enumerate() {
        let value = digit.to_digit(10).unwrap_or(0) as i64;
        fraction_cents += if i == 0 { value * 10 } else { value };
    }

    let cents = units
        .checked_mul(100)
        .and_then(|c| c.checked_add(fraction_cents))
        .ok_or(ParseCentsError::Overflow)?;

    Ok(if negative { -cents } else { cents })
}

/// Convert a fractional unit amount (as older exports store it) into
/// cents, rounding to the nearest cent.
pub fn cents_from_units(units: f64) -> Result<Cents, ParseCentsError> {
    if !units.is_finite() {
        return Err(ParseCentsError::InvalidFormat);
    }
    let cents = (units * 100.0).round();
    if cents.abs() > MAX_AMOUNT as f64 {
        return Err(ParseCentsError::Overflow);
    }
    Ok(cents as Cents)
}

/// Whether `amount` is acceptable on a stored record.
pub fn is_valid_amount(amount: Cents) -> bool {
    (0..=MAX_AMOUNT).contains(&amount)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseCentsError {
    InvalidFormat,
    Overflow,
}

impl fmt::Display for ParseCentsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseCentsError::InvalidFormat => write!(f, "invalid amount format"),
            ParseCentsError::Overflow => write!(f, "amount is too large"),
        }
    }
}

impl std::error::Error for ParseCentsError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_cents() {
        assert_eq!(format_cents(100000), "1000.00");
        assert_eq!(format_cents(1234), "12.34");
        assert_eq!(format_cents(5), "0.05");
        assert_eq!(format_cents(0), "0.00");
        assert_eq!(format_cents(-30), "-0.30");
        assert_eq!(format_cents(-50000), "-500.00");
    }

    #[test]
    fn test_parse_cents() {
        assert_eq!(parse_cents("300"), Ok(30000));
        assert_eq!(parse_cents("12.34"), Ok(1234));
        assert_eq!(parse_cents("12.5"), Ok(1250));
        assert_eq!(parse_cents(".75"), Ok(75));
        assert_eq!(parse_cents("7."), Ok(700));
        assert_eq!(parse_cents(" 1,250.00 "), Ok(125000));
        assert_eq!(parse_cents("-20"), Ok(-2000));
        assert_eq!(parse_cents("9.999"), Ok(999));
    }

    #[test]
    fn test_parse_cents_invalid() {
        assert_eq!(parse_cents(""), Err(ParseCentsError::InvalidFormat));
        assert_eq!(parse_cents("."), Err(ParseCentsError::InvalidFormat));
        assert_eq!(parse_cents("abc"), Err(ParseCentsError::InvalidFormat));
        assert_eq!(parse_cents("1.2.3"), Err(ParseCentsError::InvalidFormat));
        assert_eq!(parse_cents("+5"), Err(ParseCentsError::InvalidFormat));
        assert_eq!(
            parse_cents("99999999999999999999"),
            Err(ParseCentsError::Overflow)
        );
    }

    #[test]
    fn test_cents_from_units() {
        assert_eq!(cents_from_units(1500.0), Ok(150000));
        assert_eq!(cents_from_units(12.345), Ok(1235));
        assert_eq!(cents_from_units(0.1 + 0.2), Ok(30));
        assert_eq!(cents_from_units(f64::NAN), Err(ParseCentsError::InvalidFormat));
        assert_eq!(cents_from_units(1e300), Err(ParseCentsError::Overflow));
    }

    #[test]
    fn test_amount_bounds() {
        assert!(is_valid_amount(0));
        assert!(is_valid_amount(MAX_AMOUNT));
        assert!(!is_valid_amount(-1));
        assert!(!is_valid_amount(MAX_AMOUNT + 1));
        assert!(!is_valid_amount(i64::MAX));
    }
}
