//! Domain model for a due month (`YYYY-MM`).
use std::fmt;
use std::str::FromStr;

#[derive(Debug, thiserror::Error, PartialEq)]
#[error("month key must be YYYY-MM, got '{0}'")]
pub struct InvalidMonthKey(pub String);

/// A calendar month a deposit is credited against.
///
/// Ordering is chronological.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthKey {
    year: i32,
    month: u32,
}

impl MonthKey {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        if (0..=9999).contains(&year) && (1..=12).contains(&month) {
            Some(Self { year, month })
        } else {
            None
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// Parse a strict `YYYY-MM` key: four digits, a dash, then 01..12.
    pub fn parse(value: &str) -> Result<Self, InvalidMonthKey> {
        let invalid = || InvalidMonthKey(value.to_string());
        let bytes = value.as_bytes();
        if bytes.len() != 7 || bytes[4] != b'-' {
            return Err(invalid());
        }
        if !bytes[..4].iter().chain(&bytes[5..]).all(u8::is_ascii_digit) {
            return Err(invalid());
        }

        let year: i32 = value[..4].parse().map_err(|_| invalid())?;
        let month: u32 = value[5..].parse().map_err(|_| invalid())?;
        Self::new(year, month).ok_or_else(invalid)
    }
}

impl FromStr for MonthKey {
    type Err = InvalidMonthKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_keys() {
        let key: MonthKey = "2025-10".parse().unwrap();
        assert_eq!(key.year(), 2025);
        assert_eq!(key.month(), 10);
        assert_eq!(key.to_string(), "2025-10");
        assert_eq!(MonthKey::parse("0999-01").unwrap().to_string(), "0999-01");
    }

    #[test]
    fn test_parse_rejects_malformed_keys() {
        for bad in ["2025-13", "2025-00", "2025-1", "25-10", "2025/10", "2025-10-01", "", "abcd-ef", "+025-10"] {
            assert!(MonthKey::parse(bad).is_err(), "{} should be rejected", bad);
        }
    }

    #[test]
    fn test_ordering_is_chronological() {
        let dec = MonthKey::parse("2025-12").unwrap();
        let jan = MonthKey::parse("2026-01").unwrap();
        assert!(dec < jan);
    }
}
