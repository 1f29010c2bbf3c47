//! Shared utility functions for report analysis crates.

/// Date utility functions
pub mod dates {
    use chrono::NaiveDate;
    use once_cell::sync::Lazy;
    use regex::Regex;

    /// Recognized date layouts, checked against the start of a value only.
    ///
    /// `YYYY-MM-DD`, `MM/DD/YYYY`, `DD-MM-YYYY` and `YYYY/MM/DD`. Anything after
    /// the first ten characters (a time component, a timezone) is ignored.
    static DATE_PREFIX: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"^(\d{4}-\d{2}-\d{2}|\d{2}/\d{2}/\d{4}|\d{2}-\d{2}-\d{4}|\d{4}/\d{2}/\d{2})")
            .expect("date prefix pattern is valid")
    });

    /// chrono formats matching the patterns in [`DATE_PREFIX`], in the same order.
    const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%m/%d/%Y", "%d-%m-%Y", "%Y/%m/%d"];

    /// Returns true if the value starts with one of the recognized date layouts.
    ///
    /// This is a shape check only; `2024-13-45` looks like a date.
    pub fn looks_like_date(s: &str) -> bool {
        DATE_PREFIX.is_match(s.trim())
    }

    /// Parse the leading date of a value in any recognized layout.
    ///
    /// Returns `None` when the value has no recognized prefix or the prefix
    /// is not a real calendar date.
    pub fn parse_date(s: &str) -> Option<NaiveDate> {
        let trimmed = s.trim();
        if !DATE_PREFIX.is_match(trimmed) {
            return None;
        }
        let prefix = trimmed.get(..10)?;
        DATE_FORMATS
            .iter()
            .find_map(|fmt| NaiveDate::parse_from_str(prefix, fmt).ok())
    }

    /// Format a NaiveDate as "YYYY-MM-DD"
    pub fn format_date(date: &NaiveDate) -> String {
        date.format("%Y-%m-%d").to_string()
    }

    /// Parse a user-supplied date argument, accepting any recognized layout.
    pub fn parse_date_arg(s: &str) -> anyhow::Result<NaiveDate> {
        parse_date(s).ok_or_else(|| anyhow::anyhow!("'{}' is not a recognized date", s))
    }

}

/// Number parsing and display
pub mod numbers {
    /// Parse a trimmed string as a finite number.
    ///
    /// Strict: the whole value must be numeric, so `"12 kg"` and `"2024-01-01"`
    /// are rejected, as are `NaN` and infinities.
    pub fn parse_number(s: &str) -> Option<f64> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return None;
        }
        trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
    }

    /// Format a number the way it is shown in tables and labels.
    ///
    /// Whole numbers print without a fractional part (`10`, not `10.0`).
    pub fn format_number(n: f64) -> String {
        if n.fract() == 0.0 && n.abs() < 1e15 {
            format!("{}", n as i64)
        } else {
            format!("{}", n)
        }
    }

}

/// Display label helpers
pub mod labels {
    /// Maximum number of characters shown for a chart label.
    pub const LABEL_WIDTH: usize = 20;

    /// Cut a label down to at most `max` characters (not bytes).
    pub fn truncate_label(s: &str, max: usize) -> String {
        s.chars().take(max).collect()
    }

    /// Case-insensitive substring test.
    pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
        haystack.to_lowercase().contains(&needle.to_lowercase())
    }

}

/// Turkish collation for case-insensitive string ordering.
///
/// Letters follow the Turkish alphabet (`c < ç < d`, `g < ğ < h`, `ı < i`,
/// `o < ö < p`, `s < ş < t`, `u < ü < v`). Dotted and dotless I fold the
/// Turkish way (`I -> ı`, `İ -> i`).
pub mod collation {
    use std::cmp::Ordering;

    const ALPHABET: &str = "abcçdefgğhıijklmnoöpqrsştuüvwxyz";

    fn fold(c: char) -> char {
        match c {
            'I' => 'ı',
            'İ' => 'i',
            _ => c.to_lowercase().next().unwrap_or(c),
        }
    }

    fn rank(c: char) -> (u8, u32) {
        if c.is_whitespace() || c.is_ascii_punctuation() {
            return (0, c as u32);
        }
        if c.is_numeric() {
            return (1, c as u32);
        }
        match ALPHABET.chars().position(|a| a == c) {
            Some(idx) => (2, idx as u32),
            None => (3, c as u32),
        }
    }

    /// Compare two strings under Turkish, case-insensitive collation.
    pub fn compare_tr(a: &str, b: &str) -> Ordering {
        let mut left = a.chars().map(fold);
        let mut right = b.chars().map(fold);
        loop {
            match (left.next(), right.next()) {
                (None, None) => return Ordering::Equal,
                (None, Some(_)) => return Ordering::Less,
                (Some(_), None) => return Ordering::Greater,
                (Some(l), Some(r)) => match rank(l).cmp(&rank(r)) {
                    Ordering::Equal => continue,
                    other => return other,
                },
            }
        }
    }

}
